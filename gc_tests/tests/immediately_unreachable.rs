// Scenario S5 (spec.md §8): immediately unreachable.
//
// An allocation whose address is never stored anywhere reachable -- the
// `allocate` call's result is discarded outright -- is reclaimed on the
// very next cycle, since no root or tracked payload ever held it.

use cmsgc::RootClass;

const FLAGS: RootClass = RootClass::STACK
    .union(RootClass::ALL_GLOBALS)
    .union(RootClass::REGISTERS);

#[test]
fn discarded_allocation_is_reclaimed_on_next_cycle() {
    let mut gc = cmsgc::init(FLAGS).unwrap();
    gc.set_threshold(0);

    // The returned address is never bound to anything; nothing on the
    // stack, in a global, or in a register holds it past this statement.
    let _ = cmsgc::allocate(&mut gc, 32, false);
    assert_eq!(cmsgc::tracked_count(&gc), 1);

    cmsgc::collect!(&mut gc);
    assert_eq!(cmsgc::tracked_count(&gc), 0);

    cmsgc::teardown(gc);
}
