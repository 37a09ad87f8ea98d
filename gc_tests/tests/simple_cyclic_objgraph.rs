// Scenario S4 (spec.md §8): simple cyclic object graph.
//
// `a` and `b` point at each other. Conservative mark-and-sweep has no
// trouble with cycles -- it marks reachable records, not acyclic ones --
// so both survive as long as either local is still live, and both are
// reclaimed together in a single cycle once neither is.

use cmsgc::RootClass;
use std::ptr::NonNull;

const FLAGS: RootClass = RootClass::STACK
    .union(RootClass::ALL_GLOBALS)
    .union(RootClass::REGISTERS);

#[test]
fn two_allocations_pointing_at_each_other_survive_and_die_together() {
    let mut gc = cmsgc::init(FLAGS).unwrap();
    gc.set_threshold(0);

    let mut a: Option<NonNull<u8>> = cmsgc::allocate(&mut gc, std::mem::size_of::<usize>(), true);
    let mut b: Option<NonNull<u8>> = cmsgc::allocate(&mut gc, std::mem::size_of::<usize>(), true);
    unsafe { *(a.unwrap().as_ptr() as *mut usize) = b.unwrap().as_ptr() as usize };
    unsafe { *(b.unwrap().as_ptr() as *mut usize) = a.unwrap().as_ptr() as usize };

    cmsgc::collect!(&mut gc);
    assert_eq!(cmsgc::tracked_count(&gc), 2);
    // Each still points at the other.
    assert_eq!(
        unsafe { *(a.unwrap().as_ptr() as *const usize) },
        b.unwrap().as_ptr() as usize
    );
    assert_eq!(
        unsafe { *(b.unwrap().as_ptr() as *const usize) },
        a.unwrap().as_ptr() as usize
    );

    // Drop both locals: the cycle is now unreachable from any root, even
    // though each record still references the other.
    a = None;
    b = None;
    cmsgc::collect!(&mut gc);
    assert_eq!(cmsgc::tracked_count(&gc), 0);

    cmsgc::teardown(gc);
}
