// Scenario S3 (spec.md §8): heap chain.
//
// `p1` is a pointer slot holding `p2`'s address; only `p1` is held by a
// stack local. Both survive a cycle because the mark engine recurses into
// a marked record's payload regardless of whether the HEAPS root class is
// enabled -- that flag only gates enumeration of *untracked* heap regions,
// not the walk into a tracked allocation's own bytes.
//
// As in `stack_retention.rs`, each allocation's address is held by exactly
// one named local throughout, so clearing that local (not some other copy
// of the same address) is what makes it unreachable to the scanner.

use cmsgc::RootClass;
use std::ptr::NonNull;

const FLAGS: RootClass = RootClass::STACK
    .union(RootClass::ALL_GLOBALS)
    .union(RootClass::REGISTERS);

#[test]
fn pointer_slot_keeps_its_target_alive_via_payload_recursion() {
    let mut gc = cmsgc::init(FLAGS).unwrap();
    gc.set_threshold(0);

    let mut p1: Option<NonNull<u8>> =
        cmsgc::allocate(&mut gc, std::mem::size_of::<usize>(), true);
    let mut p2: Option<NonNull<u8>> =
        cmsgc::allocate(&mut gc, std::mem::size_of::<u32>(), false);
    unsafe { *(p2.unwrap().as_ptr() as *mut u32) = 47 };
    unsafe { *(p1.unwrap().as_ptr() as *mut usize) = p2.unwrap().as_ptr() as usize };

    // Drop the local holding p2 directly; it's still reachable through p1.
    p2 = None;
    cmsgc::collect!(&mut gc);
    assert_eq!(cmsgc::tracked_count(&gc), 2);
    // Read p2's value back out through the pointer stored in p1's payload,
    // without stashing p2's address in a second named local.
    assert_eq!(
        unsafe { *(*(p1.unwrap().as_ptr() as *const usize) as *const u32) },
        47
    );

    // Null the slot's contents and drop the local holding p1: now neither
    // is reachable from anywhere.
    unsafe { *(p1.unwrap().as_ptr() as *mut usize) = 0 };
    p1 = None;
    cmsgc::collect!(&mut gc);
    assert_eq!(cmsgc::tracked_count(&gc), 0);

    cmsgc::teardown(gc);
}
