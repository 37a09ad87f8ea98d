// Copyright (c) 2019 King's College London created by the Software Development
// Team <http://soft-dev.org/>
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0>, or the MIT license <LICENSE-MIT
// or http://opensource.org/licenses/MIT>, or the UPL-1.0 license
// <http://opensource.org/licenses/UPL> at your option. This file may not be
// copied, modified, or distributed except according to those terms.

//! The allocator façade: `init`/`teardown`/`allocate`/`resize`/`release`,
//! plus the collection cycle they trigger at threshold and the
//! `collect!`-macro entry point.

use std::alloc::Layout;
use std::marker::PhantomData;
use std::ptr::NonNull;

use crate::region::Region;
use crate::registry::{RootHit, Registry};
use crate::roots;
use crate::tag::{STATE_TAG, WORD_SIZE};

/// Number of allocations between automatic collections. Zero disables
/// automatic collection. Matches `GC_ALLOC_THRESHOLD` in
/// `original_source/gc.h`.
pub const DEFAULT_THRESHOLD: usize = 128;

/// Handle to a single collector instance. Not `Send`/`Sync`: spec §5 rules
/// out multi-threaded use of one collector outright, so a marker field
/// (not a lock) is what stops it crossing threads.
///
/// `tag` is the first field, at a fixed offset, so the mark engine can
/// recognise this struct's own storage if a heap scan wanders into it (a
/// `Box<Collector>` is itself a heap allocation) and skip over
/// `registry`/`stack_base`/etc. rather than misreading them as candidate
/// pointers.
pub struct Collector {
    tag: [u8; 16],
    registry: Registry,
    stack_base: Option<usize>,
    data: Option<Region>,
    bss: Option<Region>,
    allocations: usize,
    threshold: usize,
    flags: roots::RootClass,
    _not_send_sync: PhantomData<*const ()>,
}

impl Collector {
    fn new(flags: roots::RootClass) -> Self {
        Collector {
            tag: STATE_TAG,
            registry: Registry::new(),
            stack_base: crate::platform::stack_base(),
            data: crate::platform::data_extent(),
            bss: crate::platform::bss_extent(),
            allocations: 0,
            threshold: DEFAULT_THRESHOLD,
            flags,
            _not_send_sync: PhantomData,
        }
    }

    pub(crate) fn flags(&self) -> roots::RootClass {
        self.flags
    }

    pub(crate) fn stack_base(&self) -> Option<usize> {
        self.stack_base
    }

    pub(crate) fn data_extent(&self) -> Option<Region> {
        self.data
    }

    pub(crate) fn bss_extent(&self) -> Option<Region> {
        self.bss
    }

    /// Number of allocations between automatic collections; zero disables
    /// automatic collection. Exposed so tests and hosts can lower the
    /// default without waiting 128 allocations for a deterministic cycle.
    pub fn set_threshold(&mut self, threshold: usize) {
        self.threshold = threshold;
    }

    fn collect_internal(&mut self) {
        // Auto-collection triggered from inside `allocate`: the register
        // snapshot is captured right here, inline, in this frame, the
        // same property `collect!`'s expansion guarantees at the host's
        // call site (spec §4.A, §9).
        let snap = unsafe { crate::registers::capture() };
        crate::registers::store(snap);
        run_cycle(self);
    }
}

/// Backing `Layout` for a payload of the given logical size. A zero-size
/// request is rounded up to one byte (`std::alloc::alloc`/`dealloc` are
/// undefined behaviour for a zero-size layout) while the record's
/// recorded `size` stays the caller's requested value (spec §3 invariant
/// 2). Deterministic in both directions so `dealloc`/`realloc` can
/// reconstruct the exact layout `alloc` used from the stored size alone.
pub(crate) fn payload_layout(size: usize) -> Layout {
    Layout::from_size_align(size.max(1), WORD_SIZE).expect("allocation size overflows layout")
}

/// Initialise a collector scanning the root classes in `flags`. Never
/// fails in this implementation (the only fallible step, allocating the
/// `Collector` itself, aborts the process on OOM per Rust's global
/// allocator contract rather than returning an error) but keeps the
/// `Option` return spec §6 specifies, for parity with `allocate`/`resize`.
pub fn init(flags: roots::RootClass) -> Option<Box<Collector>> {
    Some(Box::new(Collector::new(flags)))
}

/// Release every still-tracked allocation, then the collector itself.
pub fn teardown(state: Box<Collector>) {
    let mut state = state;
    for id in state.registry.occupied_ids() {
        let (base, size) = state.registry.remove(id);
        unsafe { std::alloc::dealloc(base.as_ptr(), payload_layout(size)) };
    }
}

/// Number of allocations this collector currently tracks. A debugging aid
/// only, not part of the mark/sweep algorithm, mirroring the original
/// implementation's `gc_print_state` introspection hook.
pub fn tracked_count(state: &Collector) -> usize {
    state.registry.len()
}

/// Acquire `size` bytes from the host allocator and start tracking them.
/// Zeroes the payload first if `zero` is set. Returns `None` on
/// allocator failure, leaving the registry unchanged (spec §7, rule 1).
///
/// If `threshold` is nonzero and the allocation counter crosses a
/// multiple of it, a collection cycle runs before returning (spec §4.C).
pub fn allocate(state: &mut Collector, size: usize, zero: bool) -> Option<NonNull<u8>> {
    let layout = payload_layout(size);
    let raw = unsafe {
        if zero {
            std::alloc::alloc_zeroed(layout)
        } else {
            std::alloc::alloc(layout)
        }
    };
    let base = NonNull::new(raw)?;

    state.registry.insert(base, size);
    state.allocations += 1;

    #[cfg(feature = "gc_logging")]
    tracing::trace!(target: "cmsgc", base = ?base, size, zero, "allocate");

    if state.threshold != 0 && state.allocations % state.threshold == 0 {
        state.collect_internal();
    }

    Some(base)
}

/// Resize a tracked allocation. `old = None` behaves as `allocate(size,
/// false)`; `size == 0` behaves as `release(old)`; resizing an address
/// this collector isn't tracking fails with `None` and leaves state
/// unchanged (spec §7, rule 3; this crate resolves spec.md's open
/// question (i) by failing rather than aborting, see DESIGN.md).
pub fn resize(state: &mut Collector, old: Option<NonNull<u8>>, size: usize) -> Option<NonNull<u8>> {
    let old = match old {
        None => return allocate(state, size, false),
        Some(old) => old,
    };
    if size == 0 {
        release(state, Some(old));
        return None;
    }

    let id = state.registry.find(old.as_ptr() as usize)?;
    let old_size = state.registry.size_of(id);
    let old_layout = payload_layout(old_size);

    let raw = unsafe { std::alloc::realloc(old.as_ptr(), old_layout, size.max(1)) };
    let new_base = NonNull::new(raw)?;

    state.registry.update_resized(id, new_base, size);

    #[cfg(feature = "gc_logging")]
    tracing::trace!(target: "cmsgc", old = ?old, new = ?new_base, size, "resize");

    Some(new_base)
}

/// Release a tracked allocation. `None` and any untracked address are a
/// no-op (spec §8, property 6: idempotent release).
pub fn release(state: &mut Collector, old: Option<NonNull<u8>>) {
    let old = match old {
        None => return,
        Some(old) => old,
    };
    if let Some(id) = state.registry.find(old.as_ptr() as usize) {
        let (base, size) = state.registry.remove(id);
        unsafe { std::alloc::dealloc(base.as_ptr(), payload_layout(size)) };

        #[cfg(feature = "gc_logging")]
        tracing::trace!(target: "cmsgc", base = ?base, size, "release");
    }
}

/// Entry point `collect!` expands to after capturing registers at its call
/// site. Not meant to be called directly; always go through `collect!`,
/// which guarantees the snapshot reflects the host's own frame.
#[doc(hidden)]
pub fn __collect_with_snapshot(state: &mut Collector) {
    run_cycle(state);
}

/// One full mark-and-sweep cycle: clear marks, pre-mark from the register
/// snapshot, scan each enabled root range, drain the resulting worklist
/// (transitively marking reachable payloads), then sweep.
pub(crate) fn run_cycle(state: &mut Collector) {
    state.registry.clear_marks();

    #[cfg(feature = "gc_logging")]
    tracing::debug!(target: "cmsgc", flags = ?state.flags, "collection cycle starting");

    let root_set = roots::enumerate(state);
    let mut worklist = Vec::new();

    if let Some(words) = &root_set.registers {
        for &word in words {
            if let Some(id) = state.registry.find(word) {
                if !state.registry.is_marked(id) {
                    state.registry.set_marked(id, RootHit::Registers);
                    worklist.push(id);
                }
            }
        }
    }

    if let Some(region) = root_set.stack {
        crate::mark::scan_region(&state.registry, region, false, &mut worklist);
    }
    if let Some(region) = root_set.data {
        crate::mark::scan_region(&state.registry, region, false, &mut worklist);
    }
    if let Some(region) = root_set.bss {
        crate::mark::scan_region(&state.registry, region, false, &mut worklist);
    }
    for region in &root_set.heaps {
        crate::mark::scan_region(&state.registry, *region, true, &mut worklist);
    }

    while let Some(id) = worklist.pop() {
        let base = state.registry.base_of(id).as_ptr() as usize;
        let size = state.registry.size_of(id);
        let payload = Region::new(base, base + size);
        crate::mark::scan_region(&state.registry, payload, true, &mut worklist);
    }

    let reclaimed_before = state.registry.len();
    crate::sweep::sweep(&mut state.registry);

    #[cfg(feature = "gc_logging")]
    tracing::debug!(
        target: "cmsgc",
        reclaimed = reclaimed_before.saturating_sub(state.registry.len()),
        survivors = state.registry.len(),
        "collection cycle complete"
    );
    #[cfg(not(feature = "gc_logging"))]
    let _ = reclaimed_before;
}
