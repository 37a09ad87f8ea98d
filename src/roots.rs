// Copyright (c) 2019 King's College London created by the Software Development
// Team <http://soft-dev.org/>
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0>, or the MIT license <LICENSE-MIT
// or http://opensource.org/licenses/MIT>, or the UPL-1.0 license
// <http://opensource.org/licenses/UPL> at your option. This file may not be
// copied, modified, or distributed except according to those terms.

//! Root-class configuration and per-cycle root enumeration.

use bitflags::bitflags;

use crate::region::Region;

bitflags! {
    /// Which root classes a collection cycle scans. Bit positions are fixed
    /// so a saved configuration is portable across builds.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct RootClass: u8 {
        const STACK     = 0b0_0001;
        const HEAPS     = 0b0_0010;
        const DATA      = 0b0_0100;
        const BSS       = 0b0_1000;
        const REGISTERS = 0b1_0000;
    }
}

impl RootClass {
    /// `DATA | BSS`.
    pub const ALL_GLOBALS: RootClass = RootClass::DATA.union(RootClass::BSS);
    /// `STACK | HEAPS | DATA | BSS`.
    pub const ALL_MEMORY: RootClass = RootClass::STACK
        .union(RootClass::HEAPS)
        .union(RootClass::DATA)
        .union(RootClass::BSS);
    /// `ALL_MEMORY | REGISTERS`.
    pub const EVERYTHING: RootClass = RootClass::ALL_MEMORY.union(RootClass::REGISTERS);
}

/// The ranges and register snapshot produced for a single collection cycle.
/// Heap regions and the register snapshot are only populated when their
/// corresponding flag is set *and* the platform adapter could supply them
/// (spec §7, rules 4 and 5: an unavailable platform capability silently
/// empties the corresponding class, it never fails the cycle).
pub(crate) struct RootSet {
    pub stack: Option<Region>,
    pub data: Option<Region>,
    pub bss: Option<Region>,
    pub heaps: Vec<Region>,
    /// Raw bytes of the register snapshot, present only when `REGISTERS` is
    /// enabled and the snapshot primitive is supported on this target.
    pub registers: Option<Vec<usize>>,
}

impl RootSet {
    pub(crate) fn empty() -> Self {
        RootSet {
            stack: None,
            data: None,
            bss: None,
            heaps: Vec::new(),
            registers: None,
        }
    }
}

/// Build the [`RootSet`] for one collection cycle from `collector`'s
/// configured flag mask and the register snapshot already stored by the
/// time `collect!` (or the threshold-triggered internal path) reached here.
///
/// The stack top is always read from the snapshot's stack-pointer slot,
/// never by calling a helper, regardless of whether `REGISTERS` itself is
/// enabled, since the snapshot is captured unconditionally before a cycle
/// starts (spec §4.D).
pub(crate) fn enumerate(collector: &crate::collector::Collector) -> RootSet {
    let flags = collector.flags();
    let mut set = RootSet::empty();

    if flags.contains(RootClass::REGISTERS) {
        crate::registers::with_snapshot(|snap| {
            set.registers = Some(snap.words().to_vec());
        });
    }

    let stack_top = crate::registers::with_snapshot(|snap| snap.stack_pointer());

    if flags.contains(RootClass::STACK) {
        if let Some(base) = collector.stack_base() {
            if stack_top < base {
                set.stack = Some(Region::new(stack_top, base));
            }
        }
    }

    if flags.contains(RootClass::DATA) {
        set.data = collector.data_extent();
    }

    if flags.contains(RootClass::BSS) {
        set.bss = collector.bss_extent();
    }

    if flags.contains(RootClass::HEAPS) {
        // Spec §7 rule 4: an unavailable platform capability silently
        // empties the heaps class rather than failing the cycle.
        if let Some(regions) = crate::platform::heap_regions() {
            set.heaps = regions;
        }
    }

    set
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stock_combinations_match_spec_bit_positions() {
        assert_eq!(RootClass::ALL_GLOBALS.bits(), 0b0_1100);
        assert_eq!(RootClass::ALL_MEMORY.bits(), 0b0_1111);
        assert_eq!(RootClass::EVERYTHING.bits(), 0b1_1111);
    }
}
