// Copyright (c) 2019 King's College London created by the Software Development
// Team <http://soft-dev.org/>
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0>, or the MIT license <LICENSE-MIT
// or http://opensource.org/licenses/MIT>, or the UPL-1.0 license
// <http://opensource.org/licenses/UPL> at your option. This file may not be
// copied, modified, or distributed except according to those terms.

//! The sweep engine: releases every record the mark phase left unmarked.
//!
//! Marks are cleared at the *start* of the next cycle's mark phase
//! ([`crate::collector::run_cycle`]) rather than here, so sweep itself only
//! needs to decide which records to drop; it never touches the mark bit
//! of a survivor (spec §4.F's "equivalently" clause).

use crate::registry::Registry;

pub(crate) fn sweep(registry: &mut Registry) {
    let unmarked: Vec<_> = registry
        .occupied_ids()
        .into_iter()
        .filter(|&id| !registry.is_marked(id))
        .collect();

    for id in unmarked {
        let (base, size) = registry.remove(id);

        #[cfg(feature = "gc_logging")]
        tracing::debug!(
            target: "cmsgc",
            base = ?base,
            size,
            "sweeping unreachable allocation"
        );

        unsafe {
            std::alloc::dealloc(base.as_ptr(), crate::collector::payload_layout(size));
        }
    }
}
