// Copyright (c) 2019 King's College London created by the Software Development
// Team <http://soft-dev.org/>
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0>, or the MIT license <LICENSE-MIT
// or http://opensource.org/licenses/MIT>, or the UPL-1.0 license
// <http://opensource.org/licenses/UPL> at your option. This file may not be
// copied, modified, or distributed except according to those terms.

//! A conservative, stop-the-world, mark-and-sweep allocator.
//!
//! `cmsgc` replaces direct calls to the system allocator for memory a host
//! program wants reclaimed automatically. Reachability is determined
//! *conservatively*: any word in an enabled root range whose bit pattern
//! matches a tracked allocation's base address is treated as a live
//! reference, whatever the word's declared purpose actually is. This needs
//! no type information and no write barriers, at the cost of occasionally
//! retaining memory a precise collector would have reclaimed.
//!
//! ```no_run
//! use cmsgc::RootClass;
//!
//! let mut gc = cmsgc::init(RootClass::ALL_MEMORY | RootClass::REGISTERS).unwrap();
//! let p = cmsgc::allocate(&mut gc, 64, true).unwrap();
//! unsafe { *(p.as_ptr() as *mut u64) = 47 };
//! cmsgc::collect!(&mut gc);
//! cmsgc::teardown(gc);
//! ```
//!
//! See the crate's `DESIGN.md` for the grounding of each module and the
//! resolutions of the open questions the design leaves underspecified.

mod collector;
mod mark;
mod platform;
pub mod region;
pub mod registers;
mod registry;
pub mod roots;
mod sweep;
mod tag;

pub use collector::{
    allocate, init, release, resize, teardown, tracked_count, Collector, DEFAULT_THRESHOLD,
};
pub use roots::RootClass;

#[doc(hidden)]
pub use collector::__collect_with_snapshot;

/// Run a collection cycle on `state` (a `&mut Collector`, typically
/// obtained by dereferencing the `Box<Collector>` `init` returns).
///
/// This must be a macro, not a function: the register snapshot it takes
/// has to be captured in the caller's own stack frame, because an ordinary
/// function call would have already clobbered caller-saved registers that
/// might be the only place the host keeps a live pointer (spec §4.A, §9).
/// Expands to [`snapshot_registers!`] followed by the internal collection
/// routine.
#[macro_export]
macro_rules! collect {
    ($state:expr) => {{
        $crate::snapshot_registers!();
        $crate::__collect_with_snapshot($state)
    }};
}
