// Copyright (c) 2019 King's College London created by the Software Development
// Team <http://soft-dev.org/>
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0>, or the MIT license <LICENSE-MIT
// or http://opensource.org/licenses/MIT>, or the UPL-1.0 license
// <http://opensource.org/licenses/UPL> at your option. This file may not be
// copied, modified, or distributed except according to those terms.

//! Fixed byte patterns the mark engine uses to recognise the collector's own
//! bookkeeping when a heap scan wanders into it.

use static_assertions::const_assert_eq;

/// Marks a [`crate::registry::Slot`]'s header. Chosen to be unlikely to occur
/// by chance in ordinary host data.
pub const RECORD_TAG: [u8; 16] = *b"__CMSGC_RECORD__";

/// Marks a [`crate::collector::Collector`]'s own storage.
pub const STATE_TAG: [u8; 16] = *b"__CMSGC_STATE___";

const_assert_eq!(RECORD_TAG.len(), STATE_TAG.len());

/// Native word size in bytes, used as the scan granularity everywhere in the
/// mark engine and root enumerator.
pub const WORD_SIZE: usize = std::mem::size_of::<usize>();
