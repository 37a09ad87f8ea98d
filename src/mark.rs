// Copyright (c) 2019 King's College London created by the Software Development
// Team <http://soft-dev.org/>
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0>, or the MIT license <LICENSE-MIT
// or http://opensource.org/licenses/MIT>, or the UPL-1.0 license
// <http://opensource.org/licenses/UPL> at your option. This file may not be
// copied, modified, or distributed except according to those terms.

//! Conservative word-at-a-time scanning of a single root or payload range.
//!
//! Every aligned word in `[start, end - WORD_SIZE]` is treated as a
//! candidate pointer: the registry is asked whether any tracked record's
//! base equals that word, regardless of what the word actually holds.
//! Newly-marked records are pushed onto the caller's worklist rather than
//! recursed into directly, so the depth of the live pointer graph never
//! grows the native call stack.

use crate::region::Region;
use crate::registry::{RootHit, Registry, Slot, SlotId};
use crate::tag::{RECORD_TAG, STATE_TAG, WORD_SIZE};

/// Scan `region` for words matching a tracked record's base address.
///
/// `self_skip` enables the registry-storage recognition pass and must be
/// set for any range that may contain the collector's own bookkeeping (heap
/// ranges and marked-payload recursion); it must be left off for
/// stack/globals ranges, which never do (spec §4.E).
pub(crate) fn scan_region(
    registry: &Registry,
    region: Region,
    self_skip: bool,
    worklist: &mut Vec<SlotId>,
) {
    if region.len() < WORD_SIZE {
        return;
    }

    let last = region.end - WORD_SIZE;
    let mut pos = region.start;

    while pos <= last {
        let mut advance = WORD_SIZE;

        if self_skip {
            if let Some(extra) = self_tag_skip(pos, region.end) {
                advance += extra;
                pos += advance;
                continue;
            }
        }

        let word = unsafe { (pos as *const usize).read_unaligned() };
        if let Some(id) = registry.find(word) {
            if !registry.is_marked(id) {
                registry.set_marked(id, RootHit::Address(pos));
                worklist.push(id);
            }
        }

        pos += advance;
    }
}

/// If the bytes at `pos` match a self-tag and there's room left in the
/// range to hold the whole tagged struct, return how many bytes *beyond*
/// the usual one-word step the cursor should additionally advance to land
/// exactly past the struct (spec §4.E: "record size, less one word").
///
/// Falls through to an ordinary word-compare (returns `None`) on any
/// mismatch, per invariant 5 of spec §3: a self-tag mismatch means this is
/// not the collector's own storage, so it's scanned as plain data.
fn self_tag_skip(pos: usize, region_end: usize) -> Option<usize> {
    if pos + RECORD_TAG.len() > region_end {
        return None;
    }
    let bytes = unsafe { std::slice::from_raw_parts(pos as *const u8, RECORD_TAG.len()) };
    if bytes == RECORD_TAG {
        Some(std::mem::size_of::<Slot>() - WORD_SIZE)
    } else if bytes == STATE_TAG {
        Some(std::mem::size_of::<crate::collector::Collector>() - WORD_SIZE)
    } else {
        None
    }
}
