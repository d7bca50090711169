// src/sync/mailbox.rs

//! Single-slot palette mailbox
//!
//! Written by ordinary calls, drained by the VBL. The slot is one tagged
//! word so both sides are a single atomic swap:
//!
//! | word            | meaning                                  |
//! |-----------------|------------------------------------------|
//! | `0`             | nothing pending                          |
//! | `addr`          | 16 STe words at `addr`                   |
//! | `addr \| 1`     | 16 lookup entries at `addr`              |
//! | `1`             | whole lookup table from the shadow copy  |
//!
//! Both payload types are at least word aligned, so bit 0 is free.

use core::sync::atomic::{AtomicUsize, Ordering};

use crate::screen::palette::PaletteRequest;

const EMPTY: usize = 0;
const LOOKUP_TAG: usize = 1;

#[derive(Debug)]
pub struct PaletteMailbox {
    slot: AtomicUsize,
}

impl PaletteMailbox {
    pub const fn new() -> Self {
        Self {
            slot: AtomicUsize::new(EMPTY),
        }
    }

    fn encode(request: PaletteRequest) -> usize {
        match request {
            PaletteRequest::Compat(colors) => colors.as_ptr() as usize,
            PaletteRequest::Lookup16(colors) => colors.as_ptr() as usize | LOOKUP_TAG,
            PaletteRequest::LookupShadow => LOOKUP_TAG,
        }
    }

    fn decode(word: usize) -> Option<PaletteRequest> {
        match word {
            EMPTY => None,
            LOOKUP_TAG => Some(PaletteRequest::LookupShadow),
            tagged if tagged & LOOKUP_TAG != 0 => {
                let ptr = (tagged & !LOOKUP_TAG) as *const [u32; 16];
                // SAFETY: only `post` writes the slot, and it stores the
                // address of a `&'static [u32; 16]`.
                Some(PaletteRequest::Lookup16(unsafe { &*ptr }))
            }
            plain => {
                let ptr = plain as *const [u16; 16];
                // SAFETY: as above, from a `&'static [u16; 16]`.
                Some(PaletteRequest::Compat(unsafe { &*ptr }))
            }
        }
    }

    /// Queue `request` for the next blank, replacing any pending one.
    ///
    /// Returns true when an unapplied request was overwritten.
    pub fn post(&self, request: PaletteRequest) -> bool {
        self.slot.swap(Self::encode(request), Ordering::AcqRel) != EMPTY
    }

    /// Drop any pending request.
    pub fn clear(&self) -> bool {
        self.slot.swap(EMPTY, Ordering::AcqRel) != EMPTY
    }

    /// Take the pending request, leaving the slot empty.
    pub fn take(&self) -> Option<PaletteRequest> {
        Self::decode(self.slot.swap(EMPTY, Ordering::AcqRel))
    }

    pub fn is_pending(&self) -> bool {
        self.slot.load(Ordering::Acquire) != EMPTY
    }
}

impl Default for PaletteMailbox {
    fn default() -> Self {
        Self::new()
    }
}
