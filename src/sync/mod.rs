// src/sync/mod.rs

//! Synchronisation with the vertical-blank interrupt
//!
//! The main line and the VBL handler share three things: the pending
//! palette (a lock-free [`PaletteMailbox`]), the hardware mode registers
//! (guarded by masking the VBL with [`without_vbl`]) and, when the hosting
//! OS keeps the [`Screen`] behind a `spin::Mutex`, the screen itself
//! (serviced with [`service_vertical_blank`], which never spins).

pub mod interrupt;
pub mod mailbox;

pub use interrupt::{with_vbl_allowed, without_vbl};
pub use mailbox::PaletteMailbox;

use crate::diagnostics::DIAGNOSTICS;
use crate::driver::ScreenDriver;
use crate::hal::Platform;
use crate::screen::Screen;

/// Outcome of one serviced blank.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlankService {
    /// VBL work ran
    Serviced,
    /// VBL processing is gated off (`vblsem <= 0`)
    Gated,
    /// The main line holds the screen; work deferred to the next blank
    Skipped,
}

/// VBL entry point for a screen kept behind a `spin::Mutex`.
///
/// The main line may hold the lock when the blank fires; spinning inside
/// the interrupt would deadlock, so the blank is skipped instead. A pending
/// palette stays in the mailbox and is picked up by the next blank.
pub fn service_vertical_blank<D, P>(screen: &spin::Mutex<Screen<D, P>>) -> BlankService
where
    D: ScreenDriver,
    P: Platform,
{
    match screen.try_lock() {
        Some(mut screen) => {
            if screen.vertical_blank() {
                BlankService::Serviced
            } else {
                BlankService::Gated
            }
        }
        None => {
            DIAGNOSTICS.record_skipped_blank();
            BlankService::Skipped
        }
    }
}
