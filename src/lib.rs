// src/lib.rs
//! tos_screen - ROM screen driver layer
//!
//! One resolution / palette / video RAM API in front of the Atari
//! ST, STe, TT and Falcon video chipsets and the Foenix A2560 VICKY II
//! and VICKY III. The driver is chosen at build time through Cargo
//! features (see [`driver::ActiveDriver`]); the board is reached only
//! through the [`hal::Platform`] traits, so the whole layer runs on the
//! host against [`hal::StubBoard`].
//!
//! ```
//! use tos_screen::driver::ScreenRequest;
//! use tos_screen::hal::StubBoard;
//! use tos_screen::screen::{Screen, config::ScreenConfig};
//! use tos_screen::driver::AtariScreen;
//!
//! let mut board = StubBoard::atari();
//! board.set_allocation(Some(0x0010_0000));
//! let mut screen: Screen<AtariScreen, _> = Screen::new(&ScreenConfig::atari_tt(), board);
//! screen.init()?;
//! assert_eq!(screen.physical_base(), 0x0010_0000);
//! assert_eq!(screen.set_screen(ScreenRequest::rez(-1, -1))?, 0);
//! # Ok::<(), tos_screen::errors::ScreenError>(())
//! ```

#![cfg_attr(not(test), no_std)]
#![deny(unsafe_op_in_unsafe_fn)]
#![deny(missing_debug_implementations)]
#![warn(missing_docs)]
#![allow(missing_docs)]

pub mod constants;
pub mod diagnostics;
pub mod driver;
pub mod errors;
pub mod hal;
pub mod screen;
pub mod sync;

pub use driver::{ActiveDriver, ScreenDriver, ScreenRequest};
pub use errors::{Result, ScreenError};
pub use screen::{ActiveScreen, Screen};
