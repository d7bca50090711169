// src/driver/mod.rs

//! Screen drivers
//!
//! One [`ScreenDriver`] per video chipset. Exactly one of them is the
//! [`ActiveDriver`] of a build, chosen by Cargo feature; the others are
//! still compiled so they can be tested on the host.

pub mod atari;
pub mod vicky2;
pub mod vicky3;

pub use atari::AtariScreen;
pub use vicky2::Vicky2Screen;
pub use vicky3::Vicky3Screen;

use crate::errors::{ConfigError, Result};
use crate::hal::Platform;
use crate::screen::config::ScreenConfig;
use crate::screen::mode::{Geometry, ModeChange, ModeCode, MonitorType, PixelSize, VideoMode};
use crate::screen::palette::PaletteSource;
use crate::screen::state::ScreenState;

/// Setscreen arguments.
///
/// Addresses that are zero or negative as `i32` mean "leave unchanged";
/// `rez == -1` leaves the resolution alone. Only a request with both
/// addresses at exactly 0 lets the Videl reallocate video RAM.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScreenRequest {
    pub logical: u32,
    pub physical: u32,
    pub rez: i16,
    pub mode: i16,
}

impl ScreenRequest {
    /// Change only the resolution.
    pub const fn rez(rez: i16, mode: i16) -> Self {
        Self {
            logical: 0,
            physical: 0,
            rez,
            mode,
        }
    }

    /// Change only the addresses.
    pub const fn addresses(logical: u32, physical: u32) -> Self {
        Self {
            logical,
            physical,
            rez: -1,
            mode: -1,
        }
    }

    pub(crate) const fn physical_given(&self) -> bool {
        (self.physical as i32) > 0
    }

    /// Both addresses left at 0, so the screen may move. `-1` keeps the
    /// current addresses and does not count.
    pub(crate) const fn addresses_omitted(&self) -> bool {
        self.logical == 0 && self.physical == 0
    }
}

/// The per-chipset operation table.
///
/// Every slot is mandatory. A chipset that lacks a capability implements
/// the slot as a documented no-op.
pub trait ScreenDriver: Sized {
    fn from_config(config: &ScreenConfig) -> Self;

    fn name(&self) -> &'static str;

    /// Most basic setup: initial mode, sync and palette. Video RAM is not
    /// known yet.
    fn init<P: Platform>(&mut self, hw: &mut P, state: &mut ScreenState);

    /// Frame buffer size for the mode currently programmed, slack included.
    fn calc_vram_size<P: Platform>(&self, hw: &P) -> u32;

    /// Raw frame size of `code` without slack (VgetSize); `None` when the
    /// chipset cannot display it.
    fn vram_size_for(&self, code: ModeCode) -> Option<u32>;

    /// Would `code` change the current mode? Used before the desktop
    /// settings are applied; never touches the hardware.
    fn check_mode_change<P: Platform>(
        &mut self,
        hw: &mut P,
        code: ModeCode,
    ) -> core::result::Result<ModeChange, ConfigError>;

    fn init_palette_registers<P: Platform>(&mut self, hw: &mut P, rez: i16, mode: i16);

    fn can_change_resolution<P: Platform>(&self, hw: &mut P) -> bool;

    fn current_mode_info<P: Platform>(&self, hw: &P) -> VideoMode;

    /// Getrez
    fn current_rez<P: Platform>(&self, hw: &P) -> i16;

    fn set_phys_address<P: Platform>(&mut self, hw: &mut P, address: u32);

    /// Re-sensed on every call.
    fn monitor_type<P: Platform>(&self, hw: &mut P) -> MonitorType;

    /// Number of colour nuances, 0 when it does not fit a word.
    fn color_depth<P: Platform>(&self, hw: &P) -> u16;

    fn pixel_size(&self, geometry: Geometry) -> PixelSize;

    fn phys_base<P: Platform>(&self, hw: &P, state: &ScreenState) -> u32;

    /// Setscreen; returns the previous mode value (or 0).
    fn set_screen<P: Platform>(
        &mut self,
        hw: &mut P,
        state: &mut ScreenState,
        request: ScreenRequest,
    ) -> Result<i16>;

    /// Vsetmode; `-1` only reports.
    fn set_video_mode<P: Platform>(&mut self, hw: &mut P, mode: i16) -> Result<i16>;

    /// Immediate write of one compatible palette entry; `value < 0` only reads.
    fn set_color<P: Platform>(&mut self, hw: &mut P, index: i16, value: i16) -> i16;

    /// Palette writer run from the VBL.
    fn set_palette<P: Platform>(&mut self, hw: &mut P, palette: PaletteSource<'_>);

    /// VBL check of the monitor against the programmed resolution.
    ///
    /// Returns true after reprogramming the shifter; the caller then fires
    /// the monitor-change hook.
    fn detect_monitor_change<P: Platform>(&mut self, hw: &mut P, default_rez: i16) -> bool;
}

/// Validated resolution change, ready to program.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ModePlan {
    pub rez: i16,
    /// Mode value to program, already adapted to the monitor
    pub mode: Option<u16>,
    /// The mode may need a bigger frame buffer
    pub may_reallocate: bool,
}

/// Hooks used by [`standard_set_screen`](crate::screen::setscreen::standard_set_screen).
pub trait ModeSwitch: ScreenDriver {
    /// Chipset-specific validation after the common range check.
    fn plan<P: Platform>(
        &mut self,
        hw: &mut P,
        rez: i16,
        mode: i16,
    ) -> core::result::Result<ModePlan, ConfigError>;

    /// Blanks to wait before touching the mode register.
    fn vbl_settle_frames(&self) -> u8;

    /// Setscreen return value, read before programming.
    fn previous_mode(&self, plan: &ModePlan) -> i16;

    /// Write the mode registers. Runs with the VBL masked.
    fn program<P: Platform>(&mut self, hw: &mut P, plan: &ModePlan);
}

/// Driver linked into this build.
#[cfg(feature = "machine-a2560m")]
pub type ActiveDriver = Vicky3Screen;

#[cfg(all(feature = "machine-a2560u", not(feature = "machine-a2560m")))]
pub type ActiveDriver = Vicky2Screen;

#[cfg(not(any(feature = "machine-a2560u", feature = "machine-a2560m")))]
pub type ActiveDriver = AtariScreen;
