// src/screen/state.rs

//! Shared mutable screen state
//!
//! One instance lives inside [`Screen`](super::Screen) for the whole
//! session. Drivers see it during `init` and `set_screen`.

use super::mode::Geometry;
use super::vram::VideoRamRegion;
use crate::constants::LOOKUP_ENTRIES;

/// Callback run when the monitor auto-switch reprograms the shifter.
pub type MonitorChangeHook = fn();

#[derive(Debug)]
pub struct ScreenState {
    /// An emulator or add-on enlarged the screen behind our back
    pub(crate) hacked: bool,
    /// Geometry the environment reported when it hacked the screen
    pub(crate) hacked_geometry: Option<Geometry>,
    /// `v_bas_ad`
    pub(crate) logical_base: u32,
    pub(crate) vram: Option<VideoRamRegion>,
    /// `defshiftmod`
    pub(crate) default_rez: i16,
    pub(crate) monitor_hook: Option<MonitorChangeHook>,
    /// VsetRGB shadow, `0x00RRGGBB`
    pub(crate) shadow_lut: [u32; LOOKUP_ENTRIES],
    /// VBL processing runs while this is positive
    pub(crate) vblsem: i16,
}

impl ScreenState {
    pub const fn new(default_rez: i16) -> Self {
        Self {
            hacked: false,
            hacked_geometry: None,
            logical_base: 0,
            vram: None,
            default_rez,
            monitor_hook: None,
            shadow_lut: [0; LOOKUP_ENTRIES],
            vblsem: 0,
        }
    }

    pub fn is_hacked(&self) -> bool {
        self.hacked
    }

    /// Latch the hacked flag; there is no way back.
    pub(crate) fn mark_hacked(&mut self, geometry: Geometry) {
        self.hacked = true;
        self.hacked_geometry = Some(geometry);
    }

    pub fn logical_base(&self) -> u32 {
        self.logical_base
    }

    /// Legacy store: values that are zero or negative as `i32` are ignored.
    pub(crate) fn set_logical_if_valid(&mut self, address: u32) -> bool {
        if (address as i32) > 0 {
            self.logical_base = address;
            log::debug!("v_bas_ad = {:#010x}", address);
            true
        } else {
            false
        }
    }

    pub fn video_ram(&self) -> Option<VideoRamRegion> {
        self.vram
    }

    pub fn default_rez(&self) -> i16 {
        self.default_rez
    }

    pub fn vbl_enabled(&self) -> bool {
        self.vblsem > 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn logical_store_ignores_non_positive_values() {
        let mut state = ScreenState::new(0);
        assert!(state.set_logical_if_valid(0x0010_0000));
        assert!(!state.set_logical_if_valid(0));
        assert!(!state.set_logical_if_valid(0x8000_0000));
        assert_eq!(state.logical_base(), 0x0010_0000);
    }

    #[test]
    fn hacked_flag_latches() {
        let mut state = ScreenState::new(0);
        state.mark_hacked(Geometry::new(1, 1024, 768));
        assert!(state.is_hacked());
        assert_eq!(state.hacked_geometry, Some(Geometry::new(1, 1024, 768)));
    }
}
