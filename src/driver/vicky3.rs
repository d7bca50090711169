// src/driver/vicky3.rs

//! Foenix A2560M VICKY III
//!
//! Only the fixed 1024x768 monochrome bitmap is supported. The legacy
//! VICKY II of the board is switched off at init.

use super::{ScreenDriver, ScreenRequest};
use crate::constants::ST_HIGH;
use crate::errors::{ConfigError, Result};
use crate::hal::Platform;
use crate::screen::config::ScreenConfig;
use crate::screen::mode::{
    Geometry, ModeChange, ModeCode, MonitorType, PixelSize, VideoMode, std_pixel_size,
};
use crate::screen::palette::PaletteSource;
use crate::screen::state::ScreenState;

pub const VICKY3_BASE: u32 = 0xFC00_0000;
const CONTROL: u32 = VICKY3_BASE;
/// Bitmap start, in longs
const BITMAP_ADDRESS: u32 = VICKY3_BASE + 0x4;
/// Foreground colour of the 1 bpp bitmap
const INK_COLOR: u32 = VICKY3_BASE + 0x8;

/// Master control of the legacy VICKY II.
pub const VICKY2_LEGACY: u32 = 0xFEC4_0000;
const VICKY2_DISABLE: u32 = 0x80;

const DISPLAY_ENABLE: u32 = 0x1;

/// The only mode value: 1024x768, 1 bpp.
pub const MODE_1024X768: u16 = 4;
const GEOMETRY: Geometry = Geometry::new(1, 1024, 768);

#[derive(Debug, Clone, Default)]
pub struct Vicky3Screen;

impl ScreenDriver for Vicky3Screen {
    fn from_config(_config: &ScreenConfig) -> Self {
        Self
    }

    fn name(&self) -> &'static str {
        "vicky3"
    }

    fn init<P: Platform>(&mut self, hw: &mut P, _state: &mut ScreenState) {
        log::debug!("vicky3: init");
        hw.write32(VICKY2_LEGACY, VICKY2_DISABLE);
        // blank until a bitmap address is set
        hw.write32(CONTROL, 0);
    }

    fn calc_vram_size<P: Platform>(&self, _hw: &P) -> u32 {
        GEOMETRY.frame_bytes()
    }

    fn vram_size_for(&self, code: ModeCode) -> Option<u32> {
        (code == ModeCode::Mode(MODE_1024X768)).then(|| GEOMETRY.frame_bytes())
    }

    fn check_mode_change<P: Platform>(
        &mut self,
        _hw: &mut P,
        _code: ModeCode,
    ) -> core::result::Result<ModeChange, ConfigError> {
        Ok(ModeChange::Unchanged)
    }

    fn init_palette_registers<P: Platform>(&mut self, hw: &mut P, _rez: i16, _mode: i16) {
        hw.write32(INK_COLOR, 0x00ff_ffff);
    }

    fn can_change_resolution<P: Platform>(&self, _hw: &mut P) -> bool {
        false
    }

    fn current_mode_info<P: Platform>(&self, _hw: &P) -> VideoMode {
        VideoMode {
            geometry: GEOMETRY,
            code: ModeCode::Mode(MODE_1024X768),
        }
    }

    fn current_rez<P: Platform>(&self, _hw: &P) -> i16 {
        ST_HIGH
    }

    fn set_phys_address<P: Platform>(&mut self, hw: &mut P, address: u32) {
        log::debug!("vicky3: setphys({:#010x})", address);
        hw.write32(CONTROL, 0);
        hw.write32(BITMAP_ADDRESS, address / 4);
        hw.write32(CONTROL, DISPLAY_ENABLE + (u32::from(MODE_1024X768) << 1));
    }

    fn monitor_type<P: Platform>(&self, _hw: &mut P) -> MonitorType {
        MonitorType::Mono
    }

    fn color_depth<P: Platform>(&self, _hw: &P) -> u16 {
        2
    }

    fn pixel_size(&self, geometry: Geometry) -> PixelSize {
        std_pixel_size(geometry)
    }

    fn phys_base<P: Platform>(&self, hw: &P, _state: &ScreenState) -> u32 {
        hw.read32(BITMAP_ADDRESS).wrapping_mul(4)
    }

    /// Addresses only; the mode never changes.
    fn set_screen<P: Platform>(
        &mut self,
        hw: &mut P,
        state: &mut ScreenState,
        request: ScreenRequest,
    ) -> Result<i16> {
        state.set_logical_if_valid(request.logical);
        if request.physical_given() {
            self.set_phys_address(hw, request.physical);
        }
        Ok(MODE_1024X768 as i16)
    }

    fn set_video_mode<P: Platform>(&mut self, _hw: &mut P, _mode: i16) -> Result<i16> {
        Ok(MODE_1024X768 as i16)
    }

    fn set_color<P: Platform>(&mut self, _hw: &mut P, _index: i16, _value: i16) -> i16 {
        0
    }

    fn set_palette<P: Platform>(&mut self, _hw: &mut P, _palette: PaletteSource<'_>) {
        log::debug!("vicky3: no palette in 1 bpp mode");
    }

    fn detect_monitor_change<P: Platform>(&mut self, _hw: &mut P, _default_rez: i16) -> bool {
        false
    }
}
