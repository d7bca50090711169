// src/driver/vicky2.rs

//! Foenix A2560U VICKY II
//!
//! 8-bit bitmap on layer 0 with lookup table 0. Video RAM is a fixed
//! window of the board, so the frame buffer never moves and the bitmap
//! address register holds an offset into that window.

use super::{ModePlan, ModeSwitch, ScreenDriver, ScreenRequest};
use crate::constants::{DEFAULT_PALETTE, EXTRA_VRAM_SIZE, FALCON_REZ, LOOKUP_ENTRIES, UNCHANGED};
use crate::diagnostics::DIAGNOSTICS;
use crate::errors::{ConfigError, Result};
use crate::hal::Platform;
use crate::screen::config::{ScreenConfig, Vicky2Layout};
use crate::screen::mode::{
    Geometry, ModeChange, ModeCode, MonitorType, PixelSize, VideoMode, std_pixel_size,
};
use crate::screen::palette::{PaletteSource, RgbColor};
use crate::screen::setscreen::standard_set_screen;
use crate::screen::state::ScreenState;
use crate::sync::without_vbl;

// Register offsets from the channel base
const MASTER_CONTROL: u32 = 0x0000;
const BACKGROUND_COLOR: u32 = 0x000C;
const BITMAP_L0_CONTROL: u32 = 0x0100;
const BITMAP_L0_ADDRESS: u32 = 0x0104;
const LUT0: u32 = 0x2000;

const BITMAP_ENABLE: u32 = 0x01;
const RES_SHIFT: u32 = 8;

bitflags::bitflags! {
    /// Master control register.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct MasterControl: u32 {
        const TEXT         = 0x0000_0001;
        const TEXT_OVERLAY = 0x0000_0002;
        const GRAPHICS     = 0x0000_0004;
        const BITMAP       = 0x0000_0008;
        const TILES        = 0x0000_0010;
        const SPRITES      = 0x0000_0020;
        const GAMMA        = 0x0000_0040;
        const DISABLE      = 0x0000_0080;
        /// Resolution id, see [`Vicky2Mode`]
        const RES_MASK     = 0x0000_0300;
        /// Pixel doubling
        const DOUBLE       = 0x0000_0400;
    }
}

/// Mode value of the VICKY II: resolution id in bits 0-1, pixel
/// doubling in bit 2.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Vicky2Mode {
    id: u8,
    doubled: bool,
}

impl Vicky2Mode {
    pub const VGA_640X480: Self = Self { id: 0, doubled: false };

    pub fn from_value(value: u16) -> Option<Self> {
        let mode = Self {
            id: (value & 0x3) as u8,
            doubled: value & 0x4 != 0,
        };
        (value <= 0x7 && mode.base_size().is_some()).then_some(mode)
    }

    pub const fn value(self) -> u16 {
        self.id as u16 | if self.doubled { 0x4 } else { 0 }
    }

    fn from_control(mcr: MasterControl) -> Self {
        Self {
            id: ((mcr.bits() & MasterControl::RES_MASK.bits()) >> RES_SHIFT) as u8,
            doubled: mcr.contains(MasterControl::DOUBLE),
        }
    }

    fn control_bits(self) -> MasterControl {
        let res = MasterControl::from_bits_retain(u32::from(self.id) << RES_SHIFT);
        if self.doubled { res | MasterControl::DOUBLE } else { res }
    }

    fn base_size(self) -> Option<(u16, u16)> {
        match self.id {
            0 => Some((640, 480)),
            1 => Some((800, 600)),
            3 => Some((640, 400)),
            _ => None,
        }
    }

    /// Geometry on screen; `None` for the reserved id.
    pub fn geometry(self) -> Option<Geometry> {
        let (w, h) = self.base_size()?;
        let geometry = if self.doubled {
            Geometry::new(8, w / 2, h / 2)
        } else {
            Geometry::new(8, w, h)
        };
        Some(geometry)
    }

    /// One byte per pixel.
    pub fn frame_bytes(self) -> Option<u32> {
        self.geometry()
            .map(|g| u32::from(g.width) * u32::from(g.height))
    }
}

/// Converts an STe palette word into a LUT entry.
fn lut_color(ste: u16) -> u32 {
    RgbColor::from_ste(ste).to_xrgb()
}

#[derive(Debug, Clone)]
pub struct Vicky2Screen {
    layout: Vicky2Layout,
}

impl Vicky2Screen {
    fn reg(&self, offset: u32) -> u32 {
        self.layout.registers + offset
    }

    fn read_control<P: Platform>(&self, hw: &P) -> MasterControl {
        MasterControl::from_bits_retain(hw.read32(self.reg(MASTER_CONTROL)))
    }

    /// Mode currently programmed; a reserved id reads as 640x480.
    pub fn current_mode<P: Platform>(&self, hw: &P) -> Vicky2Mode {
        let mode = Vicky2Mode::from_control(self.read_control(hw));
        if mode.base_size().is_some() { mode } else { Vicky2Mode::VGA_640X480 }
    }

    fn write_mode<P: Platform>(&self, hw: &mut P, mode: Vicky2Mode) {
        let keep = self
            .read_control(&*hw)
            .difference(MasterControl::RES_MASK | MasterControl::DOUBLE);
        hw.write32(self.reg(MASTER_CONTROL), (keep | mode.control_bits()).bits());
        log::debug!("vicky2: mode {}", mode.value());
    }

    fn write_lut<P: Platform>(&self, hw: &mut P, index: usize, color: u32) {
        hw.write32(self.reg(LUT0) + 4 * index as u32, color);
    }

    fn decode_mode(value: i16) -> core::result::Result<Vicky2Mode, ConfigError> {
        if value < 0 {
            return Err(ConfigError::InvalidModeCode(value));
        }
        Vicky2Mode::from_value(value as u16).ok_or(ConfigError::UnsupportedMode(value as u16))
    }
}

impl ScreenDriver for Vicky2Screen {
    fn from_config(config: &ScreenConfig) -> Self {
        Self { layout: config.vicky2 }
    }

    fn name(&self) -> &'static str {
        "vicky2"
    }

    fn init<P: Platform>(&mut self, hw: &mut P, _state: &mut ScreenState) {
        log::debug!("vicky2: init");
        let control = MasterControl::GRAPHICS | MasterControl::BITMAP | Vicky2Mode::VGA_640X480.control_bits();
        hw.write32(self.reg(MASTER_CONTROL), control.bits());
        hw.write32(self.reg(BITMAP_L0_CONTROL), BITMAP_ENABLE);
        hw.write32(self.reg(BITMAP_L0_ADDRESS), 0);
        self.init_palette_registers(hw, FALCON_REZ, Vicky2Mode::VGA_640X480.value() as i16);
    }

    fn calc_vram_size<P: Platform>(&self, hw: &P) -> u32 {
        let mode = self.current_mode(hw);
        let size = mode.frame_bytes().unwrap_or(0) + EXTRA_VRAM_SIZE;
        log::debug!("vicky2: calc_vram_size mode {} size {}", mode.value(), size);
        size
    }

    fn vram_size_for(&self, code: ModeCode) -> Option<u32> {
        match code {
            ModeCode::Mode(value) => Vicky2Mode::from_value(value)?.frame_bytes(),
            ModeCode::Rez(_) => None,
        }
    }

    fn check_mode_change<P: Platform>(
        &mut self,
        hw: &mut P,
        code: ModeCode,
    ) -> core::result::Result<ModeChange, ConfigError> {
        let ModeCode::Mode(raw) = code else {
            return Ok(ModeChange::Unchanged);
        };
        let mode = Vicky2Mode::from_value(raw).ok_or(ConfigError::UnsupportedMode(raw))?;
        if mode == self.current_mode(&*hw) {
            Ok(ModeChange::Unchanged)
        } else {
            Ok(ModeChange::Switch(ModeCode::Mode(mode.value())))
        }
    }

    fn init_palette_registers<P: Platform>(&mut self, hw: &mut P, _rez: i16, _mode: i16) {
        for (i, word) in DEFAULT_PALETTE.iter().enumerate() {
            self.write_lut(hw, i, lut_color(*word));
        }
        hw.write32(self.reg(BACKGROUND_COLOR), lut_color(DEFAULT_PALETTE[0]));
    }

    fn can_change_resolution<P: Platform>(&self, _hw: &mut P) -> bool {
        true
    }

    fn current_mode_info<P: Platform>(&self, hw: &P) -> VideoMode {
        let mode = self.current_mode(hw);
        VideoMode {
            geometry: mode.geometry().unwrap_or_default(),
            code: ModeCode::Mode(mode.value()),
        }
    }

    fn current_rez<P: Platform>(&self, _hw: &P) -> i16 {
        FALCON_REZ
    }

    fn set_phys_address<P: Platform>(&mut self, hw: &mut P, address: u32) {
        let offset = address.wrapping_sub(self.layout.vram);
        if offset >= self.layout.vram_size {
            log::warn!("vicky2: {:#010x} is outside video RAM", address);
            return;
        }
        hw.write32(self.reg(BITMAP_L0_ADDRESS), offset);
    }

    fn monitor_type<P: Platform>(&self, _hw: &mut P) -> MonitorType {
        // DVI would be more accurate but is known to few programs
        MonitorType::Vga
    }

    fn color_depth<P: Platform>(&self, _hw: &P) -> u16 {
        // 24-bit LUT entries do not fit a word
        0
    }

    fn pixel_size(&self, geometry: Geometry) -> PixelSize {
        std_pixel_size(geometry)
    }

    fn phys_base<P: Platform>(&self, hw: &P, _state: &ScreenState) -> u32 {
        self.layout.vram + hw.read32(self.reg(BITMAP_L0_ADDRESS))
    }

    fn set_screen<P: Platform>(
        &mut self,
        hw: &mut P,
        state: &mut ScreenState,
        request: ScreenRequest,
    ) -> Result<i16> {
        standard_set_screen(self, hw, state, request)
    }

    fn set_video_mode<P: Platform>(&mut self, hw: &mut P, mode: i16) -> Result<i16> {
        let old = self.current_mode(&*hw).value() as i16;
        if mode == UNCHANGED {
            return Ok(old);
        }

        let new = Self::decode_mode(mode)?;
        let this = &*self;
        without_vbl(hw, |hw| this.write_mode(hw, new));
        DIAGNOSTICS.record_mode_switch();
        Ok(old)
    }

    fn set_color<P: Platform>(&mut self, hw: &mut P, index: i16, value: i16) -> i16 {
        let index = (index & 0x000f) as usize;
        let old = RgbColor::from_xrgb(hw.read32(self.reg(LUT0) + 4 * index as u32)).to_ste();
        if value >= 0 {
            let color = lut_color(value as u16);
            self.write_lut(hw, index, color);
            if index == 0 {
                hw.write32(self.reg(BACKGROUND_COLOR), color);
            }
        }
        old as i16
    }

    fn set_palette<P: Platform>(&mut self, hw: &mut P, palette: PaletteSource<'_>) {
        let background = match palette {
            PaletteSource::Compat(words) => {
                for (i, word) in words.iter().enumerate() {
                    self.write_lut(hw, i, lut_color(*word));
                }
                lut_color(words[0])
            }
            PaletteSource::Lookup(entries) => {
                let entries = &entries[..entries.len().min(LOOKUP_ENTRIES)];
                for (i, xrgb) in entries.iter().enumerate() {
                    self.write_lut(hw, i, xrgb & 0x00ff_ffff);
                }
                match entries.first() {
                    Some(first) => first & 0x00ff_ffff,
                    None => return,
                }
            }
        };
        hw.write32(self.reg(BACKGROUND_COLOR), background);
    }

    fn detect_monitor_change<P: Platform>(&mut self, _hw: &mut P, _default_rez: i16) -> bool {
        false
    }
}

impl ModeSwitch for Vicky2Screen {
    fn plan<P: Platform>(
        &mut self,
        hw: &mut P,
        rez: i16,
        mode: i16,
    ) -> core::result::Result<ModePlan, ConfigError> {
        // only the Falcon rez carries a VICKY mode value
        if rez != FALCON_REZ {
            return Err(ConfigError::UnsupportedResolution(rez));
        }
        let target = if mode == UNCHANGED {
            self.current_mode(&*hw)
        } else {
            Self::decode_mode(mode)?
        };
        Ok(ModePlan { rez, mode: Some(target.value()), may_reallocate: false })
    }

    fn vbl_settle_frames(&self) -> u8 {
        0
    }

    fn previous_mode(&self, _plan: &ModePlan) -> i16 {
        0
    }

    fn program<P: Platform>(&mut self, hw: &mut P, plan: &ModePlan) {
        if let Some(mode) = plan.mode.and_then(Vicky2Mode::from_value) {
            self.write_mode(hw, mode);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::ScreenError;
    use crate::hal::{RegisterBus, StubBoard};

    const BASE: u32 = Vicky2Layout::A2560U.registers;
    const VRAM: u32 = Vicky2Layout::A2560U.vram;

    fn booted(board: &mut StubBoard) -> (Vicky2Screen, ScreenState) {
        let mut driver = Vicky2Screen::from_config(&ScreenConfig::a2560u());
        let mut state = ScreenState::new(0);
        driver.init(board, &mut state);
        (driver, state)
    }

    #[test]
    fn mode_values() {
        assert_eq!(Vicky2Mode::from_value(1).and_then(Vicky2Mode::geometry), Some(Geometry::new(8, 800, 600)));
        assert_eq!(Vicky2Mode::from_value(4).and_then(Vicky2Mode::geometry), Some(Geometry::new(8, 320, 240)));
        assert_eq!(Vicky2Mode::from_value(2), None);
        assert_eq!(Vicky2Mode::from_value(8), None);
    }

    #[test]
    fn init_enables_bitmap_at_640x480() {
        let mut board = StubBoard::a2560u();
        let (driver, _) = booted(&mut board);

        let mcr = MasterControl::from_bits_retain(board.read32(BASE + MASTER_CONTROL));
        assert!(mcr.contains(MasterControl::GRAPHICS | MasterControl::BITMAP));
        assert_eq!(board.read32(BASE + BITMAP_L0_CONTROL), BITMAP_ENABLE);
        assert_eq!(driver.current_mode_info(&board).geometry, Geometry::new(8, 640, 480));
        assert_eq!(driver.calc_vram_size(&board), 640 * 480 + 256);
        // white first, background follows entry 0
        assert_eq!(board.read32(BASE + LUT0), 0x00ff_ffff);
        assert_eq!(board.read32(BASE + BACKGROUND_COLOR), 0x00ff_ffff);
    }

    #[test]
    fn physical_address_is_an_offset_into_vram() {
        let mut board = StubBoard::a2560u();
        let (mut driver, state) = booted(&mut board);

        driver.set_phys_address(&mut board, VRAM + 0x1_0000);
        assert_eq!(board.read32(BASE + BITMAP_L0_ADDRESS), 0x1_0000);
        assert_eq!(driver.phys_base(&board, &state), VRAM + 0x1_0000);

        // outside the window: ignored
        driver.set_phys_address(&mut board, 0x0010_0000);
        assert_eq!(driver.phys_base(&board, &state), VRAM + 0x1_0000);
    }

    #[test]
    fn set_color_updates_lut_and_background() {
        let mut board = StubBoard::a2560u();
        let (mut driver, _) = booted(&mut board);

        assert_eq!(driver.set_color(&mut board, 0, -1), 0x0fff);
        assert_eq!(driver.set_color(&mut board, 0x10, 0x0f00), 0x0fff);
        assert_eq!(board.read32(BASE + LUT0), 0x00ff_0000);
        assert_eq!(board.read32(BASE + BACKGROUND_COLOR), 0x00ff_0000);
    }

    #[test]
    fn lookup_palette_loads_lut0() {
        let mut board = StubBoard::a2560u();
        let (mut driver, _) = booted(&mut board);
        driver.set_palette(&mut board, PaletteSource::Lookup(&[0x0012_3456, 0xff65_4321]));
        assert_eq!(board.read32(BASE + LUT0 + 4), 0x0065_4321);
        assert_eq!(board.read32(BASE + BACKGROUND_COLOR), 0x0012_3456);
    }

    #[test]
    fn video_mode_is_programmed_and_reported() {
        let mut board = StubBoard::a2560u();
        let (mut driver, _) = booted(&mut board);

        assert_eq!(driver.set_video_mode(&mut board, -1), Ok(0));
        assert_eq!(driver.set_video_mode(&mut board, 1), Ok(0));
        assert_eq!(driver.set_video_mode(&mut board, -1), Ok(1));
        assert_eq!(
            driver.set_video_mode(&mut board, 2),
            Err(ScreenError::Config(ConfigError::UnsupportedMode(2)))
        );
        let mcr = MasterControl::from_bits_retain(board.read32(BASE + MASTER_CONTROL));
        assert!(mcr.contains(MasterControl::BITMAP));
    }

    #[test]
    fn set_screen_needs_the_falcon_rez() {
        let mut board = StubBoard::a2560u();
        let (mut driver, mut state) = booted(&mut board);

        let result = driver.set_screen(&mut board, &mut state, ScreenRequest::rez(0, -1));
        assert_eq!(result, Err(ScreenError::Config(ConfigError::UnsupportedResolution(0))));

        let result = driver.set_screen(&mut board, &mut state, ScreenRequest::rez(FALCON_REZ, 3));
        assert_eq!(result, Ok(0));
        assert_eq!(board.console_geometry(), Some(Geometry::new(8, 640, 400)));
        assert_eq!(board.reallocation_calls(), 0);
    }

    #[test]
    fn mode_change_check_agrees_with_set_screen() {
        let mut board = StubBoard::a2560u();
        let (mut driver, mut state) = booted(&mut board);
        assert!(driver.can_change_resolution(&mut board));

        assert_eq!(driver.check_mode_change(&mut board, ModeCode::Mode(0)), Ok(ModeChange::Unchanged));
        assert_eq!(
            driver.check_mode_change(&mut board, ModeCode::Mode(1)),
            Ok(ModeChange::Switch(ModeCode::Mode(1)))
        );
        assert_eq!(
            driver.check_mode_change(&mut board, ModeCode::Mode(2)),
            Err(ConfigError::UnsupportedMode(2))
        );
        assert_eq!(driver.check_mode_change(&mut board, ModeCode::Rez(0)), Ok(ModeChange::Unchanged));

        // what the check offers, set_screen carries out
        assert!(driver.set_screen(&mut board, &mut state, ScreenRequest::rez(FALCON_REZ, 1)).is_ok());
        assert_eq!(driver.current_mode(&board).value(), 1);
        assert_eq!(driver.check_mode_change(&mut board, ModeCode::Mode(1)), Ok(ModeChange::Unchanged));
    }
}
