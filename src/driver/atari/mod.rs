// src/driver/atari/mod.rs

//! Atari ST / STe / TT shifters and the Falcon Videl
//!
//! One driver covers the whole family; the fitted chipset comes from
//! [`AtariConfig::model`](crate::screen::config::AtariConfig). The shifters
//! are written only between frames (see [`ModeSwitch::vbl_settle_frames`]),
//! the Videl is reprogrammed at any time.

pub mod regs;
pub mod shifter;
pub mod videl;

use regs::{
    FALCON_PALETTE_REGS, STE_HORZ_SCROLL, STE_LINE_OFFSET, ST_PALETTE_REGS, ST_SHIFTER, SYNC_PAL,
    SYNC_TT, SYNCMODE, TT_PALETTE_REGS, TT_SHIFTER, VIDEOBASE_ADDR_HI, VIDEOBASE_ADDR_LOW,
    VIDEOBASE_ADDR_MID,
};
use shifter::{ShifterPort, ST_PORT, TT_PORT};
use videl::{Videl, VidelMode};

use super::{ModePlan, ModeSwitch, ScreenDriver, ScreenRequest};
use crate::constants::{
    FALCON_REZ, FALCON_VRAM_SIZE, LOOKUP_ENTRIES, ST_HIGH, ST_LOW, ST_MEDIUM, ST_PALETTE_MASK,
    STE_PALETTE_MASK, TT_HIGH, TT_MEDIUM, UNCHANGED, VIDEL_BOOT_PHYS,
};
use crate::diagnostics::DIAGNOSTICS;
use crate::errors::{ConfigError, Result};
use crate::hal::Platform;
use crate::screen::config::{AtariModel, ScreenConfig};
use crate::screen::mode::{
    Geometry, ModeChange, ModeCode, MonitorType, PixelSize, VideoMode, check_rez_range,
    shifter_geometry, st_pixel_size, std_pixel_size,
};
use crate::screen::palette::{PaletteSource, RgbColor};
use crate::screen::setscreen::{standard_set_screen, vsync};
use crate::screen::state::ScreenState;
use crate::screen::vram::{st_rounded, with_extra};
use crate::sync::without_vbl;

/// Atari video driver.
#[derive(Debug, Clone)]
pub struct AtariScreen {
    model: AtariModel,
    dma_sound: bool,
    pal: bool,
    settle_after_reset: bool,
    fixed_vram_address: Option<u32>,
    boot_video_mode: Option<u16>,
    aux_display_base: Option<u32>,
    videl: Videl,
    /// `sshiftmod`: last resolution written to the shifter
    shift_mode: i16,
}

impl AtariScreen {
    pub fn model(&self) -> AtariModel {
        self.model
    }

    /// The Videl's mode shadow (Falcon only).
    pub fn videl_mode(&self) -> VidelMode {
        self.videl.current()
    }

    fn is_falcon(&self) -> bool {
        self.model == AtariModel::Falcon
    }

    fn port(&self) -> ShifterPort {
        if self.model == AtariModel::Tt { TT_PORT } else { ST_PORT }
    }

    fn palette_mask(&self) -> u16 {
        if self.model.is_enhanced() {
            STE_PALETTE_MASK
        } else {
            ST_PALETTE_MASK
        }
    }

    fn validate_shifter_rez(&self, rez: i16) -> core::result::Result<(), ConfigError> {
        if self.model == AtariModel::Tt {
            shifter::validate_tt_rez(rez)
        } else {
            shifter::validate_st_rez(rez)
        }
    }

    /// Vfixmode, then reject what the Videl cannot generate.
    fn fixed_videl_mode<P: Platform>(
        &self,
        hw: &P,
        raw: u16,
    ) -> core::result::Result<VidelMode, ConfigError> {
        let mode = self.videl.fix(hw, VidelMode::from_raw(raw));
        if mode.is_supported() {
            Ok(mode)
        } else {
            Err(ConfigError::UnsupportedMode(mode.bits()))
        }
    }

    fn init_videl<P: Platform>(&mut self, hw: &mut P) -> (i16, i16, u8) {
        // park the raster on safe memory while the mode changes
        self.set_phys_address(hw, self.fixed_vram_address.unwrap_or(VIDEL_BOOT_PHYS));

        let boot = self
            .boot_video_mode
            .map(VidelMode::from_raw)
            .unwrap_or(VidelMode::FALCON_DEFAULT_BOOT);
        // the PAL bit of the fixed mode is inherited from the current one
        self.videl.assume(boot);
        let mut mode = self.videl.fix(hw, boot);
        if !mode.is_supported() {
            log::debug!(
                "invalid video mode {:#06x} changed to {:#06x}",
                mode.bits(),
                VidelMode::FALCON_DEFAULT_BOOT.bits()
            );
            mode = VidelMode::FALCON_DEFAULT_BOOT;
        }

        self.videl.program(hw, mode);
        let sync = if mode.contains(VidelMode::PAL) { SYNC_PAL } else { 0 };
        (mode.rez(), mode.bits() as i16, sync)
    }

    fn init_shifter<P: Platform>(&mut self, hw: &mut P, monitor: MonitorType) -> (i16, i16, u8) {
        let mono = monitor == MonitorType::Mono;

        if self.model == AtariModel::Tt {
            let rez = if mono { TT_HIGH } else { TT_MEDIUM };
            hw.write8(TT_SHIFTER, rez as u8);
            return (rez, 0, SYNC_TT);
        }

        // change the resolution while nothing is displayed (plane shift bug)
        let _ = vsync(hw);
        if self.settle_after_reset {
            // a GLUE reset during startup may need a second VBL to settle
            let _ = vsync(hw);
        }

        let rez = if mono { ST_HIGH } else { ST_LOW };
        hw.write8(ST_SHIFTER, rez as u8);

        if self.model == AtariModel::Ste {
            hw.write8(STE_LINE_OFFSET, 0);
            hw.write8(STE_HORZ_SCROLL, 0);
        }

        let sync = if self.pal { SYNC_PAL } else { 0 };
        (rez, 0, sync)
    }

    fn check_videl_mode<P: Platform>(
        &self,
        hw: &P,
        code: ModeCode,
    ) -> core::result::Result<ModeChange, ConfigError> {
        let ModeCode::Mode(raw) = code else {
            return Ok(ModeChange::Unchanged);
        };
        let mode = self.fixed_videl_mode(hw, raw)?;
        if mode == self.videl.current() {
            Ok(ModeChange::Unchanged)
        } else {
            Ok(ModeChange::Switch(ModeCode::Mode(mode.bits())))
        }
    }

    fn check_shifter_rez<P: Platform>(
        &self,
        hw: &P,
        code: ModeCode,
    ) -> core::result::Result<ModeChange, ConfigError> {
        // Videl mode values mean nothing to a shifter
        let ModeCode::Rez(requested) = code else {
            return Ok(ModeChange::Unchanged);
        };
        let rez = i16::from(requested);
        check_rez_range(rez)?;
        self.validate_shifter_rez(rez)?;

        let port = self.port();
        let wanted = shifter::remap_requested_rez(&port, rez);
        if wanted == port.read_rez(hw) {
            Ok(ModeChange::Unchanged)
        } else {
            Ok(ModeChange::Switch(ModeCode::Rez(wanted as u8)))
        }
    }

    fn plan_videl<P: Platform>(
        &self,
        hw: &P,
        rez: i16,
        mode: i16,
    ) -> core::result::Result<ModePlan, ConfigError> {
        if rez > FALCON_REZ {
            return Err(ConfigError::UnsupportedResolution(rez));
        }

        if rez == FALCON_REZ {
            if mode == UNCHANGED {
                return Ok(ModePlan { rez, mode: None, may_reallocate: false });
            }
            if mode < 0 {
                return Err(ConfigError::InvalidModeCode(mode));
            }
            let fixed = self.fixed_videl_mode(hw, mode as u16)?;
            return Ok(ModePlan { rez, mode: Some(fixed.bits()), may_reallocate: true });
        }

        // ST resolutions run in compatibility mode, inside the boot allocation
        let compat = VidelMode::for_st_rez(rez).ok_or(ConfigError::UnsupportedResolution(rez))?;
        let fixed = self.videl.fix(hw, compat);
        Ok(ModePlan { rez, mode: Some(fixed.bits()), may_reallocate: false })
    }

    fn plan_shifter<P: Platform>(
        &self,
        hw: &P,
        rez: i16,
    ) -> core::result::Result<ModePlan, ConfigError> {
        self.validate_shifter_rez(rez)?;

        // a monochrome monitor shows its one resolution only
        let port = self.port();
        if port.read_rez(hw) == port.mono_rez && rez != port.mono_rez {
            return Err(ConfigError::UnsupportedResolution(rez));
        }

        Ok(ModePlan { rez, mode: None, may_reallocate: false })
    }
}

impl ScreenDriver for AtariScreen {
    fn from_config(config: &ScreenConfig) -> Self {
        let atari = config.atari;
        Self {
            model: atari.model,
            dma_sound: atari.dma_sound,
            pal: config.pal,
            settle_after_reset: config.settle_after_reset,
            fixed_vram_address: config.fixed_vram_address,
            boot_video_mode: atari.boot_video_mode,
            aux_display_base: atari.aux_display_base,
            videl: Videl::new(VidelMode::FALCON_DEFAULT_BOOT),
            shift_mode: ST_LOW,
        }
    }

    fn name(&self) -> &'static str {
        match self.model {
            AtariModel::St => "atari-st",
            AtariModel::Ste => "atari-ste",
            AtariModel::Tt => "atari-tt",
            AtariModel::Falcon => "atari-falcon",
        }
    }

    fn init<P: Platform>(&mut self, hw: &mut P, _state: &mut ScreenState) {
        let monitor = self.monitor_type(hw);
        log::debug!("{}: monitor type {}", self.name(), monitor.code());

        let (rez, mode, sync) = if self.is_falcon() {
            self.init_videl(hw)
        } else {
            self.init_shifter(hw, monitor)
        };

        self.shift_mode = rez;
        hw.write8(SYNCMODE, sync);
        self.init_palette_registers(hw, rez, mode);
    }

    fn calc_vram_size<P: Platform>(&self, hw: &P) -> u32 {
        if self.is_falcon() {
            // mode is already set; previous releases always had at least this
            let frame = self.videl.current().frame_bytes().unwrap_or(0);
            log::debug!("calc_vram_size: minimum required size {} bytes", frame);
            return with_extra(frame.max(FALCON_VRAM_SIZE));
        }

        let frame = self.current_mode_info(hw).geometry.frame_bytes();
        if self.model == AtariModel::Tt {
            with_extra(frame)
        } else {
            st_rounded(frame)
        }
    }

    fn vram_size_for(&self, code: ModeCode) -> Option<u32> {
        match (self.is_falcon(), code) {
            (true, ModeCode::Mode(raw)) => VidelMode::from_raw(raw).frame_bytes(),
            (true, ModeCode::Rez(rez)) => VidelMode::for_st_rez(i16::from(rez))?.frame_bytes(),
            (false, ModeCode::Rez(rez)) => {
                let rez = i16::from(rez);
                self.validate_shifter_rez(rez).ok()?;
                shifter_geometry(rez).map(|g| g.frame_bytes())
            }
            (false, ModeCode::Mode(_)) => None,
        }
    }

    fn check_mode_change<P: Platform>(
        &mut self,
        hw: &mut P,
        code: ModeCode,
    ) -> core::result::Result<ModeChange, ConfigError> {
        if self.is_falcon() {
            self.check_videl_mode(&*hw, code)
        } else {
            self.check_shifter_rez(&*hw, code)
        }
    }

    fn init_palette_registers<P: Platform>(&mut self, hw: &mut P, rez: i16, _mode: i16) {
        shifter::init_st_palette(hw, self.palette_mask());
        match self.model {
            AtariModel::Falcon => shifter::init_falcon_palette(hw),
            AtariModel::Tt => shifter::init_tt_palette(hw),
            AtariModel::St | AtariModel::Ste => {}
        }
        shifter::fixup_st_palette(hw, rez);
    }

    fn can_change_resolution<P: Platform>(&self, hw: &mut P) -> bool {
        if self.is_falcon() {
            // not on a real ST monochrome monitor
            return Videl::monitor(&*hw) != MonitorType::Mono;
        }
        let port = self.port();
        port.read_rez(&*hw) != port.mono_rez
    }

    fn current_mode_info<P: Platform>(&self, _hw: &P) -> VideoMode {
        if self.is_falcon() {
            let mode = self.videl.current();
            let geometry = mode.geometry().unwrap_or_default();
            return VideoMode { geometry, code: ModeCode::Mode(mode.bits()) };
        }

        let rez = self.shift_mode & 7;
        let geometry = shifter_geometry(rez).unwrap_or_default();
        VideoMode { geometry, code: ModeCode::Rez(rez as u8) }
    }

    fn current_rez<P: Platform>(&self, hw: &P) -> i16 {
        if self.is_falcon() {
            self.videl.current().rez()
        } else {
            self.port().read_rez(hw)
        }
    }

    fn set_phys_address<P: Platform>(&mut self, hw: &mut P, address: u32) {
        hw.write8(VIDEOBASE_ADDR_HI, (address >> 16) as u8);
        hw.write8(VIDEOBASE_ADDR_MID, (address >> 8) as u8);
        if self.model.is_enhanced() {
            hw.write8(VIDEOBASE_ADDR_LOW, address as u8);
        }
    }

    fn monitor_type<P: Platform>(&self, hw: &mut P) -> MonitorType {
        if self.is_falcon() {
            Videl::monitor(&*hw)
        } else if self.dma_sound {
            shifter::debounced_monitor(hw)
        } else {
            shifter::gpip_monitor(&*hw)
        }
    }

    fn color_depth<P: Platform>(&self, _hw: &P) -> u16 {
        if self.is_falcon() {
            let mode = self.videl.current();
            let four_planes = mode.bits_per_pixel() == Some(4);
            return if mode.contains(VidelMode::COMPAT) || four_planes { 4096 } else { 0 };
        }

        match self.shift_mode {
            ST_HIGH | TT_HIGH => 2,
            ST_LOW | ST_MEDIUM if self.model == AtariModel::St => 512,
            _ => 4096,
        }
    }

    fn pixel_size(&self, geometry: Geometry) -> PixelSize {
        match self.model {
            AtariModel::Tt | AtariModel::Falcon => std_pixel_size(geometry),
            AtariModel::St | AtariModel::Ste => st_pixel_size(geometry),
        }
    }

    fn phys_base<P: Platform>(&self, hw: &P, state: &ScreenState) -> u32 {
        if state.is_hacked() {
            if let Some(base) = self.aux_display_base {
                return base;
            }
        }

        let mut address = u32::from(hw.read8(VIDEOBASE_ADDR_HI)) << 16
            | u32::from(hw.read8(VIDEOBASE_ADDR_MID)) << 8;
        if self.model.is_enhanced() {
            address |= u32::from(hw.read8(VIDEOBASE_ADDR_LOW));
        }
        address
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
        if !self.is_falcon() {
            // no mode values on a shifter
            return Ok(ModeCode::Rez(self.current_rez(&*hw) as u8).encode());
        }

        let old = self.videl.current().bits() as i16;
        if mode == UNCHANGED {
            return Ok(old);
        }
        if mode < 0 {
            return Err(ConfigError::InvalidModeCode(mode).into());
        }

        let fixed = self.fixed_videl_mode(&*hw, mode as u16)?;
        let videl = &mut self.videl;
        without_vbl(hw, |hw| videl.program(hw, fixed));
        self.shift_mode = fixed.rez();
        DIAGNOSTICS.record_mode_switch();
        Ok(old)
    }

    fn set_color<P: Platform>(&mut self, hw: &mut P, index: i16, value: i16) -> i16 {
        let reg = ST_PALETTE_REGS + 2 * (index & 0x000f) as u32;
        let old = hw.read16(reg) & self.palette_mask();
        if value >= 0 {
            hw.write16(reg, value as u16);
        }
        old as i16
    }

    fn set_palette<P: Platform>(&mut self, hw: &mut P, palette: PaletteSource<'_>) {
        match palette {
            PaletteSource::Compat(words) => {
                let mask = self.palette_mask();
                for (i, word) in words.iter().enumerate() {
                    hw.write16(ST_PALETTE_REGS + 2 * i as u32, word & mask);
                }
            }
            PaletteSource::Lookup(entries) => {
                let entries = &entries[..entries.len().min(LOOKUP_ENTRIES)];
                for (i, xrgb) in entries.iter().enumerate() {
                    let color = RgbColor::from_xrgb(*xrgb);
                    match self.model {
                        AtariModel::Falcon => {
                            hw.write32(FALCON_PALETTE_REGS + 4 * i as u32, color.to_falcon());
                        }
                        AtariModel::Tt => {
                            hw.write16(TT_PALETTE_REGS + 2 * i as u32, color.to_tt());
                        }
                        AtariModel::St | AtariModel::Ste if i < 16 => {
                            let word = color.to_ste() & self.palette_mask();
                            hw.write16(ST_PALETTE_REGS + 2 * i as u32, word);
                        }
                        AtariModel::St | AtariModel::Ste => break,
                    }
                }
            }
        }
    }

    fn detect_monitor_change<P: Platform>(&mut self, hw: &mut P, default_rez: i16) -> bool {
        // the Videl has no auto-switch
        if self.is_falcon() {
            return false;
        }

        let monitor = self.monitor_type(hw);
        let port = self.port();
        let current = port.read_rez(&*hw);
        let Some(target) = shifter::auto_switch_target(&port, current, monitor, default_rez) else {
            return false;
        };

        log::debug!("monitor changed: rez {} -> {}", current, target);
        port.write_rez_bits(hw, target);
        self.shift_mode = target;
        DIAGNOSTICS.record_monitor_switch();
        true
    }
}

impl ModeSwitch for AtariScreen {
    fn plan<P: Platform>(
        &mut self,
        hw: &mut P,
        rez: i16,
        mode: i16,
    ) -> core::result::Result<ModePlan, ConfigError> {
        if self.is_falcon() {
            self.plan_videl(&*hw, rez, mode)
        } else {
            self.plan_shifter(&*hw, rez)
        }
    }

    fn vbl_settle_frames(&self) -> u8 {
        if self.is_falcon() { 0 } else { 1 }
    }

    fn previous_mode(&self, plan: &ModePlan) -> i16 {
        if self.is_falcon() && plan.rez == FALCON_REZ {
            self.videl.current().bits() as i16
        } else {
            0
        }
    }

    fn program<P: Platform>(&mut self, hw: &mut P, plan: &ModePlan) {
        if self.is_falcon() {
            let mode = plan.mode.map(VidelMode::from_raw).unwrap_or(self.videl.current());
            self.videl.program(hw, mode);
            self.shift_mode = mode.rez();
            // TOS 4 re-initialises the palette on every Videl mode change
            shifter::init_falcon_palette(hw);
            return;
        }

        self.port().write_rez(hw, plan.rez);
        self.shift_mode = plan.rez;
    }
}
