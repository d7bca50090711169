// src/screen/mod.rs

//! Screen front end
//!
//! [`Screen`] is what the rest of the OS talks to. It owns the active
//! driver, the board and the shared [`ScreenState`], and adds the three
//! protocols that are the same on every chipset: boot-time video RAM
//! setup, the deferred palette and the per-blank work. Everything else is
//! a thin forwarder to the driver.

pub mod config;
pub mod mode;
pub mod palette;
pub mod setscreen;
pub mod state;
pub mod vram;


use crate::constants::LOOKUP_ENTRIES;
use crate::diagnostics::DIAGNOSTICS;
use crate::driver::{ActiveDriver, ScreenDriver, ScreenRequest};
use crate::errors::{ResourceError, Result, ScreenError};
use crate::hal::Platform;
use crate::sync::PaletteMailbox;

use config::ScreenConfig;
use mode::{Geometry, ModeCode, MonitorType, PixelSize, VideoMode};
use palette::{PaletteRequest, PaletteSource};
use state::{MonitorChangeHook, ScreenState};
use vram::VideoRamRegion;

/// Screen of the driver selected at build time.
pub type ActiveScreen<P> = Screen<ActiveDriver, P>;

/// The screen layer of one machine.
#[derive(Debug)]
pub struct Screen<D, P> {
    driver: D,
    hw: P,
    state: ScreenState,
    mailbox: PaletteMailbox,
    fixed_vram_address: Option<u32>,
}

impl<D: ScreenDriver, P: Platform> Screen<D, P> {
    pub fn new(config: &ScreenConfig, hw: P) -> Self {
        Self {
            driver: D::from_config(config),
            hw,
            state: ScreenState::new(config.default_rez),
            mailbox: PaletteMailbox::new(),
            fixed_vram_address: config.fixed_vram_address,
        }
    }

    /// Boot-time initialisation.
    ///
    /// Programs the initial mode, closes the VBL gate and sets up video
    /// RAM. An allocation failure here is fatal for the boot.
    pub fn init(&mut self) -> Result<()> {
        log::debug!("screen init: {}", self.driver.name());
        self.driver.init(&mut self.hw, &mut self.state);

        self.state.hacked = false;
        self.state.hacked_geometry = None;
        self.state.vblsem = 0;

        self.setup_video_ram()
    }

    fn setup_video_ram(&mut self) -> Result<()> {
        let region = match self.fixed_vram_address {
            Some(base) => VideoRamRegion::fixed(base),
            None => {
                let size = self.driver.calc_vram_size(&self.hw);
                match self.hw.allocate_from_top(size, true) {
                    Some(base) => {
                        DIAGNOSTICS.record_vram_allocation(true);
                        VideoRamRegion::allocated(base, size)
                    }
                    None => {
                        DIAGNOSTICS.record_vram_allocation(false);
                        log::error!("cannot allocate {} bytes of screen memory", size);
                        return Err(ScreenError::from(ResourceError::VideoRamExhausted { requested: size }));
                    }
                }
            }
        };

        log::debug!("video RAM at {:#010x}, size {}", region.base, region.legacy_size());
        self.state.vram = Some(region);
        self.state.logical_base = region.base;
        self.driver.set_phys_address(&mut self.hw, region.base);
        Ok(())
    }

    /// Open the VBL gate once the rest of the OS is ready.
    pub fn enable_vbl_processing(&mut self) {
        self.state.vblsem = 1;
    }

    // ---- resolution and mode ----

    /// Desktop-settings check: the code to switch to, or `0` when nothing
    /// needs to change. `-1` on a meaningless or unsupported code.
    pub fn request_mode_change(&mut self, raw: i16) -> i16 {
        if !self.can_change_resolution() {
            return 0;
        }

        let checked = ModeCode::decode(raw)
            .and_then(|code| self.driver.check_mode_change(&mut self.hw, code));
        match checked {
            Ok(change) => change.to_legacy(),
            Err(err) => {
                DIAGNOSTICS.record_rejected_request();
                log::debug!("mode change {:#06x} rejected: {}", raw, err);
                ScreenError::from(err).to_legacy()
            }
        }
    }

    pub fn can_change_resolution(&mut self) -> bool {
        !self.state.hacked && self.driver.can_change_resolution(&mut self.hw)
    }

    /// Getrez
    pub fn current_resolution(&self) -> i16 {
        self.driver.current_rez(&self.hw)
    }

    pub fn current_mode(&self) -> VideoMode {
        self.driver.current_mode_info(&self.hw)
    }

    /// Setscreen; returns the previous mode value (or 0).
    pub fn set_screen(&mut self, request: ScreenRequest) -> Result<i16> {
        self.driver.set_screen(&mut self.hw, &mut self.state, request)
    }

    /// Setscreen with the legacy `-1` error encoding.
    pub fn set_screen_legacy(&mut self, request: ScreenRequest) -> i16 {
        self.set_screen(request).unwrap_or_else(ScreenError::to_legacy)
    }

    /// Vsetmode. A hacked screen only reports.
    pub fn set_video_mode(&mut self, mode: i16) -> Result<i16> {
        let mode = if self.state.hacked { -1 } else { mode };
        self.driver.set_video_mode(&mut self.hw, mode)
    }

    /// An emulator or add-on took over the screen with `geometry`.
    ///
    /// Resolution changes are refused for the rest of the session.
    pub fn mark_resolution_hacked(&mut self, geometry: Geometry) {
        log::debug!(
            "resolution hacked: {} planes, {}x{}",
            geometry.planes,
            geometry.width,
            geometry.height
        );
        self.state.mark_hacked(geometry);
        setscreen::reinit_services(&mut self.hw, &mut self.state, geometry);
    }

    pub fn is_resolution_hacked(&self) -> bool {
        self.state.is_hacked()
    }

    /// Resync the console with the mode actually displayed.
    pub fn reinit_services_from_mode_info(&mut self) {
        let geometry = self.effective_geometry();
        setscreen::reinit_services(&mut self.hw, &mut self.state, geometry);
    }

    fn effective_geometry(&self) -> Geometry {
        self.state
            .hacked_geometry
            .unwrap_or_else(|| self.driver.current_mode_info(&self.hw).geometry)
    }

    // ---- addresses and memory ----

    pub fn calc_vram_size(&self) -> u32 {
        self.driver.calc_vram_size(&self.hw)
    }

    pub fn physical_base(&self) -> u32 {
        self.driver.phys_base(&self.hw, &self.state)
    }

    pub fn set_physical_base(&mut self, address: u32) {
        self.driver.set_phys_address(&mut self.hw, address);
    }

    pub fn logical_base(&self) -> u32 {
        self.state.logical_base()
    }

    pub fn video_ram(&self) -> Option<VideoRamRegion> {
        self.state.video_ram()
    }

    // ---- display information ----

    pub fn initialise_palette_registers(&mut self, rez: i16, mode: i16) {
        self.driver.init_palette_registers(&mut self.hw, rez, mode);
    }

    /// VgetMonitor; sensed again on every call.
    pub fn monitor_type(&mut self) -> MonitorType {
        self.driver.monitor_type(&mut self.hw)
    }

    pub fn color_depth(&self) -> u16 {
        self.driver.color_depth(&self.hw)
    }

    pub fn pixel_size(&self) -> PixelSize {
        self.driver.pixel_size(self.effective_geometry())
    }

    // ---- palette ----

    /// Setcolor: immediate, `value < 0` only reads.
    pub fn set_color(&mut self, index: i16, value: i16) -> i16 {
        self.driver.set_color(&mut self.hw, index, value)
    }

    /// Setpalette: applied at the next blank. A later request replaces an
    /// earlier one that has not been applied yet.
    pub fn request_palette_update(&self, request: PaletteRequest) {
        let superseded = self.mailbox.post(request);
        DIAGNOSTICS.record_palette_request(superseded);
        if superseded {
            log::debug!("pending palette replaced before the blank");
        }
    }

    pub fn clear_palette_request(&self) {
        self.mailbox.clear();
    }

    pub fn palette_pending(&self) -> bool {
        self.mailbox.is_pending()
    }

    /// VsetRGB: store `0x00RRGGBB` colours from entry `first` on and load
    /// the whole table at the next blank.
    pub fn set_rgb(&mut self, first: usize, colors: &[u32]) {
        let start = first.min(LOOKUP_ENTRIES);
        for (slot, color) in self.state.shadow_lut[start..].iter_mut().zip(colors) {
            *slot = color & 0x00ff_ffff;
        }
        self.request_palette_update(PaletteRequest::LookupShadow);
    }

    /// VgetRGB: read back the shadow table.
    pub fn get_rgb(&self, first: usize, colors: &mut [u32]) {
        let start = first.min(LOOKUP_ENTRIES);
        for (color, slot) in colors.iter_mut().zip(&self.state.shadow_lut[start..]) {
            *color = *slot;
        }
    }

    // ---- vertical blank ----

    pub fn wait_for_next_vertical_blank(&mut self) -> Result<()> {
        setscreen::vsync(&mut self.hw).map_err(ScreenError::from)
    }

    /// Per-blank work, called from the VBL handler.
    ///
    /// Returns false when VBL processing is gated off; nothing is done then
    /// and a pending palette waits for a later blank.
    pub fn vertical_blank(&mut self) -> bool {
        if !self.state.vbl_enabled() {
            return false;
        }

        if let Some(request) = self.mailbox.take() {
            self.apply_palette(request);
        }

        if self.driver.detect_monitor_change(&mut self.hw, self.state.default_rez) {
            match self.state.monitor_hook {
                Some(hook) => hook(),
                None => self.hw.restart(),
            }
        }
        true
    }

    fn apply_palette(&mut self, request: PaletteRequest) {
        let source = match request {
            PaletteRequest::Compat(words) => PaletteSource::Compat(words),
            PaletteRequest::Lookup16(entries) => PaletteSource::Lookup(entries),
            PaletteRequest::LookupShadow => PaletteSource::Lookup(&self.state.shadow_lut),
        };
        self.driver.set_palette(&mut self.hw, source);
        DIAGNOSTICS.record_palette_applied();
    }

    /// Replace the action run after a monitor auto-switch; `None` restores
    /// the system restart. Returns the previous hook.
    pub fn set_monitor_change_hook(
        &mut self,
        hook: Option<MonitorChangeHook>,
    ) -> Option<MonitorChangeHook> {
        core::mem::replace(&mut self.state.monitor_hook, hook)
    }

    // ---- accessors ----

    pub fn driver(&self) -> &D {
        &self.driver
    }

    pub fn platform(&self) -> &P {
        &self.hw
    }

    pub fn platform_mut(&mut self) -> &mut P {
        &mut self.hw
    }

    pub fn state(&self) -> &ScreenState {
        &self.state
    }
}
