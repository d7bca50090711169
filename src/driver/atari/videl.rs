// src/driver/atari/videl.rs

//! Falcon Videl: mode values, monitor adaptation and programming

use super::regs::{FALCON_MONITOR, ST_SHIFTER, VIDEL_LINE_WIDTH, VIDEL_SPSHIFT, VIDEL_VCO};
use crate::constants::{FALCON_REZ, ST_HIGH, ST_LOW, ST_MEDIUM};
use crate::hal::Platform;
use crate::screen::mode::{Geometry, MonitorType};

bitflags::bitflags! {
    /// Vsetmode mode word.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct VidelMode: u16 {
        /// Depth code, see [`VidelMode::bits_per_pixel`]
        const BPP_MASK = 0x0007;
        /// 640 pixels wide instead of 320
        const COL80    = 0x0008;
        const VGA      = 0x0010;
        const PAL      = 0x0020;
        const OVERSCAN = 0x0040;
        /// ST compatible mode
        const COMPAT   = 0x0080;
        /// Line doubling on VGA, interlace otherwise
        const VERTICAL = 0x0100;
    }
}

const DEPTH_1BPP: u16 = 0;
const DEPTH_2BPP: u16 = 1;
const DEPTH_4BPP: u16 = 2;
const DEPTH_8BPP: u16 = 3;
const DEPTH_16BPP: u16 = 4;

impl VidelMode {
    /// The only mode a real ST monochrome monitor can show.
    pub const FALCON_ST_HIGH: Self = Self::COMPAT.union(Self::COL80);

    /// 640x480, 16 colours, VGA.
    pub const FALCON_DEFAULT_BOOT: Self = Self::from_bits_retain(
        Self::VGA.bits() | Self::COL80.bits() | DEPTH_4BPP,
    );

    pub const fn from_raw(raw: u16) -> Self {
        Self::from_bits_retain(raw)
    }

    pub const fn depth_code(self) -> u16 {
        self.bits() & Self::BPP_MASK.bits()
    }

    const fn with_depth(self, code: u16) -> Self {
        Self::from_bits_retain((self.bits() & !Self::BPP_MASK.bits()) | code)
    }

    pub const fn bits_per_pixel(self) -> Option<u16> {
        match self.depth_code() {
            DEPTH_1BPP => Some(1),
            DEPTH_2BPP => Some(2),
            DEPTH_4BPP => Some(4),
            DEPTH_8BPP => Some(8),
            DEPTH_16BPP => Some(16),
            _ => None,
        }
    }

    /// Compatible mode for an ST resolution index.
    pub const fn for_st_rez(rez: i16) -> Option<Self> {
        match rez {
            ST_LOW => Some(Self::COMPAT.with_depth(DEPTH_4BPP)),
            ST_MEDIUM => Some(Self::COMPAT.union(Self::COL80).with_depth(DEPTH_2BPP)),
            ST_HIGH => Some(Self::FALCON_ST_HIGH),
            _ => None,
        }
    }

    /// Getrez for this mode.
    pub const fn rez(self) -> i16 {
        if !self.contains(Self::COMPAT) {
            return FALCON_REZ;
        }
        match self.depth_code() {
            DEPTH_1BPP => ST_HIGH,
            DEPTH_2BPP => ST_MEDIUM,
            DEPTH_4BPP => ST_LOW,
            _ => FALCON_REZ,
        }
    }

    pub fn geometry(self) -> Option<Geometry> {
        let bpp = self.bits_per_pixel()?;
        let mut width: u16 = if self.contains(Self::COL80) { 640 } else { 320 };
        let mut height: u16 = if self.contains(Self::COMPAT) {
            if bpp == 1 { 400 } else { 200 }
        } else if self.contains(Self::VGA) {
            if self.contains(Self::VERTICAL) { 240 } else { 480 }
        } else if self.contains(Self::VERTICAL) {
            400
        } else {
            200
        };
        if self.contains(Self::OVERSCAN) {
            width = width * 6 / 5;
            height = height * 6 / 5;
        }
        Some(Geometry::new(bpp, width, height))
    }

    /// Can the Videl generate this mode at all?
    pub fn is_supported(self) -> bool {
        match self.depth_code() {
            DEPTH_16BPP => !(self.contains(Self::COL80) && self.contains(Self::VGA)),
            DEPTH_1BPP => self.contains(Self::COL80),
            code => code <= DEPTH_8BPP,
        }
    }

    /// VgetSize: bytes of one frame, `None` when unsupported.
    pub fn frame_bytes(self) -> Option<u32> {
        if !self.is_supported() {
            return None;
        }
        let g = self.geometry()?;
        Some(u32::from(g.width) * u32::from(g.height) * u32::from(g.planes) / 8)
    }

    /// Vfixmode: adapt a mode to the attached monitor.
    ///
    /// The PAL bit always follows the mode currently programmed.
    pub fn fixed_for(self, monitor: MonitorType, current: VidelMode) -> Self {
        if monitor == MonitorType::Mono {
            return Self::FALCON_ST_HIGH;
        }

        let mut mode = self.difference(Self::PAL) | (current & Self::PAL);
        let one_bpp = mode.depth_code() == DEPTH_1BPP;

        if monitor == MonitorType::Vga {
            mode.remove(Self::OVERSCAN);
            mode.insert(Self::VGA);
            if mode.contains(Self::COMPAT) {
                // double the lines of 200-line modes
                mode.set(Self::VERTICAL, !one_bpp);
            }
        } else {
            mode.remove(Self::VGA);
            if mode.contains(Self::COMPAT) {
                // interlace ST high
                mode.set(Self::VERTICAL, one_bpp);
            }
        }
        mode
    }

    fn spshift(self) -> u16 {
        match self.depth_code() {
            DEPTH_1BPP => 0x0400,
            DEPTH_8BPP => 0x0010,
            DEPTH_16BPP => 0x0100,
            _ => 0x0000,
        }
    }

    fn vco(self) -> u16 {
        let vga = self.contains(Self::VGA);
        let mut vco = if vga { 0x0008 } else { 0x0000 };
        if self.contains(Self::COL80) {
            vco |= 0x0004;
        }
        if self.contains(Self::VERTICAL) {
            vco |= if vga { 0x0001 } else { 0x0002 };
        }
        vco
    }
}

/// Videl with a shadow of the last programmed mode (the hardware
/// registers cannot be read back as a mode word).
#[derive(Debug, Clone, Copy)]
pub struct Videl {
    current: VidelMode,
}

impl Videl {
    pub const fn new(mode: VidelMode) -> Self {
        Self { current: mode }
    }

    pub fn current(&self) -> VidelMode {
        self.current
    }

    /// Remember `mode` as current without programming it (needed before
    /// fixing the boot mode so the PAL bit is inherited).
    pub(crate) fn assume(&mut self, mode: VidelMode) {
        self.current = mode;
    }

    /// VgetMonitor
    pub fn monitor<P: Platform>(hw: &P) -> MonitorType {
        MonitorType::from_code(i16::from((hw.read8(FALCON_MONITOR) >> 6) & 0x03))
    }

    pub fn fix<P: Platform>(&self, hw: &P, mode: VidelMode) -> VidelMode {
        mode.fixed_for(Self::monitor(hw), self.current)
    }

    /// Program `mode`; the caller has checked that it is supported.
    pub fn program<P: Platform>(&mut self, hw: &mut P, mode: VidelMode) {
        let Some(geometry) = mode.geometry() else {
            log::warn!("videl: refusing to program mode {:#06x}", mode.bits());
            return;
        };

        // the ST shift register must be written before SPSHIFT
        let st_shift = if mode.depth_code() == DEPTH_2BPP { 1 } else { 0 };
        hw.write8(ST_SHIFTER, st_shift);
        hw.write16(VIDEL_SPSHIFT, mode.spshift());
        hw.write16(VIDEL_LINE_WIDTH, geometry.width * geometry.planes / 16);
        hw.write16(VIDEL_VCO, mode.vco());

        log::debug!("videl: mode {:#06x} ({}x{}x{})", mode.bits(), geometry.width, geometry.height, geometry.planes);
        self.current = mode;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hal::StubBoard;
    use crate::hal::RegisterBus;

    #[test]
    fn well_known_mode_words() {
        assert_eq!(VidelMode::FALCON_ST_HIGH.bits(), 0x0088);
        assert_eq!(VidelMode::FALCON_DEFAULT_BOOT.bits(), 0x001a);
        assert_eq!(VidelMode::for_st_rez(ST_LOW).map(|m| m.bits()), Some(0x0082));
        assert_eq!(VidelMode::for_st_rez(ST_MEDIUM).map(|m| m.bits()), Some(0x0089));
        assert_eq!(VidelMode::for_st_rez(FALCON_REZ), None);
    }

    #[test]
    fn geometry_follows_flags() {
        assert_eq!(VidelMode::FALCON_DEFAULT_BOOT.geometry(), Some(Geometry::new(4, 640, 480)));
        assert_eq!(VidelMode::FALCON_ST_HIGH.geometry(), Some(Geometry::new(1, 640, 400)));
        let tv_interlaced = VidelMode::from_raw(0x0100 | 0x0008 | DEPTH_8BPP);
        assert_eq!(tv_interlaced.geometry(), Some(Geometry::new(8, 640, 400)));
        let vga_doubled = VidelMode::from_raw(0x0100 | 0x0010 | DEPTH_16BPP);
        assert_eq!(vga_doubled.geometry(), Some(Geometry::new(16, 320, 240)));
        let overscan = VidelMode::from_raw(0x0040 | 0x0008 | DEPTH_4BPP);
        assert_eq!(overscan.geometry(), Some(Geometry::new(4, 768, 240)));
        assert_eq!(VidelMode::from_raw(0x0007).geometry(), None);
    }

    #[test]
    fn unsupported_combinations() {
        // true colour at 640 columns on VGA
        assert!(!VidelMode::from_raw(0x0018 | DEPTH_16BPP).is_supported());
        // one plane at 320 columns
        assert!(!VidelMode::from_raw(0x0010).is_supported());
        assert!(!VidelMode::from_raw(0x0005).is_supported());
        assert_eq!(VidelMode::from_raw(0x0005).frame_bytes(), None);
        assert!(VidelMode::FALCON_DEFAULT_BOOT.is_supported());
    }

    #[test]
    fn frame_bytes_of_default_boot_mode() {
        assert_eq!(VidelMode::FALCON_DEFAULT_BOOT.frame_bytes(), Some(153_600));
    }

    #[test]
    fn mono_monitor_forces_st_high() {
        let fixed = VidelMode::FALCON_DEFAULT_BOOT.fixed_for(MonitorType::Mono, VidelMode::empty());
        assert_eq!(fixed, VidelMode::FALCON_ST_HIGH);
    }

    #[test]
    fn vga_fix_clears_overscan_and_doubles_compat_lines() {
        let st_low = VidelMode::for_st_rez(ST_LOW).unwrap_or(VidelMode::empty());
        let fixed = (st_low | VidelMode::OVERSCAN).fixed_for(MonitorType::Vga, VidelMode::PAL);
        assert!(fixed.contains(VidelMode::VGA | VidelMode::VERTICAL | VidelMode::PAL));
        assert!(!fixed.contains(VidelMode::OVERSCAN));
    }

    #[test]
    fn rgb_fix_interlaces_compat_mono() {
        let fixed = VidelMode::from_raw(0x0018 | 0x0080).fixed_for(MonitorType::Color, VidelMode::empty());
        assert!(!fixed.contains(VidelMode::VGA));
        assert!(fixed.contains(VidelMode::VERTICAL));
        assert!(!fixed.contains(VidelMode::PAL));
    }

    #[test]
    fn getrez_maps_compat_modes() {
        assert_eq!(VidelMode::FALCON_ST_HIGH.rez(), ST_HIGH);
        assert_eq!(VidelMode::from_raw(0x0082).rez(), ST_LOW);
        assert_eq!(VidelMode::FALCON_DEFAULT_BOOT.rez(), FALCON_REZ);
    }

    #[test]
    fn program_writes_registers_and_shadow() {
        let mut board = StubBoard::atari();
        let mut videl = Videl::new(VidelMode::empty());
        videl.program(&mut board, VidelMode::FALCON_DEFAULT_BOOT);

        assert_eq!(board.read8(ST_SHIFTER), 0);
        assert_eq!(board.read16(VIDEL_SPSHIFT), 0x0000);
        assert_eq!(board.read16(VIDEL_LINE_WIDTH), 160);
        assert_eq!(board.read16(VIDEL_VCO), 0x000c);
        assert_eq!(videl.current(), VidelMode::FALCON_DEFAULT_BOOT);
    }

    #[test]
    fn monitor_code_is_in_bits_7_6() {
        let mut board = StubBoard::atari();
        board.poke8(FALCON_MONITOR, 0x80);
        assert_eq!(Videl::monitor(&board), MonitorType::Vga);
        board.poke8(FALCON_MONITOR, 0x3f);
        assert_eq!(Videl::monitor(&board), MonitorType::Mono);
    }
}
