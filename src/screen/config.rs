// src/screen/config.rs

//! Board configuration
//!
//! Everything the screen layer would otherwise learn from build macros,
//! the OS header or NVRAM.

use crate::constants::ST_LOW;

/// Which Atari video chipset is fitted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AtariModel {
    /// Original shifter, 3-bit palette, 16-bit video base
    St,
    /// Enhanced shifter, 4-bit palette, fine scroll
    Ste,
    /// TT shifter with the 256-entry palette
    Tt,
    /// Videl
    Falcon,
}

impl AtariModel {
    /// Palette components have 4 bits and the video base has a low byte.
    pub const fn is_enhanced(self) -> bool {
        !matches!(self, AtariModel::St)
    }
}

/// Atari-specific settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AtariConfig {
    pub model: AtariModel,
    /// DMA sound is fitted; its "playing" bit is XORed into the mono sense line
    pub dma_sound: bool,
    /// Boot video mode stored in NVRAM (Falcon only)
    pub boot_video_mode: Option<u16>,
    /// Screen memory of an add-on display adapter in use
    pub aux_display_base: Option<u32>,
}

impl AtariConfig {
    pub const fn new(model: AtariModel) -> Self {
        Self {
            model,
            dma_sound: !matches!(model, AtariModel::St),
            boot_video_mode: None,
            aux_display_base: None,
        }
    }
}

/// VICKY II channel placement.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Vicky2Layout {
    /// Register block (master control at offset 0)
    pub registers: u32,
    /// Start of video RAM as seen by the CPU
    pub vram: u32,
    /// Bytes of video RAM addressable by the bitmap engine
    pub vram_size: u32,
}

impl Vicky2Layout {
    /// A2560U channel A.
    pub const A2560U: Self = Self {
        registers: 0x00B4_0000,
        vram: 0x00C0_0000,
        vram_size: 0x0020_0000,
    };
}

/// Screen layer configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScreenConfig {
    /// Board-mandated frame buffer; skips allocation at boot
    pub fixed_vram_address: Option<u32>,
    /// Shifter mode the monitor auto-switch falls back to
    pub default_rez: i16,
    /// 50 Hz sync on ST/STe
    pub pal: bool,
    /// Wait a second VBL at boot for the GLUE to settle after a reset
    pub settle_after_reset: bool,
    pub atari: AtariConfig,
    pub vicky2: Vicky2Layout,
}

impl ScreenConfig {
    const fn atari(model: AtariModel) -> Self {
        Self {
            fixed_vram_address: None,
            default_rez: ST_LOW,
            pal: true,
            settle_after_reset: true,
            atari: AtariConfig::new(model),
            vicky2: Vicky2Layout::A2560U,
        }
    }

    pub const fn atari_st() -> Self {
        Self::atari(AtariModel::St)
    }

    pub const fn atari_ste() -> Self {
        Self::atari(AtariModel::Ste)
    }

    pub const fn atari_tt() -> Self {
        Self::atari(AtariModel::Tt)
    }

    pub const fn atari_falcon() -> Self {
        Self::atari(AtariModel::Falcon)
    }

    /// VICKY II: the frame buffer lives at the start of its own VRAM.
    pub const fn a2560u() -> Self {
        Self {
            fixed_vram_address: Some(Vicky2Layout::A2560U.vram),
            ..Self::atari(AtariModel::St)
        }
    }

    pub const fn a2560m() -> Self {
        Self::atari(AtariModel::St)
    }

    pub const fn with_fixed_vram(mut self, address: u32) -> Self {
        self.fixed_vram_address = Some(address);
        self
    }

    pub const fn with_default_rez(mut self, rez: i16) -> Self {
        self.default_rez = rez;
        self
    }
}

impl Default for ScreenConfig {
    #[cfg(feature = "machine-a2560m")]
    fn default() -> Self {
        Self::a2560m()
    }

    #[cfg(all(feature = "machine-a2560u", not(feature = "machine-a2560m")))]
    fn default() -> Self {
        Self::a2560u()
    }

    #[cfg(not(any(feature = "machine-a2560u", feature = "machine-a2560m")))]
    fn default() -> Self {
        Self::atari_ste()
    }
}
