// src/screen/palette.rs

//! Colour formats and palette requests
//!
//! Callers speak two formats: the 16-entry STe word (`0x0RGB`, 4 bits per
//! component with the STe's rotated bit order) and the generic
//! `0x00RRGGBB` long used by the large lookup tables. Drivers convert to
//! whatever their registers hold.

/// 24-bit colour.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RgbColor {
    /// Red component (0-255)
    pub r: u8,
    /// Green component (0-255)
    pub g: u8,
    /// Blue component (0-255)
    pub b: u8,
}

/// STe components store the LSB in bit 3: `r0 r3 r2 r1`.
#[inline]
const fn ste_nibble_to_level(nibble: u16) -> u8 {
    (((nibble & 7) << 1) | ((nibble >> 3) & 1)) as u8
}

#[inline]
const fn level_to_ste_nibble(level: u8) -> u16 {
    let level = (level & 0x0f) as u16;
    (level >> 1) | ((level & 1) << 3)
}

impl RgbColor {
    #[must_use]
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Decode an STe palette word.
    #[must_use]
    pub const fn from_ste(word: u16) -> Self {
        Self {
            r: ste_nibble_to_level((word >> 8) & 0x0f) * 17,
            g: ste_nibble_to_level((word >> 4) & 0x0f) * 17,
            b: ste_nibble_to_level(word & 0x0f) * 17,
        }
    }

    /// Encode as an STe palette word, dropping the low 4 bits of each component.
    #[must_use]
    pub const fn to_ste(self) -> u16 {
        (level_to_ste_nibble(self.r >> 4) << 8)
            | (level_to_ste_nibble(self.g >> 4) << 4)
            | level_to_ste_nibble(self.b >> 4)
    }

    /// `0x00RRGGBB`; the top byte is ignored.
    #[must_use]
    pub const fn from_xrgb(value: u32) -> Self {
        Self {
            r: (value >> 16) as u8,
            g: (value >> 8) as u8,
            b: value as u8,
        }
    }

    #[must_use]
    pub const fn to_xrgb(self) -> u32 {
        ((self.r as u32) << 16) | ((self.g as u32) << 8) | self.b as u32
    }

    /// Videl palette register: `RRRRRR00 GGGGGG00 00000000 BBBBBB00`.
    #[must_use]
    pub const fn to_falcon(self) -> u32 {
        (((self.r >> 2) as u32) << 26) | (((self.g >> 2) as u32) << 18) | (((self.b >> 2) as u32) << 2)
    }

    /// TT palette register: plain `0x0RGB`.
    #[must_use]
    pub const fn to_tt(self) -> u16 {
        (((self.r >> 4) as u16) << 8) | (((self.g >> 4) as u16) << 4) | (self.b >> 4) as u16
    }
}

/// Palette handed to a driver's writer.
#[derive(Debug, Clone, Copy)]
pub enum PaletteSource<'a> {
    /// 16 STe words for the small register set
    Compat(&'a [u16; 16]),
    /// Generic `0x00RRGGBB` entries for the lookup table, starting at entry 0
    Lookup(&'a [u32]),
}

/// A palette update waiting for the next vertical blank.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PaletteRequest {
    /// Load the 16 compatible registers
    Compat(&'static [u16; 16]),
    /// Load the first 16 lookup-table entries
    Lookup16(&'static [u32; 16]),
    /// Load the whole lookup table from the shadow kept by `set_rgb`
    LookupShadow,
}
