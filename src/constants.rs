// src/constants.rs

//! Legacy encodings shared by every driver
//!
//! These values are part of the XBIOS contract; programs compare against
//! them directly, so they must never change.

// Resolution indices (Getrez / Setscreen)
pub const ST_LOW: i16 = 0;
pub const ST_MEDIUM: i16 = 1;
pub const ST_HIGH: i16 = 2;
/// Falcon: the mode is described by a Videl mode value instead.
pub const FALCON_REZ: i16 = 3;
pub const TT_MEDIUM: i16 = 4;
pub const TT_HIGH: i16 = 6;
pub const TT_LOW: i16 = 7;

pub const MIN_REZ: i16 = ST_LOW;
pub const MAX_REZ: i16 = TT_LOW;

/// Setscreen / Setcolor / Vsetmode "leave unchanged" sentinel.
pub const UNCHANGED: i16 = -1;

/// Bytes allocated past the end of the frame buffer, as TOS does.
pub const EXTRA_VRAM_SIZE: u32 = 256;

/// Minimum Falcon frame buffer (640x480 at 8 bpp).
pub const FALCON_VRAM_SIZE: u32 = 307_200;

/// ST TOS allocates at least this much past the end of the screen.
pub const ST_VRAM_SLACK: u32 = 768;

/// ST frame buffers are a multiple of this.
pub const ST_VRAM_ALIGN: u32 = 256;

/// Physical address the Videl is parked at during boot.
pub const VIDEL_BOOT_PHYS: u32 = 0x0001_0000;

// Default palette, 0x0RGB with 4 bits per component
pub const RGB_BLACK: u16 = 0x0000;
pub const RGB_BLUE: u16 = 0x000f;
pub const RGB_GREEN: u16 = 0x00f0;
pub const RGB_CYAN: u16 = 0x00ff;
pub const RGB_RED: u16 = 0x0f00;
pub const RGB_MAGENTA: u16 = 0x0f0f;
pub const RGB_LTGRAY: u16 = 0x0555;
pub const RGB_GRAY: u16 = 0x0333;
pub const RGB_LTBLUE: u16 = 0x033f;
pub const RGB_LTGREEN: u16 = 0x03f3;
pub const RGB_LTCYAN: u16 = 0x03ff;
pub const RGB_LTRED: u16 = 0x0f33;
pub const RGB_LTMAGENTA: u16 = 0x0f3f;
pub const RGB_YELLOW: u16 = 0x0ff0;
pub const RGB_LTYELLOW: u16 = 0x0ff3;
pub const RGB_WHITE: u16 = 0x0fff;

/// Boot palette; index 0 is the background, 15 the foreground.
pub const DEFAULT_PALETTE: [u16; 16] = [
    RGB_WHITE,
    RGB_RED,
    RGB_GREEN,
    RGB_YELLOW,
    RGB_BLUE,
    RGB_MAGENTA,
    RGB_CYAN,
    RGB_LTGRAY,
    RGB_GRAY,
    RGB_LTRED,
    RGB_LTGREEN,
    RGB_LTYELLOW,
    RGB_LTBLUE,
    RGB_LTMAGENTA,
    RGB_LTCYAN,
    RGB_BLACK,
];

/// Palette mask on a plain ST (3 bits per component).
pub const ST_PALETTE_MASK: u16 = 0x0777;
/// Palette mask on STe and later (4 bits per component).
pub const STE_PALETTE_MASK: u16 = 0x0fff;

/// Entries in the large lookup tables (TT, Videl, VICKY).
pub const LOOKUP_ENTRIES: usize = 256;
