// src/screen/vram.rs

//! Video RAM ownership record

use crate::constants::{EXTRA_VRAM_SIZE, ST_VRAM_ALIGN, ST_VRAM_SLACK};

/// Size of the frame buffer block.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VramSize {
    /// Address fixed by the board; size never computed
    Unspecified,
    Bytes(u32),
}

/// Where the frame buffer came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VramOrigin {
    /// Board-mandated address
    Fixed,
    /// Carved from the top of ST-RAM
    Allocated,
}

/// The frame buffer owned by the screen layer.
///
/// A resize replaces the whole record; the previous block is dead as soon
/// as the new one is committed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VideoRamRegion {
    pub base: u32,
    pub size: VramSize,
    pub origin: VramOrigin,
}

impl VideoRamRegion {
    pub const fn fixed(base: u32) -> Self {
        Self {
            base,
            size: VramSize::Unspecified,
            origin: VramOrigin::Fixed,
        }
    }

    pub const fn allocated(base: u32, size: u32) -> Self {
        Self {
            base,
            size: VramSize::Bytes(size),
            origin: VramOrigin::Allocated,
        }
    }

    /// Legacy `video_ram_size`: `-1` when unspecified.
    pub const fn legacy_size(&self) -> i32 {
        match self.size {
            VramSize::Unspecified => -1,
            VramSize::Bytes(n) => n as i32,
        }
    }
}

/// Frame bytes plus the fixed TT/Falcon/VICKY over-allocation.
#[inline]
pub const fn with_extra(frame_bytes: u32) -> u32 {
    frame_bytes + EXTRA_VRAM_SIZE
}

/// ST rule: at least 768 bytes of slack, rounded to 256 bytes so a block
/// taken from the top of memory starts on a shifter-legal boundary.
#[inline]
pub const fn st_rounded(frame_bytes: u32) -> u32 {
    (frame_bytes + ST_VRAM_SLACK + ST_VRAM_ALIGN - 1) & !(ST_VRAM_ALIGN - 1)
}
