// src/hal/platform.rs

//! Platform seams consumed by the screen layer
//!
//! Everything outside the video subsystem reaches us through one of these
//! traits: raw register access, the VBL frame counter, interrupt masking,
//! the ST-RAM allocator, the console that owns text geometry, and the
//! system restart vector. A board implements all of them and gets
//! [`Platform`] for free.

use crate::screen::mode::Geometry;

/// Raw memory-mapped register access.
///
/// Addresses are 32-bit bus addresses; multi-byte accesses are big-endian
/// like the 68k bus they model.
pub trait RegisterBus {
    fn read8(&self, addr: u32) -> u8;
    fn write8(&mut self, addr: u32, value: u8);
    fn read16(&self, addr: u32) -> u16;
    fn write16(&mut self, addr: u32, value: u16);
    fn read32(&self, addr: u32) -> u32;
    fn write32(&mut self, addr: u32, value: u32);
}

/// Frame counter advanced by the VBL interrupt (`frclock`).
pub trait FrameClock {
    fn frame_count(&self) -> u32;
}

/// Saved interrupt priority level, handed back to
/// [`InterruptControl::restore`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SavedLevel(pub u16);

/// Interrupt masking as far as the VBL is concerned.
pub trait InterruptControl {
    /// Mask the VBL (and everything below it); returns the previous level.
    fn mask_vbl(&mut self) -> SavedLevel;
    /// Lower the level so the VBL can fire; returns the previous level.
    fn allow_vbl(&mut self) -> SavedLevel;
    /// Return to a level obtained from `mask_vbl` / `allow_vbl`.
    fn restore(&mut self, saved: SavedLevel);
}

/// ST-RAM allocator used for the frame buffer.
pub trait VideoRamAllocator {
    /// Carve `size` bytes from the top of physical memory (boot only).
    fn allocate_from_top(&mut self, size: u32, zero_fill: bool) -> Option<u32>;
    /// Replace the screen block with one of `size` bytes (Srealloc).
    ///
    /// On failure the current block must stay valid.
    fn reallocate_screen(&mut self, size: u32) -> Option<u32>;
}

/// Line-A / VT52 layer that derives text geometry from the screen mode.
pub trait ConsoleGeometry {
    fn reinit(&mut self, geometry: Geometry);
}

/// System-wide actions.
pub trait SystemControl {
    /// Default action of the monitor-change hook: full restart.
    fn restart(&mut self);
}

/// Everything a screen driver needs from the board.
pub trait Platform:
    RegisterBus + FrameClock + InterruptControl + VideoRamAllocator + ConsoleGeometry + SystemControl
{
}

impl<T> Platform for T where
    T: RegisterBus + FrameClock + InterruptControl + VideoRamAllocator + ConsoleGeometry + SystemControl
{
}
