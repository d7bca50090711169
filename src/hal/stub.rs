// src/hal/stub.rs

//! In-memory board for host builds and tests
//!
//! [`StubBoard`] backs two register windows with plain bytes and records
//! every interaction the screen layer has with the rest of the system, so
//! tests can assert on allocator calls, console re-initialisation, restart
//! requests and the interrupt level at the time of a register write.

use core::cell::Cell;

use super::platform::{
    ConsoleGeometry, FrameClock, InterruptControl, RegisterBus, SavedLevel, SystemControl,
    VideoRamAllocator,
};
use crate::screen::mode::Geometry;

/// Size of one register window in bytes.
pub const WINDOW_SIZE: usize = 0x8000;

/// Maximum number of queued scripted values per address.
pub const SCRIPT_DEPTH: usize = 16;

const SCRIPT_SLOTS: usize = 4;

/// 68k status-register level while everything up to the VBL is masked.
pub const LEVEL_VBL_MASKED: u16 = 0x2700;
/// 68k status-register level that lets the VBL (IPL 4) through.
pub const LEVEL_VBL_ALLOWED: u16 = 0x2300;

#[derive(Clone)]
struct Window {
    base: u32,
    bytes: [u8; WINDOW_SIZE],
}

impl Window {
    const fn new(base: u32) -> Self {
        Self {
            base,
            bytes: [0; WINDOW_SIZE],
        }
    }

    fn offset(&self, addr: u32) -> Option<usize> {
        let offset = addr.wrapping_sub(self.base) as usize;
        (offset < WINDOW_SIZE).then_some(offset)
    }
}

/// Values returned by successive reads of one address before falling back
/// to the window contents.
#[derive(Clone)]
struct Script {
    addr: u32,
    values: [u8; SCRIPT_DEPTH],
    len: usize,
    pos: Cell<usize>,
}

impl Script {
    fn next(&self) -> Option<u8> {
        let pos = self.pos.get();
        if pos < self.len {
            self.pos.set(pos + 1);
            Some(self.values[pos])
        } else {
            None
        }
    }
}

/// Board double that implements every platform seam.
#[derive(Clone)]
pub struct StubBoard {
    windows: [Window; 2],
    scripts: [Option<Script>; SCRIPT_SLOTS],

    frames: Cell<u32>,
    frames_frozen: bool,

    level: u16,
    watched: Option<u32>,
    watched_writes_masked: u32,
    watched_writes_unmasked: u32,

    allocation: Option<u32>,
    reallocation: Option<u32>,
    allocation_calls: u32,
    reallocation_calls: u32,
    last_allocation: Option<(u32, bool)>,
    last_reallocation: Option<u32>,

    console_geometry: Option<Geometry>,
    console_reinits: u32,

    restarts: u32,
}

impl core::fmt::Debug for StubBoard {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("StubBoard")
            .field("windows", &[self.windows[0].base, self.windows[1].base])
            .field("frames", &self.frames.get())
            .field("level", &self.level)
            .field("allocation_calls", &self.allocation_calls)
            .field("reallocation_calls", &self.reallocation_calls)
            .field("console_reinits", &self.console_reinits)
            .field("restarts", &self.restarts)
            .finish_non_exhaustive()
    }
}

impl StubBoard {
    /// Board with register windows at `primary` and `secondary`.
    pub fn with_windows(primary: u32, secondary: u32) -> Self {
        Self {
            windows: [Window::new(primary), Window::new(secondary)],
            scripts: [None, None, None, None],
            frames: Cell::new(0),
            frames_frozen: false,
            level: LEVEL_VBL_ALLOWED,
            watched: None,
            watched_writes_masked: 0,
            watched_writes_unmasked: 0,
            allocation: None,
            reallocation: None,
            allocation_calls: 0,
            reallocation_calls: 0,
            last_allocation: None,
            last_reallocation: None,
            console_geometry: None,
            console_reinits: 0,
            restarts: 0,
        }
    }

    /// Atari I/O page (0xFFFF8000-0xFFFFFFFF).
    pub fn atari() -> Self {
        Self::with_windows(0xFFFF_8000, 0x0000_0000)
    }

    /// A2560U: VICKY II register block.
    pub fn a2560u() -> Self {
        Self::with_windows(0x00B4_0000, 0x0000_0000)
    }

    /// A2560M: VICKY III block and the legacy VICKY II control word.
    pub fn a2560m() -> Self {
        Self::with_windows(0xFC00_0000, 0xFEC4_0000)
    }

    fn locate(&self, addr: u32) -> Option<(usize, usize)> {
        self.windows
            .iter()
            .enumerate()
            .find_map(|(index, window)| window.offset(addr).map(|offset| (index, offset)))
    }

    /// Byte as stored, bypassing scripts.
    pub fn peek8(&self, addr: u32) -> u8 {
        match self.locate(addr) {
            Some((window, offset)) => self.windows[window].bytes[offset],
            None => 0xFF,
        }
    }

    pub fn peek16(&self, addr: u32) -> u16 {
        u16::from_be_bytes([self.peek8(addr), self.peek8(addr.wrapping_add(1))])
    }

    pub fn peek32(&self, addr: u32) -> u32 {
        (u32::from(self.peek16(addr)) << 16) | u32::from(self.peek16(addr.wrapping_add(2)))
    }

    /// Store without recording a write (hardware-side changes).
    pub fn poke8(&mut self, addr: u32, value: u8) {
        if let Some((window, offset)) = self.locate(addr) {
            self.windows[window].bytes[offset] = value;
        }
    }

    pub fn poke16(&mut self, addr: u32, value: u16) {
        let [hi, lo] = value.to_be_bytes();
        self.poke8(addr, hi);
        self.poke8(addr.wrapping_add(1), lo);
    }

    pub fn poke32(&mut self, addr: u32, value: u32) {
        self.poke16(addr, (value >> 16) as u16);
        self.poke16(addr.wrapping_add(2), value as u16);
    }

    /// Queue values returned by the next reads of `addr`.
    ///
    /// Returns false when no slot is free or `values` is too long.
    pub fn script_reads(&mut self, addr: u32, values: &[u8]) -> bool {
        if values.len() > SCRIPT_DEPTH {
            return false;
        }
        let slot = self
            .scripts
            .iter()
            .position(|s| s.as_ref().is_none_or(|s| s.addr == addr));
        let Some(slot) = slot else {
            return false;
        };
        let mut buffer = [0u8; SCRIPT_DEPTH];
        buffer[..values.len()].copy_from_slice(values);
        self.scripts[slot] = Some(Script {
            addr,
            values: buffer,
            len: values.len(),
            pos: Cell::new(0),
        });
        true
    }

    /// Number of scripted values for `addr` not yet consumed.
    pub fn scripted_remaining(&self, addr: u32) -> usize {
        self.scripts
            .iter()
            .flatten()
            .find(|s| s.addr == addr)
            .map_or(0, |s| s.len - s.pos.get())
    }

    /// Stop the frame counter; VBL waits will then time out.
    pub fn freeze_frames(&mut self, frozen: bool) {
        self.frames_frozen = frozen;
    }

    pub fn frames(&self) -> u32 {
        self.frames.get()
    }

    /// Record the interrupt level of every write to `addr`.
    pub fn watch_register(&mut self, addr: u32) {
        self.watched = Some(addr);
        self.watched_writes_masked = 0;
        self.watched_writes_unmasked = 0;
    }

    /// (writes with VBL masked, writes with VBL allowed) to the watched register.
    pub fn watched_writes(&self) -> (u32, u32) {
        (self.watched_writes_masked, self.watched_writes_unmasked)
    }

    pub fn interrupt_level(&self) -> u16 {
        self.level
    }

    pub fn vbl_masked(&self) -> bool {
        self.level >= LEVEL_VBL_MASKED
    }

    /// Result of the next boot allocation.
    pub fn set_allocation(&mut self, result: Option<u32>) {
        self.allocation = result;
    }

    /// Result of the next screen reallocation.
    pub fn set_reallocation(&mut self, result: Option<u32>) {
        self.reallocation = result;
    }

    pub fn allocation_calls(&self) -> u32 {
        self.allocation_calls
    }

    pub fn reallocation_calls(&self) -> u32 {
        self.reallocation_calls
    }

    /// (size, zero_fill) of the most recent boot allocation.
    pub fn last_allocation(&self) -> Option<(u32, bool)> {
        self.last_allocation
    }

    pub fn last_reallocation(&self) -> Option<u32> {
        self.last_reallocation
    }

    pub fn console_geometry(&self) -> Option<Geometry> {
        self.console_geometry
    }

    pub fn console_reinits(&self) -> u32 {
        self.console_reinits
    }

    pub fn restarts(&self) -> u32 {
        self.restarts
    }

    fn record_write(&mut self, addr: u32, width: u32) {
        if let Some(watched) = self.watched {
            if watched >= addr && watched < addr.wrapping_add(width) {
                if self.vbl_masked() {
                    self.watched_writes_masked += 1;
                } else {
                    self.watched_writes_unmasked += 1;
                }
            }
        }
    }
}

impl RegisterBus for StubBoard {
    fn read8(&self, addr: u32) -> u8 {
        if let Some(value) = self.scripts.iter().flatten().find(|s| s.addr == addr).and_then(Script::next) {
            return value;
        }
        self.peek8(addr)
    }

    fn write8(&mut self, addr: u32, value: u8) {
        self.record_write(addr, 1);
        self.poke8(addr, value);
    }

    fn read16(&self, addr: u32) -> u16 {
        u16::from_be_bytes([self.read8(addr), self.read8(addr.wrapping_add(1))])
    }

    fn write16(&mut self, addr: u32, value: u16) {
        self.record_write(addr, 2);
        self.poke16(addr, value);
    }

    fn read32(&self, addr: u32) -> u32 {
        (u32::from(self.read16(addr)) << 16) | u32::from(self.read16(addr.wrapping_add(2)))
    }

    fn write32(&mut self, addr: u32, value: u32) {
        self.record_write(addr, 4);
        self.poke32(addr, value);
    }
}

impl FrameClock for StubBoard {
    /// Every read observes a new frame unless frozen.
    fn frame_count(&self) -> u32 {
        let now = self.frames.get();
        if !self.frames_frozen {
            self.frames.set(now.wrapping_add(1));
        }
        now
    }
}

impl InterruptControl for StubBoard {
    fn mask_vbl(&mut self) -> SavedLevel {
        let old = SavedLevel(self.level);
        self.level = LEVEL_VBL_MASKED;
        old
    }

    fn allow_vbl(&mut self) -> SavedLevel {
        let old = SavedLevel(self.level);
        self.level = LEVEL_VBL_ALLOWED;
        old
    }

    fn restore(&mut self, saved: SavedLevel) {
        self.level = saved.0;
    }
}

impl VideoRamAllocator for StubBoard {
    fn allocate_from_top(&mut self, size: u32, zero_fill: bool) -> Option<u32> {
        self.allocation_calls += 1;
        self.last_allocation = Some((size, zero_fill));
        self.allocation
    }

    fn reallocate_screen(&mut self, size: u32) -> Option<u32> {
        self.reallocation_calls += 1;
        self.last_reallocation = Some(size);
        self.reallocation
    }
}

impl ConsoleGeometry for StubBoard {
    fn reinit(&mut self, geometry: Geometry) {
        self.console_geometry = Some(geometry);
        self.console_reinits += 1;
    }
}

impl SystemControl for StubBoard {
    fn restart(&mut self) {
        self.restarts += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn multi_byte_access_is_big_endian() {
        let mut board = StubBoard::atari();
        board.write32(0xFFFF_9800, 0x1122_3344);
        assert_eq!(board.read8(0xFFFF_9800), 0x11);
        assert_eq!(board.read16(0xFFFF_9802), 0x3344);
    }

    #[test]
    fn unmapped_reads_float_high() {
        let board = StubBoard::atari();
        assert_eq!(board.read8(0x0001_0000), 0xFF);
        assert_eq!(board.read16(0x0001_0000), 0xFFFF);
    }

    #[test]
    fn scripted_reads_drain_then_fall_back() {
        let mut board = StubBoard::atari();
        board.poke8(0xFFFF_FA01, 0x80);
        assert!(board.script_reads(0xFFFF_FA01, &[0x00, 0x01]));

        assert_eq!(board.read8(0xFFFF_FA01), 0x00);
        assert_eq!(board.read8(0xFFFF_FA01), 0x01);
        assert_eq!(board.scripted_remaining(0xFFFF_FA01), 0);
        assert_eq!(board.read8(0xFFFF_FA01), 0x80);
    }

    #[test]
    fn frame_clock_advances_unless_frozen() {
        let mut board = StubBoard::atari();
        let a = board.frame_count();
        assert_ne!(board.frame_count(), a);

        board.freeze_frames(true);
        let b = board.frame_count();
        assert_eq!(board.frame_count(), b);
    }

    #[test]
    fn watched_register_tracks_interrupt_level() {
        let mut board = StubBoard::atari();
        board.watch_register(0xFFFF_8260);

        board.write8(0xFFFF_8260, 1);
        let saved = board.mask_vbl();
        board.write8(0xFFFF_8260, 2);
        board.restore(saved);

        assert_eq!(board.watched_writes(), (1, 1));
        assert!(!board.vbl_masked());
    }
}
