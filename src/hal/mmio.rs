// src/hal/mmio.rs
//! Volatile register access on the target
//!
//! [`MmioBus`] is the [`RegisterBus`] of a real board. The 68k is
//! big-endian like the video chips, so every access is a single volatile
//! load or store of the native width.

use core::marker::PhantomData;
use core::ptr;

use super::platform::RegisterBus;

/// One memory-mapped register of width `T`.
#[repr(transparent)]
#[derive(Debug)]
pub struct MmioReg<T> {
    addr: usize,
    _width: PhantomData<T>,
}

impl<T: Copy> MmioReg<T> {
    /// # Safety
    ///
    /// `addr` must be a mapped register, aligned for `T`.
    pub const unsafe fn new_unchecked(addr: usize) -> Self {
        Self {
            addr,
            _width: PhantomData,
        }
    }

    /// # Safety
    ///
    /// See [`MmioReg::new_unchecked`].
    pub unsafe fn read(&self) -> T {
        unsafe { ptr::read_volatile(self.addr as *const T) }
    }

    /// # Safety
    ///
    /// See [`MmioReg::new_unchecked`].
    pub unsafe fn write(&mut self, value: T) {
        unsafe { ptr::write_volatile(self.addr as *mut T, value) }
    }
}

/// Register bus of the running machine.
#[derive(Debug)]
pub struct MmioBus {
    _private: (),
}

impl MmioBus {
    /// # Safety
    ///
    /// The video and MFP register pages must be mapped 1:1 and this must be
    /// the only owner of the video registers.
    pub const unsafe fn new() -> Self {
        Self { _private: () }
    }

    #[inline]
    fn reg<T: Copy>(addr: u32) -> MmioReg<T> {
        debug_assert!(
            (addr as usize) % core::mem::align_of::<T>() == 0,
            "misaligned register access at {:#010x}",
            addr
        );
        // SAFETY: guaranteed by the contract of MmioBus::new
        unsafe { MmioReg::new_unchecked(addr as usize) }
    }
}

impl RegisterBus for MmioBus {
    fn read8(&self, addr: u32) -> u8 {
        // SAFETY: see MmioBus::new
        unsafe { Self::reg::<u8>(addr).read() }
    }

    fn write8(&mut self, addr: u32, value: u8) {
        // SAFETY: see MmioBus::new
        unsafe { Self::reg::<u8>(addr).write(value) }
    }

    fn read16(&self, addr: u32) -> u16 {
        // SAFETY: see MmioBus::new
        unsafe { Self::reg::<u16>(addr).read() }
    }

    fn write16(&mut self, addr: u32, value: u16) {
        // SAFETY: see MmioBus::new
        unsafe { Self::reg::<u16>(addr).write(value) }
    }

    fn read32(&self, addr: u32) -> u32 {
        // SAFETY: see MmioBus::new
        unsafe { Self::reg::<u32>(addr).read() }
    }

    fn write32(&mut self, addr: u32, value: u32) {
        // SAFETY: see MmioBus::new
        unsafe { Self::reg::<u32>(addr).write(value) }
    }
}
