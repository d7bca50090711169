// src/hal/mod.rs

//! Hardware abstraction layer
//!
//! The screen layer never touches an address directly; it goes through
//! [`RegisterBus`] and the other seams in [`platform`]. On the target the
//! bus is [`MmioBus`]; on the host it is [`StubBoard`].

pub mod mmio;
pub mod platform;
pub mod stub;
pub mod timeout;

pub use mmio::{MmioBus, MmioReg};
pub use platform::{
    ConsoleGeometry, FrameClock, InterruptControl, Platform, RegisterBus, SavedLevel,
    SystemControl, VideoRamAllocator,
};
pub use stub::StubBoard;
pub use timeout::{TimeoutConfig, TimeoutResult, poll_with_timeout, poll_with_timeout_value};
