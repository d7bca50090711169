// src/errors/mod.rs

//! Unified error handling module
//!
//! Typed errors for new code, with a single legacy encoding (`-1`) for the
//! XBIOS-style entry points.

pub mod unified;

pub use unified::{ConfigError, ErrorContext, HardwareError, ResourceError, Result, ScreenError};
