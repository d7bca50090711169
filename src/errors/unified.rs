// src/errors/unified.rs

//! Unified error types for the screen layer
//!
//! Every fallible screen operation reports through [`ScreenError`]. The
//! legacy XBIOS entry points flatten it to `-1` with
//! [`ScreenError::to_legacy`]; requests that are merely inapplicable
//! (locked resolution, "report current" sentinels) are not errors at all
//! and never reach this module.

use core::fmt;

/// Top-level screen error type
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScreenError {
    /// Request rejected before any state was touched
    Config(ConfigError),
    /// Video RAM could not be (re)allocated
    Resource(ResourceError),
    /// Hardware did not respond within its bound
    Hardware(HardwareError),
}

impl ScreenError {
    /// Legacy return encoding shared by all XBIOS screen calls.
    pub const LEGACY: i16 = -1;

    /// Flatten to the legacy return value.
    #[inline]
    pub const fn to_legacy(self) -> i16 {
        Self::LEGACY
    }
}

impl fmt::Display for ScreenError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScreenError::Config(e) => write!(f, "configuration rejected: {}", e),
            ScreenError::Resource(e) => write!(f, "resource exhausted: {}", e),
            ScreenError::Hardware(e) => write!(f, "hardware error: {}", e),
        }
    }
}

/// Mode / resolution validation errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigError {
    /// Resolution index outside MIN_REZ..=MAX_REZ
    InvalidResolution(i16),
    /// Resolution index valid in general but reserved or absent on this chipset
    UnsupportedResolution(i16),
    /// Videl mode word the hardware cannot display
    UnsupportedMode(u16),
    /// Raw value is neither a `0xFFnn` resolution nor a mode value
    InvalidModeCode(i16),
}

impl ConfigError {
    pub const fn as_str(&self) -> &'static str {
        match self {
            ConfigError::InvalidResolution(_) => "invalid resolution",
            ConfigError::UnsupportedResolution(_) => "resolution not supported by chipset",
            ConfigError::UnsupportedMode(_) => "video mode not supported",
            ConfigError::InvalidModeCode(_) => "invalid mode code",
        }
    }
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidResolution(rez)
            | ConfigError::UnsupportedResolution(rez)
            | ConfigError::InvalidModeCode(rez) => write!(f, "{} ({})", self.as_str(), rez),
            ConfigError::UnsupportedMode(mode) => write!(f, "{} (0x{:04x})", self.as_str(), mode),
        }
    }
}

impl From<ConfigError> for ScreenError {
    fn from(err: ConfigError) -> Self {
        ScreenError::Config(err)
    }
}

/// Video RAM errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResourceError {
    /// Allocator refused the request
    VideoRamExhausted {
        /// Bytes asked for
        requested: u32,
    },
}

impl fmt::Display for ResourceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResourceError::VideoRamExhausted { requested } => {
                write!(f, "cannot allocate {} bytes of video RAM", requested)
            }
        }
    }
}

impl From<ResourceError> for ScreenError {
    fn from(err: ResourceError) -> Self {
        ScreenError::Resource(err)
    }
}

/// Hardware errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HardwareError {
    /// No vertical blank seen within the polling bound
    VblTimeout,
}

impl fmt::Display for HardwareError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HardwareError::VblTimeout => write!(f, "vertical blank timeout"),
        }
    }
}

impl From<HardwareError> for ScreenError {
    fn from(err: HardwareError) -> Self {
        ScreenError::Hardware(err)
    }
}

/// Result type alias for screen operations
pub type Result<T> = core::result::Result<T, ScreenError>;

/// Helper trait for error context
pub trait ErrorContext {
    /// Get a detailed description of the error
    fn context(&self) -> &'static str;
}

impl ErrorContext for ScreenError {
    fn context(&self) -> &'static str {
        match self {
            ScreenError::Config(e) => e.context(),
            ScreenError::Resource(e) => e.context(),
            ScreenError::Hardware(e) => e.context(),
        }
    }
}

impl ErrorContext for ConfigError {
    fn context(&self) -> &'static str {
        match self {
            ConfigError::InvalidResolution(_) => "Resolution index must lie between MIN_REZ and MAX_REZ",
            ConfigError::UnsupportedResolution(_) => {
                "Resolution index is reserved or not wired on the active chipset"
            }
            ConfigError::UnsupportedMode(_) => "Videl cannot generate this mode on the attached monitor",
            ConfigError::InvalidModeCode(_) => "Mode codes are either 0xFFnn resolutions or positive mode values",
        }
    }
}

impl ErrorContext for ResourceError {
    fn context(&self) -> &'static str {
        match self {
            ResourceError::VideoRamExhausted { .. } => {
                "Not enough ST-RAM for the requested frame buffer; previous screen kept"
            }
        }
    }
}

impl ErrorContext for HardwareError {
    fn context(&self) -> &'static str {
        match self {
            HardwareError::VblTimeout => "VBL interrupt did not fire; is the VBL handler installed?",
        }
    }
}
