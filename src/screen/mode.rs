// src/screen/mode.rs

//! Mode descriptions and the legacy mode/resolution encodings

use crate::constants::{FALCON_REZ, MAX_REZ, MIN_REZ, ST_HIGH, ST_LOW, ST_MEDIUM, TT_HIGH, TT_LOW, TT_MEDIUM};
use crate::errors::ConfigError;

/// Plane count and pixel dimensions of a display mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Geometry {
    /// Bits per pixel (memory planes on the shifters)
    pub planes: u16,
    pub width: u16,
    pub height: u16,
}

impl Geometry {
    pub const fn new(planes: u16, width: u16, height: u16) -> Self {
        Self {
            planes,
            width,
            height,
        }
    }

    /// Bytes the raster actually reads for one frame.
    pub const fn frame_bytes(&self) -> u32 {
        (self.width as u32 / 8) * self.planes as u32 * self.height as u32
    }
}

/// Active display configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VideoMode {
    pub geometry: Geometry,
    /// Chipset-specific description of the mode
    pub code: ModeCode,
}

/// A decoded mode/rez word.
///
/// `0xFFnn` selects ST/TT resolution `nn`; any non-negative value is a
/// Falcon mode value. Everything else is meaningless.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModeCode {
    Rez(u8),
    Mode(u16),
}

impl ModeCode {
    pub fn decode(raw: i16) -> Result<Self, ConfigError> {
        let bits = raw as u16;
        if bits & 0xff00 == 0xff00 {
            Ok(ModeCode::Rez(bits as u8))
        } else if raw >= 0 {
            Ok(ModeCode::Mode(bits))
        } else {
            Err(ConfigError::InvalidModeCode(raw))
        }
    }

    pub const fn encode(self) -> i16 {
        match self {
            ModeCode::Rez(rez) => (0xff00 | rez as u16) as i16,
            ModeCode::Mode(mode) => mode as i16,
        }
    }
}

/// Verdict of a mode-change check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModeChange {
    /// Nothing to do; legacy `0`
    Unchanged,
    /// Switch to this mode
    Switch(ModeCode),
}

impl ModeChange {
    pub const fn to_legacy(self) -> i16 {
        match self {
            ModeChange::Unchanged => 0,
            ModeChange::Switch(code) => code.encode(),
        }
    }
}

/// Attached monitor, as reported by VgetMonitor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MonitorType {
    Mono,
    Color,
    Vga,
    Tv,
    /// Sense line never settled
    Unknown,
}

impl MonitorType {
    pub const fn code(self) -> i16 {
        match self {
            MonitorType::Mono => 0,
            MonitorType::Color => 1,
            MonitorType::Vga => 2,
            MonitorType::Tv => 3,
            MonitorType::Unknown => -1,
        }
    }

    pub const fn from_code(code: i16) -> Self {
        match code {
            0 => MonitorType::Mono,
            1 => MonitorType::Color,
            2 => MonitorType::Vga,
            3 => MonitorType::Tv,
            _ => MonitorType::Unknown,
        }
    }
}

/// Physical pixel size in microns (for the VDI work-out table).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PixelSize {
    pub width: u16,
    pub height: u16,
}

/// TT/Falcon/VICKY pixel size, the TOS 3/4 values.
pub const fn std_pixel_size(geometry: Geometry) -> PixelSize {
    PixelSize {
        width: if geometry.width < 640 { 556 } else { 278 },
        height: if geometry.height < 400 { 556 } else { 278 },
    }
}

/// ST TOS heuristic; also sensible for enlarged emulator screens.
pub const fn st_pixel_size(geometry: Geometry) -> PixelSize {
    let w = geometry.width as u32;
    let h = geometry.height as u32;
    let width = if 5 * w >= 12 * h {
        169
    } else if w >= 480 {
        372
    } else {
        338
    };
    PixelSize { width, height: 372 }
}

/// Geometry of a shifter resolution index; `None` for reserved slots.
pub const fn shifter_geometry(rez: i16) -> Option<Geometry> {
    match rez {
        ST_LOW => Some(Geometry::new(4, 320, 200)),
        ST_MEDIUM => Some(Geometry::new(2, 640, 200)),
        ST_HIGH => Some(Geometry::new(1, 640, 400)),
        TT_MEDIUM => Some(Geometry::new(4, 640, 480)),
        TT_HIGH => Some(Geometry::new(1, 1280, 960)),
        TT_LOW => Some(Geometry::new(8, 320, 480)),
        _ => None,
    }
}

/// Range check shared by every chipset.
pub fn check_rez_range(rez: i16) -> Result<(), ConfigError> {
    if (MIN_REZ..=MAX_REZ).contains(&rez) {
        Ok(())
    } else {
        Err(ConfigError::InvalidResolution(rez))
    }
}

/// True for indices that name a real mode on some chipset.
pub const fn is_assigned_rez(rez: i16) -> bool {
    shifter_geometry(rez).is_some() || rez == FALCON_REZ
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decode_distinguishes_rez_from_mode() {
        assert_eq!(ModeCode::decode(0xff04u16 as i16), Ok(ModeCode::Rez(4)));
        assert_eq!(ModeCode::decode(0x001a), Ok(ModeCode::Mode(0x001a)));
        assert_eq!(
            ModeCode::decode(0x8000u16 as i16),
            Err(ConfigError::InvalidModeCode(0x8000u16 as i16))
        );
    }

    #[test]
    fn encode_restores_the_raw_word() {
        for raw in [0xff00u16 as i16, 0xff07u16 as i16, 0x0088, 0x01bc] {
            let code = ModeCode::decode(raw);
            assert_eq!(code.map(ModeCode::encode), Ok(raw));
        }
    }

    #[test]
    fn unchanged_is_zero() {
        assert_eq!(ModeChange::Unchanged.to_legacy(), 0);
        assert_eq!(ModeChange::Switch(ModeCode::Rez(0)).to_legacy(), 0xff00u16 as i16);
    }

    #[test]
    fn shifter_table_has_gaps_at_3_and_5() {
        assert_eq!(shifter_geometry(ST_LOW), Some(Geometry::new(4, 320, 200)));
        assert_eq!(shifter_geometry(TT_HIGH), Some(Geometry::new(1, 1280, 960)));
        assert_eq!(shifter_geometry(3), None);
        assert_eq!(shifter_geometry(5), None);
        assert!(is_assigned_rez(FALCON_REZ));
        assert!(!is_assigned_rez(5));
    }

    #[test]
    fn pixel_size_heuristics() {
        assert_eq!(std_pixel_size(Geometry::new(4, 320, 200)), PixelSize { width: 556, height: 556 });
        assert_eq!(std_pixel_size(Geometry::new(1, 640, 480)), PixelSize { width: 278, height: 278 });
        // ST medium is twice as wide as tall
        assert_eq!(st_pixel_size(Geometry::new(2, 640, 200)).width, 169);
        assert_eq!(st_pixel_size(Geometry::new(1, 640, 400)).width, 372);
        assert_eq!(st_pixel_size(Geometry::new(4, 320, 200)).width, 338);
    }

    #[test]
    fn monitor_codes() {
        assert_eq!(MonitorType::Vga.code(), 2);
        assert_eq!(MonitorType::from_code(-1), MonitorType::Unknown);
        assert_eq!(MonitorType::from_code(7), MonitorType::Unknown);
    }
}
