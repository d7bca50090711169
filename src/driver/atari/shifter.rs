// src/driver/atari/shifter.rs

//! ST / STe / TT shifter: monitor sensing, resolution rules, palettes

use super::regs::{
    DMASOUND_CTRL, DMASOUND_PLAYING, FALCON_PALETTE_REGS, GPIP_MONO_DETECT, MFP_GPIP,
    ST_PALETTE_REGS, ST_SHIFTER, ST_SHIFTER_MASK, TT_PALETTE_REGS, TT_SHIFTER, TT_SHIFTER_MASK,
};
use crate::constants::{
    DEFAULT_PALETTE, FALCON_REZ, LOOKUP_ENTRIES, ST_HIGH, ST_LOW, ST_MEDIUM, TT_HIGH, TT_MEDIUM,
};
use crate::diagnostics::DIAGNOSTICS;
use crate::errors::ConfigError;
use crate::hal::{Platform, TimeoutConfig, TimeoutResult, poll_with_timeout_value};
use crate::screen::mode::{MonitorType, shifter_geometry};
use crate::screen::palette::RgbColor;
use crate::sync::without_vbl;

/// Register and mask of the resolution field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ShifterPort {
    pub register: u32,
    pub mask: u8,
    /// The monochrome resolution of this shifter
    pub mono_rez: i16,
    /// Fallback when the configured default is the mono resolution
    pub color_rez: i16,
}

pub const ST_PORT: ShifterPort = ShifterPort {
    register: ST_SHIFTER,
    mask: ST_SHIFTER_MASK,
    mono_rez: ST_HIGH,
    color_rez: ST_LOW,
};

pub const TT_PORT: ShifterPort = ShifterPort {
    register: TT_SHIFTER,
    mask: TT_SHIFTER_MASK,
    mono_rez: TT_HIGH,
    color_rez: ST_LOW,
};

impl ShifterPort {
    pub fn read_rez<P: Platform>(&self, hw: &P) -> i16 {
        i16::from(hw.read8(self.register) & self.mask)
    }

    /// Replace the resolution bits only.
    pub fn write_rez_bits<P: Platform>(&self, hw: &mut P, rez: i16) {
        let keep = hw.read8(self.register) & 0xf8;
        hw.write8(self.register, keep | (rez as u8 & self.mask));
    }

    pub fn write_rez<P: Platform>(&self, hw: &mut P, rez: i16) {
        hw.write8(self.register, rez as u8);
    }
}

/// Single read of the mono detect line.
pub fn gpip_monitor<P: Platform>(hw: &P) -> MonitorType {
    if hw.read8(MFP_GPIP) & GPIP_MONO_DETECT != 0 {
        MonitorType::Color
    } else {
        MonitorType::Mono
    }
}

/// Mono detect on machines with DMA sound.
///
/// The "sound playing" bit is XORed into GPIP bit 7 and may flip at any
/// time, so both are sampled until GPIP reads the same twice and the sound
/// bit did not move across the samples. `Unknown` if that never happens.
pub fn debounced_monitor<P: Platform>(hw: &mut P) -> MonitorType {
    debounced_monitor_within(hw, TimeoutConfig::debounce())
}

fn debounced_monitor_within<P: Platform>(hw: &mut P, bound: TimeoutConfig) -> MonitorType {
    let sampled = without_vbl(hw, |hw| {
        let hw = &*hw;
        poll_with_timeout_value(bound, || {
            let dmaplay = hw.read8(DMASOUND_CTRL);
            let first = hw.read8(MFP_GPIP);
            let second = hw.read8(MFP_GPIP);
            if (first ^ second) & GPIP_MONO_DETECT != 0 {
                return None;
            }
            (hw.read8(DMASOUND_CTRL) == dmaplay).then_some((first, dmaplay))
        })
    });

    match sampled {
        TimeoutResult::Ok((gpip, dmaplay)) => {
            let mut color = gpip & GPIP_MONO_DETECT != 0;
            if dmaplay & DMASOUND_PLAYING != 0 {
                color = !color;
            }
            if color { MonitorType::Color } else { MonitorType::Mono }
        }
        TimeoutResult::Timeout { iterations } => {
            DIAGNOSTICS.record_debounce_timeout();
            log::warn!("monitor sense did not settle after {} polls", iterations);
            MonitorType::Unknown
        }
    }
}

/// Resolution the auto-switch should program, if any.
///
/// `Unknown` never triggers a switch.
pub fn auto_switch_target(port: &ShifterPort, current: i16, monitor: MonitorType, default_rez: i16) -> Option<i16> {
    let mono_seen = match monitor {
        MonitorType::Mono => true,
        MonitorType::Color | MonitorType::Vga | MonitorType::Tv => false,
        MonitorType::Unknown => return None,
    };

    if current == port.mono_rez {
        if mono_seen {
            return None;
        }
        if default_rez == port.mono_rez {
            Some(port.color_rez)
        } else {
            Some(default_rez)
        }
    } else if mono_seen {
        Some(port.mono_rez)
    } else {
        None
    }
}

/// Resolutions the ST/STe shifter can display.
pub fn validate_st_rez(rez: i16) -> Result<(), ConfigError> {
    match rez {
        ST_LOW | ST_MEDIUM | ST_HIGH => Ok(()),
        _ => Err(ConfigError::UnsupportedResolution(rez)),
    }
}

/// Resolutions the TT shifter can display.
pub fn validate_tt_rez(rez: i16) -> Result<(), ConfigError> {
    if rez == FALCON_REZ || shifter_geometry(rez).is_none() {
        Err(ConfigError::UnsupportedResolution(rez))
    } else {
        Ok(())
    }
}

/// Desktop-settings check for shifters.
///
/// The mono resolution is never requested; it is remapped to the colour
/// resolution of the same shifter before comparing.
pub fn remap_requested_rez(port: &ShifterPort, rez: i16) -> i16 {
    if port.mono_rez == TT_HIGH && rez == TT_HIGH {
        TT_MEDIUM
    } else if port.mono_rez == ST_HIGH && rez == ST_HIGH {
        ST_LOW
    } else {
        rez
    }
}

pub fn init_st_palette<P: Platform>(hw: &mut P, mask: u16) {
    for (i, color) in DEFAULT_PALETTE.iter().enumerate() {
        hw.write16(ST_PALETTE_REGS + 2 * i as u32, color & mask);
    }
}

/// Highest colour register of the mode stays "black".
pub fn fixup_st_palette<P: Platform>(hw: &mut P, rez: i16) {
    let last = hw.read16(ST_PALETTE_REGS + 2 * 15);
    if rez == ST_MEDIUM {
        hw.write16(ST_PALETTE_REGS + 2 * 3, last);
    } else if rez == ST_HIGH {
        hw.write16(ST_PALETTE_REGS + 2, last);
    }
}

pub fn init_tt_palette<P: Platform>(hw: &mut P) {
    for i in 0..LOOKUP_ENTRIES {
        let color = RgbColor::from_ste(DEFAULT_PALETTE[i % 16]).to_tt();
        hw.write16(TT_PALETTE_REGS + 2 * i as u32, color);
    }
}

pub fn init_falcon_palette<P: Platform>(hw: &mut P) {
    for i in 0..LOOKUP_ENTRIES {
        let color = RgbColor::from_ste(DEFAULT_PALETTE[i % 16]).to_falcon();
        hw.write32(FALCON_PALETTE_REGS + 4 * i as u32, color);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hal::{RegisterBus, StubBoard};

    #[test]
    fn gpip_bit_7_means_colour() {
        let mut board = StubBoard::atari();
        board.poke8(MFP_GPIP, 0x80);
        assert_eq!(gpip_monitor(&board), MonitorType::Color);
        board.poke8(MFP_GPIP, 0x7f);
        assert_eq!(gpip_monitor(&board), MonitorType::Mono);
    }

    #[test]
    fn debounce_retries_until_gpip_agrees() {
        let mut board = StubBoard::atari();
        board.poke8(MFP_GPIP, 0x00);
        // first pass disagrees, second pass is stable
        board.script_reads(MFP_GPIP, &[0x80, 0x00, 0x00, 0x00]);

        assert_eq!(debounced_monitor(&mut board), MonitorType::Mono);
        assert_eq!(board.scripted_remaining(MFP_GPIP), 0);
        assert!(!board.vbl_masked());
    }

    #[test]
    fn debounce_inverts_while_sound_plays() {
        let mut board = StubBoard::atari();
        board.poke8(MFP_GPIP, 0x80);
        board.poke8(DMASOUND_CTRL, DMASOUND_PLAYING);
        assert_eq!(debounced_monitor(&mut board), MonitorType::Mono);
    }

    #[test]
    fn debounce_gives_up_on_a_flapping_line() {
        let mut board = StubBoard::atari();
        board.poke8(MFP_GPIP, 0x80);
        // the sound bit moves between the two samples of every pass
        board.script_reads(DMASOUND_CTRL, &[0, 1, 0, 1, 0, 1, 0, 1]);

        let verdict = debounced_monitor_within(&mut board, TimeoutConfig::debounce().with_iterations(4));
        assert_eq!(verdict, MonitorType::Unknown);
        assert!(!board.vbl_masked());
    }

    #[test]
    fn auto_switch_decisions() {
        // colour resolution, mono monitor: go to mono
        assert_eq!(auto_switch_target(&ST_PORT, ST_LOW, MonitorType::Mono, ST_LOW), Some(ST_HIGH));
        // mono resolution, colour monitor: go to default
        assert_eq!(auto_switch_target(&ST_PORT, ST_HIGH, MonitorType::Color, ST_MEDIUM), Some(ST_MEDIUM));
        // default is itself mono: demote
        assert_eq!(auto_switch_target(&ST_PORT, ST_HIGH, MonitorType::Color, ST_HIGH), Some(ST_LOW));
        assert_eq!(auto_switch_target(&TT_PORT, TT_HIGH, MonitorType::Color, TT_HIGH), Some(ST_LOW));
        // agreement and unknown verdicts do nothing
        assert_eq!(auto_switch_target(&ST_PORT, ST_LOW, MonitorType::Color, ST_LOW), None);
        assert_eq!(auto_switch_target(&ST_PORT, ST_LOW, MonitorType::Unknown, ST_LOW), None);
    }

    #[test]
    fn rez_validation_per_shifter() {
        assert!(validate_st_rez(ST_HIGH).is_ok());
        assert_eq!(validate_st_rez(3), Err(ConfigError::UnsupportedResolution(3)));
        assert_eq!(validate_st_rez(TT_MEDIUM), Err(ConfigError::UnsupportedResolution(TT_MEDIUM)));
        assert!(validate_tt_rez(TT_MEDIUM).is_ok());
        assert!(validate_tt_rez(7).is_ok());
        assert!(validate_tt_rez(3).is_err());
        assert!(validate_tt_rez(5).is_err());
    }

    #[test]
    fn mono_request_is_remapped() {
        assert_eq!(remap_requested_rez(&ST_PORT, ST_HIGH), ST_LOW);
        assert_eq!(remap_requested_rez(&TT_PORT, TT_HIGH), TT_MEDIUM);
        assert_eq!(remap_requested_rez(&TT_PORT, ST_HIGH), ST_HIGH);
    }

    #[test]
    fn palette_fixup_copies_register_15() {
        let mut board = StubBoard::atari();
        init_st_palette(&mut board, 0x0777);
        assert_eq!(board.read16(ST_PALETTE_REGS), 0x0777);
        fixup_st_palette(&mut board, ST_MEDIUM);
        assert_eq!(board.read16(ST_PALETTE_REGS + 6), 0x0000);
        assert_eq!(board.read16(ST_PALETTE_REGS + 2), 0x0700);
    }

    #[test]
    fn rez_bits_keep_the_upper_register_bits() {
        let mut board = StubBoard::atari();
        board.poke8(TT_SHIFTER, 0x90 | 4);
        TT_PORT.write_rez_bits(&mut board, TT_HIGH);
        assert_eq!(board.read8(TT_SHIFTER), 0x90 | 6);
        assert_eq!(TT_PORT.read_rez(&board), TT_HIGH);
    }
}
