// src/driver/atari/regs.rs

//! Atari video register map (I/O page at 0xFFFF8000)

// Shifter resolution registers (bytes)
pub const ST_SHIFTER: u32 = 0xFFFF_8260;
pub const TT_SHIFTER: u32 = 0xFFFF_8262;
pub const ST_SHIFTER_MASK: u8 = 0x03;
pub const TT_SHIFTER_MASK: u8 = 0x07;

/// Bit 1: 50 Hz. Bit 0 must be set on the TT.
pub const SYNCMODE: u32 = 0xFFFF_820A;
pub const SYNC_PAL: u8 = 0x02;
pub const SYNC_TT: u8 = 0x01;

// Video base address, one byte each
pub const VIDEOBASE_ADDR_HI: u32 = 0xFFFF_8201;
pub const VIDEOBASE_ADDR_MID: u32 = 0xFFFF_8203;
/// STe, TT and Falcon only
pub const VIDEOBASE_ADDR_LOW: u32 = 0xFFFF_820D;

// STe extras
pub const STE_LINE_OFFSET: u32 = 0xFFFF_820F;
pub const STE_HORZ_SCROLL: u32 = 0xFFFF_8265;

// Palettes
pub const ST_PALETTE_REGS: u32 = 0xFFFF_8240;
pub const TT_PALETTE_REGS: u32 = 0xFFFF_8400;
pub const FALCON_PALETTE_REGS: u32 = 0xFFFF_9800;

/// MFP general purpose I/O; bit 7 clear means a monochrome monitor.
pub const MFP_GPIP: u32 = 0xFFFF_FA01;
pub const GPIP_MONO_DETECT: u8 = 0x80;

/// Bit 0: DMA sound playing. XORed into GPIP bit 7 by the hardware.
pub const DMASOUND_CTRL: u32 = 0xFFFF_8901;
pub const DMASOUND_PLAYING: u8 = 0x01;

/// Falcon monitor type in bits 7-6.
pub const FALCON_MONITOR: u32 = 0xFFFF_8006;

// Videl
pub const VIDEL_LINE_WIDTH: u32 = 0xFFFF_8210;
pub const VIDEL_SPSHIFT: u32 = 0xFFFF_8266;
pub const VIDEL_VCO: u32 = 0xFFFF_82C2;
