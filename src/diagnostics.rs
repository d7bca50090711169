// src/diagnostics.rs

//! Screen layer diagnostic counters
//!
//! Relaxed atomics only, so the VBL handler may bump them too. Read them
//! all at once with `snapshot()`.

use core::sync::atomic::{AtomicU32, Ordering};

/// Counters of the screen subsystem
#[derive(Debug)]
pub struct ScreenDiagnostics {
    // mode changes
    mode_switches: AtomicU32,
    rejected_requests: AtomicU32,

    // video RAM
    vram_allocations: AtomicU32,
    vram_allocation_failures: AtomicU32,

    // palette
    palette_requests: AtomicU32,
    palettes_applied: AtomicU32,
    palettes_superseded: AtomicU32,

    // vertical blank
    skipped_blanks: AtomicU32,
    monitor_switches: AtomicU32,
    vbl_wait_timeouts: AtomicU32,
    debounce_timeouts: AtomicU32,
}

impl ScreenDiagnostics {
    pub const fn new() -> Self {
        Self {
            mode_switches: AtomicU32::new(0),
            rejected_requests: AtomicU32::new(0),
            vram_allocations: AtomicU32::new(0),
            vram_allocation_failures: AtomicU32::new(0),
            palette_requests: AtomicU32::new(0),
            palettes_applied: AtomicU32::new(0),
            palettes_superseded: AtomicU32::new(0),
            skipped_blanks: AtomicU32::new(0),
            monitor_switches: AtomicU32::new(0),
            vbl_wait_timeouts: AtomicU32::new(0),
            debounce_timeouts: AtomicU32::new(0),
        }
    }

    /// Video hardware was reprogrammed.
    #[inline]
    pub fn record_mode_switch(&self) {
        self.mode_switches.fetch_add(1, Ordering::Relaxed);
    }

    /// Request refused by validation.
    #[inline]
    pub fn record_rejected_request(&self) {
        self.rejected_requests.fetch_add(1, Ordering::Relaxed);
    }

    /// Video RAM allocation attempt, failed or not.
    #[inline]
    pub fn record_vram_allocation(&self, success: bool) {
        self.vram_allocations.fetch_add(1, Ordering::Relaxed);
        if !success {
            self.vram_allocation_failures.fetch_add(1, Ordering::Relaxed);
        }
    }

    /// Palette queued for the next VBL, possibly replacing a pending one.
    #[inline]
    pub fn record_palette_request(&self, superseded: bool) {
        self.palette_requests.fetch_add(1, Ordering::Relaxed);
        if superseded {
            self.palettes_superseded.fetch_add(1, Ordering::Relaxed);
        }
    }

    #[inline]
    pub fn record_palette_applied(&self) {
        self.palettes_applied.fetch_add(1, Ordering::Relaxed);
    }

    /// VBL work skipped because the screen lock was held.
    #[inline]
    pub fn record_skipped_blank(&self) {
        self.skipped_blanks.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub fn record_monitor_switch(&self) {
        self.monitor_switches.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub fn record_vbl_wait_timeout(&self) {
        self.vbl_wait_timeouts.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub fn record_debounce_timeout(&self) {
        self.debounce_timeouts.fetch_add(1, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> DiagnosticSnapshot {
        DiagnosticSnapshot {
            mode_switches: self.mode_switches.load(Ordering::Relaxed),
            rejected_requests: self.rejected_requests.load(Ordering::Relaxed),
            vram_allocations: self.vram_allocations.load(Ordering::Relaxed),
            vram_allocation_failures: self.vram_allocation_failures.load(Ordering::Relaxed),
            palette_requests: self.palette_requests.load(Ordering::Relaxed),
            palettes_applied: self.palettes_applied.load(Ordering::Relaxed),
            palettes_superseded: self.palettes_superseded.load(Ordering::Relaxed),
            skipped_blanks: self.skipped_blanks.load(Ordering::Relaxed),
            monitor_switches: self.monitor_switches.load(Ordering::Relaxed),
            vbl_wait_timeouts: self.vbl_wait_timeouts.load(Ordering::Relaxed),
            debounce_timeouts: self.debounce_timeouts.load(Ordering::Relaxed),
        }
    }
}

impl Default for ScreenDiagnostics {
    fn default() -> Self {
        Self::new()
    }
}

/// Point-in-time copy of [`ScreenDiagnostics`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DiagnosticSnapshot {
    pub mode_switches: u32,
    pub rejected_requests: u32,
    pub vram_allocations: u32,
    pub vram_allocation_failures: u32,
    pub palette_requests: u32,
    pub palettes_applied: u32,
    pub palettes_superseded: u32,
    pub skipped_blanks: u32,
    pub monitor_switches: u32,
    pub vbl_wait_timeouts: u32,
    pub debounce_timeouts: u32,
}

pub static DIAGNOSTICS: ScreenDiagnostics = ScreenDiagnostics::new();
