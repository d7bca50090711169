// src/hal/timeout.rs

//! Bounded polling for hardware edges
//!
//! The screen layer has exactly two busy-waits: waiting for the frame
//! counter to move (next vertical blank) and waiting for the monitor sense
//! line to settle. Both are bounded here so a dead VBL handler or a
//! floating GPIP pin cannot hang the ROM.

/// How long a poll may run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeoutConfig {
    /// Maximum polls before giving up
    pub max_iterations: u32,
    /// Spin `n` times after the n-th failed poll
    pub relax: bool,
}

impl TimeoutConfig {
    /// Wait for the next VBL.
    ///
    /// A 50 Hz frame is 20 ms; this bound is far beyond that on any 68k
    /// and only trips when the VBL interrupt never fires.
    pub const fn vbl_wait() -> Self {
        Self {
            max_iterations: 200_000,
            relax: false,
        }
    }

    /// Correlated dual-read of the monitor sense line.
    pub const fn debounce() -> Self {
        Self {
            max_iterations: 1000,
            relax: false,
        }
    }

    pub const fn with_iterations(self, max_iterations: u32) -> Self {
        Self {
            max_iterations,
            ..self
        }
    }
}

/// Outcome of a bounded poll
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimeoutResult<T> {
    /// Condition met
    Ok(T),
    /// Bound reached first
    Timeout { iterations: u32 },
}

impl<T> TimeoutResult<T> {
    pub fn is_ok(&self) -> bool {
        matches!(self, TimeoutResult::Ok(_))
    }

    pub fn ok(self) -> Option<T> {
        match self {
            TimeoutResult::Ok(value) => Some(value),
            TimeoutResult::Timeout { .. } => None,
        }
    }
}

/// Poll `condition` until it holds or the bound is reached.
pub fn poll_with_timeout<F>(config: TimeoutConfig, mut condition: F) -> TimeoutResult<()>
where
    F: FnMut() -> bool,
{
    poll_with_timeout_value(config, || condition().then_some(()))
}

/// Poll `condition` until it yields a value or the bound is reached.
pub fn poll_with_timeout_value<F, T>(config: TimeoutConfig, mut condition: F) -> TimeoutResult<T>
where
    F: FnMut() -> Option<T>,
{
    for iteration in 1..=config.max_iterations {
        if let Some(value) = condition() {
            return TimeoutResult::Ok(value);
        }
        if config.relax {
            for _ in 0..iteration {
                core::hint::spin_loop();
            }
        }
    }

    TimeoutResult::Timeout {
        iterations: config.max_iterations,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn poll_succeeds_before_bound() {
        let mut counter = 0;
        let result = poll_with_timeout(TimeoutConfig::debounce(), || {
            counter += 1;
            counter >= 5
        });

        assert!(result.is_ok());
        assert_eq!(counter, 5);
    }

    #[test]
    fn poll_reports_iterations_on_timeout() {
        let mut polls = 0;
        let config = TimeoutConfig { max_iterations: 10, relax: true };
        let result = poll_with_timeout(config, || {
            polls += 1;
            false
        });

        assert_eq!(result, TimeoutResult::Timeout { iterations: 10 });
        assert_eq!(polls, 10);
    }

    #[test]
    fn poll_value_returns_first_hit() {
        let mut counter = 0;
        let result = poll_with_timeout_value(TimeoutConfig::debounce(), || {
            counter += 1;
            if counter >= 3 { Some(counter * 10) } else { None }
        });

        assert_eq!(result.ok(), Some(30));
    }

    #[test]
    fn zero_bound_never_polls() {
        let result = poll_with_timeout(TimeoutConfig::vbl_wait().with_iterations(0), || true);
        assert_eq!(result, TimeoutResult::Timeout { iterations: 0 });
    }
}
