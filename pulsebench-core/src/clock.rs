//! Clocks
//!
//! The engine is generic over a monotonic elapsed-tick source with a known
//! frequency. `MonotonicClock` (std `Instant`, nanosecond ticks) is the
//! production clock; `ManualClock` is a deterministic clock for tests where
//! the payload itself advances time.

use std::cell::Cell;
use std::rc::Rc;
use std::time::Instant;

/// Nanosecond tick rate of [`MonotonicClock`].
pub const NANOS_PER_SEC: u64 = 1_000_000_000;

/// Monotonic elapsed-time source.
///
/// `ticks` must never decrease between calls on the same clock instance.
pub trait Clock {
    /// Ticks elapsed since some fixed origin (typically clock creation).
    fn ticks(&self) -> u64;

    /// Ticks per second.
    fn frequency(&self) -> u64;
}

/// Wall-clock backed by `std::time::Instant`, one tick per nanosecond.
#[derive(Debug, Clone, Copy)]
pub struct MonotonicClock {
    origin: Instant,
}

impl MonotonicClock {
    /// Create a clock anchored at the current instant.
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl Default for MonotonicClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for MonotonicClock {
    #[inline(always)]
    fn ticks(&self) -> u64 {
        self.origin.elapsed().as_nanos() as u64
    }

    #[inline(always)]
    fn frequency(&self) -> u64 {
        NANOS_PER_SEC
    }
}

/// Deterministic clock for tests.
///
/// Time only moves when a [`ManualClockHandle`] advances it, so a synthetic
/// payload can model a fixed per-call cost without sleeping.
#[derive(Debug, Clone)]
pub struct ManualClock {
    ticks: Rc<Cell<u64>>,
    frequency: u64,
}

impl ManualClock {
    /// Create a manual clock with the given tick frequency.
    pub fn new(frequency: u64) -> Self {
        Self {
            ticks: Rc::new(Cell::new(0)),
            frequency,
        }
    }

    /// Handle that can advance this clock from inside payload closures.
    pub fn handle(&self) -> ManualClockHandle {
        ManualClockHandle {
            ticks: Rc::clone(&self.ticks),
        }
    }
}

impl Clock for ManualClock {
    fn ticks(&self) -> u64 {
        self.ticks.get()
    }

    fn frequency(&self) -> u64 {
        self.frequency
    }
}

/// Shared handle advancing a [`ManualClock`].
#[derive(Debug, Clone)]
pub struct ManualClockHandle {
    ticks: Rc<Cell<u64>>,
}

impl ManualClockHandle {
    /// Advance the clock by `ticks`.
    pub fn advance(&self, ticks: u64) {
        self.ticks.set(self.ticks.get().saturating_add(ticks));
    }
}

/// Pin the current thread to a specific core.
///
/// Timing assumes exclusive use of one core; pinning avoids migrations
/// polluting the measurements.
#[cfg(target_os = "linux")]
pub fn pin_to_cpu(cpu: usize) -> Result<(), std::io::Error> {
    use std::mem::MaybeUninit;

    unsafe {
        let mut set = MaybeUninit::<libc::cpu_set_t>::zeroed();
        let set_ref = set.assume_init_mut();

        libc::CPU_ZERO(set_ref);
        libc::CPU_SET(cpu, set_ref);

        let result = libc::sched_setaffinity(0, std::mem::size_of::<libc::cpu_set_t>(), set_ref);

        if result == 0 {
            Ok(())
        } else {
            Err(std::io::Error::last_os_error())
        }
    }
}

#[cfg(not(target_os = "linux"))]
pub fn pin_to_cpu(_cpu: usize) -> Result<(), std::io::Error> {
    // CPU pinning not supported on this platform
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_monotonic_clock_advances() {
        let clock = MonotonicClock::new();
        let a = clock.ticks();
        std::thread::sleep(Duration::from_millis(10));
        let b = clock.ticks();

        // At least 5ms of ticks at 1 GHz
        assert!(b - a >= 5_000_000);
        assert_eq!(clock.frequency(), NANOS_PER_SEC);
    }

    #[test]
    fn test_monotonic_clock_never_decreases() {
        let clock = MonotonicClock::new();
        let a = clock.ticks();
        let b = clock.ticks();
        assert!(b >= a);
    }

    #[test]
    fn test_manual_clock() {
        let clock = ManualClock::new(1_000_000);
        let handle = clock.handle();

        assert_eq!(clock.ticks(), 0);
        handle.advance(250);
        assert_eq!(clock.ticks(), 250);
        handle.advance(50);
        assert_eq!(clock.ticks(), 300);
        assert_eq!(clock.frequency(), 1_000_000);
    }
}
