use embedded_hal_1::delay::DelayNs;

use crate::regs::Timeout;

/// Blocks until a condition becomes false or `polls` evaluations have been spent.
#[inline]
pub fn blocking_wait_polls<F>(mut condition: F, polls: u32) -> Result<(), Timeout>
where
    F: FnMut() -> bool,
{
    let mut spent = 0u32;

    while condition() {
        if spent >= polls {
            return Err(Timeout);
        }
        spent += 1;
        core::hint::spin_loop();
    }

    Ok(())
}

/// Blocks until a condition becomes false or a timeout is reached.
#[cfg(feature = "time")]
#[inline]
pub fn blocking_wait_timeout<F>(mut condition: F, timeout: embassy_time::Duration) -> Result<(), Timeout>
where
    F: FnMut() -> bool,
{
    let start = embassy_time::Instant::now();

    while condition() {
        if start.elapsed() > timeout {
            return Err(Timeout);
        }
        core::hint::spin_loop();
    }

    Ok(())
}

/// Busy-wait delay that assumes the core runs at its fastest supported clock.
///
/// The ARM clock changes under our feet while scaling, so cycle counts are
/// derived from [`SpinDelay::MAX_CORE_HZ`]: at any slower clock the wait only
/// gets longer.
#[derive(Debug, Clone, Copy, Default)]
pub struct SpinDelay;

impl SpinDelay {
    pub const MAX_CORE_HZ: u64 = 900_000_000;

    pub const fn new() -> Self {
        Self
    }
}

impl DelayNs for SpinDelay {
    fn delay_ns(&mut self, ns: u32) {
        let spins = (ns as u64 * Self::MAX_CORE_HZ).div_ceil(1_000_000_000);
        for _ in 0..spins {
            core::hint::spin_loop();
        }
    }
}
