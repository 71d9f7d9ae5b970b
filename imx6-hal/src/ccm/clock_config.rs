//! ARM clock configuration and runtime frequency scaling.

use embedded_hal_1::delay::DelayNs;

use super::{
    get_arm_freq, read_clock_state, ArmFreq, ClockState, CACRR, CCM_ANALOG_PLL_ARM, CCM_CACRR,
    PLL_ARM,
};
use crate::family::{Family, Variant};
use crate::pmu::dvfs::{read_regulator_state, set_arm_operating_point, REGULATOR_SETTLE_US};
use crate::pmu::{RegulatorState, VoltageChange};
use crate::regs::{RegisterAccess, Timeout};
use crate::time::Hertz;
use crate::Error;

/// Default number of `LOCK` reads before giving up on `PLL_ARM`.
pub const DEFAULT_PLL_LOCK_POLLS: u32 = 1_000_000;

/// How long to spin on `PLL_ARM.LOCK` after changing `DIV_SELECT`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum LockWait {
    /// Spin until the PLL locks, forever if it never does.
    Unbounded,
    /// Give up after this many reads of the lock bit.
    Polls(u32),
    /// Give up once this much time has passed.
    #[cfg(feature = "time")]
    Deadline(embassy_time::Duration),
}

/// ARM clock driver configuration
#[non_exhaustive]
#[derive(Debug, Clone, Copy)]
pub struct Config {
    pub lock_wait: LockWait,
    /// Spin time after each regulator target write.
    pub settle_us: u32,
}

impl Default for Config {
    fn default() -> Self {
        Self::new()
    }
}

impl Config {
    pub const fn new() -> Self {
        Self {
            lock_wait: LockWait::Polls(DEFAULT_PLL_LOCK_POLLS),
            settle_us: REGULATOR_SETTLE_US,
        }
    }

    pub const fn with_lock_wait(mut self, lock_wait: LockWait) -> Self {
        self.lock_wait = lock_wait;
        self
    }

    pub const fn with_settle_us(mut self, settle_us: u32) -> Self {
        self.settle_us = settle_us;
        self
    }
}

/// ARM core clock and operating point driver.
///
/// Owns the register backend, so the borrow checker guarantees a single writer
/// to `PLL_ARM`, `CACRR` and `PMU_REG_CORE` for as long as the driver lives.
/// Every method blocks; none of them yield.
pub struct ArmClock<R, D> {
    regs: R,
    delay: D,
    family: Family,
    config: Config,
}

impl<R: RegisterAccess, D: DelayNs> ArmClock<R, D> {
    /// Create the driver, detecting the chip family from `DIGPROG`.
    ///
    /// An unsupported family is not an error here; every operation that
    /// needs family specific tables reports it instead.
    pub fn new(mut regs: R, delay: D, config: Config) -> Self {
        let family = Family::detect(&mut regs);
        debug!("ccm: ARM clock driver on {}", family_name(family));
        Self::with_family(regs, delay, family, config)
    }

    /// Create the driver for a known family without reading `DIGPROG`.
    pub fn with_family(regs: R, delay: D, family: Family, config: Config) -> Self {
        Self {
            regs,
            delay,
            family,
            config,
        }
    }

    pub fn family(&self) -> Family {
        self.family
    }

    /// Give back the register backend and delay.
    pub fn release(self) -> (R, D) {
        (self.regs, self.delay)
    }

    /// Current ARM core frequency, read from hardware.
    pub fn freq(&mut self) -> Hertz {
        get_arm_freq(&mut self.regs)
    }

    /// Current ARM PLL and post divider settings, read from hardware.
    pub fn clock_state(&mut self) -> ClockState {
        read_clock_state(&mut self.regs)
    }

    /// Currently programmed core and SOC regulator targets.
    pub fn regulator_state(&mut self) -> RegulatorState {
        read_regulator_state(&mut self.regs)
    }

    /// Frequencies [`set_freq`](Self::set_freq) accepts on this chip, slowest first.
    pub fn supported_frequencies(&self) -> Result<impl Iterator<Item = ArmFreq>, Error> {
        Ok(self.family.variant()?.frequencies())
    }

    /// Program the ARM core regulator target directly.
    ///
    /// The SOC rail follows the core rail but never drops below the family's
    /// minimum. Returns `None` when the target was already programmed.
    pub fn set_operating_point(&mut self, microvolts: u32) -> Result<Option<VoltageChange>, Error> {
        let variant = self.family.variant()?;
        Ok(self.apply_operating_point(variant, microvolts))
    }

    fn apply_operating_point(&mut self, variant: &Variant, microvolts: u32) -> Option<VoltageChange> {
        set_arm_operating_point(
            &mut self.regs,
            &mut self.delay,
            microvolts,
            variant.soc_min,
            self.config.settle_us,
        )
    }

    /// Change the ARM core frequency, together with its operating voltage.
    ///
    /// Voltage is raised before the PLL is touched when speeding up and lowered
    /// only after the new divider is committed when slowing down. Unsupported
    /// families and frequencies are rejected before any register is written.
    /// Setting the current frequency is a no-op.
    ///
    /// If `PLL_ARM` fails to lock within [`Config::lock_wait`], the PLL is left
    /// bypassed (core on the 24 MHz oscillator), `ARM_PODF` is left unchanged
    /// and [`Error::PllLockTimeout`] is returned. A later call, for the same or
    /// another frequency, relocks the PLL from that state.
    pub fn set_freq(&mut self, hz: Hertz) -> Result<(), Error> {
        let variant = self.family.variant()?;
        let op = *variant.lookup(hz)?;

        let cur = self.clock_state();

        if hz == cur.hz {
            trace!("ccm: ARM core already at {} MHz", hz.to_mhz());
            return Ok(());
        }

        // After a failed relock the core idles on the oscillator; voltage is
        // ordered against what the PLL delivers once bypass is released.
        let from_hz = cur.pll_hz();
        if cur.bypass {
            warn!("ccm: PLL_ARM found in bypass, relocking");
        }
        let increasing = hz > from_hz;

        info!("ccm: changing ARM core frequency to {} MHz", hz.to_mhz());

        if increasing {
            self.apply_operating_point(variant, op.microvolts);
        }

        self.relock_pll(op.pll_div_select)?;

        // set core divisor
        self.regs.set_field(CCM_CACRR, CACRR::ARM_PODF, op.arm_podf as u32);

        if !increasing {
            self.apply_operating_point(variant, op.microvolts);
        }

        info!("ccm: {} MHz -> {} MHz", cur.hz.to_mhz(), hz.to_mhz());

        Ok(())
    }

    /// Run the core from the oscillator while `PLL_ARM` relocks at `div_select`.
    fn relock_pll(&mut self, div_select: u8) -> Result<(), Error> {
        // set bypass source to main oscillator
        self.regs
            .modify(CCM_ANALOG_PLL_ARM, PLL_ARM::BYPASS_CLK_SRC::RefClk24M);

        // bypass
        self.regs.set_bit(CCM_ANALOG_PLL_ARM, PLL_ARM::BYPASS);

        // set PLL divisor
        self.regs
            .set_field(CCM_ANALOG_PLL_ARM, PLL_ARM::DIV_SELECT, div_select as u32);

        debug!("ccm: waiting for PLL lock");
        if self.wait_pll_lock().is_err() {
            warn!("ccm: PLL_ARM did not lock, left in bypass");
            return Err(Error::PllLockTimeout);
        }

        // remove bypass
        self.regs.clear_bit(CCM_ANALOG_PLL_ARM, PLL_ARM::BYPASS);

        Ok(())
    }

    fn wait_pll_lock(&mut self) -> Result<(), Timeout> {
        match self.config.lock_wait {
            LockWait::Unbounded => {
                self.regs.wait_until(CCM_ANALOG_PLL_ARM, PLL_ARM::LOCK, 1);
                Ok(())
            }
            LockWait::Polls(polls) => self
                .regs
                .wait_until_polls(CCM_ANALOG_PLL_ARM, PLL_ARM::LOCK, 1, polls),
            #[cfg(feature = "time")]
            LockWait::Deadline(timeout) => {
                let regs = &mut self.regs;
                crate::utils::blocking_wait_timeout(
                    || !regs.read(CCM_ANALOG_PLL_ARM).is_set(PLL_ARM::LOCK),
                    timeout,
                )
            }
        }
    }
}

fn family_name(family: Family) -> &'static str {
    match family {
        Family::Imx6ul => "i.MX6UL",
        Family::Imx6ull => "i.MX6ULL",
        Family::Unknown(_) => "unknown i.MX6",
    }
}
