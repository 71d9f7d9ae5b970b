#![cfg_attr(not(test), no_std)]
#![doc = include_str!("../README.md")]

// This mod MUST go first, so that the others see its macros.
pub(crate) mod fmt;

mod utils;

pub mod ccm;
pub mod family;
pub mod pmu;
pub mod regs;
pub mod time;

// Reexports
pub use embassy_hal_internal::{into_ref, Peripheral, PeripheralRef};
pub use utils::SpinDelay;

use family::Family;

embassy_hal_internal::peripherals! {
    CCM,
    CCM_ANALOG,
}

/// ARM clock control error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Error {
    /// The frequency is not an operating point of the detected family.
    UnsupportedFrequency { hz: u32 },
    /// No ARM clock procedure exists for this chip family.
    UnsupportedFamily { family: Family },
    /// `PLL_ARM` did not report lock within the configured wait.
    PllLockTimeout,
}

impl core::fmt::Display for Error {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Error::UnsupportedFrequency { hz } => write!(f, "unsupported ARM frequency: {} Hz", hz),
            Error::UnsupportedFamily { family } => write!(f, "unsupported chip family: {:?}", family),
            Error::PllLockTimeout => f.write_str("PLL_ARM lock timeout"),
        }
    }
}

/// HAL configuration for i.MX6
pub mod config {
    use crate::ccm;

    /// HAL configuration passed when initializing.
    #[non_exhaustive]
    #[derive(Default)]
    pub struct Config {
        pub ccm: ccm::Config,
        /// ARM core frequency to switch to during `init`, if any.
        pub arm_freq: Option<ccm::ArmFreq>,
    }
}
pub use config::Config;

/// Initialize the `imx6-hal` with the provided configuration.
///
/// This returns the peripheral singletons that can be used for creating drivers.
///
/// This should only be called once at startup, otherwise it panics.
pub fn init(config: Config) -> Result<Peripherals, Error> {
    let mut p = Peripherals::take();

    if let Some(freq) = config.arm_freq {
        let regs = regs::Mmio::new(&mut p.CCM, &mut p.CCM_ANALOG);
        let mut arm = ccm::ArmClock::new(regs, SpinDelay::new(), config.ccm);
        arm.set_freq(freq.hertz())?;
    }

    Ok(p)
}
