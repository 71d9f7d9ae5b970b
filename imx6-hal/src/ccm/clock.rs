//! ARM clock types and operating point tables.

use crate::pmu::VoltageCode;
use crate::time::Hertz;
use crate::Error;

use super::{PLL_ARM_DIV_SELECT_MAX, PLL_ARM_DIV_SELECT_MIN};

/// Supported ARM core frequencies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ArmFreq {
    Mhz198,
    Mhz396,
    Mhz528,
    Mhz792,
    Mhz900,
}

impl ArmFreq {
    pub const ALL: [ArmFreq; 5] = [
        ArmFreq::Mhz198,
        ArmFreq::Mhz396,
        ArmFreq::Mhz528,
        ArmFreq::Mhz792,
        ArmFreq::Mhz900,
    ];

    pub const fn hertz(self) -> Hertz {
        match self {
            ArmFreq::Mhz198 => Hertz(198_000_000),
            ArmFreq::Mhz396 => Hertz(396_000_000),
            ArmFreq::Mhz528 => Hertz(528_000_000),
            ArmFreq::Mhz792 => Hertz(792_000_000),
            ArmFreq::Mhz900 => Hertz(900_000_000),
        }
    }

    pub const fn from_hertz(hz: Hertz) -> Result<Self, Error> {
        match hz.0 {
            198_000_000 => Ok(ArmFreq::Mhz198),
            396_000_000 => Ok(ArmFreq::Mhz396),
            528_000_000 => Ok(ArmFreq::Mhz528),
            792_000_000 => Ok(ArmFreq::Mhz792),
            900_000_000 => Ok(ArmFreq::Mhz900),
            _ => Err(Error::UnsupportedFrequency { hz: hz.0 }),
        }
    }
}

impl TryFrom<Hertz> for ArmFreq {
    type Error = Error;

    fn try_from(hz: Hertz) -> Result<Self, Self::Error> {
        Self::from_hertz(hz)
    }
}

impl From<ArmFreq> for Hertz {
    fn from(freq: ArmFreq) -> Self {
        freq.hertz()
    }
}

/// PLL and regulator settings for one [`ArmFreq`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct OperatingPoint {
    pub freq: ArmFreq,
    /// `CCM_ANALOG_PLL_ARM.DIV_SELECT`, PLL output = 24 MHz * div_select / 2
    pub pll_div_select: u8,
    /// `CCM_CACRR.ARM_PODF`, core clock = PLL output / (arm_podf + 1)
    pub arm_podf: u8,
    /// Core rail target.
    pub microvolts: u32,
}

impl OperatingPoint {
    /// Core clock this entry produces, straight from its divider settings.
    pub const fn output_hz(&self) -> Hertz {
        super::arm_freq_from_dividers(self.pll_div_select as u32, self.arm_podf as u32)
    }
}

// p24, Table 10. Operating Ranges, IMX6ULLCEC
pub const IMX6ULL_OPP_TABLE: [OperatingPoint; 5] = [
    OperatingPoint { freq: ArmFreq::Mhz198, pll_div_select: 66, arm_podf: 3, microvolts: 950_000 },
    OperatingPoint { freq: ArmFreq::Mhz396, pll_div_select: 66, arm_podf: 1, microvolts: 1_025_000 },
    OperatingPoint { freq: ArmFreq::Mhz528, pll_div_select: 88, arm_podf: 1, microvolts: 1_175_000 },
    OperatingPoint { freq: ArmFreq::Mhz792, pll_div_select: 66, arm_podf: 0, microvolts: 1_225_000 },
    OperatingPoint { freq: ArmFreq::Mhz900, pll_div_select: 75, arm_podf: 0, microvolts: 1_275_000 },
];

const _: () = check_opp_table(&IMX6ULL_OPP_TABLE);

/// Compile-time sanity check of an operating point table.
///
/// Note: Uses `::core::panic!` so it stays const-compatible with `defmt`.
pub const fn check_opp_table(table: &[OperatingPoint]) {
    let mut i = 0;
    while i < table.len() {
        let op = &table[i];

        if op.pll_div_select < PLL_ARM_DIV_SELECT_MIN || op.pll_div_select > PLL_ARM_DIV_SELECT_MAX {
            ::core::panic!("PLL_ARM DIV_SELECT out of range (54-108)");
        }
        if op.arm_podf > 7 {
            ::core::panic!("ARM_PODF does not fit in 3 bits");
        }
        if op.microvolts < VoltageCode::MIN_LINEAR_UV || op.microvolts > VoltageCode::MAX_LINEAR_UV {
            ::core::panic!("operating point voltage outside the regulator's linear range");
        }
        if op.output_hz().0 != op.freq.hertz().0 {
            ::core::panic!("operating point dividers do not produce its frequency");
        }

        let mut j = i + 1;
        while j < table.len() {
            if table[j].freq as u8 == op.freq as u8 {
                ::core::panic!("duplicate frequency in operating point table");
            }
            j += 1;
        }

        i += 1;
    }
}

/// Live ARM clock configuration as read from hardware.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ClockState {
    pub pll_div_select: u8,
    pub arm_podf: u8,
    /// `PLL_ARM.BYPASS`, left set by a failed relock.
    pub bypass: bool,
    /// Frequency the core runs at right now.
    pub hz: Hertz,
}

impl ClockState {
    /// Frequency the core runs at once `PLL_ARM` drives it with the current
    /// dividers. Equal to `hz` unless bypassed.
    pub const fn pll_hz(&self) -> Hertz {
        super::arm_freq_from_dividers(self.pll_div_select as u32, self.arm_podf as u32)
    }
}
