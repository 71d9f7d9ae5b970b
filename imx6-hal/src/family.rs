//! Chip family detection and per-family capabilities.

use crate::ccm::{ArmFreq, OperatingPoint, DIGPROG, IMX6ULL_OPP_TABLE, USB_ANALOG_DIGPROG};
use crate::pmu::VoltageCode;
use crate::regs::RegisterAccess;
use crate::time::Hertz;
use crate::Error;

/// i.MX6 family, from `USB_ANALOG_DIGPROG.MAJOR_LOWER`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Family {
    Imx6ul,
    Imx6ull,
    Unknown(u8),
}

impl Family {
    const IMX6UL: u8 = 0x64;
    const IMX6ULL: u8 = 0x65;

    /// Decode a raw `DIGPROG` register value.
    pub const fn from_digprog(digprog: u32) -> Self {
        let major_lower = DIGPROG::MAJOR_LOWER;
        match ((digprog >> major_lower.shift) & major_lower.mask) as u8 {
            Self::IMX6UL => Family::Imx6ul,
            Self::IMX6ULL => Family::Imx6ull,
            other => Family::Unknown(other),
        }
    }

    /// Read the family from the silicon version register.
    pub fn detect<R: RegisterAccess>(regs: &mut R) -> Self {
        Self::from_digprog(regs.read(USB_ANALOG_DIGPROG).get())
    }

    /// Clock and regulator capabilities of this family.
    ///
    /// Families without an implemented ARM clock procedure are rejected.
    pub fn variant(self) -> Result<&'static Variant, Error> {
        match self {
            Family::Imx6ull => Ok(&IMX6ULL),
            family => Err(Error::UnsupportedFamily { family }),
        }
    }
}

/// Everything the ARM clock driver needs to know about a family.
#[derive(Debug)]
pub struct Variant {
    pub family: Family,
    pub opp_table: &'static [OperatingPoint],
    /// Lowest SOC rail target allowed while changing the core rail.
    pub soc_min: VoltageCode,
}

impl Variant {
    /// Resolve a raw frequency to its operating point.
    pub fn lookup(&self, hz: Hertz) -> Result<&'static OperatingPoint, Error> {
        let freq = ArmFreq::try_from(hz)?;
        self.operating_point(freq)
            .ok_or(Error::UnsupportedFrequency { hz: hz.0 })
    }

    pub fn operating_point(&self, freq: ArmFreq) -> Option<&'static OperatingPoint> {
        self.opp_table.iter().find(|op| op.freq == freq)
    }

    /// Supported frequencies, slowest first.
    pub fn frequencies(&self) -> impl Iterator<Item = ArmFreq> + 'static {
        let table: &'static [OperatingPoint] = self.opp_table;
        table.iter().map(|op| op.freq)
    }
}

pub static IMX6ULL: Variant = Variant {
    family: Family::Imx6ull,
    opp_table: &IMX6ULL_OPP_TABLE,
    soc_min: VoltageCode::SOC_MIN,
};
