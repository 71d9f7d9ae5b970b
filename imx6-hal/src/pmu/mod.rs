//! Power Management Unit, digital LDO regulators.

use tock_registers::register_bitfields;

use crate::ccm::CCM_ANALOG;
use crate::regs::{check_field, Register};

pub mod dvfs;
pub use dvfs::{RegulatorState, VoltageChange};

register_bitfields![u32,
    // p2456, 39.6.4 Digital Regulator Core Register, IMX6ULLRM
    pub REG_CORE [
        /// ARM core rail (LDO_ARM) target.
        REG0_TARG OFFSET(0) NUMBITS(5) [],
        REG1_TARG OFFSET(9) NUMBITS(5) [],
        /// SOC rail (LDO_SOC) target.
        REG2_TARG OFFSET(18) NUMBITS(5) []
    ]
];

const _: () = {
    check_field(&REG_CORE::REG0_TARG);
    check_field(&REG_CORE::REG1_TARG);
    check_field(&REG_CORE::REG2_TARG);
};

pub const PMU_REG_CORE: Register<REG_CORE::Register> = CCM_ANALOG.reg(0x140);

/// 5-bit LDO target code as programmed into `PMU_REG_CORE`.
///
/// Codes 1..=30 select 725 mV..1450 mV in 25 mV steps. Code 0 power gates the
/// rail and code 31 bypasses the LDO (FET fully on).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct VoltageCode(u8);

impl VoltageCode {
    pub const GATED: Self = Self(0);
    pub const BYPASS: Self = Self(0b11111);

    /// VDD_SOC_CAP minimum, 1.15 V.
    pub const SOC_MIN: Self = Self(18);

    pub const MIN_LINEAR_UV: u32 = 725_000;
    pub const MAX_LINEAR_UV: u32 = 1_450_000;

    const BASE_UV: u32 = 700_000;
    const STEP_UV: u32 = 25_000;

    /// `None` if `code` does not fit in 5 bits.
    pub const fn new(code: u8) -> Option<Self> {
        if code <= Self::BYPASS.0 {
            Some(Self(code))
        } else {
            None
        }
    }

    /// Quantize a target voltage. Below the linear range maps to
    /// [`Self::GATED`], above it to [`Self::BYPASS`], in range truncates to the
    /// 25 mV step at or below the request.
    pub const fn from_microvolts(microvolts: u32) -> Self {
        if microvolts < Self::MIN_LINEAR_UV {
            Self::GATED
        } else if microvolts > Self::MAX_LINEAR_UV {
            Self::BYPASS
        } else {
            Self(((microvolts - Self::BASE_UV) / Self::STEP_UV) as u8)
        }
    }

    pub const fn bits(self) -> u8 {
        self.0
    }

    /// Regulated output, `None` for the gated and bypass codes.
    pub const fn microvolts(self) -> Option<u32> {
        match self.0 {
            0 | 0b11111 => None,
            code => Some(Self::BASE_UV + code as u32 * Self::STEP_UV),
        }
    }

    /// `self`, raised to `floor` if below it.
    pub const fn at_least(self, floor: Self) -> Self {
        if self.0 < floor.0 {
            floor
        } else {
            self
        }
    }
}
