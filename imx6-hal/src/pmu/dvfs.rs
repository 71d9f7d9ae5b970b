//! Voltage side of ARM DVFS: programming the core and SOC LDO targets.
//!
//! Ordering against the clock change is the caller's job (see
//! [`crate::ccm::ArmClock::set_freq`]): raise before speeding up, lower after
//! slowing down.

use embedded_hal_1::delay::DelayNs;

use super::{VoltageCode, PMU_REG_CORE, REG_CORE};
use crate::regs::RegisterAccess;

/// LDO ramp guard band.
///
/// There is no "settled" status for the digital LDOs. A full 31-step ramp at
/// the reset ramp rate (64 cycles of the 24 MHz clock per step) takes ~83 us.
pub const REGULATOR_SETTLE_US: u32 = 100;

/// What [`set_arm_operating_point`] programmed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct VoltageChange {
    /// Core target before the write.
    pub from: VoltageCode,
    /// Core target after the write.
    pub to: VoltageCode,
    /// SOC target written alongside.
    pub soc: VoltageCode,
}

/// Programmed LDO targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct RegulatorState {
    pub core: VoltageCode,
    pub soc: VoltageCode,
}

pub fn read_regulator_state<R: RegisterAccess>(regs: &mut R) -> RegulatorState {
    let reg_core = regs.read(PMU_REG_CORE);
    RegulatorState {
        core: code_from_field(reg_core.read(REG_CORE::REG0_TARG)),
        soc: code_from_field(reg_core.read(REG_CORE::REG2_TARG)),
    }
}

fn code_from_field(bits: u32) -> VoltageCode {
    // 5-bit field, always a valid code
    VoltageCode::new(bits as u8).unwrap_or(VoltageCode::BYPASS)
}

/// Set the ARM core rail to `microvolts` (quantized), keeping the SOC rail at
/// or above `soc_min`.
///
/// Returns `None`, without touching the register, when the core target is
/// already programmed. Otherwise both targets are replaced in a single write
/// and the call spins for `settle_us` before returning.
pub fn set_arm_operating_point<R, D>(
    regs: &mut R,
    delay: &mut D,
    microvolts: u32,
    soc_min: VoltageCode,
    settle_us: u32,
) -> Option<VoltageChange>
where
    R: RegisterAccess,
    D: DelayNs,
{
    let target = VoltageCode::from_microvolts(microvolts);
    let current = code_from_field(regs.read_field(PMU_REG_CORE, REG_CORE::REG0_TARG));

    if target == current {
        trace!("pmu: ARM core target already at code {}", target.bits());
        return None;
    }

    let soc = target.at_least(soc_min);

    info!(
        "pmu: changing ARM core operating point to {} uV",
        target.microvolts().unwrap_or(0)
    );

    regs.modify(
        PMU_REG_CORE,
        REG_CORE::REG0_TARG.val(target.bits() as u32) + REG_CORE::REG2_TARG.val(soc.bits() as u32),
    );

    delay.delay_us(settle_us);

    info!(
        "pmu: {} uV -> {} uV (SOC code {})",
        current.microvolts().unwrap_or(0),
        target.microvolts().unwrap_or(0),
        soc.bits()
    );

    Some(VoltageChange {
        from: current,
        to: target,
        soc,
    })
}
