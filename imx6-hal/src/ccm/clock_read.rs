//! ARM clock frequency read functions.
//!
//! These read the dividers directly from hardware on every call; nothing is
//! cached, because hardware registers are the only record of the clock tree.

use super::{ClockState, CACRR, CCM_ANALOG_PLL_ARM, CCM_CACRR, OSC_FREQ, PLL_ARM};
use crate::regs::RegisterAccess;
use crate::time::Hertz;

/// (OSC_FREQ * (DIV_SELECT / 2)) / (ARM_PODF + 1)
pub const fn arm_freq_from_dividers(div_select: u32, arm_podf: u32) -> Hertz {
    let pll_hz = OSC_FREQ.0 as u64 * div_select as u64 / 2;
    Hertz((pll_hz / (arm_podf as u64 + 1)) as u32)
}

/// Get ARM PLL loop divider (`DIV_SELECT`) from hardware registers.
pub fn get_arm_pll_div<R: RegisterAccess>(regs: &mut R) -> u8 {
    regs.read_field(CCM_ANALOG_PLL_ARM, PLL_ARM::DIV_SELECT) as u8
}

/// Get ARM core post divider (`ARM_PODF`) from hardware registers.
pub fn get_arm_podf<R: RegisterAccess>(regs: &mut R) -> u8 {
    regs.read_field(CCM_CACRR, CACRR::ARM_PODF) as u8
}

/// Get current ARM core frequency from hardware registers.
pub fn get_arm_freq<R: RegisterAccess>(regs: &mut R) -> Hertz {
    read_clock_state(regs).hz
}

/// While `PLL_ARM` is bypassed the core runs from the 24 MHz oscillator,
/// the only bypass source this driver selects.
pub fn read_clock_state<R: RegisterAccess>(regs: &mut R) -> ClockState {
    let pll_arm = regs.read(CCM_ANALOG_PLL_ARM);
    let pll_div_select = pll_arm.read(PLL_ARM::DIV_SELECT) as u8;
    let bypass = pll_arm.is_set(PLL_ARM::BYPASS);
    let arm_podf = get_arm_podf(regs);

    let hz = if bypass {
        Hertz(OSC_FREQ.0 / (arm_podf as u32 + 1))
    } else {
        arm_freq_from_dividers(pll_div_select as u32, arm_podf as u32)
    };

    ClockState {
        pll_div_select,
        arm_podf,
        bypass,
        hz,
    }
}
