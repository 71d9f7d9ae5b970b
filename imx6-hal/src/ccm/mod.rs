//! Clock Controller Module (CCM) and its analog PLLs, ARM core clock only.

use tock_registers::register_bitfields;

use crate::regs::{check_field, Block, Register};
use crate::time::Hertz;

mod clock;
pub use clock::*;

mod clock_read;
pub use clock_read::*;

mod clock_config;
pub use clock_config::*;

/// 24 MHz crystal oscillator feeding every analog PLL.
pub const OSC_FREQ: Hertz = Hertz(24_000_000);

pub const CCM: Block = Block::new(0x020C_4000, 0x4000);
pub const CCM_ANALOG: Block = Block::new(0x020C_8000, 0x1000);

register_bitfields![u32,
    // p665, 18.6.5 CCM Arm Clock Root Register, IMX6ULLRM
    pub CACRR [
        /// Core clock = PLL_ARM / (ARM_PODF + 1)
        ARM_PODF OFFSET(0) NUMBITS(3) []
    ],

    // p714, 18.7.1 Analog ARM PLL control Register, IMX6ULLRM
    pub PLL_ARM [
        /// Fout = Fin * DIV_SELECT / 2
        DIV_SELECT OFFSET(0) NUMBITS(7) [],
        ENABLE OFFSET(13) NUMBITS(1) [],
        BYPASS_CLK_SRC OFFSET(14) NUMBITS(2) [
            RefClk24M = 0,
            ClkIn1 = 1
        ],
        BYPASS OFFSET(16) NUMBITS(1) [],
        LOCK OFFSET(31) NUMBITS(1) []
    ],

    // 18.7.28 Chip Silicon Version Register, IMX6ULLRM
    pub DIGPROG [
        MINOR OFFSET(0) NUMBITS(8) [],
        MAJOR_UPPER OFFSET(8) NUMBITS(8) [],
        MAJOR_LOWER OFFSET(16) NUMBITS(8) []
    ]
];

const _: () = {
    check_field(&CACRR::ARM_PODF);
    check_field(&PLL_ARM::DIV_SELECT);
    check_field(&PLL_ARM::ENABLE);
    check_field(&PLL_ARM::BYPASS_CLK_SRC);
    check_field(&PLL_ARM::BYPASS);
    check_field(&PLL_ARM::LOCK);
    check_field(&DIGPROG::MINOR);
    check_field(&DIGPROG::MAJOR_UPPER);
    check_field(&DIGPROG::MAJOR_LOWER);
};

pub const CCM_CACRR: Register<CACRR::Register> = CCM.reg(0x10);
pub const CCM_ANALOG_PLL_ARM: Register<PLL_ARM::Register> = CCM_ANALOG.reg(0x000);
pub const USB_ANALOG_DIGPROG: Register<DIGPROG::Register> = CCM_ANALOG.reg(0x260);

/// Legal `DIV_SELECT` range: Fout = Fin * div_select / 2, 648..1296 MHz.
pub const PLL_ARM_DIV_SELECT_MIN: u8 = 54;
pub const PLL_ARM_DIV_SELECT_MAX: u8 = 108;
