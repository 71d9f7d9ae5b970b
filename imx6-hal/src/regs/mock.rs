//! Recording register backend for host tests.

use std::collections::BTreeMap;
use std::vec::Vec;

use embedded_hal_1::delay::DelayNs;
use tock_registers::{LocalRegisterCopy, RegisterLongName};

use super::{Register, RegisterAccess};
use crate::ccm::{CACRR, CCM_ANALOG_PLL_ARM, CCM_CACRR, PLL_ARM, USB_ANALOG_DIGPROG};
use crate::pmu::{PMU_REG_CORE, REG_CORE};

/// `DIGPROG` of an i.MX6ULL, silicon revision 1.1.
pub(crate) const DIGPROG_IMX6ULL: u32 = 0x0065_0001;

/// Plain memory behind every register, plus an ordered log of writes.
///
/// `PLL_ARM.LOCK` is read-only: writes drop it, and reads report it once the
/// configured number of polls after the last `PLL_ARM` write has passed.
pub(crate) struct MockRegisters {
    values: BTreeMap<usize, u32>,
    /// (address, value)
    pub(crate) writes: Vec<(usize, u32)>,
    pub(crate) reads: usize,
    /// `None` never locks.
    pub(crate) lock_after_polls: Option<u32>,
    lock_polls: u32,
}

impl MockRegisters {
    pub(crate) fn new() -> Self {
        Self {
            values: BTreeMap::new(),
            writes: Vec::new(),
            reads: 0,
            lock_after_polls: Some(0),
            lock_polls: 0,
        }
    }

    /// i.MX6ULL running at `div_select`/`arm_podf` with the given LDO codes.
    pub(crate) fn imx6ull(div_select: u32, arm_podf: u32, core: u32, soc: u32) -> Self {
        let mut regs = Self::new();
        regs.poke(USB_ANALOG_DIGPROG, DIGPROG_IMX6ULL);

        let mut pll_arm = LocalRegisterCopy::<u32, PLL_ARM::Register>::new(0);
        pll_arm.write(PLL_ARM::ENABLE::SET + PLL_ARM::DIV_SELECT.val(div_select));
        regs.poke(CCM_ANALOG_PLL_ARM, pll_arm.get());

        let mut cacrr = LocalRegisterCopy::<u32, CACRR::Register>::new(0);
        cacrr.write(CACRR::ARM_PODF.val(arm_podf));
        regs.poke(CCM_CACRR, cacrr.get());

        let mut reg_core = LocalRegisterCopy::<u32, REG_CORE::Register>::new(0);
        reg_core.write(REG_CORE::REG0_TARG.val(core) + REG_CORE::REG2_TARG.val(soc));
        regs.poke(PMU_REG_CORE, reg_core.get());

        regs
    }

    /// Set a register without recording a write.
    pub(crate) fn poke<R: RegisterLongName>(&mut self, reg: Register<R>, value: u32) {
        self.values.insert(reg.addr(), value);
    }

    /// Register contents without recording a read.
    pub(crate) fn peek<R: RegisterLongName>(&self, reg: Register<R>) -> LocalRegisterCopy<u32, R> {
        LocalRegisterCopy::new(self.values.get(&reg.addr()).copied().unwrap_or(0))
    }

    /// `(index in writes, value)` for every write to `reg`.
    pub(crate) fn writes_to<R: RegisterLongName + 'static>(
        &self,
        reg: Register<R>,
    ) -> impl Iterator<Item = (usize, LocalRegisterCopy<u32, R>)> + '_ {
        self.writes
            .iter()
            .enumerate()
            .filter(move |(_, (addr, _))| *addr == reg.addr())
            .map(|(i, (_, v))| (i, LocalRegisterCopy::new(*v)))
    }

    /// Index in `writes` of the first write to `reg`.
    pub(crate) fn first_write_to<R: RegisterLongName + 'static>(&self, reg: Register<R>) -> Option<usize> {
        self.writes_to(reg).next().map(|(i, _)| i)
    }
}

impl RegisterAccess for MockRegisters {
    fn read_raw(&mut self, reg: Register) -> u32 {
        self.reads += 1;
        let mut value = LocalRegisterCopy::<u32, PLL_ARM::Register>::new(self.peek(reg).get());

        if reg.addr() != CCM_ANALOG_PLL_ARM.addr() {
            return value.get();
        }

        match self.lock_after_polls {
            Some(n) if self.lock_polls >= n => value.modify(PLL_ARM::LOCK::SET),
            Some(_) => self.lock_polls += 1,
            None => {}
        }
        value.get()
    }

    fn write_raw(&mut self, reg: Register, value: u32) {
        let value = if reg.addr() == CCM_ANALOG_PLL_ARM.addr() {
            self.lock_polls = 0;
            let mut pll_arm = LocalRegisterCopy::<u32, PLL_ARM::Register>::new(value);
            pll_arm.modify(PLL_ARM::LOCK::CLEAR);
            pll_arm.get()
        } else {
            value
        };
        self.writes.push((reg.addr(), value));
        self.values.insert(reg.addr(), value);
    }
}

/// Records requested delays instead of spinning.
#[derive(Default)]
pub(crate) struct MockDelay {
    pub(crate) calls: Vec<u32>,
}

impl MockDelay {
    pub(crate) fn total_ns(&self) -> u64 {
        self.calls.iter().map(|&ns| ns as u64).sum()
    }
}

impl DelayNs for MockDelay {
    fn delay_ns(&mut self, ns: u32) {
        self.calls.push(ns);
    }

    fn delay_us(&mut self, us: u32) {
        self.calls.push(us * 1_000);
    }
}
