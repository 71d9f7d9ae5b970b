//! Register descriptors and the access primitives every driver in this crate
//! goes through.
//!
//! Bit layouts are declared with `tock_registers::register_bitfields!`. A
//! [`Register`] ties one of those layouts to a bus address inside a [`Block`].
//! Blocks and registers can only be built inside this crate and are checked
//! at construction, as are the bitfields (see [`check_field`]), so a malformed
//! layout in a `const` item fails the build instead of silently corrupting
//! neighbouring bits at runtime.

use core::fmt;
use core::marker::PhantomData;

use embassy_hal_internal::{into_ref, Peripheral, PeripheralRef};
use tock_registers::fields::{Field, FieldValue};
use tock_registers::{LocalRegisterCopy, RegisterLongName};

use crate::peripherals;

/// A contiguous memory-mapped register block.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Block {
    base: usize,
    size: usize,
}

impl Block {
    /// Describe a block starting at `base`, spanning `size` bytes.
    pub(crate) const fn new(base: usize, size: usize) -> Self {
        if base % 4 != 0 {
            ::core::panic!("register block base must be word aligned");
        }
        if size == 0 {
            ::core::panic!("register block must not be empty");
        }
        Self { base, size }
    }

    pub const fn base(&self) -> usize {
        self.base
    }

    /// Register with layout `R` at byte `offset` from the start of this block.
    pub(crate) const fn reg<R: RegisterLongName>(&self, offset: usize) -> Register<R> {
        if offset % 4 != 0 {
            ::core::panic!("register offset must be word aligned");
        }
        if offset >= self.size {
            ::core::panic!("register offset outside of its block");
        }
        Register {
            addr: self.base + offset,
            _layout: PhantomData,
        }
    }

    pub const fn contains<R: RegisterLongName>(&self, reg: Register<R>) -> bool {
        reg.addr >= self.base && reg.addr < self.base + self.size
    }
}

/// A 32-bit register whose bits follow the `register_bitfields!` layout `R`.
///
/// `Register` (with the default `R = ()`) is the untyped form the raw
/// [`RegisterAccess`] methods take.
pub struct Register<R: RegisterLongName = ()> {
    addr: usize,
    _layout: PhantomData<R>,
}

impl<R: RegisterLongName> Register<R> {
    /// Absolute bus address.
    pub const fn addr(&self) -> usize {
        self.addr
    }

    /// Same register, layout forgotten.
    pub const fn untyped(self) -> Register {
        Register {
            addr: self.addr,
            _layout: PhantomData,
        }
    }
}

impl<R: RegisterLongName> Clone for Register<R> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<R: RegisterLongName> Copy for Register<R> {}

impl<R: RegisterLongName> PartialEq for Register<R> {
    fn eq(&self, other: &Self) -> bool {
        self.addr == other.addr
    }
}

impl<R: RegisterLongName> Eq for Register<R> {}

impl<R: RegisterLongName> fmt::Debug for Register<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Register({:#010x})", self.addr)
    }
}

/// Reject bitfields that are empty, not contiguous, or do not fit in 32 bits.
///
/// `register_bitfields!` accepts any `OFFSET`/`NUMBITS`; call this from a
/// `const _: ()` item next to the layout to turn a typo into a build error.
pub const fn check_field<R: RegisterLongName>(field: &Field<u32, R>) {
    let mask = field.mask;
    if mask == 0 {
        ::core::panic!("register field must be at least one bit wide");
    }
    if mask & mask.wrapping_add(1) != 0 {
        ::core::panic!("register field mask must be contiguous");
    }
    if field.shift >= 32 || ((mask as u64) << field.shift) > u32::MAX as u64 {
        ::core::panic!("register field exceeds 32 bits");
    }
}

/// A bounded wait ran out of attempts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Timeout;

/// Register access primitives.
///
/// Implementors provide raw word access; everything else is built on top of
/// `read_raw` and `write_raw` so that an instrumented backend observes exactly
/// the bus traffic the hardware would.
pub trait RegisterAccess {
    fn read_raw(&mut self, reg: Register) -> u32;

    fn write_raw(&mut self, reg: Register, value: u32);

    /// Read the whole register.
    fn read<R: RegisterLongName>(&mut self, reg: Register<R>) -> LocalRegisterCopy<u32, R> {
        LocalRegisterCopy::new(self.read_raw(reg.untyped()))
    }

    /// Read a field.
    fn read_field<R: RegisterLongName>(&mut self, reg: Register<R>, field: Field<u32, R>) -> u32 {
        self.read(reg).read(field)
    }

    /// Read-modify-write: every field named in `value` is replaced, the rest
    /// of the word is kept. Fields combined with `+` land in one write.
    fn modify<R: RegisterLongName>(&mut self, reg: Register<R>, value: FieldValue<u32, R>) {
        let mut word = self.read(reg);
        word.modify(value);
        self.write_raw(reg.untyped(), word.get());
    }

    /// Set every bit of `field` (normally a single bit).
    fn set_bit<R: RegisterLongName>(&mut self, reg: Register<R>, field: Field<u32, R>) {
        self.modify(reg, field.val(field.mask));
    }

    /// Clear every bit of `field` (normally a single bit).
    fn clear_bit<R: RegisterLongName>(&mut self, reg: Register<R>, field: Field<u32, R>) {
        self.modify(reg, field.val(0));
    }

    /// Bits of `value` above the field width are dropped.
    fn set_field<R: RegisterLongName>(&mut self, reg: Register<R>, field: Field<u32, R>, value: u32) {
        self.modify(reg, field.val(value));
    }

    fn clear_field<R: RegisterLongName>(&mut self, reg: Register<R>, field: Field<u32, R>) {
        self.modify(reg, field.val(0));
    }

    /// Spin until `field` reads back `expected`. Never returns if it doesn't.
    fn wait_until<R: RegisterLongName>(&mut self, reg: Register<R>, field: Field<u32, R>, expected: u32) {
        while self.read_field(reg, field) != expected {
            core::hint::spin_loop();
        }
    }

    /// Spin until `field` reads back `expected`, giving up after `polls` reads.
    fn wait_until_polls<R: RegisterLongName>(
        &mut self,
        reg: Register<R>,
        field: Field<u32, R>,
        expected: u32,
        polls: u32,
    ) -> Result<(), Timeout>
    where
        Self: Sized,
    {
        crate::utils::blocking_wait_polls(|| self.read_field(reg, field) != expected, polls)
    }
}

impl<T: RegisterAccess + ?Sized> RegisterAccess for &mut T {
    fn read_raw(&mut self, reg: Register) -> u32 {
        (**self).read_raw(reg)
    }

    fn write_raw(&mut self, reg: Register, value: u32) {
        (**self).write_raw(reg, value)
    }
}

/// Volatile access to the CCM and CCM_ANALOG blocks.
///
/// Construction consumes (or borrows) both peripheral singletons, so only one
/// `Mmio` can exist at a time and the register set has a single writer.
///
/// `Mmio` dereferences whatever address a [`Register`] carries. Registers are
/// only created by this crate, inside the blocks `Mmio` borrows; debug builds
/// check that on every access.
pub struct Mmio<'d> {
    _ccm: PeripheralRef<'d, peripherals::CCM>,
    _ccm_analog: PeripheralRef<'d, peripherals::CCM_ANALOG>,
}

impl<'d> Mmio<'d> {
    pub fn new(
        ccm: impl Peripheral<P = peripherals::CCM> + 'd,
        ccm_analog: impl Peripheral<P = peripherals::CCM_ANALOG> + 'd,
    ) -> Self {
        into_ref!(ccm, ccm_analog);
        Self {
            _ccm: ccm,
            _ccm_analog: ccm_analog,
        }
    }

    pub(crate) fn owns<R: RegisterLongName>(reg: Register<R>) -> bool {
        crate::ccm::CCM.contains(reg) || crate::ccm::CCM_ANALOG.contains(reg)
    }
}

impl RegisterAccess for Mmio<'_> {
    fn read_raw(&mut self, reg: Register) -> u32 {
        debug_assert!(Self::owns(reg));
        // SAFETY: the address is a word-aligned register inside a block whose
        // singleton this `Mmio` holds.
        unsafe { core::ptr::read_volatile(reg.addr() as *const u32) }
    }

    fn write_raw(&mut self, reg: Register, value: u32) {
        debug_assert!(Self::owns(reg));
        // SAFETY: see `read_raw`.
        unsafe { core::ptr::write_volatile(reg.addr() as *mut u32, value) }
    }
}

#[cfg(test)]
pub(crate) mod mock;

#[cfg(test)]
mod tests;
