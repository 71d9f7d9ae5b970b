use tock_registers::fields::Field;
use tock_registers::register_bitfields;

use super::mock::MockRegisters;
use super::*;
use crate::ccm::{CCM, CCM_ANALOG, CCM_ANALOG_PLL_ARM, CCM_CACRR, USB_ANALOG_DIGPROG};
use crate::pmu::{PMU_REG_CORE, REG_CORE};

register_bitfields![u32,
    TEST [
        READY OFFSET(0) NUMBITS(1) [],
        MODE OFFSET(14) NUMBITS(2) [],
        ENABLE OFFSET(16) NUMBITS(1) []
    ]
];

const TEST_BLOCK: Block = Block::new(0x0000_1000, 0x100);
const TEST_REG: Register<TEST::Register> = TEST_BLOCK.reg(0x10);

#[test]
fn register_addresses() {
    assert_eq!(CCM_CACRR.addr(), 0x020C_4010);
    assert_eq!(CCM_ANALOG_PLL_ARM.addr(), 0x020C_8000);
    assert_eq!(PMU_REG_CORE.addr(), 0x020C_8140);
    assert_eq!(USB_ANALOG_DIGPROG.addr(), 0x020C_8260);

    assert!(CCM.contains(CCM_CACRR));
    assert!(!CCM.contains(CCM_ANALOG_PLL_ARM));
    assert!(CCM_ANALOG.contains(PMU_REG_CORE));
    assert_eq!(PMU_REG_CORE.untyped().addr(), PMU_REG_CORE.addr());
}

#[test]
fn mmio_owns_every_register_the_crate_defines() {
    assert!(Mmio::owns(CCM_CACRR));
    assert!(Mmio::owns(CCM_ANALOG_PLL_ARM));
    assert!(Mmio::owns(PMU_REG_CORE));
    assert!(Mmio::owns(USB_ANALOG_DIGPROG));
    assert!(!Mmio::owns(TEST_REG));
}

#[test]
#[should_panic]
fn block_rejects_out_of_range_offset() {
    let _ = TEST_BLOCK.reg::<()>(0x100);
}

#[test]
#[should_panic]
fn block_rejects_unaligned_offset() {
    let _ = TEST_BLOCK.reg::<()>(0x02);
}

#[test]
fn field_check_accepts_declared_layouts() {
    check_field(&TEST::MODE);
    check_field(&REG_CORE::REG2_TARG);
    check_field(&Field::<u32, ()>::new(u32::MAX, 0));
}

#[test]
#[should_panic]
fn field_check_rejects_empty_field() {
    check_field(&Field::<u32, ()>::new(0, 4));
}

#[test]
#[should_panic]
fn field_check_rejects_overflow() {
    // three bits at 30 would need bit 32
    check_field(&Field::<u32, ()>::new(0b111, 30));
}

#[test]
#[should_panic]
fn field_check_rejects_holes() {
    check_field(&Field::<u32, ()>::new(0b101, 4));
}

#[test]
fn read_modify_write_primitives() {
    let mut regs = MockRegisters::new();
    regs.poke(TEST_REG, 0x0000_C001);

    regs.set_bit(TEST_REG, TEST::ENABLE);
    assert_eq!(regs.peek(TEST_REG).get(), 0x0001_C001);

    regs.clear_field(TEST_REG, TEST::MODE);
    assert_eq!(regs.peek(TEST_REG).get(), 0x0001_0001);

    regs.set_field(TEST_REG, TEST::MODE, 0b10);
    assert_eq!(regs.read_field(TEST_REG, TEST::MODE), 0b10);

    regs.clear_bit(TEST_REG, TEST::ENABLE);
    assert_eq!(regs.peek(TEST_REG).get(), 0x0000_8001);

    assert_eq!(regs.writes.len(), 4);
}

#[test]
fn set_field_drops_oversized_value() {
    let mut regs = MockRegisters::new();

    // 0b110 would spill into ENABLE
    regs.set_field(TEST_REG, TEST::MODE, 0b110);

    let test = regs.peek(TEST_REG);
    assert_eq!(test.read(TEST::MODE), 0b10);
    assert!(!test.is_set(TEST::ENABLE));
}

#[test]
fn combined_fields_are_one_write() {
    let mut regs = MockRegisters::new();
    // REG1_TARG and a stale REG2_TARG
    regs.poke(PMU_REG_CORE, 0x0040_0000 | 0x1F << 9);

    regs.modify(
        PMU_REG_CORE,
        REG_CORE::REG0_TARG.val(0x12) + REG_CORE::REG2_TARG.val(0x12),
    );

    assert_eq!(regs.writes, [(PMU_REG_CORE.addr(), 0x0048_0012 | 0x1F << 9)]);
    assert_eq!(regs.reads, 1);
}

#[test]
fn bounded_wait_gives_up() {
    let mut regs = MockRegisters::new();

    assert_eq!(regs.wait_until_polls(TEST_REG, TEST::READY, 1, 10), Err(Timeout));
    // the first read plus one per spent poll
    assert_eq!(regs.reads, 11);

    regs.poke(TEST_REG, 1);
    assert_eq!(regs.wait_until_polls(TEST_REG, TEST::READY, 1, 0), Ok(()));
}

#[test]
fn access_through_mutable_reference() {
    fn touch<A: RegisterAccess>(mut regs: A) {
        regs.set_field(TEST_REG, TEST::MODE, 0b11);
    }

    let mut regs = MockRegisters::new();
    touch(&mut regs);
    touch(&mut regs);

    assert_eq!(regs.peek(TEST_REG).read(TEST::MODE), 0b11);
    assert_eq!(regs.writes.len(), 2);
}
