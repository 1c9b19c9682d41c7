use crate::numbers;
use std::fmt::{Debug, Formatter};

/// Wrapper for LC-3 u16 instruction.
/// format is: `OOOO_DDD_P_PPPP_PPPP`
#[derive(Copy, Clone, PartialEq, Eq)]
pub struct Instruction(u16);

/// Operation selected by bits 15 to 12 of an [`Instruction`].
///
/// All 16 values are covered, `Rti` and `Reserved` have no implementation.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Operation {
    Br,
    Add,
    Ld,
    St,
    Jsr,
    And,
    Ldr,
    Str,
    Rti,
    Not,
    Ldi,
    Sti,
    Jmp,
    Reserved,
    Lea,
    Trap,
}

impl Instruction {
    /// Gives the value of only the specified bit range.
    ///
    /// # Parameters
    /// - `from`: starting index
    /// - `to`: end index (inclusive), mut be greater or equal to `from`
    ///
    /// # Panics
    /// - asserts that to is greater or equal from and both are valid indexes
    #[must_use]
    pub fn get_bit_range(self, from: u8, to: u8) -> u16 {
        debug_assert!(
            to >= from,
            "wrong direction of from: {from:?} and to: {to:?}"
        );
        debug_assert!(
            (00..u16::BITS).contains(&u32::from(to)),
            "index: {to:?} to u16 is greater than maximum value {:?}",
            u16::BITS - 1
        );
        let width = u32::from(to - from) + 1;
        #[expect(clippy::cast_possible_truncation, reason = "mask has at most 16 bits")]
        let mask = ((1u32 << width) - 1) as u16;
        (self.0 >> from) & mask
    }
    /// Gives a field of at most 8 bits, see [`Instruction::get_bit_range()`].
    #[must_use]
    fn get_bit_range_u8(self, from: u8, to: u8) -> u8 {
        debug_assert!(to - from < 8, "field does not fit into u8");
        #[expect(clippy::cast_possible_truncation, reason = "field is at most 8 bits")]
        let res = self.get_bit_range(from, to) as u8;
        res
    }
    #[must_use]
    pub fn get_bit(self, index: u8) -> bool {
        self.get_bit_range(index, index) & 1 != 0
    }
    #[must_use]
    pub const fn bits(self) -> u16 {
        self.0
    }
    #[must_use]
    pub fn op_code(self) -> u8 {
        self.get_bit_range_u8(12, 15)
    }
    #[must_use]
    pub fn operation(self) -> Operation {
        match self.op_code() {
            0b0000 => Operation::Br,
            0b0001 => Operation::Add,
            0b0010 => Operation::Ld,
            0b0011 => Operation::St,
            0b0100 => Operation::Jsr,
            0b0101 => Operation::And,
            0b0110 => Operation::Ldr,
            0b0111 => Operation::Str,
            0b1000 => Operation::Rti,
            0b1001 => Operation::Not,
            0b1010 => Operation::Ldi,
            0b1011 => Operation::Sti,
            0b1100 => Operation::Jmp,
            0b1101 => Operation::Reserved,
            0b1110 => Operation::Lea,
            // only 0b1111 is left in 4 bits
            _ => Operation::Trap,
        }
    }
    /// Destination register, also the source register of the store operations.
    #[must_use]
    pub fn dr_number(self) -> u8 {
        self.get_bit_range_u8(9, 11)
    }
    #[must_use]
    pub fn sr1_number(self) -> u8 {
        self.get_bit_range_u8(6, 8)
    }
    #[must_use]
    pub fn sr2_number(self) -> u8 {
        self.get_bit_range_u8(0, 2)
    }
    #[must_use]
    pub fn base_r_number(self) -> u8 {
        self.get_bit_range_u8(6, 8)
    }
    /// The `nzp` bits of `BR`.
    #[must_use]
    pub fn condition_bits(self) -> u16 {
        self.get_bit_range(9, 11)
    }
    #[must_use]
    pub fn is_immediate(self) -> bool {
        self.get_bit(5)
    }
    /// Distinguishes `JSR` (true) from `JSRR`.
    #[must_use]
    pub fn is_long_jump(self) -> bool {
        self.get_bit(11)
    }
    /// Sign extended `imm5` operand.
    #[must_use]
    pub fn get_immediate(self) -> u16 {
        numbers::sign_extend(self.get_bit_range(0, 4), 5)
    }
    /// Sign extended offset of the lowest `len` bits, to add to PC or a base register.
    /// Can be positive or negative, addition wraps.
    #[must_use]
    pub fn pc_offset(self, len: u8) -> u16 {
        numbers::sign_extend(self.get_bit_range(0, len - 1), len)
    }
    #[must_use]
    pub fn trap_vector(self) -> u8 {
        self.get_bit_range_u8(0, 7)
    }
}

impl Debug for Instruction {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{:?} ({:#06X}), DR: {:03b}, PC_Off: {:09b}",
            self.operation(),
            self.0,
            self.dr_number(),
            self.get_bit_range(0, 8)
        )
    }
}

impl From<u16> for Instruction {
    fn from(bits: u16) -> Self {
        Self(bits)
    }
}

#[expect(clippy::unusual_byte_groupings)]
#[cfg(test)]
mod tests {
    use super::*;
    use googletest::prelude::*;

    #[gtest]
    pub fn test_instr_get_bit_range_valid() {
        let sut = Instruction::from(0b1010_101_001010101);
        expect_that!(sut.op_code(), eq(0b1010));
        expect_that!(sut.operation(), eq(Operation::Ldi));
        expect_that!(sut.dr_number(), eq(0b101));
        expect_that!(sut.pc_offset(9), eq(0b0_0101_0101));

        // Add: DR: 3, SR1: 2, Immediate: false, SR2: 1
        let sut = Instruction::from(0b0001_011_010_0_00_001);
        expect_that!(sut.operation(), eq(Operation::Add));
        expect_that!(sut.dr_number(), eq(3));
        expect_that!(sut.sr1_number(), eq(2));
        expect_that!(sut.sr2_number(), eq(1));
        expect_that!(sut.is_immediate(), eq(false));

        // Add: DR: 7, SR1: 0, Immediate: true, imm5: 14
        let sut = Instruction::from(0b0001_111_000_1_01110);
        expect_that!(sut.dr_number(), eq(7));
        expect_that!(sut.sr1_number(), eq(0));
        expect_that!(sut.is_immediate(), eq(true));
        expect_that!(sut.get_immediate(), eq(14));

        // Add: imm5: -2
        let sut = Instruction::from(0b0001_111_000_1_11110);
        expect_that!(sut.get_immediate(), eq(0xFFFE));
    }
    #[gtest]
    pub fn test_instr_offsets_sign_extended() {
        // BR nzp with PCoffset9 -1
        let sut = Instruction::from(0b0000_111_111111111);
        expect_that!(sut.condition_bits(), eq(0b111));
        expect_that!(sut.pc_offset(9), eq(0xFFFF));
        // JSR with PCoffset11 -1024
        let sut = Instruction::from(0b0100_1_10000000000);
        expect_that!(sut.is_long_jump(), eq(true));
        expect_that!(sut.pc_offset(11), eq(0xFC00));
        // LDR base R5, offset6 -32
        let sut = Instruction::from(0b0110_010_101_100000);
        expect_that!(sut.base_r_number(), eq(5));
        expect_that!(sut.pc_offset(6), eq(0xFFE0));
        // TRAP HALT
        let sut = Instruction::from(0xF025);
        expect_that!(sut.operation(), eq(Operation::Trap));
        expect_that!(sut.trap_vector(), eq(0x25));
    }
    #[yare::parameterized(
        br = { 0x0, Operation::Br },
        ld = { 0x2, Operation::Ld },
        st = { 0x3, Operation::St },
        jsr = { 0x4, Operation::Jsr },
        and = { 0x5, Operation::And },
        ldr = { 0x6, Operation::Ldr },
        str = { 0x7, Operation::Str },
        rti = { 0x8, Operation::Rti },
        not = { 0x9, Operation::Not },
        sti = { 0xB, Operation::Sti },
        jmp = { 0xC, Operation::Jmp },
        reserved = { 0xD, Operation::Reserved },
        lea = { 0xE, Operation::Lea },
    )]
    fn test_operation_decoding(op_code: u16, expected: Operation) {
        let sut = Instruction::from(op_code << 12 | 0x0ABC);
        assert_that!(sut.operation(), eq(expected));
    }
    #[gtest]
    #[should_panic(expected = "wrong direction of from: 2 and to: 1")]
    pub fn test_instr_get_bit_range_wrong_order() {
        let sut = Instruction::from(0b1010_101_101010101);
        let _ = sut.get_bit_range(2, 1);
    }
    #[gtest]
    #[should_panic(expected = "index: 16 to u16 is greater than maximum value 15")]
    pub fn test_instr_get_bit_range_index_too_large() {
        let sut = Instruction::from(0b1010_101_101010101);
        let _ = sut.get_bit_range(2, 16);
    }
}
