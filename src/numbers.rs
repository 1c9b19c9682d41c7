/// Implements sign extension as described at [Sign extension](https://en.wikipedia.org/wiki/Sign_extension).
///
/// Only the lowest `valid_bits` of `bits` are taken into account, the field is read as a
/// 2's complement number and widened to 16 bits.
#[must_use]
pub const fn sign_extend(bits: u16, valid_bits: u8) -> u16 {
    debug_assert!(valid_bits > 0 && valid_bits <= 16, "invalid field width");
    if valid_bits >= 16 {
        return bits;
    }
    let bits = bits & ((1 << valid_bits) - 1);
    let most_significant_bit = bits >> (valid_bits - 1);
    if most_significant_bit == 1 {
        // negative: 1-extend
        bits | (0xFFFF << valid_bits)
    } else {
        // positive, already 0-extended
        bits
    }
}

/// View of a 16 bit word as 2's complement number, used for diagnostics.
#[must_use]
pub const fn as_decimal(bin_rep: u16) -> i16 {
    bin_rep.cast_signed()
}

#[cfg(test)]
mod tests {
    use super::*;
    use googletest::prelude::*;

    /// Reference implementation: copy the most significant field bit into every higher bit.
    fn manual_sign_extend(field: u16, width: u8) -> u16 {
        let mut res = field & ((1 << width) - 1);
        let msb = (res >> (width - 1)) & 1;
        for bit in width..16 {
            res |= msb << bit;
        }
        res
    }

    #[yare::parameterized(
        imm5_positive = { 0b0_1110, 5, 14 },
        imm5_negative = { 0b1_1110, 5, 0xFFFE },
        imm5_min = { 0b1_0000, 5, 0xFFF0 },
        offset6_negative = { 0b10_0000, 6, 0xFFE0 },
        offset9_max = { 0b0_1111_1111, 9, 0x00FF },
        offset9_minus_one = { 0b1_1111_1111, 9, 0xFFFF },
        offset11_negative = { 0b100_0000_0000, 11, 0xFC00 },
        ignores_bits_above_field = { 0b1110_0000_0001, 5, 1 },
    )]
    fn test_sign_extend(field: u16, width: u8, expected: u16) {
        assert_that!(sign_extend(field, width), eq(expected));
    }

    #[gtest]
    pub fn test_sign_extend_matches_manual_extension_for_all_fields() {
        for width in [5u8, 6, 9, 11] {
            for field in 0..(1u16 << width) {
                expect_that!(
                    sign_extend(field, width),
                    eq(manual_sign_extend(field, width))
                );
            }
        }
    }

    #[gtest]
    pub fn test_as_decimal() {
        expect_that!(as_decimal(0xFFF6), eq(-10));
        expect_that!(as_decimal(0x7FFF), eq(i16::MAX));
    }
}
