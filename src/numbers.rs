/// Result of an 8-bit ALU operation together with its nibble carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AluResult {
    pub value: u8,
    /// Carry out of bit 7, for subtraction: no borrow.
    pub carry: bool,
    /// Carry out of bit 3, for subtraction: no borrow.
    pub digit_carry: bool,
}

const NIBBLE_CARRY: u8 = 0x10;

/// Adds two bytes nibble by nibble.
///
/// The carry out of the low nibble is fed into the high nibble sum, so `C` reflects the
/// full 8-bit addition.
pub const fn add_with_nibble_carry(a: u8, b: u8) -> AluResult {
    let low = (a & 0x0F) + (b & 0x0F);
    let digit_carry = low & NIBBLE_CARRY != 0;
    let high = (a >> 4) + (b >> 4) + digit_carry as u8;
    AluResult {
        value: a.wrapping_add(b),
        carry: high & NIBBLE_CARRY != 0,
        digit_carry,
    }
}

/// Computes `minuend - subtrahend` nibble by nibble.
///
/// Carry and digit carry are inverted borrows: set when the nibble did not borrow. A borrow
/// out of the low nibble is subtracted from the high nibble.
pub const fn sub_with_nibble_borrow(minuend: u8, subtrahend: u8) -> AluResult {
    let low = (minuend & 0x0F).wrapping_sub(subtrahend & 0x0F);
    let digit_carry = low & NIBBLE_CARRY == 0;
    let high = (minuend >> 4)
        .wrapping_sub(subtrahend >> 4)
        .wrapping_sub(!digit_carry as u8);
    AluResult {
        value: minuend.wrapping_sub(subtrahend),
        carry: high & NIBBLE_CARRY == 0,
        digit_carry,
    }
}

/// Rotates left through carry, returns the rotated value and the new carry.
pub const fn rotate_left_through_carry(value: u8, carry_in: bool) -> (u8, bool) {
    ((value << 1) | carry_in as u8, value & 0x80 != 0)
}

/// Rotates right through carry, returns the rotated value and the new carry.
pub const fn rotate_right_through_carry(value: u8, carry_in: bool) -> (u8, bool) {
    ((value >> 1) | ((carry_in as u8) << 7), value & 0x01 != 0)
}

pub const fn swap_nibbles(value: u8) -> u8 {
    value.rotate_left(4)
}
