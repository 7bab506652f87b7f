use crate::hardware::registers::SpecialRegister;
use std::fmt::{Display, Formatter};

/// Wrapper for a raw program memory word.
/// Valid words use only the low 14 bits.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub struct OpcodeWord(u16);

impl OpcodeWord {
    const WIDTH_MASK: u16 = 0xC000;

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
            (0..u16::BITS).contains(&u32::from(to)),
            "index: {to:?} to u16 is greater than maximum value {:?}",
            u16::BITS - 1
        );
        (self.0 >> from) & ((0b1 << (to - from + 1)) - 1)
    }
    #[expect(clippy::cast_possible_truncation, reason = "at most 8 bits are selected")]
    fn get_bit_range_u8(self, from: u8, to: u8) -> u8 {
        debug_assert!(to - from < 8, "range {from}..={to} does not fit into u8");
        self.get_bit_range(from, to) as u8
    }
    #[must_use]
    pub fn get_bit(self, index: u8) -> bool {
        self.get_bit_range(index, index) & 1 != 0
    }
    #[must_use]
    pub const fn bits(self) -> u16 {
        self.0
    }
    /// True if none of bits 14 and 15 is set.
    #[must_use]
    pub const fn is_14_bit(self) -> bool {
        self.0 & Self::WIDTH_MASK == 0
    }
    /// `f`: 7-bit register-select field
    #[must_use]
    pub fn file_register(self) -> u8 {
        self.get_bit_range_u8(0, 6)
    }
    /// `d`: 0 stores into W, 1 into the file register
    #[must_use]
    pub fn destination(self) -> Destination {
        if self.get_bit(7) {
            Destination::File
        } else {
            Destination::W
        }
    }
    /// `b`: bit index of bit-oriented operations
    #[must_use]
    pub fn bit_index(self) -> u8 {
        self.get_bit_range_u8(7, 9)
    }
    /// `k`: 8-bit literal
    #[must_use]
    pub fn literal(self) -> u8 {
        self.get_bit_range_u8(0, 7)
    }
    /// `k`: 11-bit jump target of CALL and GOTO
    #[must_use]
    pub fn address(self) -> u16 {
        self.get_bit_range(0, 10)
    }
}

impl From<u16> for OpcodeWord {
    fn from(bits: u16) -> Self {
        Self(bits)
    }
}

/// Target of a byte-oriented file register operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Destination {
    W,
    File,
}

/// Why a word does not decode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecodeError {
    /// Bit 14 or 15 is set.
    InvalidWidth,
    /// Reserved encoding.
    Unsupported,
}

/// A decoded instruction of the PIC16 mid-range instruction set.
///
/// `f` is the register-select field, `d` the destination, `b` a bit index and `k` a literal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Instruction {
    Addwf { f: u8, d: Destination },
    Andwf { f: u8, d: Destination },
    Clrf { f: u8 },
    Clrw,
    Comf { f: u8, d: Destination },
    Decf { f: u8, d: Destination },
    Decfsz { f: u8, d: Destination },
    Incf { f: u8, d: Destination },
    Incfsz { f: u8, d: Destination },
    Iorwf { f: u8, d: Destination },
    Movf { f: u8, d: Destination },
    Movwf { f: u8 },
    Nop,
    Rlf { f: u8, d: Destination },
    Rrf { f: u8, d: Destination },
    Subwf { f: u8, d: Destination },
    Swapf { f: u8, d: Destination },
    Xorwf { f: u8, d: Destination },

    Bcf { f: u8, b: u8 },
    Bsf { f: u8, b: u8 },
    Btfsc { f: u8, b: u8 },
    Btfss { f: u8, b: u8 },

    Addlw { k: u8 },
    Andlw { k: u8 },
    Call { k: u16 },
    Clrwdt,
    Goto { k: u16 },
    Iorlw { k: u8 },
    Movlw { k: u8 },
    Retfie,
    Retlw { k: u8 },
    Return,
    Sleep,
    Sublw { k: u8 },
    Xorlw { k: u8 },
}

impl TryFrom<u16> for Instruction {
    type Error = DecodeError;

    /// Decodes by instruction class, the two highest bits of the 14-bit word.
    fn try_from(bits: u16) -> Result<Self, Self::Error> {
        let word = OpcodeWord::from(bits);
        if !word.is_14_bit() {
            return Err(DecodeError::InvalidWidth);
        }
        match bits & 0x3000 {
            0x0000 => decode_byte_oriented(word),
            0x1000 => Ok(decode_bit_oriented(word)),
            0x2000 => {
                let k = word.address();
                Ok(if word.get_bit(11) {
                    Self::Goto { k }
                } else {
                    Self::Call { k }
                })
            }
            _ => decode_literal(word),
        }
    }
}

fn decode_byte_oriented(word: OpcodeWord) -> Result<Instruction, DecodeError> {
    use Instruction::{
        Addwf, Andwf, Clrf, Clrw, Comf, Decf, Decfsz, Incf, Incfsz, Iorwf, Movf, Rlf, Rrf, Subwf,
        Swapf, Xorwf,
    };
    let f = word.file_register();
    let d = word.destination();
    Ok(match word.bits() & 0x0F00 {
        0x0000 => return decode_miscellaneous(word),
        0x0100 => match d {
            Destination::File => Clrf { f },
            Destination::W => Clrw,
        },
        0x0200 => Subwf { f, d },
        0x0300 => Decf { f, d },
        0x0400 => Iorwf { f, d },
        0x0500 => Andwf { f, d },
        0x0600 => Xorwf { f, d },
        0x0700 => Addwf { f, d },
        0x0800 => Movf { f, d },
        0x0900 => Comf { f, d },
        0x0A00 => Incf { f, d },
        0x0B00 => Decfsz { f, d },
        0x0C00 => Rrf { f, d },
        0x0D00 => Rlf { f, d },
        0x0E00 => Swapf { f, d },
        _ => Incfsz { f, d },
    })
}

/// MOVWF and the operand-less control instructions share `00 0000`.
fn decode_miscellaneous(word: OpcodeWord) -> Result<Instruction, DecodeError> {
    if word.destination() == Destination::File {
        return Ok(Instruction::Movwf {
            f: word.file_register(),
        });
    }
    if word.get_bit_range(0, 3) == 0 {
        return Ok(Instruction::Nop);
    }
    match word.literal() {
        0x08 => Ok(Instruction::Return),
        0x09 => Ok(Instruction::Retfie),
        0x63 => Ok(Instruction::Sleep),
        0x64 => Ok(Instruction::Clrwdt),
        _ => Err(DecodeError::Unsupported),
    }
}

fn decode_bit_oriented(word: OpcodeWord) -> Instruction {
    let f = word.file_register();
    let b = word.bit_index();
    match word.bits() & 0x3C00 {
        0x1000 => Instruction::Bcf { f, b },
        0x1400 => Instruction::Bsf { f, b },
        0x1800 => Instruction::Btfsc { f, b },
        _ => Instruction::Btfss { f, b },
    }
}

/// Literal encodings overlap, masks are tried from the most specific one.
fn decode_literal(word: OpcodeWord) -> Result<Instruction, DecodeError> {
    let k = word.literal();
    let bits = word.bits();
    if bits & 0x0E00 == 0x0E00 {
        Ok(Instruction::Addlw { k })
    } else if bits & 0x0F00 == 0x0900 {
        Ok(Instruction::Andlw { k })
    } else if bits & 0x0F00 == 0x0800 {
        Ok(Instruction::Iorlw { k })
    } else if bits & 0x0F00 == 0x0A00 {
        Ok(Instruction::Xorlw { k })
    } else if bits & 0x0C00 == 0x0000 {
        Ok(Instruction::Movlw { k })
    } else if bits & 0x0C00 == 0x0400 {
        Ok(Instruction::Retlw { k })
    } else if bits & 0x0C00 == 0x0C00 {
        Ok(Instruction::Sublw { k })
    } else {
        Err(DecodeError::Unsupported)
    }
}

struct FileOperand(u8);
impl Display for FileOperand {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match SpecialRegister::n(self.0) {
            Some(register) => write!(f, "{register}"),
            None => write!(f, "{:#04X}", self.0),
        }
    }
}

impl Display for Destination {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::W => "W",
            Self::File => "F",
        })
    }
}

impl Display for Instruction {
    fn fmt(&self, fmt: &mut Formatter<'_>) -> std::fmt::Result {
        #[allow(clippy::enum_glob_use)]
        use Instruction::*;
        match *self {
            Addwf { f, d } => write!(fmt, "ADDWF {}, {d}", FileOperand(f)),
            Andwf { f, d } => write!(fmt, "ANDWF {}, {d}", FileOperand(f)),
            Clrf { f } => write!(fmt, "CLRF {}", FileOperand(f)),
            Clrw => fmt.write_str("CLRW"),
            Comf { f, d } => write!(fmt, "COMF {}, {d}", FileOperand(f)),
            Decf { f, d } => write!(fmt, "DECF {}, {d}", FileOperand(f)),
            Decfsz { f, d } => write!(fmt, "DECFSZ {}, {d}", FileOperand(f)),
            Incf { f, d } => write!(fmt, "INCF {}, {d}", FileOperand(f)),
            Incfsz { f, d } => write!(fmt, "INCFSZ {}, {d}", FileOperand(f)),
            Iorwf { f, d } => write!(fmt, "IORWF {}, {d}", FileOperand(f)),
            Movf { f, d } => write!(fmt, "MOVF {}, {d}", FileOperand(f)),
            Movwf { f } => write!(fmt, "MOVWF {}", FileOperand(f)),
            Nop => fmt.write_str("NOP"),
            Rlf { f, d } => write!(fmt, "RLF {}, {d}", FileOperand(f)),
            Rrf { f, d } => write!(fmt, "RRF {}, {d}", FileOperand(f)),
            Subwf { f, d } => write!(fmt, "SUBWF {}, {d}", FileOperand(f)),
            Swapf { f, d } => write!(fmt, "SWAPF {}, {d}", FileOperand(f)),
            Xorwf { f, d } => write!(fmt, "XORWF {}, {d}", FileOperand(f)),
            Bcf { f, b } => write!(fmt, "BCF {}, {b}", FileOperand(f)),
            Bsf { f, b } => write!(fmt, "BSF {}, {b}", FileOperand(f)),
            Btfsc { f, b } => write!(fmt, "BTFSC {}, {b}", FileOperand(f)),
            Btfss { f, b } => write!(fmt, "BTFSS {}, {b}", FileOperand(f)),
            Addlw { k } => write!(fmt, "ADDLW {k:#04X}"),
            Andlw { k } => write!(fmt, "ANDLW {k:#04X}"),
            Call { k } => write!(fmt, "CALL {k:#05X}"),
            Clrwdt => fmt.write_str("CLRWDT"),
            Goto { k } => write!(fmt, "GOTO {k:#05X}"),
            Iorlw { k } => write!(fmt, "IORLW {k:#04X}"),
            Movlw { k } => write!(fmt, "MOVLW {k:#04X}"),
            Retfie => fmt.write_str("RETFIE"),
            Retlw { k } => write!(fmt, "RETLW {k:#04X}"),
            Return => fmt.write_str("RETURN"),
            Sleep => fmt.write_str("SLEEP"),
            Sublw { k } => write!(fmt, "SUBLW {k:#04X}"),
            Xorlw { k } => write!(fmt, "XORLW {k:#04X}"),
        }
    }
}

#[expect(clippy::unusual_byte_groupings)]
#[cfg(test)]
mod tests {
    use super::*;
    use googletest::prelude::*;
    use yare::parameterized;

    #[gtest]
    pub fn test_opcode_word_fields() {
        // BSF 0x26, bit 5
        let sut = OpcodeWord::from(0b01_0110_1010_0110);
        expect_that!(sut.file_register(), eq(0x26));
        expect_that!(sut.bit_index(), eq(5));
        // ADDWF 0x21, F
        let sut = OpcodeWord::from(0b00_0111_1_0100001);
        expect_that!(sut.file_register(), eq(0x21));
        expect_that!(sut.destination(), eq(Destination::File));
        // GOTO 0x7FF
        let sut = OpcodeWord::from(0b10_1_111_1111_1111);
        expect_that!(sut.address(), eq(0x7FF));
        expect_that!(sut.literal(), eq(0xFF));
    }
    #[gtest]
    #[should_panic(expected = "wrong direction of from: 2 and to: 1")]
    pub fn test_get_bit_range_wrong_order() {
        let sut = OpcodeWord::from(0x3FFF);
        let _ = sut.get_bit_range(2, 1);
    }

    #[parameterized(
        addwf = { 0x07A1, Instruction::Addwf { f: 0x21, d: Destination::File } },
        andwf_to_w = { 0x0521, Instruction::Andwf { f: 0x21, d: Destination::W } },
        clrf = { 0x01A1, Instruction::Clrf { f: 0x21 } },
        clrw = { 0x0103, Instruction::Clrw },
        comf = { 0x09A1, Instruction::Comf { f: 0x21, d: Destination::File } },
        decf = { 0x0321, Instruction::Decf { f: 0x21, d: Destination::W } },
        decfsz = { 0x0BA1, Instruction::Decfsz { f: 0x21, d: Destination::File } },
        incf = { 0x0AA1, Instruction::Incf { f: 0x21, d: Destination::File } },
        incfsz = { 0x0F21, Instruction::Incfsz { f: 0x21, d: Destination::W } },
        iorwf = { 0x04A1, Instruction::Iorwf { f: 0x21, d: Destination::File } },
        movf = { 0x0821, Instruction::Movf { f: 0x21, d: Destination::W } },
        movwf = { 0x0086, Instruction::Movwf { f: 0x06 } },
        nop = { 0x0000, Instruction::Nop },
        nop_alternative = { 0x0060, Instruction::Nop },
        rlf = { 0x0DA1, Instruction::Rlf { f: 0x21, d: Destination::File } },
        rrf = { 0x0C21, Instruction::Rrf { f: 0x21, d: Destination::W } },
        subwf = { 0x02A1, Instruction::Subwf { f: 0x21, d: Destination::File } },
        swapf = { 0x0E21, Instruction::Swapf { f: 0x21, d: Destination::W } },
        xorwf = { 0x06A1, Instruction::Xorwf { f: 0x21, d: Destination::File } },
        bcf = { 0x1003, Instruction::Bcf { f: 0x03, b: 0 } },
        bsf = { 0x1683, Instruction::Bsf { f: 0x03, b: 5 } },
        btfsc = { 0x1903, Instruction::Btfsc { f: 0x03, b: 2 } },
        btfss = { 0x1FA1, Instruction::Btfss { f: 0x21, b: 7 } },
        addlw = { 0x3E05, Instruction::Addlw { k: 0x05 } },
        addlw_alternative = { 0x3F05, Instruction::Addlw { k: 0x05 } },
        andlw = { 0x390F, Instruction::Andlw { k: 0x0F } },
        call = { 0x2123, Instruction::Call { k: 0x123 } },
        clrwdt = { 0x0064, Instruction::Clrwdt },
        goto = { 0x2FFF, Instruction::Goto { k: 0x7FF } },
        iorlw = { 0x3880, Instruction::Iorlw { k: 0x80 } },
        movlw = { 0x3042, Instruction::Movlw { k: 0x42 } },
        movlw_alternative = { 0x3342, Instruction::Movlw { k: 0x42 } },
        retfie = { 0x0009, Instruction::Retfie },
        retlw = { 0x3455, Instruction::Retlw { k: 0x55 } },
        retlw_alternative = { 0x3755, Instruction::Retlw { k: 0x55 } },
        return_ = { 0x0008, Instruction::Return },
        sleep = { 0x0063, Instruction::Sleep },
        sublw = { 0x3C10, Instruction::Sublw { k: 0x10 } },
        sublw_alternative = { 0x3D10, Instruction::Sublw { k: 0x10 } },
        xorlw = { 0x3AFF, Instruction::Xorlw { k: 0xFF } },
    )]
    fn test_decode(bits: u16, expected: Instruction) {
        assert_eq!(Instruction::try_from(bits), Ok(expected));
    }

    #[parameterized(
        bit_14 = { 0x4000, DecodeError::InvalidWidth },
        bit_15 = { 0x8000, DecodeError::InvalidWidth },
        valid_low_bits_with_bit_15 = { 0x8064, DecodeError::InvalidWidth },
        option = { 0x0062, DecodeError::Unsupported },
        tris = { 0x0065, DecodeError::Unsupported },
        control_space_gap = { 0x0001, DecodeError::Unsupported },
        literal_gap = { 0x3B00, DecodeError::Unsupported },
    )]
    fn test_decode_failure(bits: u16, expected: DecodeError) {
        assert_eq!(Instruction::try_from(bits), Err(expected));
    }

    #[gtest]
    pub fn test_display() {
        expect_that!(
            Instruction::Movwf { f: 0x06 }.to_string(),
            eq("MOVWF PORTB")
        );
        expect_that!(
            Instruction::Decfsz {
                f: 0x20,
                d: Destination::File
            }
            .to_string(),
            eq("DECFSZ 0x20, F")
        );
        expect_that!(Instruction::Call { k: 0x10 }.to_string(), eq("CALL 0x010"));
        expect_that!(Instruction::Sleep.to_string(), eq("SLEEP"));
    }
}
