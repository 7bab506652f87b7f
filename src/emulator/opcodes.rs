//! Implemented operations for the PIC16 mid-range core.
//!
//! Every operation only reads processor state and describes its effects as an [`Outcome`],
//! which the executor applies in one go.
use crate::emulator::instruction::{Destination, Instruction};
use crate::hardware::PC_MASK;
use crate::hardware::registers::{Registers, SpecialRegister, Status};
use crate::hardware::stack::{CallStack, StackError};
use crate::numbers::{
    add_with_nibble_carry, rotate_left_through_carry, rotate_right_through_carry,
    sub_with_nibble_borrow, swap_nibbles,
};

/// Bits 11 and 12 of the PC, kept by CALL and GOTO.
const PAGE_MASK: u16 = 0x1800;

/// The STATUS flags an operation writes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FlagUpdate {
    mask: u8,
    bits: u8,
}

impl FlagUpdate {
    pub const NONE: Self = Self { mask: 0, bits: 0 };

    #[must_use]
    pub const fn set(self, flag: u8, value: bool) -> Self {
        Self {
            mask: self.mask | flag,
            bits: if value {
                self.bits | flag
            } else {
                self.bits & !flag
            },
        }
    }
    /// Z set iff `result` is zero.
    #[must_use]
    pub const fn zero(result: u8) -> Self {
        Self::NONE.set(Status::Z, result == 0)
    }
    #[must_use]
    pub const fn mask(self) -> u8 {
        self.mask
    }
    #[must_use]
    pub const fn apply(self, status: Status) -> Status {
        Status::from_bits((status.bits() & !self.mask) | self.bits)
    }
}

/// A write into the file register space, `address` is already resolved through INDF.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FileWrite {
    pub address: u8,
    pub value: u8,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StackEffect {
    None,
    Push(u16),
    Pop,
}

/// Everything one instruction changes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Outcome {
    pub w: Option<u8>,
    pub file: Option<FileWrite>,
    pub flags: FlagUpdate,
    pub stack: StackEffect,
    pub next_pc: u16,
}

impl Outcome {
    const fn jump(next_pc: u16) -> Self {
        Self {
            w: None,
            file: None,
            flags: FlagUpdate::NONE,
            stack: StackEffect::None,
            next_pc,
        }
    }
    const fn with_w(mut self, value: u8) -> Self {
        self.w = Some(value);
        self
    }
    const fn with_flags(mut self, flags: FlagUpdate) -> Self {
        self.flags = flags;
        self
    }
    const fn with_stack(mut self, stack: StackEffect) -> Self {
        self.stack = stack;
        self
    }
    fn with_file(mut self, r: &Registers, f: u8, value: u8) -> Self {
        self.file = Some(FileWrite {
            address: r.resolve(f),
            value,
        });
        self
    }
    /// Routes `value` to W or back to register `f`.
    fn store(self, r: &Registers, f: u8, d: Destination, value: u8) -> Self {
        match d {
            Destination::W => self.with_w(value),
            Destination::File => self.with_file(r, f, value),
        }
    }
    /// Writing PCL loads the PC from PCLATH and the written value.
    fn with_computed_goto(mut self, r: &Registers) -> Self {
        if let Some(write) = self.file
            && write.address == SpecialRegister::Pcl.address()
        {
            let high = u16::from(r.get(SpecialRegister::Pclath.address()));
            self.next_pc = ((high << 8) | u16::from(write.value)) & PC_MASK;
        }
        self
    }
}

const fn advance(pc: u16, instructions: u16) -> u16 {
    pc.wrapping_add(instructions) & PC_MASK
}

/// Computes the effects of `i` executing from `pc`.
///
/// # Errors
/// - CALL with a full stack, returns with an empty stack
pub fn evaluate(
    i: Instruction,
    pc: u16,
    r: &Registers,
    stack: &CallStack,
) -> Result<Outcome, StackError> {
    #[allow(clippy::enum_glob_use)]
    use Instruction::*;
    let next = advance(pc, 1);
    let outcome = match i {
        Addwf { f, d } => addwf(f, d, r, next),
        Andwf { f, d } => logical_wf(f, d, r, next, |a, b| a & b),
        Iorwf { f, d } => logical_wf(f, d, r, next, |a, b| a | b),
        Xorwf { f, d } => logical_wf(f, d, r, next, |a, b| a ^ b),
        Clrf { f } => clrf(f, r, next),
        Clrw => Outcome::jump(next)
            .with_w(0)
            .with_flags(FlagUpdate::zero(0)),
        Comf { f, d } => unary_wf(f, d, r, next, |v| !v),
        Decf { f, d } => unary_wf(f, d, r, next, |v| v.wrapping_sub(1)),
        Incf { f, d } => unary_wf(f, d, r, next, |v| v.wrapping_add(1)),
        Movf { f, d } => unary_wf(f, d, r, next, |v| v),
        Decfsz { f, d } => skip_if_zero(f, d, r, pc, |v| v.wrapping_sub(1)),
        Incfsz { f, d } => skip_if_zero(f, d, r, pc, |v| v.wrapping_add(1)),
        Movwf { f } => Outcome::jump(next).with_file(r, f, r.w()),
        Nop => Outcome::jump(next),
        Rlf { f, d } => rlf(f, d, r, next),
        Rrf { f, d } => rrf(f, d, r, next),
        Subwf { f, d } => subwf(f, d, r, next),
        Swapf { f, d } => Outcome::jump(next).store(r, f, d, swap_nibbles(r.get(f))),
        Bcf { f, b } => Outcome::jump(next).with_file(r, f, r.get(f) & !(1 << b)),
        Bsf { f, b } => Outcome::jump(next).with_file(r, f, r.get(f) | (1 << b)),
        Btfsc { f, b } => bit_test(f, b, r, pc, false),
        Btfss { f, b } => bit_test(f, b, r, pc, true),
        Addlw { k } => addlw(k, r, next),
        Andlw { k } => logical_lw(k, r, next, |a, b| a & b),
        Iorlw { k } => logical_lw(k, r, next, |a, b| a | b),
        Xorlw { k } => logical_lw(k, r, next, |a, b| a ^ b),
        Movlw { k } => Outcome::jump(next).with_w(k),
        Sublw { k } => sublw(k, r, next),
        Goto { k } => goto(k, pc),
        Call { k } => call(k, pc, stack)?,
        Return | Retfie => ret(stack)?,
        Retlw { k } => ret(stack)?.with_w(k),
        Clrwdt => clrwdt(next),
        Sleep => sleep(next),
    };
    Ok(outcome.with_computed_goto(r))
}

/// ADDWF: Add W and f
/// - C, DC and Z are set from the 8-bit addition
/// ```text
///  13____8___7___6___0_
/// | 000111 | d |   f   |
///  --------------------
/// ```
fn addwf(f: u8, d: Destination, r: &Registers, next: u16) -> Outcome {
    let sum = add_with_nibble_carry(r.w(), r.get(f));
    Outcome::jump(next)
        .store(r, f, d, sum.value)
        .with_flags(arithmetic_flags(sum.value, sum.carry, sum.digit_carry))
}

/// SUBWF: Subtract W from f
/// - C and DC are set when the high and the low nibble did not borrow
/// ```text
///  13____8___7___6___0_
/// | 000010 | d |   f   |
///  --------------------
/// ```
fn subwf(f: u8, d: Destination, r: &Registers, next: u16) -> Outcome {
    let difference = sub_with_nibble_borrow(r.get(f), r.w());
    Outcome::jump(next).store(r, f, d, difference.value).with_flags(arithmetic_flags(
        difference.value,
        difference.carry,
        difference.digit_carry,
    ))
}

const fn arithmetic_flags(value: u8, carry: bool, digit_carry: bool) -> FlagUpdate {
    FlagUpdate::zero(value)
        .set(Status::C, carry)
        .set(Status::DC, digit_carry)
}

/// ANDWF, IORWF, XORWF: bit-wise operation of W and f, only Z is affected
/// ```text
///  13____8___7___6___0_
/// | 0001oo | d |   f   |
///  --------------------
/// ```
/// with `oo` being 01 for AND, 00 for IOR and 10 for XOR.
fn logical_wf(f: u8, d: Destination, r: &Registers, next: u16, op: fn(u8, u8) -> u8) -> Outcome {
    let value = op(r.w(), r.get(f));
    Outcome::jump(next)
        .store(r, f, d, value)
        .with_flags(FlagUpdate::zero(value))
}

/// COMF, DECF, INCF, MOVF: operation on f alone, only Z is affected
fn unary_wf(f: u8, d: Destination, r: &Registers, next: u16, op: fn(u8) -> u8) -> Outcome {
    let value = op(r.get(f));
    Outcome::jump(next)
        .store(r, f, d, value)
        .with_flags(FlagUpdate::zero(value))
}

/// CLRF: Clear f, Z is always set
/// ```text
///  13____8___7___6___0_
/// | 000001 | 1 |   f   |
///  --------------------
/// ```
fn clrf(f: u8, r: &Registers, next: u16) -> Outcome {
    Outcome::jump(next)
        .with_file(r, f, 0)
        .with_flags(FlagUpdate::zero(0))
}

/// DECFSZ, INCFSZ: decrement or increment f and skip the next instruction if the result
/// is zero. No flags are affected.
/// ```text
///  13____8___7___6___0_
/// | 001o11 | d |   f   |
///  --------------------
/// ```
/// with `o` being 0 for DECFSZ and 1 for INCFSZ.
fn skip_if_zero(f: u8, d: Destination, r: &Registers, pc: u16, op: fn(u8) -> u8) -> Outcome {
    let value = op(r.get(f));
    let next = advance(pc, if value == 0 { 2 } else { 1 });
    Outcome::jump(next).store(r, f, d, value)
}

/// RLF: Rotate f left through carry
/// ```text
///  13____8___7___6___0_
/// | 001101 | d |   f   |
///  --------------------
/// ```
/// The carry shifted in is the one committed before this instruction.
fn rlf(f: u8, d: Destination, r: &Registers, next: u16) -> Outcome {
    let (value, carry) = rotate_left_through_carry(r.get(f), r.status().carry());
    Outcome::jump(next)
        .store(r, f, d, value)
        .with_flags(FlagUpdate::NONE.set(Status::C, carry))
}

/// RRF: Rotate f right through carry
/// ```text
///  13____8___7___6___0_
/// | 001100 | d |   f   |
///  --------------------
/// ```
fn rrf(f: u8, d: Destination, r: &Registers, next: u16) -> Outcome {
    let (value, carry) = rotate_right_through_carry(r.get(f), r.status().carry());
    Outcome::jump(next)
        .store(r, f, d, value)
        .with_flags(FlagUpdate::NONE.set(Status::C, carry))
}

/// BTFSC, BTFSS: skip the next instruction if bit `b` of f is clear (BTFSC) or set (BTFSS)
/// ```text
///  13__10___9_7___6___0_
/// | 011s |  b  |   f   |
///  ---------------------
/// ```
fn bit_test(f: u8, b: u8, r: &Registers, pc: u16, skip_if_set: bool) -> Outcome {
    let is_set = r.get(f) & (1 << b) != 0;
    Outcome::jump(advance(pc, if is_set == skip_if_set { 2 } else { 1 }))
}

/// ADDLW: Add literal and W
/// ```text
///  13___9___8___7______0_
/// | 11111 | x |    k    |
///  ---------------------
/// ```
fn addlw(k: u8, r: &Registers, next: u16) -> Outcome {
    let sum = add_with_nibble_carry(r.w(), k);
    Outcome::jump(next)
        .with_w(sum.value)
        .with_flags(arithmetic_flags(sum.value, sum.carry, sum.digit_carry))
}

/// SUBLW: Subtract W from literal
/// ```text
///  13___9___8___7______0_
/// | 11110 | x |    k    |
///  ---------------------
/// ```
fn sublw(k: u8, r: &Registers, next: u16) -> Outcome {
    let difference = sub_with_nibble_borrow(k, r.w());
    Outcome::jump(next)
        .with_w(difference.value)
        .with_flags(arithmetic_flags(
            difference.value,
            difference.carry,
            difference.digit_carry,
        ))
}

fn logical_lw(k: u8, r: &Registers, next: u16, op: fn(u8, u8) -> u8) -> Outcome {
    let value = op(r.w(), k);
    Outcome::jump(next)
        .with_w(value)
        .with_flags(FlagUpdate::zero(value))
}

/// The 11-bit literal replaces the low PC bits, bits 11 and 12 stay those of `pc`.
const fn paged_target(k: u16, pc: u16) -> u16 {
    (pc & PAGE_MASK) | (k & 0x07FF)
}

/// GOTO: Unconditional branch
/// ```text
///  13_11___10_______0_
/// | 101 |     k      |
///  ------------------
/// ```
const fn goto(k: u16, pc: u16) -> Outcome {
    Outcome::jump(paged_target(k, pc))
}

/// CALL: Call subroutine, the address of the next instruction is pushed
/// ```text
///  13_11___10_______0_
/// | 100 |     k      |
///  ------------------
/// ```
fn call(k: u16, pc: u16, stack: &CallStack) -> Result<Outcome, StackError> {
    if stack.is_full() {
        return Err(StackError::Overflow);
    }
    Ok(Outcome::jump(paged_target(k, pc)).with_stack(StackEffect::Push(advance(pc, 1))))
}

/// RETURN, RETFIE and RETLW continue at the popped return address.
fn ret(stack: &CallStack) -> Result<Outcome, StackError> {
    let address = stack.top().ok_or(StackError::Underflow)?;
    Ok(Outcome::jump(address).with_stack(StackEffect::Pop))
}

/// CLRWDT: sets TO and PD, the watchdog itself is not emulated
const fn clrwdt(next: u16) -> Outcome {
    Outcome::jump(next).with_flags(FlagUpdate::NONE.set(Status::TO, true).set(Status::PD, true))
}

/// SLEEP: sets TO and clears PD, which halts the processor
const fn sleep(next: u16) -> Outcome {
    Outcome::jump(next).with_flags(FlagUpdate::NONE.set(Status::TO, true).set(Status::PD, false))
}
