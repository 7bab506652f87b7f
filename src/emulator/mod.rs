//! Decode-execute engine and fetch-execute driver.
pub mod instruction;
pub mod opcodes;
#[cfg(test)]
pub(crate) mod test_helpers;
pub mod trace;

use crate::emulator::instruction::{DecodeError, Instruction};
use crate::emulator::opcodes::{Outcome, StackEffect};
use crate::emulator::trace::{Trace, TraceObserver};
use crate::errors::{ExecutionError, LoadProgramError};
use crate::hardware::memory::ProgramMemory;
use crate::hardware::registers::{Registers, SpecialRegister, Status};
use crate::hardware::stack::{CallStack, StackError};
use std::fmt::{Debug, Formatter};
use std::fs;
use std::path::Path;

/// Creates an emulator with the raw program image at `path` loaded.
///
/// # Errors
/// - File not readable
/// - See [`Emulator::load_program`]
pub fn from_program(path: impl AsRef<Path>) -> Result<Emulator, LoadProgramError> {
    let image =
        fs::read(path).map_err(|e| LoadProgramError::ProgramNotReadable(e.to_string()))?;
    from_program_bytes(&image)
}

/// Creates an emulator with `image` loaded.
///
/// # Errors
/// - See [`Emulator::load_program`]
pub fn from_program_bytes(image: &[u8]) -> Result<Emulator, LoadProgramError> {
    let mut emu = Emulator::new();
    emu.load_program(image)?;
    Ok(emu)
}

/// The public facing emulator used to run PIC16F84A programs.
pub struct Emulator {
    registers: Registers,
    stack: CallStack,
    memory: ProgramMemory,
    observer: Option<Box<dyn TraceObserver>>,
}

impl Debug for Emulator {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Emulator")
            .field("registers", &self.registers)
            .field("stack", &self.stack)
            .field("memory", &self.memory)
            .field("observed", &self.observer.is_some())
            .finish()
    }
}

impl Default for Emulator {
    fn default() -> Self {
        Self::new()
    }
}

impl Emulator {
    /// Constructor method, registers hold their power-on values and the stack is empty.
    #[must_use]
    pub fn new() -> Self {
        let mut stack = CallStack::new();
        stack.initialize();
        Self {
            registers: Registers::new(),
            stack,
            memory: ProgramMemory::new(),
            observer: None,
        }
    }

    /// Loads a raw little endian program image into program memory starting at address 0.
    ///
    /// # Errors
    /// - Program larger than program memory
    /// - Program length not a multiple of the instruction word size
    pub fn load_program(&mut self, image: &[u8]) -> Result<(), LoadProgramError> {
        self.memory.load_program(image)
    }

    #[must_use]
    pub const fn registers(&self) -> &Registers {
        &self.registers
    }
    pub const fn registers_mut(&mut self) -> &mut Registers {
        &mut self.registers
    }
    #[must_use]
    pub const fn stack(&self) -> &CallStack {
        &self.stack
    }
    #[must_use]
    pub const fn memory(&self) -> &ProgramMemory {
        &self.memory
    }

    /// Power-on reset of registers and stack, the program stays loaded.
    pub fn reset_registers(&mut self) {
        self.registers.initialize_all();
        self.stack.initialize();
    }

    pub fn set_observer(&mut self, observer: Box<dyn TraceObserver>) {
        self.observer = Some(observer);
    }
    pub fn take_observer(&mut self) -> Option<Box<dyn TraceObserver>> {
        self.observer.take()
    }

    /// Executes `opcode` as if fetched from `pc` and returns the PC of the next instruction.
    ///
    /// The PC registers are not written, that is up to the caller. An instruction that clears
    /// PD halts the processor and returns `pc` itself.
    ///
    /// # Errors
    /// - `InvalidOpcodeWidth`: bit 14 or 15 set
    /// - `UnsupportedOpcode`: reserved encoding
    /// - `StackOverflow`, `StackUnderflow`
    ///
    /// Nothing is modified on error.
    pub fn execute_opcode(&mut self, opcode: u16, pc: u16) -> Result<u16, ExecutionError> {
        let instruction = Instruction::try_from(opcode).map_err(|e| match e {
            DecodeError::InvalidWidth => ExecutionError::InvalidOpcodeWidth {
                opcode,
                address: pc,
            },
            DecodeError::Unsupported => ExecutionError::UnsupportedOpcode {
                opcode,
                address: pc,
            },
        })?;
        let outcome = opcodes::evaluate(instruction, pc, &self.registers, &self.stack)
            .map_err(|e| stack_error(e, pc))?;

        let w_before = self.registers.w();
        let status_before = self.registers.status();
        self.apply(&outcome).map_err(|e| stack_error(e, pc))?;

        // a halting instruction leaves the PC where it is
        let next_pc = if self.registers.status().power_down() {
            outcome.next_pc
        } else {
            pc
        };
        if let Some(observer) = self.observer.as_mut() {
            observer.on_retire(&Trace {
                address: pc,
                instruction,
                w_before,
                w_after: self.registers.w(),
                status_before,
                status_after: self.registers.status(),
                file_write: outcome.file,
                next_pc,
            });
        }
        Ok(next_pc)
    }

    /// Commits an outcome, the stack first as it is the only part that can fail.
    fn apply(&mut self, outcome: &Outcome) -> Result<(), StackError> {
        match outcome.stack {
            StackEffect::None => {}
            StackEffect::Push(address) => self.stack.push(address)?,
            StackEffect::Pop => {
                self.stack.pop()?;
            }
        }
        let mut status = self.registers.status();
        if let Some(write) = outcome.file {
            if write.address == SpecialRegister::Status.address() {
                status = Status::from_bits(
                    (write.value & !Status::READ_ONLY) | (status.bits() & Status::READ_ONLY),
                );
            } else {
                self.registers.set(write.address, write.value);
            }
        }
        if let Some(w) = outcome.w {
            self.registers.set_w(w);
        }
        self.registers.set_status(outcome.flags.apply(status));
        Ok(())
    }

    /// Fetches, executes and retires the instruction the PC points to.
    ///
    /// # Errors
    /// - Decode and stack errors of [`Emulator::execute_opcode`], nothing is modified then
    /// - `Halted` if PD is clear after executing, the PC is not advanced then
    pub fn step(&mut self) -> Result<(), ExecutionError> {
        let pc = self.registers.pc();
        let opcode = self.memory.fetch(pc);
        let next_pc = self.execute_opcode(opcode, pc)?;
        if !self.registers.status().power_down() {
            return Err(ExecutionError::Halted { address: pc });
        }
        self.registers.set_pc(next_pc);
        Ok(())
    }

    /// Runs until the processor halts.
    ///
    /// # Errors
    /// - Any fault of [`Emulator::step`] except `Halted`
    pub fn execute(&mut self) -> Result<(), ExecutionError> {
        loop {
            match self.step() {
                Ok(()) => {}
                Err(ExecutionError::Halted { .. }) => return Ok(()),
                Err(e) => return Err(e),
            }
        }
    }

    /// Runs at most `max_steps` instructions and returns how many were retired.
    ///
    /// # Errors
    /// - Any fault of [`Emulator::step`] except `Halted`
    pub fn execute_steps(&mut self, max_steps: usize) -> Result<usize, ExecutionError> {
        for retired in 0..max_steps {
            match self.step() {
                Ok(()) => {}
                Err(ExecutionError::Halted { .. }) => return Ok(retired),
                Err(e) => return Err(e),
            }
        }
        Ok(max_steps)
    }
}

const fn stack_error(error: StackError, address: u16) -> ExecutionError {
    match error {
        StackError::Overflow => ExecutionError::StackOverflow { address },
        StackError::Underflow => ExecutionError::StackUnderflow { address },
    }
}
