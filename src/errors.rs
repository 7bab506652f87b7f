use thiserror::Error;

/// Errors raised while putting a program image into program memory.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum LoadProgramError {
    #[error("Program too large, got {actual_bytes} bytes while limit is {maximum_bytes}")]
    ProgramTooLarge {
        actual_bytes: usize,
        maximum_bytes: usize,
    },
    #[error(
        "Program is misaligned, {actual_bytes} bytes is not a multiple of the {word_size} byte instruction word"
    )]
    ProgramMisaligned {
        actual_bytes: usize,
        word_size: usize,
    },
    #[error("Program could not be read: {0}")]
    ProgramNotReadable(String),
}

/// Terminal faults of a single fetch-execute step.
///
/// None of these leave partially applied register, flag or stack changes behind.
#[derive(Error, Debug, PartialEq, Eq, Clone, Copy)]
pub enum ExecutionError {
    #[error("Opcode {opcode:#06X} at {address:#06X} is wider than 14 bits")]
    InvalidOpcodeWidth { opcode: u16, address: u16 },
    #[error("Unsupported opcode {opcode:#06X} at {address:#06X}")]
    UnsupportedOpcode { opcode: u16, address: u16 },
    #[error("Processor halted by SLEEP at {address:#06X}")]
    Halted { address: u16 },
    #[error("Call stack overflow at {address:#06X}")]
    StackOverflow { address: u16 },
    #[error("Call stack underflow at {address:#06X}")]
    StackUnderflow { address: u16 },
}
