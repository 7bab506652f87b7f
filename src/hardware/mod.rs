//! Storage collaborators of the core: register file, call stack and program memory.
pub mod memory;
pub mod registers;
pub mod stack;

/// Program memory size of the PIC16F84A in instruction words.
pub const PROGRAM_MEMORY_WORDS: usize = 1024;
/// Size of one instruction word in a program image.
pub const INSTRUCTION_WORD_BYTES: usize = 2;
pub const PROGRAM_MEMORY_BYTES: usize = PROGRAM_MEMORY_WORDS * INSTRUCTION_WORD_BYTES;
/// Number of cells addressable by the 7-bit register-select field.
pub const FILE_REGISTER_COUNT: usize = 128;
pub const CALL_STACK_DEPTH: usize = 8;
/// The program counter is 13 bits wide.
pub const PC_MASK: u16 = 0x1FFF;
