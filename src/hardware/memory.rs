use crate::errors::LoadProgramError;
use crate::hardware::{INSTRUCTION_WORD_BYTES, PROGRAM_MEMORY_BYTES, PROGRAM_MEMORY_WORDS};
use std::fmt::{Debug, Formatter};
use std::ops::Index;

/// Flash program memory holding 14-bit instruction words.
///
/// Only [`ProgramMemory::load_program`] writes to it, execution only reads.
pub struct ProgramMemory {
    /// Index equals word address
    data: Vec<u16>,
    instruction_count: usize,
}

impl Debug for ProgramMemory {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let slice = self.program_slice();
        write!(
            f,
            "Instructions: {:?}, Program section contents: {slice:04X?}",
            slice.len()
        )
    }
}

/// Program memory aliases: only the low address bits select a word.
impl Index<u16> for ProgramMemory {
    type Output = u16;
    fn index(&self, address: u16) -> &Self::Output {
        &self.data[usize::from(address) % PROGRAM_MEMORY_WORDS]
    }
}

impl Default for ProgramMemory {
    fn default() -> Self {
        Self::new()
    }
}

impl ProgramMemory {
    #[must_use]
    pub fn new() -> Self {
        Self {
            data: vec![0x0u16; PROGRAM_MEMORY_WORDS],
            instruction_count: 0,
        }
    }

    /// Copies a raw program image into memory starting at address 0.
    ///
    /// Instruction words are stored little endian, two bytes each. Words past the end of the
    /// image read as NOP.
    ///
    /// # Errors
    /// - Program larger than program memory
    /// - Program length not a multiple of the instruction word size
    ///
    /// Memory is unchanged on error.
    pub fn load_program(&mut self, image: &[u8]) -> Result<(), LoadProgramError> {
        if image.len() > PROGRAM_MEMORY_BYTES {
            return Err(LoadProgramError::ProgramTooLarge {
                actual_bytes: image.len(),
                maximum_bytes: PROGRAM_MEMORY_BYTES,
            });
        }
        if image.len() % INSTRUCTION_WORD_BYTES != 0 {
            return Err(LoadProgramError::ProgramMisaligned {
                actual_bytes: image.len(),
                word_size: INSTRUCTION_WORD_BYTES,
            });
        }
        let words = image
            .chunks_exact(INSTRUCTION_WORD_BYTES)
            .map(|pair| u16::from_le_bytes([pair[0], pair[1]]));
        self.data.fill(0);
        for (slot, word) in self.data.iter_mut().zip(words) {
            *slot = word;
        }
        self.instruction_count = image.len() / INSTRUCTION_WORD_BYTES;
        Ok(())
    }

    /// The word at `address`, which wraps around the memory size.
    #[must_use]
    pub fn fetch(&self, address: u16) -> u16 {
        self[address]
    }

    #[must_use]
    pub const fn instruction_count(&self) -> usize {
        self.instruction_count
    }

    /// The words written by the last successful load.
    #[must_use]
    pub fn program_slice(&self) -> &[u16] {
        &self.data[..self.instruction_count]
    }
}
