//! # PIC16F84A Emulator.
//!
//! `pic16-emulator` emulates the instruction set of the PIC16F84A microcontroller.
//! Usage starts with loading a raw program image via `emulator::from_program` or
//! `emulator::from_program_bytes`, each instruction word stored as two little endian bytes.
//!
//!  # Example
//! ```
//! use pic16_emulator::emulator;
//! // MOVLW 0x2A, MOVWF 0x20, SLEEP
//! let image = [0x2A, 0x30, 0xA0, 0x00, 0x63, 0x00];
//! let mut emu = emulator::from_program_bytes(&image).unwrap();
//! emu.execute().unwrap();
//! assert_eq!(emu.registers().get(0x20), 0x2A);
//! ```
//! # Errors
//! - Program larger than the 1K words of program memory
//! - Program length not a multiple of the 2 byte instruction word
//! - Faults while executing, see [`errors::ExecutionError`]

pub mod emulator;
pub mod errors;
pub mod hardware;
pub(crate) mod numbers;
pub mod terminal;
