use crate::emulator::instruction::Instruction;
use crate::emulator::opcodes::FileWrite;
use crate::hardware::registers::Status;

/// What one retired instruction changed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Trace {
    /// Address the instruction executed from.
    pub address: u16,
    pub instruction: Instruction,
    pub w_before: u8,
    pub w_after: u8,
    pub status_before: Status,
    pub status_after: Status,
    pub file_write: Option<FileWrite>,
    /// PC the driver continues from, the instruction's own address when it halted.
    pub next_pc: u16,
}

impl Trace {
    #[must_use]
    pub fn status_changed(&self) -> bool {
        self.status_before != self.status_after
    }
    #[must_use]
    pub const fn w_changed(&self) -> bool {
        self.w_before != self.w_after
    }
}

/// Receives a [`Trace`] after each instruction has been applied.
pub trait TraceObserver {
    fn on_retire(&mut self, trace: &Trace);
}
