use crate::emulator;
use crate::emulator::Emulator;
use crate::emulator::trace::{Trace, TraceObserver};
use std::cell::RefCell;
use std::rc::Rc;

/// Little endian program image of `words`.
pub fn program_image(words: &[u16]) -> Vec<u8> {
    words.iter().flat_map(|w| w.to_le_bytes()).collect()
}

pub fn emulator_with_program(words: &[u16]) -> Emulator {
    emulator::from_program_bytes(&program_image(words)).unwrap()
}

/// Observer keeping every trace, the traces stay readable through the shared handle.
pub struct RecordingObserver {
    traces: Rc<RefCell<Vec<Trace>>>,
}
impl RecordingObserver {
    pub fn new() -> (Self, Rc<RefCell<Vec<Trace>>>) {
        let traces = Rc::new(RefCell::new(Vec::new()));
        (
            Self {
                traces: Rc::clone(&traces),
            },
            traces,
        )
    }
}
impl TraceObserver for RecordingObserver {
    fn on_retire(&mut self, trace: &Trace) {
        self.traces.borrow_mut().push(*trace);
    }
}
