use crate::emulator::trace::{Trace, TraceObserver};
use crossterm::queue;
use crossterm::style::{Color, Print, PrintStyledContent, ResetColor, SetForegroundColor, Stylize};
use std::io;
use std::io::Write;

/// Prints every retired instruction followed by the STATUS and W changes it made.
pub struct TerminalTracer<W: Write> {
    out: W,
}

impl<W: Write> TerminalTracer<W> {
    pub const fn new(out: W) -> Self {
        Self { out }
    }
    pub fn into_inner(self) -> W {
        self.out
    }

    fn print(&mut self, trace: &Trace) -> io::Result<()> {
        queue!(
            self.out,
            SetForegroundColor(Color::DarkGrey),
            Print(format!("{:#06X}: ", trace.address)),
            ResetColor,
            Print(trace.instruction),
            Print("\n")
        )?;
        if trace.status_changed() {
            queue!(
                self.out,
                Print(format!("STATUS:[{}] -> [", trace.status_before)),
                PrintStyledContent(trace.status_after.to_string().yellow()),
                Print("]\n")
            )?;
        }
        if trace.w_changed() {
            queue!(
                self.out,
                Print(format!("W: {:#04X} -> ", trace.w_before)),
                PrintStyledContent(format!("{:#04X}", trace.w_after).cyan()),
                Print("\n")
            )?;
        }
        self.out.flush()
    }
}

impl<W: Write> TraceObserver for TerminalTracer<W> {
    fn on_retire(&mut self, trace: &Trace) {
        // tracing is best effort, emulation goes on
        if let Err(e) = self.print(trace) {
            eprintln!("Error writing trace {e}");
        }
    }
}
