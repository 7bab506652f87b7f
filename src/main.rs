use clap::Parser;
use pic16_emulator::emulator;
use pic16_emulator::terminal::TerminalTracer;
use std::error::Error;
use std::io;
use std::path::PathBuf;

/// Runs a PIC16F84A program image and traces every instruction
#[derive(Parser, Debug)]
#[command(name = "pic16-emulator", version)]
struct Args {
    /// Raw program image, two little endian bytes per instruction word
    program: PathBuf,

    /// Stop after this many instructions instead of running until SLEEP
    max_steps: Option<usize>,
}

fn main() -> Result<(), Box<dyn Error>> {
    let args = Args::parse();

    let mut emu = emulator::from_program(&args.program)?;
    emu.set_observer(Box::new(TerminalTracer::new(io::stdout())));
    match args.max_steps {
        Some(limit) => {
            let retired = emu.execute_steps(limit)?;
            println!("Retired {retired} instructions");
        }
        None => emu.execute()?,
    }
    println!("{:?}", emu.registers());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use googletest::prelude::*;

    #[gtest]
    pub fn test_args_program_only() {
        let args = Args::try_parse_from(["pic16-emulator", "blink.bin"]).unwrap();
        expect_that!(args.program, eq(&PathBuf::from("blink.bin")));
        expect_that!(args.max_steps, eq(None));
    }
    #[gtest]
    pub fn test_args_with_step_limit() {
        let args = Args::try_parse_from(["pic16-emulator", "blink.bin", "100"]).unwrap();
        expect_that!(args.max_steps, eq(Some(100)));
    }
    #[gtest]
    pub fn test_args_rejects_bad_step_limit() {
        expect_that!(
            Args::try_parse_from(["pic16-emulator", "blink.bin", "many"]).is_err(),
            eq(true)
        );
    }
    #[gtest]
    pub fn test_args_help_is_not_a_program() {
        let err = Args::try_parse_from(["pic16-emulator", "--help"]).unwrap_err();
        expect_that!(err.kind(), eq(clap::error::ErrorKind::DisplayHelp));
    }
}
