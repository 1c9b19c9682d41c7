use clap::Parser;
use lc3_vm::emulator::{self, TerminalState};
use lc3_vm::terminal::{self, TerminalInputDevice, TerminalOutput};
use std::cell::RefCell;
use std::io;
use std::path::PathBuf;
use std::process::ExitCode;
use std::rc::Rc;

/// LC-3 virtual machine, runs an assembled object file starting at x3000.
#[derive(Parser, Debug)]
#[command(version, about)]
struct Args {
    /// Object file: big endian .ORIG word followed by the program words
    image: PathBuf,

    /// Key asking for confirmation to quit while the program reads the keyboard
    #[arg(long, default_value_t = 'q')]
    quit_key: char,

    /// Do not print a message when the program halts
    #[arg(long)]
    no_halt_message: bool,
}

fn main() -> ExitCode {
    env_logger::init();
    let args = Args::parse();

    let keyboard = Rc::new(RefCell::new(TerminalInputDevice::new(Some(args.quit_key))));
    let emu = match emulator::from_program(&args.image, keyboard) {
        Ok(emu) => emu,
        Err(e) => {
            eprintln!("{e}");
            return ExitCode::from(2);
        }
    };
    let mut emu = emu.with_halt_message(!args.no_halt_message);

    let result = {
        let _lock = terminal::set_terminal_raw(io::stdout());
        emu.execute(&mut TerminalOutput::new(io::stdout()))
    };
    match result {
        Ok(TerminalState::Halted | TerminalState::Quit) => ExitCode::SUCCESS,
        Ok(TerminalState::Aborted {
            instruction,
            address,
        }) => {
            eprintln!("Illegal opcode in instruction {instruction:#06X} at address {address:#06X}");
            ExitCode::from(1)
        }
        Err(e) => {
            eprintln!("{e}");
            ExitCode::from(3)
        }
    }
}
