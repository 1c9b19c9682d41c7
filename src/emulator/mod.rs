pub mod instruction;
mod opcodes;
#[cfg(test)]
pub(crate) mod test_helpers;
pub mod trap_routines;

use crate::emulator::instruction::{Instruction, Operation};
use crate::emulator::trap_routines::Console;
use crate::errors::{ExecutionError, LoadProgramError};
use crate::hardware::keyboard::InputDevice;
use crate::hardware::memory::{LoadedProgram, Memory, PROGRAM_SECTION_START};
use crate::hardware::registers::Registers;
use std::cell::RefCell;
use std::fmt::Debug;
use std::fs;
use std::io::Write;
use std::ops::ControlFlow;
use std::path::Path;
use std::rc::Rc;

/// How a run of the dispatch loop ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TerminalState {
    /// The program executed `TRAP HALT`.
    Halted,
    /// The word fetched from `address` has an opcode without implementation (`RTI`, reserved).
    Aborted { instruction: u16, address: u16 },
    /// The user confirmed a quit request while the program read from the keyboard.
    Quit,
}

/// The public facing emulator used to run LC-3 programs.
pub struct Emulator {
    registers: Registers,
    memory: Memory,
    keyboard: Rc<RefCell<dyn InputDevice>>,
    halt_message: bool,
}

impl Debug for Emulator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Registers: {:?}, Memory: {:?}", self.registers, self.memory)
    }
}

/// Creates an emulator and loads the object file at `path`.
///
/// # Errors
/// - file cannot be read
/// - see [`Emulator::load_image`]
pub fn from_program(
    path: impl AsRef<Path>,
    keyboard: Rc<RefCell<dyn InputDevice>>,
) -> Result<Emulator, LoadProgramError> {
    let path = path.as_ref();
    let image = fs::read(path).map_err(|e| LoadProgramError::ImageUnreadable {
        path: path.display().to_string(),
        message: e.to_string(),
    })?;
    from_image_bytes(&image, keyboard)
}

/// Creates an emulator and loads an object file image given as bytes.
///
/// # Errors
/// - see [`Emulator::load_image`]
pub fn from_image_bytes(
    image: &[u8],
    keyboard: Rc<RefCell<dyn InputDevice>>,
) -> Result<Emulator, LoadProgramError> {
    let mut emu = Emulator::new(keyboard);
    emu.load_image(image)?;
    Ok(emu)
}

impl Emulator {
    /// Constructor method, registers and memory as after power on, PC at `0x3000`.
    #[must_use]
    pub fn new(keyboard: Rc<RefCell<dyn InputDevice>>) -> Self {
        Self {
            registers: Registers::new(),
            memory: Memory::new(Rc::clone(&keyboard)),
            keyboard,
            halt_message: true,
        }
    }

    /// Whether `HALT` prints a message before stopping, default is `true`.
    #[must_use]
    pub fn with_halt_message(mut self, halt_message: bool) -> Self {
        self.halt_message = halt_message;
        self
    }

    /// Loads an object file image into memory, see [`Memory::load_image`].
    ///
    /// # Errors
    /// - Program is missing valid .ORIG header (because it is shorter than one `u16` word)
    /// - Program has an odd number of bytes
    /// - Program does not fit between its origin and the end of memory
    pub fn load_image(&mut self, image: &[u8]) -> Result<LoadedProgram, LoadProgramError> {
        self.memory.load_image(image)
    }

    #[must_use]
    pub const fn registers(&self) -> &Registers {
        &self.registers
    }
    pub const fn registers_mut(&mut self) -> &mut Registers {
        &mut self.registers
    }
    #[must_use]
    pub const fn memory(&self) -> &Memory {
        &self.memory
    }
    pub const fn memory_mut(&mut self) -> &mut Memory {
        &mut self.memory
    }

    /// Puts the registers back to their power on state, memory is kept.
    pub fn reset_registers(&mut self) {
        self.registers = Registers::new();
        debug_assert_eq!(self.registers.pc(), PROGRAM_SECTION_START);
    }

    /// Runs the dispatch loop until the program halts, hits an unimplemented opcode or the
    /// user quits.
    ///
    /// # Errors
    /// - reading from the keyboard or writing to `stdout` failed
    pub fn execute(&mut self, stdout: &mut impl Write) -> Result<TerminalState, ExecutionError> {
        loop {
            if let ControlFlow::Break(state) = self.step(stdout)? {
                log::debug!("Execution ended with {state:?}, {:?}", self.registers);
                return Ok(state);
            }
        }
    }

    /// Fetches the word at PC, increments PC and executes the instruction.
    ///
    /// Returns `Break` with the reached state if the loop has to stop.
    ///
    /// # Errors
    /// - reading from the keyboard or writing to `stdout` failed
    pub fn step(
        &mut self,
        stdout: &mut impl Write,
    ) -> Result<ControlFlow<TerminalState>, ExecutionError> {
        match self.fetch_and_execute(stdout) {
            Err(ExecutionError::QuitRequested) => Ok(ControlFlow::Break(TerminalState::Quit)),
            res => res,
        }
    }

    fn fetch_and_execute(
        &mut self,
        stdout: &mut impl Write,
    ) -> Result<ControlFlow<TerminalState>, ExecutionError> {
        let address = self.registers.pc();
        let i = Instruction::from(self.memory.read(address)?);
        self.registers.set_pc(address.wrapping_add(1));
        log::trace!("{address:#06X}: {i:?}");

        let regs = &mut self.registers;
        let mem = &mut self.memory;
        match i.operation() {
            Operation::Add => opcodes::add(i, regs),
            Operation::And => opcodes::and(i, regs),
            Operation::Not => opcodes::not(i, regs),
            Operation::Br => opcodes::br(i, regs),
            Operation::Jmp => opcodes::jmp_or_ret(i, regs),
            Operation::Jsr => opcodes::jsr(i, regs),
            Operation::Ld => opcodes::ld(i, regs, mem)?,
            Operation::Ldi => opcodes::ldi(i, regs, mem)?,
            Operation::Ldr => opcodes::ldr(i, regs, mem)?,
            Operation::Lea => opcodes::lea(i, regs),
            Operation::St => opcodes::st(i, regs, mem),
            Operation::Sti => opcodes::sti(i, regs, mem)?,
            Operation::Str => opcodes::str(i, regs, mem),
            Operation::Trap => {
                let mut console = Console {
                    keyboard: &*self.keyboard,
                    stdout,
                    halt_message: self.halt_message,
                };
                if trap_routines::dispatch(i, regs, mem, &mut console)?.is_break() {
                    return Ok(ControlFlow::Break(TerminalState::Halted));
                }
            }
            Operation::Rti | Operation::Reserved => {
                log::error!(
                    "Illegal opcode {:?} in {:#06X} at {address:#06X}",
                    i.operation(),
                    i.bits()
                );
                return Ok(ControlFlow::Break(TerminalState::Aborted {
                    instruction: i.bits(),
                    address,
                }));
            }
        }
        Ok(ControlFlow::Continue(()))
    }
}
