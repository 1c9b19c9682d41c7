//! System calls reachable through `TRAP`, console I/O and `HALT`.
use crate::emulator::instruction::Instruction;
use crate::errors::ExecutionError;
use crate::hardware::keyboard::{self, InputDevice};
use crate::hardware::memory::Memory;
use crate::hardware::registers::Registers;
use std::cell::RefCell;
use std::io::Write;
use std::ops::ControlFlow;

pub const IN_PROMPT: &str = "Enter a character: ";
pub const HALT_MESSAGE: &str = "HALT\n";

/// Trap vectors of the implemented system calls, bits 7 to 0 of a `TRAP` instruction.
/// ```text
///  15__12__11__8___7_______0_
/// | 1111 | 0000 | trapvect8 |
///  -------------------------
/// ```
#[repr(u8)]
#[derive(enumn::N, Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrapVector {
    Getc = 0x20,
    Out = 0x21,
    Puts = 0x22,
    In = 0x23,
    Putsp = 0x24,
    Halt = 0x25,
}

/// Everything a trap routine may touch besides the machine state.
pub struct Console<'a, W: Write> {
    pub keyboard: &'a RefCell<dyn InputDevice>,
    pub stdout: &'a mut W,
    pub halt_message: bool,
}

/// Runs the system call selected by the trap vector of `i`.
///
/// Returns `Break` once the program halted. Unknown vectors are ignored.
///
/// # Errors
/// - reading the keyboard or writing to stdout failed
/// - the user confirmed a quit while the program was reading a character
pub fn dispatch<W: Write>(
    i: Instruction,
    regs: &mut Registers,
    mem: &Memory,
    console: &mut Console<'_, W>,
) -> Result<ControlFlow<()>, ExecutionError> {
    let Some(vector) = TrapVector::n(i.trap_vector()) else {
        log::warn!(
            "Ignoring unknown trap vector {:#04X} at {:#06X}",
            i.trap_vector(),
            regs.pc().wrapping_sub(1)
        );
        return Ok(ControlFlow::Continue(()));
    };
    match vector {
        TrapVector::Getc => get_c(regs, console.keyboard)?,
        TrapVector::Out => out(regs, console.stdout)?,
        TrapVector::Puts => put_s(regs, mem, console.stdout)?,
        TrapVector::In => in_trap(regs, console.keyboard, console.stdout)?,
        TrapVector::Putsp => put_sp(regs, mem, console.stdout)?,
        TrapVector::Halt => return halt(console.stdout, console.halt_message),
    }
    Ok(ControlFlow::Continue(()))
}

/// GETC: Read a single character from the keyboard. The character is not echoed onto the console.
///
/// Its ASCII code is copied into R0.
///
/// # Errors
/// - keyboard could not be read
/// - the character was a confirmed quit request
pub fn get_c(
    regs: &mut Registers,
    keyboard: &RefCell<dyn InputDevice>,
) -> Result<(), ExecutionError> {
    let mut kbd = keyboard.borrow_mut();
    let c = kbd.read()?;
    let c = keyboard::screen_for_quit(&mut *kbd, c)?;
    regs.set(0, c);
    Ok(())
}

/// IN: Print a prompt on the screen and read a single character from the keyboard.
///
/// Otherwise, like 0x20 GETC.
///
/// # Errors
/// - see [`get_c`], writing the prompt failed
pub fn in_trap(
    regs: &mut Registers,
    keyboard: &RefCell<dyn InputDevice>,
    stdout: &mut impl Write,
) -> Result<(), ExecutionError> {
    write_out(IN_PROMPT.as_bytes(), stdout)?;
    get_c(regs, keyboard)
}

/// OUT: Write a character in R0[7:0] to the console display.
///
/// # Errors
/// - writing failed
pub fn out(regs: &Registers, stdout: &mut impl Write) -> Result<(), ExecutionError> {
    let [low, _high] = regs.get(0).to_le_bytes();
    write_out(&[low], stdout)
}

/// PUTS: print null-delimited string with one character per word from register 0's address
///
/// # Errors
/// - writing failed
pub fn put_s(
    regs: &Registers,
    mem: &Memory,
    stdout: &mut impl Write,
) -> Result<(), ExecutionError> {
    let mut s = Vec::with_capacity(120);
    for_each_word(regs.get(0), mem, |word| {
        let [low, _high] = word.to_le_bytes();
        s.push(low);
        ControlFlow::Continue(())
    });
    write_out(&s, stdout)
}

/// PUTSP: Packed version of PUTS
///
/// The ASCII code contained in bits [7:0] of a memory location is written to the console first.
/// Writing stops at a 0x0000 word or at the first 0x00 character, so the second character of
/// the last memory location can be 0x00.
///
/// # Errors
/// - writing failed
pub fn put_sp(
    regs: &Registers,
    mem: &Memory,
    stdout: &mut impl Write,
) -> Result<(), ExecutionError> {
    let mut s = Vec::with_capacity(120);
    for_each_word(regs.get(0), mem, |word| {
        for c in word.to_le_bytes() {
            if c == 0 {
                return ControlFlow::Break(());
            }
            s.push(c);
        }
        ControlFlow::Continue(())
    });
    write_out(&s, stdout)
}

/// Calls `handle_word` for every word from `address` on until a zero word, a `Break` or
/// one full pass through memory.
///
/// Words are peeked, a string overlapping KBSR does not poll the keyboard.
fn for_each_word(
    address: u16,
    mem: &Memory,
    mut handle_word: impl FnMut(u16) -> ControlFlow<()>,
) {
    let mut current = address;
    for _ in 0..=u16::MAX {
        let word = mem.peek(current);
        if word == 0 || handle_word(word).is_break() {
            break;
        }
        current = current.wrapping_add(1);
    }
}

/// HALT: End program and optionally print a message
///
/// # Errors
/// - writing failed
pub fn halt(
    stdout: &mut impl Write,
    halt_message: bool,
) -> Result<ControlFlow<()>, ExecutionError> {
    if halt_message {
        write_out(HALT_MESSAGE.as_bytes(), stdout)?;
    }
    Ok(ControlFlow::Break(()))
}

fn write_out(data: &[u8], stdout: &mut impl Write) -> Result<(), ExecutionError> {
    stdout.write_all(data)?;
    stdout.flush()?;
    Ok(())
}
