//! # LC-3 Virtual Machine.
//!
//! `lc3-vm` runs assembled object files of the Little Computer 3.
//! Usage starts with loading a program via `emulator::from_program` or
//! `emulator::from_image_bytes`, execution via `emulator::Emulator::execute`.
//!
//!  # Example
//! ```
//! use lc3_vm::emulator::{self, TerminalState};
//! use lc3_vm::hardware::keyboard::ScriptedInputDevice;
//! use std::cell::RefCell;
//! use std::rc::Rc;
//!
//! // .ORIG x3000; LEA R0, #2; PUTS; HALT; .STRINGZ "Hi"
//! let image = [
//!     0x30, 0x00, 0xE0, 0x02, 0xF0, 0x22, 0xF0, 0x25, 0x00, 0x48, 0x00, 0x69, 0x00, 0x00,
//! ];
//! let keyboard = Rc::new(RefCell::new(ScriptedInputDevice::new(b"")));
//! let mut emu = emulator::from_image_bytes(&image, keyboard).unwrap();
//! let mut output = Vec::new();
//! assert_eq!(emu.execute(&mut output).unwrap(), TerminalState::Halted);
//! assert_eq!(output, b"HiHALT\n");
//! ```
//! # Errors
//! - Program is missing valid .ORIG header (because it is shorter than one `u16` word)
//! - Program consists of an odd number of bytes
//! - Program does not fit into memory after its origin

pub mod emulator;
pub mod errors;
pub mod hardware;
pub(crate) mod numbers;
pub mod terminal;
