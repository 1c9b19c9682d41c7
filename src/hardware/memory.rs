use crate::errors::{ExecutionError, LoadProgramError};
use crate::hardware::keyboard::{self, InputDevice};
use std::cell::RefCell;
use std::fmt::{Debug, Formatter};
use std::rc::Rc;

pub const PROGRAM_SECTION_START: u16 = 0x3000;
const MEMORY_SIZE_U16: usize = 1 << 16;

/// Memory regions mapped to IO functionality.
#[repr(u16)]
#[derive(enumn::N, Debug, Clone, Copy, PartialEq, Eq)]
pub enum MemoryMappedIOLocations {
    /// Keyboard Status Register
    Kbsr = 0xFE00,
    /// Keyboard Data Register
    Kbdr = 0xFE02,
}

/// Location and size of the image placed by [`Memory::load_image`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoadedProgram {
    pub origin: u16,
    pub words: usize,
}

/// An abstraction for the LC-3 memory including application but excluding registers.
pub struct Memory {
    /// Index equals memory address
    data: Vec<u16>,
    keyboard: Rc<RefCell<dyn InputDevice>>,
}

impl Debug for Memory {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let used = self.data.iter().filter(|w| **w != 0).count();
        write!(
            f,
            "Non-zero words: {used:?}, KBSR: {:#06X}, KBDR: {:#06X}",
            self.peek(MemoryMappedIOLocations::Kbsr as u16),
            self.peek(MemoryMappedIOLocations::Kbdr as u16)
        )
    }
}

impl Memory {
    const KEYBOARD_STATUS_REGISTER_SET: u16 = 1 << 15;
    const KEYBOARD_STATUS_REGISTER_UNSET: u16 = 0;

    pub fn new(keyboard: Rc<RefCell<dyn InputDevice>>) -> Self {
        Self {
            data: vec![0x0u16; MEMORY_SIZE_U16],
            keyboard,
        }
    }

    /// Reads the word at `address`.
    ///
    /// Reading the keyboard status register polls the keyboard first: a pending character
    /// sets bit 15 of KBSR and is stored in KBDR, otherwise KBSR is cleared and KBDR kept.
    ///
    /// # Errors
    /// - the keyboard could not be polled
    /// - the polled character was a confirmed quit request
    pub fn read(&mut self, address: u16) -> Result<u16, ExecutionError> {
        if MemoryMappedIOLocations::n(address) == Some(MemoryMappedIOLocations::Kbsr) {
            self.poll_keyboard()?;
        }
        Ok(self.peek(address))
    }

    fn poll_keyboard(&mut self) -> Result<(), ExecutionError> {
        let polled = {
            let mut kbd = self.keyboard.borrow_mut();
            match kbd.poll()? {
                Some(c) => Some(keyboard::screen_for_quit(&mut *kbd, c)?),
                None => None,
            }
        };
        // any reported character sets KBSR, including code 0
        match polled {
            Some(c) => {
                self.set(
                    MemoryMappedIOLocations::Kbsr,
                    Self::KEYBOARD_STATUS_REGISTER_SET,
                );
                self.set(MemoryMappedIOLocations::Kbdr, c);
            }
            None => self.set(
                MemoryMappedIOLocations::Kbsr,
                Self::KEYBOARD_STATUS_REGISTER_UNSET,
            ),
        }
        Ok(())
    }

    fn set(&mut self, location: MemoryMappedIOLocations, value: u16) {
        self.data[usize::from(location as u16)] = value;
    }

    /// Reads the stored word without triggering memory mapped IO.
    #[must_use]
    pub fn peek(&self, address: u16) -> u16 {
        self.data[usize::from(address)]
    }

    pub fn write(&mut self, address: u16, value: u16) {
        self.data[usize::from(address)] = value;
    }

    /// Loads an object file image: a big endian `.ORIG` word followed by big endian words
    /// placed contiguously from that origin on.
    ///
    /// # Errors
    /// - image shorter than the `.ORIG` header
    /// - odd number of bytes
    /// - program runs past the end of the address space
    pub fn load_image(&mut self, image: &[u8]) -> Result<LoadedProgram, LoadProgramError> {
        if image.len() < 2 {
            return Err(LoadProgramError::ImageMissingOrigin {
                actual_bytes: image.len(),
            });
        }
        if image.len() % 2 != 0 {
            return Err(LoadProgramError::ImageOddByteCount {
                actual_bytes: image.len(),
            });
        }
        let (header, rest) = image.split_at(2);
        let origin = u16::from_be_bytes([header[0], header[1]]);
        let words = rest.len() / 2;
        let start = usize::from(origin);
        if start + words > MEMORY_SIZE_U16 {
            return Err(LoadProgramError::ProgramTooLong { origin, words });
        }
        for (target, pair) in self.data[start..start + words]
            .iter_mut()
            .zip(rest.chunks_exact(2))
        {
            *target = u16::from_be_bytes([pair[0], pair[1]]);
        }
        log::debug!("Loaded {words} words at {origin:#06X}");
        Ok(LoadedProgram { origin, words })
    }
}
