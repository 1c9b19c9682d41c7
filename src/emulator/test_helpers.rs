use crate::emulator::{Emulator, TerminalState};
use crate::hardware::keyboard::ScriptedInputDevice;
use crate::hardware::memory::Memory;
use crate::hardware::registers::Registers;
use std::cell::RefCell;
use std::io;
use std::io::Write;
use std::rc::Rc;

pub struct StringWriter {
    vec: Vec<u8>,
}
impl Write for StringWriter {
    fn write(&mut self, data: &[u8]) -> Result<usize, io::Error> {
        self.vec.write(data)
    }
    fn flush(&mut self) -> Result<(), io::Error> {
        Ok(())
    }
}
impl StringWriter {
    pub fn new() -> Self {
        let vec = Vec::<u8>::with_capacity(120);
        Self { vec }
    }
    pub fn get_string(&self) -> String {
        String::from_utf8(self.vec.clone()).unwrap()
    }
}

/// Emulator with a program loaded at `0x3000`, scripted keyboard input and captured output.
pub struct FakeEmulator {
    inner: Emulator,
    keyboard: Rc<RefCell<ScriptedInputDevice>>,
    stdout: StringWriter,
}
impl FakeEmulator {
    pub fn new(program_no_header: &[u16]) -> Self {
        let mut image = Vec::with_capacity(2 * program_no_header.len() + 2);
        image.extend_from_slice(&0x3000u16.to_be_bytes());
        for word in program_no_header {
            image.extend_from_slice(&word.to_be_bytes());
        }
        let keyboard = Rc::new(RefCell::new(ScriptedInputDevice::new(b"")));
        let emu = crate::emulator::from_image_bytes(&image, keyboard.clone()).unwrap();
        Self {
            inner: emu,
            keyboard,
            stdout: StringWriter::new(),
        }
    }
    pub fn add_stdin_input(&mut self, input: &[u8]) -> &mut Self {
        self.keyboard.borrow_mut().push_input(input);
        self
    }
    pub fn with_quit_key(&mut self, key: u8, confirm: bool) -> &mut Self {
        let kbd = std::mem::take(&mut *self.keyboard.borrow_mut());
        *self.keyboard.borrow_mut() = kbd.with_quit_key(key, confirm);
        self
    }
    pub fn with_halt_message(&mut self, halt_message: bool) -> &mut Self {
        self.inner.halt_message = halt_message;
        self
    }
    pub fn run(&mut self) -> TerminalState {
        self.inner.execute(&mut self.stdout).unwrap()
    }
    pub fn output(&self) -> String {
        self.stdout.get_string()
    }
    pub fn registers(&self) -> &Registers {
        self.inner.registers()
    }
    pub fn reset_registers(&mut self) {
        self.inner.reset_registers();
    }
    pub fn get_parts(&mut self) -> (&mut Registers, &mut Memory, &mut StringWriter) {
        (
            &mut self.inner.registers,
            &mut self.inner.memory,
            &mut self.stdout,
        )
    }
}
