use crate::errors::ExecutionError;
use std::collections::VecDeque;
use std::io;

/// Providing Keyboard Input independent of an implementation.
pub trait InputDevice {
    /// Returns a pending character if there is one, does not block.
    ///
    /// # Errors
    /// - the underlying device could not be queried
    fn poll(&mut self) -> io::Result<Option<u16>>;
    /// Waits until a character is available and returns it.
    ///
    /// # Errors
    /// - the underlying device could not be read
    fn read(&mut self) -> io::Result<u16>;
    /// True if `character` is the signal of the user to stop the machine.
    fn requests_quit(&self, _character: u16) -> bool {
        false
    }
    /// Asks the user whether to really stop the machine.
    ///
    /// # Errors
    /// - the answer could not be read
    fn confirm_quit(&mut self) -> io::Result<bool> {
        Ok(false)
    }
}

/// Passes `character` on unless the user asked for and confirmed a quit.
pub(crate) fn screen_for_quit(
    device: &mut dyn InputDevice,
    character: u16,
) -> Result<u16, ExecutionError> {
    if device.requests_quit(character) && device.confirm_quit()? {
        log::debug!("Quit confirmed after character {character:#04X}");
        return Err(ExecutionError::QuitRequested);
    }
    Ok(character)
}

/// Input device replaying a fixed sequence of characters.
///
/// Polling yields no character once the sequence is exhausted, a blocking read fails then.
#[derive(Debug, Default)]
pub struct ScriptedInputDevice {
    pending: VecDeque<u16>,
    quit_key: Option<u16>,
    confirm_quit: bool,
}

impl ScriptedInputDevice {
    #[must_use]
    pub fn new(input: &[u8]) -> Self {
        Self {
            pending: input.iter().copied().map(u16::from).collect(),
            quit_key: None,
            confirm_quit: false,
        }
    }
    /// Treat `key` as quit request and answer the confirmation with `confirm`.
    #[must_use]
    pub fn with_quit_key(mut self, key: u8, confirm: bool) -> Self {
        self.quit_key = Some(u16::from(key));
        self.confirm_quit = confirm;
        self
    }
    pub fn push_input(&mut self, input: &[u8]) {
        self.pending.extend(input.iter().copied().map(u16::from));
    }
    #[must_use]
    pub fn remaining(&self) -> usize {
        self.pending.len()
    }
}

impl InputDevice for ScriptedInputDevice {
    fn poll(&mut self) -> io::Result<Option<u16>> {
        Ok(self.pending.pop_front())
    }
    fn read(&mut self) -> io::Result<u16> {
        self.pending
            .pop_front()
            .ok_or_else(|| io::Error::new(io::ErrorKind::UnexpectedEof, "No input available"))
    }
    fn requests_quit(&self, character: u16) -> bool {
        self.quit_key == Some(character)
    }
    fn confirm_quit(&mut self) -> io::Result<bool> {
        Ok(self.confirm_quit)
    }
}
