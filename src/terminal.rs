use crate::hardware::keyboard::InputDevice;
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use crossterm::{ExecutableCommand, terminal};
use std::io;
use std::io::Write;
use std::time::Duration;

const CTRL_C: u16 = 0x03;
const QUIT_QUESTION: &str = "\nWould you like to quit? [y/n] ";

pub struct RawLock {}

impl Drop for RawLock {
    fn drop(&mut self) {
        // terminal stays in raw mode but no means to repair
        if let Err(e) = terminal::disable_raw_mode() {
            log::error!("Error resetting terminal {e}");
        }
    }
}

/// Set terminal to raw in best-effort mode, only log on failure, since it does not work when
/// stdin is not a terminal, e.g. for piped input.
pub fn set_terminal_raw(mut stdout: impl Write) -> RawLock {
    if let Err(e) =
        terminal::enable_raw_mode().and_then(|()| stdout.execute(terminal::EnableLineWrap))
    {
        log::warn!("Could not set terminal to raw mode: {e}");
    }
    RawLock {}
}

/// Translates a key press into the character code the LC-3 program sees.
fn character_code(event: &Event) -> Option<u16> {
    let Event::Key(KeyEvent {
        code,
        modifiers,
        kind: KeyEventKind::Press,
        ..
    }) = event
    else {
        return None;
    };
    match code {
        KeyCode::Char('c') if modifiers.contains(KeyModifiers::CONTROL) => Some(CTRL_C),
        KeyCode::Char(c) if c.is_ascii() => u8::try_from(*c).ok().map(u16::from),
        KeyCode::Enter => Some(0x0A),
        KeyCode::Backspace => Some(0x08),
        KeyCode::Tab => Some(0x09),
        KeyCode::Esc => Some(0x1B),
        _ => None,
    }
}

/// Keyboard of the terminal the emulator runs in, expects raw mode, see [`set_terminal_raw`].
///
/// CTRL-C and the configured quit key ask the user whether to quit.
pub struct TerminalInputDevice {
    quit_key: Option<u16>,
}

impl TerminalInputDevice {
    #[must_use]
    pub fn new(quit_key: Option<char>) -> Self {
        Self {
            quit_key: quit_key
                .filter(char::is_ascii)
                .and_then(|c| u8::try_from(c).ok())
                .map(u16::from),
        }
    }
}

impl InputDevice for TerminalInputDevice {
    fn poll(&mut self) -> io::Result<Option<u16>> {
        while event::poll(Duration::from_secs(0))? {
            if let Some(c) = character_code(&event::read()?) {
                return Ok(Some(c));
            }
        }
        Ok(None)
    }
    fn read(&mut self) -> io::Result<u16> {
        loop {
            if let Some(c) = character_code(&event::read()?) {
                return Ok(c);
            }
        }
    }
    fn requests_quit(&self, character: u16) -> bool {
        character == CTRL_C || self.quit_key == Some(character)
    }
    fn confirm_quit(&mut self) -> io::Result<bool> {
        let mut stdout = TerminalOutput::new(io::stdout());
        stdout.write_all(QUIT_QUESTION.as_bytes())?;
        stdout.flush()?;
        let answer = loop {
            match self.read()? {
                c if c == u16::from(b'y') || c == u16::from(b'Y') => break true,
                c if c == u16::from(b'n') || c == u16::from(b'N') || c == 0x1B => break false,
                _ => {}
            }
        };
        stdout.write_all(b"\n")?;
        stdout.flush()?;
        Ok(answer)
    }
}

/// Writer for a terminal in raw mode, where a line feed does not return the cursor.
pub struct TerminalOutput<W: Write> {
    inner: W,
}

impl<W: Write> TerminalOutput<W> {
    pub const fn new(inner: W) -> Self {
        Self { inner }
    }
}

impl<W: Write> Write for TerminalOutput<W> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        for (idx, part) in buf.split(|b| *b == b'\n').enumerate() {
            if idx > 0 {
                self.inner.write_all(b"\r\n")?;
            }
            self.inner.write_all(part)?;
        }
        Ok(buf.len())
    }
    fn flush(&mut self) -> io::Result<()> {
        self.inner.flush()
    }
}
