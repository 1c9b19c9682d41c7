use displaydoc::Display;
use std::error::Error;
use std::io;

// Failures while turning an object file into memory contents.
#[derive(Display, Debug, PartialEq, Eq)]
pub enum LoadProgramError {
    /// Program image is missing its .ORIG header, got {actual_bytes} bytes
    ImageMissingOrigin { actual_bytes: usize },
    /// Program image must consist of 16 bit words, got odd byte count {actual_bytes}
    ImageOddByteCount { actual_bytes: usize },
    /// Program of {words} words does not fit into memory when loaded at {origin:#06X}
    ProgramTooLong { origin: u16, words: usize },
    /// Program image {path} could not be read: {message}
    ImageUnreadable { path: String, message: String },
}
impl Error for LoadProgramError {}

// Failures that stop the dispatch loop outside of `HALT` and illegal opcodes.
#[derive(Display, Debug, PartialEq, Eq)]
pub enum ExecutionError {
    /// Error during reading Stdin or writing program output to Stdout: {0}
    IOInputOutputError(String),
    /// Execution stopped on user request
    QuitRequested,
}
impl Error for ExecutionError {}

impl From<io::Error> for ExecutionError {
    fn from(e: io::Error) -> Self {
        Self::IOInputOutputError(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use googletest::prelude::*;

    #[gtest]
    pub fn test_load_error_messages() {
        expect_that!(
            LoadProgramError::ImageMissingOrigin { actual_bytes: 1 }.to_string(),
            eq("Program image is missing its .ORIG header, got 1 bytes")
        );
        expect_that!(
            LoadProgramError::ProgramTooLong {
                origin: 0xFFFF,
                words: 2
            }
            .to_string(),
            eq("Program of 2 words does not fit into memory when loaded at 0xFFFF")
        );
    }
    #[gtest]
    pub fn test_io_error_conversion() {
        let e = ExecutionError::from(io::Error::other("broken pipe"));
        expect_that!(
            e.to_string(),
            eq("Error during reading Stdin or writing program output to Stdout: broken pipe")
        );
    }
}
