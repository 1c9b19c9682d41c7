//! Machine state of the LC-3: register file, memory with its memory mapped keyboard and the
//! keyboard abstraction itself.
pub mod keyboard;
pub mod memory;
pub mod registers;
