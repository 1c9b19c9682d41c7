use crate::hardware::memory::PROGRAM_SECTION_START;
use crate::numbers;
use std::fmt::{Debug, Formatter};

/// The register file: R0 to R7, the program counter and the condition register.
#[derive(Clone, PartialEq, Eq)]
pub struct Registers {
    general_purpose: [u16; 8],
    pc: u16,
    cond: ConditionFlag,
}

impl Default for Registers {
    fn default() -> Self {
        Self::new()
    }
}

impl Registers {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            general_purpose: [0u16; 8],
            pc: PROGRAM_SECTION_START,
            cond: ConditionFlag::Zero,
        }
    }

    /// # Panics
    /// - `r` does not name one of R0 to R7
    #[must_use]
    pub fn get(&self, r: u8) -> u16 {
        assert!(r <= 7, "Invalid general purpose register get");
        self.general_purpose[usize::from(r)]
    }
    /// # Panics
    /// - `r` does not name one of R0 to R7
    pub fn set(&mut self, r: u8, value: u16) {
        assert!(r <= 7, "Invalid general purpose register set");
        self.general_purpose[usize::from(r)] = value;
    }
    #[must_use]
    pub const fn pc(&self) -> u16 {
        self.pc
    }
    pub const fn set_pc(&mut self, value: u16) {
        self.pc = value;
    }

    #[must_use]
    pub const fn get_conditional_register(&self) -> ConditionFlag {
        self.cond
    }
    /// Sets the condition register from the sign of the value in register `r`.
    pub fn update_conditional_register(&mut self, r: u8) {
        self.cond = ConditionFlag::from(self.get(r));
    }
}

impl Debug for Registers {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        for (idx, value) in self.general_purpose.iter().enumerate() {
            write!(f, "R{idx}: {value:#06X} ({}), ", numbers::as_decimal(*value))?;
        }
        write!(f, "PC: {:#06X}, COND: {:?}", self.pc, self.cond)
    }
}

/// Exactly one of the flags is set at any time, the value matches the `nzp` bits of `BR`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum ConditionFlag {
    Pos = 1 << 0, // Positive
    Zero = 1 << 1,
    Neg = 1 << 2, // Negative
}

impl ConditionFlag {
    /// Bit pattern as stored in the condition register.
    #[must_use]
    pub const fn bits(self) -> u16 {
        self as u16
    }
}

impl From<u16> for ConditionFlag {
    fn from(value: u16) -> Self {
        if value == 0 {
            Self::Zero
        } else if value >> 15 == 1 {
            // leftmost bit is 1 for negative numbers
            Self::Neg
        } else {
            Self::Pos
        }
    }
}
