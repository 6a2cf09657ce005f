use std::fmt::Write as _;

use thiserror::Error;
use tracing::trace;

use crate::constants::{Word, NUM_REGS};

/// Symbolic (ABI) names of the general purpose registers
pub(crate) const REGISTER_NAMES: [&str; NUM_REGS] = [
    "zero", "ra", "sp", "gp", "tp", "t0", "t1", "t2", // x0-x7
    "s0", "s1", "a0", "a1", "a2", "a3", "a4", "a5", // x8-x15
    "a6", "a7", "s2", "s3", "s4", "s5", "s6", "s7", // x16-x23
    "s8", "s9", "s10", "s11", "t3", "t4", "t5", "t6", // x24-x31
];

#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum RegisterError {
    #[error("register number {regno} is out of range (0..{NUM_REGS})")]
    OutOfRange { regno: usize },
}

#[derive(Error, Debug)]
#[error("could not parse register")]
pub struct RegisterParseError;

/// A register number, guaranteed to be in range
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Reg(u8);

impl Reg {
    /// The hard-wired zero register
    pub const ZERO: Reg = Reg(0);

    /// Return address
    pub const RA: Reg = Reg(1);

    /// Stack pointer
    pub const SP: Reg = Reg(2);

    /// Create a register from its number
    ///
    /// # Errors
    ///
    /// Fails if the number is not in the `0..32` range
    pub fn new(regno: usize) -> Result<Self, RegisterError> {
        u8::try_from(regno)
            .ok()
            .filter(|&n| usize::from(n) < NUM_REGS)
            .map(Reg)
            .ok_or(RegisterError::OutOfRange { regno })
    }

    /// Look up a register by its ABI name
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        if name == "fp" {
            return Some(Reg(8));
        }

        REGISTER_NAMES
            .iter()
            .position(|&n| n == name)
            .and_then(|n| Reg::new(n).ok())
    }

    /// Iterate over all the registers, in order
    pub fn all() -> impl Iterator<Item = Reg> {
        (0..NUM_REGS).filter_map(|n| Reg::new(n).ok())
    }

    #[must_use]
    pub const fn index(self) -> usize {
        self.0 as usize
    }

    #[must_use]
    pub const fn name(self) -> &'static str {
        REGISTER_NAMES[self.0 as usize]
    }

    #[must_use]
    pub const fn is_zero(self) -> bool {
        self.0 == 0
    }
}

impl TryFrom<usize> for Reg {
    type Error = RegisterError;

    fn try_from(regno: usize) -> Result<Self, Self::Error> {
        Reg::new(regno)
    }
}

impl std::fmt::Display for Reg {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

impl std::str::FromStr for Reg {
    type Err = RegisterParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.to_lowercase();
        crate::parser::parse_register_name(&s).ok_or(RegisterParseError)
    }
}

/// The 32 general purpose registers of the machine.
///
/// Register `zero` always reads as 0, writes to it are silently dropped.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct RegisterFile {
    inner: [Word; NUM_REGS],
}

impl RegisterFile {
    /// Read a register by number
    ///
    /// # Errors
    ///
    /// Fails if the register number is out of range
    pub fn read(&self, regno: usize) -> Result<Word, RegisterError> {
        let reg = Reg::new(regno)?;
        Ok(self.get(reg))
    }

    /// Write a register by number
    ///
    /// # Errors
    ///
    /// Fails if the register number is out of range
    pub fn write(&mut self, regno: usize, value: Word) -> Result<(), RegisterError> {
        let reg = Reg::new(regno)?;
        self.set(reg, value);
        Ok(())
    }

    #[must_use]
    pub fn get(&self, reg: Reg) -> Word {
        if reg.is_zero() {
            0
        } else {
            self.inner[reg.index()]
        }
    }

    pub fn set(&mut self, reg: Reg, value: Word) {
        if reg.is_zero() {
            trace!(value, "Dropping write to the zero register");
            return;
        }

        trace!(%reg, value, "Writing register");
        self.inner[reg.index()] = value;
    }

    /// Render all registers, `columns` per line
    #[must_use]
    pub fn dump(&self, columns: usize) -> String {
        let mut out = String::from("Registers\n=========\n");
        let registers: Vec<Reg> = Reg::all().collect();

        for row in registers.chunks(columns.max(1)) {
            let line: Vec<String> = row
                .iter()
                .map(|&reg| {
                    let label = format!("{reg} (${}):", reg.index());
                    format!("{label:<11}0x{:08x}", self.get(reg))
                })
                .collect();
            // Writing to a String never fails
            let _ = writeln!(out, "{}", line.join("    "));
        }

        out
    }
}

impl std::fmt::Display for RegisterFile {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.dump(4))
    }
}
