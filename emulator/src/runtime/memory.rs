use std::fmt::Write as _;

use parse_display::{Display, FromStr};
use thiserror::Error;
use tracing::{debug, trace};

use crate::constants::{Address, Word};

/// Operation requested from the memory on a given cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, FromStr)]
#[display(style = "lowercase")]
pub enum MemoryFunction {
    /// No operation was requested
    Idle,

    /// Read a word
    Read,

    /// Write a word
    Write,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
#[display(style = "lowercase")]
pub enum CopyDirection {
    Into,
    From,
}

/// Represents errors related to memory manipulations
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum MemoryError {
    #[error("address {address:#010x} is out of bounds")]
    OutOfBounds { address: Address },

    #[error("address {address:#010x} is not aligned to {word_size} bytes")]
    Misaligned { address: Address, word_size: u32 },

    #[error("no memory function requested at address {address:#010x}")]
    NoFunction { address: Address },

    #[error("cannot copy data {direction} memory: invalid address range {start:#010x} - {end:#010x}")]
    CopyOutOfRange {
        direction: CopyDirection,
        start: u64,
        end: u64,
    },

    #[error("invalid word size {0}, expected 1, 2 or 4 bytes")]
    InvalidWordSize(u32),

    #[error("memory range of {size:#x} bytes starting at {start:#010x} does not fit the address space")]
    InvalidRange { start: Address, size: u32 },
}

/// A word-addressed, little-endian byte store covering `[start, start + size)`.
///
/// Simulated programs go through [`Memory::access`], which checks bounds and
/// alignment on every access. The harness loads and extracts whole byte
/// ranges with [`Memory::copy_to`] and [`Memory::copy_from`].
#[derive(Clone, PartialEq, Eq)]
pub struct Memory {
    start: Address,
    word_size: u32,
    inner: Vec<u8>,
}

impl std::fmt::Debug for Memory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Memory {{ start: {:#010x}, end: {:#010x}, word_size: {}, data: [...] }}",
            self.start,
            self.end(),
            self.word_size
        )
    }
}

impl Memory {
    /// Allocate a zeroed memory
    ///
    /// # Errors
    ///
    /// Fails if the word size is not 1, 2 or 4 bytes, or if the range is empty
    /// or overflows the 32-bit address space.
    pub fn new(start: Address, size: u32, word_size: u32) -> Result<Self, MemoryError> {
        if !matches!(word_size, 1 | 2 | 4) {
            return Err(MemoryError::InvalidWordSize(word_size));
        }

        if size == 0 || u64::from(start) + u64::from(size) > 1 << Word::BITS {
            return Err(MemoryError::InvalidRange { start, size });
        }

        let len = usize::try_from(size).map_err(|_| MemoryError::InvalidRange { start, size })?;
        debug!(start, size, word_size, "Allocating memory");

        Ok(Self {
            start,
            word_size,
            inner: vec![0; len],
        })
    }

    #[must_use]
    pub fn start(&self) -> Address {
        self.start
    }

    /// First address past the end of the memory
    #[must_use]
    pub fn end(&self) -> u64 {
        u64::from(self.start) + self.size()
    }

    #[must_use]
    pub fn size(&self) -> u64 {
        u64::try_from(self.inner.len()).unwrap_or(u64::MAX)
    }

    #[must_use]
    pub fn word_size(&self) -> u32 {
        self.word_size
    }

    /// Check if `len` bytes starting at `address` fit in this memory
    #[must_use]
    pub fn contains(&self, address: u64, len: u64) -> bool {
        address >= u64::from(self.start) && address.saturating_add(len) <= self.end()
    }

    /// Check whether two memories share at least one address
    #[must_use]
    pub fn overlaps(&self, other: &Memory) -> bool {
        u64::from(self.start) < other.end() && u64::from(other.start) < self.end()
    }

    /// Perform one access on behalf of the simulated program.
    ///
    /// A disabled access (`valid == false`) does nothing and succeeds with 0.
    /// Reads succeed with the stored word, writes succeed with 0.
    ///
    /// # Errors
    ///
    /// Fails without touching the storage if the address is out of bounds,
    /// misaligned, or if no function was requested.
    pub fn access(
        &mut self,
        valid: bool,
        address: Address,
        data: Word,
        function: MemoryFunction,
    ) -> Result<Word, MemoryError> {
        if !valid {
            return Ok(0);
        }

        let res = match function {
            MemoryFunction::Read => self.load(address),
            MemoryFunction::Write => self.store(address, data).map(|()| 0),
            MemoryFunction::Idle => self
                .offset(address)
                .and(Err(MemoryError::NoFunction { address })),
        };

        if let Err(error) = &res {
            debug!(%error, %function, address, "Memory access failed");
        }

        res
    }

    /// Read the word at `address`
    ///
    /// # Errors
    ///
    /// Fails if the address is out of bounds or misaligned
    pub fn load(&self, address: Address) -> Result<Word, MemoryError> {
        let offset = self.offset(address)?;
        let bytes = &self.inner[offset..offset + self.word_len()];
        let value = bytes
            .iter()
            .rev()
            .fold(0, |acc: Word, &byte| (acc << 8) | Word::from(byte));
        trace!(address, value, "Memory read");
        Ok(value)
    }

    /// Write `value` at `address`, keeping only the low `word_size` bytes
    ///
    /// # Errors
    ///
    /// Fails if the address is out of bounds or misaligned
    pub fn store(&mut self, address: Address, value: Word) -> Result<(), MemoryError> {
        let offset = self.offset(address)?;
        let len = self.word_len();
        self.inner[offset..offset + len].copy_from_slice(&value.to_le_bytes()[..len]);
        trace!(address, value, "Memory write");
        Ok(())
    }

    /// Copy a byte range into memory, ignoring alignment
    ///
    /// # Errors
    ///
    /// Fails, without writing anything, if the destination range is not fully
    /// contained in the memory.
    pub fn copy_to(&mut self, address: Address, data: &[u8]) -> Result<(), MemoryError> {
        let range = self.byte_range(CopyDirection::Into, address, data.len())?;
        debug!(address, len = data.len(), "Copying data into memory");
        self.inner[range].copy_from_slice(data);
        Ok(())
    }

    /// Copy a byte range out of memory, ignoring alignment
    ///
    /// # Errors
    ///
    /// Fails if the source range is not fully contained in the memory
    pub fn copy_from(&self, address: Address, len: usize) -> Result<Vec<u8>, MemoryError> {
        let range = self.byte_range(CopyDirection::From, address, len)?;
        debug!(address, len, "Copying data from memory");
        Ok(self.inner[range].to_vec())
    }

    /// Render every word of the memory.
    ///
    /// With `skip_zero_runs`, consecutive zero words after the first one are
    /// collapsed into a single `...` line. The last word is always shown.
    #[must_use]
    pub fn dump(&self, skip_zero_runs: bool) -> String {
        let mut out = String::new();
        // Writing to a String never fails
        let _ = writeln!(
            out,
            "Memory {:#010x} - {:#010x}\n{}",
            self.start,
            self.end() - 1,
            "=".repeat(30)
        );

        let addresses: Vec<Address> = (u64::from(self.start)..self.end())
            .step_by(self.word_len())
            .filter_map(|address| Address::try_from(address).ok())
            .collect();
        let last = addresses.last().copied();

        let mut in_zero_run = false;
        let mut show_ellipsis = true;
        for address in addresses {
            let Ok(value) = self.load(address) else {
                continue;
            };

            if !skip_zero_runs || !in_zero_run || value != 0 || Some(address) == last {
                in_zero_run = value == 0;
                show_ellipsis = true;
                let _ = writeln!(out, "{}", self.format_word(address, value));
            } else if show_ellipsis {
                show_ellipsis = false;
                let _ = writeln!(out, "             ...");
            }
        }

        out
    }

    fn format_word(&self, address: Address, value: Word) -> String {
        let bytes: Vec<String> = value.to_le_bytes()[..self.word_len()]
            .iter()
            .map(|byte| format!("{byte:02x}"))
            .collect();
        format!(
            "{address:#010x}: {} (0x{value:0width$x})",
            bytes.join(" "),
            width = 2 * self.word_len()
        )
    }

    fn word_len(&self) -> usize {
        // word_size is validated to be 1, 2 or 4 on construction
        self.word_size as usize
    }

    /// Check bounds and alignment of a single word access
    fn offset(&self, address: Address) -> Result<usize, MemoryError> {
        if !address.is_multiple_of(self.word_size) {
            return Err(MemoryError::Misaligned {
                address,
                word_size: self.word_size,
            });
        }

        if !self.contains(address.into(), self.word_size.into()) {
            return Err(MemoryError::OutOfBounds { address });
        }

        usize::try_from(address - self.start).map_err(|_| MemoryError::OutOfBounds { address })
    }

    fn byte_range(
        &self,
        direction: CopyDirection,
        address: Address,
        len: usize,
    ) -> Result<std::ops::Range<usize>, MemoryError> {
        let start = u64::from(address);
        let len = u64::try_from(len).unwrap_or(u64::MAX);
        let error = MemoryError::CopyOutOfRange {
            direction,
            start,
            end: start.saturating_add(len),
        };

        if !self.contains(start, len) {
            return Err(error);
        }

        let offset = usize::try_from(address - self.start).map_err(|_| error)?;
        let len = usize::try_from(len).map_err(|_| error)?;
        Ok(offset..offset + len)
    }
}

impl std::fmt::Display for Memory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.dump(true))
    }
}
