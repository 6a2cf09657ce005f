use thiserror::Error;
use tracing::{debug, info};

use crate::constants as C;

mod adder;
mod alu;
mod memory;
mod registers;
mod vector;

pub use self::adder::Adder;
pub use self::alu::{Alu, AluOp};
pub use self::memory::{CopyDirection, Memory, MemoryError, MemoryFunction};
pub use self::registers::{Reg, RegisterError, RegisterFile, RegisterParseError};
pub use self::vector::Lanes;

/// Errors detected while building a machine, before anything runs
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error(
        "instruction and data memory must not overlap \
         (instruction memory: {imem_start:#010x} - {imem_end:#010x}, \
         data memory: {dmem_start:#010x} - {dmem_end:#010x})"
    )]
    Overlap {
        imem_start: u64,
        imem_end: u64,
        dmem_start: u64,
        dmem_end: u64,
    },

    #[error("invalid {name} memory")]
    Memory {
        name: &'static str,
        source: MemoryError,
    },
}

/// Errors raised by the harness when moving data in and out of the machine
#[derive(Error, Debug)]
pub enum MachineError {
    #[error("data of {len} bytes is larger than the maximum allowed size ({max_size})")]
    InputTooLarge { len: usize, max_size: usize },

    #[error(transparent)]
    Memory(#[from] MemoryError),

    #[error(transparent)]
    Register(#[from] RegisterError),
}

type Result<T> = std::result::Result<T, MachineError>;

/// Memory map of a machine
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MachineConfig {
    pub imem_start: C::Address,
    pub imem_size: u32,
    pub dmem_start: C::Address,
    pub dmem_size: u32,
}

impl Default for MachineConfig {
    fn default() -> Self {
        Self {
            imem_start: C::IMEM_START,
            imem_size: C::IMEM_SIZE,
            dmem_start: C::DMEM_START,
            dmem_size: C::DMEM_SIZE,
        }
    }
}

impl MachineConfig {
    /// Check that the instruction and data memories are disjoint
    ///
    /// # Errors
    ///
    /// Fails if the two memory ranges share at least one address
    pub fn validate(&self) -> std::result::Result<(), ConfigError> {
        let imem_start = u64::from(self.imem_start);
        let imem_end = imem_start + u64::from(self.imem_size);
        let dmem_start = u64::from(self.dmem_start);
        let dmem_end = dmem_start + u64::from(self.dmem_size);

        if imem_start < dmem_end && dmem_start < imem_end {
            return Err(ConfigError::Overlap {
                imem_start,
                imem_end,
                dmem_start,
                dmem_end,
            });
        }

        Ok(())
    }
}

/// The hardware components of the simulated machine.
///
/// The pipeline driving those components is the sole owner of the machine
/// and steps it one cycle at a time.
#[derive(Debug, Clone)]
pub struct Machine {
    pub registers: RegisterFile,
    pub imem: Memory,
    pub dmem: Memory,
    pub alu: Alu,

    /// Computes `pc + 4`
    pub pc_adder: Adder,

    /// Computes branch targets
    pub branch_adder: Adder,
}

impl Machine {
    /// Build a machine with zeroed registers and memories
    ///
    /// # Errors
    ///
    /// Fails if the memory map is invalid
    #[tracing::instrument]
    pub fn new(config: &MachineConfig) -> std::result::Result<Self, ConfigError> {
        config.validate()?;

        let imem = Memory::new(config.imem_start, config.imem_size, C::WORD_SIZE).map_err(
            |source| ConfigError::Memory {
                name: "instruction",
                source,
            },
        )?;
        let dmem = Memory::new(config.dmem_start, config.dmem_size, C::WORD_SIZE)
            .map_err(|source| ConfigError::Memory {
                name: "data",
                source,
            })?;

        let machine = Self {
            registers: RegisterFile::default(),
            imem,
            dmem,
            alu: Alu,
            pc_adder: Adder,
            branch_adder: Adder,
        };
        info!("Machine ready");
        Ok(machine)
    }

    /// Load a payload into data memory, refusing anything larger than `max_size`
    ///
    /// # Errors
    ///
    /// Fails if the payload is too large or does not fit in data memory. Nothing
    /// is written in that case.
    pub fn load_input(&mut self, address: C::Address, max_size: usize, data: &[u8]) -> Result<()> {
        if data.len() > max_size {
            return Err(MachineError::InputTooLarge {
                len: data.len(),
                max_size,
            });
        }

        debug!(address, len = data.len(), "Loading input");
        self.dmem.copy_to(address, data)?;
        Ok(())
    }

    /// Extract `size` bytes of data memory
    ///
    /// # Errors
    ///
    /// Fails if the range is not contained in data memory
    pub fn save_output(&self, address: C::Address, size: usize) -> Result<Vec<u8>> {
        debug!(address, size, "Saving output");
        Ok(self.dmem.copy_from(address, size)?)
    }

    /// Set a register by number
    ///
    /// # Errors
    ///
    /// Fails if the register number is out of range
    pub fn set_register(&mut self, regno: usize, value: C::Word) -> Result<()> {
        self.registers.write(regno, value)?;
        Ok(())
    }

    #[must_use]
    pub fn dump_registers(&self) -> String {
        self.registers.dump(4)
    }

    #[must_use]
    pub fn dump_memory(&self, skip_zero_runs: bool) -> String {
        format!(
            "{}\n{}",
            self.imem.dump(skip_zero_runs),
            self.dmem.dump(skip_zero_runs)
        )
    }
}

impl std::fmt::Display for Machine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "SnuRISC-V")?;
        writeln!(f, "  architecture:          {} bit", C::BITWIDTH)?;
        writeln!(f, "  pipeline stages:       {}", C::PIPELINE_STAGES)?;
        writeln!(f)?;
        for (name, memory) in [("instruction memory:", &self.imem), ("data memory:", &self.dmem)] {
            writeln!(
                f,
                "  {name:<23}{:08x} - {:08x} ({} bytes)",
                memory.start(),
                memory.end() - 1,
                memory.size()
            )?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn small_config() -> MachineConfig {
        MachineConfig {
            imem_start: 0x1000,
            imem_size: 0x100,
            dmem_start: 0x2000,
            dmem_size: 0x40,
        }
    }

    #[test]
    fn default_machine_test() {
        let machine = Machine::new(&MachineConfig::default()).unwrap();
        assert_eq!(machine.imem.start(), 0x8000_0000);
        assert_eq!(machine.imem.size(), 64 * 1024);
        assert_eq!(machine.dmem.start(), 0x8001_0000);
        assert_eq!(machine.dmem.word_size(), C::WORD_SIZE);
        assert_eq!(machine.registers, RegisterFile::default());

        assert_eq!(
            machine.to_string(),
            indoc::indoc! {"
                SnuRISC-V
                  architecture:          32 bit
                  pipeline stages:       5

                  instruction memory:    80000000 - 8000ffff (65536 bytes)
                  data memory:           80010000 - 8001ffff (65536 bytes)
            "}
        );
    }

    #[test]
    fn overlap_test() {
        let overlapping = MachineConfig {
            dmem_start: 0x10f0,
            ..small_config()
        };
        let err = Machine::new(&overlapping).unwrap_err();
        assert!(matches!(err, ConfigError::Overlap { .. }));
        assert_eq!(
            err.to_string(),
            "instruction and data memory must not overlap \
             (instruction memory: 0x00001000 - 0x00001100, \
             data memory: 0x000010f0 - 0x00001130)"
        );

        // Same start address
        let same_start = MachineConfig {
            dmem_start: 0x1000,
            ..small_config()
        };
        assert!(same_start.validate().is_err());

        // Data memory before and around the instruction memory
        let around = MachineConfig {
            dmem_start: 0x0f00,
            dmem_size: 0x1000,
            ..small_config()
        };
        assert!(around.validate().is_err());

        // Adjacent memories are fine
        let adjacent = MachineConfig {
            dmem_start: 0x1100,
            ..small_config()
        };
        assert!(adjacent.validate().is_ok());
    }

    #[test]
    fn invalid_memory_test() {
        let config = MachineConfig {
            dmem_size: 0,
            ..small_config()
        };
        let err = Machine::new(&config).unwrap_err();
        assert!(matches!(err, ConfigError::Memory { name: "data", .. }));

        let config = MachineConfig {
            imem_start: 0xffff_ff00,
            imem_size: 0x200,
            ..small_config()
        };
        let err = Machine::new(&config).unwrap_err();
        assert!(matches!(
            err,
            ConfigError::Memory {
                name: "instruction",
                ..
            }
        ));
    }

    #[test]
    fn load_save_test() {
        let mut machine = Machine::new(&small_config()).unwrap();
        let pixels = [0x30, 0x20, 0x10, 0xff, 0x01, 0x02, 0x03, 0x80];
        machine.load_input(0x2010, 8, &pixels).unwrap();
        assert_eq!(machine.save_output(0x2010, 8).unwrap(), pixels);

        // The simulated program sees the same bytes as little-endian words
        assert_eq!(
            machine
                .dmem
                .access(true, 0x2010, 0, MemoryFunction::Read)
                .unwrap(),
            0xff10_2030
        );
    }

    #[test]
    fn load_too_large_test() {
        let mut machine = Machine::new(&small_config()).unwrap();
        let err = machine.load_input(0x2000, 3, &[1, 2, 3, 4]).unwrap_err();
        assert!(matches!(
            err,
            MachineError::InputTooLarge {
                len: 4,
                max_size: 3
            }
        ));
        assert_eq!(machine.save_output(0x2000, 4).unwrap(), vec![0; 4]);
    }

    #[test]
    fn load_out_of_range_test() {
        let mut machine = Machine::new(&small_config()).unwrap();
        let err = machine.load_input(0x203c, 16, &[0xff; 8]).unwrap_err();
        assert!(matches!(
            err,
            MachineError::Memory(MemoryError::CopyOutOfRange { .. })
        ));

        // Inputs only go to data memory
        assert!(machine.load_input(0x1000, 16, &[0xff; 8]).is_err());
        assert!(machine.save_output(0x2000, 0x41).is_err());
    }

    #[test]
    fn set_register_test() {
        let mut machine = Machine::new(&small_config()).unwrap();
        machine.set_register(2, 0x2040).unwrap();
        assert_eq!(machine.registers.get(Reg::SP), 0x2040);
        assert!(matches!(
            machine.set_register(32, 0),
            Err(MachineError::Register(RegisterError::OutOfRange { regno: 32 }))
        ));
    }

    #[test]
    fn blend_cycle_test() {
        // What the pipeline does for a vector add-immediate on a loaded pixel
        let mut machine = Machine::new(&small_config()).unwrap();
        machine.load_input(0x2000, 4, &[0x30, 0x20, 0x10, 0x00]).unwrap();

        let raw = machine
            .dmem
            .access(true, 0x2000, 0, MemoryFunction::Read)
            .unwrap();
        machine.registers.write(10, raw).unwrap();

        let a0 = machine.registers.read(10).unwrap();
        let lanes = machine.alu.op(AluOp::VUnpack, a0, 0);
        let lanes = machine.alu.op(AluOp::VAddi, lanes, 5);
        let out = machine.alu.op(AluOp::VPack, lanes, 0xff);
        machine.registers.write(11, out).unwrap();

        let a1 = machine.registers.read(11).unwrap();
        machine
            .dmem
            .access(true, 0x2004, a1, MemoryFunction::Write)
            .unwrap();

        assert_eq!(
            machine.save_output(0x2004, 4).unwrap(),
            vec![0x35, 0x25, 0x15, 0xff]
        );
        assert_eq!(machine.pc_adder.next(0x1000), 0x1004);
    }
}
