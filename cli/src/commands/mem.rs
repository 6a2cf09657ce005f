use anyhow::Context;
use camino::Utf8PathBuf;
use clap::{ArgAction, Parser};
use snurisc_emulator::constants::{Address, Word};
use snurisc_emulator::runtime::Reg;
use snurisc_emulator::{parse_word, Machine, MachineConfig, MemoryFunction};
use tracing::{debug, info, warn};

/// A file to copy in or out of data memory
#[derive(Debug, Clone, PartialEq, Eq)]
struct Transfer {
    address: Address,
    size: usize,
    path: Utf8PathBuf,
}

impl Transfer {
    /// Group the flat `ADDRESS SIZE FILE` values given on the command line
    fn from_args(kind: &str, values: &[String]) -> anyhow::Result<Vec<Self>> {
        values
            .chunks_exact(3)
            .map(|chunk| {
                let [address, size, path] = chunk else {
                    unreachable!("chunks are exactly 3 items long");
                };
                let context = || {
                    format!(
                        "invalid {kind} parameters {address} {size} {path}, \
                         expected an address, a size and a file name"
                    )
                };

                let address = parse_word(address).with_context(context)?;
                let size = parse_word(size).with_context(context)?;
                Ok(Self {
                    address,
                    size: usize::try_from(size).with_context(context)?,
                    path: Utf8PathBuf::from(path),
                })
            })
            .collect()
    }

    /// Make sure `len` bytes starting at the transfer address fit in data memory
    fn check(&self, machine: &Machine, len: usize) -> anyhow::Result<()> {
        let start = u64::from(self.address);
        let len = u64::try_from(len)?;
        anyhow::ensure!(
            machine.dmem.contains(start, len),
            "{} bytes at {start:#010x} for {} do not fit in data memory ({:#010x} - {:#010x})",
            len,
            self.path,
            machine.dmem.start(),
            machine.dmem.end() - 1,
        );
        Ok(())
    }
}

#[derive(Parser, Debug)]
pub struct MemOpt {
    /// Start address of the instruction memory [default: 0x80000000]
    #[clap(long, value_parser = parse_word)]
    imem_addr: Option<Address>,

    /// Size of the instruction memory, in bytes [default: 0x10000]
    #[clap(long, value_parser = parse_word)]
    imem_size: Option<u32>,

    /// Start address of the data memory [default: 0x80010000]
    #[clap(long, value_parser = parse_word)]
    dmem_addr: Option<Address>,

    /// Size of the data memory, in bytes [default: 0x10000]
    #[clap(long, value_parser = parse_word)]
    dmem_size: Option<u32>,

    /// Load FILE at ADDRESS in data memory. Aborts if the file is larger than MAXSIZE.
    #[clap(
        short,
        long,
        num_args = 3,
        value_names = ["ADDRESS", "MAXSIZE", "FILE"],
        action = ArgAction::Append
    )]
    input: Vec<String>,

    /// Save SIZE bytes of data memory starting at ADDRESS to FILE
    #[clap(
        short,
        long,
        num_args = 3,
        value_names = ["ADDRESS", "SIZE", "FILE"],
        action = ArgAction::Append
    )]
    output: Vec<String>,

    /// Set a register before anything else
    #[clap(
        long = "set",
        num_args = 2,
        value_names = ["REGISTER", "VALUE"],
        allow_hyphen_values = true,
        action = ArgAction::Append
    )]
    registers: Vec<String>,

    /// Store a word in data memory, through the checked word access path
    #[clap(
        long = "store",
        num_args = 2,
        value_names = ["ADDRESS", "VALUE"],
        allow_hyphen_values = true,
        action = ArgAction::Append
    )]
    stores: Vec<String>,

    /// Dump the registers and both memories once the inputs are loaded
    #[clap(short, long)]
    dump: bool,

    /// Collapse runs of zero words in memory dumps
    #[clap(long, requires = "dump")]
    skip_zero: bool,
}

impl MemOpt {
    fn config(&self) -> MachineConfig {
        let default = MachineConfig::default();
        MachineConfig {
            imem_start: self.imem_addr.unwrap_or(default.imem_start),
            imem_size: self.imem_size.unwrap_or(default.imem_size),
            dmem_start: self.dmem_addr.unwrap_or(default.dmem_start),
            dmem_size: self.dmem_size.unwrap_or(default.dmem_size),
        }
    }

    fn register_values(&self) -> anyhow::Result<Vec<(Reg, Word)>> {
        self.registers
            .chunks_exact(2)
            .map(|pair| {
                let reg: Reg = pair[0]
                    .parse()
                    .with_context(|| format!("invalid register {:?}", pair[0]))?;
                let value = parse_word(&pair[1])?;
                Ok((reg, value))
            })
            .collect()
    }

    fn store_values(&self) -> anyhow::Result<Vec<(Address, Word)>> {
        self.stores
            .chunks_exact(2)
            .map(|pair| Ok((parse_word(&pair[0])?, parse_word(&pair[1])?)))
            .collect()
    }

    pub fn exec(&self) -> anyhow::Result<()> {
        // Everything given on the command line is checked before touching the machine
        let config = self.config();
        let inputs = Transfer::from_args("input", &self.input)?;
        let outputs = Transfer::from_args("output", &self.output)?;
        let registers = self.register_values()?;
        let stores = self.store_values()?;

        debug!(?config, "Building machine");
        let mut machine = Machine::new(&config).context("invalid memory configuration")?;
        println!("{machine}");

        // Every transfer is checked before any register, memory or file is touched
        let mut payloads = Vec::with_capacity(inputs.len());
        for input in &inputs {
            let data = std::fs::read(&input.path)
                .with_context(|| format!("could not read {}", input.path))?;
            anyhow::ensure!(
                data.len() <= input.size,
                "{} is {} bytes long, larger than the maximum allowed size ({})",
                input.path,
                data.len(),
                input.size,
            );
            input.check(&machine, data.len())?;
            payloads.push(data);
        }
        for output in &outputs {
            output.check(&machine, output.size)?;
        }

        for (reg, value) in registers {
            info!(%reg, value, "Setting register");
            machine.registers.set(reg, value);
        }

        for (input, data) in inputs.iter().zip(payloads) {
            machine
                .load_input(input.address, input.size, &data)
                .with_context(|| format!("error loading {} into memory", input.path))?;
            info!(path = %input.path, address = input.address, len = data.len(), "Loaded input");
        }

        for (address, value) in stores {
            // Failed accesses from the simulated side never abort the run
            if let Err(error) = machine
                .dmem
                .access(true, address, value, MemoryFunction::Write)
            {
                warn!(%error, address, value, "Store failed");
            }
        }

        if self.dump {
            print!("{}", machine.dump_registers());
            println!();
            print!("{}", machine.dump_memory(self.skip_zero));
        }

        for output in &outputs {
            let data = machine
                .save_output(output.address, output.size)
                .with_context(|| format!("error saving data to {}", output.path))?;
            std::fs::write(&output.path, &data)
                .with_context(|| format!("could not write {}", output.path))?;
            info!(path = %output.path, address = output.address, len = data.len(), "Saved output");
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn opt(args: &[&str]) -> MemOpt {
        MemOpt::try_parse_from(std::iter::once("mem").chain(args.iter().copied())).unwrap()
    }

    #[test]
    fn config_test() {
        assert_eq!(opt(&[]).config(), MachineConfig::default());

        let config = opt(&["--dmem-addr", "0x1000", "--dmem-size", "4096"]).config();
        assert_eq!(config.dmem_start, 0x1000);
        assert_eq!(config.dmem_size, 4096);
        assert_eq!(config.imem_start, MachineConfig::default().imem_start);
    }

    #[test]
    fn transfers_test() {
        let opt = opt(&[
            "-i", "0x80010000", "1024", "in.raw", //
            "--input", "0x80010400", "0x10", "other.raw", //
            "-o", "0x80018000", "256", "out.raw",
        ]);

        assert_eq!(
            Transfer::from_args("input", &opt.input).unwrap(),
            vec![
                Transfer {
                    address: 0x8001_0000,
                    size: 1024,
                    path: "in.raw".into(),
                },
                Transfer {
                    address: 0x8001_0400,
                    size: 16,
                    path: "other.raw".into(),
                },
            ]
        );
        assert_eq!(Transfer::from_args("output", &opt.output).unwrap().len(), 1);
    }

    #[test]
    fn invalid_transfer_test() {
        let values: Vec<String> = ["base", "16", "in.raw"].map(String::from).to_vec();
        let err = Transfer::from_args("input", &values).unwrap_err();
        assert_eq!(
            err.to_string(),
            "invalid input parameters base 16 in.raw, expected an address, a size and a file name"
        );

        // Transfers take exactly three values
        assert!(MemOpt::try_parse_from(["mem", "-i", "0x0", "16"]).is_err());
    }

    #[test]
    fn transfer_range_test() {
        let machine = Machine::new(&MachineConfig {
            imem_start: 0x1000,
            imem_size: 0x100,
            dmem_start: 0x2000,
            dmem_size: 0x40,
        })
        .unwrap();
        let transfer = |address| Transfer {
            address,
            size: 16,
            path: "out.raw".into(),
        };

        assert!(transfer(0x2000).check(&machine, 0x40).is_ok());
        assert!(transfer(0x2030).check(&machine, 16).is_ok());
        assert!(transfer(0x2000).check(&machine, 0).is_ok());

        let err = transfer(0x2038).check(&machine, 16).unwrap_err();
        assert_eq!(
            err.to_string(),
            "16 bytes at 0x00002038 for out.raw do not fit in data memory (0x00002000 - 0x0000203f)"
        );
        // Instruction memory is never a transfer target
        assert!(transfer(0x1000).check(&machine, 4).is_err());
    }

    #[test]
    fn bad_output_range_aborts_before_writing_test() {
        let dir = std::env::temp_dir().join(format!("snurisc-mem-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let first = dir.join("first.raw");
        let _ = std::fs::remove_file(&first);

        let opt = opt(&[
            "--dmem-addr", "0x2000", "--dmem-size", "0x40", //
            "--imem-addr", "0x1000", "--imem-size", "0x100", //
            "-o", "0x2000", "16", first.to_str().unwrap(), //
            "-o", "0x2038", "16", "never-written.raw",
        ]);
        assert!(opt.exec().is_err());
        assert!(!first.exists());

        let _ = std::fs::remove_dir(&dir);
    }

    #[test]
    fn registers_test() {
        let opt = opt(&["--set", "sp", "0x8001fff0", "--set", "x10", "-1"]);
        assert_eq!(
            opt.register_values().unwrap(),
            vec![
                (Reg::SP, 0x8001_fff0),
                (Reg::new(10).unwrap(), Word::MAX)
            ]
        );

        let opt = MemOpt::try_parse_from(["mem", "--set", "x42", "1"]).unwrap();
        assert!(opt.register_values().is_err());
    }

    #[test]
    fn skip_zero_requires_dump_test() {
        assert!(MemOpt::try_parse_from(["mem", "--skip-zero"]).is_err());
        assert!(MemOpt::try_parse_from(["mem", "--dump", "--skip-zero"]).is_ok());
    }
}
