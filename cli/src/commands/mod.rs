mod alu;
mod completion;
mod mem;

#[derive(clap::Subcommand, Debug)]
pub enum Subcommand {
    /// Evaluate a single ALU operation
    Alu(self::alu::AluOpt),

    /// Build a machine, move data in and out of its data memory and dump its state
    Mem(self::mem::MemOpt),

    /// Generate shell completions
    Completion(self::completion::CompletionOpt),
}

impl Subcommand {
    /// Run a subcommand
    pub fn exec(self) -> anyhow::Result<()> {
        match self {
            Self::Alu(opt) => opt.exec(),
            Self::Mem(opt) => opt.exec(),
            Self::Completion(opt) => opt.exec(),
        }
    }
}
