use clap::Parser;
use snurisc_emulator::constants::Word;
use snurisc_emulator::{parse_word, Alu, AluOp, Lanes};
use tracing::debug;

/// ALU function, given as a mnemonic or as a raw function code
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Function {
    Op(AluOp),
    Code(u8),
}

impl Function {
    fn op(self) -> Option<AluOp> {
        match self {
            Function::Op(op) => Some(op),
            Function::Code(code) => AluOp::from_code(code),
        }
    }
}

fn parse_function(input: &str) -> Result<Function, String> {
    if let Ok(op) = input.to_lowercase().parse::<AluOp>() {
        return Ok(Function::Op(op));
    }

    let code = parse_word(input).map_err(|_| {
        let known: Vec<String> = AluOp::ALL.iter().map(ToString::to_string).collect();
        format!("unknown ALU function, expected a code or one of {}", known.join(", "))
    })?;
    u8::try_from(code)
        .map(Function::Code)
        .map_err(|_| format!("function code {code} does not fit in a byte"))
}

#[derive(Parser, Debug)]
pub struct AluOpt {
    /// ALU function: a mnemonic (add, sltu, vpack, vmul…) or a numeric code
    #[clap(value_parser = parse_function)]
    function: Function,

    /// First operand
    #[clap(value_parser = parse_word, allow_hyphen_values = true)]
    a: Word,

    /// Second operand
    #[clap(value_parser = parse_word, allow_hyphen_values = true, default_value = "0")]
    b: Word,
}

impl AluOpt {
    fn eval(&self) -> Word {
        let alu = Alu;
        match self.function {
            Function::Op(op) => alu.op(op, self.a, self.b),
            Function::Code(code) => alu.op_code(code, self.a, self.b),
        }
    }

    #[allow(clippy::unnecessary_wraps)]
    pub fn exec(&self) -> anyhow::Result<()> {
        debug!(function = ?self.function, a = self.a, b = self.b, "Evaluating");
        let res = self.eval();

        println!("{res:#010x}");
        if self.function.op().is_some_and(AluOp::is_vector) {
            println!("lanes: {}", Lanes::from_bits(res));
        }

        Ok(())
    }
}
