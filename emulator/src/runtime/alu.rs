use parse_display::{Display, FromStr};
use tracing::trace;

use super::vector::Lanes;
use crate::constants::{SignedWord, Word};

/// Shift amounts only use the low 5 bits of the operand
const SHIFT_MASK: Word = Word::BITS - 1;

/// Operation selector of the ALU.
///
/// The discriminants are the function codes driven by the control logic. Code
/// 0 means "don't care" and has no variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, FromStr)]
#[display(style = "lowercase")]
#[repr(u8)]
pub enum AluOp {
    /// Wrapping addition
    Add = 1,

    /// Wrapping subtraction
    Sub = 2,

    /// Logical shift left
    Sll = 3,

    /// Logical shift right
    Srl = 4,

    /// Arithmetic shift right
    Sra = 5,

    And = 6,
    Or = 7,
    Xor = 8,

    /// Signed less than
    Slt = 9,

    /// Unsigned less than
    Sltu = 10,

    /// Pass the first operand through
    Copy1 = 11,

    /// Pass the second operand through
    Copy2 = 12,

    /// Equality test
    Seq = 13,

    /// Wrapping multiplication
    Mul = 14,

    /// Spread a raw pixel into vector lanes
    VUnpack = 15,

    /// Saturate vector lanes into a raw pixel, tagged with the second operand
    VPack = 16,

    /// Replicate a byte in every lane
    VBrdcst = 17,

    /// Add an immediate to every lane
    VAddi = 18,

    /// Lane-wise addition
    VAdd = 19,

    /// Lane-wise subtraction
    VSub = 20,

    /// Lane-wise fixed-point multiplication
    VMul = 21,
}

impl AluOp {
    pub const ALL: [AluOp; 21] = [
        AluOp::Add,
        AluOp::Sub,
        AluOp::Sll,
        AluOp::Srl,
        AluOp::Sra,
        AluOp::And,
        AluOp::Or,
        AluOp::Xor,
        AluOp::Slt,
        AluOp::Sltu,
        AluOp::Copy1,
        AluOp::Copy2,
        AluOp::Seq,
        AluOp::Mul,
        AluOp::VUnpack,
        AluOp::VPack,
        AluOp::VBrdcst,
        AluOp::VAddi,
        AluOp::VAdd,
        AluOp::VSub,
        AluOp::VMul,
    ];

    /// Decode a function code, `None` for unknown codes
    #[must_use]
    pub fn from_code(code: u8) -> Option<Self> {
        Self::ALL.into_iter().find(|op| op.code() == code)
    }

    #[must_use]
    pub const fn code(self) -> u8 {
        self as u8
    }

    /// Whether the result is a packed vector word
    #[must_use]
    pub const fn is_vector(self) -> bool {
        matches!(
            self,
            AluOp::VUnpack | AluOp::VBrdcst | AluOp::VAddi | AluOp::VAdd | AluOp::VSub | AluOp::VMul
        )
    }
}

/// The arithmetic and logic unit.
///
/// Every operation is a total function over pairs of words: overflows wrap
/// and nothing ever fails.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Alu;

impl Alu {
    #[must_use]
    pub fn op(&self, op: AluOp, a: Word, b: Word) -> Word {
        let res = match op {
            AluOp::Add => a.wrapping_add(b),
            AluOp::Sub => a.wrapping_sub(b),
            AluOp::And => a & b,
            AluOp::Or => a | b,
            AluOp::Xor => a ^ b,
            AluOp::Slt => Word::from(signed(a) < signed(b)),
            AluOp::Sltu => Word::from(a < b),
            AluOp::Sll => a << (b & SHIFT_MASK),
            AluOp::Sra => unsigned(signed(a) >> (b & SHIFT_MASK)),
            AluOp::Srl => a >> (b & SHIFT_MASK),
            AluOp::Copy1 => a,
            AluOp::Copy2 => b,
            AluOp::Seq => Word::from(a == b),
            AluOp::Mul => a.wrapping_mul(b),
            AluOp::VUnpack => Lanes::unpack(a).bits(),
            AluOp::VPack => Lanes::from_bits(a).pack(b),
            AluOp::VBrdcst => Lanes::broadcast(a).bits(),
            AluOp::VAddi => Lanes::from_bits(a).add_immediate(b).bits(),
            AluOp::VAdd => (Lanes::from_bits(a) + Lanes::from_bits(b)).bits(),
            AluOp::VSub => (Lanes::from_bits(a) - Lanes::from_bits(b)).bits(),
            AluOp::VMul => (Lanes::from_bits(a) * Lanes::from_bits(b)).bits(),
        };

        trace!(%op, a, b, res, "ALU");
        res
    }

    /// Run the operation selected by a raw function code.
    ///
    /// Unknown codes produce 0.
    #[must_use]
    pub fn op_code(&self, code: u8, a: Word, b: Word) -> Word {
        let Some(op) = AluOp::from_code(code) else {
            trace!(code, "Unknown ALU function");
            return 0;
        };

        self.op(op, a, b)
    }
}

#[allow(clippy::cast_possible_wrap)]
const fn signed(word: Word) -> SignedWord {
    word as SignedWord
}

#[allow(clippy::cast_sign_loss)]
const fn unsigned(word: SignedWord) -> Word {
    word as Word
}
