use tracing::trace;

use crate::constants::{Word, INSTRUCTION_WIDTH};

/// A plain 32-bit adder, used for next-PC and branch target computations.
///
/// It lives outside of the [`Alu`](super::Alu) since the pipeline drives it
/// independently of the ALU function selector.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Adder;

impl Adder {
    /// Wrapping addition of two words
    #[must_use]
    pub fn op(&self, a: Word, b: Word) -> Word {
        let res = a.wrapping_add(b);
        trace!(a, b, res, "Adder");
        res
    }

    /// Address of the instruction following the one at `pc`
    #[must_use]
    pub fn next(&self, pc: Word) -> Word {
        self.op(pc, INSTRUCTION_WIDTH)
    }
}
