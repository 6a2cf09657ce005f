//! Parsing of the values given on the command line: number literals and
//! register names. The parsing is handled by the `nom` library.

use nom::combinator::all_consuming;
use nom::Finish;
use thiserror::Error;

use crate::constants::Word;
use crate::runtime::Reg;

mod literal;
mod register;

pub use self::literal::{parse_literal, parse_signed_literal};
pub use self::register::parse_register;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("invalid number {input:?}")]
pub struct LiteralError {
    input: String,
}

/// Parse a whole string as a word, in decimal, hexadecimal, octal or binary
///
/// # Errors
///
/// Fails if the string is not exactly one number literal fitting in a word
pub fn parse_word(input: &str) -> Result<Word, LiteralError> {
    all_consuming(parse_signed_literal)(input.trim())
        .finish()
        .map(|(_, word)| word)
        .map_err(|_| LiteralError {
            input: input.to_owned(),
        })
}

/// Parse a whole string as a register name
pub(crate) fn parse_register_name(input: &str) -> Option<Reg> {
    all_consuming(parse_register)(input)
        .finish()
        .ok()
        .map(|(_, reg)| reg)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_word_test() {
        assert_eq!(parse_word("0x80010000"), Ok(0x8001_0000));
        assert_eq!(parse_word("65536"), Ok(65536));
        assert_eq!(parse_word(" 0b11 "), Ok(3));
        assert_eq!(parse_word("-4"), Ok(0xffff_fffc));
        assert!(parse_word("0x100000000").is_err());
        assert!(parse_word("12abc").is_err());
        assert_eq!(
            parse_word("").unwrap_err().to_string(),
            "invalid number \"\""
        );
    }

    #[test]
    fn parse_register_name_test() {
        assert_eq!(parse_register_name("t6"), Reg::new(31).ok());
        assert_eq!(parse_register_name("t6 "), None);
        assert_eq!(parse_register_name("x10"), Reg::new(10).ok());
    }
}
