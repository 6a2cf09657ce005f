//! Parse number literals.
//!
//! It parses base 10, base 16 (prefixed by `0x`), base 8 (prefixed by `0o`)
//! and base 2 (prefixed by `0b`) literals into machine words, optionally
//! negated with a leading `-`.

use std::str::FromStr;

use nom::{
    branch::alt,
    bytes::complete::{tag_no_case, take_while1},
    character::complete::char,
    combinator::{map_res, opt},
    IResult,
};

use crate::constants::Word;

/// Parse a decimal number
fn from_decimal(input: &str) -> Result<Word, std::num::ParseIntError> {
    Word::from_str(input)
}

fn is_digit(c: char) -> bool {
    c.is_ascii_digit()
}

/// Parse a hexadecimal number
fn from_hexadecimal(input: &str) -> Result<Word, std::num::ParseIntError> {
    Word::from_str_radix(input, 16)
}

fn is_hex_digit(c: char) -> bool {
    c.is_ascii_hexdigit()
}

/// Extract a hexadecimal literal
fn take_hexadecimal_literal(input: &str) -> IResult<&str, &str> {
    let (input, _) = tag_no_case("0x")(input)?;
    take_while1(is_hex_digit)(input)
}

/// Parse an octal number
fn from_octal(input: &str) -> Result<Word, std::num::ParseIntError> {
    Word::from_str_radix(input, 8)
}

fn is_oct_digit(c: char) -> bool {
    c.is_digit(8)
}

/// Extract an octal literal
fn take_octal_literal(input: &str) -> IResult<&str, &str> {
    let (input, _) = tag_no_case("0o")(input)?;
    take_while1(is_oct_digit)(input)
}

/// Parse a binary number
fn from_binary(input: &str) -> Result<Word, std::num::ParseIntError> {
    Word::from_str_radix(input, 2)
}

fn is_bin_digit(c: char) -> bool {
    c.is_digit(2)
}

/// Extract a binary literal
fn take_binary_literal(input: &str) -> IResult<&str, &str> {
    let (input, _) = tag_no_case("0b")(input)?;
    take_while1(is_bin_digit)(input)
}

/// Parse an unsigned number literal
///
/// # Errors
///
/// Fails if the input does not start with a literal fitting in a word
pub fn parse_literal(input: &str) -> IResult<&str, Word> {
    alt((
        map_res(take_hexadecimal_literal, from_hexadecimal),
        map_res(take_octal_literal, from_octal),
        map_res(take_binary_literal, from_binary),
        map_res(take_while1(is_digit), from_decimal),
    ))(input)
}

/// Parse a number literal, negative numbers being stored in two's complement
///
/// # Errors
///
/// Fails if the input does not start with an optionally negated literal
/// fitting in a word
pub fn parse_signed_literal(input: &str) -> IResult<&str, Word> {
    let (input, minus) = opt(char('-'))(input)?;
    let (input, value) = parse_literal(input)?;
    let value = if minus.is_some() {
        value.wrapping_neg()
    } else {
        value
    };
    Ok((input, value))
}
