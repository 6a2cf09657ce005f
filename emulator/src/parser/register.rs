//! Parse register names: ABI names (`a0`, `sp`, `fp`…), `x0`-`x31` and `$0`-`$31`.

use nom::{
    branch::alt,
    bytes::complete::take_while1,
    character::complete::{char, digit1},
    combinator::map_opt,
    sequence::preceded,
    IResult,
};

use crate::runtime::Reg;

fn is_name_char(c: char) -> bool {
    c.is_ascii_lowercase() || c.is_ascii_digit()
}

fn from_number(digits: &str) -> Option<Reg> {
    digits.parse().ok().and_then(|n| Reg::new(n).ok())
}

/// Parse a register name
///
/// # Errors
///
/// Fails if the input does not start with the name of one of the 32 registers
pub fn parse_register(input: &str) -> IResult<&str, Reg> {
    alt((
        map_opt(take_while1(is_name_char), Reg::from_name),
        map_opt(preceded(alt((char('x'), char('$'))), digit1), from_number),
    ))(input)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_abi_name_test() {
        assert_eq!(parse_register("zero"), Ok(("", Reg::ZERO)));
        assert_eq!(parse_register("sp"), Ok(("", Reg::SP)));
        assert_eq!(parse_register("s10"), Ok(("", Reg::new(26).unwrap())));
        assert_eq!(parse_register("s1, a0"), Ok((", a0", Reg::new(9).unwrap())));
        assert_eq!(parse_register("fp"), Ok(("", Reg::new(8).unwrap())));
    }

    #[test]
    fn parse_numeric_test() {
        assert_eq!(parse_register("x0"), Ok(("", Reg::ZERO)));
        assert_eq!(parse_register("x31"), Ok(("", Reg::new(31).unwrap())));
        assert_eq!(parse_register("$1"), Ok(("", Reg::RA)));
        assert!(parse_register("x32").is_err());
        assert!(parse_register("$100").is_err());
        assert!(parse_register("x").is_err());
    }

    #[test]
    fn parse_invalid_test() {
        assert!(parse_register("a8").is_err());
        assert!(parse_register("s12").is_err());
        assert!(parse_register("%a").is_err());
        assert!(parse_register("").is_err());
    }
}
