//! Parsing of the hexadecimal literals used to configure the machine.

use nom::{
    IResult,
    bytes::complete::{tag_no_case, take_while_m_n},
    combinator::{all_consuming, map_res},
    sequence::preceded,
    error::context,
};

use crate::error::ParseError;

type Result<'a, T> = IResult<&'a str, T, ParseError>;

fn is_hex_digit(c: char) -> bool {
    c.is_ascii_hexdigit()
}

fn take_hex_word(input: &str) -> Result<u16> {
    preceded(
        context("hex prefix", tag_no_case("0x")),
        context(
            "hex digits",
            map_res(take_while_m_n(1, 4, is_hex_digit), |digits| u16::from_str_radix(digits, 16)),
        ),
    )(input)
}

/// Parses a 16-bit word written as `0x` followed by one to four hexadecimal digits.
///
/// Both the prefix and the digits are case-insensitive. Surrounding whitespace is not accepted.
///
/// ```
/// use ssam::parsing::parse_hex_word;
///
/// assert_eq!(parse_hex_word("0x0100"), Ok(0x0100));
/// assert_eq!(parse_hex_word("0XfE"), Ok(0x00FE));
/// assert!(parse_hex_word("0x12345").is_err());
/// ```
pub fn parse_hex_word(input: &str) -> std::result::Result<u16, ParseError> {
    match all_consuming(take_hex_word)(input) {
        Ok((_, word)) => Ok(word),
        Err(nom::Err::Error(err)) | Err(nom::Err::Failure(err)) => Err(err),
        Err(nom::Err::Incomplete(_)) => Err(ParseError::incomplete()),
    }
}
