//! Token-level parsers for the statement grammar: directive names,
//! identifiers, operand classification, matrix subscripts, and the
//! `.string` payload.

use std::str::FromStr;

use nom::{
    character::complete::{alpha1, alphanumeric0, char, digit1},
    combinator::{all_consuming, map_res, recognize},
    sequence::{delimited, pair, preceded},
    IResult,
};
use num_traits::FromPrimitive;
use strum_macros::EnumString;

use lib465::op::{AddressMode, Register};

use crate::error::ErrorKind;
use crate::lex::MAX_IDENT_LEN;

#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumString)]
#[strum(serialize_all = "lowercase")]
pub enum DirectiveKind {
    Data,
    String,
    Mat,
    Entry,
    Extern,
}

pub fn identifier(i: &str) -> IResult<&str, &str> {
    recognize(pair(alpha1, alphanumeric0))(i)
}

/// Check the label grammar: a letter, then letters and digits, at most
/// thirty characters.
pub fn check_identifier(name: &str) -> Result<(), ErrorKind> {
    if name.len() > MAX_IDENT_LEN {
        return Err(ErrorKind::LabelTooLong);
    }
    match all_consuming(identifier)(name) {
        Ok(_) => Ok(()),
        Err(_) => Err(
            if name.starts_with(|c: char| c.is_ascii_alphabetic()) {
                ErrorKind::LabelCharset
            } else {
                ErrorKind::LabelFirstChar
            },
        ),
    }
}

/// An operand token classified by surface shape only; detailed parsing
/// happens after the addressing mode is checked against the opcode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RawOperand<'a> {
    /// Text after the `#` prefix, still unparsed.
    Immediate(&'a str),
    Register(Register),
    /// The whole `name[rX][rY]` token.
    Matrix(&'a str),
    Direct(&'a str),
}

impl RawOperand<'_> {
    pub fn mode(&self) -> AddressMode {
        match self {
            RawOperand::Immediate(_) => AddressMode::Immediate,
            RawOperand::Direct(_) => AddressMode::Direct,
            RawOperand::Matrix(_) => AddressMode::MatrixAccess,
            RawOperand::Register(_) => AddressMode::DirectRegister,
        }
    }
}

pub fn classify_operand(token: &str) -> RawOperand<'_> {
    if let Some(rest) = token.strip_prefix('#') {
        return RawOperand::Immediate(rest);
    }
    if let Ok(reg) = Register::from_str(token) {
        return RawOperand::Register(reg);
    }
    if token.contains('[') || token.contains(']') {
        return RawOperand::Matrix(token);
    }
    RawOperand::Direct(token)
}

fn register_index(i: &str) -> IResult<&str, u8> {
    map_res(preceded(char('r'), digit1), |digits: &str| {
        digits.parse::<u8>()
    })(i)
}

fn matrix_subscript(i: &str) -> IResult<&str, (u8, u8)> {
    pair(
        delimited(char('['), register_index, char(']')),
        delimited(char('['), register_index, char(']')),
    )(i)
}

fn bracketed_count(i: &str) -> IResult<&str, u32> {
    delimited(
        char('['),
        map_res(digit1, |digits: &str| digits.parse::<u32>()),
        char(']'),
    )(i)
}

fn matrix_dims(i: &str) -> IResult<&str, (u32, u32)> {
    pair(bracketed_count, bracketed_count)(i)
}

/// Parse a `name[rX][rY]` operand into its base label and subscript
/// registers.
pub fn parse_matrix_operand(token: &str) -> Result<(&str, Register, Register), ErrorKind> {
    let bracket = token.find(['[', ']']).unwrap_or(token.len());
    let name = &token[..bracket];
    if name.is_empty() {
        return Err(ErrorKind::MatrixNameMissing);
    }
    let (row, col) = match all_consuming(matrix_subscript)(&token[bracket..]) {
        Ok((_, indices)) => indices,
        Err(_) => return Err(ErrorKind::MatSubscriptSyntax),
    };
    let row = Register::from_u8(row).ok_or(ErrorKind::NoSuchRegister)?;
    let col = Register::from_u8(col).ok_or(ErrorKind::NoSuchRegister)?;
    Ok((name, row, col))
}

/// Parse the `[rows][cols]` token of a `.mat` directive.
pub fn parse_matrix_dims(token: &str) -> Result<(u32, u32), ErrorKind> {
    match all_consuming(matrix_dims)(token) {
        Ok((_, dims)) => Ok(dims),
        Err(_) => Err(ErrorKind::MatDimsSyntax),
    }
}

/// Strip the quotes off a `.string` payload. Only the first and last
/// characters are treated as delimiters; interior quotes are content.
pub fn quoted_string(tail: &str) -> Result<&str, ErrorKind> {
    let tail = tail.trim_end();
    let rest = tail
        .strip_prefix('"')
        .ok_or(ErrorKind::StringMissingOpenQuote)?;
    rest.strip_suffix('"')
        .ok_or(ErrorKind::StringMissingCloseQuote)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn directive_names() {
        assert_eq!(DirectiveKind::from_str("data"), Ok(DirectiveKind::Data));
        assert_eq!(DirectiveKind::from_str("mat"), Ok(DirectiveKind::Mat));
        assert!(DirectiveKind::from_str("DATA").is_err());
        assert!(DirectiveKind::from_str("word").is_err());
    }

    #[test]
    fn identifier_grammar() {
        assert!(check_identifier("LOOP").is_ok());
        assert!(check_identifier("a1b2").is_ok());
        assert_eq!(check_identifier("1abc"), Err(ErrorKind::LabelFirstChar));
        assert_eq!(check_identifier("ab_c"), Err(ErrorKind::LabelCharset));
        assert_eq!(check_identifier(""), Err(ErrorKind::LabelFirstChar));
        let long = "a".repeat(31);
        assert_eq!(check_identifier(&long), Err(ErrorKind::LabelTooLong));
    }

    #[test]
    fn operand_classification() {
        assert_eq!(classify_operand("#5").mode(), AddressMode::Immediate);
        assert_eq!(classify_operand("r3").mode(), AddressMode::DirectRegister);
        assert_eq!(classify_operand("M1[r1][r2]").mode(), AddressMode::MatrixAccess);
        assert_eq!(classify_operand("LOOP").mode(), AddressMode::Direct);
        // r8 is not a register, and has no brackets, so it reads as a label
        assert_eq!(classify_operand("r8").mode(), AddressMode::Direct);
    }

    #[test]
    fn matrix_operands() {
        assert_eq!(
            parse_matrix_operand("M1[r2][r7]"),
            Ok(("M1", Register::R2, Register::R7))
        );
        assert_eq!(
            parse_matrix_operand("[r1][r2]"),
            Err(ErrorKind::MatrixNameMissing)
        );
        assert_eq!(
            parse_matrix_operand("M1[r8][r0]"),
            Err(ErrorKind::NoSuchRegister)
        );
        assert_eq!(
            parse_matrix_operand("M1[1][2]"),
            Err(ErrorKind::MatSubscriptSyntax)
        );
        assert_eq!(
            parse_matrix_operand("M1[r1]"),
            Err(ErrorKind::MatSubscriptSyntax)
        );
        assert_eq!(
            parse_matrix_operand("M1[r1][r2]x"),
            Err(ErrorKind::MatSubscriptSyntax)
        );
    }

    #[test]
    fn matrix_dimension_tokens() {
        assert_eq!(parse_matrix_dims("[2][3]"), Ok((2, 3)));
        assert_eq!(parse_matrix_dims("[0][4]"), Ok((0, 4)));
        assert_eq!(parse_matrix_dims("[2]"), Err(ErrorKind::MatDimsSyntax));
        assert_eq!(parse_matrix_dims("[2][a]"), Err(ErrorKind::MatDimsSyntax));
        assert_eq!(parse_matrix_dims("[2] [3]"), Err(ErrorKind::MatDimsSyntax));
        assert_eq!(parse_matrix_dims("[-1][3]"), Err(ErrorKind::MatDimsSyntax));
    }

    #[test]
    fn string_payloads() {
        assert_eq!(quoted_string("\"abc\""), Ok("abc"));
        assert_eq!(quoted_string("\"\""), Ok(""));
        assert_eq!(quoted_string("\"a\"b\""), Ok("a\"b"));
        assert_eq!(quoted_string("abc\""), Err(ErrorKind::StringMissingOpenQuote));
        assert_eq!(quoted_string("\"abc"), Err(ErrorKind::StringMissingCloseQuote));
    }
}
