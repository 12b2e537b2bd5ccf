//! Small lexical utilities shared by the preprocessor and the passes:
//! reserved-word policy, token splitting, ranged integer parsing, and
//! comma validation.

use std::collections::HashSet;
use std::str::FromStr;

use lib465::op::Register;
use once_cell::sync::OnceCell;

use crate::error::ErrorKind;

/// Longest legal identifier (labels and macro names).
pub const MAX_IDENT_LEN: usize = 30;

/// Longest legal source line, excluding the terminator.
pub const MAX_LINE_LEN: usize = 80;

static RESERVED: OnceCell<HashSet<&'static str>> = OnceCell::new();

/// Opcode mnemonics, macro keywords, and directive names (without the dot).
pub fn is_reserved_word(word: &str) -> bool {
    RESERVED
        .get_or_init(|| {
            [
                "mov", "cmp", "add", "sub", "lea", "clr", "not", "inc", "dec", "jmp", "bne",
                "jsr", "red", "prn", "rts", "stop", "mcro", "mcroend", "data", "string", "mat",
                "entry", "extern",
            ]
            .into()
        })
        .contains(word)
}

pub fn is_register_name(word: &str) -> bool {
    Register::from_str(word).is_ok()
}

/// Split off the first whitespace-delimited token; the remainder comes
/// back with its leading whitespace removed.
pub fn first_token(line: &str) -> (&str, &str) {
    let line = line.trim_start();
    match line.find(char::is_whitespace) {
        Some(pos) => (&line[..pos], line[pos..].trim_start()),
        None => (line, ""),
    }
}

/// Split a comma-validated argument tail into its parameter tokens.
pub fn split_args(tail: &str) -> Vec<&str> {
    tail.split(|c: char| c == ',' || c.is_whitespace())
        .filter(|token| !token.is_empty())
        .collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NumKind {
    /// 10-bit signed payload of the data image.
    Data,
    /// 8-bit signed instruction immediate.
    Ins,
}

/// Parse a signed decimal integer, rejecting trailing garbage and values
/// outside the field width for `kind`.
pub fn parse_int(token: &str, kind: NumKind) -> Result<i16, ErrorKind> {
    let value: i64 = token.parse().map_err(|_| ErrorKind::ExpectedInteger)?;
    let (low, high, bits) = match kind {
        NumKind::Data => (-512, 511, 10),
        NumKind::Ins => (-128, 127, 8),
    };
    if value < low || value > high {
        return Err(ErrorKind::NumberOutOfRange { bits });
    }
    Ok(value as i16)
}

/// Validate comma placement over a trimmed argument tail: no leading,
/// trailing, or doubled commas, and a comma between every two parameters.
pub fn validate_commas(tail: &str) -> Result<(), ErrorKind> {
    if tail.is_empty() {
        return Ok(());
    }
    let mut expect_comma = false;
    let mut was_space = false;
    for (i, ch) in tail.chars().enumerate() {
        if ch == ',' {
            if !expect_comma {
                return Err(if i == 0 {
                    ErrorKind::LeadingComma
                } else {
                    ErrorKind::DoubleComma
                });
            }
            expect_comma = false;
        } else if ch.is_whitespace() {
            was_space = true;
        } else if !expect_comma {
            expect_comma = true;
            was_space = false;
        } else if was_space {
            return Err(ErrorKind::MissingComma);
        }
    }
    if !expect_comma {
        return Err(ErrorKind::TrailingComma);
    }
    Ok(())
}
