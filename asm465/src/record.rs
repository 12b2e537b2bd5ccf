//! Textual output records: the object file body and the entry/external
//! listing lines, all rendered in the base-4 alphabet.

use std::fmt::{self, Display};

use itertools::Itertools;

use lib465::word::{to_base4, ADDR_DIGITS, ORG_ADDRESS, WORD_DIGITS};

/// The assembled object program: header counts plus both word images.
#[derive(Debug)]
pub struct ObjectFile {
    pub ins: Vec<u16>,
    pub data: Vec<u16>,
}

impl ObjectFile {
    pub fn ic(&self) -> u16 {
        self.ins.len() as u16
    }

    pub fn dc(&self) -> u16 {
        self.data.len() as u16
    }
}

impl Display for ObjectFile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Header: one leading space, then IC and DC.
        writeln!(
            f,
            " {} {}",
            to_base4(self.ic(), ADDR_DIGITS),
            to_base4(self.dc(), ADDR_DIGITS)
        )?;
        for (index, word) in self.ins.iter().chain(self.data.iter()).enumerate() {
            writeln!(
                f,
                "{}\t{}",
                to_base4(ORG_ADDRESS + index as u16, ADDR_DIGITS),
                to_base4(*word, WORD_DIGITS)
            )?;
        }
        Ok(())
    }
}

/// One `.ent` line: an exported label and its absolute address.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntryLine {
    pub name: String,
    pub address: u16,
}

impl Display for EntryLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.name, to_base4(self.address, ADDR_DIGITS))
    }
}

/// One `.ext` line: an external label and the address of the operand
/// word that referenced it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExternalUse {
    pub name: String,
    pub address: u16,
}

impl Display for ExternalUse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.name, to_base4(self.address, ADDR_DIGITS))
    }
}

/// Join listing lines into file content; empty listings produce no text.
pub fn listing<T: Display>(lines: &[T]) -> String {
    let mut text = lines.iter().join("\n");
    if !text.is_empty() {
        text.push('\n');
    }
    text
}
