//! Second pass: resolves the pending fix-ups against the symbol table,
//! classifies each patched word as relocatable or external, and lays out
//! the object, entry, and external texts.

use crate::error::{Diagnostics, ErrorKind};
use crate::pass_one::PassOne;
use crate::record::{EntryLine, ExternalUse, ObjectFile};
use crate::symbols::{Linkage, Section, Symbol};

use lib465::word::{self, ORG_ADDRESS, VALUE_MASK};

/// The three output texts for one assembled file.
#[derive(Debug)]
pub struct Artifacts {
    pub object: ObjectFile,
    pub entries: Vec<EntryLine>,
    pub externals: Vec<ExternalUse>,
}

fn absolute_address(symbol: &Symbol, ic_final: u16) -> u16 {
    match symbol.section {
        Section::Data => ORG_ADDRESS + ic_final + symbol.offset as u16,
        _ => ORG_ADDRESS + symbol.offset as u16,
    }
}

/// Run the second pass. Diagnostics from the first pass carry over, and
/// this pass may add its own; the caller discards the artifacts when any
/// are present.
pub fn pass_two(pass_one: PassOne) -> (Artifacts, Diagnostics) {
    let PassOne {
        mut ins,
        data,
        symbols,
        fixups,
        diagnostics: mut diag,
    } = pass_one;

    let ic_final = ins.len() as u16;
    let mut externals = Vec::new();

    for fixup in &fixups {
        let Some(symbol) = symbols.get(&fixup.label) else {
            diag.report(fixup.line, ErrorKind::UndefinedLabel(fixup.label.clone()));
            continue;
        };
        if symbol.linkage == Linkage::External {
            ins[fixup.ins_index] = word::external_word();
            externals.push(ExternalUse {
                name: fixup.label.clone(),
                address: ORG_ADDRESS + fixup.ins_index as u16,
            });
        } else {
            let absolute = absolute_address(symbol, ic_final);
            if absolute > VALUE_MASK {
                diag.report(fixup.line, ErrorKind::AddressOverflow(fixup.label.clone()));
            }
            ins[fixup.ins_index] = word::relocatable_word(absolute);
        }
    }

    let entries = symbols
        .iter()
        .filter(|s| s.linkage == Linkage::Entry && s.section != Section::Unresolved)
        .map(|s| EntryLine {
            name: s.name.clone(),
            address: absolute_address(s, ic_final),
        })
        .collect();

    let artifacts = Artifacts {
        object: ObjectFile { ins, data },
        entries,
        externals,
    };
    (artifacts, diag)
}
