//! The per-file symbol table.
//!
//! Symbols are kept in definition order so listings come out
//! deterministically; a name index serves lookups.

use std::collections::HashMap;

use crate::error::ErrorKind;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Section {
    Data,
    Ins,
    /// Named by `.entry` before any definition; reconciled when the
    /// definition arrives.
    Unresolved,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Linkage {
    Regular,
    Entry,
    External,
}

#[derive(Debug, Clone)]
pub struct Symbol {
    pub name: String,
    /// Offset within the symbol's section. For an Unresolved placeholder
    /// this holds the `.entry` line number instead (mod 256, the field
    /// being 8-bit).
    pub offset: u8,
    pub section: Section,
    pub linkage: Linkage,
}

#[derive(Debug, Default)]
pub struct SymbolTable {
    symbols: Vec<Symbol>,
    by_name: HashMap<String, usize>,
}

impl SymbolTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, name: &str) -> Option<&Symbol> {
        self.by_name.get(name).map(|&i| &self.symbols[i])
    }

    pub fn iter(&self) -> impl Iterator<Item = &Symbol> {
        self.symbols.iter()
    }

    fn push(&mut self, symbol: Symbol) {
        self.by_name.insert(symbol.name.clone(), self.symbols.len());
        self.symbols.push(symbol);
    }

    /// Bind a label definition at `offset` in `section`. A same-named
    /// Unresolved placeholder is filled in instead of inserted anew;
    /// its linkage is already Entry.
    pub fn define(&mut self, name: &str, section: Section, offset: u8) -> Result<(), ErrorKind> {
        if let Some(&i) = self.by_name.get(name) {
            let symbol = &mut self.symbols[i];
            if symbol.section != Section::Unresolved {
                return Err(ErrorKind::DuplicateLabel(name.to_owned()));
            }
            symbol.section = section;
            symbol.offset = offset;
            return Ok(());
        }
        self.push(Symbol {
            name: name.to_owned(),
            offset,
            section,
            linkage: Linkage::Regular,
        });
        Ok(())
    }

    /// Record a `.entry` declaration seen on `line`. An unknown name
    /// becomes an Unresolved placeholder remembering the line for the
    /// end-of-pass diagnostic.
    pub fn declare_entry(&mut self, name: &str, line: usize) -> Result<(), ErrorKind> {
        if let Some(&i) = self.by_name.get(name) {
            let symbol = &mut self.symbols[i];
            if symbol.linkage == Linkage::External {
                return Err(ErrorKind::EntryConflictsExternal(name.to_owned()));
            }
            if symbol.section != Section::Unresolved {
                symbol.linkage = Linkage::Entry;
            }
            return Ok(());
        }
        self.push(Symbol {
            name: name.to_owned(),
            offset: line as u8,
            section: Section::Unresolved,
            linkage: Linkage::Entry,
        });
        Ok(())
    }

    pub fn declare_extern(&mut self, name: &str) -> Result<(), ErrorKind> {
        if let Some(existing) = self.get(name) {
            return Err(if existing.linkage == Linkage::External {
                ErrorKind::DuplicateExtern(name.to_owned())
            } else {
                ErrorKind::ExternConflictsInternal(name.to_owned())
            });
        }
        self.push(Symbol {
            name: name.to_owned(),
            offset: 0,
            section: Section::Ins,
            linkage: Linkage::External,
        });
        Ok(())
    }

    /// Placeholders never reconciled by a definition.
    pub fn unresolved(&self) -> impl Iterator<Item = &Symbol> {
        self.symbols
            .iter()
            .filter(|s| s.section == Section::Unresolved)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn definitions_record_section_and_offset() {
        let mut table = SymbolTable::new();
        table.define("MAIN", Section::Ins, 0).unwrap();
        table.define("LIST", Section::Data, 4).unwrap();

        let main = table.get("MAIN").unwrap();
        assert_eq!(main.section, Section::Ins);
        assert_eq!(main.offset, 0);
        assert_eq!(main.linkage, Linkage::Regular);

        let list = table.get("LIST").unwrap();
        assert_eq!(list.section, Section::Data);
        assert_eq!(list.offset, 4);
    }

    #[test]
    fn duplicate_definitions_are_rejected() {
        let mut table = SymbolTable::new();
        table.define("X", Section::Ins, 0).unwrap();
        assert_eq!(
            table.define("X", Section::Ins, 3),
            Err(ErrorKind::DuplicateLabel("X".into()))
        );
    }

    #[test]
    fn forward_entry_is_reconciled_by_definition() {
        let mut table = SymbolTable::new();
        table.declare_entry("LAB", 2).unwrap();
        assert_eq!(table.get("LAB").unwrap().section, Section::Unresolved);

        table.define("LAB", Section::Data, 7).unwrap();
        let lab = table.get("LAB").unwrap();
        assert_eq!(lab.section, Section::Data);
        assert_eq!(lab.offset, 7);
        assert_eq!(lab.linkage, Linkage::Entry);
        assert_eq!(table.unresolved().count(), 0);
    }

    #[test]
    fn entry_on_defined_symbol_sets_linkage() {
        let mut table = SymbolTable::new();
        table.define("MAIN", Section::Ins, 1).unwrap();
        table.declare_entry("MAIN", 5).unwrap();
        assert_eq!(table.get("MAIN").unwrap().linkage, Linkage::Entry);
    }

    #[test]
    fn entry_and_extern_conflict_both_ways() {
        let mut table = SymbolTable::new();
        table.declare_extern("EXT").unwrap();
        assert_eq!(
            table.declare_entry("EXT", 3),
            Err(ErrorKind::EntryConflictsExternal("EXT".into()))
        );

        let mut table = SymbolTable::new();
        table.define("IN", Section::Ins, 0).unwrap();
        assert_eq!(
            table.declare_extern("IN"),
            Err(ErrorKind::ExternConflictsInternal("IN".into()))
        );
    }

    #[test]
    fn duplicate_externs_are_rejected() {
        let mut table = SymbolTable::new();
        table.declare_extern("EXT").unwrap();
        assert_eq!(
            table.declare_extern("EXT"),
            Err(ErrorKind::DuplicateExtern("EXT".into()))
        );
    }

    #[test]
    fn unreconciled_placeholders_surface() {
        let mut table = SymbolTable::new();
        table.declare_entry("GHOST", 9).unwrap();
        let ghosts: Vec<_> = table.unresolved().collect();
        assert_eq!(ghosts.len(), 1);
        assert_eq!(ghosts[0].offset, 9);
    }
}
