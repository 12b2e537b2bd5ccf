//! First pass: scans the expanded stream line by line, binds labels,
//! encodes directives into the data image and instructions into the
//! instruction image, and records a pending fix-up for every label
//! reference an operand makes.

use anyhow::Result;
use std::str::FromStr;

use lib465::op::{AddressMode, ModeSet, OneOperandOp, Op, TwoOperandOp, ZeroOperandOp};
use lib465::word::{self, MEM_AVAIL_WORDS};

use crate::error::{Diagnostics, ErrorKind, Fatal};
use crate::lex::{self, NumKind};
use crate::parser::{self, DirectiveKind, RawOperand};
use crate::preprocess::MacroTable;
use crate::symbols::{Section, SymbolTable};

/// A label reference waiting for the second pass: the word at
/// `ins_index` will be patched with the symbol's absolute address.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fixup {
    pub label: String,
    pub ins_index: usize,
    pub line: usize,
}

/// Everything the first pass hands to the second.
#[derive(Debug)]
pub struct PassOne {
    pub ins: Vec<u16>,
    pub data: Vec<u16>,
    pub symbols: SymbolTable,
    pub fixups: Vec<Fixup>,
    pub diagnostics: Diagnostics,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Position {
    Source,
    Destination,
}

pub struct FirstPass<'a> {
    macros: &'a MacroTable,
    ins: Vec<u16>,
    data: Vec<u16>,
    symbols: SymbolTable,
    fixups: Vec<Fixup>,
    diag: Diagnostics,
    line_no: usize,
    was_reg: bool,
}

impl<'a> FirstPass<'a> {
    /// Scan the whole expanded stream. `Err` means a fatal condition
    /// (the memory budget); everything else is collected as diagnostics.
    pub fn run(expanded: &str, macros: &'a MacroTable) -> Result<PassOne> {
        let mut pass = FirstPass {
            macros,
            ins: Vec::new(),
            data: Vec::new(),
            symbols: SymbolTable::new(),
            fixups: Vec::new(),
            diag: Diagnostics::new(),
            line_no: 0,
            was_reg: false,
        };

        for (index, line) in expanded.lines().enumerate() {
            pass.line_no = index + 1;
            pass.scan_line(line)?;
        }

        let undefined: Vec<(usize, String)> = pass
            .symbols
            .unresolved()
            .map(|s| (s.offset as usize, s.name.clone()))
            .collect();
        for (line, name) in undefined {
            pass.diag.report(line, ErrorKind::UndefinedEntry(name));
        }

        Ok(PassOne {
            ins: pass.ins,
            data: pass.data,
            symbols: pass.symbols,
            fixups: pass.fixups,
            diagnostics: pass.diag,
        })
    }

    fn report(&mut self, kind: ErrorKind) {
        self.diag.report(self.line_no, kind);
    }

    fn fatal(&self, message: &str) -> anyhow::Error {
        Fatal {
            line: self.line_no,
            message: message.to_owned(),
        }
        .into()
    }

    /// Append one instruction word, returning its image index.
    fn add_ins(&mut self, word: u16) -> Result<usize> {
        if self.ins.len() + self.data.len() >= MEM_AVAIL_WORDS {
            return Err(self.fatal("no free cells left in memory"));
        }
        self.ins.push(word);
        Ok(self.ins.len() - 1)
    }

    fn add_data(&mut self, word: u16) -> Result<()> {
        if self.ins.len() + self.data.len() >= MEM_AVAIL_WORDS {
            return Err(self.fatal("no free cells left in memory"));
        }
        self.data.push(word);
        Ok(())
    }

    fn scan_line(&mut self, line: &str) -> Result<()> {
        if line.len() > lex::MAX_LINE_LEN {
            self.report(ErrorKind::LineTooLong);
            return Ok(());
        }
        let content = line.trim();
        if content.is_empty() || content.starts_with(';') {
            return Ok(());
        }

        let (first, _) = lex::first_token(content);
        let mut label = None;
        let mut statement = content;

        if let Some(colon) = first.find(':') {
            if colon != first.len() - 1 {
                self.report(ErrorKind::MisplacedColon);
                return Ok(());
            }
            let name = &first[..colon];
            if name.is_empty() {
                self.report(ErrorKind::MissingLabelName);
                return Ok(());
            }
            if let Err(kind) = self.check_label_candidate(name) {
                self.report(kind);
                return Ok(());
            }
            label = Some(name);
            statement = content[first.len()..].trim_start();
        }

        if statement.is_empty() {
            self.report(ErrorKind::LabelAlone);
            return Ok(());
        }

        match statement.strip_prefix('.') {
            Some(directive) => self.scan_directive(label, directive),
            None => self.scan_instruction(label, statement),
        }
    }

    /// The label grammar plus the name policy: not a duplicate, not a
    /// register, not reserved, not a macro.
    fn check_label_candidate(&self, name: &str) -> Result<(), ErrorKind> {
        parser::check_identifier(name)?;
        if let Some(existing) = self.symbols.get(name) {
            if existing.section != Section::Unresolved {
                return Err(ErrorKind::DuplicateLabel(name.to_owned()));
            }
        }
        if lex::is_register_name(name) {
            return Err(ErrorKind::LabelIsRegister(name.to_owned()));
        }
        if lex::is_reserved_word(name) {
            return Err(ErrorKind::LabelIsReserved(name.to_owned()));
        }
        if self.macros.contains(name) {
            return Err(ErrorKind::LabelIsMacro(name.to_owned()));
        }
        Ok(())
    }

    fn scan_directive(&mut self, label: Option<&str>, directive: &str) -> Result<()> {
        if directive.is_empty() {
            self.report(ErrorKind::MissingDirectiveName);
            return Ok(());
        }
        if directive.starts_with(char::is_whitespace) {
            self.report(ErrorKind::SpaceAfterDot);
            return Ok(());
        }
        let (name, tail) = lex::first_token(directive);
        let Ok(kind) = DirectiveKind::from_str(name) else {
            self.report(ErrorKind::UnknownStatement(format!(".{name}")));
            return Ok(());
        };

        match kind {
            // A label before .entry/.extern is silently dropped.
            DirectiveKind::Entry => {
                self.scan_entry_extern(tail, true);
                Ok(())
            }
            DirectiveKind::Extern => {
                self.scan_entry_extern(tail, false);
                Ok(())
            }
            DirectiveKind::Data | DirectiveKind::String | DirectiveKind::Mat => {
                if let Some(name) = label {
                    let offset = self.data.len() as u8;
                    if let Err(kind) = self.symbols.define(name, Section::Data, offset) {
                        self.report(kind);
                    }
                }
                if tail.is_empty() {
                    self.report(ErrorKind::MissingParameters);
                    return Ok(());
                }
                match kind {
                    DirectiveKind::Data => self.scan_data(tail),
                    DirectiveKind::String => self.scan_string(tail),
                    _ => self.scan_mat(tail),
                }
            }
        }
    }

    fn scan_entry_extern(&mut self, tail: &str, is_entry: bool) {
        let (name, rest) = lex::first_token(tail);
        if name.is_empty() {
            self.report(ErrorKind::MissingName);
            return;
        }
        let result = if is_entry {
            self.symbols.declare_entry(name, self.line_no)
        } else {
            self.symbols.declare_extern(name)
        };
        if let Err(kind) = result {
            self.report(kind);
            return;
        }
        if !rest.is_empty() {
            self.report(ErrorKind::TrailingAfterName);
        }
    }

    fn scan_data(&mut self, tail: &str) -> Result<()> {
        if let Err(kind) = lex::validate_commas(tail) {
            self.report(kind);
            return Ok(());
        }
        for token in lex::split_args(tail) {
            match lex::parse_int(token, NumKind::Data) {
                Ok(value) => self.add_data(word::data_word(value))?,
                Err(kind) => {
                    self.report(kind);
                    break;
                }
            }
        }
        Ok(())
    }

    fn scan_string(&mut self, tail: &str) -> Result<()> {
        let body = match parser::quoted_string(tail) {
            Ok(body) => body,
            Err(kind) => {
                self.report(kind);
                return Ok(());
            }
        };
        for ch in body.chars() {
            let code = ch as u32;
            if code > 31 && code < 127 {
                self.add_data(code as u16)?;
            } else {
                self.report(ErrorKind::StringBadChar);
                return Ok(());
            }
        }
        self.add_data(0)
    }

    fn scan_mat(&mut self, tail: &str) -> Result<()> {
        // The dimension token ends at the second ']'.
        let mut brackets = tail.match_indices(']');
        let _first = brackets.next();
        let Some((end, _)) = brackets.next() else {
            self.report(ErrorKind::MatDimsSyntax);
            return Ok(());
        };
        let (dims_token, values) = tail.split_at(end + 1);
        let (rows, cols) = match parser::parse_matrix_dims(dims_token) {
            Ok(dims) => dims,
            Err(kind) => {
                self.report(kind);
                return Ok(());
            }
        };
        let mut cells = rows as u64 * cols as u64;
        if cells == 0 {
            self.report(ErrorKind::ZeroSizeMatrix);
            return Ok(());
        }

        // One comma may separate the dimensions from the first value.
        let mut values = values.trim_start();
        if let Some(stripped) = values.strip_prefix(',') {
            values = stripped.trim_start();
        }
        if let Err(kind) = lex::validate_commas(values) {
            self.report(kind);
            return Ok(());
        }
        for token in lex::split_args(values) {
            if cells == 0 {
                self.report(ErrorKind::MatTooManyValues);
                return Ok(());
            }
            match lex::parse_int(token, NumKind::Data) {
                Ok(value) => {
                    self.add_data(word::data_word(value))?;
                    cells -= 1;
                }
                Err(kind) => {
                    self.report(kind);
                    return Ok(());
                }
            }
        }
        for _ in 0..cells {
            self.add_data(0)?;
        }
        Ok(())
    }

    fn scan_instruction(&mut self, label: Option<&str>, statement: &str) -> Result<()> {
        if let Some(name) = label {
            let offset = self.ins.len() as u8;
            if let Err(kind) = self.symbols.define(name, Section::Ins, offset) {
                self.report(kind);
            }
        }

        let (mnemonic, tail) = lex::first_token(statement);
        let Some(op) = Op::from_mnemonic(mnemonic) else {
            self.report(ErrorKind::UnknownStatement(mnemonic.to_owned()));
            return Ok(());
        };

        self.was_reg = false;
        match op {
            Op::Zero(op) => self.encode_zero_operand(op, tail),
            Op::One(op) => self.encode_one_operand(op, tail),
            Op::Two(op) => self.encode_two_operand(op, tail),
        }
    }

    fn encode_zero_operand(&mut self, op: ZeroOperandOp, tail: &str) -> Result<()> {
        self.add_ins(word::title_word(op as u8, 0, 0))?;
        if !tail.is_empty() {
            self.report(if tail.starts_with(',') {
                ErrorKind::CommaAfterMnemonic
            } else {
                ErrorKind::ExtraOperands
            });
        }
        Ok(())
    }

    fn encode_one_operand(&mut self, op: OneOperandOp, tail: &str) -> Result<()> {
        if let Err(kind) = lex::validate_commas(tail) {
            self.report(kind);
            return Ok(());
        }
        let title = self.add_ins(0)?;
        let args = lex::split_args(tail);
        if args.is_empty() {
            self.report(ErrorKind::MissingOperand);
            return Ok(());
        }
        let Some(dst) = self.encode_operand(args[0], Position::Destination, op.dest_modes())?
        else {
            return Ok(());
        };
        if args.len() > 1 {
            self.report(ErrorKind::ExtraOperands);
            return Ok(());
        }
        self.ins[title] = word::title_word(op as u8, 0, dst as u8);
        Ok(())
    }

    fn encode_two_operand(&mut self, op: TwoOperandOp, tail: &str) -> Result<()> {
        if let Err(kind) = lex::validate_commas(tail) {
            self.report(kind);
            return Ok(());
        }
        let title = self.add_ins(0)?;
        let args = lex::split_args(tail);
        if args.is_empty() {
            self.report(ErrorKind::MissingOperand);
            return Ok(());
        }
        let Some(src) = self.encode_operand(args[0], Position::Source, op.source_modes())? else {
            return Ok(());
        };
        if args.len() < 2 {
            self.report(ErrorKind::MissingOperand);
            return Ok(());
        }
        let Some(dst) = self.encode_operand(args[1], Position::Destination, op.dest_modes())?
        else {
            return Ok(());
        };
        if args.len() > 2 {
            self.report(ErrorKind::ExtraOperands);
            return Ok(());
        }
        self.ins[title] = word::title_word(op as u8, src as u8, dst as u8);
        Ok(())
    }

    /// Encode one operand's extension word(s). Returns the addressing
    /// mode for the title word, or `None` after a reported source error.
    fn encode_operand(
        &mut self,
        token: &str,
        position: Position,
        allowed: ModeSet,
    ) -> Result<Option<AddressMode>> {
        let raw = parser::classify_operand(token);
        let mode = raw.mode();
        if !allowed.contains(mode) {
            self.report(match position {
                Position::Source => ErrorKind::SourceModeMismatch,
                Position::Destination => ErrorKind::DestModeMismatch,
            });
            return Ok(None);
        }

        match raw {
            RawOperand::Immediate(digits) => match lex::parse_int(digits, NumKind::Ins) {
                Ok(value) => {
                    self.add_ins(word::immediate_word(value))?;
                }
                Err(kind) => {
                    self.report(kind);
                    return Ok(None);
                }
            },
            RawOperand::Direct(name) => {
                // The token is taken as-is; a name that never resolves
                // is reported by the second pass.
                let index = self.add_ins(0)?;
                self.fixups.push(Fixup {
                    label: name.to_owned(),
                    ins_index: index,
                    line: self.line_no,
                });
            }
            RawOperand::Matrix(token) => match parser::parse_matrix_operand(token) {
                Ok((name, row, col)) => {
                    let index = self.add_ins(0)?;
                    self.fixups.push(Fixup {
                        label: name.to_owned(),
                        ins_index: index,
                        line: self.line_no,
                    });
                    self.add_ins(word::matrix_register_word(row as u8, col as u8))?;
                }
                Err(kind) => {
                    self.report(kind);
                    return Ok(None);
                }
            },
            RawOperand::Register(reg) => match position {
                Position::Source => {
                    self.was_reg = true;
                    self.add_ins(word::source_register_word(reg as u8))?;
                }
                Position::Destination => {
                    let bits = word::dest_register_word(reg as u8);
                    if self.was_reg {
                        // Source and destination registers share the
                        // extension word already emitted.
                        if let Some(last) = self.ins.last_mut() {
                            *last |= bits;
                        }
                    } else {
                        self.add_ins(bits)?;
                    }
                }
            },
        }
        Ok(Some(mode))
    }
}
