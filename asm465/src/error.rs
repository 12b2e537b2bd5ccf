//! Source-error kinds and the per-file diagnostics list.
//!
//! Non-fatal findings are collected while scanning continues; a file with
//! any collected error produces no output artifacts. Fatal conditions
//! (memory budget, I/O) abort the file instead and travel as [`Fatal`].

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ErrorKind {
    #[error("line is longer than 80 characters")]
    LineTooLong,

    #[error("invalid macro declaration syntax")]
    MacroSyntax,
    #[error("reserved word used as a macro name")]
    MacroReserved,
    #[error("illegal macro name")]
    MacroIllegalName,
    #[error("duplicate macro definition")]
    MacroDuplicate,
    #[error("macro definitions may not nest")]
    MacroNested,
    #[error("'mcroend' without a matching 'mcro'")]
    MacroEndWithoutStart,
    #[error("a macro body may not be empty")]
    MacroEmpty,
    #[error("macro '{0}' is not closed before end of file")]
    MacroUnclosed(String),

    #[error("':' must terminate the first token of a label line")]
    MisplacedColon,
    #[error("label name is missing before ':'")]
    MissingLabelName,
    #[error("a label must start with a letter")]
    LabelFirstChar,
    #[error("a label may contain only letters and digits")]
    LabelCharset,
    #[error("a label may not exceed 30 characters")]
    LabelTooLong,
    #[error("label '{0}' is already defined")]
    DuplicateLabel(String),
    #[error("'{0}' is a register name and cannot label a line")]
    LabelIsRegister(String),
    #[error("'{0}' is a reserved word and cannot label a line")]
    LabelIsReserved(String),
    #[error("'{0}' is a macro name and cannot label a line")]
    LabelIsMacro(String),
    #[error("no content after label")]
    LabelAlone,

    #[error("directive name is missing after '.'")]
    MissingDirectiveName,
    #[error("blank character after the directive period")]
    SpaceAfterDot,
    #[error("unrecognized statement '{0}'")]
    UnknownStatement(String),

    #[error("missing label name after the directive")]
    MissingName,
    #[error("extra characters after the label name")]
    TrailingAfterName,
    #[error("'{0}' is declared external and cannot also be an entry")]
    EntryConflictsExternal(String),
    #[error("'{0}' is defined in this file and cannot be declared external")]
    ExternConflictsInternal(String),
    #[error("'{0}' is declared external more than once")]
    DuplicateExtern(String),
    #[error("entry label '{0}' is never defined in this file")]
    UndefinedEntry(String),

    #[error("missing parameters")]
    MissingParameters,
    #[error("expected an integer parameter")]
    ExpectedInteger,
    #[error("number does not fit in {bits} signed bits")]
    NumberOutOfRange { bits: u8 },

    #[error("there is a comma before the parameters")]
    LeadingComma,
    #[error("there is a comma after the last parameter")]
    TrailingComma,
    #[error("more than one comma between parameters")]
    DoubleComma,
    #[error("missing comma between parameters")]
    MissingComma,

    #[error("string is missing its opening quote")]
    StringMissingOpenQuote,
    #[error("string is missing its closing quote")]
    StringMissingCloseQuote,
    #[error("non-printable character in string")]
    StringBadChar,

    #[error("malformed matrix definition: expected [rows][cols]")]
    MatDimsSyntax,
    #[error("a matrix of size zero is invalid")]
    ZeroSizeMatrix,
    #[error("more values than the matrix has cells")]
    MatTooManyValues,
    #[error("matrix name is missing")]
    MatrixNameMissing,
    #[error("malformed matrix subscript: expected [rX][rY]")]
    MatSubscriptSyntax,
    #[error("no register with that name exists")]
    NoSuchRegister,

    #[error("missing operand")]
    MissingOperand,
    #[error("unnecessary operand(s) after the instruction")]
    ExtraOperands,
    #[error("extra comma after the instruction name")]
    CommaAfterMnemonic,
    #[error("the source operand type does not match the instruction")]
    SourceModeMismatch,
    #[error("the destination operand type does not match the instruction")]
    DestModeMismatch,

    #[error("undefined label '{0}'")]
    UndefinedLabel(String),
    #[error("address of '{0}' overflows the operand value field")]
    AddressOverflow(String),
}

/// A fatal, file-aborting condition with its source location.
#[derive(Error, Debug)]
#[error("line {line}: {message}")]
pub struct Fatal {
    pub line: usize,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceError {
    pub line: usize,
    pub kind: ErrorKind,
}

/// Collected non-fatal findings for one file.
#[derive(Debug, Clone, Default)]
pub struct Diagnostics {
    errors: Vec<SourceError>,
}

impl Diagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn report(&mut self, line: usize, kind: ErrorKind) {
        self.errors.push(SourceError { line, kind });
    }

    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    pub fn errors(&self) -> &[SourceError] {
        &self.errors
    }

    /// Print every finding to stderr as `File <name>, line <n>: <message>`.
    pub fn print(&self, file_name: &str) {
        for error in &self.errors {
            eprintln!("File {}, line {}: {}", file_name, error.line, error.kind);
        }
    }
}
