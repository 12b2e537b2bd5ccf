//! Macro preprocessor: reads the raw `.as` stream and produces the
//! expanded `.am` stream with every macro invocation replaced by its
//! stored body and all definitions removed.

use std::collections::HashMap;

use crate::error::{Diagnostics, ErrorKind};
use crate::lex;
use crate::parser;

/// Macros discovered while expanding one source file. Label validation
/// consults this table later: a label may not shadow a macro.
#[derive(Debug, Default)]
pub struct MacroTable {
    macros: HashMap<String, Vec<String>>,
}

impl MacroTable {
    pub fn contains(&self, name: &str) -> bool {
        self.macros.contains_key(name)
    }

    fn body(&self, name: &str) -> Option<&[String]> {
        self.macros.get(name).map(Vec::as_slice)
    }

    fn insert(&mut self, name: String, body: Vec<String>) {
        self.macros.insert(name, body);
    }
}

pub struct Expansion {
    /// The expanded `.am` text; discard it when diagnostics were reported.
    pub text: String,
    pub macros: MacroTable,
}

/// Expand all macros in `source`. Errors are collected into `diag`;
/// scanning always continues so every problem in the file is reported.
pub fn expand_macros(source: &str, diag: &mut Diagnostics) -> Expansion {
    let mut macros = MacroTable::default();
    let mut out = String::new();
    let mut current: Option<(String, Vec<String>)> = None;
    let mut line_no = 0;

    for line in source.lines() {
        line_no += 1;

        if line.len() > lex::MAX_LINE_LEN {
            diag.report(line_no, ErrorKind::LineTooLong);
        }

        // Blank and comment lines pass through unchanged, even while a
        // definition is open.
        let trimmed = line.trim_start();
        if trimmed.is_empty() || trimmed.starts_with(';') {
            out.push_str(line);
            out.push('\n');
            continue;
        }

        let (word, _) = lex::first_token(line);

        if word == "mcro" {
            if current.is_some() {
                diag.report(line_no, ErrorKind::MacroNested);
            }
            match parse_definition_start(line, &macros) {
                Ok(name) => current = Some((name, Vec::new())),
                Err(kind) => {
                    diag.report(line_no, kind);
                    // Keep collecting so the matching mcroend still closes.
                    current = Some((String::new(), Vec::new()));
                }
            }
            continue;
        }

        if word == "mcroend" {
            match current.take() {
                None => diag.report(line_no, ErrorKind::MacroEndWithoutStart),
                Some((name, body)) => {
                    if body.is_empty() {
                        diag.report(line_no, ErrorKind::MacroEmpty);
                    } else if !name.is_empty() {
                        macros.insert(name, body);
                    }
                }
            }
            continue;
        }

        if let Some((_, body)) = current.as_mut() {
            body.push(line.to_owned());
        } else if let Some(body) = macros.body(word) {
            for body_line in body {
                out.push_str(body_line);
                out.push('\n');
            }
        } else {
            out.push_str(line);
            out.push('\n');
        }
    }

    if let Some((name, _)) = current {
        diag.report(line_no, ErrorKind::MacroUnclosed(name));
    }

    Expansion { text: out, macros }
}

fn parse_definition_start(line: &str, macros: &MacroTable) -> Result<String, ErrorKind> {
    let mut tokens = line.split_whitespace();
    let _keyword = tokens.next();
    let name = tokens.next().ok_or(ErrorKind::MacroSyntax)?;
    if tokens.next().is_some() {
        return Err(ErrorKind::MacroSyntax);
    }
    if lex::is_reserved_word(name) {
        return Err(ErrorKind::MacroReserved);
    }
    parser::check_identifier(name).map_err(|_| ErrorKind::MacroIllegalName)?;
    if macros.contains(name) {
        return Err(ErrorKind::MacroDuplicate);
    }
    Ok(name.to_owned())
}
