//! Two-pass assembler for the 20465 teaching machine.
//!
//! One input file moves through three stages: the macro preprocessor
//! ([`preprocess`]), the first pass ([`pass_one`]) which builds the word
//! images and symbol table, and the second pass ([`pass_two`]) which
//! resolves label fix-ups and lays out the textual artifacts.

use anyhow::Result;

pub mod error;
pub mod lex;
pub mod parser;
pub mod pass_one;
pub mod pass_two;
pub mod preprocess;
pub mod record;
pub mod symbols;

pub use error::Diagnostics;
pub use pass_two::Artifacts;

/// The result of assembling one source file.
pub struct Assembly {
    /// The macro-expanded intermediate stream (the `.am` text); absent
    /// when the preprocessor reported errors.
    pub expanded: Option<String>,
    /// Output artifacts, present only when both passes came back clean.
    pub artifacts: Option<Artifacts>,
    /// Preprocessor findings; line numbers refer to the raw source.
    pub source_errors: Diagnostics,
    /// Pass findings; line numbers refer to the expanded stream.
    pub pass_errors: Diagnostics,
}

/// Assemble a source program from text.
///
/// # Errors
///
/// Fails only on fatal conditions (the memory budget); source problems
/// come back as diagnostics inside the [`Assembly`].
pub fn assemble_program(source: &str) -> Result<Assembly> {
    let mut source_errors = Diagnostics::new();
    let expansion = preprocess::expand_macros(source, &mut source_errors);
    if source_errors.has_errors() {
        return Ok(Assembly {
            expanded: None,
            artifacts: None,
            source_errors,
            pass_errors: Diagnostics::new(),
        });
    }

    let pass_one = pass_one::FirstPass::run(&expansion.text, &expansion.macros)?;
    let (artifacts, pass_errors) = pass_two::pass_two(pass_one);

    let artifacts = if pass_errors.has_errors() {
        None
    } else {
        Some(artifacts)
    };

    Ok(Assembly {
        expanded: Some(expansion.text),
        artifacts,
        source_errors,
        pass_errors,
    })
}
