use std::{env, fs, process::ExitCode};

use anyhow::{bail, Result};

use asm465::{assemble_program, record, Artifacts};

fn main() -> ExitCode {
    let basenames: Vec<String> = env::args().skip(1).collect();
    if basenames.is_empty() {
        eprintln!("usage: asm465 <basename>...");
        return ExitCode::from(1);
    }

    for base in &basenames {
        if let Err(err) = process_file(base) {
            eprintln!("{err:#}");
            remove_artifacts(base);
            return ExitCode::from(1);
        }
    }
    ExitCode::SUCCESS
}

/// Assemble one basename end to end. `Err` is fatal (memory budget,
/// output I/O) and aborts the run; unreadable input and source errors
/// are printed here and the run continues with the next file.
fn process_file(base: &str) -> Result<()> {
    let as_name = format!("{base}.as");
    let am_name = format!("{base}.am");

    let source = match fs::read_to_string(&as_name) {
        Ok(source) => source,
        Err(err) => {
            // Unreadable input fails this file only; the run moves on.
            eprintln!("File {as_name}: cannot open input file: {err}");
            return Ok(());
        }
    };

    let assembly = assemble_program(&source)
        .map_err(|err| anyhow::anyhow!("File {am_name}, {err}"))?;

    if assembly.source_errors.has_errors() {
        // Preprocessor failure: no .am is kept and the passes never ran.
        assembly.source_errors.print(&as_name);
        return Ok(());
    }

    if let Some(expanded) = &assembly.expanded {
        if let Err(err) = fs::write(&am_name, expanded) {
            bail!("cannot create {am_name}: {err}");
        }
    }

    if assembly.pass_errors.has_errors() {
        assembly.pass_errors.print(&am_name);
        remove_artifacts(base);
        return Ok(());
    }

    if let Some(artifacts) = &assembly.artifacts {
        if let Err(err) = write_artifacts(base, artifacts) {
            remove_artifacts(base);
            bail!("cannot write outputs for {base}: {err}");
        }
    }
    Ok(())
}

/// Write `.ob` always; `.ent`/`.ext` only when they have content.
fn write_artifacts(base: &str, artifacts: &Artifacts) -> std::io::Result<()> {
    fs::write(format!("{base}.ob"), artifacts.object.to_string())?;
    if !artifacts.entries.is_empty() {
        fs::write(format!("{base}.ent"), record::listing(&artifacts.entries))?;
    }
    if !artifacts.externals.is_empty() {
        fs::write(format!("{base}.ext"), record::listing(&artifacts.externals))?;
    }
    Ok(())
}

/// Best-effort removal of every artifact for one basename.
fn remove_artifacts(base: &str) {
    for extension in ["ob", "ent", "ext"] {
        let _ = fs::remove_file(format!("{base}.{extension}"));
    }
}
