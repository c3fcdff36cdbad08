//! # Validate Subcommand
//!
//! Runs the validator over one document and prints each finding as
//! `LEVEL: message`, or the whole report as JSON.

use std::io::Write;
use std::path::PathBuf;

use clap::Args;

use crate::document::{self, Catalog};

/// Arguments for the validate subcommand.
#[derive(Args, Debug)]
pub struct ValidateArgs {
    /// Control-loop document (YAML, or JSON with a `.json` extension).
    pub path: PathBuf,

    /// Actor catalog recipes are checked against.
    #[arg(long, value_enum, default_value_t = Catalog::Standard)]
    pub catalog: Catalog,

    /// Print the report as JSON.
    #[arg(long)]
    pub json: bool,
}

/// Exit code 0 when the document is free of blocking findings, 1 otherwise.
pub fn run_validate(args: &ValidateArgs, out: &mut impl Write) -> anyhow::Result<u8> {
    let doc = document::load(&args.path)?;
    let name = doc.control_loop.control_loop_name.clone();
    let mut results = document::specification(doc, args.catalog)?;
    results.specification = None;

    if args.json {
        serde_json::to_writer_pretty(&mut *out, &results)?;
        writeln!(out)?;
    } else {
        for message in &results.messages {
            writeln!(out, "{message}")?;
        }
        let verdict = if results.is_valid() { "valid" } else { "invalid" };
        writeln!(out, "{name}: {verdict}")?;
    }
    tracing::info!(
        control_loop = %name,
        findings = results.messages.len(),
        valid = results.is_valid(),
        "validation finished"
    );
    Ok(if results.is_valid() { 0 } else { 1 })
}
