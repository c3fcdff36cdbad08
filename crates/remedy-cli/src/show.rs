//! # Show Subcommand

use std::io::Write;
use std::path::PathBuf;

use clap::Args;

use remedy_policy::ControlLoopPolicyBuilder;

use crate::document::{self, Format};

/// Arguments for the show subcommand.
#[derive(Args, Debug)]
pub struct ShowArgs {
    /// Control-loop document.
    pub path: PathBuf,

    /// Output format.
    #[arg(long, value_enum, default_value_t = Format::Yaml)]
    pub format: Format,
}

/// Print the document after it has been loaded into a builder, with every
/// default filled in.
pub fn run_show(args: &ShowArgs, out: &mut impl Write) -> anyhow::Result<u8> {
    let builder = ControlLoopPolicyBuilder::from_document(document::load(&args.path)?)?;
    match args.format {
        Format::Yaml => write!(out, "{}", builder.document().to_yaml()?)?,
        Format::Json => {
            serde_json::to_writer_pretty(&mut *out, builder.document())?;
            writeln!(out)?;
        }
    }
    Ok(0)
}
