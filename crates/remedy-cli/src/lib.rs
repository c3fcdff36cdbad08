//! # remedy-cli: Control-Loop Document Tooling
//!
//! Clap-based front end over `remedy-policy` for authors of control-loop
//! documents.
//!
//! ## Subcommands
//!
//! - `validate`: run the validator and print every finding
//! - `timeout`: worst-case execution time against the loop budget
//! - `show`: the normalized document as YAML or JSON
//!
//! ## Crate Policy
//!
//! - Argument parsing lives in `main.rs`; handlers take parsed arguments
//!   and a writer so they can be driven from tests.
//! - Handlers delegate to the domain crates. No graph logic here.
//! - Exit codes: 0 success, 1 invalid document, 2 load or I/O failure.

pub mod document;
pub mod show;
pub mod timeout;
pub mod validate;
