//! # Timeout Subcommand
//!
//! Prints the worst-case execution time of a control loop next to the
//! budget its document declares.

use std::io::Write;
use std::path::PathBuf;

use clap::Args;
use serde::Serialize;

use remedy_policy::ControlLoopPolicyBuilder;

use crate::document;

/// Arguments for the timeout subcommand.
#[derive(Args, Debug)]
pub struct TimeoutArgs {
    /// Control-loop document.
    pub path: PathBuf,

    /// Print the figures as JSON.
    #[arg(long)]
    pub json: bool,
}

/// Worst-case figures for one control loop, in seconds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TimeoutReport {
    pub control_loop: String,
    pub budget: u64,
    pub worst_case: u64,
}

impl TimeoutReport {
    /// Whether the policies can outlast the loop budget.
    pub fn exceeds_budget(&self) -> bool {
        self.worst_case > self.budget
    }
}

/// Compute the report for one document.
pub fn report(args: &TimeoutArgs) -> anyhow::Result<TimeoutReport> {
    let builder = ControlLoopPolicyBuilder::from_document(document::load(&args.path)?)?;
    Ok(TimeoutReport {
        control_loop: builder.control_loop().control_loop_name.clone(),
        budget: u64::from(builder.control_loop().timeout),
        worst_case: builder.calculate_timeout(),
    })
}

pub fn run_timeout(args: &TimeoutArgs, out: &mut impl Write) -> anyhow::Result<u8> {
    let report = report(args)?;
    if args.json {
        serde_json::to_writer_pretty(&mut *out, &report)?;
        writeln!(out)?;
    } else {
        writeln!(
            out,
            "{}: worst case {}s, budget {}s",
            report.control_loop, report.worst_case, report.budget
        )?;
        if report.exceeds_budget() {
            writeln!(out, "warning: policies can outlast the control loop timeout")?;
        }
    }
    Ok(0)
}
