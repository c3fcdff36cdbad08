//! Subcommand handlers driven against documents on disk.

use std::io::Write as _;
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;

use remedy_cli::document::{Catalog, Format};
use remedy_cli::show::{run_show, ShowArgs};
use remedy_cli::timeout::{report, run_timeout, TimeoutArgs};
use remedy_cli::validate::{run_validate, ValidateArgs};

const APPC_LOOP: &str = r#"
controlLoop:
  controlLoopName: vLoadBalancer
  trigger_policy: restart
  timeout: 100
policies:
  - id: restart
    name: Restart
    actor: APPC
    recipe: Restart
    target: { type: VM }
    timeout: 60
    failure: migrate
  - id: migrate
    name: Migrate
    actor: APPC
    recipe: Migrate
    target: { type: VM }
    timeout: 60
"#;

fn demo() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("../../demos/vfirewall.yaml")
}

fn temp(text: &str, suffix: &str) -> NamedTempFile {
    let mut f = tempfile::Builder::new().suffix(suffix).tempfile().unwrap();
    f.write_all(text.as_bytes()).unwrap();
    f
}

fn output(run: impl FnOnce(&mut Vec<u8>)) -> String {
    let mut out = Vec::new();
    run(&mut out);
    String::from_utf8(out).unwrap()
}

// ── validate ──

#[test]
fn demo_document_is_valid() {
    let args = ValidateArgs {
        path: demo(),
        catalog: Catalog::Executable,
        json: false,
    };
    let text = output(|out| assert_eq!(run_validate(&args, out).unwrap(), 0));
    assert_eq!(text, "vFirewall: valid\n");
}

#[test]
fn timeout_overrun_is_reported() {
    let f = temp(APPC_LOOP, ".yaml");
    let args = ValidateArgs {
        path: f.path().to_path_buf(),
        catalog: Catalog::Standard,
        json: false,
    };
    let text = output(|out| assert_eq!(run_validate(&args, out).unwrap(), 1));
    assert!(text.contains(
        "ERROR: controlLoop overall timeout is less than the sum of operational policy timeouts."
    ));
    assert!(text.ends_with("vLoadBalancer: invalid\n"));
}

#[test]
fn executable_catalog_rejects_unsupported_actor() {
    let f = temp(APPC_LOOP, ".yaml");
    let args = ValidateArgs {
        path: f.path().to_path_buf(),
        catalog: Catalog::Executable,
        json: false,
    };
    let text = output(|out| assert_eq!(run_validate(&args, out).unwrap(), 1));
    assert_eq!(text.matches("ERROR: Policy recipe is invalid").count(), 2);
}

#[test]
fn json_report_lists_messages() {
    let f = temp(APPC_LOOP, ".yaml");
    let args = ValidateArgs {
        path: f.path().to_path_buf(),
        catalog: Catalog::Standard,
        json: true,
    };
    let text = output(|out| {
        run_validate(&args, out).unwrap();
    });
    let report: serde_json::Value = serde_json::from_str(&text).unwrap();
    assert_eq!(report["messages"].as_array().map(Vec::len), Some(1));
    assert!(report.get("specification").is_none());
}

#[test]
fn dangling_edge_is_a_load_error() {
    let f = temp(
        &APPC_LOOP.replace("failure: migrate", "failure: evacuate"),
        ".yaml",
    );
    let args = ValidateArgs {
        path: f.path().to_path_buf(),
        catalog: Catalog::Standard,
        json: false,
    };
    assert!(run_validate(&args, &mut Vec::new()).is_err());
}

#[test]
fn unparseable_document_names_file() {
    let f = temp("controlLoop: [", ".yaml");
    let args = ValidateArgs {
        path: f.path().to_path_buf(),
        catalog: Catalog::Standard,
        json: false,
    };
    let err = run_validate(&args, &mut Vec::new()).unwrap_err();
    assert!(err.to_string().contains("as YAML"));
}

// ── timeout ──

#[test]
fn timeout_sums_longest_chain() {
    let args = TimeoutArgs {
        path: demo(),
        json: false,
    };
    let report = report(&args).unwrap();
    assert_eq!(report.worst_case, 900);
    assert_eq!(report.budget, 1200);
    assert!(!report.exceeds_budget());
    let text = output(|out| {
        run_timeout(&args, out).unwrap();
    });
    assert_eq!(text, "vFirewall: worst case 900s, budget 1200s\n");
}

#[test]
fn timeout_warns_on_overrun() {
    let f = temp(APPC_LOOP, ".yaml");
    let args = TimeoutArgs {
        path: f.path().to_path_buf(),
        json: false,
    };
    let text = output(|out| {
        run_timeout(&args, out).unwrap();
    });
    assert!(text.contains("worst case 120s, budget 100s"));
    assert!(text.contains("warning:"));
}

// ── show ──

#[test]
fn show_round_trips_through_json() {
    let json = output(|out| {
        run_show(
            &ShowArgs {
                path: demo(),
                format: Format::Json,
            },
            out,
        )
        .unwrap();
    });
    let f = temp(&json, ".json");
    let report = report(&TimeoutArgs {
        path: f.path().to_path_buf(),
        json: false,
    })
    .unwrap();
    assert_eq!(report.worst_case, 900);
}

#[test]
fn show_fills_in_default_edges() {
    let text = output(|out| {
        run_show(
            &ShowArgs {
                path: demo(),
                format: Format::Yaml,
            },
            out,
        )
        .unwrap();
    });
    assert!(text.contains("failure_timeout: FINAL_FAILURE_TIMEOUT"));
    assert!(text.contains("failure_guard: FINAL_FAILURE_GUARD"));
}
