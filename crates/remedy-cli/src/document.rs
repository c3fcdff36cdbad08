//! # Document Loading
//!
//! Reads a control-loop document from disk. `.json` files are parsed as
//! JSON, everything else as YAML.

use std::path::Path;

use anyhow::Context;
use clap::ValueEnum;

use remedy_engine::ActorRegistry;
use remedy_policy::{ControlLoopPolicy, ControlLoopPolicyBuilder, Results};

/// Serialization format of a document on disk or on stdout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Format {
    /// YAML, used for any extension other than `.json`.
    Yaml,
    /// JSON.
    Json,
}

impl Format {
    /// Format implied by a file extension.
    pub fn for_path(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("json") => Self::Json,
            _ => Self::Yaml,
        }
    }
}

/// Which actor catalog recipes are checked against.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum Catalog {
    /// Every actor the document format knows about.
    #[default]
    Standard,
    /// Only actors this engine can execute.
    Executable,
}

/// Parse a control-loop document.
pub fn load(path: &Path) -> anyhow::Result<ControlLoopPolicy> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    let doc = match Format::for_path(path) {
        Format::Json => serde_json::from_str(&text)
            .with_context(|| format!("failed to parse {} as JSON", path.display()))?,
        Format::Yaml => ControlLoopPolicy::from_yaml(&text)
            .with_context(|| format!("failed to parse {} as YAML", path.display()))?,
    };
    tracing::debug!(path = %path.display(), "document loaded");
    Ok(doc)
}

/// Validate a document against the chosen catalog.
pub fn specification(doc: ControlLoopPolicy, catalog: Catalog) -> anyhow::Result<Results> {
    let results = match catalog {
        Catalog::Standard => ControlLoopPolicyBuilder::from_document(doc)?.build_specification(),
        Catalog::Executable => {
            ControlLoopPolicyBuilder::from_document_with_catalog(doc, ActorRegistry::standard())?
                .build_specification()
        }
    };
    Ok(results)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn format_follows_extension() {
        assert_eq!(Format::for_path(Path::new("loop.json")), Format::Json);
        assert_eq!(Format::for_path(Path::new("loop.JSON")), Format::Json);
        assert_eq!(Format::for_path(Path::new("loop.yaml")), Format::Yaml);
        assert_eq!(Format::for_path(Path::new("loop")), Format::Yaml);
    }

    #[test]
    fn every_value_has_help() {
        for value in Format::value_variants() {
            let possible = value.to_possible_value().unwrap();
            assert!(possible.get_help().is_some(), "{}", possible.get_name());
        }
        for value in Catalog::value_variants() {
            let possible = value.to_possible_value().unwrap();
            assert!(possible.get_help().is_some(), "{}", possible.get_name());
        }
    }

    #[test]
    fn missing_file_names_path() {
        let err = load(Path::new("/nonexistent/loop.yaml")).unwrap_err();
        assert!(err.to_string().contains("/nonexistent/loop.yaml"));
    }
}
