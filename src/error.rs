//! Error types for spec loading and registry compilation.
//!
//! Every variant is fatal: a failed load or build yields no partial
//! registry. Callers that want to degrade gracefully do so above this
//! layer, not inside it.

use std::path::PathBuf;
use thiserror::Error;

/// Errors produced while loading an OpenAPI document or compiling it
/// into a validator registry.
#[derive(Debug, Error)]
pub enum SpecError {
    /// The spec file could not be read from disk.
    #[error("failed to read spec file {}: {}", .path.display(), .source)]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The document is not well-formed JSON.
    #[error("failed to parse spec as JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// The document is not well-formed YAML.
    #[error("failed to parse spec as YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// The YAML document contains a value with no JSON equivalent,
    /// such as a non-finite float.
    #[error("YAML value cannot be represented as JSON: {0}")]
    UnrepresentableYaml(String),

    /// A `$ref` points anywhere other than a directly named entry under
    /// `#/components/schemas/`. External URLs, other component sections
    /// and nested pointers are all rejected.
    #[error(
        "unsupported reference {reference:?}: only local references of the \
         form #/components/schemas/NAME are supported"
    )]
    UnsupportedReference { reference: String },
}
