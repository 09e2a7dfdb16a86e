//! # CLI Module
//!
//! Command-line interface for compiling OpenAPI specs into validator
//! registries and checking JSON payloads against them.
//!
//! ## Commands
//!
//! ### `check`
//!
//! Compile a spec and report every validator it yields:
//!
//! ```bash
//! oasguard check --spec openapi.yaml
//! oasguard check --spec openapi.yaml --format json
//! ```
//!
//! The exit status is nonzero when the spec fails to parse or contains
//! an unsupported `$ref`.
//!
//! ### `validate`
//!
//! Validate a JSON payload against one compiled schema. Pick the schema
//! by component name or by operation:
//!
//! ```bash
//! # Against a named component schema
//! oasguard validate --spec openapi.yaml --component Pet --input pet.json
//!
//! # Against an operation's request body (payload from stdin)
//! echo '{"name": "rex"}' | oasguard validate --spec openapi.yaml \
//!     --path /pets --method post
//!
//! # Against a response body for one status
//! oasguard validate --spec openapi.yaml \
//!     --path /pets --method get --status 200 --input body.json
//! ```
//!
//! Rejected payloads exit with status 1.
//!
//! ## Usage from Code
//!
//! ```rust,ignore
//! use oasguard::cli::run_cli;
//!
//! fn main() -> anyhow::Result<()> {
//!     run_cli()
//! }
//! ```

mod commands;


pub use commands::{run_cli, Cli, Commands, OutputFormat};
