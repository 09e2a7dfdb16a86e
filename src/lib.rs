//! # oasguard
//!
//! **oasguard** compiles an OpenAPI 3.1 document into a registry of
//! runnable JSON validators: one per named component schema, one per
//! `application/json` request body, and one per JSON response body by
//! status code. The registry is plain data: build it once at startup,
//! then call [`Validator::is_valid`] on the hot path with no further
//! parsing or locking.
//!
//! ## Overview
//!
//! A build runs in three stages:
//!
//! 1. **Load**: [`load_spec`] / [`parse_spec`] read YAML or JSON into
//!    one raw `serde_json::Value` tree. Downstream code never knows
//!    which format the document used.
//! 2. **Compile**: every schema under `components.schemas` is lowered
//!    into a closed tagged union of validator nodes, in declaration
//!    order. Local `$ref`s (`#/components/schemas/NAME`) become slot
//!    references into a shared component table, which is what lets
//!    recursive and mutually recursive schemas compile without
//!    unbounded recursion. Any other `$ref` shape fails the build.
//! 3. **Walk**: every path item is visited for the eight HTTP verbs
//!    and each operation's JSON bodies are compiled the same way.
//!    Bodies in other media types are omitted, never defaulted.
//!
//! Schemas outside the supported vocabulary compile to a permissive
//! validator that accepts everything; leniency is deliberate and logged
//! at `debug` level rather than failing documents that lean on
//! keywords this crate does not model.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use oasguard::load_and_build_registry;
//! use serde_json::json;
//!
//! fn main() -> anyhow::Result<()> {
//!     let registry = load_and_build_registry("openapi.yaml")?;
//!
//!     // Validate against a component schema
//!     if let Some(pet) = registry.component("Pet") {
//!         assert!(pet.is_valid(&json!({"name": "rex"})));
//!     }
//!
//!     // Validate an operation's request body
//!     let op = registry.operation("/pets", &http::Method::POST);
//!     if let Some(body) = op.and_then(|op| op.request_body.as_ref()) {
//!         assert!(body.is_valid(&json!({"name": "rex"})));
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Architecture
//!
//! The library is organized into a handful of modules:
//!
//! - **[`spec`]** - Document loading ([`load_spec`], [`parse_spec`]),
//!   the registry builder ([`build_registry`]), and the registry types
//! - **[`validator`]** - The compiled runtime: [`Validator`] handles
//!   over a frozen component table
//! - **[`resolver`]** - `$ref` shape checking
//! - **[`error`]** - The fatal error set ([`SpecError`])
//! - **[`cli`]** - The `oasguard` binary's `check` and `validate`
//!   commands
//!
//! ## Concurrency
//!
//! Compilation is single-threaded and deterministic. The output is
//! freely shareable: [`Validator`] and [`SchemaRegistry`] are
//! `Send + Sync` and clone by bumping `Arc`s.

pub mod cli;
pub mod error;
pub mod resolver;
pub mod spec;
pub mod validator;

pub(crate) mod compiler;

pub use error::SpecError;
pub use spec::{
    build_registry, load_and_build_registry, load_spec, parse_spec, OperationValidators,
    SchemaRegistry,
};
pub use validator::Validator;
