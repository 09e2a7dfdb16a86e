//! Schema compilation.
//!
//! [`context::BuildState`] owns the per-build component slot table;
//! [`compile`] lowers raw schema values into compiled validator nodes.
//! Both are internal: callers go through [`crate::spec::build_registry`].

mod compile;
mod context;

pub(crate) use compile::{compile_node, ensure_component};
pub(crate) use context::BuildState;
