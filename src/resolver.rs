//! `$ref` resolution for local component schema references.
//!
//! The only reference shape this crate supports is a direct child of
//! the document's `components.schemas` section. Everything else
//! (external URLs, file paths, other component sections, nested
//! pointers) fails the whole build rather than producing a validator
//! with guessed semantics.

use crate::error::SpecError;

const COMPONENT_SCHEMA_PREFIX: &str = "#/components/schemas/";

/// Extract the component name from a local schema reference.
///
/// # Arguments
/// * `reference` - The raw `$ref` string from the document
///
/// # Returns
/// The referenced component name, or [`SpecError::UnsupportedReference`]
/// when the string is not of the form `#/components/schemas/NAME` with a
/// single, non-empty path segment for `NAME`.
pub fn resolve_component_ref(reference: &str) -> Result<&str, SpecError> {
    match reference.strip_prefix(COMPONENT_SCHEMA_PREFIX) {
        Some(name) if !name.is_empty() && !name.contains('/') => Ok(name),
        _ => Err(SpecError::UnsupportedReference {
            reference: reference.to_string(),
        }),
    }
}
