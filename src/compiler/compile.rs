//! Lowering raw schema values into compiled validator nodes.
//!
//! `compile_node` dispatches on the first recognized keyword in a fixed
//! order: `$ref`, `const`, `enum`, `oneOf`, `anyOf`, `allOf`, then the
//! `type` tag. A schema carrying several of these keywords gets the
//! earliest one; the rest are ignored. A schema with no `type` tag but
//! with `properties`, `required`, or `additionalProperties` still
//! compiles as an object. A schema with none of these compiles to the
//! permissive validator that accepts every value, so documents that
//! lean on vocabulary this crate does not model still build. Every
//! permissive fallback is logged at `debug` level.
//!
//! `nullable: true` wraps whatever the other rules produced, so a
//! nullable `$ref` or `const` admits `null` on top of its base set.

use std::collections::HashSet;

use serde_json::Value;
use tracing::debug;

use crate::error::SpecError;
use crate::resolver::resolve_component_ref;
use crate::validator::{AdditionalKeys, CompiledNode};

use super::context::BuildState;

/// Compile one schema value. Recursion is bounded by the document tree
/// plus the slot protocol in [`ensure_component`]; cyclic component
/// references never re-enter this function for a component already on
/// the compilation path.
pub(crate) fn compile_node(
    node: &Value,
    state: &mut BuildState<'_>,
) -> Result<CompiledNode, SpecError> {
    let compiled = dispatch(node, state)?;
    if node.get("nullable").and_then(Value::as_bool) == Some(true) {
        Ok(CompiledNode::Nullable(Box::new(compiled)))
    } else {
        Ok(compiled)
    }
}

/// Compile the component in `slot` unless it is already done or sits on
/// the current compilation path. Either way the caller embeds
/// `Component(slot)`; by the time any validator runs, the eager pass
/// has filled every slot.
pub(crate) fn ensure_component(
    slot: usize,
    state: &mut BuildState<'_>,
) -> Result<(), SpecError> {
    if state.started(slot) {
        return Ok(());
    }
    state.begin(slot);
    let raw = state.raw(slot);
    let node = compile_node(raw, state)?;
    state.finish(slot, node);
    Ok(())
}

fn dispatch(node: &Value, state: &mut BuildState<'_>) -> Result<CompiledNode, SpecError> {
    if let Some(reference) = node.get("$ref").and_then(Value::as_str) {
        return compile_reference(reference, state);
    }
    if let Some(literal) = node.get("const") {
        return Ok(CompiledNode::Const(literal.clone()));
    }
    if let Some(options) = node.get("enum").and_then(Value::as_array) {
        return Ok(compile_enum(options));
    }
    if let Some(branches) = node.get("oneOf").and_then(Value::as_array) {
        return compile_union(branches, state, Union::One);
    }
    if let Some(branches) = node.get("anyOf").and_then(Value::as_array) {
        return compile_union(branches, state, Union::Any);
    }
    if let Some(branches) = node.get("allOf").and_then(Value::as_array) {
        return Ok(CompiledNode::AllOf(compile_branches(branches, state)?));
    }
    compile_typed(node, state)
}

fn compile_reference(
    reference: &str,
    state: &mut BuildState<'_>,
) -> Result<CompiledNode, SpecError> {
    let name = resolve_component_ref(reference)?;
    match state.slot(name) {
        Some(slot) => {
            ensure_component(slot, state)?;
            Ok(CompiledNode::Component(slot))
        }
        None => {
            debug!(
                component = name,
                "reference names an undeclared component, compiling permissive"
            );
            Ok(CompiledNode::Any)
        }
    }
}

fn compile_enum(options: &[Value]) -> CompiledNode {
    if options.len() == 1 {
        CompiledNode::Const(options[0].clone())
    } else {
        // An empty list accepts nothing.
        CompiledNode::Enum(options.to_vec())
    }
}

enum Union {
    One,
    Any,
}

fn compile_union(
    branches: &[Value],
    state: &mut BuildState<'_>,
    union: Union,
) -> Result<CompiledNode, SpecError> {
    let mut compiled = compile_branches(branches, state)?;
    if compiled.len() == 1 {
        // A single branch needs no wrapper.
        return Ok(compiled.remove(0));
    }
    Ok(match union {
        Union::One => CompiledNode::OneOf(compiled),
        Union::Any => CompiledNode::AnyOf(compiled),
    })
}

fn compile_branches(
    branches: &[Value],
    state: &mut BuildState<'_>,
) -> Result<Vec<CompiledNode>, SpecError> {
    branches
        .iter()
        .map(|branch| compile_node(branch, state))
        .collect()
}

fn compile_typed(node: &Value, state: &mut BuildState<'_>) -> Result<CompiledNode, SpecError> {
    if node.get("type").is_none() && declares_object_shape(node) {
        return compile_untagged_object(node, state);
    }
    match node.get("type").and_then(Value::as_str) {
        Some("string") => Ok(CompiledNode::String {
            min_length: node.get("minLength").and_then(Value::as_u64),
            max_length: node.get("maxLength").and_then(Value::as_u64),
        }),
        Some("integer") => Ok(CompiledNode::Integer {
            minimum: node.get("minimum").and_then(Value::as_f64),
            maximum: node.get("maximum").and_then(Value::as_f64),
        }),
        Some("number") => Ok(CompiledNode::Number {
            minimum: node.get("minimum").and_then(Value::as_f64),
            maximum: node.get("maximum").and_then(Value::as_f64),
        }),
        Some("boolean") => Ok(CompiledNode::Boolean),
        Some("null") => Ok(CompiledNode::Null),
        Some("array") => compile_array(node, state),
        Some("object") => compile_object(node, state),
        tag => {
            // No tag, or one outside the supported vocabulary. OpenAPI
            // 3.1 type arrays also land here.
            debug!(tag = ?tag, "schema has no recognized shape, compiling permissive");
            Ok(CompiledNode::Any)
        }
    }
}

fn compile_array(node: &Value, state: &mut BuildState<'_>) -> Result<CompiledNode, SpecError> {
    let items = match node.get("items") {
        Some(schema) => Some(Box::new(compile_node(schema, state)?)),
        None => None,
    };
    Ok(CompiledNode::Array {
        items,
        min_items: node.get("minItems").and_then(Value::as_u64),
        max_items: node.get("maxItems").and_then(Value::as_u64),
    })
}

fn compile_object(node: &Value, state: &mut BuildState<'_>) -> Result<CompiledNode, SpecError> {
    let mut properties = Vec::new();
    if let Some(declared) = node.get("properties").and_then(Value::as_object) {
        for (name, schema) in declared {
            properties.push((name.clone(), compile_node(schema, state)?));
        }
    }
    let additional = match node.get("additionalProperties") {
        None | Some(Value::Bool(false)) => AdditionalKeys::Deny,
        Some(Value::Bool(true)) => AdditionalKeys::Allow,
        Some(schema) => AdditionalKeys::Schema(Box::new(compile_node(schema, state)?)),
    };
    Ok(CompiledNode::Object {
        properties,
        required: required_names(node),
        additional,
    })
}

fn declares_object_shape(node: &Value) -> bool {
    node.get("properties").is_some()
        || node.get("required").is_some()
        || node.get("additionalProperties").is_some()
}

/// Object keywords without `type: object`. A bare `required` list
/// constrains key presence on an otherwise open object; once
/// `properties` or `additionalProperties` appear, the usual object
/// rules apply, including the reject-unknown-keys default.
fn compile_untagged_object(
    node: &Value,
    state: &mut BuildState<'_>,
) -> Result<CompiledNode, SpecError> {
    if node.get("properties").is_some() || node.get("additionalProperties").is_some() {
        return compile_object(node, state);
    }
    Ok(CompiledNode::Object {
        properties: Vec::new(),
        required: required_names(node),
        additional: AdditionalKeys::Allow,
    })
}

fn required_names(node: &Value) -> HashSet<String> {
    node.get("required")
        .and_then(Value::as_array)
        .map(|names| {
            names
                .iter()
                .filter_map(Value::as_str)
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default()
}
