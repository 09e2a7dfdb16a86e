//! Runtime representation of compiled schema validators.
//!
//! Compilation (the crate-private `compiler` module) lowers every
//! supported schema shape into [`CompiledNode`], a closed tagged union
//! walked directly against `serde_json::Value` payloads. Named
//! component schemas live in a [`ComponentSet`], a frozen slot table
//! built once per document, and are referenced by slot index rather
//! than by pointer, which is how self- and mutually-referential
//! schemas validate without reference cycles.
//!
//! [`Validator`] is the public handle: it pairs one node with the shared
//! component set behind `Arc`s, so handles are cheap to clone and safe
//! to use across threads once built.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use serde_json::Value;

/// Policy for object keys not declared under `properties`.
#[derive(Debug, Clone)]
pub(crate) enum AdditionalKeys {
    /// Unknown keys reject the object. The default.
    Deny,
    /// Unknown keys are accepted unchecked (`additionalProperties: true`).
    Allow,
    /// Unknown keys must each satisfy a schema.
    Schema(Box<CompiledNode>),
}

/// One compiled schema node. The set of variants is the crate's entire
/// validation vocabulary; there is no fallthrough to an external engine.
#[derive(Debug, Clone)]
pub(crate) enum CompiledNode {
    /// Accepts every value. Produced for schemas with no recognizable shape.
    Any,
    Null,
    Boolean,
    Integer {
        minimum: Option<f64>,
        maximum: Option<f64>,
    },
    Number {
        minimum: Option<f64>,
        maximum: Option<f64>,
    },
    String {
        min_length: Option<u64>,
        max_length: Option<u64>,
    },
    /// Accepts exactly one literal, compared structurally.
    Const(Value),
    Enum(Vec<Value>),
    OneOf(Vec<CompiledNode>),
    AnyOf(Vec<CompiledNode>),
    AllOf(Vec<CompiledNode>),
    Array {
        items: Option<Box<CompiledNode>>,
        min_items: Option<u64>,
        max_items: Option<u64>,
    },
    Object {
        /// Declared properties in document order.
        properties: Vec<(String, CompiledNode)>,
        required: HashSet<String>,
        additional: AdditionalKeys,
    },
    /// Accepts `null` in addition to whatever the inner node accepts.
    Nullable(Box<CompiledNode>),
    /// Deferred reference to a named component, resolved against the
    /// [`ComponentSet`] at validation time. Handing out the slot while
    /// the component is still being compiled is what breaks recursion
    /// during the build.
    Component(usize),
}

impl CompiledNode {
    /// Walk the value against this node. Pure structural check; no
    /// mutation, no allocation beyond the stack.
    pub(crate) fn matches(&self, value: &Value, components: &ComponentSet) -> bool {
        self.matches_at(value, components, 0)
    }

    /// `hops` counts component resolutions since the walk last moved to
    /// a child value. Resolutions outnumbering the slot table mean some
    /// slot repeated against the same value, a pure reference cycle
    /// (`A: {$ref: B}`, `B: {$ref: A}`); the walk rejects at that point
    /// rather than recursing further.
    fn matches_at(&self, value: &Value, components: &ComponentSet, hops: usize) -> bool {
        match self {
            CompiledNode::Any => true,
            CompiledNode::Null => value.is_null(),
            CompiledNode::Boolean => value.is_boolean(),
            CompiledNode::Integer { minimum, maximum } => match value {
                Value::Number(n) => integral(n) && within_bounds(n, *minimum, *maximum),
                _ => false,
            },
            CompiledNode::Number { minimum, maximum } => match value {
                Value::Number(n) => within_bounds(n, *minimum, *maximum),
                _ => false,
            },
            CompiledNode::String {
                min_length,
                max_length,
            } => match value {
                Value::String(s) => {
                    // Lengths count characters, not bytes.
                    let length = s.chars().count() as u64;
                    min_length.map_or(true, |m| length >= m)
                        && max_length.map_or(true, |m| length <= m)
                }
                _ => false,
            },
            CompiledNode::Const(literal) => value == literal,
            CompiledNode::Enum(options) => options.iter().any(|option| option == value),
            CompiledNode::OneOf(branches) | CompiledNode::AnyOf(branches) => branches
                .iter()
                .any(|branch| branch.matches_at(value, components, hops)),
            CompiledNode::AllOf(branches) => branches
                .iter()
                .all(|branch| branch.matches_at(value, components, hops)),
            CompiledNode::Array {
                items,
                min_items,
                max_items,
            } => match value {
                Value::Array(elements) => {
                    let length = elements.len() as u64;
                    min_items.map_or(true, |m| length >= m)
                        && max_items.map_or(true, |m| length <= m)
                        && items.as_ref().map_or(true, |item| {
                            elements.iter().all(|element| item.matches_at(element, components, 0))
                        })
                }
                _ => false,
            },
            CompiledNode::Object {
                properties,
                required,
                additional,
            } => match value {
                Value::Object(fields) => {
                    // Required names must be present even when no property
                    // schema is declared for them.
                    if !required.iter().all(|name| fields.contains_key(name)) {
                        return false;
                    }
                    for (name, schema) in properties {
                        if let Some(field) = fields.get(name) {
                            if !schema.matches_at(field, components, 0) {
                                return false;
                            }
                        }
                    }
                    for (key, field) in fields {
                        if properties.iter().any(|(name, _)| name == key) {
                            continue;
                        }
                        let accepted = match additional {
                            AdditionalKeys::Deny => false,
                            AdditionalKeys::Allow => true,
                            AdditionalKeys::Schema(schema) => {
                                schema.matches_at(field, components, 0)
                            }
                        };
                        if !accepted {
                            return false;
                        }
                    }
                    true
                }
                _ => false,
            },
            CompiledNode::Nullable(inner) => {
                value.is_null() || inner.matches_at(value, components, hops)
            }
            CompiledNode::Component(slot) => {
                if hops >= components.len() {
                    return false;
                }
                // Slots are minted by the same build that froze the table;
                // an out-of-range slot rejects rather than panics.
                components
                    .node(*slot)
                    .map_or(false, |node| node.matches_at(value, components, hops + 1))
            }
        }
    }
}

fn integral(number: &serde_json::Number) -> bool {
    if number.is_i64() || number.is_u64() {
        return true;
    }
    number.as_f64().map_or(false, |f| f.fract() == 0.0)
}

fn within_bounds(number: &serde_json::Number, minimum: Option<f64>, maximum: Option<f64>) -> bool {
    number.as_f64().map_or(true, |v| {
        minimum.map_or(true, |m| v >= m) && maximum.map_or(true, |m| v <= m)
    })
}

/// Frozen table of compiled component schemas: name → slot, slot → node.
/// Built once per document, never mutated afterwards, shared by every
/// [`Validator`] minted from the same build.
#[derive(Debug, Default)]
pub(crate) struct ComponentSet {
    names: HashMap<String, usize>,
    nodes: Vec<CompiledNode>,
}

impl ComponentSet {
    pub(crate) fn new(names: HashMap<String, usize>, nodes: Vec<CompiledNode>) -> Self {
        ComponentSet { names, nodes }
    }

    pub(crate) fn node(&self, slot: usize) -> Option<&CompiledNode> {
        self.nodes.get(slot)
    }

    /// Iterate (name, slot) pairs for every declared component.
    pub(crate) fn slots(&self) -> impl Iterator<Item = (&str, usize)> {
        self.names.iter().map(|(name, slot)| (name.as_str(), *slot))
    }

    pub(crate) fn len(&self) -> usize {
        self.nodes.len()
    }
}

/// A runnable schema validator: pass/fail over a JSON value.
///
/// Cloning is cheap (two `Arc` bumps) and validators are `Send + Sync`,
/// so one registry can serve concurrent request paths directly.
#[derive(Debug, Clone)]
pub struct Validator {
    components: Arc<ComponentSet>,
    node: Arc<CompiledNode>,
}

impl Validator {
    pub(crate) fn new(components: Arc<ComponentSet>, node: CompiledNode) -> Self {
        Validator {
            components,
            node: Arc::new(node),
        }
    }

    /// Check a JSON value against the compiled schema.
    #[must_use]
    pub fn is_valid(&self, value: &Value) -> bool {
        self.node.matches(value, &self.components)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn empty_set() -> ComponentSet {
        ComponentSet::default()
    }

    #[test]
    fn test_integer_accepts_zero_fraction_floats() {
        let node = CompiledNode::Integer {
            minimum: None,
            maximum: None,
        };
        let set = empty_set();
        assert!(node.matches(&json!(2), &set));
        assert!(node.matches(&json!(2.0), &set));
        assert!(!node.matches(&json!(2.5), &set));
        assert!(!node.matches(&json!("2"), &set));
    }

    #[test]
    fn test_numeric_bounds_are_inclusive() {
        let node = CompiledNode::Number {
            minimum: Some(1.0),
            maximum: Some(3.0),
        };
        let set = empty_set();
        assert!(node.matches(&json!(1.0), &set));
        assert!(node.matches(&json!(3), &set));
        assert!(!node.matches(&json!(0.99), &set));
        assert!(!node.matches(&json!(3.01), &set));
    }

    #[test]
    fn test_string_length_counts_characters_not_bytes() {
        let node = CompiledNode::String {
            min_length: None,
            max_length: Some(5),
        };
        let set = empty_set();
        // Five characters, six bytes in UTF-8.
        assert!(node.matches(&json!("héllo"), &set));
        assert!(!node.matches(&json!("hello!"), &set));
    }

    #[test]
    fn test_const_null_accepts_only_null() {
        let node = CompiledNode::Const(Value::Null);
        let set = empty_set();
        assert!(node.matches(&Value::Null, &set));
        assert!(!node.matches(&json!(0), &set));
        assert!(!node.matches(&json!(""), &set));
    }

    #[test]
    fn test_object_rejects_undeclared_keys_by_default() {
        let node = CompiledNode::Object {
            properties: vec![(
                "name".to_string(),
                CompiledNode::String {
                    min_length: None,
                    max_length: None,
                },
            )],
            required: HashSet::new(),
            additional: AdditionalKeys::Deny,
        };
        let set = empty_set();
        assert!(node.matches(&json!({"name": "ok"}), &set));
        assert!(!node.matches(&json!({"name": "ok", "extra": 1}), &set));
    }

    #[test]
    fn test_additional_keys_schema_checks_extras() {
        let node = CompiledNode::Object {
            properties: Vec::new(),
            required: HashSet::new(),
            additional: AdditionalKeys::Schema(Box::new(CompiledNode::Integer {
                minimum: None,
                maximum: None,
            })),
        };
        let set = empty_set();
        assert!(node.matches(&json!({"a": 1, "b": 2}), &set));
        assert!(!node.matches(&json!({"a": 1, "b": "two"}), &set));
    }

    #[test]
    fn test_required_key_checked_without_property_schema() {
        let node = CompiledNode::Object {
            properties: Vec::new(),
            required: HashSet::from(["id".to_string()]),
            additional: AdditionalKeys::Allow,
        };
        let set = empty_set();
        assert!(node.matches(&json!({"id": true}), &set));
        assert!(!node.matches(&json!({"other": true}), &set));
    }

    #[test]
    fn test_array_items_and_bounds() {
        let node = CompiledNode::Array {
            items: Some(Box::new(CompiledNode::Boolean)),
            min_items: Some(1),
            max_items: Some(2),
        };
        let set = empty_set();
        assert!(node.matches(&json!([true]), &set));
        assert!(node.matches(&json!([true, false]), &set));
        assert!(!node.matches(&json!([]), &set));
        assert!(!node.matches(&json!([true, false, true]), &set));
        assert!(!node.matches(&json!([1]), &set));
    }

    #[test]
    fn test_nullable_wraps_inner_acceptance() {
        let node = CompiledNode::Nullable(Box::new(CompiledNode::Boolean));
        let set = empty_set();
        assert!(node.matches(&Value::Null, &set));
        assert!(node.matches(&json!(false), &set));
        assert!(!node.matches(&json!("no"), &set));
    }

    #[test]
    fn test_component_slot_resolves_through_the_set() {
        let set = ComponentSet::new(
            HashMap::from([("Flag".to_string(), 0)]),
            vec![CompiledNode::Boolean],
        );
        let node = CompiledNode::Component(0);
        assert!(node.matches(&json!(true), &set));
        assert!(!node.matches(&json!("true"), &set));
        // Slot beyond the table rejects.
        assert!(!CompiledNode::Component(7).matches(&json!(true), &set));
    }

    #[test]
    fn test_pure_reference_cycle_rejects_all_values() {
        // Two slots pointing only at each other, nothing in between.
        let set = ComponentSet::new(
            HashMap::from([("A".to_string(), 0), ("B".to_string(), 1)]),
            vec![CompiledNode::Component(1), CompiledNode::Component(0)],
        );
        let node = CompiledNode::Component(0);
        assert!(!node.matches(&json!(1), &set));
        assert!(!node.matches(&json!({"a": 1}), &set));
        assert!(!node.matches(&Value::Null, &set));
    }
}
