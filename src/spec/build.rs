use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

use http::Method;
use serde_json::{Map, Value};
use tracing::{debug, info};

use crate::compiler::{compile_node, ensure_component, BuildState};
use crate::error::SpecError;
use crate::validator::{CompiledNode, Validator};

use super::load::load_spec;
use super::types::{OperationValidators, SchemaRegistry};

/// HTTP verbs recognized as operation keys under a path item.
const METHODS: [(&str, Method); 8] = [
    ("get", Method::GET),
    ("post", Method::POST),
    ("put", Method::PUT),
    ("delete", Method::DELETE),
    ("patch", Method::PATCH),
    ("options", Method::OPTIONS),
    ("head", Method::HEAD),
    ("trace", Method::TRACE),
];

const JSON_MEDIA_TYPE: &str = "application/json";

/// One operation's compiled schemas, before validator handles exist.
struct CompiledOperation {
    path: String,
    method: Method,
    request_body: Option<CompiledNode>,
    responses: Vec<(u16, CompiledNode)>,
}

/// Compile every schema in an OpenAPI document into a validator registry.
///
/// Component schemas under `components.schemas` are compiled first, in
/// declaration order, so the path walk below always finds a finished
/// slot or a valid deferred reference. Then every path item is walked
/// for the eight HTTP verbs; each operation contributes a validator for
/// its `application/json` request body and one per numeric-status
/// `application/json` response body. Bodies in any other media type are
/// omitted.
///
/// # Arguments
///
/// * `doc` - The parsed OpenAPI document
///
/// # Returns
///
/// The compiled registry, or the first fatal error. There is no partial
/// output: an unsupported `$ref` anywhere in the document fails the
/// whole build.
pub fn build_registry(doc: &Value) -> Result<SchemaRegistry, SpecError> {
    let empty = Map::new();
    let declared = doc
        .get("components")
        .and_then(|components| components.get("schemas"))
        .and_then(Value::as_object)
        .unwrap_or(&empty);

    let mut state = BuildState::new(declared);
    for slot in 0..state.slot_count() {
        ensure_component(slot, &mut state)?;
    }

    let mut operations = Vec::new();
    if let Some(paths) = doc.get("paths").and_then(Value::as_object) {
        for (path, item) in paths {
            for (verb, method) in &METHODS {
                if let Some(operation) = item.get(*verb).filter(|op| op.is_object()) {
                    operations.push(compile_operation(
                        path,
                        method.clone(),
                        operation,
                        &mut state,
                    )?);
                }
            }
        }
    }

    let components_table = Arc::new(state.into_component_set());

    let components: HashMap<String, Validator> = components_table
        .slots()
        .map(|(name, slot)| {
            (
                name.to_string(),
                Validator::new(Arc::clone(&components_table), CompiledNode::Component(slot)),
            )
        })
        .collect();

    let mut paths: HashMap<String, HashMap<Method, OperationValidators>> = HashMap::new();
    for op in operations {
        let validators = OperationValidators {
            request_body: op
                .request_body
                .map(|node| Validator::new(Arc::clone(&components_table), node)),
            responses: op
                .responses
                .into_iter()
                .map(|(status, node)| (status, Validator::new(Arc::clone(&components_table), node)))
                .collect(),
        };
        paths
            .entry(op.path)
            .or_default()
            .insert(op.method, validators);
    }

    let registry = SchemaRegistry { components, paths };
    info!(
        components = components_table.len(),
        operations = registry.operation_count(),
        "compiled schema registry"
    );
    Ok(registry)
}

fn compile_operation(
    path: &str,
    method: Method,
    operation: &Value,
    state: &mut BuildState<'_>,
) -> Result<CompiledOperation, SpecError> {
    let request_body = match operation.get("requestBody").and_then(json_body_schema) {
        Some(schema) => Some(compile_node(schema, state)?),
        None => None,
    };

    let mut responses = Vec::new();
    if let Some(declared) = operation.get("responses").and_then(Value::as_object) {
        for (status_str, response) in declared {
            let status: u16 = match status_str.parse() {
                Ok(v) => v,
                Err(_) => {
                    // `default` and range keys like `4XX` are not
                    // addressable by status and are left out.
                    debug!(
                        path = %path,
                        method = %method,
                        status = %status_str,
                        "skipping non-numeric response status"
                    );
                    continue;
                }
            };
            if let Some(schema) = json_body_schema(response) {
                responses.push((status, compile_node(schema, state)?));
            }
        }
    }

    Ok(CompiledOperation {
        path: path.to_string(),
        method,
        request_body,
        responses,
    })
}

/// The schema of a JSON body declaration:
/// `content."application/json".schema`.
///
/// Anything else yields `None` and the body is omitted from the
/// registry: other media types, a missing `content` section, and
/// request bodies or responses given as section-level `$ref` objects
/// (those have no inline `content` to walk).
fn json_body_schema(owner: &Value) -> Option<&Value> {
    owner.get("content")?.get(JSON_MEDIA_TYPE)?.get("schema")
}

/// Load a spec file and compile it in one call.
///
/// # Arguments
///
/// * `path` - Path to the OpenAPI document (`.yaml`, `.yml`, or JSON)
///
/// # Returns
///
/// The compiled registry, or the first load or build error.
pub fn load_and_build_registry(path: impl AsRef<Path>) -> Result<SchemaRegistry, SpecError> {
    let doc = load_spec(path)?;
    build_registry(&doc)
}
