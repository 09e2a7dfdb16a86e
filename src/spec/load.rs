use std::path::Path;

use serde_json::Value;

use crate::error::SpecError;

/// Load an OpenAPI document from disk into a raw JSON value tree.
///
/// Files ending in `.yaml` or `.yml` are parsed as YAML, everything
/// else as JSON. Nothing downstream depends on which format the file
/// used.
pub fn load_spec(path: impl AsRef<Path>) -> Result<Value, SpecError> {
    let path = path.as_ref();
    let content = std::fs::read_to_string(path).map_err(|source| SpecError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    match path.extension().and_then(|ext| ext.to_str()) {
        Some("yaml") | Some("yml") => parse_yaml(&content),
        _ => Ok(serde_json::from_str(&content)?),
    }
}

/// Parse an OpenAPI document from a string, sniffing the format: a
/// document whose first non-whitespace character opens a JSON object or
/// array is parsed as JSON, everything else as YAML.
pub fn parse_spec(content: &str) -> Result<Value, SpecError> {
    let trimmed = content.trim_start();
    if trimmed.starts_with('{') || trimmed.starts_with('[') {
        Ok(serde_json::from_str(content)?)
    } else {
        parse_yaml(content)
    }
}

fn parse_yaml(content: &str) -> Result<Value, SpecError> {
    let tree: serde_yaml::Value = serde_yaml::from_str(content)?;
    yaml_to_json(&tree)
}

/// Convert a YAML value tree into the equivalent JSON tree.
///
/// OpenAPI documents written in YAML lean on unquoted scalars where
/// JSON requires strings, most visibly the numeric status-code keys
/// under `responses`. Number and boolean mapping keys are stringified;
/// values with no JSON equivalent fail the load.
fn yaml_to_json(yaml: &serde_yaml::Value) -> Result<Value, SpecError> {
    match yaml {
        serde_yaml::Value::Null => Ok(Value::Null),
        serde_yaml::Value::Bool(b) => Ok(Value::Bool(*b)),
        serde_yaml::Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                Ok(Value::Number(serde_json::Number::from(i)))
            } else if let Some(u) = n.as_u64() {
                Ok(Value::Number(serde_json::Number::from(u)))
            } else if let Some(f) = n.as_f64() {
                serde_json::Number::from_f64(f)
                    .map(Value::Number)
                    .ok_or_else(|| {
                        SpecError::UnrepresentableYaml(format!("float {f} has no JSON form"))
                    })
            } else {
                Err(SpecError::UnrepresentableYaml(format!(
                    "unsupported number: {n:?}"
                )))
            }
        }
        serde_yaml::Value::String(s) => Ok(Value::String(s.clone())),
        serde_yaml::Value::Sequence(seq) => {
            let items: Result<Vec<Value>, SpecError> = seq.iter().map(yaml_to_json).collect();
            Ok(Value::Array(items?))
        }
        serde_yaml::Value::Mapping(map) => {
            let mut fields = serde_json::Map::new();
            for (key, value) in map {
                let key = match key {
                    serde_yaml::Value::String(s) => s.clone(),
                    serde_yaml::Value::Number(n) => n.to_string(),
                    serde_yaml::Value::Bool(b) => b.to_string(),
                    other => {
                        return Err(SpecError::UnrepresentableYaml(format!(
                            "unsupported mapping key: {other:?}"
                        )))
                    }
                };
                fields.insert(key, yaml_to_json(value)?);
            }
            Ok(Value::Object(fields))
        }
        // Tags carry no meaning here; convert the inner value.
        serde_yaml::Value::Tagged(tagged) => yaml_to_json(&tagged.value),
    }
}
