#![allow(clippy::unwrap_used, clippy::expect_used)]

use std::fs;
use std::path::PathBuf;

use oasguard::{load_and_build_registry, load_spec, SpecError};
use serde_json::json;
use tempfile::TempDir;

const YAML_SPEC: &str = r#"openapi: 3.1.0
info:
  title: Test API
  version: "1.0.0"
components:
  schemas:
    Item:
      type: object
      properties:
        id: { type: string }
        name: { type: string }
      required: [id]
paths:
  /items:
    post:
      requestBody:
        content:
          application/json:
            schema:
              $ref: '#/components/schemas/Item'
      responses:
        201:
          content:
            application/json:
              schema:
                $ref: '#/components/schemas/Item'
"#;

const JSON_SPEC: &str = r##"{
  "openapi": "3.1.0",
  "info": {"title": "Test API", "version": "1.0.0"},
  "components": {
    "schemas": {
      "Item": {
        "type": "object",
        "properties": {
          "id": {"type": "string"},
          "name": {"type": "string"}
        },
        "required": ["id"]
      }
    }
  },
  "paths": {
    "/items": {
      "post": {
        "requestBody": {
          "content": {
            "application/json": {
              "schema": {"$ref": "#/components/schemas/Item"}
            }
          }
        },
        "responses": {
          "201": {
            "content": {
              "application/json": {
                "schema": {"$ref": "#/components/schemas/Item"}
              }
            }
          }
        }
      }
    }
  }
}
"##;

fn write_spec(dir: &TempDir, name: &str, content: &str) -> PathBuf {
    let path = dir.path().join(name);
    fs::write(&path, content).unwrap();
    path
}

#[test]
fn test_load_yaml_spec_by_extension() {
    let dir = TempDir::new().unwrap();
    let path = write_spec(&dir, "spec.yaml", YAML_SPEC);

    let doc = load_spec(&path).unwrap();
    assert_eq!(doc["info"]["title"], "Test API");
    assert!(doc["components"]["schemas"]["Item"].is_object());
}

#[test]
fn test_yml_extension_is_yaml_too() {
    let dir = TempDir::new().unwrap();
    let path = write_spec(&dir, "spec.yml", YAML_SPEC);

    let doc = load_spec(&path).unwrap();
    assert_eq!(doc["openapi"], "3.1.0");
}

#[test]
fn test_load_json_spec_by_extension() {
    let dir = TempDir::new().unwrap();
    let path = write_spec(&dir, "spec.json", JSON_SPEC);

    let doc = load_spec(&path).unwrap();
    assert_eq!(doc["info"]["title"], "Test API");
}

#[test]
fn test_unknown_extension_parses_as_json() {
    let dir = TempDir::new().unwrap();
    let path = write_spec(&dir, "spec.txt", JSON_SPEC);
    assert!(load_spec(&path).is_ok());

    // YAML content behind a non-YAML extension fails as JSON.
    let path = write_spec(&dir, "other.txt", YAML_SPEC);
    assert!(matches!(load_spec(&path), Err(SpecError::Json(_))));
}

#[test]
fn test_yaml_and_json_renditions_build_the_same_registry() {
    let dir = TempDir::new().unwrap();
    let yaml_path = write_spec(&dir, "spec.yaml", YAML_SPEC);
    let json_path = write_spec(&dir, "spec.json", JSON_SPEC);

    let from_yaml = load_and_build_registry(&yaml_path).unwrap();
    let from_json = load_and_build_registry(&json_path).unwrap();

    assert_eq!(from_yaml.component_count(), from_json.component_count());
    assert_eq!(from_yaml.operation_count(), from_json.operation_count());

    for payload in [
        json!({"id": "1"}),
        json!({"id": "1", "name": "thing"}),
        json!({"name": "no id"}),
    ] {
        assert_eq!(
            from_yaml.component("Item").unwrap().is_valid(&payload),
            from_json.component("Item").unwrap().is_valid(&payload),
            "verdicts diverged on {payload}"
        );
    }
}

#[test]
fn test_missing_file_is_an_io_error() {
    let err = load_spec("/definitely/not/here.yaml").unwrap_err();
    match err {
        SpecError::Io { path, .. } => {
            assert!(path.to_string_lossy().contains("not/here.yaml"));
        }
        other => panic!("expected Io, got {other:?}"),
    }
}

#[test]
fn test_malformed_yaml_is_a_yaml_error() {
    let dir = TempDir::new().unwrap();
    let path = write_spec(&dir, "broken.yaml", "openapi: [unclosed\n");
    assert!(matches!(load_spec(&path), Err(SpecError::Yaml(_))));
}

#[test]
fn test_load_and_build_registry_end_to_end() {
    let dir = TempDir::new().unwrap();
    let path = write_spec(&dir, "spec.yaml", YAML_SPEC);

    let registry = load_and_build_registry(&path).unwrap();
    let op = registry.operation("/items", &http::Method::POST).unwrap();

    let body = op.request_body.as_ref().unwrap();
    assert!(body.is_valid(&json!({"id": "7"})));
    assert!(!body.is_valid(&json!({"name": "no id"})));
    assert!(op.response(201).is_some());
}
