use std::collections::HashMap;

use http::Method;

use crate::validator::Validator;

/// Compiled validators for one operation (a path plus a method).
///
/// Entries exist only for bodies declared with the JSON media type;
/// a `None` request body or an absent status means the document did
/// not declare a JSON body there, never that validation is optional.
#[derive(Debug, Clone)]
pub struct OperationValidators {
    pub request_body: Option<Validator>,
    /// Response-body validators keyed by numeric status code.
    pub responses: HashMap<u16, Validator>,
}

impl OperationValidators {
    #[must_use]
    pub fn response(&self, status: u16) -> Option<&Validator> {
        self.responses.get(&status)
    }
}

/// Every validator compiled from one OpenAPI document.
#[derive(Debug, Clone)]
pub struct SchemaRegistry {
    /// Validators for named component schemas, keyed by name.
    pub components: HashMap<String, Validator>,
    /// Per-operation validators keyed by path template, then method.
    pub paths: HashMap<String, HashMap<Method, OperationValidators>>,
}

impl SchemaRegistry {
    #[must_use]
    pub fn component(&self, name: &str) -> Option<&Validator> {
        self.components.get(name)
    }

    #[must_use]
    pub fn operation(&self, path: &str, method: &Method) -> Option<&OperationValidators> {
        self.paths.get(path).and_then(|methods| methods.get(method))
    }

    #[must_use]
    pub fn component_count(&self) -> usize {
        self.components.len()
    }

    #[must_use]
    pub fn operation_count(&self) -> usize {
        self.paths.values().map(HashMap::len).sum()
    }
}
