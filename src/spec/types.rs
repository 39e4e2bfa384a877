use http::Method;
use indexmap::IndexMap;
use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;

/// The eight HTTP methods an OpenAPI path item can declare, in document order.
pub const PATH_ITEM_METHODS: [Method; 8] = [
    Method::GET,
    Method::PUT,
    Method::POST,
    Method::DELETE,
    Method::OPTIONS,
    Method::HEAD,
    Method::PATCH,
    Method::TRACE,
];

/// Declaration-ordered path templates and their path items.
///
/// Order is load-bearing: equally specific templates are tie-broken by
/// whichever was declared first, so this is never a hash map.
pub type Paths = IndexMap<String, Arc<PathItem>>;

/// A parsed, read-only OpenAPI contract as far as path resolution needs it.
#[derive(Debug, Clone, Default, Serialize)]
pub struct Contract {
    pub title: String,
    pub version: String,
    pub servers: Vec<Server>,
    /// `None` when the document has no `paths` object at all.
    pub paths: Option<Paths>,
}

impl Contract {
    /// Number of declared path templates (zero when `paths` is absent).
    #[must_use]
    pub fn template_count(&self) -> usize {
        self.paths.as_ref().map_or(0, IndexMap::len)
    }
}

/// A declared server entry. Only the URL matters for base-path extraction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Server {
    pub url: String,
    pub description: Option<String>,
}

impl Server {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            description: None,
        }
    }
}

/// Opaque operation handle.
///
/// The raw operation object is retained so downstream validators can resolve
/// parameters, request bodies and responses without re-reading the document.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Operation {
    pub operation_id: Option<String>,
    pub definition: Value,
}

impl Operation {
    pub fn new(operation_id: Option<String>, definition: Value) -> Self {
        Self {
            operation_id,
            definition,
        }
    }
}

/// The method-to-operation map declared under one path template.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PathItem {
    pub summary: Option<String>,
    pub description: Option<String>,
    pub get: Option<Operation>,
    pub put: Option<Operation>,
    pub post: Option<Operation>,
    pub delete: Option<Operation>,
    pub options: Option<Operation>,
    pub head: Option<Operation>,
    pub patch: Option<Operation>,
    pub trace: Option<Operation>,
}

impl PathItem {
    /// Look up the operation declared for `method`.
    ///
    /// Methods outside the eight OpenAPI path item methods (e.g. `CONNECT`)
    /// are never declared.
    #[must_use]
    pub fn operation(&self, method: &Method) -> Option<&Operation> {
        let slot = match *method {
            Method::GET => &self.get,
            Method::PUT => &self.put,
            Method::POST => &self.post,
            Method::DELETE => &self.delete,
            Method::OPTIONS => &self.options,
            Method::HEAD => &self.head,
            Method::PATCH => &self.patch,
            Method::TRACE => &self.trace,
            _ => return None,
        };
        slot.as_ref()
    }

    #[inline]
    #[must_use]
    pub fn has_method(&self, method: &Method) -> bool {
        self.operation(method).is_some()
    }

    /// Mutable slot for `method`, used while building a contract.
    pub(crate) fn slot_mut(&mut self, method: &Method) -> Option<&mut Option<Operation>> {
        match *method {
            Method::GET => Some(&mut self.get),
            Method::PUT => Some(&mut self.put),
            Method::POST => Some(&mut self.post),
            Method::DELETE => Some(&mut self.delete),
            Method::OPTIONS => Some(&mut self.options),
            Method::HEAD => Some(&mut self.head),
            Method::PATCH => Some(&mut self.patch),
            Method::TRACE => Some(&mut self.trace),
            _ => None,
        }
    }

    /// Builder-style helper that declares `method` with an empty operation.
    #[must_use]
    pub fn with_method(mut self, method: Method) -> Self {
        if let Some(slot) = self.slot_mut(&method) {
            *slot = Some(Operation::new(None, Value::Null));
        }
        self
    }

    /// Declared methods in document order.
    #[must_use]
    pub fn methods(&self) -> Vec<Method> {
        PATH_ITEM_METHODS
            .iter()
            .filter(|m| self.has_method(m))
            .cloned()
            .collect()
    }
}
