use super::types::{Contract, Operation, PathItem, Paths, Server, PATH_ITEM_METHODS};
use anyhow::{bail, Context};
use http::Method;
use oas3::OpenApiV3Spec;
use serde_json::{Map, Value};
use std::sync::Arc;
use tracing::debug;

/// Non-operation keys a path item may legitimately carry.
const PATH_ITEM_FIELDS: [&str; 5] = ["summary", "description", "servers", "parameters", "$ref"];

impl Contract {
    /// Build a contract from a parsed OpenAPI document.
    ///
    /// The walk follows the document's own key order, so `paths` keep their
    /// declaration order as long as the value was parsed with an
    /// order-preserving map (serde_json `preserve_order`, which this crate enables).
    ///
    /// # Errors
    ///
    /// Returns an error if the document, `servers`, `paths` or a path item
    /// has the wrong JSON type, or a server entry has no `url`.
    pub fn from_value(document: &Value) -> anyhow::Result<Self> {
        let root = document
            .as_object()
            .context("OpenAPI document must be a JSON/YAML object")?;

        let info = root.get("info");
        let title = info
            .and_then(|i| i.get("title"))
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string();
        let version = info
            .and_then(|i| i.get("version"))
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string();

        let servers = build_servers(root.get("servers"))?;
        let paths = match root.get("paths") {
            None | Some(Value::Null) => None,
            Some(Value::Object(map)) => Some(build_paths(map)?),
            Some(other) => bail!("`paths` must be an object, found {}", type_name(other)),
        };

        Ok(Self {
            title,
            version,
            servers,
            paths,
        })
    }

    /// Convert an [`OpenApiV3Spec`] parsed by `oas3`.
    ///
    /// `oas3` keeps paths in a sorted map, so templates arrive in lexical
    /// rather than declaration order. Use [`crate::spec::load_contract`] when
    /// declaration-order tie breaking matters.
    ///
    /// # Errors
    ///
    /// Returns an error if an operation cannot be re-serialised to JSON.
    pub fn from_openapi(spec: &OpenApiV3Spec) -> anyhow::Result<Self> {
        let servers = spec
            .servers
            .iter()
            .map(|s| Server {
                url: s.url.clone(),
                description: s.description.clone(),
            })
            .collect();

        let paths = match spec.paths.as_ref() {
            Some(map) => {
                let mut paths = Paths::with_capacity(map.len());
                for (template, item) in map {
                    let mut path_item = PathItem {
                        summary: item.summary.clone(),
                        description: item.description.clone(),
                        ..PathItem::default()
                    };
                    for (method, operation) in item.methods() {
                        let method: Method = method.clone();
                        let definition = serde_json::to_value(operation)
                            .with_context(|| format!("serialising {method} {template}"))?;
                        if let Some(slot) = path_item.slot_mut(&method) {
                            *slot = Some(Operation::new(operation.operation_id.clone(), definition));
                        }
                    }
                    paths.insert(template.clone(), Arc::new(path_item));
                }
                Some(paths)
            }
            None => None,
        };

        Ok(Self {
            title: spec.info.title.clone(),
            version: spec.info.version.clone(),
            servers,
            paths,
        })
    }
}

fn build_servers(value: Option<&Value>) -> anyhow::Result<Vec<Server>> {
    match value {
        None | Some(Value::Null) => Ok(Vec::new()),
        Some(Value::Array(entries)) => entries
            .iter()
            .enumerate()
            .map(|(idx, entry)| {
                let url = entry
                    .get("url")
                    .and_then(Value::as_str)
                    .with_context(|| format!("servers[{idx}] has no string `url`"))?;
                Ok(Server {
                    url: url.to_string(),
                    description: entry
                        .get("description")
                        .and_then(Value::as_str)
                        .map(str::to_string),
                })
            })
            .collect(),
        Some(other) => bail!("`servers` must be an array, found {}", type_name(other)),
    }
}

fn build_paths(map: &Map<String, Value>) -> anyhow::Result<Paths> {
    let mut paths = Paths::with_capacity(map.len());
    for (template, value) in map {
        let item = build_path_item(template, value)?;
        paths.insert(template.clone(), Arc::new(item));
    }
    Ok(paths)
}

fn build_path_item(template: &str, value: &Value) -> anyhow::Result<PathItem> {
    let obj = match value {
        Value::Object(obj) => obj,
        // `/x: ~` declares a template with no operations
        Value::Null => return Ok(PathItem::default()),
        other => bail!(
            "path item `{template}` must be an object, found {}",
            type_name(other)
        ),
    };

    let mut item = PathItem {
        summary: obj.get("summary").and_then(Value::as_str).map(str::to_string),
        description: obj
            .get("description")
            .and_then(Value::as_str)
            .map(str::to_string),
        ..PathItem::default()
    };

    for (key, operation) in obj {
        let method = PATH_ITEM_METHODS
            .iter()
            .find(|m| m.as_str().eq_ignore_ascii_case(key));
        match method {
            Some(method) => {
                let operation_id = operation
                    .get("operationId")
                    .and_then(Value::as_str)
                    .map(str::to_string);
                if let Some(slot) = item.slot_mut(method) {
                    *slot = Some(Operation::new(operation_id, operation.clone()));
                }
            }
            None if PATH_ITEM_FIELDS.contains(&key.as_str()) || key.starts_with("x-") => {}
            None => {
                debug!(template = %template, key = %key, "Ignoring unknown path item key");
            }
        }
    }

    Ok(item)
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
