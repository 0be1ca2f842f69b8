//! JSONPaths descriptors: one path per target column, in column order

use jsonpath_rust::JsonPath;
use serde::Deserialize;
use serde_json::Value;

/// A compiled descriptor entry
pub struct ColumnPath {
    expr: String,
    path: JsonPath,
}

impl ColumnPath {
    pub fn parse(expr: &str) -> Result<Self, String> {
        let expr = expr.trim();
        if !expr.starts_with('$') {
            return Err(format!("JSONPath must start with '$': {}", expr));
        }
        if expr == "$" {
            return Err(format!("JSONPath selects the whole record: {}", expr));
        }

        let path = JsonPath::try_from(expr)
            .map_err(|e| format!("Invalid JSONPath '{}': {}", expr, e))?;

        Ok(Self {
            expr: expr.to_string(),
            path,
        })
    }

    pub fn expr(&self) -> &str {
        &self.expr
    }

    /// First value the path selects; `None` when nothing matches
    pub fn resolve(&self, record: &Value) -> Option<Value> {
        match self.path.find(record) {
            Value::Array(found) => found.into_iter().next(),
            Value::Null => None,
            other => Some(other),
        }
    }
}

impl std::fmt::Debug for ColumnPath {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("ColumnPath").field(&self.expr).finish()
    }
}

/// A JSONPaths descriptor file: `{"jsonpaths": ["$['artist']", ...]}`
#[derive(Debug, Deserialize)]
struct Descriptor {
    jsonpaths: Vec<String>,
}

pub fn parse_descriptor(bytes: &[u8]) -> Result<Vec<ColumnPath>, String> {
    let descriptor: Descriptor = serde_json::from_slice(bytes)
        .map_err(|e| format!("Invalid JSONPaths descriptor: {}", e))?;

    descriptor
        .jsonpaths
        .iter()
        .map(|expr| ColumnPath::parse(expr))
        .collect()
}
