//! Pipeline nodes and their configuration.
//!
//! A node's configuration is the heterogeneous option mapping the editor
//! attached to it. Generators read it through the defaulted accessors on
//! `NodeConfig`: a missing key yields the documented default, and a value of
//! the wrong JSON type is logged and also replaced by the default. The
//! compiler never rejects a node for its option values.

use crate::pipeline::id::NodeId;
use crate::pipeline::node_type::NodeType;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Number, Value};

/// A single pipeline step.
#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    pub id: NodeId,
    pub node_type: NodeType,
    pub config: NodeConfig,
}

impl Node {
    pub fn new(id: impl Into<NodeId>, node_type: NodeType, config: NodeConfig) -> Self {
        Self {
            id: id.into(),
            node_type,
            config,
        }
    }
}

/// Option name → value mapping of one node. Key order is preserved.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeConfig(Map<String, Value>);

impl NodeConfig {
    pub fn new() -> Self {
        Self(Map::new())
    }

    pub fn from_map(map: Map<String, Value>) -> Self {
        Self(map)
    }

    /// Build from any JSON value; non-objects give an empty config.
    pub fn from_value(value: Value) -> Self {
        match value {
            Value::Object(map) => Self(map),
            Value::Null => Self::new(),
            other => {
                tracing::warn!("Node config is not a mapping ({}), ignoring it", other);
                Self::new()
            }
        }
    }

    /// Builder-style insert.
    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.0.insert(key.into(), value.into());
        self
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key).filter(|v| !v.is_null())
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn as_map(&self) -> &Map<String, Value> {
        &self.0
    }

    /// String option, or `default` when absent or not a string.
    pub fn str_or<'a>(&'a self, key: &str, default: &'a str) -> &'a str {
        match self.get(key) {
            None => default,
            Some(Value::String(s)) => s,
            Some(other) => {
                mismatch(key, "a string", other);
                default
            }
        }
    }

    /// Boolean option, or `default` when absent or not a boolean.
    pub fn bool_or(&self, key: &str, default: bool) -> bool {
        match self.get(key) {
            None => default,
            Some(Value::Bool(b)) => *b,
            Some(other) => {
                mismatch(key, "a boolean", other);
                default
            }
        }
    }

    /// Integer option. Floats with no fractional part are accepted.
    pub fn int_or(&self, key: &str, default: i64) -> i64 {
        match self.get(key) {
            None => default,
            Some(Value::Number(n)) => {
                if let Some(i) = n.as_i64() {
                    i
                } else {
                    match n.as_f64() {
                        Some(f) if f.fract() == 0.0 && f.abs() < i64::MAX as f64 => f as i64,
                        _ => {
                            mismatch(key, "an integer", &Value::Number(n.clone()));
                            default
                        }
                    }
                }
            }
            Some(other) => {
                mismatch(key, "an integer", other);
                default
            }
        }
    }

    /// Float option. Integers are widened.
    pub fn float_or(&self, key: &str, default: f64) -> f64 {
        match self.get(key) {
            None => default,
            Some(Value::Number(n)) => n.as_f64().unwrap_or(default),
            Some(other) => {
                mismatch(key, "a number", other);
                default
            }
        }
    }

    /// Numeric option kept as written, so `15` stays an integer and `0.2` a float.
    pub fn number_or(&self, key: &str, default: Number) -> Number {
        match self.get(key) {
            None => default,
            Some(Value::Number(n)) => n.clone(),
            Some(other) => {
                mismatch(key, "a number", other);
                default
            }
        }
    }

    /// Numeric option only when it is strictly positive.
    pub fn positive_number(&self, key: &str) -> Option<Number> {
        match self.get(key)? {
            Value::Number(n) if n.as_f64().is_some_and(|f| f > 0.0) => Some(n.clone()),
            Value::Number(_) => None,
            other => {
                mismatch(key, "a number", other);
                None
            }
        }
    }

    /// Nested mapping option; absent or non-mapping values give an empty config.
    pub fn section(&self, key: &str) -> NodeConfig {
        match self.get(key) {
            None => NodeConfig::new(),
            Some(Value::Object(map)) => NodeConfig(map.clone()),
            Some(other) => {
                mismatch(key, "a mapping", other);
                NodeConfig::new()
            }
        }
    }

    /// Truthiness in the editor's sense: `true`, non-zero numbers, non-empty
    /// strings, lists and mappings.
    pub fn is_truthy(&self, key: &str) -> bool {
        match self.get(key) {
            None => false,
            Some(Value::Bool(b)) => *b,
            Some(Value::Number(n)) => n.as_f64().is_some_and(|f| f != 0.0),
            Some(Value::String(s)) => !s.is_empty(),
            Some(Value::Array(a)) => !a.is_empty(),
            Some(Value::Object(o)) => !o.is_empty(),
            Some(Value::Null) => false,
        }
    }
}

impl From<Map<String, Value>> for NodeConfig {
    fn from(map: Map<String, Value>) -> Self {
        Self(map)
    }
}

fn mismatch(key: &str, expected: &str, found: &Value) {
    tracing::warn!(
        "Config option '{}' should be {}, found {}; using default",
        key,
        expected,
        found
    );
}
