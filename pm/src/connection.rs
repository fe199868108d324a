//! Orchestrator connection records
//!
//! A [`Connection`] is the source side of a mapping: host, credentials and a
//! bag of vendor-specific extras. The orchestrator stores `extra` as a JSON
//! encoded string, so both an inline object and a string are accepted here.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use tracing::warn;

/// A connection definition as exported by the orchestrator
#[derive(Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Connection {
    /// Connection identifier
    #[serde(default)]
    pub conn_id: String,

    /// Connection type tag, e.g. "redshift"
    pub conn_type: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub host: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub login: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,

    /// Database name for most warehouse backends
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schema: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub port: Option<u16>,

    /// Vendor-specific extras
    #[serde(default, deserialize_with = "deserialize_extra", skip_serializing_if = "Map::is_empty")]
    pub extra: Map<String, Value>,
}

impl fmt::Debug for Connection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Connection")
            .field("conn_id", &self.conn_id)
            .field("conn_type", &self.conn_type)
            .field("host", &self.host)
            .field("login", &self.login)
            .field("password", &self.password.as_ref().map(|_| "<redacted>"))
            .field("schema", &self.schema)
            .field("port", &self.port)
            .field("extra", &self.extra.keys().collect::<Vec<_>>())
            .finish()
    }
}

/// Where a profile key is read from on a [`Connection`]
///
/// Lookups are at most two levels deep: a top-level field, or one key inside
/// the extras bag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamPath {
    Host,
    Login,
    Password,
    Port,
    Schema,
    Extra(&'static str),
}

impl fmt::Display for ParamPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParamPath::Host => write!(f, "host"),
            ParamPath::Login => write!(f, "login"),
            ParamPath::Password => write!(f, "password"),
            ParamPath::Port => write!(f, "port"),
            ParamPath::Schema => write!(f, "schema"),
            ParamPath::Extra(key) => write!(f, "extra.{}", key),
        }
    }
}

impl Connection {
    /// Create an empty connection of the given type
    pub fn new(conn_id: impl Into<String>, conn_type: impl Into<String>) -> Self {
        Self {
            conn_id: conn_id.into(),
            conn_type: conn_type.into(),
            ..Default::default()
        }
    }

    pub fn with_host(mut self, host: impl Into<String>) -> Self {
        self.host = Some(host.into());
        self
    }

    pub fn with_login(mut self, login: impl Into<String>) -> Self {
        self.login = Some(login.into());
        self
    }

    pub fn with_password(mut self, password: impl Into<String>) -> Self {
        self.password = Some(password.into());
        self
    }

    pub fn with_schema(mut self, schema: impl Into<String>) -> Self {
        self.schema = Some(schema.into());
        self
    }

    pub fn with_port(mut self, port: u16) -> Self {
        self.port = Some(port);
        self
    }

    pub fn with_extra(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.extra.insert(key.into(), value.into());
        self
    }

    /// Resolve a path against this connection
    ///
    /// Absent fields and JSON nulls in the extras both resolve to `None`.
    pub fn resolve(&self, path: &ParamPath) -> Option<Value> {
        match path {
            ParamPath::Host => self.host.clone().map(Value::String),
            ParamPath::Login => self.login.clone().map(Value::String),
            ParamPath::Password => self.password.clone().map(Value::String),
            ParamPath::Port => self.port.map(Value::from),
            ParamPath::Schema => self.schema.clone().map(Value::String),
            ParamPath::Extra(key) => self.extra.get(*key).filter(|v| !v.is_null()).cloned(),
        }
    }
}

/// Accept `extra` as an object or a JSON string; anything else is an empty bag
fn deserialize_extra<'de, D>(deserializer: D) -> Result<Map<String, Value>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<Value>::deserialize(deserializer)?;
    Ok(match raw {
        None | Some(Value::Null) => Map::new(),
        Some(Value::Object(map)) => map,
        Some(Value::String(s)) if s.trim().is_empty() => Map::new(),
        Some(Value::String(s)) => match serde_json::from_str::<Value>(&s) {
            Ok(Value::Object(map)) => map,
            Ok(other) => {
                warn!(kind = json_kind(&other), "Connection extra is not an object, ignoring it");
                Map::new()
            }
            Err(e) => {
                warn!(error = %e, "Connection extra is not valid JSON, ignoring it");
                Map::new()
            }
        },
        Some(other) => {
            warn!(kind = json_kind(&other), "Connection extra is not an object, ignoring it");
            Map::new()
        }
    })
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
