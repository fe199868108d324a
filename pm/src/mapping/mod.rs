//! Connection-to-profile mappings
//!
//! Each backend is described by a `'static` [`MappingDef`]: which connection
//! type it claims, where every profile key comes from, which keys are required
//! and which are secret. [`ProfileMapping`] binds a definition to a concrete
//! connection plus caller overrides and does the shared work: resolution,
//! validation, secret indirection and rendering.

use serde::Serialize;
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;
use tracing::debug;

use crate::connection::{Connection, ParamPath};
use crate::error::ProfileError;
use crate::profile::Profile;

pub mod postgres;
pub mod redshift;

/// Prefix for the environment variables that carry secret values
pub const DEFAULT_ENV_VAR_PREFIX: &str = "COSMOS_CONN";

/// Placeholder used for required fields in mock profiles
pub const MOCK_VALUE: &str = "mock_value";

/// Static description of one backend mapping
pub struct MappingDef {
    /// Registry name, e.g. "redshift_user_password"
    pub name: &'static str,

    /// Connection type this mapping claims
    pub connection_type: &'static str,

    /// Value of the `type` key in the emitted profile
    pub profile_type: &'static str,

    pub required_fields: &'static [&'static str],

    /// Keys that are only ever emitted as environment variable references
    pub secret_fields: &'static [&'static str],

    /// Profile key to connection path
    pub param_mapping: &'static [(&'static str, ParamPath)],

    pub default_port: Option<u16>,

    /// Backend-specific assembly of the pre-filter profile
    pub assemble: fn(&ProfileMapping<'_>) -> Profile,
}

impl fmt::Debug for MappingDef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MappingDef")
            .field("name", &self.name)
            .field("connection_type", &self.connection_type)
            .field("profile_type", &self.profile_type)
            .finish_non_exhaustive()
    }
}

impl MappingDef {
    /// Source path for a profile key, if the table maps it
    pub fn path_for(&self, key: &str) -> Option<&ParamPath> {
        self.param_mapping.iter().find(|(k, _)| *k == key).map(|(_, path)| path)
    }

    pub fn is_secret(&self, key: &str) -> bool {
        self.secret_fields.contains(&key)
    }
}

/// A mapping definition bound to a connection and caller overrides
#[derive(Debug, Clone)]
pub struct ProfileMapping<'a> {
    def: &'static MappingDef,
    conn: &'a Connection,
    profile_args: Profile,
    env_var_prefix: String,
}

impl<'a> ProfileMapping<'a> {
    /// Bind a definition to a connection
    ///
    /// Secret fields may not be overridden, and a `type` override must agree
    /// with the definition. Null overrides are dropped so that validation and
    /// assembly both fall back to the connection value.
    pub fn new(def: &'static MappingDef, conn: &'a Connection, profile_args: Profile) -> Result<Self, ProfileError> {
        if let Some(field) = def.secret_fields.iter().find(|f| profile_args.contains_key(f)) {
            return Err(ProfileError::SecretInProfileArgs {
                field: field.to_string(),
            });
        }

        let profile_args = profile_args.filter_null();

        if let Some(found) = profile_args.get("type")
            && found.as_str() != Some(def.profile_type)
        {
            return Err(ProfileError::ProfileTypeMismatch {
                expected: def.profile_type.to_string(),
                found: value_to_string(found),
            });
        }

        Ok(Self {
            def,
            conn,
            profile_args,
            env_var_prefix: DEFAULT_ENV_VAR_PREFIX.to_string(),
        })
    }

    pub fn with_env_var_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.env_var_prefix = prefix.into();
        self
    }

    pub fn def(&self) -> &'static MappingDef {
        self.def
    }

    pub fn connection(&self) -> &'a Connection {
        self.conn
    }

    pub fn profile_args(&self) -> &Profile {
        &self.profile_args
    }

    /// Every table entry resolved against the connection, absent paths as null
    pub fn mapped_params(&self) -> Profile {
        self.def
            .param_mapping
            .iter()
            .map(|(key, path)| (*key, self.conn.resolve(path).unwrap_or(Value::Null)))
            .collect()
    }

    /// Effective value of a profile key: overrides first, then the table
    pub fn get_dbt_value(&self, key: &str) -> Option<Value> {
        if let Some(value) = self.profile_args.get(key) {
            return Some(value.clone());
        }
        self.def.path_for(key).and_then(|path| self.conn.resolve(path))
    }

    fn missing_required(&self) -> Vec<String> {
        self.def
            .required_fields
            .iter()
            .filter(|field| !is_present(self.get_dbt_value(field).as_ref()))
            .map(|field| field.to_string())
            .collect()
    }

    /// Whether this mapping can turn the bound connection into a valid profile
    pub fn can_claim_connection(&self) -> bool {
        if self.conn.conn_type != self.def.connection_type {
            debug!(
                mapping = self.def.name,
                conn_type = %self.conn.conn_type,
                "can_claim_connection: connection type does not match"
            );
            return false;
        }

        let missing = self.missing_required();
        if !missing.is_empty() {
            debug!(mapping = self.def.name, ?missing, "can_claim_connection: required fields missing");
            return false;
        }

        true
    }

    /// Fail unless every required field has a non-empty effective value
    pub fn validate_required(&self) -> Result<(), ProfileError> {
        let fields = self.missing_required();
        if fields.is_empty() {
            return Ok(());
        }
        Err(ProfileError::MissingRequiredFields {
            profile_type: self.def.profile_type.to_string(),
            fields,
        })
    }

    /// Name of the environment variable that carries a secret field
    pub fn env_var_name(&self, field: &str) -> String {
        format!("{}_{}_{}", self.env_var_prefix, self.def.connection_type, field).to_uppercase()
    }

    /// Template reference the downstream tool resolves from the environment
    pub fn env_var_format(&self, field: &str) -> String {
        format!("{{{{ env_var('{}') }}}}", self.env_var_name(field))
    }

    /// Environment the caller must export for the secret references to resolve
    pub fn env_vars(&self) -> Result<BTreeMap<String, String>, ProfileError> {
        let mut vars = BTreeMap::new();
        for field in self.def.secret_fields {
            let value = self.get_dbt_value(field).ok_or_else(|| ProfileError::MissingSecret {
                field: field.to_string(),
            })?;
            vars.insert(self.env_var_name(field), value_to_string(&value));
        }
        Ok(vars)
    }

    /// Build the validated, null-free profile
    pub fn profile(&self) -> Result<Profile, ProfileError> {
        self.validate_required()?;
        let profile = (self.def.assemble)(self).filter_null();
        debug!(
            mapping = self.def.name,
            conn_id = %self.conn.conn_id,
            keys = ?profile.keys().collect::<Vec<_>>(),
            "profile: built"
        );
        Ok(profile)
    }

    /// Profile with placeholder values, for parsing without real credentials
    pub fn mock_profile(&self) -> Profile {
        let mut profile = Profile::new();
        profile.insert("type", self.def.profile_type);
        for field in self.def.required_fields {
            profile.insert(*field, MOCK_VALUE);
        }
        if let Some(port) = self.def.default_port {
            profile.insert("port", port);
        }
        profile
    }

    /// Render a complete profiles file with a single target
    pub fn profile_file_contents(
        &self,
        profile_name: &str,
        target_name: &str,
        use_mock_values: bool,
    ) -> Result<String, ProfileError> {
        let profile = if use_mock_values {
            self.mock_profile()
        } else {
            self.profile()?
        };

        let file = BTreeMap::from([(
            profile_name,
            ProfileFileEntry {
                target: target_name,
                outputs: BTreeMap::from([(target_name, profile)]),
            },
        )]);

        Ok(serde_yaml::to_string(&file)?)
    }
}

#[derive(Serialize)]
struct ProfileFileEntry<'p> {
    target: &'p str,
    outputs: BTreeMap<&'p str, Profile>,
}

fn is_present(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) => false,
        Some(Value::String(s)) => !s.is_empty(),
        Some(_) => true,
    }
}

fn value_to_string(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
