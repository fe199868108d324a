//! Profile mapping error types

use thiserror::Error;

/// Errors that can occur while turning a connection into a profile
#[derive(Debug, Error)]
pub enum ProfileError {
    #[error("{profile_type} profile is missing required fields: {}", fields.join(", "))]
    MissingRequiredFields { profile_type: String, fields: Vec<String> },

    #[error("No value found for secret field: {field}")]
    MissingSecret { field: String },

    #[error("Secret field '{field}' cannot be set in profile args, set it on the connection instead")]
    SecretInProfileArgs { field: String },

    #[error("Profile args set type '{found}' but this mapping produces '{expected}'")]
    ProfileTypeMismatch { expected: String, found: String },

    #[error("No profile mapping can claim connection '{conn_id}' of type '{conn_type}'")]
    NoMappingFound { conn_id: String, conn_type: String },

    #[error("Unknown profile mapping: {0}")]
    UnknownMapping(String),

    #[error("YAML serialization error: {0}")]
    Serialize(#[from] serde_yaml::Error),
}

impl ProfileError {
    /// Fields reported missing, if this is a required-field failure
    pub fn missing_fields(&self) -> &[String] {
        match self {
            ProfileError::MissingRequiredFields { fields, .. } => fields,
            _ => &[],
        }
    }
}
