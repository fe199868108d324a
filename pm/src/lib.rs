//! ProfileMap - orchestrator connections to dbt connection profiles
//!
//! Turns a connection record (host, credentials, extras) into the flat profile
//! dictionary dbt expects in `profiles.yml`. Each warehouse backend is a static
//! table: where every profile key is read from, which keys are required, and
//! which are secret. Secrets are never emitted literally; the profile carries
//! an `{{ env_var('...') }}` reference and [`ProfileMapping::env_vars`] gives
//! the values the caller must export.
//!
//! # Example
//!
//! ```
//! use profilemap::{Connection, Profile, get_automatic_profile_mapping};
//!
//! let conn = Connection::new("warehouse", "redshift")
//!     .with_host("db.x")
//!     .with_login("u")
//!     .with_password("p")
//!     .with_schema("s");
//!
//! let mapping = get_automatic_profile_mapping(&conn, Profile::new()).unwrap();
//! let profile = mapping.profile().unwrap();
//! assert_eq!(profile.get_str("type"), Some("redshift"));
//! assert_eq!(
//!     profile.get_str("password"),
//!     Some("{{ env_var('COSMOS_CONN_REDSHIFT_PASSWORD') }}")
//! );
//! ```

pub mod cli;
pub mod config;
pub mod connection;
pub mod error;
pub mod mapping;
pub mod profile;
pub mod registry;

pub use connection::{Connection, ParamPath};
pub use error::ProfileError;
pub use mapping::postgres::POSTGRES_USER_PASSWORD;
pub use mapping::redshift::REDSHIFT_USER_PASSWORD;
pub use mapping::{DEFAULT_ENV_VAR_PREFIX, MappingDef, ProfileMapping};
pub use profile::{Profile, filter_null};
pub use registry::{PROFILE_MAPPINGS, find_mapping, get_automatic_profile_mapping, get_profile_mapping};

/// Default top-level profile name
pub const DEFAULT_PROFILE_NAME: &str = "default";

/// Default target name
pub const DEFAULT_TARGET_NAME: &str = "dev";
