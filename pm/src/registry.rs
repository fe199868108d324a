//! Known profile mappings and automatic selection

use tracing::debug;

use crate::connection::Connection;
use crate::error::ProfileError;
use crate::mapping::postgres::POSTGRES_USER_PASSWORD;
use crate::mapping::redshift::REDSHIFT_USER_PASSWORD;
use crate::mapping::{MappingDef, ProfileMapping};
use crate::profile::Profile;

/// Every mapping, in the order automatic selection tries them
pub static PROFILE_MAPPINGS: &[&MappingDef] = &[&REDSHIFT_USER_PASSWORD, &POSTGRES_USER_PASSWORD];

/// Look up a mapping by registry name
pub fn find_mapping(name: &str) -> Option<&'static MappingDef> {
    PROFILE_MAPPINGS.iter().copied().find(|def| def.name == name)
}

/// Bind a named mapping, failing if the name is unknown
pub fn get_profile_mapping<'a>(
    name: &str,
    conn: &'a Connection,
    profile_args: Profile,
) -> Result<ProfileMapping<'a>, ProfileError> {
    let def = find_mapping(name).ok_or_else(|| ProfileError::UnknownMapping(name.to_string()))?;
    ProfileMapping::new(def, conn, profile_args)
}

/// Pick the first mapping that can claim the connection
///
/// Definitions whose override checks reject `profile_args` are skipped, so a
/// `type` override steers selection towards the matching backend.
pub fn get_automatic_profile_mapping<'a>(
    conn: &'a Connection,
    profile_args: Profile,
) -> Result<ProfileMapping<'a>, ProfileError> {
    for def in PROFILE_MAPPINGS.iter().copied() {
        let mapping = match ProfileMapping::new(def, conn, profile_args.clone()) {
            Ok(mapping) => mapping,
            Err(e) => {
                debug!(mapping = def.name, error = %e, "get_automatic_profile_mapping: profile args rejected");
                continue;
            }
        };
        if mapping.can_claim_connection() {
            debug!(mapping = def.name, conn_id = %conn.conn_id, "get_automatic_profile_mapping: claimed");
            return Ok(mapping);
        }
    }

    Err(ProfileError::NoMappingFound {
        conn_id: conn.conn_id.clone(),
        conn_type: conn.conn_type.clone(),
    })
}
