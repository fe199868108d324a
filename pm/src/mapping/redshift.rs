//! Redshift connections with a username and password

use super::{MappingDef, ProfileMapping};
use crate::connection::ParamPath;
use crate::profile::Profile;

pub const DEFAULT_PORT: u16 = 5439;

pub static REDSHIFT_USER_PASSWORD: MappingDef = MappingDef {
    name: "redshift_user_password",
    connection_type: "redshift",
    profile_type: "redshift",
    required_fields: &["host", "user", "password", "dbname", "schema"],
    secret_fields: &["password"],
    param_mapping: &[
        ("host", ParamPath::Host),
        ("user", ParamPath::Login),
        ("password", ParamPath::Password),
        ("port", ParamPath::Port),
        ("dbname", ParamPath::Schema),
        ("schema", ParamPath::Schema),
        ("timeout", ParamPath::Extra("timeout")),
        ("sslmode", ParamPath::Extra("sslmode")),
        ("region", ParamPath::Extra("region")),
    ],
    default_port: Some(DEFAULT_PORT),
    assemble,
};

fn assemble(mapping: &ProfileMapping<'_>) -> Profile {
    let mut profile = mapping.mapped_params();
    profile.insert("type", mapping.def().profile_type);
    if profile.is_null("port") {
        profile.insert("port", DEFAULT_PORT);
    }
    profile.merge(mapping.profile_args());
    // never the literal, even when the connection carries one
    profile.insert("password", mapping.env_var_format("password"));
    profile
}
