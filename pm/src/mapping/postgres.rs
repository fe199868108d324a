//! Postgres connections with a username and password

use super::{MappingDef, ProfileMapping};
use crate::connection::ParamPath;
use crate::profile::Profile;

pub const DEFAULT_PORT: u16 = 5432;
pub const DEFAULT_SCHEMA: &str = "public";

pub static POSTGRES_USER_PASSWORD: MappingDef = MappingDef {
    name: "postgres_user_password",
    connection_type: "postgres",
    profile_type: "postgres",
    required_fields: &["host", "user", "password", "dbname"],
    secret_fields: &["password"],
    param_mapping: &[
        ("host", ParamPath::Host),
        ("user", ParamPath::Login),
        ("password", ParamPath::Password),
        ("port", ParamPath::Port),
        ("dbname", ParamPath::Schema),
        ("keepalives_idle", ParamPath::Extra("keepalives_idle")),
        ("sslmode", ParamPath::Extra("sslmode")),
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
    profile.insert("password", mapping.env_var_format("password"));
    if profile.is_null("schema") {
        profile.insert("schema", DEFAULT_SCHEMA);
    }
    profile
}
