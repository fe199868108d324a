//! CLI argument parsing for profilemap

use clap::{Parser, Subcommand};
use serde_json::Value;
use std::path::PathBuf;

use crate::profile::Profile;

#[derive(Parser, Debug)]
#[command(name = "pm")]
#[command(author, version, about = "Map orchestrator connections onto dbt profiles", long_about = None)]
pub struct Cli {
    /// Path to config file
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Log level (TRACE, DEBUG, INFO, WARN, ERROR)
    #[arg(short, long, global = true)]
    pub log_level: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Render a profiles file for a connection
    Profile {
        /// Connection file (YAML or JSON)
        #[arg(required = true)]
        connection: PathBuf,

        /// Mapping to use instead of automatic selection
        #[arg(short, long)]
        mapping: Option<String>,

        /// Profile override as KEY=VALUE (repeatable)
        #[arg(short = 'a', long = "arg", value_parser = parse_profile_arg)]
        args: Vec<(String, Value)>,

        /// Profile name (default from config)
        #[arg(long)]
        profile_name: Option<String>,

        /// Target name (default from config)
        #[arg(long)]
        target_name: Option<String>,

        /// Emit placeholder values instead of resolving the connection
        #[arg(long)]
        mock: bool,

        /// Write to a file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Print the secret environment variables for a connection
    Env {
        /// Connection file (YAML or JSON)
        #[arg(required = true)]
        connection: PathBuf,

        /// Mapping to use instead of automatic selection
        #[arg(short, long)]
        mapping: Option<String>,
    },

    /// Show which mapping claims a connection
    Check {
        /// Connection file (YAML or JSON)
        #[arg(required = true)]
        connection: PathBuf,
    },

    /// List known mappings
    List {
        /// Include field tables
        #[arg(short, long)]
        verbose: bool,
    },
}

/// Parse `KEY=VALUE`, reading the value as a YAML scalar
pub fn parse_profile_arg(s: &str) -> Result<(String, Value), String> {
    let (key, raw) = s
        .split_once('=')
        .ok_or_else(|| format!("expected KEY=VALUE, got '{}'", s))?;
    let key = key.trim();
    if key.is_empty() {
        return Err(format!("empty key in '{}'", s));
    }
    let value = if raw.is_empty() {
        Value::String(String::new())
    } else {
        serde_yaml::from_str::<Value>(raw).map_err(|e| format!("invalid value for '{}': {}", key, e))?
    };
    if value.is_array() || value.is_object() {
        return Err(format!("value for '{}' must be a scalar", key));
    }
    Ok((key.to_string(), value))
}

/// Collect parsed `--arg` pairs into profile overrides
pub fn profile_args(args: Vec<(String, Value)>) -> Profile {
    args.into_iter().collect()
}
