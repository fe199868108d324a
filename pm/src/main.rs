use clap::Parser;
use colored::*;
use eyre::{Context, Result};
use std::fs;
use std::path::Path;
use tracing::{debug, info};

use profilemap::cli::{Cli, Command, profile_args};
use profilemap::config::Config;
use profilemap::{
    Connection, PROFILE_MAPPINGS, Profile, ProfileMapping, get_automatic_profile_mapping, get_profile_mapping,
};

fn setup_logging(cli_log_level: Option<&str>, config_log_level: Option<&str>) -> Result<()> {
    // CLI --log-level > config file > WARN
    let level = match cli_log_level.or(config_log_level) {
        Some(s) => match s.to_uppercase().as_str() {
            "TRACE" => tracing::Level::TRACE,
            "DEBUG" => tracing::Level::DEBUG,
            "INFO" => tracing::Level::INFO,
            "WARN" | "WARNING" => tracing::Level::WARN,
            "ERROR" => tracing::Level::ERROR,
            _ => {
                eprintln!("Warning: Unknown log-level '{}', defaulting to WARN", s);
                tracing::Level::WARN
            }
        },
        None => tracing::Level::WARN,
    };

    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env().add_directive(level.into()))
        .init();

    debug!("Logging initialized (level: {:?})", level);
    Ok(())
}

fn load_connection(path: &Path) -> Result<Connection> {
    let content = fs::read_to_string(path).context(format!("Failed to read connection file: {}", path.display()))?;
    // YAML is a superset of JSON, so one parser covers both
    let conn: Connection =
        serde_yaml::from_str(&content).context(format!("Failed to parse connection file: {}", path.display()))?;
    info!(conn_id = %conn.conn_id, conn_type = %conn.conn_type, "Loaded connection");
    Ok(conn)
}

fn bind<'a>(
    conn: &'a Connection,
    mapping: Option<&str>,
    args: Profile,
    config: &Config,
) -> Result<ProfileMapping<'a>> {
    let mapping = match mapping {
        Some(name) => get_profile_mapping(name, conn, args)?,
        None => get_automatic_profile_mapping(conn, args)?,
    };
    Ok(mapping.with_env_var_prefix(config.env_var_prefix.clone()))
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = Config::load(cli.config.as_ref()).context("Failed to load configuration")?;
    setup_logging(cli.log_level.as_deref(), config.log_level.as_deref()).context("Failed to setup logging")?;

    match cli.command {
        Command::Profile {
            connection,
            mapping,
            args,
            profile_name,
            target_name,
            mock,
            output,
        } => {
            let conn = load_connection(&connection)?;
            let mapping = bind(&conn, mapping.as_deref(), profile_args(args), &config)?;
            let profile_name = profile_name.unwrap_or_else(|| config.profile_name.clone());
            let target_name = target_name.unwrap_or_else(|| config.target_name.clone());

            let contents = mapping.profile_file_contents(&profile_name, &target_name, mock)?;
            match output {
                Some(path) => {
                    fs::write(&path, &contents).context(format!("Failed to write {}", path.display()))?;
                    eprintln!(
                        "{} Wrote {} profile to {}",
                        "✓".green(),
                        mapping.def().name.cyan(),
                        path.display()
                    );
                }
                None => print!("{}", contents),
            }
        }
        Command::Env { connection, mapping } => {
            let conn = load_connection(&connection)?;
            let mapping = bind(&conn, mapping.as_deref(), Profile::new(), &config)?;
            for (name, value) in mapping.env_vars()? {
                println!("{}={}", name, value);
            }
        }
        Command::Check { connection } => {
            let conn = load_connection(&connection)?;
            let mapping = bind(&conn, None, Profile::new(), &config)?;
            println!(
                "{} {} claimed by {}",
                "✓".green(),
                conn.conn_id.cyan(),
                mapping.def().name.yellow()
            );
        }
        Command::List { verbose } => {
            for def in PROFILE_MAPPINGS {
                println!(
                    "{} ({} -> {})",
                    def.name.cyan(),
                    def.connection_type,
                    def.profile_type
                );
                if verbose {
                    for (key, path) in def.param_mapping {
                        let mut flags = Vec::new();
                        if def.required_fields.contains(key) {
                            flags.push("required");
                        }
                        if def.is_secret(key) {
                            flags.push("secret");
                        }
                        let flags = if flags.is_empty() {
                            String::new()
                        } else {
                            format!(" [{}]", flags.join(", "))
                        };
                        println!("  {:<16} <- {}{}", key, path, flags.dimmed());
                    }
                }
            }
        }
    }

    Ok(())
}
