//! CLI argument parsing.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::config::{Backend, OutputFormat};

/// cstate - Inspect and exercise cached-state tokens.
#[derive(Debug, Parser)]
#[command(name = "cstate")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Configuration file (defaults to ~/.cstate/cstate.toml).
    #[arg(short, long, env = "CSTATE_CONFIG")]
    pub config: Option<PathBuf>,

    /// Cache backend (overrides config).
    #[arg(short, long, value_enum, env = "CSTATE_BACKEND")]
    pub backend: Option<Backend>,

    /// Redis URL, e.g. redis://localhost:6379/0 (overrides config).
    #[arg(long, env = "CSTATE_REDIS_URL")]
    pub redis_url: Option<String>,

    /// Output format (overrides config).
    #[arg(short, long, value_enum)]
    pub output: Option<OutputFormat>,

    /// Enable verbose output.
    #[arg(short, long)]
    pub verbose: bool,

    /// Subcommand to execute.
    #[command(subcommand)]
    pub command: Command,
}

/// CLI commands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Protection key management.
    #[command(subcommand)]
    Key(KeyCommand),

    /// State token operations.
    #[command(subcommand)]
    State(StateCommand),

    /// Configuration management.
    #[command(subcommand)]
    Config(ConfigCommand),
}

/// Key commands.
#[derive(Debug, Subcommand)]
pub enum KeyCommand {
    /// Generate a new protection key.
    Generate {
        /// Key ID (defaults to one above the highest configured ID).
        #[arg(long)]
        id: Option<u32>,

        /// Add the key to the configuration and make it the default.
        #[arg(long)]
        save: bool,
    },

    /// List configured protection keys.
    List,
}

/// State commands.
#[derive(Debug, Subcommand)]
pub enum StateCommand {
    /// Encode properties into a state token.
    Encode(PropertiesArgs),

    /// Decode a state token back into properties.
    Decode {
        /// The state token.
        token: String,

        /// Purpose the token was encoded for.
        #[arg(long)]
        purpose: Option<String>,
    },

    /// Encode and decode in one process and compare token sizes.
    Roundtrip(PropertiesArgs),
}

/// Properties given on the command line.
#[derive(Debug, Clone, clap::Args)]
pub struct PropertiesArgs {
    /// Property as key=value (repeatable).
    #[arg(short, long = "item", value_parser = parse_item)]
    pub items: Vec<(String, String)>,

    /// Post-sign-in redirect URI.
    #[arg(long)]
    pub redirect_uri: Option<String>,

    /// Purpose to narrow the protector with.
    #[arg(long)]
    pub purpose: Option<String>,
}

/// Config commands.
#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Show current configuration.
    Show,

    /// Print the configuration file path.
    Path,

    /// Write a fresh configuration with a new protection key.
    Init {
        /// Overwrite an existing file.
        #[arg(long)]
        force: bool,
    },
}

/// Parses a `key=value` pair.
fn parse_item(raw: &str) -> Result<(String, String), String> {
    match raw.split_once('=') {
        Some((key, _)) if key.is_empty() => Err(format!("empty key in '{raw}'")),
        Some((key, value)) => Ok((key.to_string(), value.to_string())),
        None => Err(format!("expected key=value, got '{raw}'")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_encode_items() {
        let cli = Cli::try_parse_from([
            "cstate",
            "state",
            "encode",
            "-i",
            "returnUrl=/home",
            "--item",
            "query=a=b",
            "--purpose",
            "tenant",
        ])
        .unwrap();

        match cli.command {
            Command::State(StateCommand::Encode(args)) => {
                assert_eq!(
                    args.items,
                    vec![
                        ("returnUrl".to_string(), "/home".to_string()),
                        ("query".to_string(), "a=b".to_string()),
                    ]
                );
                assert_eq!(args.purpose.as_deref(), Some("tenant"));
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn output_is_unset_unless_given() {
        let cli = Cli::try_parse_from(["cstate", "key", "list"]).unwrap();
        assert_eq!(cli.output, None);
    }

    #[test]
    fn rejects_malformed_items() {
        assert!(Cli::try_parse_from(["cstate", "state", "encode", "-i", "novalue"]).is_err());
        assert!(Cli::try_parse_from(["cstate", "state", "encode", "-i", "=v"]).is_err());
    }

    #[test]
    fn global_flags() {
        let cli = Cli::try_parse_from([
            "cstate",
            "--backend",
            "redis",
            "--redis-url",
            "redis://cache:6379/2",
            "-o",
            "json",
            "state",
            "decode",
            "abc",
        ])
        .unwrap();

        assert_eq!(cli.backend, Some(Backend::Redis));
        assert_eq!(cli.redis_url.as_deref(), Some("redis://cache:6379/2"));
        assert_eq!(cli.output, Some(OutputFormat::Json));
        assert!(matches!(
            cli.command,
            Command::State(StateCommand::Decode { ref token, purpose: None }) if token == "abc"
        ));
    }

    #[test]
    fn parse_item_splits_on_first_equals() {
        assert_eq!(
            parse_item("k=v=w"),
            Ok(("k".to_string(), "v=w".to_string()))
        );
        assert_eq!(parse_item("k="), Ok(("k".to_string(), String::new())));
    }
}
