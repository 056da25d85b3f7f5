// ⚙️ Configuration
// Command line flags, backed by environment variables

use crate::validation::ParsePolicy;
use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

pub const DEFAULT_DB_PATH: &str = "sales-registry.db";
pub const DEFAULT_LOG_PATH: &str = "sales-registry.log";

#[derive(Debug, Parser)]
#[command(name = "sales-registry", version, about = "Manage departments and sellers")]
pub struct Cli {
    /// SQLite database file
    #[arg(long, env = "SALES_REGISTRY_DB", default_value = DEFAULT_DB_PATH)]
    pub db: PathBuf,

    /// Log file (the terminal UI owns stdout)
    #[arg(long, env = "SALES_REGISTRY_LOG", default_value = DEFAULT_LOG_PATH)]
    pub log_file: PathBuf,

    /// How to treat dates and amounts that don't parse
    #[arg(long, value_enum, default_value_t = ParseMode::Strict)]
    pub parse: ParseMode,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Debug, Clone, PartialEq, Eq, Subcommand)]
pub enum Command {
    /// Open the terminal UI (default)
    Ui,
    /// Print stored records
    List {
        #[arg(value_enum)]
        kind: RecordKind,
        /// Print JSON instead of a table
        #[arg(long)]
        json: bool,
    },
    /// Insert demo records into an empty database
    Seed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum RecordKind {
    Departments,
    Sellers,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ParseMode {
    /// Unparseable values are validation errors
    Strict,
    /// Unparseable values are stored as empty
    Permissive,
}

impl From<ParseMode> for ParsePolicy {
    fn from(mode: ParseMode) -> Self {
        match mode {
            ParseMode::Strict => ParsePolicy::Strict,
            ParseMode::Permissive => ParsePolicy::Permissive,
        }
    }
}

/// Resolved settings the rest of the program runs with
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub db_path: PathBuf,
    pub log_file: PathBuf,
    pub parse_policy: ParsePolicy,
    pub command: Command,
}

impl From<Cli> for Config {
    fn from(cli: Cli) -> Self {
        Config {
            db_path: cli.db,
            log_file: cli.log_file,
            parse_policy: cli.parse.into(),
            command: cli.command.unwrap_or(Command::Ui),
        }
    }
}

impl Config {
    pub fn from_args() -> Self {
        Cli::parse().into()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config: Config = Cli::try_parse_from(["sales-registry"]).unwrap().into();

        assert_eq!(config.command, Command::Ui);
        assert_eq!(config.parse_policy, ParsePolicy::Strict);
    }

    #[test]
    fn test_list_command() {
        let cli = Cli::try_parse_from([
            "sales-registry",
            "--db",
            "/tmp/x.db",
            "--parse",
            "permissive",
            "list",
            "sellers",
            "--json",
        ])
        .unwrap();
        let config = Config::from(cli);

        assert_eq!(config.db_path, PathBuf::from("/tmp/x.db"));
        assert_eq!(config.parse_policy, ParsePolicy::Permissive);
        assert_eq!(
            config.command,
            Command::List {
                kind: RecordKind::Sellers,
                json: true
            }
        );
    }

    #[test]
    fn test_unknown_kind_rejected() {
        assert!(Cli::try_parse_from(["sales-registry", "list", "managers"]).is_err());
    }
}
