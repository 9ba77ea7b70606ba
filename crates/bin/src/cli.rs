//! CLI argument definitions for the trade-manual binary.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use trade_manual::credentials::PasswordStorage;

/// Output format for commands that produce output
#[derive(Debug, Clone, Copy, Default, ValueEnum)]
pub enum Format {
    /// Aligned table
    #[default]
    Human,
    /// One JSON document
    Json,
}

/// How passwords written by the server are encoded
#[derive(Debug, Clone, Copy, Default, ValueEnum)]
pub enum PasswordMode {
    /// Argon2id hashes (default)
    #[default]
    Argon2,
    /// As typed, readable by older deployments
    Plaintext,
}

impl From<PasswordMode> for PasswordStorage {
    fn from(mode: PasswordMode) -> Self {
        match mode {
            PasswordMode::Argon2 => PasswordStorage::Argon2,
            PasswordMode::Plaintext => PasswordStorage::Plaintext,
        }
    }
}

/// Trade manual document portal
#[derive(Parser, Debug)]
#[command(name = "trade-manual")]
#[command(about = "Trade manual: login-gated PDF document portal")]
#[command(version)]
pub struct Cli {
    /// Output format
    #[arg(long, global = true, default_value = "human")]
    pub format: Format,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the portal web server
    Serve(ServeArgs),
    /// Check health of a running portal server
    Health(HealthArgs),
    /// Inspect the document directory
    Docs {
        #[command(subcommand)]
        command: DocsCommand,
    },
    /// Inspect registered accounts
    Users {
        #[command(subcommand)]
        command: UsersCommand,
    },
}

/// Where the portal keeps its files
#[derive(clap::Args, Debug, Clone)]
pub struct DataArgs {
    /// Directory holding the credential file and the document folder
    #[arg(short = 'D', long, default_value = ".", env = "TRADE_MANUAL_DATA_DIR")]
    pub data_dir: PathBuf,

    /// Credential file, relative to the data directory unless absolute
    #[arg(long, default_value = "users.json", env = "TRADE_MANUAL_CREDENTIAL_FILE")]
    pub credential_file: PathBuf,

    /// Document folder, relative to the data directory unless absolute
    #[arg(long, default_value = "pdfs", env = "TRADE_MANUAL_DOCUMENTS_DIR")]
    pub documents_dir: PathBuf,
}

/// Arguments for the serve command
#[derive(clap::Args, Debug)]
pub struct ServeArgs {
    /// Port to listen on
    #[arg(short, long, default_value_t = 3000, env = "TRADE_MANUAL_PORT")]
    pub port: u16,

    /// Bind address
    #[arg(long, default_value = "0.0.0.0", env = "TRADE_MANUAL_HOST")]
    pub host: String,

    #[command(flatten)]
    pub data: DataArgs,

    /// Encoding for newly written passwords
    #[arg(long, default_value = "argon2", env = "TRADE_MANUAL_PASSWORD_STORAGE")]
    pub password_storage: PasswordMode,

    /// Username of the account seeded on first run
    #[arg(long, default_value = "admin", env = "TRADE_MANUAL_ADMIN_USERNAME")]
    pub admin_username: String,

    /// Password of the account seeded on first run
    #[arg(
        long,
        default_value = "123456",
        env = "TRADE_MANUAL_ADMIN_PASSWORD",
        hide_env_values = true
    )]
    pub admin_password: String,
}

/// Arguments for the health command
#[derive(clap::Args, Debug)]
pub struct HealthArgs {
    /// Base URL of the server to check
    #[arg(long, default_value = "http://127.0.0.1:3000", env = "TRADE_MANUAL_URL")]
    pub url: String,

    /// Timeout in seconds
    #[arg(short, long, default_value_t = 5)]
    pub timeout: u64,
}

#[derive(Subcommand, Debug)]
pub enum DocsCommand {
    /// List documents with their display names
    List(DataArgs),
}

#[derive(Subcommand, Debug)]
pub enum UsersCommand {
    /// List accounts and their access levels
    List(DataArgs),
}
