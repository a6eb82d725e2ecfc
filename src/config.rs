use anyhow::{Context, Result};
use clap::Parser;
use std::env;
use uuid::Uuid;

/// Centralized application configuration.
/// Combines environment variables and CLI arguments.
#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub storage_dir: String,
    pub database_url: String,
    /// Record to serve. `None` means the table must hold exactly one.
    pub record_id: Option<Uuid>,
}

/// What the binary does after configuration is resolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunMode {
    Serve,
    Migrate,
    Register(String),
}

/// Command-line + environment configuration.
#[derive(Parser, Debug, Default)]
#[command(author, version, about = "Serves a stored file as a downloadable attachment")]
pub struct Args {
    /// Host to bind to (overrides ATTACHMENT_SERVER_HOST)
    #[arg(long)]
    pub host: Option<String>,

    /// Port to bind to (overrides ATTACHMENT_SERVER_PORT)
    #[arg(long)]
    pub port: Option<u16>,

    /// Directory where uploaded files are stored (overrides ATTACHMENT_SERVER_STORAGE_DIR)
    #[arg(long)]
    pub storage_dir: Option<String>,

    /// Database URL (overrides ATTACHMENT_SERVER_DATABASE_URL)
    #[arg(long)]
    pub database_url: Option<String>,

    /// Id of the record to serve (overrides ATTACHMENT_SERVER_RECORD_ID)
    #[arg(long)]
    pub record_id: Option<Uuid>,

    /// Run migrations and exit
    #[arg(long, conflicts_with = "register")]
    pub migrate: bool,

    /// Register a record pointing at this storage path and exit (applies the schema first)
    #[arg(long, value_name = "PATH")]
    pub register: Option<String>,
}

impl AppConfig {
    /// Parse environment variables + CLI args into AppConfig and run mode.
    pub fn from_env_and_args() -> Result<(Self, RunMode)> {
        Self::resolve(Args::parse(), |key| env::var(key))
    }

    /// Merge parsed `args` over values looked up through `var`.
    pub fn resolve<F>(args: Args, var: F) -> Result<(Self, RunMode)>
    where
        F: Fn(&str) -> Result<String, env::VarError>,
    {
        // --- Environment fallback ---
        let env_host = var("ATTACHMENT_SERVER_HOST").unwrap_or_else(|_| "0.0.0.0".into());
        let env_port = match var("ATTACHMENT_SERVER_PORT") {
            Ok(value) => value
                .parse::<u16>()
                .with_context(|| format!("parsing ATTACHMENT_SERVER_PORT value `{}`", value))?,
            Err(env::VarError::NotPresent) => 3000,
            Err(err) => return Err(err).context("reading ATTACHMENT_SERVER_PORT"),
        };
        let env_storage =
            var("ATTACHMENT_SERVER_STORAGE_DIR").unwrap_or_else(|_| "./data/files".into());
        let env_db = var("ATTACHMENT_SERVER_DATABASE_URL")
            .unwrap_or_else(|_| "sqlite://./data/meta/attachments.db".into());
        let env_record_id = match var("ATTACHMENT_SERVER_RECORD_ID") {
            Ok(value) if value.trim().is_empty() => None,
            Ok(value) => Some(
                value
                    .trim()
                    .parse::<Uuid>()
                    .with_context(|| format!("parsing ATTACHMENT_SERVER_RECORD_ID value `{}`", value))?,
            ),
            Err(env::VarError::NotPresent) => None,
            Err(err) => return Err(err).context("reading ATTACHMENT_SERVER_RECORD_ID"),
        };

        // --- Merge ---
        let cfg = Self {
            host: args.host.unwrap_or(env_host),
            port: args.port.unwrap_or(env_port),
            storage_dir: args.storage_dir.unwrap_or(env_storage),
            database_url: args.database_url.unwrap_or(env_db),
            record_id: args.record_id.or(env_record_id),
        };

        let mode = match (args.migrate, args.register) {
            (true, _) => RunMode::Migrate,
            (false, Some(path)) => RunMode::Register(path),
            (false, None) => RunMode::Serve,
        };

        Ok((cfg, mode))
    }

    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
