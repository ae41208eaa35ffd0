use clap::{ArgAction, Parser};
use std::env;
use std::path::PathBuf;
use thiserror::Error;

/// Default directory for uploaded photos.
pub const DEFAULT_UPLOADS_DIR: &str = "uploads";

/// Errors encountered while assembling the runtime configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Option or environment variable contained a value that could not be used.
    #[error("Invalid value for {name}: {reason}")]
    InvalidValue {
        /// Option or variable name.
        name: String,
        /// Why the value was rejected.
        reason: String,
    },
}

/// Command-line options accepted by the server binary.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "inventory-server",
    about = "Inventory registration service",
    disable_help_flag = true
)]
pub struct Cli {
    /// Address to bind the HTTP server to.
    #[arg(short = 'h', long)]
    pub host: String,
    /// Port to bind the HTTP server to.
    #[arg(short, long)]
    pub port: u16,
    /// Cache directory, created on startup when missing.
    #[arg(short, long)]
    pub cache: PathBuf,
    /// Print help.
    #[arg(long, action = ArgAction::Help)]
    #[allow(dead_code)]
    help: Option<bool>,
}

/// Runtime configuration for the inventory server.
#[derive(Debug, Clone)]
pub struct Config {
    /// Host name or address the listener binds to.
    pub host: String,
    /// Port the listener binds to.
    pub port: u16,
    /// Cache directory ensured at startup.
    pub cache_dir: PathBuf,
    /// Directory uploaded photos are written to and served from.
    pub uploads_dir: PathBuf,
    /// Externally visible base URL; derived from host and port when unset.
    pub public_url: Option<String>,
}

impl Config {
    /// Parse the command line and merge optional settings from the environment (and `.env`).
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        let config = Self::from_cli(Cli::parse())?;
        tracing::debug!(
            host = %config.host,
            port = config.port,
            cache_dir = %config.cache_dir.display(),
            uploads_dir = %config.uploads_dir.display(),
            public_url = %config.public_url(),
            "Loaded configuration"
        );
        Ok(config)
    }

    /// Combine parsed CLI options with `INVENTORY_UPLOADS_DIR` and `INVENTORY_PUBLIC_URL`.
    pub fn from_cli(cli: Cli) -> Result<Self, ConfigError> {
        Self::from_parts(
            cli,
            load_env_optional("INVENTORY_UPLOADS_DIR"),
            load_env_optional("INVENTORY_PUBLIC_URL"),
        )
    }

    fn from_parts(
        cli: Cli,
        uploads_dir: Option<String>,
        public_url: Option<String>,
    ) -> Result<Self, ConfigError> {
        if cli.host.trim().is_empty() {
            return Err(ConfigError::InvalidValue {
                name: "--host".into(),
                reason: "must not be empty".into(),
            });
        }
        let public_url = public_url
            .map(|url| {
                if url.starts_with("http://") || url.starts_with("https://") {
                    Ok(url.trim_end_matches('/').to_string())
                } else {
                    Err(ConfigError::InvalidValue {
                        name: "INVENTORY_PUBLIC_URL".into(),
                        reason: format!("'{url}' must start with http:// or https://"),
                    })
                }
            })
            .transpose()?;

        Ok(Self {
            host: cli.host,
            port: cli.port,
            cache_dir: cli.cache,
            uploads_dir: uploads_dir
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_UPLOADS_DIR)),
            public_url,
        })
    }

    /// Base URL used when building absolute links to item photos.
    pub fn public_url(&self) -> String {
        self.public_url
            .clone()
            .unwrap_or_else(|| format!("http://{}:{}", self.host, self.port))
    }
}

fn load_env_optional(key: &str) -> Option<String> {
    env::var(key).ok().filter(|value| !value.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cli(args: &[&str]) -> Result<Cli, clap::Error> {
        Cli::try_parse_from(std::iter::once("inventory-server").chain(args.iter().copied()))
    }

    #[test]
    fn parses_short_options() {
        let cli = cli(&["-h", "127.0.0.1", "-p", "3000", "-c", "./cache"]).expect("parsed");
        assert_eq!(cli.host, "127.0.0.1");
        assert_eq!(cli.port, 3000);
        assert_eq!(cli.cache, PathBuf::from("./cache"));
    }

    #[test]
    fn parses_long_options() {
        let cli = cli(&["--host", "localhost", "--port", "8080", "--cache", "/tmp/c"])
            .expect("parsed");
        assert_eq!(cli.host, "localhost");
        assert_eq!(cli.port, 8080);
    }

    #[test]
    fn every_option_is_required() {
        assert!(cli(&["-h", "localhost", "-p", "3000"]).is_err());
        assert!(cli(&["-h", "localhost", "-c", "cache"]).is_err());
        assert!(cli(&["-p", "3000", "-c", "cache"]).is_err());
    }

    #[test]
    fn rejects_non_numeric_port() {
        assert!(cli(&["-h", "localhost", "-p", "http", "-c", "cache"]).is_err());
    }

    #[test]
    fn defaults_uploads_dir_and_public_url() {
        let cli = cli(&["-h", "localhost", "-p", "3000", "-c", "cache"]).unwrap();
        let config = Config::from_parts(cli, None, None).expect("config");
        assert_eq!(config.uploads_dir, PathBuf::from(DEFAULT_UPLOADS_DIR));
        assert_eq!(config.public_url(), "http://localhost:3000");
    }

    #[test]
    fn honors_overrides() {
        let cli = cli(&["-h", "0.0.0.0", "-p", "3000", "-c", "cache"]).unwrap();
        let config = Config::from_parts(
            cli,
            Some("/var/photos".into()),
            Some("https://inventory.example.org/".into()),
        )
        .expect("config");
        assert_eq!(config.uploads_dir, PathBuf::from("/var/photos"));
        assert_eq!(config.public_url(), "https://inventory.example.org");
    }

    #[test]
    fn rejects_public_url_without_scheme() {
        let cli = cli(&["-h", "localhost", "-p", "3000", "-c", "cache"]).unwrap();
        let err = Config::from_parts(cli, None, Some("inventory.local".into())).unwrap_err();
        assert!(err.to_string().contains("INVENTORY_PUBLIC_URL"));
    }
}
