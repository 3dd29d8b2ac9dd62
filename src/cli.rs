//! Command line interface of the `wsn` binary.

use chrono::{DateTime, Utc};
use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};
use wsn_client::{
    client::{API_KEY_VAR, DEFAULT_HOST, HOST_VAR, TOKEN_VAR},
    time::parse_timestamp,
    ClientConfig,
};

pub mod download;
pub mod query;
pub mod upload;

#[derive(Parser)]
#[command(name = "wsn")]
#[command(about = "Query and upload data of the wireless sensor network", long_about = None)]
#[command(version)]
pub struct Options {
    /// Base url of the measurement service
    #[arg(long, env = HOST_VAR, default_value = DEFAULT_HOST, global = true)]
    pub host: String,

    /// Token for the query endpoints
    #[arg(long, env = TOKEN_VAR, hide_env_values = true, global = true)]
    pub token: Option<String>,

    /// Key for the quality controlled data endpoints
    #[arg(long, env = API_KEY_VAR, hide_env_values = true, global = true)]
    pub api_key: Option<String>,

    /// Print the request, timings and debug logs
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

impl Options {
    pub fn client_config(&self) -> ClientConfig {
        ClientConfig {
            token: self.token.clone(),
            api_key: self.api_key.clone(),
            ..ClientConfig::new(self.host.as_str())
        }
    }
}

#[derive(Subcommand)]
pub enum Command {
    /// Query measurements from postgresql or clickhouse
    Query(query::QueryArgs),

    /// Download quality controlled data of one or every station
    Download(download::DownloadArgs),

    /// Upload quality controlled records of a station
    Upload(upload::UploadArgs),
}

/// Accepts RFC 3339, `%Y-%m-%d %H:%M:%S` or `%Y-%m-%d` in local time, or epoch seconds.
pub fn parse_time(s: &str) -> Result<DateTime<Utc>, String> {
    parse_timestamp(s).ok_or_else(|| format!("invalid timestamp {s:?}"))
}

pub fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug"))
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .init();
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    #[test]
    fn cli_definition_is_consistent() {
        Options::command().debug_assert();
    }

    #[test]
    fn global_options_reach_the_config() {
        let options = Options::parse_from([
            "wsn",
            "query",
            "postgresql",
            "--host",
            "http://localhost:8000/",
            "--token",
            "abc",
        ]);
        let config = options.client_config();
        assert_eq!(config.host, "http://localhost:8000");
        assert_eq!(config.token.as_deref(), Some("abc"));
    }

    #[test]
    fn parses_command_line_times() {
        assert_eq!(parse_time("2018-03-01T00:00:00Z").unwrap().timestamp(), 1_519_862_400);
        assert!(parse_time("march").is_err());
    }
}
