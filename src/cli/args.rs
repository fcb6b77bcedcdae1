//! Command-line argument definitions

use std::path::PathBuf;

use clap::Args;

use crate::adapters::toml_config::ConfigOverrides;
use crate::app::audit_interactor::SummaryFormat;

/// Arguments for the library audit
#[derive(Args, Debug)]
pub struct AuditArgs {
    /// Root directory of the music to be scanned
    pub directory: PathBuf,

    /// Milliseconds to wait between calls [default: 1000]
    #[arg(short, long, value_name = "MS")]
    pub sleep: Option<u64>,

    /// TOML configuration file [default: ./clean_locator.toml if present]
    #[arg(short, long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// SQLite database of processed tracks
    #[arg(long, value_name = "PATH", env = "CLEAN_LOCATOR_DB")]
    pub db: Option<PathBuf>,

    /// Catalog API token
    #[arg(long, value_name = "TOKEN", env = "CLEAN_LOCATOR_TOKEN", hide_env_values = true)]
    pub token: Option<String>,

    /// Catalog API endpoint
    #[arg(long, value_name = "URL", env = "CLEAN_LOCATOR_ENDPOINT")]
    pub endpoint: Option<String>,

    /// Seconds to wait for the media prober
    #[arg(long, value_name = "SECS")]
    pub probe_timeout: Option<f64>,

    /// Summary output format
    #[arg(short, long, value_enum, default_value_t = SummaryFormat::Text)]
    pub output: SummaryFormat,
}

/// Logging arguments
#[derive(Args, Debug)]
pub struct LogArgs {
    /// Logging level (trace, debug, info, warn, error)
    #[arg(long, value_name = "LEVEL")]
    pub log_level: Option<String>,

    /// Append log lines to this file
    #[arg(long, value_name = "PATH")]
    pub log_file: Option<PathBuf>,

    /// Emit log lines as JSON
    #[arg(long)]
    pub log_json: bool,
}

/// Collect every configuration value given on the command line
pub fn overrides(audit: &AuditArgs, log: &LogArgs) -> ConfigOverrides {
    ConfigOverrides {
        sleep_ms: audit.sleep,
        database: audit.db.clone(),
        token: audit.token.clone(),
        endpoint: audit.endpoint.clone(),
        probe_timeout_secs: audit.probe_timeout,
        log_level: log.log_level.clone(),
        log_file: log.log_file.clone(),
        log_json: log.log_json,
    }
}
