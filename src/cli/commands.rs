//! Command implementations

use anyhow::{Context, Result};
use tracing::{error, info};

use crate::adapters::toml_config::AppConfig;
use crate::adapters::tracing_log::init_logging;
use crate::app::audit_interactor::AuditRequest;
use crate::app::container::{AppContainer, DefaultAppContainer};
use crate::cli::args::overrides;
use crate::cli::Cli;
use crate::error::LocatorResult;

/// Resolve configuration from file, environment and flags
pub fn load_config(cli: &Cli) -> LocatorResult<AppConfig> {
    let mut config = AppConfig::discover(cli.audit.config.as_deref())?;
    config.apply(overrides(&cli.audit, &cli.log));
    config.validate()?;
    Ok(config)
}

/// Execute the audit; `Ok(false)` when the run was aborted
pub async fn audit(cli: Cli) -> Result<bool> {
    let config = load_config(&cli).context("Failed to load configuration")?;
    init_logging(&config.logging).context("Failed to initialize logging")?;

    info!("Starting Clean Music Locator");

    let container =
        DefaultAppContainer::new(&config).context("Failed to set up audit components")?;
    let interactor = container.audit_interactor();

    let request = AuditRequest::new(&cli.audit.directory).with_sleep_ms(config.scan.sleep_ms);
    let summary = interactor
        .execute(request)
        .await
        .with_context(|| format!("Audit of {} failed", cli.audit.directory.display()))?;

    let rendered = interactor.render(&summary, cli.audit.output)?;
    print!("{}", rendered);
    if !rendered.ends_with('\n') {
        println!();
    }

    if summary.aborted {
        error!(
            reason = summary.abort_reason.as_deref().unwrap_or("unknown"),
            "Audit aborted"
        );
        return Ok(false);
    }
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::errors::ConfigError;
    use crate::error::LocatorError;
    use clap::Parser;

    #[test]
    fn test_unreadable_config_is_config_error() {
        let cli = Cli::try_parse_from([
            "clean-locator",
            "/music",
            "--config",
            "/definitely/not/here/clean_locator.toml",
        ])
        .unwrap();
        let err = load_config(&cli).unwrap_err();
        assert!(matches!(err, LocatorError::Config(ConfigError::Read { .. })));
    }

    #[test]
    fn test_flags_complete_config_file() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("settings.toml");
        std::fs::write(&file, "[scan]\nsleep_ms = 5\n").unwrap();

        let cli = Cli::try_parse_from([
            "clean-locator",
            "/music",
            "--config",
            file.to_str().unwrap(),
            "--token",
            "secret",
            "--probe-timeout",
            "2.5",
        ])
        .unwrap();
        let config = load_config(&cli).unwrap();
        assert_eq!(config.scan.sleep_ms, 5);
        assert_eq!(config.catalog.token.as_deref(), Some("secret"));
        assert_eq!(config.probe.timeout_secs, 2.5);
    }

    #[test]
    fn test_oversized_probe_timeout_is_rejected() {
        let cli = Cli::try_parse_from([
            "clean-locator",
            "/music",
            "--config",
            "/dev/null",
            "--token",
            "secret",
            "--probe-timeout",
            "1e20",
        ])
        .unwrap();
        let err = load_config(&cli).unwrap_err();
        assert!(matches!(err, LocatorError::Config(ConfigError::Invalid(_))));
    }
}
