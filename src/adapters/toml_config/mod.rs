// TOML config adapter - Typed configuration loaded from TOML files

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::domain::errors::ConfigError;
use crate::domain::rules::{default_extensions, ExtensionMatcher, MatchMode};

/// Config file picked up from the working directory when none is given
pub const DEFAULT_CONFIG_FILE: &str = "clean_locator.toml";

pub const DEFAULT_ENDPOINT: &str = "https://isrc-api.soundexchange.com/api/ext/recordings";

/// Root configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AppConfig {
    pub catalog: CatalogConfig,
    pub probe: ProbeConfig,
    pub store: StoreConfig,
    pub scan: ScanConfig,
    pub logging: LoggingConfig,
}

/// Remote catalog access
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CatalogConfig {
    pub endpoint: String,
    /// API token; never has a built-in value
    pub token: Option<String>,
    /// Authorization scheme placed before the token
    pub auth_scheme: String,
    pub request_timeout_secs: u64,
    pub search_page_size: u32,
    pub lookup_page_size: u32,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            token: None,
            auth_scheme: "Token".to_string(),
            request_timeout_secs: 30,
            search_page_size: 100,
            lookup_page_size: 10,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ProbeConfig {
    /// Program name looked up in `PATH`, or a path to an executable
    pub command: String,
    pub timeout_secs: f64,
    pub verify_local_mediafile: bool,
}

impl Default for ProbeConfig {
    fn default() -> Self {
        Self {
            command: "ffprobe".to_string(),
            timeout_secs: 10.0,
            verify_local_mediafile: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct StoreConfig {
    pub database: PathBuf,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            database: PathBuf::from("music.db"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ScanConfig {
    pub extensions: Vec<String>,
    pub match_mode: MatchMode,
    /// Pause after each track that reached the catalog
    pub sleep_ms: u64,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            extensions: default_extensions(),
            match_mode: MatchMode::default(),
            sleep_ms: 1000,
        }
    }
}

impl ScanConfig {
    pub fn matcher(&self) -> ExtensionMatcher {
        ExtensionMatcher::new(self.extensions.clone(), self.match_mode)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LoggingConfig {
    pub level: String,
    pub json: bool,
    /// Append log lines to this file instead of stderr
    pub file: Option<PathBuf>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
            file: None,
        }
    }
}

/// Values supplied on the command line (or through its environment bindings)
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub sleep_ms: Option<u64>,
    pub database: Option<PathBuf>,
    pub token: Option<String>,
    pub endpoint: Option<String>,
    pub probe_timeout_secs: Option<f64>,
    pub log_level: Option<String>,
    pub log_file: Option<PathBuf>,
    pub log_json: bool,
}

impl AppConfig {
    pub fn from_toml_str(content: &str, path: &Path) -> Result<Self, ConfigError> {
        toml::from_str(content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn load_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&content, path)
    }

    /// Load `explicit` if given, else the default file when present, else defaults
    pub fn discover(explicit: Option<&Path>) -> Result<Self, ConfigError> {
        match explicit {
            Some(path) => Self::load_file(path),
            None => {
                let default_path = Path::new(DEFAULT_CONFIG_FILE);
                if default_path.is_file() {
                    Self::load_file(default_path)
                } else {
                    Ok(Self::default())
                }
            }
        }
    }

    /// Layer command-line values over the loaded file
    pub fn apply(&mut self, overrides: ConfigOverrides) {
        if let Some(sleep_ms) = overrides.sleep_ms {
            self.scan.sleep_ms = sleep_ms;
        }
        if let Some(database) = overrides.database {
            self.store.database = database;
        }
        if let Some(token) = overrides.token {
            self.catalog.token = Some(token);
        }
        if let Some(endpoint) = overrides.endpoint {
            self.catalog.endpoint = endpoint;
        }
        if let Some(timeout) = overrides.probe_timeout_secs {
            self.probe.timeout_secs = timeout;
        }
        if let Some(level) = overrides.log_level {
            self.logging.level = level;
        }
        if let Some(file) = overrides.log_file {
            self.logging.file = Some(file);
        }
        if overrides.log_json {
            self.logging.json = true;
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let timeout = self.probe.timeout_secs;
        let representable = Duration::try_from_secs_f64(timeout).is_ok();
        if !timeout.is_finite() || timeout <= 0.0 || !representable {
            return Err(ConfigError::Invalid(format!(
                "probe.timeout_secs must be a positive number, got {}",
                self.probe.timeout_secs
            )));
        }
        if self.probe.command.trim().is_empty() {
            return Err(ConfigError::Invalid(
                "probe.command cannot be empty".to_string(),
            ));
        }
        if self.catalog.request_timeout_secs == 0 {
            return Err(ConfigError::Invalid(
                "catalog.request_timeout_secs must be greater than zero".to_string(),
            ));
        }
        if self.catalog.endpoint.trim().is_empty() {
            return Err(ConfigError::Invalid(
                "catalog.endpoint cannot be empty".to_string(),
            ));
        }
        if self
            .catalog
            .token
            .as_deref()
            .map_or(true, |t| t.trim().is_empty())
        {
            return Err(ConfigError::Invalid(
                "a catalog API token is required (catalog.token, --token or CLEAN_LOCATOR_TOKEN)"
                    .to_string(),
            ));
        }
        if self.scan.extensions.is_empty() || self.scan.extensions.iter().any(|e| e.is_empty()) {
            return Err(ConfigError::Invalid(
                "scan.extensions must list at least one non-empty extension".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn with_token() -> AppConfig {
        let mut config = AppConfig::default();
        config.catalog.token = Some("secret".to_string());
        config
    }

    #[test]
    fn test_defaults() {
        let config = AppConfig::default();
        assert_eq!(config.catalog.endpoint, DEFAULT_ENDPOINT);
        assert_eq!(config.catalog.auth_scheme, "Token");
        assert_eq!(config.catalog.request_timeout_secs, 30);
        assert_eq!(config.probe.command, "ffprobe");
        assert_eq!(config.probe.timeout_secs, 10.0);
        assert_eq!(config.store.database, PathBuf::from("music.db"));
        assert_eq!(config.scan.extensions, vec![".flac", ".opus", ".mp3"]);
        assert_eq!(config.scan.match_mode, MatchMode::Substring);
        assert_eq!(config.scan.sleep_ms, 1000);
        assert_eq!(config.logging.level, "info");
        assert!(config.catalog.token.is_none());
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let config = AppConfig::from_toml_str(
            r#"
            [catalog]
            token = "abc"

            [scan]
            match_mode = "suffix"
            sleep_ms = 250
            "#,
            Path::new("inline.toml"),
        )
        .unwrap();
        assert_eq!(config.catalog.token.as_deref(), Some("abc"));
        assert_eq!(config.catalog.endpoint, DEFAULT_ENDPOINT);
        assert_eq!(config.scan.match_mode, MatchMode::Suffix);
        assert_eq!(config.scan.sleep_ms, 250);
        assert_eq!(config.probe, ProbeConfig::default());
    }

    #[test]
    fn test_unknown_key_is_parse_error() {
        let err = AppConfig::from_toml_str("[scan]\nsleep = 5\n", Path::new("bad.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
    }

    #[test]
    fn test_load_file() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "[store]\ndatabase = \"/tmp/library.db\"").unwrap();
        let config = AppConfig::load_file(file.path()).unwrap();
        assert_eq!(config.store.database, PathBuf::from("/tmp/library.db"));
    }

    #[test]
    fn test_missing_explicit_file_is_read_error() {
        let err = AppConfig::discover(Some(Path::new("/definitely/not/here.toml"))).unwrap_err();
        assert!(matches!(err, ConfigError::Read { .. }));
    }

    #[test]
    fn test_overrides_win() {
        let mut config = with_token();
        config.apply(ConfigOverrides {
            sleep_ms: Some(0),
            database: Some(PathBuf::from("other.db")),
            token: Some("cli-token".to_string()),
            endpoint: Some("http://127.0.0.1:9/api".to_string()),
            probe_timeout_secs: Some(2.5),
            log_level: Some("debug".to_string()),
            log_file: Some(PathBuf::from("run.log")),
            log_json: true,
        });
        assert_eq!(config.scan.sleep_ms, 0);
        assert_eq!(config.store.database, PathBuf::from("other.db"));
        assert_eq!(config.catalog.token.as_deref(), Some("cli-token"));
        assert_eq!(config.catalog.endpoint, "http://127.0.0.1:9/api");
        assert_eq!(config.probe.timeout_secs, 2.5);
        assert_eq!(config.logging.level, "debug");
        assert_eq!(config.logging.file, Some(PathBuf::from("run.log")));
        assert!(config.logging.json);
    }

    #[test]
    fn test_empty_overrides_change_nothing() {
        let mut config = with_token();
        config.apply(ConfigOverrides::default());
        assert_eq!(config, with_token());
    }

    #[test]
    fn test_validate() {
        assert!(with_token().validate().is_ok());

        let missing_token = AppConfig::default();
        assert!(matches!(missing_token.validate(), Err(ConfigError::Invalid(_))));

        let mut bad_timeout = with_token();
        bad_timeout.probe.timeout_secs = 0.0;
        assert!(bad_timeout.validate().is_err());

        let mut huge_timeout = with_token();
        huge_timeout.probe.timeout_secs = 1e20;
        assert!(matches!(huge_timeout.validate(), Err(ConfigError::Invalid(_))));

        let mut no_extensions = with_token();
        no_extensions.scan.extensions.clear();
        assert!(no_extensions.validate().is_err());

        let mut zero_request_timeout = with_token();
        zero_request_timeout.catalog.request_timeout_secs = 0;
        assert!(zero_request_timeout.validate().is_err());
    }
}
