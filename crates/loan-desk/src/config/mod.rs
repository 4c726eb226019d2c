use std::env;
use std::fmt;
use std::fs::File;
use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;

use crate::lending::approval::ApprovalConfig;
use crate::lending::catalog::{CatalogError, CatalogSnapshot};
use crate::lending::service::DEFAULT_MAX_QUOTE_TERM;

/// Distinguishes runtime behavior for different stages of the service.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppEnvironment {
    Development,
    Test,
    Production,
}

impl AppEnvironment {
    fn from_str(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "prod" | "production" => Self::Production,
            "test" | "ci" => Self::Test,
            _ => Self::Development,
        }
    }
}

/// Top-level configuration for the application.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub environment: AppEnvironment,
    pub server: ServerConfig,
    pub telemetry: TelemetryConfig,
    pub lending: LendingConfig,
}

impl AppConfig {
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let environment = AppEnvironment::from_str(
            &env::var("APP_ENV").unwrap_or_else(|_| "development".to_string()),
        );

        let host = env::var("APP_HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
        let port = env::var("APP_PORT")
            .unwrap_or_else(|_| "3000".to_string())
            .parse::<u16>()
            .map_err(|_| ConfigError::InvalidPort)?;

        let log_level = env::var("APP_LOG_LEVEL").unwrap_or_else(|_| "info".to_string());
        let log_format = LogFormat::from_str(
            &env::var("APP_LOG_FORMAT").unwrap_or_else(|_| "compact".to_string()),
        );

        let max_quote_term = match env::var("APP_MAX_QUOTE_TERM") {
            Ok(raw) => raw
                .trim()
                .parse::<u32>()
                .ok()
                .filter(|term| *term > 0)
                .ok_or(ConfigError::InvalidMaxQuoteTerm { value: raw })?,
            Err(_) => DEFAULT_MAX_QUOTE_TERM,
        };

        Ok(Self {
            environment,
            server: ServerConfig { host, port },
            telemetry: TelemetryConfig {
                log_level,
                log_format,
            },
            lending: LendingConfig {
                approval_rules_path: optional_path("APP_APPROVAL_RULES"),
                catalog_path: optional_path("APP_CATALOG_CSV"),
                max_quote_term,
            },
        })
    }
}

fn optional_path(key: &str) -> Option<PathBuf> {
    env::var(key)
        .ok()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
        .map(PathBuf::from)
}

/// Settings controlling the HTTP server binding.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl ServerConfig {
    pub fn socket_addr(&self) -> Result<SocketAddr, ConfigError> {
        if self.host.eq_ignore_ascii_case("localhost") {
            return Ok(SocketAddr::new(IpAddr::from([127, 0, 0, 1]), self.port));
        }

        let ip: IpAddr = self
            .host
            .parse()
            .map_err(|source| ConfigError::InvalidHost { source })?;

        Ok(SocketAddr::new(ip, self.port))
    }
}

/// Output layout for log lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Compact,
    Json,
}

impl LogFormat {
    fn from_str(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "json" => Self::Json,
            _ => Self::Compact,
        }
    }
}

/// Tracing and metrics controls.
#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    pub log_level: String,
    pub log_format: LogFormat,
}

/// Where the lending rules and reference data come from.
#[derive(Debug, Clone)]
pub struct LendingConfig {
    /// JSON threshold table; the built-in table applies when unset.
    pub approval_rules_path: Option<PathBuf>,
    /// Product catalog CSV; callers fall back to their own seed data when unset.
    pub catalog_path: Option<PathBuf>,
    pub max_quote_term: u32,
}

impl Default for LendingConfig {
    fn default() -> Self {
        Self {
            approval_rules_path: None,
            catalog_path: None,
            max_quote_term: DEFAULT_MAX_QUOTE_TERM,
        }
    }
}

impl LendingConfig {
    pub fn approval_config(&self) -> Result<ApprovalConfig, ConfigError> {
        let Some(path) = &self.approval_rules_path else {
            return Ok(ApprovalConfig::default());
        };

        let file = File::open(path).map_err(|source| ConfigError::ApprovalRulesIo {
            path: path.clone(),
            source,
        })?;
        ApprovalConfig::from_reader(file).map_err(|source| ConfigError::ApprovalRules {
            path: path.clone(),
            source,
        })
    }

    /// `Ok(None)` when no catalog file is configured.
    pub fn catalog(&self) -> Result<Option<CatalogSnapshot>, ConfigError> {
        let Some(path) = &self.catalog_path else {
            return Ok(None);
        };

        CatalogSnapshot::from_path(path)
            .map(Some)
            .map_err(|source| ConfigError::Catalog {
                path: path.clone(),
                source,
            })
    }
}

#[derive(Debug)]
pub enum ConfigError {
    InvalidPort,
    InvalidHost { source: std::net::AddrParseError },
    InvalidMaxQuoteTerm { value: String },
    ApprovalRulesIo { path: PathBuf, source: std::io::Error },
    ApprovalRules { path: PathBuf, source: serde_json::Error },
    Catalog { path: PathBuf, source: CatalogError },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidPort => write!(f, "APP_PORT must be a valid u16"),
            ConfigError::InvalidHost { .. } => {
                write!(f, "APP_HOST must parse to an IPv4 or IPv6 address")
            }
            ConfigError::InvalidMaxQuoteTerm { value } => {
                write!(f, "APP_MAX_QUOTE_TERM must be a positive month count, got '{value}'")
            }
            ConfigError::ApprovalRulesIo { path, .. } => {
                write!(f, "unable to open approval rules at {}", path.display())
            }
            ConfigError::ApprovalRules { path, source } => {
                write!(f, "invalid approval rules in {}: {source}", path.display())
            }
            ConfigError::Catalog { path, source } => {
                write!(f, "unable to load catalog {}: {source}", path.display())
            }
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::InvalidPort | ConfigError::InvalidMaxQuoteTerm { .. } => None,
            ConfigError::InvalidHost { source } => Some(source),
            ConfigError::ApprovalRulesIo { source, .. } => Some(source),
            ConfigError::ApprovalRules { source, .. } => Some(source),
            ConfigError::Catalog { source, .. } => Some(source),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use std::env;
    use std::io::Write;
    use std::sync::{Mutex, OnceLock};

    fn env_guard() -> &'static Mutex<()> {
        static GUARD: OnceLock<Mutex<()>> = OnceLock::new();
        GUARD.get_or_init(|| Mutex::new(()))
    }

    fn reset_env() {
        env::remove_var("APP_ENV");
        env::remove_var("APP_HOST");
        env::remove_var("APP_PORT");
        env::remove_var("APP_LOG_LEVEL");
        env::remove_var("APP_LOG_FORMAT");
        env::remove_var("APP_APPROVAL_RULES");
        env::remove_var("APP_CATALOG_CSV");
        env::remove_var("APP_MAX_QUOTE_TERM");
    }

    fn scratch_file(name: &str, contents: &str) -> PathBuf {
        let path = env::temp_dir().join(format!("loan-desk-{}-{name}", std::process::id()));
        let mut file = File::create(&path).expect("scratch file created");
        file.write_all(contents.as_bytes())
            .expect("scratch file written");
        path
    }

    #[test]
    fn load_uses_defaults_when_env_missing() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        let config = AppConfig::load().expect("config loads with defaults");
        assert_eq!(config.environment, AppEnvironment::Development);
        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.server.port, 3000);
        assert_eq!(config.telemetry.log_level, "info");
        assert_eq!(config.telemetry.log_format, LogFormat::Compact);
        assert_eq!(config.lending.max_quote_term, DEFAULT_MAX_QUOTE_TERM);
        assert!(config.lending.approval_rules_path.is_none());
        assert!(config.lending.catalog_path.is_none());
    }

    #[test]
    fn accepts_localhost_host() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        env::set_var("APP_HOST", "localhost");
        let config = AppConfig::load().expect("config loads");
        let addr = config.server.socket_addr().expect("localhost resolves");
        assert_eq!(addr, SocketAddr::new(IpAddr::from([127, 0, 0, 1]), 3000));
        reset_env();
    }

    #[test]
    fn reads_lending_settings_from_env() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        env::set_var("APP_ENV", "production");
        env::set_var("APP_LOG_FORMAT", "JSON");
        env::set_var("APP_MAX_QUOTE_TERM", "240");
        env::set_var("APP_CATALOG_CSV", "/srv/lending/catalog.csv");

        let config = AppConfig::load().expect("config loads");
        assert_eq!(config.environment, AppEnvironment::Production);
        assert_eq!(config.telemetry.log_format, LogFormat::Json);
        assert_eq!(config.lending.max_quote_term, 240);
        assert_eq!(
            config.lending.catalog_path,
            Some(PathBuf::from("/srv/lending/catalog.csv"))
        );
        reset_env();
    }

    #[test]
    fn rejects_non_numeric_quote_term() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        env::set_var("APP_MAX_QUOTE_TERM", "forever");

        let error = AppConfig::load().expect_err("term must be numeric");
        assert!(matches!(error, ConfigError::InvalidMaxQuoteTerm { .. }));
        reset_env();
    }

    #[test]
    fn approval_rules_fall_back_to_defaults() {
        let config = LendingConfig::default();
        assert_eq!(
            config.approval_config().expect("defaults"),
            ApprovalConfig::default()
        );
        assert!(config.catalog().expect("no catalog configured").is_none());
    }

    #[test]
    fn approval_rules_load_from_json_file() {
        let mut rules = ApprovalConfig::default();
        rules.minimum_income = dec!(7500);
        let path = scratch_file(
            "rules.json",
            &serde_json::to_string(&rules).expect("rules serialize"),
        );

        let config = LendingConfig {
            approval_rules_path: Some(path.clone()),
            ..LendingConfig::default()
        };
        let loaded = config.approval_config().expect("rules load");
        assert_eq!(loaded.minimum_income, dec!(7500));
        std::fs::remove_file(path).ok();
    }

    #[test]
    fn missing_files_report_their_path() {
        let config = LendingConfig {
            approval_rules_path: Some(PathBuf::from("/nonexistent/rules.json")),
            catalog_path: Some(PathBuf::from("/nonexistent/catalog.csv")),
            max_quote_term: DEFAULT_MAX_QUOTE_TERM,
        };

        let rules_error = config.approval_config().expect_err("missing rules file");
        assert!(rules_error.to_string().contains("/nonexistent/rules.json"));

        let catalog_error = config.catalog().expect_err("missing catalog file");
        assert!(matches!(catalog_error, ConfigError::Catalog { .. }));
        assert!(catalog_error.to_string().contains("/nonexistent/catalog.csv"));
    }
}
