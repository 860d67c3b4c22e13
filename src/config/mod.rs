//! Configuration management module
//!
//! Provides configuration management with:
//! - TOML-based configuration files
//! - `MODAL_FORM_*` environment variable overrides
//! - Validation

use ::config::Map;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::fs;
use tracing::{debug, info, warn};

use crate::error::{AppError, AppResult};

/// Prefix for environment overrides, e.g. `MODAL_FORM_MODAL__SUBMIT_DELAY_MS=0`
pub const ENV_PREFIX: &str = "MODAL_FORM";

/// Project-local configuration file, read relative to the working directory
pub const LOCAL_CONFIG_FILE: &str = "modal-form.toml";

/// Main application configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Application settings
    pub app: AppConfig,
    /// Modal request/response behaviour
    pub modal: ModalConfig,
    /// UI configuration
    pub ui: UIConfig,
}

impl Config {
    /// Load configuration from default locations
    ///
    /// Layers, later ones winning:
    /// 1. Default configuration
    /// 2. ~/.config/modal-form/config.toml
    /// 3. ./modal-form.toml
    /// 4. `MODAL_FORM_*` environment variables
    ///
    /// Missing files are skipped. A file that exists but does not parse or
    /// validate is an error.
    pub async fn load() -> AppResult<Self> {
        info!("Loading application configuration");

        let mut files = Vec::new();
        if let Some(config_path) = Self::get_user_config_path() {
            files.push(config_path);
        }
        files.push(PathBuf::from(LOCAL_CONFIG_FILE));

        for path in &files {
            if fs::metadata(path).await.is_ok() {
                info!("Reading configuration from {}", path.display());
            }
        }

        Self::load_layered(&files, None)
    }

    /// Load configuration from a specific file, layered with environment overrides
    pub async fn load_from_file<P: AsRef<Path>>(path: P) -> AppResult<Self> {
        let path = path.as_ref();
        debug!("Loading configuration from: {}", path.display());

        let content = fs::read_to_string(path).await.map_err(AppError::Io)?;

        let config: Config = ::config::Config::builder()
            .add_source(::config::File::from_str(
                &content,
                ::config::FileFormat::Toml,
            ))
            .add_source(Self::environment(None))
            .build()?
            .try_deserialize()?;

        config.validate()?;

        Ok(config)
    }

    /// Build from optional files plus the environment
    ///
    /// `env` replaces the process environment when given.
    fn load_layered(files: &[PathBuf], env: Option<Map<String, String>>) -> AppResult<Self> {
        let mut builder = ::config::Config::builder();
        for path in files {
            builder = builder.add_source(
                ::config::File::from(path.as_path())
                    .format(::config::FileFormat::Toml)
                    .required(false),
            );
        }

        let config = match builder
            .add_source(Self::environment(env))
            .build()
            .and_then(|built| built.try_deserialize::<Config>())
        {
            Ok(config) => config,
            Err(e) => {
                warn!("Failed to read configuration: {}", e);
                return Err(e.into());
            }
        };

        if let Err(e) = config.validate() {
            warn!("Rejected configuration: {}", e);
            return Err(e);
        }

        Ok(config)
    }

    /// `MODAL_FORM_<SECTION>__<KEY>`, e.g. `MODAL_FORM_MODAL__SUBMIT_DELAY_MS`
    fn environment(source: Option<Map<String, String>>) -> ::config::Environment {
        ::config::Environment::with_prefix(ENV_PREFIX)
            .prefix_separator("_")
            .separator("__")
            .try_parsing(true)
            .source(source)
    }

    /// Save configuration to a file
    pub async fn save_to_file<P: AsRef<Path>>(&self, path: P) -> AppResult<()> {
        let path = path.as_ref();
        debug!("Saving configuration to: {}", path.display());

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).await.map_err(AppError::Io)?;
        }

        let content = toml::to_string_pretty(self).map_err(|e| {
            AppError::application(format!("Failed to serialize config: {}", e))
        })?;

        fs::write(path, content).await.map_err(AppError::Io)?;

        info!("Configuration saved to: {}", path.display());
        Ok(())
    }

    /// Validate configuration
    pub fn validate(&self) -> AppResult<()> {
        debug!("Validating configuration");

        if self.modal.request_timeout_ms == Some(0) {
            return Err(AppError::application(
                "request_timeout_ms must be greater than 0 when set",
            ));
        }

        if self.ui.refresh_rate_ms == 0 {
            return Err(AppError::application(
                "refresh_rate_ms must be greater than 0",
            ));
        }

        for (name, percent) in [
            ("modal_width_percent", self.ui.modal_width_percent),
            ("modal_height_percent", self.ui.modal_height_percent),
        ] {
            if !(20..=100).contains(&percent) {
                return Err(AppError::application(format!(
                    "{} must be between 20 and 100",
                    name
                )));
            }
        }

        debug!("Configuration validation passed");
        Ok(())
    }

    /// Get user configuration directory path
    fn get_user_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|mut path| {
            path.push("modal-form");
            path.push("config.toml");
            path
        })
    }
}

/// Application-level configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Application name
    pub name: String,
    /// Application version
    pub version: String,
    /// Debug mode
    pub debug: bool,
    /// Log level
    pub log_level: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            name: "Modal Form".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            debug: cfg!(debug_assertions),
            log_level: if cfg!(debug_assertions) {
                "debug"
            } else {
                "info"
            }
            .to_string(),
        }
    }
}

/// What happens when a second request arrives while one is pending
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReentryPolicy {
    /// Fail the second request with a misuse error
    #[default]
    Reject,
    /// Hold the second request until the current one resolves
    Queue,
    /// Settle the current request with `None` and replace it
    Supersede,
}

/// Modal request/response configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ModalConfig {
    /// Dialog title, announced first when the dialog opens
    pub title: String,
    /// Optional dialog description
    pub description: Option<String>,
    /// Policy for a request issued while another is pending
    pub reentry_policy: ReentryPolicy,
    /// Resolve a pending request with `None` after this many milliseconds
    pub request_timeout_ms: Option<u64>,
    /// Delay between a valid submit and the submit callback
    pub submit_delay_ms: u64,
    /// Close (cancel) when the backdrop is clicked
    pub close_on_backdrop_click: bool,
}

impl ModalConfig {
    pub fn request_timeout(&self) -> Option<Duration> {
        self.request_timeout_ms.map(Duration::from_millis)
    }

    pub fn submit_delay(&self) -> Duration {
        Duration::from_millis(self.submit_delay_ms)
    }
}

impl Default for ModalConfig {
    fn default() -> Self {
        Self {
            title: "신청 폼".to_string(),
            description: Some(
                "이메일과 FE 경력 연차 등 간단한 정보를 입력해주세요.".to_string(),
            ),
            reentry_policy: ReentryPolicy::default(),
            request_timeout_ms: None,
            submit_delay_ms: 500,
            close_on_backdrop_click: true,
        }
    }
}

/// UI configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct UIConfig {
    /// Theme name
    pub theme: String,
    /// Enable mouse support
    pub enable_mouse: bool,
    /// Event poll interval in milliseconds
    pub refresh_rate_ms: u64,
    /// Modal width as a percentage of the terminal
    pub modal_width_percent: u16,
    /// Modal height as a percentage of the terminal
    pub modal_height_percent: u16,
}

impl Default for UIConfig {
    fn default() -> Self {
        Self {
            theme: "default".to_string(),
            enable_mouse: true,
            refresh_rate_ms: 100,
            modal_width_percent: 60,
            modal_height_percent: 80,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_validate() {
        let config = Config::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.modal.reentry_policy, ReentryPolicy::Reject);
        assert_eq!(config.modal.submit_delay(), Duration::from_millis(500));
        assert!(config.modal.request_timeout().is_none());
    }

    #[test]
    fn test_zero_timeout_rejected() {
        let mut config = Config::default();
        config.modal.request_timeout_ms = Some(0);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_modal_size_bounds() {
        let mut config = Config::default();
        config.ui.modal_width_percent = 10;
        assert!(config.validate().is_err());

        config.ui.modal_width_percent = 100;
        config.ui.modal_height_percent = 101;
        assert!(config.validate().is_err());
    }

    #[tokio::test]
    async fn test_partial_file_uses_defaults() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("modal-form.toml");
        std::fs::write(
            &path,
            "[modal]\nreentry_policy = \"queue\"\nsubmit_delay_ms = 0\n",
        )
        .expect("write config");

        let config = Config::load_from_file(&path).await.expect("load config");
        assert_eq!(config.modal.reentry_policy, ReentryPolicy::Queue);
        assert_eq!(config.modal.submit_delay_ms, 0);
        assert_eq!(config.modal.title, "신청 폼");
        assert_eq!(config.ui, UIConfig::default());
    }

    #[tokio::test]
    async fn test_save_then_load() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("nested").join("config.toml");

        let mut config = Config::default();
        config.modal.request_timeout_ms = Some(30_000);
        config.ui.theme = "dark".to_string();
        config.save_to_file(&path).await.expect("save config");

        let loaded = Config::load_from_file(&path).await.expect("load config");
        assert_eq!(loaded.modal.request_timeout_ms, Some(30_000));
        assert_eq!(loaded.ui.theme, "dark");
    }

    fn env(pairs: &[(&str, &str)]) -> Option<Map<String, String>> {
        Some(
            pairs
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        )
    }

    #[test]
    fn test_env_overrides_file() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("modal-form.toml");
        std::fs::write(&path, "[modal]\nsubmit_delay_ms = 500\n").expect("write config");

        let config = Config::load_layered(
            &[path],
            env(&[
                ("MODAL_FORM_MODAL__SUBMIT_DELAY_MS", "0"),
                ("MODAL_FORM_MODAL__REENTRY_POLICY", "queue"),
            ]),
        )
        .expect("load config");
        assert_eq!(config.modal.submit_delay_ms, 0);
        assert_eq!(config.modal.reentry_policy, ReentryPolicy::Queue);
    }

    #[test]
    fn test_env_applies_without_file() {
        let dir = tempfile::tempdir().expect("tempdir");
        let missing = dir.path().join("absent.toml");

        let config = Config::load_layered(
            &[missing],
            env(&[
                ("MODAL_FORM_MODAL__SUBMIT_DELAY_MS", "0"),
                ("MODAL_FORM_UI__THEME", "dark"),
                ("MODAL_FORM_DEMO_MODE", "1"),
                ("OTHER_MODAL__SUBMIT_DELAY_MS", "9"),
            ]),
        )
        .expect("load config");
        assert_eq!(config.modal.submit_delay_ms, 0);
        assert_eq!(config.ui.theme, "dark");
        assert_eq!(config.app, AppConfig::default());
    }

    #[test]
    fn test_missing_files_give_defaults() {
        let dir = tempfile::tempdir().expect("tempdir");
        let config = Config::load_layered(&[dir.path().join("absent.toml")], env(&[]))
            .expect("load config");
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_later_file_wins() {
        let dir = tempfile::tempdir().expect("tempdir");
        let user = dir.path().join("user.toml");
        let local = dir.path().join("local.toml");
        std::fs::write(&user, "[ui]\ntheme = \"light\"\nrefresh_rate_ms = 50\n")
            .expect("write user config");
        std::fs::write(&local, "[ui]\ntheme = \"dark\"\n").expect("write local config");

        let config = Config::load_layered(&[user, local], env(&[])).expect("load config");
        assert_eq!(config.ui.theme, "dark");
        assert_eq!(config.ui.refresh_rate_ms, 50);
    }

    #[test]
    fn test_invalid_layered_file_is_an_error() {
        let dir = tempfile::tempdir().expect("tempdir");
        let broken = dir.path().join("broken.toml");
        let invalid = dir.path().join("invalid.toml");
        std::fs::write(&broken, "[modal\nsubmit_delay_ms = ").expect("write config");
        std::fs::write(&invalid, "[ui]\nrefresh_rate_ms = 0\n").expect("write config");

        assert!(Config::load_layered(&[broken], env(&[])).is_err());
        assert!(Config::load_layered(&[invalid], env(&[])).is_err());
    }

    #[tokio::test]
    async fn test_invalid_file_fails_validation() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("modal-form.toml");
        std::fs::write(&path, "[ui]\nrefresh_rate_ms = 0\n").expect("write config");

        assert!(Config::load_from_file(&path).await.is_err());
    }
}
