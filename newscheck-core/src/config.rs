//! Configuration types for NewsCheck

use crate::analysis::AnalysisSelection;
use crate::capability::{CommandProviderConfig, InvokerConfig};
use crate::error::{NewsCheckError, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Default configuration file looked up in the working directory
pub const CONFIG_FILE: &str = "newscheck.toml";

/// Environment variable naming an extra configuration file
pub const CONFIG_PATH_ENV: &str = "NEWSCHECK_CONFIG_PATH";

/// Prefix for environment overrides (`NEWSCHECK_SERVER__BIND=...`)
pub const ENV_PREFIX: &str = "NEWSCHECK_";

/// Main configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct NewsCheckConfig {
    /// Guarded invoker configuration
    #[serde(default)]
    pub dispatcher: InvokerConfig,

    /// Analyses enabled when the page first loads
    #[serde(default)]
    pub analyses: AnalysisSelection,

    /// Web server configuration
    #[serde(default)]
    pub server: ServerConfig,

    /// External analysis providers keyed by provider id
    #[serde(default)]
    pub providers: BTreeMap<String, CommandProviderConfig>,
}

/// Web server configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Socket address to listen on
    pub bind: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: "127.0.0.1:8501".to_string(),
        }
    }
}

impl NewsCheckConfig {
    /// Load configuration from files and environment variables.
    ///
    /// Loads in this order, later sources overriding earlier ones:
    /// 1. Default configuration
    /// 2. `newscheck.toml` in the working directory
    /// 3. `newscheck/newscheck.toml` in the user config directory
    /// 4. The file named by `NEWSCHECK_CONFIG_PATH`
    /// 5. `NEWSCHECK_*` environment variables (nested keys split on `__`)
    ///
    /// # Errors
    ///
    /// Returns an error if a configuration source is invalid.
    pub fn load() -> Result<Self> {
        Self::load_with(None::<&Path>)
    }

    /// Like [`load`](Self::load), with `path` layered after
    /// `NEWSCHECK_CONFIG_PATH` and before the environment overrides.
    ///
    /// # Errors
    ///
    /// Returns an error if `path` does not exist or a source is invalid.
    pub fn load_with(path: Option<impl AsRef<Path>>) -> Result<Self> {
        use figment::{
            Figment,
            providers::{Env, Format, Serialized, Toml},
        };

        let mut figment = Figment::from(Serialized::defaults(NewsCheckConfig::default()))
            .merge(Toml::file(CONFIG_FILE));

        if let Some(user_file) = Self::user_config_path() {
            figment = figment.merge(Toml::file(user_file));
        }

        if let Ok(env_path) = std::env::var(CONFIG_PATH_ENV) {
            figment = figment.merge(Toml::file(env_path));
        }

        if let Some(path) = path {
            let path = path.as_ref();
            if !path.exists() {
                return Err(NewsCheckError::Configuration(format!(
                    "Configuration file not found: {}",
                    path.display()
                )));
            }
            figment = figment.merge(Toml::file(path));
        }

        let config: NewsCheckConfig = figment
            .merge(Env::prefixed(ENV_PREFIX).ignore(&["CONFIG_PATH"]).split("__"))
            .extract()
            .map_err(|e| {
                NewsCheckError::Configuration(format!("Failed to load configuration: {}", e))
            })?;

        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a specific file path.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        use figment::{
            Figment,
            providers::{Format, Serialized, Toml},
        };

        let path = path.as_ref();
        if !path.exists() {
            return Err(NewsCheckError::Configuration(format!(
                "Configuration file not found: {}",
                path.display()
            )));
        }

        let config: NewsCheckConfig = Figment::from(Serialized::defaults(NewsCheckConfig::default()))
            .merge(Toml::file(path))
            .extract()
            .map_err(|e| {
                NewsCheckError::Configuration(format!("Failed to load configuration file: {}", e))
            })?;

        config.validate()?;
        Ok(config)
    }

    /// Path of the per-user configuration file, if a config dir exists
    pub fn user_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("newscheck").join(CONFIG_FILE))
    }

    /// Validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error for zero timeouts, blank provider ids or programs.
    pub fn validate(&self) -> Result<()> {
        if self.dispatcher.default_timeout.is_zero() {
            return Err(NewsCheckError::Configuration(
                "dispatcher.default_timeout must be greater than zero".to_string(),
            ));
        }

        for (capability, timeout) in &self.dispatcher.capability_timeouts {
            if timeout.is_zero() {
                return Err(NewsCheckError::Configuration(format!(
                    "timeout for '{}' must be greater than zero",
                    capability
                )));
            }
        }

        for (id, provider) in &self.providers {
            if id.trim().is_empty() {
                return Err(NewsCheckError::Configuration(
                    "provider ids must not be empty".to_string(),
                ));
            }
            if provider.program.trim().is_empty() {
                return Err(NewsCheckError::Configuration(format!(
                    "provider '{}' has an empty program",
                    id
                )));
            }
        }

        if self.server.bind.trim().is_empty() {
            return Err(NewsCheckError::Configuration(
                "server.bind must not be empty".to_string(),
            ));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::AnalysisKind;
    use std::io::Write;
    use std::time::Duration;

    fn write_config(contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::Builder::new()
            .suffix(".toml")
            .tempfile()
            .unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_defaults_are_valid() {
        let config = NewsCheckConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.dispatcher.default_timeout, Duration::from_secs(30));
        assert_eq!(config.server.bind, "127.0.0.1:8501");
        assert!(config.providers.is_empty());
    }

    #[test]
    fn test_from_file() {
        let file = write_config(
            r#"
            [dispatcher]
            default_timeout = "5s"

            [dispatcher.capability_timeouts]
            "summarizer.summarize" = "1m"

            [analyses]
            emotion = true

            [server]
            bind = "0.0.0.0:9000"

            [providers.topic]
            program = "python3"
            args = ["-m", "model_functions.topic"]
            operations = ["predict_topic"]
            "#,
        );

        let config = NewsCheckConfig::from_file(file.path()).unwrap();

        assert_eq!(config.dispatcher.default_timeout, Duration::from_secs(5));
        assert_eq!(
            config.dispatcher.timeout_for("summarizer.summarize"),
            Duration::from_secs(60)
        );
        assert!(config.analyses.is_enabled(AnalysisKind::Emotion));
        assert!(config.analyses.is_enabled(AnalysisKind::Topic));
        assert_eq!(config.server.bind, "0.0.0.0:9000");

        let topic = &config.providers["topic"];
        assert_eq!(topic.program, "python3");
        assert_eq!(topic.args, vec!["-m", "model_functions.topic"]);
        assert_eq!(topic.operations, vec!["predict_topic"]);
    }

    #[test]
    fn test_missing_file() {
        let result = NewsCheckConfig::from_file("/nonexistent/newscheck.toml");
        assert!(matches!(result, Err(NewsCheckError::Configuration(_))));
    }

    #[test]
    fn test_zero_timeout_rejected() {
        let file = write_config(
            r#"
            [dispatcher]
            default_timeout = "0s"
            "#,
        );
        assert!(NewsCheckConfig::from_file(file.path()).is_err());
    }

    fn isolated(jail: &mut figment::Jail) {
        let root = jail.directory().to_path_buf();
        jail.set_env("XDG_CONFIG_HOME", root.join("xdg").display());
        jail.set_env("HOME", root.display());
    }

    #[test]
    fn test_env_overrides_config_path_file() {
        figment::Jail::expect_with(|jail| {
            isolated(jail);
            jail.create_file(
                "custom.toml",
                r#"
                [dispatcher]
                default_timeout = "5s"

                [server]
                bind = "0.0.0.0:9000"
                "#,
            )?;
            jail.set_env(CONFIG_PATH_ENV, "custom.toml");
            jail.set_env("NEWSCHECK_SERVER__BIND", "0.0.0.0:8080");

            let config = NewsCheckConfig::load().map_err(|e| e.to_string())?;

            assert_eq!(config.server.bind, "0.0.0.0:8080");
            assert_eq!(config.dispatcher.default_timeout, Duration::from_secs(5));
            Ok(())
        });
    }

    #[test]
    fn test_env_nested_keys_split_on_double_underscore() {
        figment::Jail::expect_with(|jail| {
            isolated(jail);
            jail.set_env("NEWSCHECK_DISPATCHER__DEFAULT_TIMEOUT", "7s");
            jail.set_env("NEWSCHECK_ANALYSES__EMOTION", "true");
            jail.set_env("NEWSCHECK_PROVIDERS__TOPIC__PROGRAM", "python3");

            let config = NewsCheckConfig::load().map_err(|e| e.to_string())?;

            assert_eq!(config.dispatcher.default_timeout, Duration::from_secs(7));
            assert!(config.analyses.is_enabled(AnalysisKind::Emotion));
            assert_eq!(config.providers["topic"].program, "python3");
            Ok(())
        });
    }

    #[test]
    fn test_explicit_file_keeps_other_layers() {
        figment::Jail::expect_with(|jail| {
            isolated(jail);
            jail.create_file(
                CONFIG_FILE,
                r#"
                [analyses]
                bias = true
                "#,
            )?;
            jail.create_file(
                "explicit.toml",
                r#"
                [server]
                bind = "0.0.0.0:9000"
                "#,
            )?;
            jail.set_env("NEWSCHECK_DISPATCHER__DEFAULT_TIMEOUT", "3s");

            let config =
                NewsCheckConfig::load_with(Some("explicit.toml")).map_err(|e| e.to_string())?;

            assert_eq!(config.server.bind, "0.0.0.0:9000");
            assert!(config.analyses.is_enabled(AnalysisKind::Bias));
            assert_eq!(config.dispatcher.default_timeout, Duration::from_secs(3));

            assert!(NewsCheckConfig::load_with(Some("missing.toml")).is_err());
            Ok(())
        });
    }

    #[test]
    fn test_empty_program_rejected() {
        let mut config = NewsCheckConfig::default();
        config
            .providers
            .insert("bias".to_string(), CommandProviderConfig::new("  "));
        assert!(config.validate().is_err());
    }
}
