//! Configuration file loader for blog-publisher
//!
//! This module provides configuration loading, merging, and environment
//! variable expansion.

use crate::core::config::AppConfig;
use crate::core::error::PublishError;
use lazy_static::lazy_static;
use regex::Regex;
use std::collections::HashMap;
use std::env;
use std::path::{Path, PathBuf};
use tokio::fs;

/// Configuration file name
pub const CONFIG_FILENAME: &str = ".blog-publisher.yml";

/// Supported schema version
const SUPPORTED_VERSION: &str = "1.0";

lazy_static! {
    /// Environment variable pattern (${VAR_NAME})
    static ref ENV_VAR_PATTERN: Regex = Regex::new(r"\$\{([A-Z_][A-Z0-9_]*)\}").unwrap();
}

/// Configuration load options
#[derive(Debug, Clone)]
pub struct ConfigLoadOptions {
    /// Project path to load config from
    pub project_path: PathBuf,

    /// CLI overrides (highest priority)
    pub cli: Option<AppConfig>,

    /// Environment variables used for ${VAR} expansion
    pub env: HashMap<String, String>,
}

impl ConfigLoadOptions {
    /// Options for the given project path, using the process environment
    pub fn for_project(project_path: impl Into<PathBuf>) -> Self {
        Self {
            project_path: project_path.into(),
            cli: None,
            env: env::vars().collect(),
        }
    }
}

/// Configuration file loader
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration from multiple sources with priority
    ///
    /// Priority (high to low):
    /// 1. CLI overrides
    /// 2. Project config (./.blog-publisher.yml)
    /// 3. Global config (~/.blog-publisher.yml)
    /// 4. Default values
    pub async fn load(options: ConfigLoadOptions) -> Result<AppConfig, PublishError> {
        let mut config = AppConfig::default();

        if let Some(global) = Self::load_global_config().await? {
            config = Self::merge(config, global);
        }

        if let Some(project) =
            Self::load_config_file(&options.project_path.join(CONFIG_FILENAME)).await?
        {
            config = Self::merge(config, project);
        }

        if let Some(cli) = options.cli {
            config = Self::merge(config, cli);
        }

        let config = Self::expand_env_vars(config, &options.env)?;
        Self::validate(&config)?;

        Ok(config)
    }

    /// Load global configuration from ~/.blog-publisher.yml
    async fn load_global_config() -> Result<Option<AppConfig>, PublishError> {
        let Ok(home_dir) = env::var("HOME") else {
            return Ok(None);
        };

        Self::load_config_file(&PathBuf::from(home_dir).join(CONFIG_FILENAME)).await
    }

    /// Load and parse one configuration file, if it exists
    async fn load_config_file(path: &Path) -> Result<Option<AppConfig>, PublishError> {
        if fs::metadata(path).await.is_err() {
            return Ok(None);
        }

        let content = fs::read_to_string(path)
            .await
            .map_err(|e| PublishError::Config(format!("{}: {}", path.display(), e)))?;

        let config: AppConfig = serde_yaml::from_str(&content)
            .map_err(|e| PublishError::Config(format!("{}: {}", path.display(), e)))?;

        Ok(Some(config))
    }

    /// Merge an overlay into a base configuration (overlay wins per section)
    fn merge(base: AppConfig, overlay: AppConfig) -> AppConfig {
        AppConfig {
            version: overlay.version,
            article: overlay.article.or(base.article),
            platforms: crate::core::config::PlatformConfigs {
                medium: overlay.platforms.medium.or(base.platforms.medium),
                devto: overlay.platforms.devto.or(base.platforms.devto),
                hashnode: overlay.platforms.hashnode.or(base.platforms.hashnode),
            },
            http: overlay.http.or(base.http),
            security: overlay.security.or(base.security),
        }
    }

    /// Expand ${VAR} references in every string value
    ///
    /// Unresolved references are left untouched.
    fn expand_env_vars(
        config: AppConfig,
        env: &HashMap<String, String>,
    ) -> Result<AppConfig, PublishError> {
        let mut value = serde_yaml::to_value(&config)
            .map_err(|e| PublishError::Config(e.to_string()))?;

        Self::expand_value(&mut value, env);

        serde_yaml::from_value(value).map_err(|e| PublishError::Config(e.to_string()))
    }

    fn expand_value(value: &mut serde_yaml::Value, env: &HashMap<String, String>) {
        match value {
            serde_yaml::Value::String(s) => {
                let expanded = ENV_VAR_PATTERN.replace_all(s, |caps: &regex::Captures| {
                    env.get(&caps[1])
                        .cloned()
                        .unwrap_or_else(|| caps[0].to_string())
                });
                *s = expanded.into_owned();
            }
            serde_yaml::Value::Sequence(seq) => {
                for item in seq {
                    Self::expand_value(item, env);
                }
            }
            serde_yaml::Value::Mapping(map) => {
                for (_, item) in map.iter_mut() {
                    Self::expand_value(item, env);
                }
            }
            _ => {}
        }
    }

    /// Validate the merged configuration
    fn validate(config: &AppConfig) -> Result<(), PublishError> {
        if config.version != SUPPORTED_VERSION {
            return Err(PublishError::Config(format!(
                "未対応のスキーマバージョンです: {}（対応バージョン: {}）",
                config.version, SUPPORTED_VERSION
            )));
        }

        if config.timeout_secs() == 0 {
            return Err(PublishError::Config(
                "http.timeoutSecsは1以上である必要があります".to_string(),
            ));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::TempDir;

    fn options_for(dir: &TempDir) -> ConfigLoadOptions {
        ConfigLoadOptions {
            project_path: dir.path().to_path_buf(),
            cli: None,
            env: HashMap::new(),
        }
    }

    fn write_config(dir: &TempDir, yaml: &str) {
        let path = dir.path().join(CONFIG_FILENAME);
        let mut file = std::fs::File::create(&path).unwrap();
        write!(file, "{}", yaml).unwrap();
    }

    #[tokio::test]
    async fn test_load_defaults_without_file() {
        let temp_dir = TempDir::new().unwrap();

        let config = ConfigLoader::load(options_for(&temp_dir)).await.unwrap();

        assert_eq!(config.version, "1.0");
        assert_eq!(config.timeout_secs(), 30);
    }

    #[tokio::test]
    async fn test_load_project_config() {
        let temp_dir = TempDir::new().unwrap();
        write_config(
            &temp_dir,
            r#"
version: "1.0"
platforms:
  hashnode:
    host: myblog.hashnode.dev
    tags: [rust]
http:
  timeoutSecs: 15
"#,
        );

        let config = ConfigLoader::load(options_for(&temp_dir)).await.unwrap();

        assert_eq!(config.timeout_secs(), 15);
        assert_eq!(
            config.platforms.hashnode.unwrap().host.as_deref(),
            Some("myblog.hashnode.dev")
        );
    }

    #[tokio::test]
    async fn test_cli_overrides_project_config() {
        let temp_dir = TempDir::new().unwrap();
        write_config(
            &temp_dir,
            r#"
version: "1.0"
http:
  timeoutSecs: 15
"#,
        );

        let mut options = options_for(&temp_dir);
        let mut cli = AppConfig::default();
        cli.http = Some(crate::core::config::HttpConfig {
            timeout_secs: Some(5),
        });
        options.cli = Some(cli);

        let config = ConfigLoader::load(options).await.unwrap();

        assert_eq!(config.timeout_secs(), 5);
    }

    #[tokio::test]
    async fn test_env_var_expansion() {
        let temp_dir = TempDir::new().unwrap();
        write_config(
            &temp_dir,
            r#"
version: "1.0"
platforms:
  hashnode:
    host: ${BLOG_HOST}
"#,
        );

        let mut options = options_for(&temp_dir);
        options
            .env
            .insert("BLOG_HOST".to_string(), "env.hashnode.dev".to_string());

        let config = ConfigLoader::load(options).await.unwrap();

        assert_eq!(
            config.platforms.hashnode.unwrap().host.as_deref(),
            Some("env.hashnode.dev")
        );
    }

    #[tokio::test]
    async fn test_unresolved_env_var_left_untouched() {
        let temp_dir = TempDir::new().unwrap();
        write_config(
            &temp_dir,
            r#"
version: "1.0"
platforms:
  hashnode:
    host: ${UNSET_BLOG_HOST}
"#,
        );

        let config = ConfigLoader::load(options_for(&temp_dir)).await.unwrap();

        assert_eq!(
            config.platforms.hashnode.unwrap().host.as_deref(),
            Some("${UNSET_BLOG_HOST}")
        );
    }

    #[tokio::test]
    async fn test_unsupported_version_rejected() {
        let temp_dir = TempDir::new().unwrap();
        write_config(&temp_dir, "version: \"2.0\"\n");

        let result = ConfigLoader::load(options_for(&temp_dir)).await;

        assert!(matches!(result, Err(PublishError::Config(_))));
    }

    #[tokio::test]
    async fn test_invalid_yaml_rejected() {
        let temp_dir = TempDir::new().unwrap();
        write_config(&temp_dir, "version: [unterminated\n");

        let result = ConfigLoader::load(options_for(&temp_dir)).await;

        assert!(matches!(result, Err(PublishError::Config(_))));
    }

    #[tokio::test]
    async fn test_zero_timeout_rejected() {
        let temp_dir = TempDir::new().unwrap();
        write_config(
            &temp_dir,
            r#"
version: "1.0"
http:
  timeoutSecs: 0
"#,
        );

        let result = ConfigLoader::load(options_for(&temp_dir)).await;

        assert!(matches!(result, Err(PublishError::Config(_))));
    }
}
