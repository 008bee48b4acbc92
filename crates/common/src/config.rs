use std::path::{Path, PathBuf};

use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub github: GithubConfig,
    #[serde(default)]
    pub web: WebConfig,
    #[serde(default)]
    pub export: ExportConfig,
}

impl AppConfig {
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from_path(".")
    }

    pub fn load_from_path<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let mut config: AppConfig = Config::builder()
            .add_source(
                File::with_name(
                    path.as_ref()
                        .join("config/default")
                        .to_string_lossy()
                        .as_ref(),
                )
                .required(false),
            )
            .add_source(
                File::with_name(
                    path.as_ref()
                        .join("config/local")
                        .to_string_lossy()
                        .as_ref(),
                )
                .required(false),
            )
            .add_source(Environment::default().separator("__"))
            .build()?
            .try_deserialize()?;

        if config.github.token.is_none() {
            config.github.token = std::env::var("GITHUB_TOKEN")
                .ok()
                .filter(|token| !token.trim().is_empty());
        }
        Ok(config)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct GithubConfig {
    #[serde(default)]
    pub token: Option<String>,
    #[serde(default = "GithubConfig::default_user_agent")]
    pub user_agent: String,
    #[serde(default = "GithubConfig::default_base_url")]
    pub base_url: String,
    #[serde(default = "GithubConfig::default_per_page")]
    pub per_page: u32,
}

impl GithubConfig {
    fn default_user_agent() -> String {
        "gh-activity".to_string()
    }

    fn default_base_url() -> String {
        "https://api.github.com/".to_string()
    }

    const fn default_per_page() -> u32 {
        100
    }
}

impl Default for GithubConfig {
    fn default() -> Self {
        Self {
            token: None,
            user_agent: Self::default_user_agent(),
            base_url: Self::default_base_url(),
            per_page: Self::default_per_page(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct WebConfig {
    #[serde(default = "WebConfig::default_bind")]
    pub bind: String,
    #[serde(default = "WebConfig::default_cache_capacity")]
    pub cache_capacity: usize,
    #[serde(default = "WebConfig::default_cache_ttl_secs")]
    pub cache_ttl_secs: u64,
    #[serde(default = "WebConfig::default_metrics_path")]
    pub metrics_path: String,
}

impl WebConfig {
    fn default_bind() -> String {
        "127.0.0.1:8080".to_string()
    }

    const fn default_cache_capacity() -> usize {
        64
    }

    const fn default_cache_ttl_secs() -> u64 {
        600
    }

    fn default_metrics_path() -> String {
        "/metrics".to_string()
    }
}

impl Default for WebConfig {
    fn default() -> Self {
        Self {
            bind: Self::default_bind(),
            cache_capacity: Self::default_cache_capacity(),
            cache_ttl_secs: Self::default_cache_ttl_secs(),
            metrics_path: Self::default_metrics_path(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ExportConfig {
    #[serde(default = "ExportConfig::default_dir")]
    pub dir: PathBuf,
    #[serde(default = "ExportConfig::default_window")]
    pub default_window: String,
}

impl ExportConfig {
    fn default_dir() -> PathBuf {
        PathBuf::from("exports")
    }

    fn default_window() -> String {
        "30d".to_string()
    }
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            dir: Self::default_dir(),
            default_window: Self::default_window(),
        }
    }
}
