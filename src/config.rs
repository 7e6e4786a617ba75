//! User configuration (`~/.projexion/config.yaml`)

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::constants::{
    API_URL_ENV, CONFIG_DIR_NAME, CONFIG_FILE_NAME, DEFAULT_API_URL, DEFAULT_PAGE_SIZE,
    DEFAULT_TIMEOUT_SECS, LANG_ENV, LOGOUT_MARKER_TTL_SECS,
};
use crate::i18n::Language;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Backend base URL, e.g. `https://projexion.example.com/api`
    #[serde(default = "default_api_url")]
    pub api_url: String,

    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Rows per table page
    #[serde(default = "default_page_size")]
    pub page_size: u32,

    #[serde(default)]
    pub language: Language,

    #[serde(default)]
    pub auth: AuthConfig,

    /// Where generated PDFs are written (defaults to `<config dir>/downloads`)
    #[serde(default)]
    pub download_dir: Option<PathBuf>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    /// Share one token renewal between requests that fail at the same time
    #[serde(default)]
    pub coalesce_renewal: bool,

    /// Lifetime of the logout marker seen by other running instances
    #[serde(default = "default_marker_ttl")]
    pub logout_marker_ttl_secs: u64,
}

fn default_api_url() -> String {
    DEFAULT_API_URL.to_string()
}

fn default_timeout_secs() -> u64 {
    DEFAULT_TIMEOUT_SECS
}

fn default_page_size() -> u32 {
    DEFAULT_PAGE_SIZE
}

fn default_marker_ttl() -> u64 {
    LOGOUT_MARKER_TTL_SECS
}

impl Default for AuthConfig {
    fn default() -> Self {
        AuthConfig {
            coalesce_renewal: false,
            logout_marker_ttl_secs: default_marker_ttl(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Config {
            api_url: default_api_url(),
            timeout_secs: default_timeout_secs(),
            page_size: default_page_size(),
            language: Language::default(),
            auth: AuthConfig::default(),
            download_dir: None,
        }
    }
}

impl Config {
    /// Per-user config directory
    pub fn config_dir() -> PathBuf {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(CONFIG_DIR_NAME)
    }

    /// Load from the default location, then apply environment overrides
    pub fn load() -> Result<Self> {
        let path = Self::config_dir().join(CONFIG_FILE_NAME);
        let mut config = Self::load_from(&path)?;
        config.apply_overrides(
            std::env::var(API_URL_ENV).ok(),
            std::env::var(LANG_ENV).ok(),
        );
        Ok(config)
    }

    /// Load from a file; a missing file yields the defaults
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        let mut config: Config = serde_yaml::from_str(&content)
            .with_context(|| format!("Failed to parse config file {}", path.display()))?;
        config.normalize();
        Ok(config)
    }

    /// Apply `PROJEXION_API_URL` / `PROJEXION_LANG` style overrides
    pub fn apply_overrides(&mut self, api_url: Option<String>, language: Option<String>) {
        if let Some(url) = api_url.filter(|u| !u.trim().is_empty()) {
            self.api_url = url.trim().to_string();
        }
        if let Some(lang) = language.as_deref().and_then(Language::from_code) {
            self.language = lang;
        }
    }

    pub fn download_dir(&self) -> PathBuf {
        self.download_dir
            .clone()
            .unwrap_or_else(|| Self::config_dir().join("downloads"))
    }

    fn normalize(&mut self) {
        if self.page_size == 0 {
            self.page_size = DEFAULT_PAGE_SIZE;
        }
        if self.timeout_secs == 0 {
            self.timeout_secs = DEFAULT_TIMEOUT_SECS;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_missing_file_gives_defaults() {
        let dir = tempdir().unwrap();
        let config = Config::load_from(&dir.path().join("config.yaml")).unwrap();
        assert_eq!(config.api_url, DEFAULT_API_URL);
        assert_eq!(config.page_size, 20);
        assert_eq!(config.language, Language::De);
        assert!(!config.auth.coalesce_renewal);
        assert_eq!(config.auth.logout_marker_ttl_secs, 300);
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.yaml");
        fs::write(
            &path,
            "api_url: https://backend.test/api\npage_size: 0\nlanguage: en\nauth:\n  coalesce_renewal: true\n",
        )
        .unwrap();

        let config = Config::load_from(&path).unwrap();
        assert_eq!(config.api_url, "https://backend.test/api");
        assert_eq!(config.page_size, DEFAULT_PAGE_SIZE);
        assert_eq!(config.language, Language::En);
        assert!(config.auth.coalesce_renewal);
        assert_eq!(config.auth.logout_marker_ttl_secs, 300);
        assert_eq!(config.timeout_secs, 30);
    }

    #[test]
    fn test_invalid_yaml_is_an_error() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.yaml");
        fs::write(&path, "page_size: [not, a, number]\n").unwrap();
        assert!(Config::load_from(&path).is_err());
    }

    #[test]
    fn test_env_overrides() {
        let mut config = Config::default();
        config.apply_overrides(Some(" http://other/api ".into()), Some("EN".into()));
        assert_eq!(config.api_url, "http://other/api");
        assert_eq!(config.language, Language::En);

        config.apply_overrides(Some("   ".into()), Some("xx".into()));
        assert_eq!(config.api_url, "http://other/api");
        assert_eq!(config.language, Language::En);
    }
}
