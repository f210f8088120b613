use anyhow::{Context, Result, anyhow};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::{fs, path::PathBuf};

pub const DEFAULT_BASE_URL: &str = "https://api.weather.gov";

/// Identification sent with every request. The API asks clients to name
/// themselves and give a way to reach them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserAgent {
    pub app_name: String,
    pub contact: String,
}

impl UserAgent {
    pub fn header_value(&self) -> String {
        format!("({}, {})", self.app_name, self.contact)
    }
}

/// Top-level configuration stored on disk.
///
/// Example TOML:
/// ```toml
/// base_url = "https://api.weather.gov"
///
/// [user_agent]
/// app_name = "my-app"
/// contact = "me@example.com"
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct Config {
    pub user_agent: Option<UserAgent>,

    /// Overrides [`DEFAULT_BASE_URL`].
    pub base_url: Option<String>,
}

/// Everything a fetcher needs to talk to the API. Built once from
/// [`Config`] and never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientContext {
    pub user_agent: String,
    pub base_url: String,
}

impl ClientContext {
    pub fn new(user_agent: &UserAgent, base_url: &str) -> Self {
        Self {
            user_agent: user_agent.header_value(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }
}

impl Config {
    pub fn context(&self) -> Result<ClientContext> {
        let user_agent = self.user_agent.as_ref().ok_or_else(|| {
            anyhow!(
                "No user agent configured.\n\
                 Hint: run `nws configure` and enter an application name and contact."
            )
        })?;

        Ok(ClientContext::new(user_agent, self.resolved_base_url()))
    }

    /// The configured base URL without a trailing slash, or [`DEFAULT_BASE_URL`].
    pub fn resolved_base_url(&self) -> &str {
        self.base_url.as_deref().unwrap_or(DEFAULT_BASE_URL).trim_end_matches('/')
    }

    pub fn set_user_agent(&mut self, app_name: String, contact: String) {
        self.user_agent = Some(UserAgent { app_name, contact });
    }

    pub fn is_configured(&self) -> bool {
        self.user_agent.is_some()
    }

    /// Load config from disk, or return an empty default if it doesn't exist yet.
    pub fn load() -> Result<Self> {
        let path = Self::config_file_path()?;
        if !path.exists() {
            // First run: no config file, return empty.
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let cfg: Config = toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(cfg)
    }

    /// Save config to disk, creating parent directories as needed.
    pub fn save(&self) -> Result<()> {
        let path = Self::config_file_path()?;

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create config directory: {}", parent.display())
            })?;
        }

        let toml =
            toml::to_string_pretty(self).context("Failed to serialize configuration to TOML")?;

        fs::write(&path, toml)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;

        log::debug!("Saved configuration to {}", path.display());

        Ok(())
    }

    /// Path to the config file.
    pub fn config_file_path() -> Result<PathBuf> {
        let dirs = ProjectDirs::from("dev", "nws-alerts", "nws")
            .ok_or_else(|| anyhow!("Could not determine platform config directory"))?;

        Ok(dirs.config_dir().join("config.toml"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn context_errors_when_user_agent_not_set() {
        let cfg = Config::default();
        let err = cfg.context().unwrap_err();

        let msg = err.to_string();
        assert!(msg.contains("No user agent configured"));
        assert!(msg.contains("Hint: run `nws configure`"));
    }

    #[test]
    fn context_formats_user_agent_and_defaults_base_url() {
        let mut cfg = Config::default();
        cfg.set_user_agent("storm-watch".into(), "ops@example.com".into());

        let ctx = cfg.context().expect("configured");
        assert_eq!(ctx.user_agent, "(storm-watch, ops@example.com)");
        assert_eq!(ctx.base_url, DEFAULT_BASE_URL);
    }

    #[test]
    fn base_url_override_drops_trailing_slash() {
        let mut cfg = Config::default();
        cfg.set_user_agent("a".into(), "b".into());
        cfg.base_url = Some("http://localhost:8080/".into());

        assert_eq!(cfg.resolved_base_url(), "http://localhost:8080");
        let ctx = cfg.context().expect("configured");
        assert_eq!(ctx.base_url, "http://localhost:8080");
    }

    #[test]
    fn resolved_base_url_needs_no_user_agent() {
        let cfg = Config::default();
        assert_eq!(cfg.resolved_base_url(), DEFAULT_BASE_URL);
    }

    #[test]
    fn toml_roundtrip_keeps_user_agent() {
        let mut cfg = Config::default();
        cfg.set_user_agent("storm-watch".into(), "ops@example.com".into());

        let text = toml::to_string_pretty(&cfg).expect("serialize");
        let parsed: Config = toml::from_str(&text).expect("parse");

        assert_eq!(parsed, cfg);
        assert!(parsed.is_configured());
    }

    #[test]
    fn empty_file_is_unconfigured() {
        let parsed: Config = toml::from_str("").expect("parse");
        assert!(!parsed.is_configured());
    }
}
