use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::env;
use std::io::IsTerminal;
use std::path::{Path, PathBuf};

use crate::engine::RosterOptions;
use crate::repo::MAX_FETCH_LIMIT;
use crate::view::{DEFAULT_PAGE_SIZE, SortKey, StatusFilter};

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ClientConfig {
    #[serde(default)]
    pub output: Option<String>,
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub roster: RosterConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default)]
    pub token: Option<String>,
    #[serde(default = "default_cookie_name")]
    pub cookie_name: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            token: None,
            cookie_name: default_cookie_name(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RosterConfig {
    #[serde(default = "default_page_size")]
    pub page_size: usize,
    #[serde(default = "default_fetch_limit")]
    pub fetch_limit: usize,
    #[serde(default)]
    pub sort: SortKey,
    #[serde(default = "default_status")]
    pub status: String,
}

impl Default for RosterConfig {
    fn default() -> Self {
        Self {
            page_size: default_page_size(),
            fetch_limit: default_fetch_limit(),
            sort: SortKey::default(),
            status: default_status(),
        }
    }
}

impl RosterConfig {
    #[must_use]
    pub const fn options(&self) -> RosterOptions {
        RosterOptions {
            page_size: self.page_size,
            fetch_limit: self.fetch_limit,
        }
    }

    /// # Errors
    ///
    /// Returns an error when `status` is not `all` or a known status.
    pub fn status_filter(&self) -> Result<StatusFilter> {
        self.status
            .parse()
            .with_context(|| format!("invalid roster.status '{}'", self.status))
    }
}

/// Default location: `<config dir>/roster/config.toml`.
#[must_use]
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("roster/config.toml"))
}

/// Load a config file; a missing file yields defaults.
///
/// # Errors
///
/// Returns an error when the file exists but cannot be read or parsed.
pub fn load_config_file(path: &Path) -> Result<ClientConfig> {
    if !path.exists() {
        return Ok(ClientConfig::default());
    }

    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;

    toml::from_str::<ClientConfig>(&content)
        .with_context(|| format!("Failed to parse {}", path.display()))
}

/// Load `explicit` (or the default path) and apply `ROSTER_URL` /
/// `ROSTER_TOKEN` overrides.
///
/// # Errors
///
/// Returns an error when the config file cannot be read or parsed.
pub fn resolve_config(explicit: Option<&Path>) -> Result<ClientConfig> {
    let mut config = match explicit {
        Some(path) => {
            if !path.exists() {
                anyhow::bail!("config file {} does not exist", path.display());
            }
            load_config_file(path)?
        }
        None => match default_config_path() {
            Some(path) => load_config_file(&path)?,
            None => ClientConfig::default(),
        },
    };

    apply_env_overrides(
        &mut config,
        env::var("ROSTER_URL").ok(),
        env::var("ROSTER_TOKEN").ok(),
    );
    Ok(config)
}

fn apply_env_overrides(config: &mut ClientConfig, url: Option<String>, token: Option<String>) {
    if let Some(url) = url.filter(|u| !u.trim().is_empty()) {
        config.server.base_url = url;
    }
    if let Some(token) = token.filter(|t| !t.trim().is_empty()) {
        config.server.token = Some(token);
    }
}

/// Resolve the output mode name: `--json` > `FORMAT` env > config > TTY.
#[must_use]
pub fn resolve_output(cli_json: bool, config_output: Option<&str>) -> String {
    resolve_output_inner(
        cli_json,
        config_output,
        env::var("FORMAT").ok().as_deref(),
        std::io::stdout().is_terminal(),
    )
}

fn resolve_output_inner(
    cli_json: bool,
    config_output: Option<&str>,
    env_format: Option<&str>,
    is_tty: bool,
) -> String {
    fn normalize_output_mode(raw: &str) -> Option<&'static str> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "pretty" | "human" => Some("pretty"),
            "text" | "table" => Some("text"),
            "json" => Some("json"),
            _ => None,
        }
    }

    if cli_json {
        return "json".to_string();
    }

    if let Some(mode) = env_format.and_then(normalize_output_mode) {
        return mode.to_string();
    }

    if let Some(mode) = config_output.and_then(normalize_output_mode) {
        return mode.to_string();
    }

    let mode = if is_tty { "pretty" } else { "text" };
    mode.to_string()
}

fn default_base_url() -> String {
    "http://localhost:8000".to_string()
}

fn default_cookie_name() -> String {
    "auth_token".to_string()
}

const fn default_timeout_secs() -> u64 {
    30
}

const fn default_page_size() -> usize {
    DEFAULT_PAGE_SIZE
}

const fn default_fetch_limit() -> usize {
    MAX_FETCH_LIMIT
}

fn default_status() -> String {
    "all".to_string()
}
