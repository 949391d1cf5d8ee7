use anyhow::{Result, anyhow};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use url::Url;

pub const DEFAULT_API_BASE_URL: &str = "http://localhost:8000";
pub const DEFAULT_POLL_INTERVAL_SECS: u64 = 30;
pub const DEFAULT_ROTATION_PERIOD_SECS: u64 = 3600;
pub const MAX_POLL_INTERVAL_SECS: u64 = 86_400;
pub const MAX_ROTATION_PERIOD_SECS: u64 = 30 * 86_400;

/// Env var that overrides `api_base_url` from the config file.
pub const API_URL_ENV: &str = "RS_TEMPMAIL_API_URL";

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct Config {
    pub api_base_url: String,
    pub poll_interval_secs: Option<u64>,
    pub rotation_period_secs: Option<u64>,
    pub db_path: Option<String>,
    pub log_path: Option<String>,
    pub notify_new_mail: Option<bool>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            poll_interval_secs: Some(DEFAULT_POLL_INTERVAL_SECS),
            rotation_period_secs: Some(DEFAULT_ROTATION_PERIOD_SECS),
            db_path: None,
            log_path: None,
            notify_new_mail: Some(false),
        }
    }
}

impl Config {
    /// 0 means the default; anything above a day is capped at a day.
    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(bounded_secs(
            self.poll_interval_secs,
            DEFAULT_POLL_INTERVAL_SECS,
            MAX_POLL_INTERVAL_SECS,
        ))
    }

    /// 0 means the default; anything above 30 days is capped at 30 days.
    pub fn rotation_period(&self) -> Duration {
        Duration::from_secs(bounded_secs(
            self.rotation_period_secs,
            DEFAULT_ROTATION_PERIOD_SECS,
            MAX_ROTATION_PERIOD_SECS,
        ))
    }

    pub fn notify_new_mail(&self) -> bool {
        self.notify_new_mail.unwrap_or(false)
    }

    /// Applies `RS_TEMPMAIL_API_URL` and then the CLI flag, in that order.
    pub fn with_overrides(mut self, cli_api_url: Option<&str>) -> Self {
        if let Ok(url) = std::env::var(API_URL_ENV)
            && !url.trim().is_empty()
        {
            self.api_base_url = url.trim().to_string();
        }
        if let Some(url) = cli_api_url {
            self.api_base_url = url.to_string();
        }
        self
    }

    pub fn api_url(&self) -> Result<Url> {
        let url = Url::parse(&self.api_base_url)
            .map_err(|e| anyhow!("invalid api_base_url '{}': {e}", self.api_base_url))?;
        if url.cannot_be_a_base() {
            return Err(anyhow!(
                "api_base_url '{}' cannot be used as a base URL",
                self.api_base_url
            ));
        }
        Ok(url)
    }
}

fn bounded_secs(value: Option<u64>, default: u64, max: u64) -> u64 {
    match value {
        None | Some(0) => default,
        Some(secs) if secs > max => {
            log::warn!("configured interval of {secs}s exceeds {max}s; using {max}s");
            max
        }
        Some(secs) => secs,
    }
}

fn config_dir() -> Result<PathBuf> {
    Ok(dirs::config_dir()
        .ok_or_else(|| anyhow!("no config dir available"))?
        .join("rs_tempmail"))
}

pub fn config_path() -> Result<PathBuf> {
    let mut p = config_dir()?;
    fs::create_dir_all(&p)?;
    p.push("config.toml");
    Ok(p)
}

pub fn default_db_path() -> Result<PathBuf> {
    let mut p = config_dir()?;
    fs::create_dir_all(&p)?;
    p.push("state.db");
    Ok(p)
}

pub fn default_log_path() -> Result<PathBuf> {
    let mut p = config_dir()?;
    fs::create_dir_all(&p)?;
    p.push("rs_tempmail.log");
    Ok(p)
}

pub fn load_config() -> Result<Config> {
    load_config_from(&config_path()?)
}

/// Reads the config at `path`, writing a template with defaults first if it is missing.
pub fn load_config_from(path: &Path) -> Result<Config> {
    if !path.exists() {
        let sample = Config::default();
        let tom = toml::to_string_pretty(&sample)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, tom)?;
        log::info!("Created default config at {}", path.display());
        return Ok(sample);
    }
    let s = fs::read_to_string(path)?;
    let cfg: Config = toml::from_str(&s)
        .map_err(|e| anyhow!("could not parse {}: {e}", path.display()))?;
    Ok(cfg)
}

pub fn resolve_db_path(cfg: &Config) -> Result<PathBuf> {
    if let Some(p) = &cfg.db_path {
        Ok(PathBuf::from(p))
    } else {
        default_db_path()
    }
}

pub fn resolve_log_path(cfg: &Config) -> Result<PathBuf> {
    if let Some(p) = &cfg.log_path {
        Ok(PathBuf::from(p))
    } else {
        default_log_path()
    }
}
