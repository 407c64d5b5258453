use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::warn;

pub const CONFIG_ENV: &str = "WA_TEMPLATES_CONFIG";
const DEFAULT_CONFIG_PATH: &str = "~/.wa-templates/config.json";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub server: ServerConfig,
    pub auth: AuthConfig,
    pub whatsapp: WhatsAppConfig,
    pub broadcast: BroadcastConfig,
    pub templates: TemplatesConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8092,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AuthConfig {
    pub token: Option<String>,
}

/// Cloud API account the service talks to.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WhatsAppConfig {
    pub graph_url: String,
    pub api_version: String,
    pub access_token: Option<String>,
    pub waba_id: Option<String>,
    pub phone_number_id: Option<String>,
    pub page_size: u32,
    pub max_pages: u32,
}

impl Default for WhatsAppConfig {
    fn default() -> Self {
        Self {
            graph_url: "https://graph.facebook.com".to_string(),
            api_version: "v24.0".to_string(),
            access_token: None,
            waba_id: None,
            phone_number_id: None,
            page_size: 100,
            max_pages: 10,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BroadcastConfig {
    pub delay_ms: u64,
}

impl Default for BroadcastConfig {
    fn default() -> Self {
        Self { delay_ms: 1000 }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TemplatesConfig {
    /// Template names never offered for sending, even when approved.
    pub excluded: Vec<String>,
}

impl Default for TemplatesConfig {
    fn default() -> Self {
        Self {
            excluded: vec!["hello_world".to_string()],
        }
    }
}

pub fn expand_tilde(path: &str) -> PathBuf {
    if let Some(stripped) = path.strip_prefix("~/") {
        if let Some(home) = dirs::home_dir() {
            return home.join(stripped);
        }
    }
    PathBuf::from(path)
}

pub fn resolve_config_path() -> PathBuf {
    env::var(CONFIG_ENV)
        .ok()
        .map(PathBuf::from)
        .unwrap_or_else(|| expand_tilde(DEFAULT_CONFIG_PATH))
}

pub fn load_config() -> Config {
    let cfg = load_config_file(&resolve_config_path());
    apply_env_overrides(cfg, |key| env::var(key).ok())
}

/// Missing or unreadable files fall back to defaults.
pub fn load_config_file(path: &Path) -> Config {
    if !path.exists() {
        return Config::default();
    }
    let raw = match fs::read_to_string(path) {
        Ok(raw) => raw,
        Err(err) => {
            warn!(path = %path.display(), "cannot read config file: {err}");
            return Config::default();
        }
    };
    match serde_json::from_str::<Config>(&raw) {
        Ok(cfg) => cfg,
        Err(err) => {
            warn!(path = %path.display(), "invalid config file, using defaults: {err}");
            Config::default()
        }
    }
}

/// Applies `WA_TEMPLATES_*` overrides read through `lookup`. Blank values are ignored.
pub fn apply_env_overrides<F>(mut cfg: Config, lookup: F) -> Config
where
    F: Fn(&str) -> Option<String>,
{
    let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

    if let Some(token) = get("WA_TEMPLATES_TOKEN") {
        cfg.auth.token = Some(token);
    }
    if let Some(host) = get("WA_TEMPLATES_HOST") {
        cfg.server.host = host;
    }
    if let Some(port) = get("WA_TEMPLATES_PORT") {
        match port.trim().parse() {
            Ok(port) => cfg.server.port = port,
            Err(_) => warn!(%port, "ignoring invalid WA_TEMPLATES_PORT"),
        }
    }
    if let Some(token) = get("WA_TEMPLATES_ACCESS_TOKEN") {
        cfg.whatsapp.access_token = Some(token);
    }
    if let Some(id) = get("WA_TEMPLATES_WABA_ID") {
        cfg.whatsapp.waba_id = Some(id);
    }
    if let Some(id) = get("WA_TEMPLATES_PHONE_NUMBER_ID") {
        cfg.whatsapp.phone_number_id = Some(id);
    }
    if let Some(delay) = get("WA_TEMPLATES_BROADCAST_DELAY_MS") {
        match delay.trim().parse() {
            Ok(delay) => cfg.broadcast.delay_ms = delay,
            Err(_) => warn!(%delay, "ignoring invalid WA_TEMPLATES_BROADCAST_DELAY_MS"),
        }
    }

    cfg
}
