//! Configuration file (sitegen.toml).

use std::env;
use std::fs;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use serde::Deserialize;
use sitegen_gateway::{FixtureGateway, Gateway, GatewayConfig, HttpGateway};

#[derive(Debug, Deserialize, Default)]
pub struct ConfigFile {
    #[serde(default)]
    pub gateway: GatewaySettings,
    #[serde(default)]
    pub editor: EditorSettings,
    #[serde(default)]
    pub output: OutputSettings,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct GatewaySettings {
    pub api_url: String,
    pub model: String,
    /// Environment variable holding the API key
    pub api_key_env: String,
    pub timeout_secs: u64,
    pub max_tokens: u32,
    pub temperature: f32,
}

impl Default for GatewaySettings {
    fn default() -> Self {
        let defaults = GatewayConfig::default();
        Self {
            api_url: defaults.api_url,
            model: defaults.model,
            api_key_env: "SITEGEN_API_KEY".to_string(),
            timeout_secs: defaults.timeout.as_secs(),
            max_tokens: defaults.max_tokens,
            temperature: defaults.temperature,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct EditorSettings {
    pub host: String,
    pub port: u16,
    pub open: bool,
    pub history_limit: usize,
}

impl Default for EditorSettings {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 7878,
            open: true,
            history_limit: sitegen_core::DEFAULT_HISTORY_LIMIT,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct OutputSettings {
    pub dir: String,
}

impl Default for OutputSettings {
    fn default() -> Self {
        Self {
            dir: "out".to_string(),
        }
    }
}

/// Load configuration from `path` if it exists.
/// Returns an error if the config file exists but is malformed.
pub fn load(path: &Path) -> Result<ConfigFile> {
    if path.exists() {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        let config: ConfigFile = toml::from_str(&content)
            .with_context(|| format!("Failed to parse {}", path.display()))?;
        tracing::info!("Loaded config from {}", path.display());
        return Ok(config);
    }
    Ok(ConfigFile::default())
}

/// Build the gateway selected by the config and the `--offline` flag.
pub fn gateway(settings: &GatewaySettings, offline: bool) -> Result<Arc<dyn Gateway>> {
    if offline {
        tracing::info!("Using offline fixture gateway");
        return Ok(Arc::new(FixtureGateway::new()));
    }

    let api_key = env::var(&settings.api_key_env).ok().filter(|k| !k.is_empty());
    if api_key.is_none() {
        tracing::warn!(
            "{} is not set, requests will be sent without an API key",
            settings.api_key_env
        );
    }

    let gateway = HttpGateway::new(GatewayConfig {
        api_url: settings.api_url.clone(),
        model: settings.model.clone(),
        api_key,
        timeout: Duration::from_secs(settings.timeout_secs),
        max_tokens: settings.max_tokens,
        temperature: settings.temperature,
    })?;

    Ok(Arc::new(gateway))
}
