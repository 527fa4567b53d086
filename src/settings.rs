use anyhow::{anyhow, Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::translator::SETTLE_WINDOW;

const DEFAULT_SETTINGS_TOML: &str = include_str!("../settings.toml");

pub const DEFAULT_ENDPOINT: &str = "http://127.0.0.1:8188/translate";

#[derive(Debug, Clone)]
pub struct Settings {
    pub endpoint: String,
    pub settle_ms: u64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            settle_ms: SETTLE_WINDOW.as_millis() as u64,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
struct SettingsFile {
    transport: Option<TransportSettings>,
    preview: Option<PreviewSettings>,
}

#[derive(Debug, Default, Deserialize)]
struct TransportSettings {
    endpoint: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct PreviewSettings {
    settle_ms: Option<u64>,
}

pub fn load_settings(extra_path: Option<&Path>) -> Result<Settings> {
    let mut settings = Settings::default();
    ensure_home_settings_file()?;

    let mut ordered_paths = Vec::new();
    ordered_paths.push(PathBuf::from("settings.toml"));
    ordered_paths.push(PathBuf::from("settings.local.toml"));

    if let Some(home) = home_dir() {
        ordered_paths.push(home.join("settings.toml"));
        ordered_paths.push(home.join("settings.local.toml"));
    }

    if let Some(extra) = extra_path {
        if !extra.exists() {
            return Err(anyhow!("settings file not found: {}", extra.display()));
        }
        ordered_paths.push(extra.to_path_buf());
    }

    for path in ordered_paths {
        if path.exists() {
            let content = fs::read_to_string(&path)
                .with_context(|| format!("failed to read settings: {}", path.display()))?;
            let parsed: SettingsFile = toml::from_str(&content)
                .with_context(|| format!("failed to parse settings: {}", path.display()))?;
            settings.merge(parsed);
        }
    }

    Ok(settings)
}

impl Settings {
    pub fn settle(&self) -> Duration {
        Duration::from_millis(self.settle_ms)
    }

    fn merge(&mut self, incoming: SettingsFile) {
        if let Some(transport) = incoming.transport {
            if let Some(endpoint) = transport.endpoint {
                if !endpoint.trim().is_empty() {
                    self.endpoint = endpoint;
                }
            }
        }
        if let Some(preview) = incoming.preview {
            if let Some(settle_ms) = preview.settle_ms {
                if settle_ms > 0 {
                    self.settle_ms = settle_ms;
                }
            }
        }
    }
}

fn ensure_home_settings_file() -> Result<()> {
    let Some(home) = home_dir() else {
        return Ok(());
    };
    fs::create_dir_all(&home)
        .with_context(|| format!("failed to create settings directory: {}", home.display()))?;
    let path = home.join("settings.toml");
    if !path.exists() {
        fs::write(&path, DEFAULT_SETTINGS_TOML)
            .with_context(|| format!("failed to write settings: {}", path.display()))?;
    }
    Ok(())
}

fn home_dir() -> Option<PathBuf> {
    std::env::var("HOME").ok().and_then(|home| {
        let home = home.trim();
        if home.is_empty() {
            None
        } else {
            Some(Path::new(home).join(".translate-preview"))
        }
    })
}
