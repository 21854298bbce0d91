use crate::capture::hotkeys::{HotkeyCommand, HotkeyConfig};
use crate::errors::{RecorderError, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub recorder: RecorderConfig,
    pub hotkeys: HotkeyConfig,
    pub browser: BrowserConfig,
    pub generation: GenerationConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RecorderConfig {
    pub hover_delay_ms: u64,
    pub input_debounce_ms: u64,
    pub text_limit: usize,
    pub panel_selector: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BrowserConfig {
    pub headless: bool,
    pub viewport: Viewport,
    pub args: Vec<String>,
    pub poll_interval_ms: u64,
    pub script_timeout_ms: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GenerationConfig {
    pub endpoint: String,
    pub timeout_ms: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Viewport {
    pub width: u32,
    pub height: u32,
}

impl Config {
    /// Load a JSON config file. Missing fields take their defaults.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)?;
        let config: Config = serde_json::from_str(&raw).map_err(|e| {
            RecorderError::ConfigurationError(format!("{}: {}", path.display(), e))
        })?;
        config.validated()
    }

    /// Normalises hotkeys and checks the generation endpoint.
    pub fn validated(mut self) -> Result<Self> {
        let defaults = HotkeyConfig::default();
        for command in [HotkeyCommand::Display, HotkeyCommand::Url] {
            let key = self.hotkeys.get(command).to_string();
            if !HotkeyConfig::is_valid_key(&key) {
                tracing::warn!(
                    ?command,
                    %key,
                    "invalid hotkey in config, using default '{}'",
                    defaults.get(command)
                );
                self.hotkeys.reset(command);
            }
        }
        self.hotkeys = self.hotkeys.normalized();

        let endpoint = url::Url::parse(&self.generation.endpoint).map_err(|e| {
            RecorderError::ConfigurationError(format!(
                "generation endpoint '{}': {}",
                self.generation.endpoint, e
            ))
        })?;
        if !matches!(endpoint.scheme(), "http" | "https") {
            return Err(RecorderError::ConfigurationError(format!(
                "generation endpoint must be http(s), got '{}'",
                endpoint.scheme()
            )));
        }

        if self.recorder.text_limit == 0 {
            return Err(RecorderError::ConfigurationError(
                "recorder.text_limit must be positive".to_string(),
            ));
        }

        Ok(self)
    }
}

impl RecorderConfig {
    pub fn hover_delay(&self) -> Duration {
        Duration::from_millis(self.hover_delay_ms)
    }

    pub fn input_debounce(&self) -> Duration {
        Duration::from_millis(self.input_debounce_ms)
    }
}

impl Default for RecorderConfig {
    fn default() -> Self {
        Self {
            hover_delay_ms: 3000,
            input_debounce_ms: 500,
            text_limit: 100,
            panel_selector: "#step-recorder-panel".to_string(),
        }
    }
}

impl Default for BrowserConfig {
    fn default() -> Self {
        Self {
            headless: false,
            viewport: Viewport::default(),
            args: vec![],
            poll_interval_ms: 100,
            script_timeout_ms: 2000,
        }
    }
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            endpoint: "http://localhost:3000/api/generate-test".to_string(),
            timeout_ms: 120_000,
        }
    }
}

impl Default for Viewport {
    fn default() -> Self {
        Self {
            width: 1280,
            height: 720,
        }
    }
}
