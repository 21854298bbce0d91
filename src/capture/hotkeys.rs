use crate::capture::mode::Mode;
use crate::dom::KeyPress;
use serde::{Deserialize, Serialize};

pub const DEFAULT_DISPLAY_KEY: &str = "d";
pub const DEFAULT_URL_KEY: &str = "u";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HotkeyCommand {
    Display,
    Url,
}

/// Single-character hotkeys for the two recorder commands.
///
/// Both keys may be equal; `Display` is matched first in that case.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct HotkeyConfig {
    display: String,
    url: String,
}

impl Default for HotkeyConfig {
    fn default() -> Self {
        Self {
            display: DEFAULT_DISPLAY_KEY.to_string(),
            url: DEFAULT_URL_KEY.to_string(),
        }
    }
}

impl HotkeyConfig {
    /// Builds a config from user input; invalid keys keep their defaults.
    pub fn new(display: &str, url: &str) -> Self {
        let mut config = Self::default();
        config.set(HotkeyCommand::Display, display);
        config.set(HotkeyCommand::Url, url);
        config
    }

    pub fn is_valid_key(key: &str) -> bool {
        let mut chars = key.chars();
        matches!((chars.next(), chars.next()), (Some(c), None) if c.is_ascii_alphanumeric())
    }

    pub fn get(&self, command: HotkeyCommand) -> &str {
        match command {
            HotkeyCommand::Display => &self.display,
            HotkeyCommand::Url => &self.url,
        }
    }

    pub fn key(&self, command: HotkeyCommand) -> char {
        self.get(command).chars().next().unwrap_or_default()
    }

    /// Sets the key for `command`. Anything but one ASCII alphanumeric character is
    /// discarded and the previous key kept.
    pub fn set(&mut self, command: HotkeyCommand, key: &str) -> bool {
        if !Self::is_valid_key(key) {
            tracing::debug!(?command, key, "rejected hotkey");
            return false;
        }
        let key = key.to_ascii_lowercase();
        match command {
            HotkeyCommand::Display => self.display = key,
            HotkeyCommand::Url => self.url = key,
        }
        true
    }

    pub fn reset(&mut self, command: HotkeyCommand) {
        let defaults = Self::default();
        match command {
            HotkeyCommand::Display => self.display = defaults.display,
            HotkeyCommand::Url => self.url = defaults.url,
        }
    }

    pub fn reset_all(&mut self) {
        *self = Self::default();
    }

    pub fn normalized(mut self) -> Self {
        self.display = self.display.to_ascii_lowercase();
        self.url = self.url.to_ascii_lowercase();
        self
    }

    /// Case-insensitive single-character match.
    pub fn matches(&self, command: HotkeyCommand, key: &str) -> bool {
        Self::is_valid_key(key) && key.eq_ignore_ascii_case(self.get(command))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HotkeyAction {
    StartDisplayCapture,
    RecordUrl,
    CancelDisplayCapture,
}

#[derive(Debug, Clone, Default)]
pub struct HotkeyDispatcher {
    config: HotkeyConfig,
}

impl HotkeyDispatcher {
    pub fn new(config: HotkeyConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &HotkeyConfig {
        &self.config
    }

    pub fn config_mut(&mut self) -> &mut HotkeyConfig {
        &mut self.config
    }

    /// Maps a key press to at most one command.
    pub fn dispatch(&self, press: &KeyPress, mode: Mode) -> Option<HotkeyAction> {
        let target = &press.target;
        if target.is_typing_target() || target.content_editable {
            return None;
        }
        if target.in_panel || press.has_modifier() {
            return None;
        }

        let selecting = mode == Mode::SelectingDisplay;
        if press.is_escape() {
            return selecting.then_some(HotkeyAction::CancelDisplayCapture);
        }
        if selecting {
            return None;
        }

        if self.config.matches(HotkeyCommand::Display, &press.key) {
            Some(HotkeyAction::StartDisplayCapture)
        } else if self.config.matches(HotkeyCommand::Url, &press.key) && mode == Mode::Recording
        {
            Some(HotkeyAction::RecordUrl)
        } else {
            None
        }
    }
}
