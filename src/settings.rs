use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::sync::Mutex;

// ---------------------------------------------------------------------------
// ChatSettings — the flat persisted blob
// ---------------------------------------------------------------------------

/// Visual theme for the chat panel.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatTheme {
    Light,
    #[default]
    Dark,
}

impl ChatTheme {
    /// CSS class the host view applies to the messages container.
    pub fn css_class(self) -> &'static str {
        match self {
            ChatTheme::Light => "light",
            ChatTheme::Dark => "dark",
        }
    }
}

/// Everything the plugin persists, as one flat record.
///
/// Every field has a serde default so blobs written by older versions
/// (or hand-edited ones with missing keys) still load.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ChatSettings {
    /// Bearer token for the completion API.
    #[serde(default)]
    pub api_key: String,
    /// Completion endpoint URL.
    #[serde(default = "default_endpoint")]
    pub endpoint: String,
    /// Assistant line shown when the panel opens.
    #[serde(default = "default_greeting")]
    pub default_greeting: String,
    /// Prefix transcript entries with `[HH:MM]`.
    #[serde(default = "default_true")]
    pub enable_timestamps: bool,
    #[serde(default)]
    pub chat_theme: ChatTheme,
    /// Saved session transcripts, oldest first. Bounded by the session
    /// manager, never by deserialization.
    #[serde(default)]
    pub chat_sessions: Vec<Vec<String>>,
}

fn default_endpoint() -> String {
    "https://api.openai.com/v1/completions".to_string()
}

fn default_greeting() -> String {
    "Hello, how can I help you today?".to_string()
}

fn default_true() -> bool {
    true
}

impl Default for ChatSettings {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            endpoint: default_endpoint(),
            default_greeting: default_greeting(),
            enable_timestamps: true,
            chat_theme: ChatTheme::default(),
            chat_sessions: Vec::new(),
        }
    }
}

// ---------------------------------------------------------------------------
// SettingsStore — host persistence capability
// ---------------------------------------------------------------------------

/// Persistence capability the host hands to the plugin.
///
/// `load` never fails: a missing or corrupt blob yields defaults, so a bad
/// settings file can't keep the panel from opening.
pub trait SettingsStore {
    fn load(&self) -> ChatSettings;
    fn save(&self, settings: &ChatSettings) -> Result<(), String>;
}

/// JSON-file store in the platform config directory.
///
/// - macOS: `~/Library/Application Support/copilot-chat/settings.json`
/// - Linux: `~/.config/copilot-chat/settings.json` (or `$XDG_CONFIG_HOME`)
/// - Windows: `%APPDATA%/copilot-chat/settings.json`
pub struct FileSettingsStore {
    path: PathBuf,
}

const SETTINGS_FILENAME: &str = "settings.json";

impl FileSettingsStore {
    /// Store rooted at the platform config dir, falling back to
    /// `~/.copilot-chat/` when no platform dir is available.
    pub fn new() -> Self {
        let dir = dirs::config_dir()
            .map(|d| d.join("copilot-chat"))
            .unwrap_or_else(|| {
                dirs::home_dir()
                    .unwrap_or_else(|| PathBuf::from("."))
                    .join(".copilot-chat")
            });
        Self {
            path: dir.join(SETTINGS_FILENAME),
        }
    }

    /// Store at an explicit file path (tests, portable installs).
    pub fn at_path(path: PathBuf) -> Self {
        Self { path }
    }
}

impl Default for FileSettingsStore {
    fn default() -> Self {
        Self::new()
    }
}

impl SettingsStore for FileSettingsStore {
    fn load(&self) -> ChatSettings {
        if !self.path.exists() {
            return ChatSettings::default();
        }
        let content = match std::fs::read_to_string(&self.path) {
            Ok(s) => s,
            Err(e) => {
                tracing::warn!(path = %self.path.display(), "could not read settings: {e}");
                return ChatSettings::default();
            }
        };
        match serde_json::from_str(&content) {
            Ok(v) => v,
            Err(e) => {
                tracing::error!(path = %self.path.display(), "corrupt settings: {e}; using defaults");
                ChatSettings::default()
            }
        }
    }

    /// Atomic save: temp file + rename, 0600 on Unix since the blob holds
    /// the API key.
    fn save(&self, settings: &ChatSettings) -> Result<(), String> {
        let dir = self
            .path
            .parent()
            .ok_or_else(|| "settings path has no parent directory".to_string())?;
        std::fs::create_dir_all(dir).map_err(|e| format!("Failed to create config directory: {e}"))?;

        let json = serde_json::to_string_pretty(settings)
            .map_err(|e| format!("Failed to serialize settings: {e}"))?;

        let temp = self.path.with_extension(format!("tmp.{}", std::process::id()));
        std::fs::write(&temp, &json).map_err(|e| format!("Failed to write temp settings: {e}"))?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let perms = std::fs::Permissions::from_mode(0o600);
            std::fs::set_permissions(&temp, perms)
                .map_err(|e| format!("Failed to set settings permissions: {e}"))?;
        }

        std::fs::rename(&temp, &self.path).map_err(|e| {
            let _ = std::fs::remove_file(&temp);
            format!("Failed to commit settings: {e}")
        })?;

        Ok(())
    }
}

/// In-memory store for tests and embedders with their own persistence.
#[derive(Default)]
pub struct MemorySettingsStore {
    inner: Mutex<ChatSettings>,
}

impl MemorySettingsStore {
    pub fn new(settings: ChatSettings) -> Self {
        Self {
            inner: Mutex::new(settings),
        }
    }
}

impl SettingsStore for MemorySettingsStore {
    fn load(&self) -> ChatSettings {
        self.inner.lock().map(|s| s.clone()).unwrap_or_default()
    }

    fn save(&self, settings: &ChatSettings) -> Result<(), String> {
        match self.inner.lock() {
            Ok(mut s) => {
                *s = settings.clone();
                Ok(())
            }
            Err(_) => Err("settings store mutex poisoned".to_string()),
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
