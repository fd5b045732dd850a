use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use super::paths::get_cache_dir;
use crate::editor::state::CursorPolicy;
use crate::tui::frame::INITIAL_FRAME_CAPACITY;
use crate::tui::terminal_guard::DEFAULT_READ_TIMEOUT_DS;

pub const SETTINGS_ENV: &str = "METAQUINE_SETTINGS";

const SETTINGS_DIR: &str = ".metaquine";
const SETTINGS_FILE: &str = "settings.json";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub editor: EditorSettings,
    pub supervisor: SupervisorSettings,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorSettings {
    /// Keep the cursor inside the viewport.
    pub clamp_cursor: bool,
    /// Input read timeout in deciseconds (termios VTIME).
    pub read_timeout_ds: u8,
    pub frame_capacity: usize,
}

impl Default for EditorSettings {
    fn default() -> Self {
        Self {
            clamp_cursor: true,
            read_timeout_ds: DEFAULT_READ_TIMEOUT_DS,
            frame_capacity: INITIAL_FRAME_CAPACITY,
        }
    }
}

impl EditorSettings {
    pub fn cursor_policy(&self) -> CursorPolicy {
        if self.clamp_cursor {
            CursorPolicy::Clamped
        } else {
            CursorPolicy::Unclamped
        }
    }

    /// Zero would turn every read into a busy poll.
    pub fn read_timeout_ds(&self) -> u8 {
        self.read_timeout_ds.max(1)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ModuleMode {
    /// Each session runs a staged copy of the freshly built binary.
    #[default]
    Process,
    /// Each session is a fresh in-process instance; the build step only
    /// validates.
    InProcess,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommandSpec {
    pub program: String,
    #[serde(default)]
    pub args: Vec<String>,
}

impl CommandSpec {
    pub fn new(program: impl Into<String>, args: &[&str]) -> Self {
        Self {
            program: program.into(),
            args: args.iter().map(|arg| arg.to_string()).collect(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SupervisorSettings {
    pub mode: ModuleMode,
    pub build: CommandSpec,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub clean: Option<CommandSpec>,
    /// Build output that gets staged and launched in process mode.
    pub artifact: PathBuf,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub staging_dir: Option<PathBuf>,
}

impl Default for SupervisorSettings {
    fn default() -> Self {
        Self {
            mode: ModuleMode::default(),
            build: CommandSpec::new(
                "cargo",
                &["build", "--release", "--bin", env!("CARGO_PKG_NAME")],
            ),
            clean: None,
            artifact: PathBuf::from("target/release").join(env!("CARGO_PKG_NAME")),
            staging_dir: None,
        }
    }
}

impl SupervisorSettings {
    /// Root under which each supervisor run creates its private staging
    /// directory.
    pub fn staging_dir(&self) -> PathBuf {
        self.staging_dir.clone().unwrap_or_else(std::env::temp_dir)
    }
}

pub fn get_settings_path() -> Option<PathBuf> {
    if let Some(path) = std::env::var_os(SETTINGS_ENV) {
        return Some(PathBuf::from(path));
    }
    get_cache_dir().map(|dir| dir.join(SETTINGS_DIR).join(SETTINGS_FILE))
}

pub fn load_settings_from(path: &Path) -> Option<Settings> {
    let data = std::fs::read_to_string(path).ok()?;
    match serde_json::from_str(&data) {
        Ok(settings) => Some(settings),
        Err(err) => {
            tracing::warn!(path = %path.display(), error = %err, "invalid settings file, using defaults");
            None
        }
    }
}

pub fn load_settings() -> Settings {
    get_settings_path()
        .and_then(|path| load_settings_from(&path))
        .unwrap_or_default()
}

#[cfg(test)]
#[path = "../../tests/unit/services/settings.rs"]
mod tests;
