pub mod paths;
pub mod settings;

pub use paths::{ensure_log_dir, get_log_dir};
pub use settings::{
    get_settings_path, load_settings, load_settings_from, CommandSpec, EditorSettings, ModuleMode,
    Settings, SupervisorSettings,
};
