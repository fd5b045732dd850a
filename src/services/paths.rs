//! Per-user directories, XDG style:
//! - data: `$XDG_DATA_HOME/metaquine`, else `~/.local/share/metaquine`
//! - cache: `$XDG_CACHE_HOME`, else `~/.cache`
//!
//! Unset or empty variables fall through to the `$HOME` default.

use std::ffi::OsString;
use std::io;
use std::path::PathBuf;

const APP_NAME: &str = env!("CARGO_PKG_NAME");
const LOG_DIR: &str = "logs";

fn non_empty(value: Option<OsString>) -> Option<PathBuf> {
    value.filter(|v| !v.is_empty()).map(PathBuf::from)
}

/// `xdg` if set, else `home/fallback`.
fn resolve_base(
    xdg: Option<OsString>,
    home: Option<OsString>,
    fallback: &str,
) -> Option<PathBuf> {
    non_empty(xdg).or_else(|| non_empty(home).map(|home| home.join(fallback)))
}

fn base_dir(xdg_var: &str, fallback: &str) -> Option<PathBuf> {
    resolve_base(
        std::env::var_os(xdg_var),
        std::env::var_os("HOME"),
        fallback,
    )
}

pub fn get_cache_dir() -> Option<PathBuf> {
    base_dir("XDG_CACHE_HOME", ".cache")
}

pub fn get_log_dir() -> Option<PathBuf> {
    base_dir("XDG_DATA_HOME", ".local/share").map(|data| data.join(APP_NAME).join(LOG_DIR))
}

pub fn ensure_log_dir() -> io::Result<PathBuf> {
    let dir = get_log_dir()
        .ok_or_else(|| io::Error::new(io::ErrorKind::NotFound, "no HOME or XDG_DATA_HOME"))?;
    std::fs::create_dir_all(&dir)?;
    Ok(dir)
}

#[cfg(test)]
#[path = "../../tests/unit/services/paths.rs"]
mod tests;
