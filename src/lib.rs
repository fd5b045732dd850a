//! metaquine - a self-rebuilding terminal editor runtime
//!
//! Modules:
//! - tui: raw-mode terminal control, viewport query, byte input, frame buffer
//! - editor: state, key classification, rendering, the session loop
//! - supervisor: build → load → run → reload/stop cycle
//! - services: settings and per-user paths

pub mod editor;
pub mod services;
pub mod supervisor;
pub mod tui;
