//! The editor module: state, key classification, rendering and the session
//! loop that ties them to a terminal.

pub mod command;
pub mod render;
pub mod session;
pub mod state;

pub use command::Command;
pub use session::{run_session, run_stdio, SessionError, SessionOptions, SessionStatus};
pub use state::{Cursor, CursorPolicy, EditorState, Movement};
