//! One editor session: the module entry point the supervisor invokes.
//!
//! Startup queries the viewport before touching terminal attributes, so a
//! failed startup leaves nothing to restore. Once raw mode is on, the
//! `TerminalGuard` owns restoration: the cleanup sequence restores
//! explicitly, and an error or panic anywhere in the loop restores on unwind.

use std::io::{self, Write};
use std::sync::Arc;

use super::command::{process_key, Command};
use super::render::{clear_screen, queue_cursor_position, render_frame};
use super::state::EditorState;
use crate::services::settings::EditorSettings;
use crate::tui::input::{FdInput, InputSource};
use crate::tui::terminal_guard::{
    PanicRestoreHook, TerminalGuard, TerminalOps, TerminalRestorer, TermiosOps,
    TerminationSignal, TerminationWatch,
};

/// Status returned from the entry point.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionStatus {
    /// Stop supervising.
    Exit,
    /// Rebuild and run again.
    Reload,
    /// The session could not start, or lost its terminal.
    Failed,
}

impl SessionStatus {
    pub const fn code(self) -> i32 {
        match self {
            SessionStatus::Exit => 0,
            SessionStatus::Reload => 1,
            SessionStatus::Failed => 2,
        }
    }

    pub fn from_code(code: i32) -> Option<Self> {
        match code {
            0 => Some(SessionStatus::Exit),
            1 => Some(SessionStatus::Reload),
            2 => Some(SessionStatus::Failed),
            _ => None,
        }
    }
}

#[derive(Debug)]
pub enum SessionError {
    /// Viewport or terminal attributes unavailable; raw mode never entered.
    Startup(io::Error),
    /// Reading input or writing a frame failed mid-session.
    Io(io::Error),
}

impl std::fmt::Display for SessionError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SessionError::Startup(err) => write!(f, "terminal startup failed: {}", err),
            SessionError::Io(err) => write!(f, "terminal io failed: {}", err),
        }
    }
}

impl std::error::Error for SessionError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            SessionError::Startup(err) | SessionError::Io(err) => Some(err),
        }
    }
}

impl From<io::Error> for SessionError {
    fn from(err: io::Error) -> Self {
        SessionError::Io(err)
    }
}

#[derive(Debug, Clone, Default)]
pub struct SessionOptions {
    pub editor: EditorSettings,
    /// Forward SIGHUP/SIGINT/SIGTERM into the loop as an exit request.
    pub watch_signals: bool,
}

enum NextInput {
    Byte(u8),
    Terminated(TerminationSignal),
}

/// Blocks, one read timeout at a time, until a byte arrives. Idle ticks
/// check for pending termination signals.
fn next_input<I: InputSource>(
    input: &mut I,
    watch: Option<&TerminationWatch>,
) -> io::Result<NextInput> {
    loop {
        if let Some(byte) = input.read_byte()? {
            return Ok(NextInput::Byte(byte));
        }
        if let Some(signal) = watch.and_then(TerminationWatch::poll) {
            return Ok(NextInput::Terminated(signal));
        }
    }
}

/// Final frame, full clear, cursor home, then the original attributes.
fn shutdown<W: Write>(
    state: &mut EditorState,
    out: &mut W,
    restorer: &TerminalRestorer,
) -> io::Result<()> {
    render_frame(state, out)?;
    clear_screen(state, out)?;

    state.reset_cursor();
    queue_cursor_position(&mut state.frame, state.cursor)?;
    state.frame.flush(out)?;

    restorer.restore()
}

pub fn run_session<I: InputSource, W: Write>(
    ops: Arc<dyn TerminalOps>,
    mut input: I,
    mut out: W,
    options: &SessionOptions,
) -> Result<SessionStatus, SessionError> {
    let viewport = ops.viewport().map_err(SessionError::Startup)?;
    let guard = TerminalGuard::with_ops(ops).map_err(SessionError::Startup)?;
    let _panic_hook = PanicRestoreHook::install(guard.restorer());
    let watch = if options.watch_signals {
        Some(TerminationWatch::install(guard.restorer()).map_err(SessionError::Startup)?)
    } else {
        None
    };

    let mut state = EditorState::new(
        viewport,
        options.editor.cursor_policy(),
        options.editor.frame_capacity,
    );
    tracing::info!(
        rows = viewport.rows,
        cols = viewport.cols,
        policy = ?state.policy(),
        "session started"
    );

    loop {
        render_frame(&mut state, &mut out)?;

        let command = match next_input(&mut input, watch.as_ref())? {
            NextInput::Byte(byte) => process_key(&mut state, byte),
            NextInput::Terminated(signal) => {
                tracing::info!(?signal, "termination signal, leaving session");
                Command::Exit
            }
        };

        let status = match command {
            Command::Continue => continue,
            Command::Reload => SessionStatus::Reload,
            Command::Exit => SessionStatus::Exit,
        };

        shutdown(&mut state, &mut out, &guard.restorer())?;
        tracing::info!(?status, "session finished");
        return Ok(status);
    }
}

/// Entry point over the process's own terminal.
pub fn run_stdio(editor: &EditorSettings) -> SessionStatus {
    let ops = Arc::new(TermiosOps::stdio(editor.read_timeout_ds()));
    let options = SessionOptions {
        editor: editor.clone(),
        watch_signals: true,
    };

    match run_session(ops, FdInput::stdin(), io::stdout().lock(), &options) {
        Ok(status) => status,
        Err(err) => {
            tracing::error!(error = %err, "session failed");
            SessionStatus::Failed
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/editor/session.rs"]
mod tests;
