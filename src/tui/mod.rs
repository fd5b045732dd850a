//! Terminal layer: raw-mode lifecycle, window size, byte input and the frame
//! buffer every render pass writes through.
//!
//! Kept apart from `editor` so the session logic can be driven by mock
//! terminals in tests.

pub mod frame;
pub mod input;
pub mod terminal_guard;
pub mod viewport;

#[cfg(test)]
#[path = "../../tests/unit/tui/pty.rs"]
pub(crate) mod test_pty;
