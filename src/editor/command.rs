//! Byte → command classification.
//!
//! Only single bytes are decoded: four movement letters and two control
//! codes. Everything else is ignored, so every byte has exactly one meaning.

use super::state::{EditorState, Movement};

pub const fn ctrl_key(key: u8) -> u8 {
    key & 0x1f
}

pub const QUIT_KEY: u8 = ctrl_key(b'q');
pub const RELOAD_KEY: u8 = ctrl_key(b'r');

/// Outcome of one keypress, as seen by the session loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Continue,
    Reload,
    Exit,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyAction {
    Move(Movement),
    Quit,
    Reload,
    Ignore,
}

pub fn classify(byte: u8) -> KeyAction {
    match byte {
        b'h' => KeyAction::Move(Movement::Left),
        b'j' => KeyAction::Move(Movement::Down),
        b'k' => KeyAction::Move(Movement::Up),
        b'l' => KeyAction::Move(Movement::Right),
        QUIT_KEY => KeyAction::Quit,
        RELOAD_KEY => KeyAction::Reload,
        _ => KeyAction::Ignore,
    }
}

/// Applies one byte to the state and reports what the loop should do next.
pub fn process_key(state: &mut EditorState, byte: u8) -> Command {
    match classify(byte) {
        KeyAction::Move(movement) => {
            state.move_cursor(movement);
            Command::Continue
        }
        KeyAction::Quit => Command::Exit,
        KeyAction::Reload => Command::Reload,
        KeyAction::Ignore => Command::Continue,
    }
}

#[cfg(test)]
#[path = "../../tests/unit/editor/command.rs"]
mod tests;
