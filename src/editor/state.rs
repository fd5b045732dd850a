//! Session state: cursor, viewport and the frame buffer the renderer fills.

use crate::tui::frame::FrameBuffer;
use crate::tui::viewport::Viewport;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Movement {
    Left,
    Right,
    Up,
    Down,
}

/// What happens when the cursor is pushed past an edge of the viewport.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CursorPolicy {
    /// Stays inside `[0, cols-1] x [0, rows-1]`.
    #[default]
    Clamped,
    /// Moves without bounds; coordinates wrap instead of overflowing.
    Unclamped,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Cursor {
    pub x: u16,
    pub y: u16,
}

impl Cursor {
    pub fn new(x: u16, y: u16) -> Self {
        Self { x, y }
    }
}

pub struct EditorState {
    pub cursor: Cursor,
    pub viewport: Viewport,
    pub frame: FrameBuffer,
    policy: CursorPolicy,
}

impl EditorState {
    pub fn new(viewport: Viewport, policy: CursorPolicy, frame_capacity: usize) -> Self {
        Self {
            cursor: Cursor::default(),
            viewport,
            frame: FrameBuffer::with_capacity(frame_capacity),
            policy,
        }
    }

    pub fn policy(&self) -> CursorPolicy {
        self.policy
    }

    pub fn move_cursor(&mut self, movement: Movement) {
        let Cursor { x, y } = self.cursor;
        self.cursor = match self.policy {
            CursorPolicy::Clamped => {
                let max_x = self.viewport.cols.saturating_sub(1);
                let max_y = self.viewport.rows.saturating_sub(1);
                match movement {
                    Movement::Left => Cursor::new(x.saturating_sub(1), y),
                    Movement::Right => Cursor::new(x.saturating_add(1).min(max_x), y),
                    Movement::Up => Cursor::new(x, y.saturating_sub(1)),
                    Movement::Down => Cursor::new(x, y.saturating_add(1).min(max_y)),
                }
            }
            CursorPolicy::Unclamped => match movement {
                Movement::Left => Cursor::new(x.wrapping_sub(1), y),
                Movement::Right => Cursor::new(x.wrapping_add(1), y),
                Movement::Up => Cursor::new(x, y.wrapping_sub(1)),
                Movement::Down => Cursor::new(x, y.wrapping_add(1)),
            },
        };
    }

    pub fn reset_cursor(&mut self) {
        self.cursor = Cursor::default();
    }
}

#[cfg(test)]
#[path = "../../tests/unit/editor/state.rs"]
mod tests;
