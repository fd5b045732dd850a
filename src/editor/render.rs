//! Frame composition.
//!
//! A frame homes the cursor, redraws every row (clear-line, margin marker,
//! banner on the row a third of the way down), flushes, then places the
//! cursor and flushes again.

use std::io::{self, Write};

use crossterm::terminal::{Clear, ClearType};
use crossterm::{cursor, queue};

use super::state::{Cursor, EditorState};
use crate::tui::frame::FrameBuffer;

pub const BANNER: &str = concat!("Meta-quine editor -- version ", env!("CARGO_PKG_VERSION"));

const MARGIN_MARKER: &[u8] = b"+";
const LINE_BREAK: &[u8] = b"\r\n";

pub fn banner_row(rows: u16) -> u16 {
    rows / 3
}

/// Left padding that centres a banner of `banner_len` bytes in `cols`
/// columns. A banner wider than the screen gets no padding and overflows.
pub fn banner_padding(cols: u16, banner_len: usize) -> usize {
    usize::from(cols).saturating_sub(banner_len) / 2
}

pub fn queue_cursor_home(frame: &mut FrameBuffer) -> io::Result<()> {
    queue!(frame, cursor::MoveTo(0, 0))
}

/// 1-indexed row/column. Written by hand so an unclamped cursor near
/// `u16::MAX` cannot overflow the conversion.
pub fn queue_cursor_position(frame: &mut FrameBuffer, position: Cursor) -> io::Result<()> {
    write!(
        frame,
        "\x1b[{};{}H",
        u32::from(position.y) + 1,
        u32::from(position.x) + 1
    )
}

pub fn draw_rows(state: &mut EditorState) -> io::Result<()> {
    let rows = state.viewport.rows;
    let cols = state.viewport.cols;
    let frame = &mut state.frame;

    queue_cursor_home(frame)?;
    for i in 0..rows {
        queue!(frame, Clear(ClearType::UntilNewLine))?;
        frame.append(MARGIN_MARKER);

        if i == banner_row(rows) {
            let padding = banner_padding(cols, BANNER.len());
            frame.append(" ".repeat(padding).as_bytes());
            frame.append(BANNER.as_bytes());
        }

        if i + 1 < rows {
            frame.append(LINE_BREAK);
        }
    }
    Ok(())
}

pub fn render_frame<W: Write>(state: &mut EditorState, out: &mut W) -> io::Result<()> {
    draw_rows(state)?;
    state.frame.flush(out)?;

    queue_cursor_position(&mut state.frame, state.cursor)?;
    state.frame.flush(out)
}

pub fn clear_screen<W: Write>(state: &mut EditorState, out: &mut W) -> io::Result<()> {
    queue!(state.frame, Clear(ClearType::All))?;
    state.frame.flush(out)
}

#[cfg(test)]
#[path = "../../tests/unit/editor/render.rs"]
mod tests;
