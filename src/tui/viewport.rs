use std::io;
use std::os::unix::io::RawFd;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Viewport {
    pub rows: u16,
    pub cols: u16,
}

impl Viewport {
    pub fn new(rows: u16, cols: u16) -> Self {
        Self { rows, cols }
    }
}

/// Reads the window size of the terminal behind `fd`.
///
/// Fails when `fd` is not a terminal or reports a zero dimension; rendering
/// with an unknown size is never attempted.
pub fn query_viewport(fd: RawFd) -> io::Result<Viewport> {
    // SAFETY: winsize is plain old data; zeroed is a valid value.
    let mut ws: libc::winsize = unsafe { std::mem::zeroed() };
    // SAFETY: TIOCGWINSZ writes into the winsize we pass by pointer.
    let ret = unsafe { libc::ioctl(fd, libc::TIOCGWINSZ as _, &mut ws as *mut libc::winsize) };
    if ret == -1 {
        return Err(io::Error::last_os_error());
    }

    if ws.ws_row == 0 || ws.ws_col == 0 {
        return Err(io::Error::new(
            io::ErrorKind::Unsupported,
            "terminal reported an empty window size",
        ));
    }

    Ok(Viewport::new(ws.ws_row, ws.ws_col))
}

#[cfg(test)]
#[path = "../../tests/unit/tui/viewport.rs"]
mod tests;
