use std::io;
use std::os::unix::io::RawFd;

/// One byte at a time, bounded by the terminal's read timeout.
pub trait InputSource {
    /// `Ok(None)` means the timeout elapsed with nothing to read.
    fn read_byte(&mut self) -> io::Result<Option<u8>>;
}

/// Unbuffered reads straight from a descriptor, so the raw-mode VMIN/VTIME
/// settings decide how long a read may block.
pub struct FdInput {
    fd: RawFd,
}

impl FdInput {
    pub fn stdin() -> Self {
        Self::new(libc::STDIN_FILENO)
    }

    pub fn new(fd: RawFd) -> Self {
        Self { fd }
    }
}

impl InputSource for FdInput {
    fn read_byte(&mut self) -> io::Result<Option<u8>> {
        let mut byte = 0u8;
        // SAFETY: reading at most one byte into a valid stack location.
        let n = unsafe { libc::read(self.fd, (&mut byte as *mut u8).cast(), 1) };
        match n {
            1 => Ok(Some(byte)),
            0 => Ok(None),
            _ => {
                let err = io::Error::last_os_error();
                match err.kind() {
                    io::ErrorKind::Interrupted | io::ErrorKind::WouldBlock => Ok(None),
                    _ => Err(err),
                }
            }
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/tui/input.rs"]
mod tests;
