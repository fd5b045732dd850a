use super::*;
use crate::tui::terminal_guard::{TermiosOps, TerminalOps};
use crate::tui::test_pty::TestPty;

fn write_master(pty: &TestPty, bytes: &[u8]) {
    let n = unsafe { libc::write(pty.master, bytes.as_ptr().cast(), bytes.len()) };
    assert_eq!(n, bytes.len() as isize);
}

#[test]
fn read_byte_returns_bytes_in_order() {
    let pty = TestPty::open(24, 80).unwrap();
    let ops = TermiosOps::with_fds(pty.slave, pty.slave, 1);
    ops.enter_raw_mode().unwrap();
    write_master(&pty, b"lj");

    let mut input = FdInput::new(pty.slave);
    let mut got = Vec::new();
    while got.len() < 2 {
        if let Some(byte) = input.read_byte().unwrap() {
            got.push(byte);
        }
    }

    assert_eq!(got, b"lj");
    ops.restore().unwrap();
}

#[test]
fn read_byte_times_out_without_input() {
    let pty = TestPty::open(24, 80).unwrap();
    let ops = TermiosOps::with_fds(pty.slave, pty.slave, 1);
    ops.enter_raw_mode().unwrap();

    let mut input = FdInput::new(pty.slave);
    assert_eq!(input.read_byte().unwrap(), None);
    ops.restore().unwrap();
}

#[test]
fn read_byte_passes_control_codes_through_in_raw_mode() {
    let pty = TestPty::open(24, 80).unwrap();
    let ops = TermiosOps::with_fds(pty.slave, pty.slave, 1);
    ops.enter_raw_mode().unwrap();
    write_master(&pty, &[0x11]);

    let mut input = FdInput::new(pty.slave);
    let byte = loop {
        if let Some(byte) = input.read_byte().unwrap() {
            break byte;
        }
    };

    assert_eq!(byte, 0x11);
    ops.restore().unwrap();
}
