use std::io;
use std::os::unix::io::RawFd;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, Receiver};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use signal_hook::consts::signal::{SIGHUP, SIGINT, SIGTERM};
use signal_hook::iterator::{Handle, Signals};

use super::viewport::{query_viewport, Viewport};

pub const DEFAULT_READ_TIMEOUT_DS: u8 = 1;

const TERMINATION_GRACE: Duration = Duration::from_secs(2);
const TERMINATION_SIGNALS: [i32; 3] = [SIGHUP, SIGINT, SIGTERM];

static IDLE_DEFAULT: Mutex<Option<Arc<AtomicBool>>> = Mutex::new(None);

pub trait TerminalOps: Send + Sync + 'static {
    fn enter_raw_mode(&self) -> io::Result<()>;
    fn restore(&self) -> io::Result<()>;
    fn viewport(&self) -> io::Result<Viewport>;
}

/// Raw mode through termios on a pair of descriptors: attributes are taken
/// from the input side, the window size from the output side.
pub struct TermiosOps {
    input_fd: RawFd,
    output_fd: RawFd,
    read_timeout_ds: u8,
    original: Mutex<Option<libc::termios>>,
}

impl TermiosOps {
    pub fn stdio(read_timeout_ds: u8) -> Self {
        Self::with_fds(libc::STDIN_FILENO, libc::STDOUT_FILENO, read_timeout_ds)
    }

    pub fn with_fds(input_fd: RawFd, output_fd: RawFd, read_timeout_ds: u8) -> Self {
        Self {
            input_fd,
            output_fd,
            read_timeout_ds,
            original: Mutex::new(None),
        }
    }

    fn get_attrs(&self) -> io::Result<libc::termios> {
        // SAFETY: termios is plain old data; tcgetattr fills it in.
        let mut attrs: libc::termios = unsafe { std::mem::zeroed() };
        // SAFETY: `attrs` is a valid, writable termios.
        if unsafe { libc::tcgetattr(self.input_fd, &mut attrs) } != 0 {
            return Err(io::Error::last_os_error());
        }
        Ok(attrs)
    }

    fn set_attrs(&self, attrs: &libc::termios) -> io::Result<()> {
        // SAFETY: `attrs` points at a fully initialized termios.
        if unsafe { libc::tcsetattr(self.input_fd, libc::TCSAFLUSH, attrs) } != 0 {
            return Err(io::Error::last_os_error());
        }
        Ok(())
    }

    fn lock_original(&self) -> std::sync::MutexGuard<'_, Option<libc::termios>> {
        self.original
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

pub fn make_raw(attrs: &mut libc::termios, read_timeout_ds: u8) {
    attrs.c_iflag &= !(libc::BRKINT | libc::ICRNL | libc::INPCK | libc::ISTRIP | libc::IXON);
    attrs.c_oflag &= !libc::OPOST;
    attrs.c_cflag |= libc::CS8;
    attrs.c_lflag &= !(libc::ECHO | libc::ICANON | libc::IEXTEN | libc::ISIG);

    // read() returns as soon as anything is available, or after the timeout
    // with nothing.
    attrs.c_cc[libc::VMIN] = 0;
    attrs.c_cc[libc::VTIME] = read_timeout_ds;
}

impl TerminalOps for TermiosOps {
    fn enter_raw_mode(&self) -> io::Result<()> {
        let original = self.get_attrs()?;
        *self.lock_original() = Some(original);

        let mut raw = original;
        make_raw(&mut raw, self.read_timeout_ds);
        self.set_attrs(&raw)
    }

    fn restore(&self) -> io::Result<()> {
        let original = *self.lock_original();
        match original {
            Some(attrs) => self.set_attrs(&attrs),
            None => Ok(()),
        }
    }

    fn viewport(&self) -> io::Result<Viewport> {
        query_viewport(self.output_fd)
    }
}

#[derive(Clone)]
pub struct TerminalRestorer {
    restored: Arc<AtomicBool>,
    ops: Arc<dyn TerminalOps>,
}

impl TerminalRestorer {
    pub fn restore(&self) -> io::Result<()> {
        if self.restored.swap(true, Ordering::SeqCst) {
            return Ok(());
        }
        self.ops.restore()
    }

    pub fn is_restored(&self) -> bool {
        self.restored.load(Ordering::SeqCst)
    }
}

/// Holds the terminal in raw mode. Dropping the guard puts the original
/// attributes back, whichever way the session ends.
pub struct TerminalGuard {
    restorer: TerminalRestorer,
}

impl TerminalGuard {
    pub fn with_ops(ops: Arc<dyn TerminalOps>) -> io::Result<Self> {
        ops.enter_raw_mode()?;
        Ok(Self {
            restorer: TerminalRestorer {
                restored: Arc::new(AtomicBool::new(false)),
                ops,
            },
        })
    }

    pub fn restorer(&self) -> TerminalRestorer {
        self.restorer.clone()
    }
}

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        if let Err(err) = self.restorer.restore() {
            tracing::error!(error = %err, "restore terminal attributes failed");
        }
    }
}

/// Restores the terminal before any panic message is reported, then defers
/// to whichever hook was installed before.
pub struct PanicRestoreHook {
    reinstall: Option<Box<dyn FnOnce()>>,
}

impl PanicRestoreHook {
    pub fn install(restorer: TerminalRestorer) -> Self {
        let previous = Arc::new(std::panic::take_hook());
        let chained = previous.clone();
        std::panic::set_hook(Box::new(move |info| {
            let _ = restorer.restore();
            chained(info);
        }));

        Self {
            reinstall: Some(Box::new(move || {
                std::panic::set_hook(Box::new(move |info| previous(info)));
            })),
        }
    }
}

impl Drop for PanicRestoreHook {
    fn drop(&mut self) {
        // The hook cannot be swapped while unwinding.
        if std::thread::panicking() {
            return;
        }
        if let Some(reinstall) = self.reinstall.take() {
            let _ = std::panic::take_hook();
            reinstall();
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TerminationSignal {
    SigHup,
    SigInt,
    SigTerm,
}

impl TerminationSignal {
    pub fn exit_code(self) -> i32 {
        match self {
            TerminationSignal::SigHup => 129,
            TerminationSignal::SigInt => 130,
            TerminationSignal::SigTerm => 143,
        }
    }

    fn from_raw(sig: i32) -> Option<Self> {
        match sig {
            SIGHUP => Some(TerminationSignal::SigHup),
            SIGINT => Some(TerminationSignal::SigInt),
            SIGTERM => Some(TerminationSignal::SigTerm),
            _ => None,
        }
    }
}

/// Process-wide switch, registered once: while set, termination signals
/// take their default action. Signal-hook's handler stays installed after a
/// `Signals` iterator is closed.
fn idle_default() -> io::Result<Arc<AtomicBool>> {
    let mut slot = IDLE_DEFAULT
        .lock()
        .unwrap_or_else(|poisoned| poisoned.into_inner());
    if let Some(idle) = slot.as_ref() {
        return Ok(idle.clone());
    }

    let idle = Arc::new(AtomicBool::new(true));
    for sig in TERMINATION_SIGNALS {
        signal_hook::flag::register_conditional_default(sig, idle.clone())?;
    }
    *slot = Some(idle.clone());
    Ok(idle)
}

/// Forwards termination signals to the session loop, which polls them on
/// idle ticks. If the loop does not finish within the grace period the
/// watcher restores the terminal itself and hard-exits. Once the watch is
/// dropped the signals act as if it had never been installed.
pub struct TerminationWatch {
    rx: Receiver<TerminationSignal>,
    handle: Handle,
    finished: Arc<AtomicBool>,
    idle: Arc<AtomicBool>,
}

impl TerminationWatch {
    pub fn install(restorer: TerminalRestorer) -> io::Result<Self> {
        let idle = idle_default()?;
        let mut signals = Signals::new(TERMINATION_SIGNALS)?;
        let handle = signals.handle();
        let finished = Arc::new(AtomicBool::new(false));
        let (tx, rx) = mpsc::channel();

        let thread_finished = finished.clone();
        std::thread::Builder::new()
            .name("metaquine-signals".to_string())
            .spawn(move || {
                for sig in signals.forever() {
                    let Some(signal) = TerminationSignal::from_raw(sig) else {
                        continue;
                    };

                    let _ = tx.send(signal);

                    std::thread::sleep(TERMINATION_GRACE);
                    if thread_finished.load(Ordering::SeqCst) {
                        return;
                    }
                    let _ = restorer.restore();
                    std::process::exit(signal.exit_code());
                }
            })?;

        idle.store(false, Ordering::SeqCst);
        Ok(Self {
            rx,
            handle,
            finished,
            idle,
        })
    }

    pub fn poll(&self) -> Option<TerminationSignal> {
        self.rx.try_recv().ok()
    }
}

impl Drop for TerminationWatch {
    fn drop(&mut self) {
        self.finished.store(true, Ordering::SeqCst);
        self.idle.store(true, Ordering::SeqCst);
        self.handle.close();
    }
}

#[cfg(test)]
#[path = "../../tests/unit/tui/terminal_guard.rs"]
mod tests;
