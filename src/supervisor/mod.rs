//! Build → load → run → decide.
//!
//! Each iteration runs the build step and, when it succeeds, replaces the
//! current module with a freshly loaded one (the old one is unloaded first).
//! A failed build keeps the current module. The entry point's status decides
//! what happens next: `0` stops and `1` (or any other unrecognised nonzero)
//! reloads. `2` extends the plain stop/reload protocol: the session could not
//! run at all (no terminal, or the terminal was lost), and supervision ends
//! with `SessionFailed`.

pub mod build;
pub mod module;

use std::io;
use std::path::PathBuf;

use crate::editor::session::SessionStatus;
use build::BuildStep;
use module::{Module, ModuleLoader};

pub use build::ShellBuildStep;
pub use module::{InProcessLoader, ProcessModule, StagedBinaryLoader};

#[derive(Debug)]
pub enum SupervisorError {
    /// The build produced nothing usable, and no earlier module exists.
    NoModule,
    Load { path: PathBuf, source: io::Error },
    Entry { reason: String },
    /// The session reported it could not run (no terminal, lost terminal).
    SessionFailed(i32),
    Clean(io::Error),
}

impl std::fmt::Display for SupervisorError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SupervisorError::NoModule => write!(f, "build failed and no module was loaded before"),
            SupervisorError::Load { path, source } => {
                write!(f, "load module {} failed: {}", path.display(), source)
            }
            SupervisorError::Entry { reason } => write!(f, "module entry failed: {}", reason),
            SupervisorError::SessionFailed(code) => {
                write!(f, "session failed with status {}", code)
            }
            SupervisorError::Clean(err) => write!(f, "clean step failed: {}", err),
        }
    }
}

impl std::error::Error for SupervisorError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            SupervisorError::Load { source, .. } => Some(source),
            SupervisorError::Clean(err) => Some(err),
            _ => None,
        }
    }
}

/// What one supervision run amounted to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SupervisorReport {
    pub iterations: u32,
    pub failed_builds: u32,
}

pub struct Supervisor<B, L: ModuleLoader> {
    build: B,
    loader: L,
    current: Option<L::Module>,
}

impl<B: BuildStep, L: ModuleLoader> Supervisor<B, L> {
    pub fn new(build: B, loader: L) -> Self {
        Self {
            build,
            loader,
            current: None,
        }
    }

    /// Supervises until a session asks to stop, then runs the clean step.
    /// The clean step also runs when supervision ends in an error.
    pub fn run(mut self) -> Result<SupervisorReport, SupervisorError> {
        let result = self.supervise();

        // Unload before cleaning so nothing staged outlives the run.
        self.current = None;
        let cleaned = self.build.clean().map_err(SupervisorError::Clean);

        let report = result?;
        cleaned?;
        Ok(report)
    }

    fn supervise(&mut self) -> Result<SupervisorReport, SupervisorError> {
        let mut report = SupervisorReport {
            iterations: 0,
            failed_builds: 0,
        };

        loop {
            report.iterations += 1;
            let iteration = report.iterations;

            let built = match self.build.build() {
                Ok(built) => built,
                Err(err) => {
                    tracing::warn!(iteration, error = %err, "build step could not run");
                    false
                }
            };

            if built {
                // Unload the previous module before the new one takes its place.
                self.current = None;
                self.current = Some(self.loader.load()?);
            } else {
                report.failed_builds += 1;
                if self.current.is_none() {
                    tracing::error!(iteration, "build failed with no module to fall back on");
                    return Err(SupervisorError::NoModule);
                }
                tracing::warn!(iteration, "build failed, reusing previous module");
            }

            let Some(module) = self.current.as_mut() else {
                return Err(SupervisorError::NoModule);
            };
            let code = module.entry()?;
            tracing::info!(iteration, code, "module returned");

            match SessionStatus::from_code(code) {
                Some(SessionStatus::Exit) => return Ok(report),
                Some(SessionStatus::Failed) => return Err(SupervisorError::SessionFailed(code)),
                Some(SessionStatus::Reload) | None => {}
            }
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/supervisor/supervisor.rs"]
mod tests;
