//! Loadable modules.
//!
//! A module is loaded once, has its entry point invoked, and is unloaded by
//! dropping it. Process mode stages a private copy of the build artifact per
//! load, so later rebuilds never touch a module that is still in use.
//! Snapshots live in a directory only this process can enter, and are
//! created exclusively, never through an existing path.

use std::fs::{self, File, OpenOptions};
use std::io;
use std::os::unix::fs::{OpenOptionsExt, PermissionsExt};
use std::path::{Path, PathBuf};
use std::process::Command;
use std::time::Duration;

use tempfile::TempDir;

use super::SupervisorError;
use crate::editor::session::run_stdio;
use crate::services::settings::EditorSettings;

const SPAWN_BUSY_RETRIES: u32 = 5;
const SPAWN_BUSY_DELAY: Duration = Duration::from_millis(20);
const OWNER_ONLY: u32 = 0o700;
const SESSION_ARG: &str = "session";

pub trait Module {
    /// Runs one full session and returns its status.
    fn entry(&mut self) -> Result<i32, SupervisorError>;
}

pub trait ModuleLoader {
    type Module: Module;

    fn load(&mut self) -> Result<Self::Module, SupervisorError>;
}

pub struct StagedBinaryLoader {
    artifact: PathBuf,
    staging_root: PathBuf,
    staging: Option<TempDir>,
    generation: u64,
}

impl StagedBinaryLoader {
    /// Snapshots go into a fresh private directory under `staging_root`,
    /// created on first load and removed with the loader.
    pub fn new(artifact: impl Into<PathBuf>, staging_root: impl Into<PathBuf>) -> Self {
        Self {
            artifact: artifact.into(),
            staging_root: staging_root.into(),
            staging: None,
            generation: 0,
        }
    }

    fn stem(&self) -> String {
        self.artifact
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| "module".to_string())
    }

    fn staging_dir(&mut self) -> io::Result<&Path> {
        let dir = match self.staging.take() {
            Some(dir) => dir,
            None => {
                fs::create_dir_all(&self.staging_root)?;
                // Random name, mode 0700.
                let dir = tempfile::Builder::new()
                    .prefix(&format!("{}-", self.stem()))
                    .tempdir_in(&self.staging_root)?;
                tracing::debug!(dir = %dir.path().display(), "staging directory created");
                dir
            }
        };
        Ok(self.staging.insert(dir).path())
    }

    fn stage(&mut self) -> io::Result<PathBuf> {
        let name = format!("{}-{}", self.stem(), self.generation);
        let staged = self.staging_dir()?.join(name);

        let mut source = File::open(&self.artifact)?;
        // The artifact's permission bits, restricted to the owner.
        let mode = source.metadata()?.permissions().mode() & OWNER_ONLY;
        let mut target = OpenOptions::new()
            .write(true)
            .create_new(true)
            .mode(mode)
            .open(&staged)?;
        if let Err(err) = io::copy(&mut source, &mut target) {
            let _ = fs::remove_file(&staged);
            return Err(err);
        }
        Ok(staged)
    }
}

impl ModuleLoader for StagedBinaryLoader {
    type Module = ProcessModule;

    fn load(&mut self) -> Result<ProcessModule, SupervisorError> {
        self.generation += 1;
        let staged = self.stage().map_err(|source| SupervisorError::Load {
            path: self.artifact.clone(),
            source,
        })?;

        tracing::info!(
            artifact = %self.artifact.display(),
            staged = %staged.display(),
            generation = self.generation,
            "module loaded"
        );
        Ok(ProcessModule { path: staged })
    }
}

pub struct ProcessModule {
    path: PathBuf,
}

impl ProcessModule {
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn spawn_and_wait(&self) -> io::Result<std::process::ExitStatus> {
        let mut attempt = 0;
        loop {
            match Command::new(&self.path).arg(SESSION_ARG).status() {
                // A freshly written executable can still be open for writing
                // in a concurrently forked child.
                Err(err)
                    if err.raw_os_error() == Some(libc::ETXTBSY)
                        && attempt < SPAWN_BUSY_RETRIES =>
                {
                    attempt += 1;
                    std::thread::sleep(SPAWN_BUSY_DELAY);
                }
                result => return result,
            }
        }
    }
}

impl Module for ProcessModule {
    fn entry(&mut self) -> Result<i32, SupervisorError> {
        let status = self.spawn_and_wait().map_err(|source| SupervisorError::Entry {
            reason: format!("spawn {} failed: {}", self.path.display(), source),
        })?;

        status.code().ok_or_else(|| SupervisorError::Entry {
            reason: format!("{} terminated without a status ({})", self.path.display(), status),
        })
    }
}

impl Drop for ProcessModule {
    fn drop(&mut self) {
        match fs::remove_file(&self.path) {
            Ok(()) => tracing::info!(staged = %self.path.display(), "module unloaded"),
            Err(err) => {
                tracing::warn!(staged = %self.path.display(), error = %err, "remove staged module failed")
            }
        }
    }
}

/// Each load is a fresh session component living in this process.
pub struct InProcessLoader {
    editor: EditorSettings,
}

impl InProcessLoader {
    pub fn new(editor: EditorSettings) -> Self {
        Self { editor }
    }
}

impl ModuleLoader for InProcessLoader {
    type Module = InProcessModule;

    fn load(&mut self) -> Result<InProcessModule, SupervisorError> {
        Ok(InProcessModule {
            editor: self.editor.clone(),
        })
    }
}

pub struct InProcessModule {
    editor: EditorSettings,
}

impl Module for InProcessModule {
    fn entry(&mut self) -> Result<i32, SupervisorError> {
        Ok(run_stdio(&self.editor).code())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/supervisor/module.rs"]
mod tests;
