use std::io;
use std::process::{Command, Stdio};

use crate::services::settings::CommandSpec;

/// The opaque external toolchain: a build that succeeds or fails, and an
/// optional clean-up run once supervision ends.
pub trait BuildStep {
    fn build(&mut self) -> io::Result<bool>;
    fn clean(&mut self) -> io::Result<()>;
}

/// Runs configured commands with inherited stdio, so compiler output lands on
/// the terminal while no session is active.
pub struct ShellBuildStep {
    build: CommandSpec,
    clean: Option<CommandSpec>,
}

impl ShellBuildStep {
    pub fn new(build: CommandSpec, clean: Option<CommandSpec>) -> Self {
        Self { build, clean }
    }

    fn command(spec: &CommandSpec) -> Command {
        let mut cmd = Command::new(&spec.program);
        cmd.args(&spec.args)
            .stdin(Stdio::null())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit());
        cmd
    }
}

impl BuildStep for ShellBuildStep {
    fn build(&mut self) -> io::Result<bool> {
        tracing::info!(program = %self.build.program, args = ?self.build.args, "running build step");
        let status = Self::command(&self.build).status()?;
        if !status.success() {
            tracing::warn!(%status, "build step failed");
        }
        Ok(status.success())
    }

    fn clean(&mut self) -> io::Result<()> {
        let Some(spec) = &self.clean else {
            tracing::debug!("no clean step configured");
            return Ok(());
        };

        tracing::info!(program = %spec.program, args = ?spec.args, "running clean step");
        let status = Self::command(spec).status()?;
        if !status.success() {
            return Err(io::Error::new(
                io::ErrorKind::Other,
                format!("clean step exited with {}", status),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/supervisor/build.rs"]
mod tests;
