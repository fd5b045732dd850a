use std::process::ExitCode;

use metaquine::editor::session::run_stdio;
use metaquine::services::settings::{load_settings, ModuleMode, Settings};
use metaquine::supervisor::{
    InProcessLoader, ShellBuildStep, StagedBinaryLoader, Supervisor, SupervisorError,
    SupervisorReport,
};

mod logging;

const USAGE: &str = "usage: metaquine [supervise|session]";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mode {
    /// Rebuild and relaunch sessions until one quits.
    Supervise,
    /// Run a single session; the exit code is its status.
    Session,
}

impl Mode {
    fn role(self) -> &'static str {
        match self {
            Mode::Supervise => "supervisor",
            Mode::Session => "session",
        }
    }
}

fn parse_mode(arg: Option<&str>) -> Result<Mode, String> {
    match arg {
        None | Some("supervise") => Ok(Mode::Supervise),
        Some("session") => Ok(Mode::Session),
        Some(other) => Err(format!("unknown command: {other}")),
    }
}

fn supervise(settings: &Settings) -> Result<SupervisorReport, SupervisorError> {
    let sup = &settings.supervisor;
    let build = ShellBuildStep::new(sup.build.clone(), sup.clean.clone());

    match sup.mode {
        ModuleMode::Process => {
            let loader = StagedBinaryLoader::new(&sup.artifact, sup.staging_dir());
            Supervisor::new(build, loader).run()
        }
        ModuleMode::InProcess => {
            let loader = InProcessLoader::new(settings.editor.clone());
            Supervisor::new(build, loader).run()
        }
    }
}

fn main() -> ExitCode {
    let arg = std::env::args().nth(1);
    let mode = match parse_mode(arg.as_deref()) {
        Ok(mode) => mode,
        Err(msg) => {
            eprintln!("{msg}\n{USAGE}");
            return ExitCode::from(2);
        }
    };

    let logging = logging::init(mode.role());
    let settings = load_settings();

    match mode {
        Mode::Session => {
            let status = run_stdio(&settings.editor);
            ExitCode::from(status.code() as u8)
        }
        Mode::Supervise => match supervise(&settings) {
            Ok(report) => {
                tracing::info!(
                    iterations = report.iterations,
                    failed_builds = report.failed_builds,
                    "supervisor finished"
                );
                ExitCode::SUCCESS
            }
            Err(err) => {
                tracing::error!(error = %err, "supervisor failed");
                eprintln!("metaquine: {err}");
                if let Some(logging) = &logging {
                    eprintln!("logs: {}", logging.log_dir().display());
                }
                ExitCode::FAILURE
            }
        },
    }
}

#[cfg(test)]
#[path = "../tests/unit/cli.rs"]
mod tests;
