use super::*;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

type Log = Arc<Mutex<Vec<String>>>;

fn push(log: &Log, entry: String) {
    log.lock().unwrap().push(entry);
}

struct ScriptedBuild {
    results: VecDeque<io::Result<bool>>,
    log: Log,
    clean_fails: bool,
}

impl ScriptedBuild {
    fn new(results: Vec<io::Result<bool>>, log: Log) -> Self {
        Self {
            results: results.into(),
            log,
            clean_fails: false,
        }
    }
}

impl BuildStep for ScriptedBuild {
    fn build(&mut self) -> io::Result<bool> {
        let result = self.results.pop_front().unwrap_or(Ok(true));
        push(&self.log, format!("build {}", matches!(result, Ok(true))));
        result
    }

    fn clean(&mut self) -> io::Result<()> {
        push(&self.log, "clean".to_string());
        if self.clean_fails {
            return Err(io::Error::new(io::ErrorKind::Other, "clean failed"));
        }
        Ok(())
    }
}

/// Hands out modules that return scripted statuses, one per entry call
/// across all modules.
struct MockLoader {
    statuses: Arc<Mutex<VecDeque<i32>>>,
    loads: u32,
    fail_load: bool,
    log: Log,
}

impl MockLoader {
    fn new(statuses: &[i32], log: Log) -> Self {
        Self {
            statuses: Arc::new(Mutex::new(statuses.iter().copied().collect())),
            loads: 0,
            fail_load: false,
            log,
        }
    }
}

struct MockModule {
    id: u32,
    statuses: Arc<Mutex<VecDeque<i32>>>,
    log: Log,
}

impl ModuleLoader for MockLoader {
    type Module = MockModule;

    fn load(&mut self) -> Result<MockModule, SupervisorError> {
        if self.fail_load {
            return Err(SupervisorError::Load {
                path: PathBuf::from("module.so"),
                source: io::Error::new(io::ErrorKind::NotFound, "missing"),
            });
        }
        self.loads += 1;
        push(&self.log, format!("load {}", self.loads));
        Ok(MockModule {
            id: self.loads,
            statuses: self.statuses.clone(),
            log: self.log.clone(),
        })
    }
}

impl Module for MockModule {
    fn entry(&mut self) -> Result<i32, SupervisorError> {
        let code = self.statuses.lock().unwrap().pop_front().unwrap_or(0);
        push(&self.log, format!("entry {} -> {}", self.id, code));
        Ok(code)
    }
}

impl Drop for MockModule {
    fn drop(&mut self) {
        push(&self.log, format!("unload {}", self.id));
    }
}

fn log_of(log: &Log) -> Vec<String> {
    log.lock().unwrap().clone()
}

#[test]
fn exit_status_stops_after_one_iteration() {
    let log = Log::default();
    let supervisor = Supervisor::new(
        ScriptedBuild::new(vec![Ok(true)], log.clone()),
        MockLoader::new(&[0], log.clone()),
    );

    let report = supervisor.run().unwrap();

    assert_eq!(report.iterations, 1);
    assert_eq!(
        log_of(&log),
        ["build true", "load 1", "entry 1 -> 0", "unload 1", "clean"]
    );
}

#[test]
fn reload_unloads_old_module_before_loading_new_one() {
    let log = Log::default();
    let supervisor = Supervisor::new(
        ScriptedBuild::new(vec![Ok(true), Ok(true)], log.clone()),
        MockLoader::new(&[1, 0], log.clone()),
    );

    let report = supervisor.run().unwrap();

    assert_eq!(report.iterations, 2);
    assert_eq!(
        log_of(&log),
        [
            "build true",
            "load 1",
            "entry 1 -> 1",
            "build true",
            "unload 1",
            "load 2",
            "entry 2 -> 0",
            "unload 2",
            "clean"
        ]
    );
}

#[test]
fn failed_build_reuses_previous_module() {
    let log = Log::default();
    let supervisor = Supervisor::new(
        ScriptedBuild::new(vec![Ok(true), Ok(false)], log.clone()),
        MockLoader::new(&[1, 0], log.clone()),
    );

    let report = supervisor.run().unwrap();

    assert_eq!(report.failed_builds, 1);
    assert_eq!(
        log_of(&log),
        [
            "build true",
            "load 1",
            "entry 1 -> 1",
            "build false",
            "entry 1 -> 0",
            "unload 1",
            "clean"
        ]
    );
}

#[test]
fn build_step_that_cannot_run_counts_as_failed_build() {
    let log = Log::default();
    let supervisor = Supervisor::new(
        ScriptedBuild::new(
            vec![
                Ok(true),
                Err(io::Error::new(io::ErrorKind::NotFound, "no cargo")),
            ],
            log.clone(),
        ),
        MockLoader::new(&[1, 0], log.clone()),
    );

    let report = supervisor.run().unwrap();

    assert_eq!(report.iterations, 2);
    assert_eq!(report.failed_builds, 1);
    assert!(log_of(&log).contains(&"entry 1 -> 0".to_string()));
}

#[test]
fn failed_first_build_has_nothing_to_fall_back_on() {
    let log = Log::default();
    let supervisor = Supervisor::new(
        ScriptedBuild::new(vec![Ok(false)], log.clone()),
        MockLoader::new(&[0], log.clone()),
    );

    let err = supervisor.run().unwrap_err();

    assert!(matches!(err, SupervisorError::NoModule));
    assert_eq!(log_of(&log), ["build false", "clean"]);
}

#[test]
fn load_failure_is_fatal_but_still_cleans() {
    let log = Log::default();
    let mut loader = MockLoader::new(&[0], log.clone());
    loader.fail_load = true;
    let supervisor = Supervisor::new(ScriptedBuild::new(vec![Ok(true)], log.clone()), loader);

    let err = supervisor.run().unwrap_err();

    assert!(matches!(err, SupervisorError::Load { .. }));
    assert_eq!(log_of(&log), ["build true", "clean"]);
}

#[test]
fn failed_session_ends_supervision() {
    let log = Log::default();
    let supervisor = Supervisor::new(
        ScriptedBuild::new(vec![Ok(true)], log.clone()),
        MockLoader::new(&[SessionStatus::Failed.code()], log.clone()),
    );

    let err = supervisor.run().unwrap_err();

    assert!(matches!(err, SupervisorError::SessionFailed(2)));
    assert_eq!(log_of(&log).last().map(String::as_str), Some("clean"));
}

#[test]
fn unrecognised_nonzero_status_reloads() {
    let log = Log::default();
    let supervisor = Supervisor::new(
        ScriptedBuild::new(vec![], log.clone()),
        MockLoader::new(&[42, 0], log.clone()),
    );

    let report = supervisor.run().unwrap();

    assert_eq!(report.iterations, 2);
}

#[test]
fn clean_failure_is_reported_after_successful_run() {
    let log = Log::default();
    let mut build = ScriptedBuild::new(vec![Ok(true)], log.clone());
    build.clean_fails = true;
    let supervisor = Supervisor::new(build, MockLoader::new(&[0], log.clone()));

    let err = supervisor.run().unwrap_err();

    assert!(matches!(err, SupervisorError::Clean(_)));
}
