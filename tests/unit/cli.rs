use super::*;

#[test]
fn no_argument_supervises() {
    assert_eq!(parse_mode(None), Ok(Mode::Supervise));
    assert_eq!(parse_mode(Some("supervise")), Ok(Mode::Supervise));
}

#[test]
fn session_argument_runs_one_session() {
    assert_eq!(parse_mode(Some("session")), Ok(Mode::Session));
    assert_eq!(Mode::Session.role(), "session");
}

#[test]
fn unknown_argument_is_rejected() {
    let err = parse_mode(Some("edit")).unwrap_err();
    assert!(err.contains("edit"));
}
