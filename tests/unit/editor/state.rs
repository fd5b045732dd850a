use super::*;

fn state(policy: CursorPolicy) -> EditorState {
    EditorState::new(Viewport::new(24, 80), policy, 64)
}

#[test]
fn cursor_starts_at_origin() {
    let state = state(CursorPolicy::Clamped);
    assert_eq!(state.cursor, Cursor::new(0, 0));
    assert!(state.frame.is_empty());
}

#[test]
fn moving_right_twice_advances_two_columns() {
    let mut state = state(CursorPolicy::Clamped);
    state.move_cursor(Movement::Right);
    state.move_cursor(Movement::Right);

    assert_eq!(state.cursor, Cursor::new(2, 0));
}

#[test]
fn clamped_cursor_stops_at_every_edge() {
    let mut state = state(CursorPolicy::Clamped);

    state.move_cursor(Movement::Left);
    state.move_cursor(Movement::Up);
    assert_eq!(state.cursor, Cursor::new(0, 0));

    for _ in 0..200 {
        state.move_cursor(Movement::Right);
        state.move_cursor(Movement::Down);
    }
    assert_eq!(state.cursor, Cursor::new(79, 23));
}

#[test]
fn unclamped_cursor_leaves_the_viewport() {
    let mut state = state(CursorPolicy::Unclamped);

    for _ in 0..100 {
        state.move_cursor(Movement::Right);
    }
    state.move_cursor(Movement::Down);
    assert_eq!(state.cursor, Cursor::new(100, 1));
}

#[test]
fn unclamped_cursor_wraps_below_zero_instead_of_panicking() {
    let mut state = state(CursorPolicy::Unclamped);

    state.move_cursor(Movement::Left);
    state.move_cursor(Movement::Up);
    assert_eq!(state.cursor, Cursor::new(u16::MAX, u16::MAX));

    state.move_cursor(Movement::Right);
    assert_eq!(state.cursor.x, 0);
}

#[test]
fn reset_cursor_returns_to_origin() {
    let mut state = state(CursorPolicy::Clamped);
    state.move_cursor(Movement::Down);
    state.reset_cursor();

    assert_eq!(state.cursor, Cursor::default());
}

#[test]
fn state_reports_its_cursor_policy() {
    assert_eq!(state(CursorPolicy::Clamped).policy(), CursorPolicy::Clamped);
    assert_eq!(state(CursorPolicy::Unclamped).policy(), CursorPolicy::Unclamped);
}
