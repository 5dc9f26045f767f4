use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputAction {
    None,
    Quit,
    ToggleHelp,
    Submit,
    Insert(char),
    Backspace,
    ClearLine,
    HistoryPrev,
    HistoryNext,
    ScrollUp,
    ScrollDown,
    Complete,
}

/// Printable keys always go to the input line; only control keys steer the
/// UI.
pub fn map_key(key: KeyEvent) -> InputAction {
    let control = key.modifiers.contains(KeyModifiers::CONTROL);
    match key.code {
        KeyCode::Char('c') | KeyCode::Char('d') if control => InputAction::Quit,
        KeyCode::Char('u') if control => InputAction::ClearLine,
        KeyCode::Esc => InputAction::Quit,
        KeyCode::F(1) => InputAction::ToggleHelp,
        KeyCode::Enter => InputAction::Submit,
        KeyCode::Backspace => InputAction::Backspace,
        KeyCode::Tab => InputAction::Complete,
        KeyCode::Up => InputAction::HistoryPrev,
        KeyCode::Down => InputAction::HistoryNext,
        KeyCode::PageUp => InputAction::ScrollUp,
        KeyCode::PageDown => InputAction::ScrollDown,
        KeyCode::Char(ch) if !control => InputAction::Insert(ch),
        _ => InputAction::None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    #[test]
    fn maps_editing_keys() {
        assert_eq!(map_key(key(KeyCode::Char('q'))), InputAction::Insert('q'));
        assert_eq!(
            map_key(KeyEvent::new(KeyCode::Char('S'), KeyModifiers::SHIFT)),
            InputAction::Insert('S')
        );
        assert_eq!(map_key(key(KeyCode::Enter)), InputAction::Submit);
        assert_eq!(map_key(key(KeyCode::Backspace)), InputAction::Backspace);
        assert_eq!(map_key(key(KeyCode::Tab)), InputAction::Complete);
        assert_eq!(map_key(key(KeyCode::Up)), InputAction::HistoryPrev);
        assert_eq!(map_key(key(KeyCode::PageDown)), InputAction::ScrollDown);
    }

    #[test]
    fn maps_control_keys() {
        assert_eq!(
            map_key(KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL)),
            InputAction::Quit
        );
        assert_eq!(
            map_key(KeyEvent::new(KeyCode::Char('u'), KeyModifiers::CONTROL)),
            InputAction::ClearLine
        );
        assert_eq!(
            map_key(KeyEvent::new(KeyCode::Char('x'), KeyModifiers::CONTROL)),
            InputAction::None
        );
        assert_eq!(map_key(key(KeyCode::F(1))), InputAction::ToggleHelp);
        assert_eq!(map_key(key(KeyCode::Esc)), InputAction::Quit);
    }
}
