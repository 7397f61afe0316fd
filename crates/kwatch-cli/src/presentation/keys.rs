use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use kwatch_core::Key;

/// Map a terminal key event to the state machine's key alphabet. Keys with
/// no binding decode to `None` and are dropped.
pub fn decode_key(event: KeyEvent) -> Option<Key> {
    if event.modifiers.contains(KeyModifiers::CONTROL) {
        return match event.code {
            KeyCode::Char('c') => Some(Key::CtrlC),
            _ => None,
        };
    }
    match event.code {
        KeyCode::Char(c) => Some(Key::Char(c)),
        KeyCode::Enter => Some(Key::Enter),
        KeyCode::Esc => Some(Key::Esc),
        KeyCode::Backspace => Some(Key::Backspace),
        KeyCode::Tab => Some(Key::Tab),
        KeyCode::Left => Some(Key::Left),
        KeyCode::Right => Some(Key::Right),
        KeyCode::Home => Some(Key::Home),
        KeyCode::End => Some(Key::End),
        KeyCode::PageUp => Some(Key::PageUp),
        KeyCode::PageDown => Some(Key::PageDown),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::KeyEventState;

    fn key(code: KeyCode, modifiers: KeyModifiers) -> KeyEvent {
        KeyEvent {
            code,
            modifiers,
            kind: crossterm::event::KeyEventKind::Press,
            state: KeyEventState::NONE,
        }
    }

    #[test]
    fn ctrl_c_decodes_to_quit() {
        assert_eq!(
            decode_key(key(KeyCode::Char('c'), KeyModifiers::CONTROL)),
            Some(Key::CtrlC)
        );
    }

    #[test]
    fn plain_chars_pass_through() {
        assert_eq!(
            decode_key(key(KeyCode::Char('d'), KeyModifiers::NONE)),
            Some(Key::Char('d'))
        );
        assert_eq!(
            decode_key(key(KeyCode::Char('/'), KeyModifiers::NONE)),
            Some(Key::Char('/'))
        );
    }

    #[test]
    fn unbound_keys_are_dropped() {
        assert_eq!(decode_key(key(KeyCode::F(5), KeyModifiers::NONE)), None);
        assert_eq!(
            decode_key(key(KeyCode::Char('x'), KeyModifiers::CONTROL)),
            None
        );
    }
}
