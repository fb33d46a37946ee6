//! Keyboard bridge: desktop keys that drive the same transport operations
//! as touch gestures.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyInput {
    Char(char),
    Left,
    Right,
    Other,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyCommand {
    TogglePlay,
    StepBackward,
    StepForward,
}

/// Map a key press to a transport command. Nothing maps while a text field
/// has focus, so typing a space or a period never moves the playhead.
pub fn key_command(key: KeyInput, text_entry_focused: bool) -> Option<KeyCommand> {
    if text_entry_focused {
        return None;
    }

    match key {
        KeyInput::Char(' ') => Some(KeyCommand::TogglePlay),
        KeyInput::Char(',') | KeyInput::Left => Some(KeyCommand::StepBackward),
        KeyInput::Char('.') | KeyInput::Right => Some(KeyCommand::StepForward),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transport_keys() {
        assert_eq!(
            key_command(KeyInput::Char(' '), false),
            Some(KeyCommand::TogglePlay)
        );
        assert_eq!(
            key_command(KeyInput::Char(','), false),
            Some(KeyCommand::StepBackward)
        );
        assert_eq!(
            key_command(KeyInput::Left, false),
            Some(KeyCommand::StepBackward)
        );
        assert_eq!(
            key_command(KeyInput::Char('.'), false),
            Some(KeyCommand::StepForward)
        );
        assert_eq!(
            key_command(KeyInput::Right, false),
            Some(KeyCommand::StepForward)
        );
    }

    #[test]
    fn test_unmapped_keys() {
        assert_eq!(key_command(KeyInput::Char('q'), false), None);
        assert_eq!(key_command(KeyInput::Other, false), None);
    }

    #[test]
    fn test_suppressed_in_text_entry() {
        for key in [
            KeyInput::Char(' '),
            KeyInput::Char(','),
            KeyInput::Char('.'),
            KeyInput::Left,
            KeyInput::Right,
        ] {
            assert_eq!(key_command(key, true), None);
        }
    }
}
