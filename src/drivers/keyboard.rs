use crossterm::event::{Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

/// Smooths over platform differences in key reporting before events reach
/// the key bindings.
///
/// Shift+Tab becomes BackTab and shifted letters lose the redundant SHIFT
/// flag, so `R` matches one binding everywhere. Releases are dropped.
/// Repeats count as presses, so holding an arrow keeps nudging a card,
/// except for Esc, where a held key would close one overlay after another.
#[derive(Debug, Default, Clone, Copy)]
pub struct KeyboardNormalizer;

impl KeyboardNormalizer {
    pub fn new() -> Self {
        Self
    }

    pub fn normalize(&mut self, evt: Event) -> Option<Event> {
        match evt {
            Event::Key(key) => self.normalize_key(key).map(Event::Key),
            other => Some(other),
        }
    }

    fn normalize_key(&self, mut key: KeyEvent) -> Option<KeyEvent> {
        match key.kind {
            KeyEventKind::Release => return None,
            KeyEventKind::Repeat if key.code == KeyCode::Esc => return None,
            KeyEventKind::Repeat => key.kind = KeyEventKind::Press,
            KeyEventKind::Press => {}
        }
        match key.code {
            KeyCode::Tab if key.modifiers.contains(KeyModifiers::SHIFT) => {
                key.code = KeyCode::BackTab;
                key.modifiers.remove(KeyModifiers::SHIFT);
            }
            KeyCode::Char(c) if c.is_ascii_uppercase() => {
                key.modifiers.remove(KeyModifiers::SHIFT);
            }
            _ => {}
        }
        Some(key)
    }
}
