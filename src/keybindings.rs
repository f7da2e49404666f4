use std::collections::HashMap;
use std::fmt;

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

pub use crate::actions::Action;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyCombo {
    pub code: KeyCode,
    pub mods: KeyModifiers,
}

impl KeyCombo {
    pub fn new(code: KeyCode, mods: KeyModifiers) -> Self {
        Self { code, mods }
    }

    pub fn plain(code: KeyCode) -> Self {
        Self::new(code, KeyModifiers::NONE)
    }

    pub fn matches(&self, key: &KeyEvent) -> bool {
        key.code == self.code && key.modifiers == self.mods
    }

    pub fn display(&self) -> String {
        let mut parts = Vec::new();
        if self.mods.contains(KeyModifiers::CONTROL) {
            parts.push("Ctrl".to_string());
        }
        if self.mods.contains(KeyModifiers::SHIFT) {
            parts.push("Shift".to_string());
        }
        if self.mods.contains(KeyModifiers::ALT) {
            parts.push("Alt".to_string());
        }
        let code = match self.code {
            KeyCode::Char(' ') => "Space".to_string(),
            KeyCode::Char(c) => c.to_string(),
            KeyCode::Esc => "Esc".to_string(),
            KeyCode::Enter => "Enter".to_string(),
            KeyCode::Tab => "Tab".to_string(),
            KeyCode::BackTab => "BackTab".to_string(),
            KeyCode::Backspace => "Backspace".to_string(),
            KeyCode::Left => "Left".to_string(),
            KeyCode::Right => "Right".to_string(),
            KeyCode::Up => "Up".to_string(),
            KeyCode::Down => "Down".to_string(),
            KeyCode::PageUp => "PageUp".to_string(),
            KeyCode::PageDown => "PageDown".to_string(),
            KeyCode::Delete => "Delete".to_string(),
            KeyCode::F(n) => format!("F{}", n),
            _ => format!("{:?}", self.code),
        };
        parts.push(code);
        parts.join("+")
    }
}

impl fmt::Display for KeyCombo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.display())
    }
}

#[derive(Debug, Clone)]
pub struct KeyBindings {
    map: HashMap<Action, Vec<KeyCombo>>,
}

impl Default for KeyBindings {
    fn default() -> Self {
        use Action::*;
        let mut kb = Self::new();
        kb.add(Quit, KeyCombo::plain(KeyCode::Char('q')));
        kb.add(Quit, KeyCombo::new(KeyCode::Char('q'), KeyModifiers::CONTROL));
        kb.add(ToggleEdit, KeyCombo::plain(KeyCode::Char('e')));
        kb.add(SelectNext, KeyCombo::plain(KeyCode::Tab));
        kb.add(SelectPrev, KeyCombo::plain(KeyCode::BackTab));
        kb.add(ToggleWidget, KeyCombo::plain(KeyCode::Char(' ')));
        kb.add(RemoveWidget, KeyCombo::plain(KeyCode::Char('x')));
        kb.add(RemoveWidget, KeyCombo::plain(KeyCode::Delete));
        kb.add(PageNext, KeyCombo::plain(KeyCode::Char(']')));
        kb.add(PagePrev, KeyCombo::plain(KeyCode::Char('[')));
        // Gestures
        kb.add(NudgeLeft, KeyCombo::plain(KeyCode::Left));
        kb.add(NudgeRight, KeyCombo::plain(KeyCode::Right));
        kb.add(NudgeUp, KeyCombo::plain(KeyCode::Up));
        kb.add(NudgeDown, KeyCombo::plain(KeyCode::Down));
        kb.add(GrowWidth, KeyCombo::new(KeyCode::Right, KeyModifiers::SHIFT));
        kb.add(ShrinkWidth, KeyCombo::new(KeyCode::Left, KeyModifiers::SHIFT));
        kb.add(GrowHeight, KeyCombo::new(KeyCode::Down, KeyModifiers::SHIFT));
        kb.add(ShrinkHeight, KeyCombo::new(KeyCode::Up, KeyModifiers::SHIFT));
        // Layout
        kb.add(RestoreAll, KeyCombo::plain(KeyCode::Char('r')));
        kb.add(ResetLayout, KeyCombo::plain(KeyCode::Char('R')));
        kb.add(SaveLayout, KeyCombo::plain(KeyCode::Char('s')));
        kb.add(ClearStorage, KeyCombo::plain(KeyCode::Char('C')));
        // Viewport and overlays
        kb.add(ScrollUp, KeyCombo::plain(KeyCode::PageUp));
        kb.add(ScrollDown, KeyCombo::plain(KeyCode::PageDown));
        kb.add(ToggleHelp, KeyCombo::plain(KeyCode::Char('?')));
        kb.add(ToggleHelp, KeyCombo::plain(KeyCode::F(1)));
        kb.add(ToggleLog, KeyCombo::plain(KeyCode::Char('l')));
        kb.add(ToggleMouseCapture, KeyCombo::plain(KeyCode::Char('m')));
        kb.add(CloseOverlay, KeyCombo::plain(KeyCode::Esc));
        kb
    }
}

impl KeyBindings {
    pub fn new() -> Self {
        Self {
            map: HashMap::new(),
        }
    }

    pub fn add(&mut self, action: Action, combo: KeyCombo) {
        self.map.entry(action).or_default().push(combo);
    }

    pub fn matches(&self, action: Action, key: &KeyEvent) -> bool {
        if let Some(list) = self.map.get(&action) {
            list.iter().any(|c| c.matches(key))
        } else {
            false
        }
    }

    /// The action bound to `key`. When several actions share a key the
    /// lowest-ordered one wins.
    pub fn action_for_key(&self, key: &KeyEvent) -> Option<Action> {
        self.map
            .iter()
            .filter(|(_, list)| list.iter().any(|c| c.matches(key)))
            .map(|(act, _)| *act)
            .min()
    }

    /// Every bound action with its key labels, in action order.
    pub fn help_entries(&self) -> Vec<(Action, Vec<String>)> {
        let mut v: Vec<(Action, Vec<String>)> = self
            .map
            .iter()
            .map(|(act, list)| (*act, list.iter().map(|c| c.display()).collect()))
            .collect();
        v.sort_by_key(|(act, _)| *act);
        v
    }

    pub fn combos_for(&self, action: Action) -> Vec<String> {
        self.map
            .get(&action)
            .map(|list| list.iter().map(|c| c.display()).collect())
            .unwrap_or_default()
    }

    pub fn first_combo(&self, action: Action) -> Option<KeyCombo> {
        self.map.get(&action).and_then(|list| list.first().cloned())
    }
}
