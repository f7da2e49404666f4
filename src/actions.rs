use std::fmt;

/// Everything a key can trigger in the dashboard host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Action {
    Quit,
    ToggleEdit,
    // Widget selection
    SelectNext,
    SelectPrev,
    // Widget actions on the selection
    ToggleWidget,
    RemoveWidget,
    PageNext,
    PagePrev,
    // Keyboard gestures (edit mode)
    NudgeLeft,
    NudgeRight,
    NudgeUp,
    NudgeDown,
    GrowWidth,
    ShrinkWidth,
    GrowHeight,
    ShrinkHeight,
    // Layout
    RestoreAll,
    ResetLayout,
    SaveLayout,
    ClearStorage,
    // Viewport and overlays
    ScrollUp,
    ScrollDown,
    ToggleHelp,
    ToggleLog,
    ToggleMouseCapture,
    CloseOverlay,
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Action::Quit => "Quit",
            Action::ToggleEdit => "Toggle edit mode",
            Action::SelectNext => "Select next widget",
            Action::SelectPrev => "Select previous widget",
            Action::ToggleWidget => "Hide / show selected widget",
            Action::RemoveWidget => "Remove selected widget",
            Action::PageNext => "Next page of rows",
            Action::PagePrev => "Previous page of rows",
            Action::NudgeLeft => "Move left",
            Action::NudgeRight => "Move right",
            Action::NudgeUp => "Move up",
            Action::NudgeDown => "Move down",
            Action::GrowWidth => "Widen",
            Action::ShrinkWidth => "Narrow",
            Action::GrowHeight => "Make taller",
            Action::ShrinkHeight => "Make shorter",
            Action::RestoreAll => "Restore all widgets",
            Action::ResetLayout => "Reset to default layout",
            Action::SaveLayout => "Save layout",
            Action::ClearStorage => "Clear saved layout",
            Action::ScrollUp => "Scroll grid up",
            Action::ScrollDown => "Scroll grid down",
            Action::ToggleHelp => "Toggle help",
            Action::ToggleLog => "Toggle log panel",
            Action::ToggleMouseCapture => "Toggle mouse capture",
            Action::CloseOverlay => "Close help / log",
        };
        write!(f, "{}", s)
    }
}

impl Action {
    /// Actions that change geometry and only make sense while editing.
    pub fn requires_edit_mode(self) -> bool {
        matches!(
            self,
            Action::NudgeLeft
                | Action::NudgeRight
                | Action::NudgeUp
                | Action::NudgeDown
                | Action::GrowWidth
                | Action::ShrinkWidth
                | Action::GrowHeight
                | Action::ShrinkHeight
        )
    }
}
