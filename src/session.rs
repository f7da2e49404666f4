//! Edit-session state machine.
//!
//! The session only tracks mode and transitions; the dashboard performs
//! the side effects. A toggle that arrives while a transition is still
//! pending is remembered (several collapse into one) and replayed when the
//! transition completes.

use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EditMode {
    #[default]
    View,
    Edit,
}

impl fmt::Display for EditMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EditMode::View => f.write_str("view"),
            EditMode::Edit => f.write_str("edit"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    Entering,
    Exiting,
}

impl Transition {
    pub fn target(self) -> EditMode {
        match self {
            Transition::Entering => EditMode::Edit,
            Transition::Exiting => EditMode::View,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToggleRequest {
    /// Start this transition now.
    Begin(Transition),
    /// A transition is in flight; the toggle runs after it completes.
    Queued,
}

#[derive(Debug, Clone, Default)]
pub struct EditSession {
    mode: EditMode,
    transition: Option<Transition>,
    queued_toggle: bool,
}

impl EditSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn mode(&self) -> EditMode {
        self.mode
    }

    pub fn transition(&self) -> Option<Transition> {
        self.transition
    }

    /// True in edit mode and while entering it.
    pub fn is_editing(&self) -> bool {
        match self.transition {
            Some(transition) => transition.target() == EditMode::Edit,
            None => self.mode == EditMode::Edit,
        }
    }

    pub fn has_queued_toggle(&self) -> bool {
        self.queued_toggle
    }

    pub fn request_toggle(&mut self) -> ToggleRequest {
        if self.transition.is_some() {
            self.queued_toggle = true;
            return ToggleRequest::Queued;
        }
        let transition = match self.mode {
            EditMode::View => Transition::Entering,
            EditMode::Edit => Transition::Exiting,
        };
        self.transition = Some(transition);
        ToggleRequest::Begin(transition)
    }

    /// Start a specific transition. Returns `false` when already in, or
    /// moving to, the requested mode's target.
    pub fn begin(&mut self, transition: Transition) -> bool {
        if self.transition == Some(transition)
            || (self.transition.is_none() && self.mode == transition.target())
        {
            return false;
        }
        self.transition = Some(transition);
        true
    }

    /// Finish the pending transition. Returns whether a queued toggle
    /// should now run.
    pub fn complete(&mut self) -> bool {
        if let Some(transition) = self.transition.take() {
            self.mode = transition.target();
        }
        std::mem::take(&mut self.queued_toggle)
    }

    /// Forget any queued toggle without touching the mode.
    pub fn clear_queue(&mut self) {
        self.queued_toggle = false;
    }
}
