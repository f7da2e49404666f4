use std::time::Instant;

use crossterm::event::{Event, KeyEvent, MouseButton, MouseEvent, MouseEventKind};
use ratatui::layout::Rect;
use tracing::{debug, warn};

use super::render::{draw_dashboard, split_screen};
use super::terminal_grid::TerminalGrid;
use crate::actions::Action;
use crate::constants::TERMINAL_CELL_WIDTH_PX;
use crate::dashboard::Dashboard;
use crate::error::GridError;
use crate::auth::User;
use crate::event_loop::ControlFlow;
use crate::keybindings::KeyBindings;
use crate::layout::rect_contains;
use crate::log_buffer::LogBuffer;
use crate::state::AppState;
use crate::store::VisibilityChange;
use crate::ui::UiFrame;
use crate::widget::{Widget, WidgetId};

/// The terminal front-end: a dashboard over a [`TerminalGrid`] plus the
/// host's own selection, overlays and key bindings.
pub struct DashboardApp {
    dashboard: Dashboard<TerminalGrid>,
    state: AppState,
    bindings: KeyBindings,
    user: Option<User>,
    log: Option<LogBuffer>,
    size: (u16, u16),
    compact: bool,
    measured: bool,
}

impl DashboardApp {
    pub fn new(dashboard: Dashboard<TerminalGrid>, user: Option<User>) -> Self {
        Self {
            dashboard,
            state: AppState::new(),
            bindings: KeyBindings::default(),
            user,
            log: None,
            size: (0, 0),
            compact: false,
            measured: false,
        }
    }

    pub fn with_log_buffer(mut self, log: LogBuffer) -> Self {
        self.log = Some(log);
        self
    }

    pub fn init(&mut self) -> Result<(), GridError> {
        self.dashboard.init()
    }

    pub fn dashboard(&self) -> &Dashboard<TerminalGrid> {
        &self.dashboard
    }

    pub fn dashboard_mut(&mut self) -> &mut Dashboard<TerminalGrid> {
        &mut self.dashboard
    }

    pub fn state(&self) -> &AppState {
        &self.state
    }

    pub fn state_mut(&mut self) -> &mut AppState {
        &mut self.state
    }

    pub fn bindings(&self) -> &KeyBindings {
        &self.bindings
    }

    pub fn user(&self) -> Option<&User> {
        self.user.as_ref()
    }

    pub fn log_buffer(&self) -> Option<&LogBuffer> {
        self.log.as_ref()
    }

    /// Narrow terminals get a plain list instead of the grid.
    pub fn is_compact(&self) -> bool {
        self.compact
    }

    pub fn selected_widget(&self) -> Option<&Widget> {
        self.dashboard.widgets().get(self.state.selected())
    }

    fn selected_id(&self) -> Option<WidgetId> {
        self.selected_widget().map(|w| w.id.clone())
    }

    /// Lay the grid out for a terminal of `width` x `height` cells.
    pub fn resize(&mut self, width: u16, height: u16) {
        self.size = (width, height);
        let width_px = width as u32 * TERMINAL_CELL_WIDTH_PX;
        self.compact = self.dashboard.config().is_mobile(width_px);
        self.relayout();
        if !self.measured {
            let bounds = self.dashboard.config().bounds();
            self.dashboard.measure_container(bounds);
            self.measured = true;
        }
    }

    fn relayout(&mut self) {
        let (width, height) = self.size;
        let area = Rect {
            x: 0,
            y: 0,
            width,
            height,
        };
        let layout = split_screen(area, self.state.log_visible());
        self.dashboard.grid_mut().set_viewport(layout.grid);
    }

    pub fn tick(&mut self, now: Instant) {
        self.dashboard.tick(now);
    }

    pub fn draw(&self, frame: &mut UiFrame<'_>) {
        draw_dashboard(frame, self);
    }

    pub fn handle_event(&mut self, event: &Event) -> ControlFlow {
        match event {
            Event::Key(key) => self.handle_key(key),
            Event::Mouse(mouse) => {
                self.handle_mouse(mouse);
                ControlFlow::Continue
            }
            Event::Resize(width, height) => {
                self.resize(*width, *height);
                ControlFlow::Continue
            }
            _ => ControlFlow::Continue,
        }
    }

    fn handle_key(&mut self, key: &KeyEvent) -> ControlFlow {
        let Some(action) = self.bindings.action_for_key(key) else {
            return ControlFlow::Continue;
        };
        if self.state.help_visible()
            && !matches!(
                action,
                Action::Quit | Action::ToggleHelp | Action::CloseOverlay
            )
        {
            return ControlFlow::Continue;
        }
        self.apply(action)
    }

    fn handle_mouse(&mut self, mouse: &MouseEvent) {
        if !self.state.mouse_capture_enabled() || self.compact {
            return;
        }
        if let MouseEventKind::Down(MouseButton::Left) = mouse.kind {
            self.select_at(mouse.column, mouse.row);
        }
        if self.dashboard.grid_mut().handle_mouse(mouse) {
            self.dashboard.pump_events();
        }
    }

    fn select_at(&mut self, column: u16, row: u16) {
        let grid = self.dashboard.grid();
        let hit = grid
            .order()
            .iter()
            .rev()
            .find(|id| {
                grid.screen_rect(id)
                    .is_some_and(|rect| rect_contains(rect, column, row))
            })
            .cloned();
        if let Some(id) = hit
            && let Some(index) = self.dashboard.widgets().iter().position(|w| w.id == id)
        {
            self.state.select(index, self.dashboard.widgets().len());
        }
    }

    /// Run one action. Returns `Quit` once the app should stop.
    pub fn apply(&mut self, action: Action) -> ControlFlow {
        debug!(%action, "key action");
        self.state.clear_status();
        if action.requires_edit_mode() && !self.dashboard.is_editing() {
            self.state.set_status("press e to edit the layout first");
            return ControlFlow::Continue;
        }
        let count = self.dashboard.widgets().len();
        match action {
            Action::Quit => {
                // leaving with unsaved edits saves them first
                self.dashboard.exit_edit_mode();
                return ControlFlow::Quit;
            }
            Action::ToggleEdit => {
                if self.compact && !self.dashboard.is_editing() {
                    self.state.set_status("editing needs a wider terminal");
                } else {
                    self.dashboard.toggle_edit_mode();
                    let mode = self
                        .dashboard
                        .transition()
                        .map(|t| t.target())
                        .unwrap_or(self.dashboard.mode());
                    self.state.set_status(format!("{mode} mode"));
                }
            }
            Action::SelectNext => self.state.select_next(count),
            Action::SelectPrev => self.state.select_prev(count),
            Action::ToggleWidget => {
                if let Some(id) = self.selected_id() {
                    match self.dashboard.toggle_visibility(&id) {
                        Some(VisibilityChange::Hidden { .. }) => {
                            self.state.set_status(format!("{id} hidden"))
                        }
                        Some(VisibilityChange::Shown { rect }) => {
                            self.state.set_status(format!("{id} shown at {rect}"))
                        }
                        None => {}
                    }
                }
            }
            Action::RemoveWidget => {
                if let Some(id) = self.selected_id()
                    && self.dashboard.remove_widget(&id).is_some()
                {
                    let count = self.dashboard.widgets().len();
                    self.state.select(self.state.selected(), count);
                    self.state.set_status(format!("{id} removed"));
                }
            }
            Action::PageNext | Action::PagePrev => {
                if let Some(id) = self.selected_id() {
                    let delta = if action == Action::PageNext { 1 } else { -1 };
                    let page = self.dashboard.step_widget_page(&id, delta);
                    self.state.set_status(format!("{id} page {page}"));
                }
            }
            Action::NudgeLeft => self.nudge(-1, 0),
            Action::NudgeRight => self.nudge(1, 0),
            Action::NudgeUp => self.nudge(0, -1),
            Action::NudgeDown => self.nudge(0, 1),
            Action::GrowWidth => self.grow(1, 0),
            Action::ShrinkWidth => self.grow(-1, 0),
            Action::GrowHeight => self.grow(0, 1),
            Action::ShrinkHeight => self.grow(0, -1),
            Action::RestoreAll => {
                let shown = self.dashboard.restore_all_widgets();
                self.state
                    .set_status(format!("{} widgets restored", shown.len()));
            }
            Action::ResetLayout => {
                self.dashboard.reset_to_defaults();
                self.state.select(0, self.dashboard.widgets().len());
                self.state.set_status("layout reset");
            }
            Action::SaveLayout => match self.dashboard.save_layout() {
                Ok(()) => self.state.set_status("layout saved"),
                Err(err) => {
                    warn!(error = %err, "save failed");
                    self.state.set_status(format!("save failed: {err}"));
                }
            },
            Action::ClearStorage => match self.dashboard.clear_persisted_layout() {
                Ok(()) => {
                    self.state.select(0, self.dashboard.widgets().len());
                    self.state.set_status("saved layout cleared");
                }
                Err(err) => self.state.set_status(format!("clear failed: {err}")),
            },
            Action::ScrollUp => self.scroll(-1),
            Action::ScrollDown => self.scroll(1),
            Action::ToggleHelp => self.state.toggle_help(),
            Action::ToggleLog => {
                self.state.toggle_log();
                self.relayout();
            }
            Action::ToggleMouseCapture => self.state.toggle_mouse_capture(),
            Action::CloseOverlay => {
                if self.state.close_overlay() {
                    self.relayout();
                }
            }
        }
        ControlFlow::Continue
    }

    fn nudge(&mut self, d_cols: i32, d_rows: i32) {
        let Some(id) = self.selected_id() else {
            return;
        };
        let Some(rect) = self.dashboard.grid().display_rect(&id) else {
            return;
        };
        let x = rect.x as i32 + d_cols;
        let y = rect.y as i32 + d_rows;
        if self.dashboard.grid_mut().drop_widget(&id, x, y) {
            self.dashboard.pump_events();
        }
    }

    fn grow(&mut self, d_cols: i32, d_rows: i32) {
        let Some(id) = self.selected_id() else {
            return;
        };
        let Some(rect) = self.dashboard.grid().display_rect(&id) else {
            return;
        };
        let w = rect.w as i32 + d_cols;
        let h = rect.h as i32 + d_rows;
        if self.dashboard.grid_mut().resize_widget(&id, w, h) {
            self.dashboard.pump_events();
        }
    }

    fn scroll(&mut self, direction: i32) {
        let step = (self.dashboard.grid().viewport().visible_rows() / 2).max(1) as i32;
        self.dashboard.grid_mut().scroll_by(direction * step);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DashboardConfig;
    use crate::geometry::GridRect;
    use crate::seed::default_widgets;
    use crate::store::WidgetStateStore;

    fn app() -> DashboardApp {
        let dashboard = Dashboard::new(
            TerminalGrid::new(),
            WidgetStateStore::in_memory(default_widgets()),
            DashboardConfig::default(),
        );
        let mut app = DashboardApp::new(dashboard, None);
        app.init().unwrap();
        app.resize(120, 40);
        app
    }

    fn settle(app: &mut DashboardApp) {
        for _ in 0..5 {
            app.dashboard_mut()
                .advance(std::time::Duration::from_millis(100));
        }
    }

    #[test]
    fn narrow_terminals_are_compact() {
        let mut app = app();
        assert!(!app.is_compact());
        app.resize(80, 40);
        assert!(app.is_compact());
        app.apply(Action::ToggleEdit);
        assert!(!app.dashboard().is_editing());
    }

    #[test]
    fn gestures_need_edit_mode() {
        let mut app = app();
        app.apply(Action::NudgeRight);
        assert_eq!(app.state().status(), Some("press e to edit the layout first"));
        assert_eq!(app.dashboard().widgets()[0].rect, GridRect::new(0, 0, 6, 4));
    }

    #[test]
    fn keyboard_nudge_is_clamped_by_the_engine() {
        let mut app = app();
        app.apply(Action::ToggleEdit);
        settle(&mut app);
        assert!(app.dashboard().is_editing());
        // widget-1 already spans every column; moving right must snap back
        app.apply(Action::NudgeRight);
        settle(&mut app);
        assert_eq!(app.dashboard().widgets()[0].rect, GridRect::new(0, 0, 6, 4));
        app.apply(Action::NudgeDown);
        settle(&mut app);
        assert_eq!(app.dashboard().widgets()[0].rect.y, 1);
    }

    #[test]
    fn space_hides_and_restore_brings_back() {
        let mut app = app();
        app.apply(Action::SelectNext);
        app.apply(Action::ToggleWidget);
        assert_eq!(app.dashboard().store().visible_count(), 4);
        assert_eq!(app.state().status(), Some("widget-2 hidden"));
        app.apply(Action::RestoreAll);
        assert_eq!(app.dashboard().store().visible_count(), 5);
        assert_eq!(app.state().status(), Some("1 widgets restored"));
    }

    #[test]
    fn help_swallows_other_keys() {
        let mut app = app();
        app.apply(Action::ToggleHelp);
        let key = KeyEvent::new(
            crossterm::event::KeyCode::Char(' '),
            crossterm::event::KeyModifiers::NONE,
        );
        app.handle_event(&Event::Key(key));
        assert_eq!(app.dashboard().store().visible_count(), 5);
        let esc = KeyEvent::new(
            crossterm::event::KeyCode::Esc,
            crossterm::event::KeyModifiers::NONE,
        );
        app.handle_event(&Event::Key(esc));
        assert!(!app.state().help_visible());
    }

    #[test]
    fn quit_saves_pending_edits() {
        let mut app = app();
        app.apply(Action::ToggleEdit);
        settle(&mut app);
        assert_eq!(app.apply(Action::Quit), ControlFlow::Quit);
        assert!(!app.dashboard().is_editing());
        assert!(app.dashboard().store().last_saved_json().is_some());
    }
}
