//! Application root: owns the store, the synchronizer, the edit session
//! and the scheduler, and drives a host's drag library through them.

use std::time::{Duration, Instant};

use tracing::{debug, error, info, warn};

use crate::config::DashboardConfig;
use crate::constraint::ContainerBounds;
use crate::error::{GridError, StorageResult};
use crate::library::{DragLibrary, GridEvent, GridEventKind, LivePositions, RenderSurface};
use crate::scheduler::{Readiness, Scheduler, Task};
use crate::session::{EditMode, EditSession, ToggleRequest, Transition};
use crate::store::{VisibilityChange, WidgetStateStore};
use crate::sync::{SyncStats, Synchronizer};
use crate::widget::{Widget, WidgetId};

pub struct Dashboard<G> {
    grid: G,
    store: WidgetStateStore,
    sync: Synchronizer,
    session: EditSession,
    scheduler: Scheduler,
    readiness: Readiness,
    config: DashboardConfig,
    now: Instant,
    disposed: bool,
}

impl<G: DragLibrary + RenderSurface> Dashboard<G> {
    pub fn new(grid: G, store: WidgetStateStore, config: DashboardConfig) -> Self {
        let store = store
            .with_bounds(config.bounds())
            .with_storage_key(config.storage_key.clone());
        Self {
            grid,
            store,
            sync: Synchronizer::new(),
            session: EditSession::new(),
            scheduler: Scheduler::new(),
            readiness: Readiness::default(),
            config,
            now: Instant::now(),
            disposed: false,
        }
    }

    /// Hydrate the store, render it and build the library in view mode.
    pub fn init(&mut self) -> Result<(), GridError> {
        self.store.init();
        self.readiness.hydrated = true;
        self.render();
        self.grid.init(self.config.grid_options(EditMode::View))?;
        info!(
            widgets = self.store.len(),
            visible = self.store.visible_count(),
            "dashboard initialized"
        );
        Ok(())
    }

    /// Record the container's measured size. Visible widgets are re-clamped
    /// when it differs from the current bounds.
    pub fn measure_container(&mut self, bounds: ContainerBounds) {
        if self.disposed {
            return;
        }
        self.readiness.measured = true;
        if bounds != self.store.bounds() {
            self.config.columns = bounds.columns();
            self.config.rows = bounds.rows();
            let moved = self.store.set_bounds(bounds);
            if !moved.is_empty() {
                self.render();
                self.scheduler.next_frame(Task::FlushFrame);
            }
        }
    }

    /// Tear down: no scheduled task runs after this returns.
    pub fn dispose(&mut self) {
        if self.disposed {
            return;
        }
        self.scheduler.clear();
        self.grid.off(&GridEventKind::ALL);
        self.grid.destroy(false);
        self.store.dispose();
        self.disposed = true;
        info!("dashboard disposed");
    }

    pub fn is_disposed(&self) -> bool {
        self.disposed
    }

    pub fn store(&self) -> &WidgetStateStore {
        &self.store
    }

    pub fn grid(&self) -> &G {
        &self.grid
    }

    pub fn grid_mut(&mut self) -> &mut G {
        &mut self.grid
    }

    pub fn config(&self) -> &DashboardConfig {
        &self.config
    }

    pub fn mode(&self) -> EditMode {
        self.session.mode()
    }

    pub fn is_editing(&self) -> bool {
        self.session.is_editing()
    }

    pub fn transition(&self) -> Option<Transition> {
        self.session.transition()
    }

    pub fn readiness(&self) -> Readiness {
        self.readiness
    }

    pub fn sync_stats(&self) -> SyncStats {
        self.sync.stats()
    }

    pub fn scheduler(&self) -> &Scheduler {
        &self.scheduler
    }

    /// The time of the most recent tick.
    pub fn now(&self) -> Instant {
        self.now
    }

    pub fn widgets(&self) -> &[Widget] {
        self.store.widgets()
    }

    pub fn toggle_edit_mode(&mut self) {
        if self.disposed {
            return;
        }
        match self.session.request_toggle() {
            ToggleRequest::Begin(Transition::Entering) => self.begin_entering(),
            ToggleRequest::Begin(Transition::Exiting) => {
                self.finish_exiting();
            }
            ToggleRequest::Queued => {
                debug!("edit toggle queued behind pending transition");
            }
        }
    }

    /// Enter edit mode unless already there (or on the way).
    pub fn enter_edit_mode(&mut self) -> bool {
        if self.disposed || !self.session.begin(Transition::Entering) {
            return false;
        }
        self.begin_entering();
        true
    }

    /// Leave edit mode, saving the layout first. Safe to call from any
    /// state; returns whether a save happened.
    pub fn exit_edit_mode(&mut self) -> bool {
        if self.disposed {
            return false;
        }
        self.session.clear_queue();
        if !self.session.begin(Transition::Exiting) {
            return false;
        }
        self.finish_exiting()
    }

    fn begin_entering(&mut self) {
        info!("entering edit mode");
        self.grid.destroy(false);
        if let Err(err) = self.grid.init(self.config.grid_options(EditMode::Edit)) {
            warn!(error = %err, "failed to build interactive grid");
        }
        self.grid.on(&GridEventKind::ALL);
        self.scheduler.schedule_after(
            self.now,
            self.config.hydration_delay,
            Task::EnterEditPush { attempt: 0 },
        );
    }

    fn finish_exiting(&mut self) -> bool {
        self.scheduler
            .cancel_where(|task| matches!(task, Task::EnterEditPush { .. } | Task::SettleDrag));
        // a drop that is still queued in the library must land first
        self.pump_events();
        self.store.set_dragging(false, None);

        let saved = match self.store.save_current_layout(&self.grid) {
            Ok(()) => true,
            Err(err) => {
                error!(error = %err, "failed to save layout while leaving edit mode");
                false
            }
        };
        self.grid.off(&GridEventKind::ALL);
        self.grid.destroy(false);
        if let Err(err) = self.grid.init(self.config.grid_options(EditMode::View)) {
            warn!(error = %err, "failed to build static grid");
        }
        self.render();
        info!(saved, "left edit mode");
        self.complete_transition();
        saved
    }

    fn complete_transition(&mut self) {
        if self.session.complete() {
            debug!("running queued edit toggle");
            self.toggle_edit_mode();
        }
    }

    /// Process one library event.
    pub fn handle_grid_event(&mut self, event: GridEvent) {
        if self.disposed {
            return;
        }
        let written = self.sync.handle_event(&event, &mut self.store, &mut self.grid);
        match &event {
            GridEvent::DragStart { .. } | GridEvent::ResizeStart { .. } => {
                self.scheduler.cancel(&Task::SettleDrag);
            }
            GridEvent::DragStop { .. } | GridEvent::ResizeStop { .. } => {
                self.scheduler
                    .schedule_after(self.now, self.config.sync_delay, Task::SettleDrag);
            }
            GridEvent::Change { .. } => {}
        }
        if written > 0 {
            self.render();
        }
    }

    /// Drain and handle every event the library queued.
    pub fn pump_events(&mut self) -> usize {
        let events = self.grid.drain_events();
        let count = events.len();
        for event in events {
            self.handle_grid_event(event);
        }
        count
    }

    /// Advance the dashboard to `now`: handle library events, then run
    /// every due task.
    pub fn tick(&mut self, now: Instant) {
        if self.disposed {
            return;
        }
        self.now = self.now.max(now);
        self.pump_events();
        for task in self.scheduler.due(self.now) {
            if self.disposed {
                break;
            }
            self.run_task(task);
        }
        if self.store.has_pending_pushes() {
            self.scheduler.next_frame(Task::FlushFrame);
        }
    }

    /// Tick `elapsed` after the previous tick.
    pub fn advance(&mut self, elapsed: Duration) {
        self.tick(self.now + elapsed);
    }

    fn run_task(&mut self, task: Task) {
        match task {
            Task::SettleDrag => {
                self.store.set_dragging(false, None);
                debug!("drag settled");
                if self.store.has_pending_pushes() {
                    self.scheduler.next_frame(Task::FlushFrame);
                }
            }
            Task::FlushFrame => {
                if self.sync.flush_pending(&mut self.store, &mut self.grid) > 0 {
                    self.render();
                }
            }
            Task::EnterEditPush { attempt } => {
                if self.session.transition() != Some(Transition::Entering) {
                    return;
                }
                let ready = self.readiness.is_ready(self.grid.is_ready());
                if !ready && attempt + 1 < self.config.max_ready_polls {
                    self.scheduler.schedule_after(
                        self.now,
                        self.config.persist_delay,
                        Task::EnterEditPush {
                            attempt: attempt + 1,
                        },
                    );
                    return;
                }
                if !ready {
                    warn!(attempts = attempt + 1, "grid not ready, pushing layout anyway");
                }
                let pushed = self.sync.push_all_visible(&mut self.store, &mut self.grid);
                self.render();
                info!(pushed, "edit mode ready");
                self.complete_transition();
            }
        }
    }

    fn render(&mut self) {
        self.grid.reconcile(self.store.widgets());
    }

    fn after_store_change(&mut self) {
        self.render();
        if self.store.has_pending_pushes() {
            self.scheduler.next_frame(Task::FlushFrame);
        }
    }

    pub fn toggle_visibility(&mut self, id: &WidgetId) -> Option<VisibilityChange> {
        if self.disposed {
            return None;
        }
        let change = {
            let probe = LivePositions::new(&self.grid);
            self.store.toggle_visibility(id, &probe)
        };
        self.after_store_change();
        change
    }

    pub fn restore_all_widgets(&mut self) -> Vec<WidgetId> {
        if self.disposed {
            return Vec::new();
        }
        let shown = self.store.restore_all_widgets();
        self.after_store_change();
        shown
    }

    pub fn reset_to_defaults(&mut self) {
        if self.disposed {
            return;
        }
        self.scheduler.cancel(&Task::SettleDrag);
        self.store.reset_to_defaults();
        self.after_store_change();
    }

    pub fn remove_widget(&mut self, id: &WidgetId) -> Option<Widget> {
        if self.disposed {
            return None;
        }
        let removed = self.store.remove_widget(id);
        if removed.is_some() {
            self.after_store_change();
        }
        removed
    }

    /// Does nothing once disposed; the stored layout is left alone.
    pub fn clear_persisted_layout(&mut self) -> StorageResult<()> {
        if self.disposed {
            debug!("clear_persisted_layout after dispose ignored");
            return Ok(());
        }
        self.store.clear_persisted_layout()?;
        self.after_store_change();
        Ok(())
    }

    /// Explicit save: errors are returned instead of logged.
    pub fn save_layout(&mut self) -> StorageResult<()> {
        if self.disposed {
            return Ok(());
        }
        self.store.save_current_layout(&self.grid)
    }

    pub fn set_widget_page(&mut self, id: &WidgetId, page: u32) {
        if self.disposed {
            return;
        }
        self.store.set_widget_page(id, page);
    }

    pub fn widget_page(&self, id: &WidgetId) -> u32 {
        self.store.widget_page(id)
    }

    /// Move a widget's cursor by `delta` pages, staying within the pages
    /// its content needs.
    pub fn step_widget_page(&mut self, id: &WidgetId, delta: i32) -> u32 {
        if self.disposed {
            return self.store.widget_page(id);
        }
        let Some(rows) = self.store.widget(id).and_then(|w| w.data.paged_len()) else {
            return self.store.widget_page(id);
        };
        let pages = self.config.page_count(rows) as i64;
        let current = self.store.widget_page(id) as i64;
        let next = (current + delta as i64).clamp(1, pages) as u32;
        self.store.set_widget_page(id, next);
        next
    }
}
