//! Layout synchronizer: keeps the store's logical positions and the drag
//! library's physical nodes in agreement.
//!
//! Library-to-store updates (drag/resize stops, change notifications) are
//! always honored and every rectangle is clamped on the way in. Store-to-
//! library pushes are suppressed while any drag is active and stay queued
//! until the gate opens. Library failures never reach the caller: they are
//! logged and the position attributes are written directly instead.

use tracing::{debug, warn};

use crate::geometry::{GridRect, RawPosition};
use crate::library::{ChangedNode, DragLibrary, GridEvent, RenderSurface};
use crate::store::WidgetStateStore;
use crate::widget::WidgetId;

/// Counters for everything the synchronizer did.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SyncStats {
    pub events: u64,
    /// Library rectangles the solver had to move or shrink.
    pub corrections: u64,
    pub pushes: u64,
    pub deferred: u64,
    /// Library updates that failed and fell back to attribute writes.
    pub fallbacks: u64,
}

/// Placement policy selected from a change notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Placement {
    /// One node moved into free space.
    Free,
    /// Several nodes moved together (the dragged node and what it
    /// displaced).
    Swap,
}

impl Placement {
    pub fn for_change(items: &[ChangedNode]) -> Self {
        if items.len() > 1 {
            Placement::Swap
        } else {
            Placement::Free
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PushOutcome {
    /// The library took the rect unchanged.
    Applied(GridRect),
    /// The library adjusted the rect; the adjustment was written back.
    Adjusted(GridRect),
    /// A drag is active; the push stays queued.
    Deferred,
    /// The library failed and the element attributes were written instead.
    Fallback(GridRect),
    /// Unknown, hidden, or unrenderable widget.
    Skipped,
}

#[derive(Debug, Default)]
pub struct Synchronizer {
    stats: SyncStats,
}

impl Synchronizer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn stats(&self) -> SyncStats {
        self.stats
    }

    /// Apply one library event. Returns the number of store rects written.
    pub fn handle_event<G>(
        &mut self,
        event: &GridEvent,
        store: &mut WidgetStateStore,
        grid: &mut G,
    ) -> usize
    where
        G: DragLibrary + RenderSurface + ?Sized,
    {
        self.stats.events += 1;
        match event {
            GridEvent::DragStart { id } | GridEvent::ResizeStart { id } => {
                debug!(widget_id = %id, event = %event, "gesture started");
                store.set_dragging(true, Some(id.clone()));
                0
            }
            GridEvent::DragStop { id } | GridEvent::ResizeStop { id } => {
                let raw = grid.node(id).filter(RawPosition::is_valid).or_else(|| {
                    grid.element_attrs(id)
                        .map(|attrs| RawPosition::from_attrs(&attrs))
                        .filter(RawPosition::is_valid)
                });
                let Some(raw) = raw else {
                    debug!(widget_id = %id, "gesture stopped on a widget with no readable position");
                    return 0;
                };
                usize::from(self.accept_from_library(id, raw, store, grid))
            }
            GridEvent::Change { items } => {
                let placement = Placement::for_change(items);
                debug!(nodes = items.len(), placement = ?placement, "change notification");
                let mut written = 0;
                for item in items {
                    // a stop for the same gesture may already have settled this node
                    let clamped = store.bounds().clamp_raw(&item.position);
                    let settled = store
                        .widget(&item.id)
                        .is_some_and(|w| w.visible && w.rect == clamped)
                        && grid.node(&item.id) == Some(RawPosition::from(clamped));
                    if settled {
                        continue;
                    }
                    if self.accept_from_library(&item.id, item.position, store, grid) {
                        written += 1;
                    }
                }
                written
            }
        }
    }

    /// Clamp a library-reported position, correct the library when the
    /// solver moved it and record it in the store.
    fn accept_from_library<G>(
        &mut self,
        id: &WidgetId,
        raw: RawPosition,
        store: &mut WidgetStateStore,
        grid: &mut G,
    ) -> bool
    where
        G: DragLibrary + RenderSurface + ?Sized,
    {
        let Some(widget) = store.widget(id) else {
            debug!(widget_id = %id, "library reported an unknown widget");
            return false;
        };
        if !widget.visible {
            debug!(widget_id = %id, "library reported a hidden widget");
            return false;
        }
        let clamped = store.bounds().clamp_raw(&raw);
        if RawPosition::from(clamped) != raw {
            self.stats.corrections += 1;
            debug!(widget_id = %id, reported = ?raw, rect = %clamped, "clamped library position");
            self.write_to_library(id, clamped, grid);
        }
        store.update_position(id, clamped)
    }

    /// Push a widget's stored rect into the library.
    pub fn push_to_library<G>(
        &mut self,
        id: &WidgetId,
        store: &mut WidgetStateStore,
        grid: &mut G,
    ) -> PushOutcome
    where
        G: DragLibrary + RenderSurface + ?Sized,
    {
        if store.is_dragging() {
            self.stats.deferred += 1;
            store.queue_push(id.clone());
            return PushOutcome::Deferred;
        }
        let Some(widget) = store.widget(id) else {
            debug!(widget_id = %id, "push skipped: unknown widget");
            return PushOutcome::Skipped;
        };
        if !widget.visible {
            return PushOutcome::Skipped;
        }
        let bounds = store.bounds();
        let rect = bounds.clamp(widget.rect);
        if rect != widget.rect {
            store.update_position(id, rect);
        }

        self.stats.pushes += 1;
        match grid.update(id, rect) {
            Ok(applied) if applied == rect => PushOutcome::Applied(rect),
            Ok(applied) => {
                // single write-back; the adjusted rect is not pushed again
                let adjusted = bounds.clamp(applied);
                debug!(widget_id = %id, requested = %rect, applied = %applied, "library adjusted push");
                store.update_position(id, adjusted);
                PushOutcome::Adjusted(adjusted)
            }
            Err(err) => {
                self.stats.fallbacks += 1;
                warn!(widget_id = %id, error = %err, "library update failed, writing attributes");
                if grid.write_attrs(id, rect) {
                    PushOutcome::Fallback(rect)
                } else {
                    warn!(widget_id = %id, "no element to write attributes to");
                    PushOutcome::Skipped
                }
            }
        }
    }

    fn write_to_library<G>(&mut self, id: &WidgetId, rect: GridRect, grid: &mut G)
    where
        G: DragLibrary + RenderSurface + ?Sized,
    {
        if let Err(err) = grid.update(id, rect) {
            self.stats.fallbacks += 1;
            warn!(widget_id = %id, error = %err, "library correction failed, writing attributes");
            if !grid.write_attrs(id, rect) {
                warn!(widget_id = %id, "no element to write attributes to");
            }
        }
    }

    /// Run every queued push unless a drag holds the gate. Returns the
    /// number of pushes attempted.
    pub fn flush_pending<G>(&mut self, store: &mut WidgetStateStore, grid: &mut G) -> usize
    where
        G: DragLibrary + RenderSurface + ?Sized,
    {
        if store.is_dragging() || !store.has_pending_pushes() {
            return 0;
        }
        let pending = store.take_pending_pushes();
        let count = pending.len();
        for id in pending {
            self.push_to_library(&id, store, grid);
        }
        count
    }

    /// Push every visible widget. Used once after entering edit mode.
    pub fn push_all_visible<G>(&mut self, store: &mut WidgetStateStore, grid: &mut G) -> usize
    where
        G: DragLibrary + RenderSurface + ?Sized,
    {
        let ids: Vec<WidgetId> = store.visible_widgets().map(|w| w.id.clone()).collect();
        for id in &ids {
            self.push_to_library(id, store, grid);
        }
        debug!(widgets = ids.len(), "pushed all visible widgets");
        ids.len()
    }
}
