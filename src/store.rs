//! The widget state store: the single source of truth for every widget's
//! logical position, visibility and pagination cursor.
//!
//! Mutations are synchronous and complete before returning. Operations on
//! ids the store does not know are logged at debug level and ignored.

use std::collections::BTreeMap;

use tracing::{debug, error, info};

use crate::constants::{DEFAULT_PAGE, STORAGE_KEY};
use crate::constraint::ContainerBounds;
use crate::error::StorageResult;
use crate::geometry::{GridRect, RawPosition};
use crate::library::{PositionProbe, RenderSurface};
use crate::snapshot::{Snapshot, merge_defaults, merge_pagination};
use crate::storage::{MemoryStorage, StorageBackend};
use crate::widget::{Widget, WidgetId};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreLifecycle {
    Created,
    Ready,
    Disposed,
}

/// Global drag gate. While `active`, no store-to-library push may run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DragState {
    pub active: bool,
    pub widget: Option<WidgetId>,
}

/// Outcome of [`WidgetStateStore::toggle_visibility`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VisibilityChange {
    /// The widget was hidden; `rect` is the position captured for restore.
    Hidden { rect: GridRect },
    /// The widget was shown at the re-validated `rect`.
    Shown { rect: GridRect },
}

pub struct WidgetStateStore {
    seed: Vec<Widget>,
    widgets: Vec<Widget>,
    pagination: BTreeMap<WidgetId, u32>,
    bounds: ContainerBounds,
    drag: DragState,
    storage: Box<dyn StorageBackend>,
    storage_key: String,
    pending_pushes: Vec<WidgetId>,
    last_saved: Option<String>,
    lifecycle: StoreLifecycle,
}

impl std::fmt::Debug for WidgetStateStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WidgetStateStore")
            .field("widgets", &self.widgets.len())
            .field("bounds", &self.bounds)
            .field("storage", &self.storage.name())
            .field("lifecycle", &self.lifecycle)
            .finish()
    }
}

impl WidgetStateStore {
    /// Build a store around `seed`. Nothing is read from storage until
    /// [`init`](Self::init).
    pub fn new(seed: Vec<Widget>, storage: Box<dyn StorageBackend>) -> Self {
        Self {
            widgets: seed.clone(),
            seed,
            pagination: BTreeMap::new(),
            bounds: ContainerBounds::default(),
            drag: DragState::default(),
            storage,
            storage_key: STORAGE_KEY.to_string(),
            pending_pushes: Vec::new(),
            last_saved: None,
            lifecycle: StoreLifecycle::Created,
        }
    }

    pub fn in_memory(seed: Vec<Widget>) -> Self {
        Self::new(seed, Box::new(MemoryStorage::new()))
    }

    pub fn with_bounds(mut self, bounds: ContainerBounds) -> Self {
        self.bounds = bounds;
        self
    }

    pub fn with_storage_key(mut self, key: impl Into<String>) -> Self {
        self.storage_key = key.into();
        self
    }

    /// Hydrate from storage and overlay the snapshot onto the seed.
    /// Returns whether a snapshot was applied.
    pub fn init(&mut self) -> bool {
        let snapshot = self.hydrate();
        self.widgets = merge_defaults(&self.seed, snapshot.as_ref());
        self.pagination = merge_pagination(&self.seed, snapshot.as_ref());
        self.revalidate_visible();
        self.pending_pushes.clear();
        self.drag = DragState::default();
        self.lifecycle = StoreLifecycle::Ready;
        info!(
            widgets = self.widgets.len(),
            visible = self.visible_count(),
            restored = snapshot.is_some(),
            backend = self.storage.name(),
            "store hydrated"
        );
        snapshot.is_some()
    }

    /// Read the persisted snapshot. Missing, unreadable and corrupt data all
    /// yield `None`.
    pub fn hydrate(&self) -> Option<Snapshot> {
        let json = match self.storage.load(&self.storage_key) {
            Ok(Some(json)) => json,
            Ok(None) => return None,
            Err(err) => {
                error!(key = %self.storage_key, error = %err, "failed to read snapshot");
                return None;
            }
        };
        match Snapshot::from_json(&json) {
            Ok(snapshot) => Some(snapshot),
            Err(err) => {
                error!(key = %self.storage_key, error = %err, "corrupt snapshot, using defaults");
                None
            }
        }
    }

    pub fn dispose(&mut self) {
        self.pending_pushes.clear();
        self.drag = DragState::default();
        self.lifecycle = StoreLifecycle::Disposed;
        debug!("store disposed");
    }

    pub fn lifecycle(&self) -> StoreLifecycle {
        self.lifecycle
    }

    pub fn is_ready(&self) -> bool {
        self.lifecycle == StoreLifecycle::Ready
    }

    pub fn bounds(&self) -> ContainerBounds {
        self.bounds
    }

    pub fn widgets(&self) -> &[Widget] {
        &self.widgets
    }

    pub fn widget(&self, id: &WidgetId) -> Option<&Widget> {
        self.widgets.iter().find(|w| &w.id == id)
    }

    fn widget_mut(&mut self, id: &WidgetId) -> Option<&mut Widget> {
        self.widgets.iter_mut().find(|w| &w.id == id)
    }

    pub fn visible_widgets(&self) -> impl Iterator<Item = &Widget> {
        self.widgets.iter().filter(|w| w.visible)
    }

    pub fn visible_count(&self) -> usize {
        self.visible_widgets().count()
    }

    pub fn len(&self) -> usize {
        self.widgets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.widgets.is_empty()
    }

    /// Replace a widget's rectangle as given. Containment is the
    /// synchronizer's job; the store keeps whatever it is handed.
    pub fn update_position(&mut self, id: &WidgetId, rect: GridRect) -> bool {
        let Some(widget) = self.widget_mut(id) else {
            debug!(widget_id = %id, "update_position: unknown widget");
            return false;
        };
        if widget.rect != rect {
            debug!(widget_id = %id, from = %widget.rect, to = %rect, "position updated");
            widget.rect = rect;
        }
        true
    }

    /// Flip a widget's visibility.
    ///
    /// Hiding captures the widget's physical position from `probe` (falling
    /// back to the stored rect) so a later show restores where the user
    /// actually left it. Showing re-validates the stored rect and queues a
    /// forced push for the next frame.
    pub fn toggle_visibility(
        &mut self,
        id: &WidgetId,
        probe: &dyn PositionProbe,
    ) -> Option<VisibilityChange> {
        let bounds = self.bounds;
        let physical = probe.physical_position(id);
        let Some(widget) = self.widget_mut(id) else {
            debug!(widget_id = %id, "toggle_visibility: unknown widget");
            return None;
        };

        let change = if widget.visible {
            if let Some(raw) = physical {
                widget.rect = bounds.clamp_raw(&raw);
            }
            widget.visible = false;
            VisibilityChange::Hidden { rect: widget.rect }
        } else {
            widget.rect = bounds.clamp(widget.rect);
            widget.visible = true;
            VisibilityChange::Shown { rect: widget.rect }
        };
        debug!(widget_id = %id, change = ?change, "visibility toggled");

        if matches!(change, VisibilityChange::Shown { .. }) {
            self.queue_push(id.clone());
        } else {
            self.pending_pushes.retain(|pending| pending != id);
            // the library drops a hidden node's gesture without a stop event
            if self.drag.widget.as_ref() == Some(id) {
                self.drag = DragState::default();
            }
        }
        self.persist_quietly();
        Some(change)
    }

    /// Delete a widget for the rest of the session.
    pub fn remove_widget(&mut self, id: &WidgetId) -> Option<Widget> {
        let Some(index) = self.widgets.iter().position(|w| &w.id == id) else {
            debug!(widget_id = %id, "remove_widget: unknown widget");
            return None;
        };
        let removed = self.widgets.remove(index);
        self.pagination.remove(id);
        self.pending_pushes.retain(|pending| pending != id);
        if self.drag.widget.as_ref() == Some(id) {
            self.drag = DragState::default();
        }
        debug!(widget_id = %id, "widget removed");
        self.persist_quietly();
        Some(removed)
    }

    /// Show every widget at its stored (re-validated) position. Returns the
    /// ids that were hidden before the call.
    pub fn restore_all_widgets(&mut self) -> Vec<WidgetId> {
        let bounds = self.bounds;
        let mut shown = Vec::new();
        let mut moved = Vec::new();
        for widget in &mut self.widgets {
            let clamped = bounds.clamp(widget.rect);
            if !widget.visible {
                widget.visible = true;
                shown.push(widget.id.clone());
            } else if clamped != widget.rect {
                moved.push(widget.id.clone());
            }
            widget.rect = clamped;
        }
        for id in shown.iter().chain(moved.iter()) {
            self.queue_push(id.clone());
        }
        info!(shown = shown.len(), "restored all widgets");
        self.persist_quietly();
        shown
    }

    /// Replace the collection with the seed and forget every cursor and
    /// drag in flight.
    pub fn reset_to_defaults(&mut self) {
        self.load_seed();
        info!(widgets = self.widgets.len(), "layout reset to defaults");
        self.persist_quietly();
    }

    /// Drop the persisted snapshot and fall back to the seed in memory.
    pub fn clear_persisted_layout(&mut self) -> StorageResult<()> {
        self.storage.remove(&self.storage_key)?;
        self.last_saved = None;
        self.load_seed();
        info!(key = %self.storage_key, "persisted layout cleared");
        Ok(())
    }

    fn load_seed(&mut self) {
        self.widgets = self.seed.clone();
        self.pagination.clear();
        self.drag = DragState::default();
        self.revalidate_visible();
        self.pending_pushes = self
            .widgets
            .iter()
            .filter(|w| w.visible)
            .map(|w| w.id.clone())
            .collect();
    }

    /// Change the container size. Visible widgets are re-clamped; hidden
    /// widgets keep their last known rect until they are shown again.
    pub fn set_bounds(&mut self, bounds: ContainerBounds) -> Vec<WidgetId> {
        self.bounds = bounds;
        let moved = self.revalidate_visible();
        for id in &moved {
            self.queue_push(id.clone());
        }
        debug!(
            columns = bounds.columns(),
            rows = bounds.rows(),
            moved = moved.len(),
            "container bounds changed"
        );
        moved
    }

    fn revalidate_visible(&mut self) -> Vec<WidgetId> {
        let bounds = self.bounds;
        let mut moved = Vec::new();
        for widget in self.widgets.iter_mut().filter(|w| w.visible) {
            let clamped = bounds.clamp(widget.rect);
            if clamped != widget.rect {
                widget.rect = clamped;
                moved.push(widget.id.clone());
            }
        }
        moved
    }

    pub fn set_widget_page(&mut self, id: &WidgetId, page: u32) {
        if self.widget(id).is_none() {
            debug!(widget_id = %id, "set_widget_page: unknown widget");
            return;
        }
        self.pagination.insert(id.clone(), page.max(1));
        self.persist_quietly();
    }

    pub fn widget_page(&self, id: &WidgetId) -> u32 {
        self.pagination.get(id).copied().unwrap_or(DEFAULT_PAGE)
    }

    /// Copy rendered element positions into the store. Elements whose
    /// attributes do not parse to a valid position are skipped. Returns the
    /// number of widgets whose rect changed.
    pub fn sync_positions_from_dom(&mut self, surface: &dyn RenderSurface) -> usize {
        let bounds = self.bounds;
        let mut changed = 0;
        for id in surface.element_ids() {
            let Some(attrs) = surface.element_attrs(&id) else {
                continue;
            };
            let raw = RawPosition::from_attrs(&attrs);
            if !raw.is_valid() {
                debug!(widget_id = %id, attrs = ?attrs, "skipping element with invalid attributes");
                continue;
            }
            let rect = bounds.clamp_raw(&raw);
            let Some(widget) = self.widget_mut(&id) else {
                debug!(widget_id = %id, "sync: element without a widget");
                continue;
            };
            if widget.visible && widget.rect != rect {
                widget.rect = rect;
                changed += 1;
            }
        }
        debug!(changed, "synced positions from rendered elements");
        changed
    }

    /// Sync from the rendered elements, then write the full collection to
    /// storage. Calling this twice without changes writes identical bytes.
    pub fn save_current_layout(&mut self, surface: &dyn RenderSurface) -> StorageResult<()> {
        self.sync_positions_from_dom(surface);
        self.persist()
    }

    /// Write the current snapshot to storage.
    pub fn persist(&mut self) -> StorageResult<()> {
        let json = self.snapshot().to_json()?;
        self.storage.save(&self.storage_key, &json)?;
        info!(
            key = %self.storage_key,
            bytes = json.len(),
            backend = self.storage.name(),
            "layout saved"
        );
        self.last_saved = Some(json);
        Ok(())
    }

    fn persist_quietly(&mut self) {
        if self.lifecycle == StoreLifecycle::Disposed {
            debug!("store disposed, skipping implicit save");
            return;
        }
        if let Err(err) = self.persist() {
            error!(error = %err, "implicit layout save failed");
        }
    }

    /// The JSON most recently written by this store.
    pub fn last_saved_json(&self) -> Option<&str> {
        self.last_saved.as_deref()
    }

    pub fn snapshot(&self) -> Snapshot {
        Snapshot::new(self.widgets.clone(), self.pagination.clone())
    }

    pub fn set_dragging(&mut self, dragging: bool, id: Option<WidgetId>) {
        self.drag = if dragging {
            DragState {
                active: true,
                widget: id,
            }
        } else {
            DragState::default()
        };
    }

    pub fn is_dragging(&self) -> bool {
        self.drag.active
    }

    pub fn dragged_widget(&self) -> Option<&WidgetId> {
        self.drag.widget.as_ref()
    }

    /// Queue a store-to-library push. Duplicates collapse.
    pub fn queue_push(&mut self, id: WidgetId) {
        if !self.pending_pushes.contains(&id) {
            self.pending_pushes.push(id);
        }
    }

    pub fn has_pending_pushes(&self) -> bool {
        !self.pending_pushes.is_empty()
    }

    pub fn take_pending_pushes(&mut self) -> Vec<WidgetId> {
        std::mem::take(&mut self.pending_pushes)
    }
}
