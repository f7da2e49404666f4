use std::collections::{BTreeMap, BTreeSet, VecDeque};
use std::sync::Arc;
use std::time::Duration;

use dashgrid::config::DashboardConfig;
use dashgrid::constraint::ContainerBounds;
use dashgrid::dashboard::Dashboard;
use dashgrid::error::GridError;
use dashgrid::geometry::{ElementAttrs, GridRect, RawPosition};
use dashgrid::library::{
    ChangedNode, DragLibrary, GridEvent, GridEventKind, GridOptions, RenderSurface,
};
use dashgrid::seed::default_widgets;
use dashgrid::session::EditMode;
use dashgrid::snapshot::Snapshot;
use dashgrid::storage::{FileStorage, MemoryStorage, StorageBackend};
use dashgrid::store::{VisibilityChange, WidgetStateStore};
use dashgrid::widget::{Widget, WidgetId};

const KEY: &str = "grid-storage";

/// Drag library double. Records every update, can fail them all, and can
/// shrink every accepted update to mimic a library that adjusts pushes.
#[derive(Default)]
struct FakeGrid {
    options: Option<GridOptions>,
    elements: BTreeMap<WidgetId, ElementAttrs>,
    nodes: BTreeMap<WidgetId, GridRect>,
    subscribed: BTreeSet<GridEventKind>,
    events: VecDeque<GridEvent>,
    fail_updates: bool,
    shrink: u16,
    updates: Vec<(WidgetId, GridRect)>,
    destroyed: usize,
}

impl FakeGrid {
    fn emit(&mut self, event: GridEvent) {
        if self.subscribed.contains(&event.kind()) {
            self.events.push_back(event);
        }
    }

    fn place(&mut self, id: &WidgetId, rect: GridRect) {
        self.nodes.insert(id.clone(), rect);
        self.elements
            .insert(id.clone(), ElementAttrs::from_rect(rect));
    }

    /// A complete user drag of `id` ending at `rect`, exactly as reported.
    fn drag(&mut self, id: &str, rect: GridRect) {
        let id = WidgetId::new(id);
        self.emit(GridEvent::DragStart { id: id.clone() });
        self.place(&id, rect);
        self.emit(GridEvent::DragStop { id: id.clone() });
        self.emit(GridEvent::Change {
            items: vec![ChangedNode {
                id,
                position: rect.into(),
            }],
        });
    }

    fn updates_for(&self, id: &str) -> Vec<GridRect> {
        self.updates
            .iter()
            .filter(|(update, _)| update.as_str() == id)
            .map(|(_, rect)| *rect)
            .collect()
    }
}

impl DragLibrary for FakeGrid {
    fn init(&mut self, options: GridOptions) -> Result<(), GridError> {
        options.validate()?;
        self.options = Some(options);
        for (id, attrs) in &self.elements {
            let raw = RawPosition::from_attrs(attrs);
            if raw.is_valid() {
                self.nodes.entry(id.clone()).or_insert(raw.sanitize());
            }
        }
        Ok(())
    }

    fn is_ready(&self) -> bool {
        self.options.is_some()
    }

    fn update(&mut self, id: &WidgetId, rect: GridRect) -> Result<GridRect, GridError> {
        if self.options.is_none() {
            return Err(GridError::NotInitialized);
        }
        if self.fail_updates {
            return Err(GridError::NodeNotFound(id.clone()));
        }
        let applied = GridRect {
            w: rect.w.saturating_sub(self.shrink).max(1),
            ..rect
        };
        self.updates.push((id.clone(), rect));
        self.place(id, applied);
        Ok(applied)
    }

    fn node(&self, id: &WidgetId) -> Option<RawPosition> {
        self.nodes.get(id).map(|rect| RawPosition::from(*rect))
    }

    fn on(&mut self, kinds: &[GridEventKind]) {
        self.subscribed.extend(kinds.iter().copied());
    }

    fn off(&mut self, kinds: &[GridEventKind]) {
        for kind in kinds {
            self.subscribed.remove(kind);
        }
    }

    fn drain_events(&mut self) -> Vec<GridEvent> {
        self.events.drain(..).collect()
    }

    fn destroy(&mut self, remove_dom: bool) {
        self.options = None;
        self.nodes.clear();
        self.subscribed.clear();
        self.events.clear();
        self.destroyed += 1;
        if remove_dom {
            self.elements.clear();
        }
    }
}

impl RenderSurface for FakeGrid {
    fn element_ids(&self) -> Vec<WidgetId> {
        self.elements.keys().cloned().collect()
    }

    fn element_attrs(&self, id: &WidgetId) -> Option<ElementAttrs> {
        self.elements.get(id).cloned()
    }

    fn write_attrs(&mut self, id: &WidgetId, rect: GridRect) -> bool {
        match self.elements.get_mut(id) {
            Some(attrs) => {
                *attrs = ElementAttrs::from_rect(rect);
                true
            }
            None => false,
        }
    }

    fn reconcile(&mut self, widgets: &[Widget]) {
        let visible: BTreeSet<&WidgetId> = widgets
            .iter()
            .filter(|w| w.visible)
            .map(|w| &w.id)
            .collect();
        self.elements.retain(|id, _| visible.contains(id));
        self.nodes.retain(|id, _| visible.contains(id));
        for widget in widgets.iter().filter(|w| w.visible) {
            self.elements
                .insert(widget.id.clone(), ElementAttrs::from_rect(widget.rect));
            if self.options.is_some() {
                self.nodes.entry(widget.id.clone()).or_insert(widget.rect);
            }
        }
    }
}

fn id(s: &str) -> WidgetId {
    WidgetId::new(s)
}

fn dashboard_with(storage: Arc<MemoryStorage>) -> Dashboard<FakeGrid> {
    let store = WidgetStateStore::new(default_widgets(), Box::new(storage));
    let config = DashboardConfig::default();
    let bounds = config.bounds();
    let mut dashboard = Dashboard::new(FakeGrid::default(), store, config);
    dashboard.init().unwrap();
    dashboard.measure_container(bounds);
    dashboard
}

fn dashboard() -> Dashboard<FakeGrid> {
    dashboard_with(Arc::new(MemoryStorage::new()))
}

fn settle<G: DragLibrary + RenderSurface>(dashboard: &mut Dashboard<G>) {
    for _ in 0..20 {
        dashboard.advance(Duration::from_millis(100));
    }
}

fn rect_of<G: DragLibrary + RenderSurface>(dashboard: &Dashboard<G>, s: &str) -> GridRect {
    dashboard.store().widget(&id(s)).unwrap().rect
}

fn editing() -> Dashboard<FakeGrid> {
    let mut dashboard = dashboard();
    dashboard.toggle_edit_mode();
    settle(&mut dashboard);
    assert_eq!(dashboard.mode(), EditMode::Edit);
    dashboard
}

#[test]
fn entering_edit_mode_pushes_every_visible_widget() {
    let dashboard = editing();
    assert_eq!(dashboard.transition(), None);
    assert!(dashboard.is_editing());
    let pushed: BTreeSet<&str> = dashboard
        .grid()
        .updates
        .iter()
        .map(|(id, _)| id.as_str())
        .collect();
    assert_eq!(pushed.len(), 5);
    assert_eq!(dashboard.grid().updates_for("widget-1"), vec![GridRect::new(0, 0, 6, 4)]);
}

#[test]
fn entering_pushes_even_when_the_container_is_never_measured() {
    let store = WidgetStateStore::in_memory(default_widgets());
    let mut dashboard = Dashboard::new(FakeGrid::default(), store, DashboardConfig::default());
    dashboard.init().unwrap();
    dashboard.toggle_edit_mode();
    dashboard.advance(Duration::from_millis(500));
    assert!(dashboard.grid().updates.is_empty());
    assert_eq!(dashboard.transition().map(|t| t.target()), Some(EditMode::Edit));
    settle(&mut dashboard);
    assert_eq!(dashboard.mode(), EditMode::Edit);
    assert_eq!(dashboard.grid().updates.len(), 5);
}

#[test]
fn hiding_captures_the_live_position_not_the_stale_store() {
    let mut dashboard = dashboard();
    // the library moved widget-2 without the store hearing about it
    dashboard
        .grid_mut()
        .place(&id("widget-2"), GridRect::new(2, 3, 2, 2));
    assert_eq!(rect_of(&dashboard, "widget-2"), GridRect::new(0, 4, 3, 2));

    let hidden = dashboard.toggle_visibility(&id("widget-2"));
    assert_eq!(
        hidden,
        Some(VisibilityChange::Hidden {
            rect: GridRect::new(2, 3, 2, 2)
        })
    );
    assert!(dashboard.grid().element_attrs(&id("widget-2")).is_none());

    let shown = dashboard.toggle_visibility(&id("widget-2"));
    assert_eq!(
        shown,
        Some(VisibilityChange::Shown {
            rect: GridRect::new(2, 3, 2, 2)
        })
    );
    dashboard.advance(Duration::ZERO);
    assert_eq!(
        dashboard.grid().updates_for("widget-2"),
        vec![GridRect::new(2, 3, 2, 2)]
    );
}

#[test]
fn drop_outside_the_container_is_pulled_back_in() {
    let mut dashboard = editing();
    dashboard.grid_mut().drag("widget-3", GridRect::new(5, 39, 3, 3));
    dashboard.advance(Duration::from_millis(16));

    let expected = GridRect::new(3, 37, 3, 3);
    assert_eq!(rect_of(&dashboard, "widget-3"), expected);
    assert_eq!(
        dashboard.grid().node(&id("widget-3")),
        Some(RawPosition::from(expected))
    );
    // the stop corrects it; the change that follows carries the same stale rect
    assert_eq!(dashboard.sync_stats().corrections, 1);
}

#[test]
fn swap_reports_both_nodes_in_one_change() {
    let mut dashboard = editing();
    let grid = dashboard.grid_mut();
    grid.emit(GridEvent::DragStart { id: id("widget-2") });
    grid.place(&id("widget-2"), GridRect::new(3, 4, 3, 2));
    grid.place(&id("widget-3"), GridRect::new(0, 4, 3, 2));
    grid.emit(GridEvent::DragStop { id: id("widget-2") });
    grid.emit(GridEvent::Change {
        items: vec![
            ChangedNode {
                id: id("widget-2"),
                position: RawPosition::new(3.0, 4.0, 3.0, 2.0),
            },
            ChangedNode {
                id: id("widget-3"),
                position: RawPosition::new(0.0, 4.0, 3.0, 2.0),
            },
        ],
    });
    dashboard.advance(Duration::from_millis(16));
    assert_eq!(rect_of(&dashboard, "widget-2"), GridRect::new(3, 4, 3, 2));
    assert_eq!(rect_of(&dashboard, "widget-3"), GridRect::new(0, 4, 3, 2));
    assert_eq!(dashboard.sync_stats().corrections, 0);
}

#[test]
fn pushes_wait_for_the_drag_to_settle() {
    let mut dashboard = editing();
    dashboard.toggle_visibility(&id("widget-5"));
    let before = dashboard.grid().updates.len();

    dashboard
        .grid_mut()
        .emit(GridEvent::DragStart { id: id("widget-1") });
    dashboard.advance(Duration::from_millis(16));
    assert!(dashboard.store().is_dragging());

    dashboard.toggle_visibility(&id("widget-5"));
    dashboard.advance(Duration::from_millis(16));
    dashboard.advance(Duration::from_millis(16));
    assert_eq!(dashboard.grid().updates.len(), before);
    assert!(dashboard.store().has_pending_pushes());

    dashboard
        .grid_mut()
        .emit(GridEvent::DragStop { id: id("widget-1") });
    dashboard.advance(Duration::from_millis(16));
    assert!(dashboard.store().is_dragging());
    dashboard.advance(Duration::from_millis(60));
    dashboard.advance(Duration::from_millis(16));
    assert!(!dashboard.store().is_dragging());
    assert_eq!(
        dashboard.grid().updates_for("widget-5"),
        vec![GridRect::new(3, 6, 3, 3), GridRect::new(3, 6, 3, 3)]
    );
}

#[test]
fn failed_updates_fall_back_to_attributes() {
    let mut dashboard = dashboard();
    dashboard.grid_mut().fail_updates = true;
    dashboard.toggle_edit_mode();
    settle(&mut dashboard);
    assert_eq!(dashboard.mode(), EditMode::Edit);
    assert_eq!(dashboard.sync_stats().fallbacks, 5);
    assert_eq!(
        dashboard.grid().element_attrs(&id("widget-4")),
        Some(ElementAttrs::from_rect(GridRect::new(0, 6, 3, 3)))
    );
}

#[test]
fn library_adjustment_is_written_back_once() {
    let mut dashboard = dashboard();
    dashboard.grid_mut().shrink = 1;
    dashboard.toggle_edit_mode();
    settle(&mut dashboard);
    assert_eq!(rect_of(&dashboard, "widget-1"), GridRect::new(0, 0, 5, 4));
    assert_eq!(
        dashboard.grid().updates_for("widget-1"),
        vec![GridRect::new(0, 0, 6, 4)]
    );
}

#[test]
fn leaving_edit_mode_saves_what_the_library_shows() {
    let storage = Arc::new(MemoryStorage::new());
    let mut dashboard = dashboard_with(storage.clone());
    dashboard.toggle_edit_mode();
    settle(&mut dashboard);
    // an attribute change the engine never got an event for
    dashboard
        .grid_mut()
        .write_attrs(&id("widget-4"), GridRect::new(0, 20, 2, 2));

    assert!(dashboard.exit_edit_mode());
    assert_eq!(dashboard.mode(), EditMode::View);
    let json = storage.load(KEY).unwrap().expect("saved on exit");
    let snapshot = Snapshot::from_json(&json).unwrap();
    let saved = snapshot
        .widgets()
        .iter()
        .find(|w| w.id.as_str() == "widget-4")
        .unwrap();
    assert_eq!(saved.rect, GridRect::new(0, 20, 2, 2));
    assert!(!dashboard.exit_edit_mode());
}

#[test]
fn saving_twice_writes_identical_bytes() {
    let storage = Arc::new(MemoryStorage::new());
    let mut dashboard = dashboard_with(storage.clone());
    dashboard.save_layout().unwrap();
    let first = storage.load(KEY).unwrap();
    dashboard.save_layout().unwrap();
    assert_eq!(storage.load(KEY).unwrap(), first);
}

#[test]
fn corrupt_snapshot_falls_back_to_the_seed() {
    let storage = Arc::new(MemoryStorage::new());
    storage.save(KEY, "{\"state\": [not json").unwrap();
    let dashboard = dashboard_with(storage);
    assert_eq!(dashboard.widgets(), default_widgets().as_slice());
}

#[test]
fn layout_survives_a_restart_on_disk() {
    let dir = tempfile::tempdir().unwrap();
    {
        let store = WidgetStateStore::new(default_widgets(), Box::new(FileStorage::new(dir.path())));
        let mut dashboard = Dashboard::new(FakeGrid::default(), store, DashboardConfig::default());
        dashboard.init().unwrap();
        dashboard.measure_container(ContainerBounds::default());
        dashboard.toggle_edit_mode();
        settle(&mut dashboard);
        dashboard.grid_mut().drag("widget-2", GridRect::new(3, 10, 3, 2));
        dashboard.advance(Duration::from_millis(16));
        dashboard.toggle_visibility(&id("widget-5"));
        dashboard.set_widget_page(&id("widget-1"), 3);
        assert!(dashboard.exit_edit_mode());
        dashboard.dispose();
    }

    let store = WidgetStateStore::new(default_widgets(), Box::new(FileStorage::new(dir.path())));
    let mut dashboard = Dashboard::new(FakeGrid::default(), store, DashboardConfig::default());
    dashboard.init().unwrap();
    assert_eq!(rect_of(&dashboard, "widget-2"), GridRect::new(3, 10, 3, 2));
    assert!(!dashboard.store().widget(&id("widget-5")).unwrap().visible);
    assert_eq!(dashboard.widget_page(&id("widget-1")), 3);
    assert!(dashboard.grid().element_attrs(&id("widget-5")).is_none());
}

#[test]
fn restore_reclamps_hidden_widgets_against_new_bounds() {
    let mut dashboard = dashboard();
    dashboard.toggle_visibility(&id("widget-1"));
    dashboard.measure_container(ContainerBounds::new(4, 40));
    // hidden widgets keep their last rect until shown
    assert_eq!(rect_of(&dashboard, "widget-1"), GridRect::new(0, 0, 6, 4));
    assert_eq!(rect_of(&dashboard, "widget-3"), GridRect::new(1, 4, 3, 2));

    let shown = dashboard.restore_all_widgets();
    assert_eq!(shown, vec![id("widget-1")]);
    assert_eq!(rect_of(&dashboard, "widget-1"), GridRect::new(0, 0, 4, 4));
    dashboard.advance(Duration::ZERO);
    assert_eq!(
        dashboard.grid().updates_for("widget-1"),
        vec![GridRect::new(0, 0, 4, 4)]
    );
}

#[test]
fn toggle_during_a_transition_runs_after_it() {
    let storage = Arc::new(MemoryStorage::new());
    let mut dashboard = dashboard_with(storage.clone());
    dashboard.toggle_edit_mode();
    dashboard.toggle_edit_mode();
    assert_eq!(dashboard.transition().map(|t| t.target()), Some(EditMode::Edit));
    settle(&mut dashboard);
    assert_eq!(dashboard.mode(), EditMode::View);
    assert_eq!(dashboard.transition(), None);
    assert!(storage.load(KEY).unwrap().is_some());
}

#[test]
fn nothing_runs_after_dispose() {
    let mut dashboard = dashboard();
    dashboard.toggle_edit_mode();
    dashboard.dispose();
    assert!(dashboard.is_disposed());
    assert!(dashboard.scheduler().is_empty());
    settle(&mut dashboard);
    assert!(dashboard.grid().updates.is_empty());
    assert!(!dashboard.grid().is_ready());
    assert_eq!(dashboard.toggle_visibility(&id("widget-1")), None);
}

#[test]
fn mutators_are_inert_after_dispose() {
    let storage = Arc::new(MemoryStorage::new());
    let mut dashboard = dashboard_with(storage.clone());
    dashboard.toggle_visibility(&id("widget-3"));
    dashboard.save_layout().unwrap();
    let saved = storage.load(KEY).unwrap();
    assert!(saved.is_some());
    dashboard.dispose();
    let before = dashboard.store().snapshot();

    assert!(dashboard.remove_widget(&id("widget-1")).is_none());
    assert!(dashboard.restore_all_widgets().is_empty());
    dashboard.reset_to_defaults();
    dashboard.set_widget_page(&id("widget-1"), 3);
    assert_eq!(dashboard.step_widget_page(&id("widget-1"), 1), 1);
    dashboard.measure_container(ContainerBounds::new(3, 10));
    dashboard.clear_persisted_layout().unwrap();

    assert_eq!(dashboard.store().snapshot(), before);
    assert_eq!(storage.load(KEY).unwrap(), saved);
    assert!(dashboard.scheduler().is_empty());
    assert!(dashboard.grid().updates.is_empty());
}

#[test]
fn reset_and_clear_return_to_the_seed() {
    let storage = Arc::new(MemoryStorage::new());
    let mut dashboard = dashboard_with(storage.clone());
    dashboard.toggle_visibility(&id("widget-3"));
    dashboard.set_widget_page(&id("widget-1"), 2);
    dashboard.reset_to_defaults();
    assert_eq!(dashboard.widgets(), default_widgets().as_slice());
    assert_eq!(dashboard.widget_page(&id("widget-1")), 1);
    assert!(storage.load(KEY).unwrap().is_some());

    dashboard.remove_widget(&id("widget-2"));
    assert_eq!(dashboard.store().len(), 4);
    dashboard.clear_persisted_layout().unwrap();
    assert!(storage.load(KEY).unwrap().is_none());
    assert_eq!(dashboard.store().len(), 5);
}

#[test]
fn page_steps_stay_within_the_content() {
    let mut dashboard = dashboard();
    let table = id("widget-1");
    assert_eq!(dashboard.step_widget_page(&table, 1), 2);
    assert_eq!(dashboard.step_widget_page(&table, 10), 4);
    assert_eq!(dashboard.step_widget_page(&table, -10), 1);
    // stats do not page
    assert_eq!(dashboard.step_widget_page(&id("widget-2"), 1), 1);
}
