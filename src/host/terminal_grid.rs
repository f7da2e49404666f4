//! A drag library and render surface for the terminal.
//!
//! Nodes live in grid cells. Pointer input moves a node by its header row
//! and resizes it from its right/bottom border; the result is quantized to
//! whole cells but otherwise left alone, so a drop can land outside the
//! container and the engine has to pull it back in. Drops use float
//! placement: empty space takes the node as is, an occupied spot swaps the
//! occupant into the dragged node's old origin.

use std::collections::{BTreeMap, BTreeSet, VecDeque};

use crossterm::event::{MouseButton, MouseEvent, MouseEventKind};
use ratatui::prelude::Rect;
use tracing::debug;

use crate::error::GridError;
use crate::geometry::{ElementAttrs, GridRect, RawPosition};
use crate::layout::floating::{
    HeaderDrag, ResizeDrag, ResizeEdge, apply_move_drag, apply_resize_drag_signed, header_handle,
    place, resize_edge_at,
};
use crate::layout::{GridViewport, RegionMap, SignedRect};
use crate::library::{
    ChangedNode, DragLibrary, GridEvent, GridEventKind, GridOptions, RenderSurface,
};
use crate::widget::{Widget, WidgetId};

#[derive(Debug, Clone)]
enum Gesture {
    Move(HeaderDrag<WidgetId>),
    Resize(ResizeDrag<WidgetId>),
}

impl Gesture {
    fn id(&self) -> &WidgetId {
        match self {
            Gesture::Move(drag) => &drag.id,
            Gesture::Resize(drag) => &drag.id,
        }
    }
}

#[derive(Debug, Default)]
pub struct TerminalGrid {
    options: Option<GridOptions>,
    destroyed: bool,
    elements: BTreeMap<WidgetId, ElementAttrs>,
    order: Vec<WidgetId>,
    nodes: BTreeMap<WidgetId, GridRect>,
    subscribed: BTreeSet<GridEventKind>,
    events: VecDeque<GridEvent>,
    gesture: Option<Gesture>,
    preview: Option<GridRect>,
    viewport: GridViewport,
    regions: RegionMap<WidgetId>,
}

impl TerminalGrid {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn options(&self) -> Option<GridOptions> {
        self.options
    }

    pub fn is_static(&self) -> bool {
        self.options.is_none_or(|options| options.static_mode)
    }

    pub fn viewport(&self) -> &GridViewport {
        &self.viewport
    }

    pub fn set_viewport(&mut self, area: Rect) {
        self.viewport.area = area;
        self.relayout();
    }

    pub fn scroll_by(&mut self, delta: i32) {
        let rows = self.max_rows();
        self.viewport.scroll_by(delta, rows);
        self.relayout();
    }

    /// Mounted element ids in render order.
    pub fn order(&self) -> &[WidgetId] {
        &self.order
    }

    pub fn screen_rect(&self, id: &WidgetId) -> Option<Rect> {
        self.regions.get(id)
    }

    /// The id of the node a gesture is currently moving.
    pub fn active_gesture(&self) -> Option<&WidgetId> {
        self.gesture.as_ref().map(Gesture::id)
    }

    /// Where a node is shown: the gesture preview while it is being
    /// dragged, otherwise its node, otherwise its attributes.
    pub fn display_rect(&self, id: &WidgetId) -> Option<GridRect> {
        if self.active_gesture() == Some(id)
            && let Some(preview) = self.preview
        {
            return Some(preview);
        }
        if let Some(node) = self.nodes.get(id) {
            return Some(*node);
        }
        self.elements
            .get(id)
            .map(RawPosition::from_attrs)
            .filter(RawPosition::is_valid)
            .map(|raw| raw.sanitize())
    }

    fn max_rows(&self) -> u16 {
        self.options
            .map(|options| options.max_rows)
            .unwrap_or(crate::constants::CONTAINER_ROWS)
    }

    fn relayout(&mut self) {
        self.regions.clear();
        for id in &self.order {
            if let Some(rect) = self.display_rect(id)
                && let Some(screen) = self.viewport.to_screen(rect)
            {
                self.regions.set(id.clone(), screen);
            }
        }
    }

    fn emit(&mut self, event: GridEvent) {
        if self.subscribed.contains(&event.kind()) {
            self.events.push_back(event);
        }
    }

    fn set_node(&mut self, id: &WidgetId, rect: GridRect) {
        self.nodes.insert(id.clone(), rect);
        if let Some(attrs) = self.elements.get_mut(id) {
            *attrs = ElementAttrs::from_rect(rect);
        }
    }

    fn can_drag(&self) -> bool {
        self.options
            .is_some_and(|options| !options.static_mode && !options.disable_drag)
    }

    fn can_resize(&self) -> bool {
        self.options
            .is_some_and(|options| !options.static_mode && !options.disable_resize)
    }

    /// Feed one pointer event. Returns whether the grid consumed it.
    pub fn handle_mouse(&mut self, event: &MouseEvent) -> bool {
        match event.kind {
            MouseEventKind::ScrollUp => {
                self.scroll_by(-1);
                return true;
            }
            MouseEventKind::ScrollDown => {
                self.scroll_by(1);
                return true;
            }
            _ => {}
        }
        if self.is_static() {
            return false;
        }
        match event.kind {
            MouseEventKind::Down(MouseButton::Left) => self.begin_pointer(event.column, event.row),
            MouseEventKind::Drag(MouseButton::Left) => self.update_pointer(event.column, event.row),
            MouseEventKind::Up(MouseButton::Left) => self.end_pointer(event.column, event.row),
            _ => false,
        }
    }

    fn begin_pointer(&mut self, column: u16, row: u16) -> bool {
        let Some(id) = self.regions.hit_test(column, row, self.order.iter().rev()) else {
            return false;
        };
        let (Some(screen), Some(start_rect)) = (self.regions.get(&id), self.nodes.get(&id).copied())
        else {
            return false;
        };
        if self.can_resize()
            && let Some(edge) = resize_edge_at(screen, column, row)
        {
            self.gesture = Some(Gesture::Resize(ResizeDrag {
                id: id.clone(),
                edge,
                start_rect,
                start_col: column,
                start_row: row,
            }));
            self.preview = Some(start_rect);
            self.emit(GridEvent::ResizeStart { id });
            return true;
        }
        let on_header = header_handle(screen, &self.viewport, start_rect)
            .is_some_and(|handle| handle.y == row);
        if self.can_drag() && on_header {
            self.gesture = Some(Gesture::Move(HeaderDrag {
                id: id.clone(),
                start_rect,
                start_col: column,
                start_row: row,
            }));
            self.preview = Some(start_rect);
            self.emit(GridEvent::DragStart { id });
            return true;
        }
        false
    }

    fn gesture_target(&self, column: u16, row: u16) -> Option<SignedRect> {
        let gesture = self.gesture.as_ref()?;
        let target = match gesture {
            Gesture::Move(drag) => {
                let (dx, dy) = self.viewport.cells_from_delta(
                    column as i32 - drag.start_col as i32,
                    row as i32 - drag.start_row as i32,
                );
                apply_move_drag(drag.start_rect, dx, dy)
            }
            Gesture::Resize(drag) => {
                let (dx, dy) = self.viewport.cells_from_delta(
                    column as i32 - drag.start_col as i32,
                    row as i32 - drag.start_row as i32,
                );
                apply_resize_drag_signed(drag.start_rect, drag.edge, dx, dy)
            }
        };
        Some(target)
    }

    fn update_pointer(&mut self, column: u16, row: u16) -> bool {
        let Some(target) = self.gesture_target(column, row) else {
            return false;
        };
        self.preview = Some(place(target));
        self.relayout();
        true
    }

    fn end_pointer(&mut self, column: u16, row: u16) -> bool {
        let target = self.gesture_target(column, row);
        let (Some(gesture), Some(target)) = (self.gesture.take(), target) else {
            return false;
        };
        self.preview = None;
        match gesture {
            Gesture::Move(drag) => self.finish_move(&drag.id, place(target)),
            Gesture::Resize(drag) => self.finish_resize(&drag.id, place(target)),
        }
        true
    }

    /// Move a node as if it had been dragged by its header to `(x, y)`.
    /// Negative coordinates snap to 0. Returns `false` for unknown nodes or
    /// a grid that does not accept drags.
    pub fn drop_widget(&mut self, id: &WidgetId, x: i32, y: i32) -> bool {
        let Some(start) = self.nodes.get(id).copied() else {
            return false;
        };
        if !self.can_drag() {
            return false;
        }
        self.emit(GridEvent::DragStart { id: id.clone() });
        let target = SignedRect {
            x,
            y,
            ..SignedRect::from_grid(start)
        };
        self.finish_move(id, place(target));
        true
    }

    /// Resize a node as if its bottom-right corner had been dragged.
    pub fn resize_widget(&mut self, id: &WidgetId, w: i32, h: i32) -> bool {
        let Some(start) = self.nodes.get(id).copied() else {
            return false;
        };
        if !self.can_resize() {
            return false;
        }
        self.emit(GridEvent::ResizeStart { id: id.clone() });
        let d_cols = w - start.w as i32;
        let d_rows = h - start.h as i32;
        let target = apply_resize_drag_signed(start, ResizeEdge::BottomRight, d_cols, d_rows);
        self.finish_resize(id, place(target));
        true
    }

    fn finish_move(&mut self, id: &WidgetId, placed: GridRect) {
        let Some(origin) = self.nodes.get(id).copied() else {
            return;
        };
        let displaced = self
            .order
            .iter()
            .filter(|other| *other != id)
            .find(|other| {
                self.nodes
                    .get(*other)
                    .is_some_and(|rect| rect.intersects(&placed))
            })
            .cloned();

        self.set_node(id, placed);
        let mut items = Vec::new();
        if placed != origin {
            items.push(ChangedNode {
                id: id.clone(),
                position: placed.into(),
            });
        }
        if let Some(other) = displaced
            && let Some(other_rect) = self.nodes.get(&other).copied()
        {
            let swapped = other_rect.with_origin(origin.x, origin.y);
            debug!(widget_id = %id, displaced = %other, to = %swapped, "swap on drop");
            self.set_node(&other, swapped);
            items.push(ChangedNode {
                id: other,
                position: swapped.into(),
            });
        }
        self.relayout();
        self.emit(GridEvent::DragStop { id: id.clone() });
        if !items.is_empty() {
            self.emit(GridEvent::Change { items });
        }
    }

    fn finish_resize(&mut self, id: &WidgetId, placed: GridRect) {
        let Some(origin) = self.nodes.get(id).copied() else {
            return;
        };
        self.set_node(id, placed);
        self.relayout();
        self.emit(GridEvent::ResizeStop { id: id.clone() });
        if placed != origin {
            self.emit(GridEvent::Change {
                items: vec![ChangedNode {
                    id: id.clone(),
                    position: placed.into(),
                }],
            });
        }
    }
}

impl DragLibrary for TerminalGrid {
    fn init(&mut self, options: GridOptions) -> Result<(), GridError> {
        options.validate()?;
        self.options = Some(options);
        self.destroyed = false;
        self.viewport.columns = options.columns;
        for (id, attrs) in &self.elements {
            if self.nodes.contains_key(id) {
                continue;
            }
            let raw = RawPosition::from_attrs(attrs);
            if raw.is_valid() {
                self.nodes.insert(id.clone(), raw.sanitize());
            }
        }
        self.relayout();
        debug!(
            static_mode = options.static_mode,
            nodes = self.nodes.len(),
            "terminal grid initialized"
        );
        Ok(())
    }

    fn is_ready(&self) -> bool {
        self.options.is_some() && !self.destroyed
    }

    fn update(&mut self, id: &WidgetId, rect: GridRect) -> Result<GridRect, GridError> {
        if self.destroyed {
            return Err(GridError::Destroyed);
        }
        let Some(options) = self.options else {
            return Err(GridError::NotInitialized);
        };
        if !self.elements.contains_key(id) {
            return Err(GridError::NodeNotFound(id.clone()));
        }
        // nodes never extend past the last column
        let w = rect.w.clamp(1, options.columns);
        let x = rect.x.min(options.columns - w);
        let applied = GridRect { x, w, ..rect };
        self.set_node(id, applied);
        self.relayout();
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
        self.destroyed = true;
        self.nodes.clear();
        self.gesture = None;
        self.preview = None;
        self.events.clear();
        self.subscribed.clear();
        if remove_dom {
            self.elements.clear();
            self.order.clear();
        }
        self.relayout();
    }
}

impl RenderSurface for TerminalGrid {
    fn element_ids(&self) -> Vec<WidgetId> {
        self.order.clone()
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
        let visible: Vec<&Widget> = widgets.iter().filter(|w| w.visible).collect();
        let keep: BTreeSet<&WidgetId> = visible.iter().map(|w| &w.id).collect();
        self.elements.retain(|id, _| keep.contains(id));
        self.nodes.retain(|id, _| keep.contains(id));
        if self
            .gesture
            .as_ref()
            .is_some_and(|gesture| !keep.contains(gesture.id()))
        {
            self.gesture = None;
            self.preview = None;
        }
        let initialized = self.options.is_some();
        for widget in &visible {
            self.elements
                .insert(widget.id.clone(), ElementAttrs::from_rect(widget.rect));
            if initialized && !self.nodes.contains_key(&widget.id) {
                self.nodes.insert(widget.id.clone(), widget.rect);
            }
        }
        self.order = visible.iter().map(|w| w.id.clone()).collect();
        self.relayout();
    }
}
