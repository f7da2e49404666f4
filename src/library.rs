//! Seams between the engine and the drag/resize library it drives.
//!
//! The engine never owns node geometry directly. It talks to a
//! [`DragLibrary`] (node state, events) and a [`RenderSurface`] (the
//! rendered elements and their position attributes). Hosts usually
//! implement both on the same type.

use std::fmt;

use crate::constants::{CELL_HEIGHT_PX, CONTAINER_ROWS, GRID_COLUMNS, GRID_MARGIN_PX, GRID_MIN_ROWS};
use crate::error::GridError;
use crate::geometry::{ElementAttrs, GridRect, RawPosition};
use crate::widget::{Widget, WidgetId};

/// Options handed to [`DragLibrary::init`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GridOptions {
    pub cell_height: u16,
    pub columns: u16,
    pub margin: u16,
    pub min_rows: u16,
    pub max_rows: u16,
    /// Nodes render but ignore pointer input.
    pub static_mode: bool,
    /// Nodes stay where they are dropped instead of floating upward.
    pub float_placement: bool,
    pub disable_drag: bool,
    pub disable_resize: bool,
}

impl Default for GridOptions {
    fn default() -> Self {
        Self {
            cell_height: CELL_HEIGHT_PX,
            columns: GRID_COLUMNS,
            margin: GRID_MARGIN_PX,
            min_rows: GRID_MIN_ROWS,
            max_rows: CONTAINER_ROWS,
            static_mode: true,
            float_placement: true,
            disable_drag: true,
            disable_resize: true,
        }
    }
}

impl GridOptions {
    /// Reject option sets no library can honor.
    pub fn validate(&self) -> Result<(), GridError> {
        if self.columns == 0 {
            return Err(GridError::InvalidOptions("columns must be at least 1".into()));
        }
        if self.max_rows == 0 {
            return Err(GridError::InvalidOptions("max_rows must be at least 1".into()));
        }
        if self.min_rows > self.max_rows {
            return Err(GridError::InvalidOptions(format!(
                "min_rows {} exceeds max_rows {}",
                self.min_rows, self.max_rows
            )));
        }
        Ok(())
    }

    pub fn is_interactive(&self) -> bool {
        !self.static_mode && !(self.disable_drag && self.disable_resize)
    }
}

/// Event categories a caller can subscribe to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum GridEventKind {
    DragStart,
    DragStop,
    ResizeStart,
    ResizeStop,
    Change,
}

impl GridEventKind {
    pub const ALL: [GridEventKind; 5] = [
        GridEventKind::DragStart,
        GridEventKind::DragStop,
        GridEventKind::ResizeStart,
        GridEventKind::ResizeStop,
        GridEventKind::Change,
    ];
}

/// One node reported by a change notification.
#[derive(Debug, Clone, PartialEq)]
pub struct ChangedNode {
    pub id: WidgetId,
    pub position: RawPosition,
}

#[derive(Debug, Clone, PartialEq)]
pub enum GridEvent {
    DragStart { id: WidgetId },
    DragStop { id: WidgetId },
    ResizeStart { id: WidgetId },
    ResizeStop { id: WidgetId },
    /// Nodes whose position changed as the result of one user gesture.
    Change { items: Vec<ChangedNode> },
}

impl GridEvent {
    pub fn kind(&self) -> GridEventKind {
        match self {
            GridEvent::DragStart { .. } => GridEventKind::DragStart,
            GridEvent::DragStop { .. } => GridEventKind::DragStop,
            GridEvent::ResizeStart { .. } => GridEventKind::ResizeStart,
            GridEvent::ResizeStop { .. } => GridEventKind::ResizeStop,
            GridEvent::Change { .. } => GridEventKind::Change,
        }
    }
}

impl fmt::Display for GridEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GridEvent::DragStart { id } => write!(f, "dragstart {id}"),
            GridEvent::DragStop { id } => write!(f, "dragstop {id}"),
            GridEvent::ResizeStart { id } => write!(f, "resizestart {id}"),
            GridEvent::ResizeStop { id } => write!(f, "resizestop {id}"),
            GridEvent::Change { items } => write!(f, "change ({} nodes)", items.len()),
        }
    }
}

pub trait DragLibrary {
    /// (Re)build the library instance. Existing nodes are kept.
    fn init(&mut self, options: GridOptions) -> Result<(), GridError>;

    /// True once the instance can accept programmatic updates.
    fn is_ready(&self) -> bool;

    /// Move/resize a node. Returns the rectangle the library actually
    /// applied, which may differ from the request.
    fn update(&mut self, id: &WidgetId, rect: GridRect) -> Result<GridRect, GridError>;

    /// Current node geometry, if the library has a node for `id`.
    fn node(&self, id: &WidgetId) -> Option<RawPosition>;

    fn on(&mut self, kinds: &[GridEventKind]);

    fn off(&mut self, kinds: &[GridEventKind]);

    /// Events for subscribed kinds, oldest first.
    fn drain_events(&mut self) -> Vec<GridEvent>;

    /// Tear the instance down. With `remove_dom` the nodes go too.
    fn destroy(&mut self, remove_dom: bool);
}

pub trait RenderSurface {
    fn element_ids(&self) -> Vec<WidgetId>;

    fn element_attrs(&self, id: &WidgetId) -> Option<ElementAttrs>;

    /// Write the four position attributes. Returns `false` when no element
    /// exists for `id`.
    fn write_attrs(&mut self, id: &WidgetId, rect: GridRect) -> bool;

    /// Render the collection: every visible widget gets an element whose
    /// attributes carry its stored rect; elements of hidden or removed
    /// widgets are unmounted.
    fn reconcile(&mut self, widgets: &[Widget]);
}

impl<T: DragLibrary + ?Sized> DragLibrary for &mut T {
    fn init(&mut self, options: GridOptions) -> Result<(), GridError> {
        (**self).init(options)
    }

    fn is_ready(&self) -> bool {
        (**self).is_ready()
    }

    fn update(&mut self, id: &WidgetId, rect: GridRect) -> Result<GridRect, GridError> {
        (**self).update(id, rect)
    }

    fn node(&self, id: &WidgetId) -> Option<RawPosition> {
        (**self).node(id)
    }

    fn on(&mut self, kinds: &[GridEventKind]) {
        (**self).on(kinds)
    }

    fn off(&mut self, kinds: &[GridEventKind]) {
        (**self).off(kinds)
    }

    fn drain_events(&mut self) -> Vec<GridEvent> {
        (**self).drain_events()
    }

    fn destroy(&mut self, remove_dom: bool) {
        (**self).destroy(remove_dom)
    }
}

impl<T: RenderSurface + ?Sized> RenderSurface for &mut T {
    fn element_ids(&self) -> Vec<WidgetId> {
        (**self).element_ids()
    }

    fn element_attrs(&self, id: &WidgetId) -> Option<ElementAttrs> {
        (**self).element_attrs(id)
    }

    fn write_attrs(&mut self, id: &WidgetId, rect: GridRect) -> bool {
        (**self).write_attrs(id, rect)
    }

    fn reconcile(&mut self, widgets: &[Widget]) {
        (**self).reconcile(widgets)
    }
}

/// Source of a widget's live physical position.
pub trait PositionProbe {
    fn physical_position(&self, id: &WidgetId) -> Option<RawPosition>;
}

/// Probe that asks the library node first and falls back to the element's
/// attributes. Sources whose numbers are not a valid position are skipped.
pub struct LivePositions<'a, G: ?Sized> {
    grid: &'a G,
}

impl<'a, G: DragLibrary + RenderSurface + ?Sized> LivePositions<'a, G> {
    pub fn new(grid: &'a G) -> Self {
        Self { grid }
    }
}

impl<G: DragLibrary + RenderSurface + ?Sized> PositionProbe for LivePositions<'_, G> {
    fn physical_position(&self, id: &WidgetId) -> Option<RawPosition> {
        if let Some(node) = self.grid.node(id).filter(RawPosition::is_valid) {
            return Some(node);
        }
        self.grid
            .element_attrs(id)
            .map(|attrs| RawPosition::from_attrs(&attrs))
            .filter(RawPosition::is_valid)
    }
}

/// Probe with no physical source; callers fall back to stored state.
pub struct NoProbe;

impl PositionProbe for NoProbe {
    fn physical_position(&self, _id: &WidgetId) -> Option<RawPosition> {
        None
    }
}
