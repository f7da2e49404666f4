//! Pointer gesture math for float placement: header drags move a node,
//! edge drags resize it. Everything is in grid cells.

use ratatui::prelude::Rect;

use super::{GridViewport, SignedRect};
use crate::geometry::GridRect;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResizeEdge {
    Right,
    Bottom,
    BottomRight,
}

/// A header drag in flight.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeaderDrag<R> {
    pub id: R,
    pub start_rect: GridRect,
    pub start_col: u16,
    pub start_row: u16,
}

/// A resize drag in flight.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResizeDrag<R> {
    pub id: R,
    pub edge: ResizeEdge,
    pub start_rect: GridRect,
    pub start_col: u16,
    pub start_row: u16,
}

/// Header row of a node's screen rectangle (inside the border).
pub fn header_handle(screen: Rect, viewport: &GridViewport, rect: GridRect) -> Option<Rect> {
    if screen.width < 3 || screen.height < 2 {
        return None;
    }
    // the header is only grabbable while the node's top edge is on screen
    if viewport.header_row(rect) != screen.y as i32 {
        return None;
    }
    Some(Rect {
        x: screen.x,
        y: screen.y,
        width: screen.width,
        height: 1,
    })
}

/// Which resize edge, if any, sits under a cell of the node's screen rect.
pub fn resize_edge_at(screen: Rect, column: u16, row: u16) -> Option<ResizeEdge> {
    if screen.width < 2 || screen.height < 2 {
        return None;
    }
    let right = screen.x.saturating_add(screen.width - 1);
    let bottom = screen.y.saturating_add(screen.height - 1);
    match (column == right, row == bottom) {
        (true, true) => Some(ResizeEdge::BottomRight),
        (true, false) if row > screen.y => Some(ResizeEdge::Right),
        (false, true) => Some(ResizeEdge::Bottom),
        _ => None,
    }
}

/// Where a header drag would drop the node. The result may leave the
/// container; placement decides what to do with that.
pub fn apply_move_drag(start: GridRect, d_cols: i32, d_rows: i32) -> SignedRect {
    let base = SignedRect::from_grid(start);
    SignedRect {
        x: base.x + d_cols,
        y: base.y + d_rows,
        ..base
    }
}

/// New size after dragging `edge` by the given cell deltas. Sizes never
/// drop below one cell; the origin never moves.
pub fn apply_resize_drag_signed(
    start: GridRect,
    edge: ResizeEdge,
    d_cols: i32,
    d_rows: i32,
) -> SignedRect {
    let base = SignedRect::from_grid(start);
    let (mut w, mut h) = (base.w, base.h);
    if matches!(edge, ResizeEdge::Right | ResizeEdge::BottomRight) {
        w += d_cols;
    }
    if matches!(edge, ResizeEdge::Bottom | ResizeEdge::BottomRight) {
        h += d_rows;
    }
    SignedRect {
        w: w.max(1),
        h: h.max(1),
        ..base
    }
}

/// Quantize a gesture result into a node rectangle: negative origins snap
/// to 0 and everything saturates into `u16`. Container bounds are left to
/// the engine.
pub fn place(rect: SignedRect) -> GridRect {
    let clamp = |v: i32, floor: i32| v.clamp(floor, u16::MAX as i32) as u16;
    GridRect {
        x: clamp(rect.x, 0),
        y: clamp(rect.y, 0),
        w: clamp(rect.w, 1),
        h: clamp(rect.h, 1),
    }
}
