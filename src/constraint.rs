//! Container constraint solver.
//!
//! Maps any candidate rectangle to the nearest rectangle fully inside the
//! bounded container ("the fishbowl"). The solver is pure and idempotent:
//! repeated sync passes run every rectangle through it, so
//! `clamp(clamp(r)) == clamp(r)` must hold for every input.

use crate::constants::{CONTAINER_ROWS, GRID_COLUMNS};
use crate::geometry::{GridRect, RawPosition};

/// Fixed size of the bounded container, in grid cells.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ContainerBounds {
    columns: u16,
    rows: u16,
}

impl Default for ContainerBounds {
    fn default() -> Self {
        Self::new(GRID_COLUMNS, CONTAINER_ROWS)
    }
}

impl ContainerBounds {
    /// Zero-sized dimensions are raised to 1 so every rectangle has
    /// somewhere to go.
    pub fn new(columns: u16, rows: u16) -> Self {
        Self {
            columns: columns.max(1),
            rows: rows.max(1),
        }
    }

    pub fn columns(&self) -> u16 {
        self.columns
    }

    pub fn rows(&self) -> u16 {
        self.rows
    }

    pub fn contains(&self, rect: &GridRect) -> bool {
        rect.w >= 1
            && rect.h >= 1
            && rect.right() <= self.columns as u32
            && rect.bottom() <= self.rows as u32
    }

    /// Clamp an untrusted position: sanitize first, then solve.
    pub fn clamp_raw(&self, raw: &RawPosition) -> GridRect {
        self.clamp(raw.sanitize())
    }

    pub fn clamp(&self, rect: GridRect) -> GridRect {
        clamp_to_container(rect, *self)
    }
}

/// Solve one rectangle against the container.
///
/// Origins are clamped with the original size first, then sizes shrink to
/// what is left. A size that alone exceeds the container forces one more
/// pass that re-derives the origin from the size and the size from the
/// re-derived origin; after that pass the rectangle always fits.
pub fn clamp_to_container(rect: GridRect, bounds: ContainerBounds) -> GridRect {
    let max_w = bounds.columns as i64;
    let max_h = bounds.rows as i64;
    let mut w = (rect.w as i64).max(1);
    let mut h = (rect.h as i64).max(1);

    let mut x = (rect.x as i64).clamp(0, (max_w - w).max(0));
    let mut y = (rect.y as i64).clamp(0, (max_h - h).max(0));

    w = w.min(max_w - x);
    h = h.min(max_h - y);

    for _ in 0..2 {
        if x + w <= max_w && y + h <= max_h {
            break;
        }
        if x + w > max_w {
            x = (max_w - w).max(0);
            w = w.min(max_w - x);
        }
        if y + h > max_h {
            y = (max_h - h).max(0);
            h = h.min(max_h - y);
        }
    }

    GridRect {
        x: x as u16,
        y: y as u16,
        w: w.max(1) as u16,
        h: h.max(1) as u16,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bounds() -> ContainerBounds {
        ContainerBounds::new(6, 40)
    }

    #[test]
    fn bottom_overflow_moves_up() {
        assert_eq!(
            bounds().clamp(GridRect::new(4, 39, 2, 2)),
            GridRect::new(4, 38, 2, 2)
        );
    }

    #[test]
    fn right_overflow_moves_left() {
        assert_eq!(
            bounds().clamp(GridRect::new(5, 0, 4, 1)),
            GridRect::new(2, 0, 4, 1)
        );
    }

    #[test]
    fn oversized_width_shrinks_to_container() {
        assert_eq!(
            bounds().clamp(GridRect::new(3, 0, 10, 2)),
            GridRect::new(0, 0, 6, 2)
        );
        assert_eq!(
            bounds().clamp(GridRect::new(9000, 9000, 9000, 9000)),
            GridRect::new(0, 0, 6, 40)
        );
    }

    #[test]
    fn zero_size_is_floored() {
        assert_eq!(
            bounds().clamp(GridRect::new(6, 40, 0, 0)),
            GridRect::new(5, 39, 1, 1)
        );
    }

    #[test]
    fn in_bounds_rect_is_untouched() {
        let r = GridRect::new(0, 4, 3, 2);
        assert_eq!(bounds().clamp(r), r);
        assert!(bounds().contains(&r));
    }

    #[test]
    fn zero_bounds_become_one_cell() {
        let tiny = ContainerBounds::new(0, 0);
        assert_eq!(tiny.columns(), 1);
        assert_eq!(tiny.clamp(GridRect::new(3, 3, 3, 3)), GridRect::new(0, 0, 1, 1));
    }

    #[test]
    fn clamp_raw_sanitizes_first() {
        let raw = RawPosition::new(f64::NAN, 50.7, -2.0, 3.0);
        assert_eq!(bounds().clamp_raw(&raw), GridRect::new(0, 37, 1, 3));
    }
}
