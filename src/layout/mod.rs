//! Mapping between grid cells and terminal cells for the terminal host.

pub mod floating;

use ratatui::prelude::Rect;
use std::collections::BTreeMap;

use crate::geometry::GridRect;

/// Terminal rows used by one grid row.
pub const ROW_HEIGHT: u16 = 2;

/// A rectangle in grid units that may lie partly outside the container,
/// produced while a gesture is in flight.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SignedRect {
    pub x: i32,
    pub y: i32,
    pub w: i32,
    pub h: i32,
}

impl SignedRect {
    pub fn from_grid(rect: GridRect) -> Self {
        Self {
            x: rect.x as i32,
            y: rect.y as i32,
            w: rect.w as i32,
            h: rect.h as i32,
        }
    }
}

/// Screen placement of the grid: which terminal area shows it, how wide a
/// column is and how far it is scrolled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GridViewport {
    pub area: Rect,
    pub columns: u16,
    pub row_height: u16,
    pub scroll_row: u16,
}

impl Default for GridViewport {
    fn default() -> Self {
        Self {
            area: Rect::default(),
            columns: crate::constants::GRID_COLUMNS,
            row_height: ROW_HEIGHT,
            scroll_row: 0,
        }
    }
}

impl GridViewport {
    pub fn column_width(&self) -> u16 {
        (self.area.width / self.columns.max(1)).max(1)
    }

    pub fn visible_rows(&self) -> u16 {
        self.area.height / self.row_height.max(1)
    }

    /// Screen rectangle of a grid rectangle, clipped to the viewport.
    /// `None` when nothing of it is on screen.
    pub fn to_screen(&self, rect: GridRect) -> Option<Rect> {
        let col_w = self.column_width() as i32;
        let row_h = self.row_height.max(1) as i32;
        let x = self.area.x as i32 + rect.x as i32 * col_w;
        let y = self.area.y as i32 + (rect.y as i32 - self.scroll_row as i32) * row_h;
        let w = rect.w as i32 * col_w;
        let h = rect.h as i32 * row_h;

        let left = x.max(self.area.x as i32);
        let top = y.max(self.area.y as i32);
        let right = (x + w).min(self.area.x as i32 + self.area.width as i32);
        let bottom = (y + h).min(self.area.y as i32 + self.area.height as i32);
        if right <= left || bottom <= top {
            return None;
        }
        Some(Rect {
            x: left as u16,
            y: top as u16,
            width: (right - left) as u16,
            height: (bottom - top) as u16,
        })
    }

    /// Unclipped screen origin of a grid rectangle; used to decide whether
    /// its header row is on screen.
    pub fn header_row(&self, rect: GridRect) -> i32 {
        self.area.y as i32 + (rect.y as i32 - self.scroll_row as i32) * self.row_height.max(1) as i32
    }

    /// Convert a terminal-cell delta into whole grid cells, rounding to the
    /// nearest cell.
    pub fn cells_from_delta(&self, d_columns: i32, d_rows: i32) -> (i32, i32) {
        (
            round_div(d_columns, self.column_width() as i32),
            round_div(d_rows, self.row_height.max(1) as i32),
        )
    }

    pub fn scroll_by(&mut self, delta: i32, container_rows: u16) {
        let max = container_rows.saturating_sub(self.visible_rows()) as i32;
        self.scroll_row = (self.scroll_row as i32 + delta).clamp(0, max.max(0)) as u16;
    }
}

fn round_div(value: i32, divisor: i32) -> i32 {
    let divisor = divisor.max(1);
    let half = divisor / 2;
    if value >= 0 {
        (value + half) / divisor
    } else {
        -((-value + half) / divisor)
    }
}

#[derive(Debug, Clone)]
pub struct RegionMap<T: Clone + Ord> {
    regions: BTreeMap<T, Rect>,
}

impl<T: Clone + Ord> Default for RegionMap<T> {
    fn default() -> Self {
        Self {
            regions: BTreeMap::new(),
        }
    }
}

impl<T: Clone + Ord> RegionMap<T> {
    pub fn ids(&self) -> Vec<T> {
        self.regions.keys().cloned().collect()
    }

    pub fn set(&mut self, id: T, rect: Rect) {
        self.regions.insert(id, rect);
    }

    pub fn get(&self, id: &T) -> Option<Rect> {
        self.regions.get(id).copied()
    }

    pub fn clear(&mut self) {
        self.regions.clear();
    }

    /// First id in `order` whose region contains the cell. Later entries
    /// are drawn on top, so callers pass the draw order reversed.
    pub fn hit_test<'a>(
        &self,
        column: u16,
        row: u16,
        order: impl IntoIterator<Item = &'a T>,
    ) -> Option<T>
    where
        T: 'a,
    {
        order.into_iter().find_map(|id| {
            self.regions
                .get(id)
                .filter(|rect| rect_contains(**rect, column, row))
                .map(|_| id.clone())
        })
    }
}

pub fn rect_contains(rect: Rect, column: u16, row: u16) -> bool {
    if rect.width == 0 || rect.height == 0 {
        return false;
    }
    let max_x = rect.x.saturating_add(rect.width);
    let max_y = rect.y.saturating_add(rect.height);
    column >= rect.x && column < max_x && row >= rect.y && row < max_y
}

#[cfg(test)]
mod tests {
    use super::*;

    fn viewport() -> GridViewport {
        GridViewport {
            area: Rect {
                x: 0,
                y: 1,
                width: 60,
                height: 20,
            },
            ..GridViewport::default()
        }
    }

    #[test]
    fn grid_rect_maps_to_screen() {
        let vp = viewport();
        assert_eq!(vp.column_width(), 10);
        assert_eq!(
            vp.to_screen(GridRect::new(1, 2, 2, 3)),
            Some(Rect {
                x: 10,
                y: 5,
                width: 20,
                height: 6
            })
        );
    }

    #[test]
    fn scrolled_out_rects_are_clipped() {
        let mut vp = viewport();
        vp.scroll_by(5, 40);
        assert_eq!(vp.scroll_row, 5);
        assert_eq!(vp.to_screen(GridRect::new(0, 0, 6, 4)), None);
        let partial = vp.to_screen(GridRect::new(0, 4, 6, 2)).unwrap();
        assert_eq!((partial.y, partial.height), (1, 2));
        vp.scroll_by(100, 40);
        assert_eq!(vp.scroll_row, 30);
    }

    #[test]
    fn deltas_round_to_nearest_cell() {
        let vp = viewport();
        assert_eq!(vp.cells_from_delta(14, 1), (1, 1));
        assert_eq!(vp.cells_from_delta(-16, -3), (-2, -2));
        assert_eq!(vp.cells_from_delta(4, 0), (0, 0));
    }

    #[test]
    fn hit_test_respects_order() {
        let mut regions = RegionMap::default();
        let r = Rect {
            x: 0,
            y: 0,
            width: 5,
            height: 5,
        };
        regions.set("a", r);
        regions.set("b", r);
        assert_eq!(regions.hit_test(1, 1, &["b", "a"]), Some("b"));
        assert_eq!(regions.hit_test(9, 9, &["b", "a"]), None);
        assert!(!rect_contains(Rect::default(), 0, 0));
    }
}
