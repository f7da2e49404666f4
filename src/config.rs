//! Dashboard configuration.
//!
//! Every field defaults to the value in [`crate::constants`]; the binary
//! overrides a handful from the command line.

use std::time::Duration;

use crate::constants::{
    CELL_HEIGHT_PX, CONTAINER_ROWS, GRID_COLUMNS, GRID_MARGIN_PX, GRID_MIN_ROWS, HYDRATION_DELAY,
    ITEMS_PER_PAGE, MAX_READY_POLLS, MOBILE_BREAKPOINT_PX, PERSIST_DELAY, STORAGE_KEY, SYNC_DELAY,
};
use crate::constraint::ContainerBounds;
use crate::library::GridOptions;
use crate::session::EditMode;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DashboardConfig {
    pub columns: u16,
    pub rows: u16,
    pub cell_height: u16,
    pub margin: u16,
    pub min_rows: u16,
    pub storage_key: String,
    pub sync_delay: Duration,
    pub hydration_delay: Duration,
    pub persist_delay: Duration,
    pub max_ready_polls: u8,
    pub items_per_page: usize,
    pub mobile_breakpoint_px: u32,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            columns: GRID_COLUMNS,
            rows: CONTAINER_ROWS,
            cell_height: CELL_HEIGHT_PX,
            margin: GRID_MARGIN_PX,
            min_rows: GRID_MIN_ROWS,
            storage_key: STORAGE_KEY.to_string(),
            sync_delay: SYNC_DELAY,
            hydration_delay: HYDRATION_DELAY,
            persist_delay: PERSIST_DELAY,
            max_ready_polls: MAX_READY_POLLS,
            items_per_page: ITEMS_PER_PAGE,
            mobile_breakpoint_px: MOBILE_BREAKPOINT_PX,
        }
    }
}

impl DashboardConfig {
    pub fn bounds(&self) -> ContainerBounds {
        ContainerBounds::new(self.columns, self.rows)
    }

    /// Library options for `mode`. View mode renders a static grid; edit
    /// mode enables drag and resize. Placement floats in both.
    pub fn grid_options(&self, mode: EditMode) -> GridOptions {
        let bounds = self.bounds();
        let editing = mode == EditMode::Edit;
        GridOptions {
            cell_height: self.cell_height,
            columns: bounds.columns(),
            margin: self.margin,
            min_rows: self.min_rows.min(bounds.rows()),
            max_rows: bounds.rows(),
            static_mode: !editing,
            float_placement: true,
            disable_drag: !editing,
            disable_resize: !editing,
        }
    }

    pub fn is_mobile(&self, width_px: u32) -> bool {
        width_px < self.mobile_breakpoint_px
    }

    /// Number of pages needed for `rows` rows.
    pub fn page_count(&self, rows: usize) -> u32 {
        let per_page = self.items_per_page.max(1);
        rows.div_ceil(per_page).max(1) as u32
    }
}

/// Viewports narrower than the default breakpoint count as mobile.
pub fn is_mobile(width_px: u32) -> bool {
    width_px < MOBILE_BREAKPOINT_PX
}
