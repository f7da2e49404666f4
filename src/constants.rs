//! Shared crate-wide constants.

use std::time::Duration;

/// Number of grid columns in the bounded container.
pub const GRID_COLUMNS: u16 = 6;

/// Number of grid rows in the bounded container.
///
/// Widgets may never extend past this row; the container does not grow to
/// accommodate them.
pub const CONTAINER_ROWS: u16 = 40;

/// Minimum number of rows the drag library keeps rendered.
pub const GRID_MIN_ROWS: u16 = 1;

/// Height of one grid row, in pixels, as handed to the drag library.
pub const CELL_HEIGHT_PX: u16 = 70;

/// Gap between widgets, in pixels.
pub const GRID_MARGIN_PX: u16 = 8;

/// Key under which layout snapshots are written.
pub const STORAGE_KEY: &str = "grid-storage";

/// Delay between a drag/resize stop and releasing the global dragging gate.
///
/// The library reports its change notification right after the stop event;
/// keeping the gate closed for a short moment stops a queued push from
/// racing the user's drop.
pub const SYNC_DELAY: Duration = Duration::from_millis(50);

/// Delay before the first readiness poll after the library was rebuilt.
pub const HYDRATION_DELAY: Duration = Duration::from_millis(100);

/// Delay between successive readiness polls.
pub const PERSIST_DELAY: Duration = Duration::from_millis(100);

/// Upper bound on readiness polls before the entering push runs anyway.
pub const MAX_READY_POLLS: u8 = 10;

/// Items shown per page by widgets that page through rows.
pub const ITEMS_PER_PAGE: usize = 5;

/// Page every pagination cursor starts on.
pub const DEFAULT_PAGE: u32 = 1;

/// Viewports narrower than this many pixels are treated as mobile.
pub const MOBILE_BREAKPOINT_PX: u32 = 768;

/// Approximate width of one terminal cell, in pixels, used when the host
/// estimates its viewport width.
pub const TERMINAL_CELL_WIDTH_PX: u32 = 8;
