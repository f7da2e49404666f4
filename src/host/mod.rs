//! Terminal front-end: a drag library that lives in terminal cells, the
//! app that owns a dashboard over it, and its drawing code.

pub mod app;
pub mod render;
pub mod terminal_grid;

pub use app::DashboardApp;
pub use terminal_grid::TerminalGrid;
