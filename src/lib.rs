//! A bounded grid layout engine for drag-and-drop dashboards.
//!
//! The engine keeps a widget collection as the source of truth, clamps every
//! rectangle into a fixed container, persists the layout, and keeps an
//! external drag library in sync with it. [`host`] ships a terminal front-end
//! that implements the library seams with `ratatui`.

pub mod actions;
pub mod auth;
pub mod config;
pub mod constants;
pub mod constraint;
pub mod dashboard;
pub mod drivers;
pub mod error;
pub mod event_loop;
pub mod geometry;
pub mod host;
pub mod keybindings;
pub mod layout;
pub mod library;
pub mod log_buffer;
pub mod runner;
pub mod scheduler;
pub mod seed;
pub mod session;
pub mod snapshot;
pub mod state;
pub mod storage;
pub mod store;
pub mod sync;
pub mod tracing_sub;
pub mod ui;
pub mod widget;
