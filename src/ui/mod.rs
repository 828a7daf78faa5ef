//! Terminal UI rendering using ratatui.
//!
//! Everything here reads the [`TileBoard`](crate::surface::TileBoard) the
//! dashboard draws into; no metric is derived at render time.
//!
//! ## Submodules
//!
//! - [`board`]: Grid of tiles for the circuit and thread-pool views
//! - [`common`]: Shared components (header, tabs, status bar, help overlay)
//! - [`theme`]: Light/dark theme support with terminal auto-detection
//!
//! ## Rendering Architecture
//!
//! ```text
//! ┌──────────────────────────────────────┐
//! │ Header (common::render_header)       │
//! ├──────────────────────────────────────┤
//! │ Tabs (common::render_tabs)           │
//! ├──────────────────────────────────────┤
//! │ ┌────────┐ ┌────────┐ ┌────────┐     │
//! │ │ tile   │ │ tile   │ │ tile   │     │
//! │ └────────┘ └────────┘ └────────┘     │
//! │ (board::render)                      │
//! ├──────────────────────────────────────┤
//! │ Status Bar (common::render_status)   │
//! └──────────────────────────────────────┘
//!         ↑
//!    Overlay rendered on top:
//!    - common::render_help
//! ```

pub mod board;
pub mod common;
pub mod theme;

pub use theme::Theme;
