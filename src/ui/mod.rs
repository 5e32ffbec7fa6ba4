//! UI rendering modules
//!
//! All rendering logic for the inspector, separated into focused
//! submodules:
//! - `inspector` - virtualized tree rendering with connectors and columns
//! - `status_bar` - status line display
//! - `theme` - serializable colors resolved to terminal styles

pub mod inspector;
pub mod status_bar;
pub mod theme;

// Re-export main types for convenience
pub use inspector::{InspectorLayout, InspectorRenderer};
pub use status_bar::StatusBar;
pub use theme::{ColorConfig, ColorDef, Theme};
