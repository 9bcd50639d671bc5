//! UI layer: display state, map widget, and text rendering.

pub mod display;
pub mod map;
pub mod render;

pub use display::{DisplayController, LoadingPolicy};
pub use map::{MapView, MapWidget, TerminalMap};
