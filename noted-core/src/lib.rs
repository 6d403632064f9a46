//! # Noted core
//!
//! Stroke-based handwriting engine: paginated vector ink, smoothed rendering, raster-tested erasing,
//! and a compact binary file format. The host owns the window and the pixels, and drives a
//! [`Canvas`] with pointer events and draw calls.

pub mod color;
pub mod curve;
pub mod eraser;
pub mod input;
pub mod io;
pub mod render;
pub mod settings;
pub mod state;
pub mod stroke;
pub mod util;

pub use input::{Tool, ToolState};
pub use render::DrawTarget;
pub use state::{Canvas, PagePattern};
pub use stroke::StrokeStyle;
