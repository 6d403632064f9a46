//! # State
//!
//! The canvas tree. The [`Canvas`] exclusively owns its [`Page`]s, and each page exclusively owns its
//! [`crate::stroke::Stroke`]s. Anything that refers across the tree does so by index.

pub mod canvas;
pub mod page;

pub use canvas::{Canvas, InvalidateCallback};
pub use page::{Page, PagePattern};
