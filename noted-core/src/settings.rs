//! # Settings
//!
//! Tunables for rendering, hit testing and stroke simplification. Every canvas owns a copy, so
//! two canvases in one process may be configured independently.

/// Canvas units are fractions of the page width. These are the defaults used by [`Settings`].
pub mod defaults {
    /// Width of a page in canvas units. Everything else is relative to this.
    pub const PAGE_WIDTH: f32 = 1.0;
    /// US Letter, portrait.
    pub const PAGE_HEIGHT: f32 = 11.0 / 8.5;
    /// Vertical space between consecutive pages.
    pub const PAGE_GAP: f32 = 0.02;
    /// Lines (ruled) or cells (grided) per page height for the very first page.
    pub const PAGE_DENSITY: u16 = 40;
    /// 0.8px on a 500px wide page.
    pub const STROKE_THICKNESS: f32 = 0.8 / 500.0;
    /// 3px on a 500px wide page.
    pub const ERASER_THICKNESS: f32 = 3.0 / 500.0;
    /// Pixels spanned by the thinner of the eraser and the thinnest nearby stroke within the hit
    /// test surface.
    pub const ERASER_HIT_PIXELS: f32 = 2.0;
    /// Strokes whose longest segment is at most this long on screen are drawn as polylines.
    pub const MIN_BEZIER_DISTANCE_PX: f32 = 4.5;
    /// Detail reduction epsilon, per unit of stroke thickness.
    pub const REDUCE_EPSILON_PER_THICKNESS: f32 = 2.0;
}

#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Thickness of the eraser, in canvas units.
    pub eraser_thickness: f32,
    /// Resolution of the eraser hit surface, as pixels across the thinnest shape being tested.
    pub eraser_hit_pixels: f32,
    /// Device-space segment length above which strokes are fitted with beziers.
    pub min_bezier_distance_px: f32,
    /// Run detail reduction over every finished pen stroke. Off by default.
    pub reduce_strokes: bool,
    /// Detail reduction epsilon is `thickness * reduce_epsilon_per_thickness`.
    pub reduce_epsilon_per_thickness: f32,
}
impl Default for Settings {
    fn default() -> Self {
        Self {
            eraser_thickness: defaults::ERASER_THICKNESS,
            eraser_hit_pixels: defaults::ERASER_HIT_PIXELS,
            min_bezier_distance_px: defaults::MIN_BEZIER_DISTANCE_PX,
            reduce_strokes: false,
            reduce_epsilon_per_thickness: defaults::REDUCE_EPSILON_PER_THICKNESS,
        }
    }
}
impl Settings {
    /// Epsilon for [`crate::stroke::reduce`] on a stroke of the given thickness.
    #[must_use]
    pub fn reduce_epsilon(&self, thickness: f32) -> f32 {
        thickness * self.reduce_epsilon_per_thickness
    }
}
