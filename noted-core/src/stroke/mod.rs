//! # Strokes
//!
//! One continuous pen gesture: a point sequence in page-relative canvas units, plus the style it
//! was drawn with. Pressure is only consulted when the style is chosen, it is not stored per point.

pub mod reduce;

use crate::color::Color;
use crate::util::{sq_dist, Rect};

/// Points are reserved in chunks of this many on creation. Growth after that is the usual doubling.
const INITIAL_CAPACITY: usize = 16;

/// Identifies a stroke within its canvas. Never reused by that canvas, never persisted.
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
pub struct StrokeID(pub u64);
impl std::fmt::Display for StrokeID {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Stroke#{}", self.0)
    }
}

#[derive(Copy, Clone, PartialEq, Debug, serde::Serialize, serde::Deserialize)]
pub struct StrokeStyle {
    pub color: Color,
    /// Line width, in canvas units.
    pub thickness: f32,
}
impl Default for StrokeStyle {
    fn default() -> Self {
        Self {
            color: Color::BLACK,
            thickness: crate::settings::defaults::STROKE_THICKNESS,
        }
    }
}

#[derive(Clone, Debug)]
pub struct Stroke {
    id: StrokeID,
    /// Index of the owning page. Pages are never removed, so this stays valid.
    page: usize,
    /// Invariant: `xs.len() == ys.len() && !xs.is_empty()`
    xs: Vec<f32>,
    ys: Vec<f32>,
    /// Invariant: the tight bound of every point.
    bounds: Rect,
    style: StrokeStyle,
    /// Largest squared distance between two consecutive points. Zero for single-point strokes.
    max_dist_sq: f32,
}
impl Stroke {
    /// Start a stroke at the given page-relative point.
    #[must_use]
    pub fn new(id: StrokeID, page: usize, x: f32, y: f32, style: StrokeStyle) -> Self {
        let mut xs = Vec::with_capacity(INITIAL_CAPACITY);
        let mut ys = Vec::with_capacity(INITIAL_CAPACITY);
        xs.push(x);
        ys.push(y);
        Self {
            id,
            page,
            xs,
            ys,
            bounds: Rect::from_point(x, y),
            style,
            max_dist_sq: 0.0,
        }
    }
    /// Build a stroke from parallel coordinate lists, deriving bounds and segment lengths.
    /// `None` if the lists are empty or of differing length.
    #[must_use]
    pub fn from_points(
        id: StrokeID,
        page: usize,
        xs: Vec<f32>,
        ys: Vec<f32>,
        style: StrokeStyle,
    ) -> Option<Self> {
        if xs.is_empty() || xs.len() != ys.len() {
            return None;
        }
        let mut stroke = Self {
            id,
            page,
            bounds: Rect::from_point(xs[0], ys[0]),
            xs,
            ys,
            style,
            max_dist_sq: 0.0,
        };
        stroke.recompute_derived();
        Some(stroke)
    }
    /// Append a page-relative point, maintaining bounds and `max_dist_sq`.
    pub fn push(&mut self, x: f32, y: f32) {
        if let Some((px, py)) = self.last() {
            let dsq = sq_dist(px, py, x, y);
            if dsq > self.max_dist_sq {
                self.max_dist_sq = dsq;
            }
        }
        self.xs.push(x);
        self.ys.push(y);
        self.bounds.expand_by_point(x, y);
    }
    #[must_use]
    pub fn id(&self) -> StrokeID {
        self.id
    }
    #[must_use]
    pub fn page(&self) -> usize {
        self.page
    }
    #[must_use]
    pub fn style(&self) -> &StrokeStyle {
        &self.style
    }
    /// Tight bound of all points, page-relative.
    #[must_use]
    pub fn bounds(&self) -> Rect {
        self.bounds
    }
    #[must_use]
    pub fn max_dist_sq(&self) -> f32 {
        self.max_dist_sq
    }
    #[must_use]
    pub fn xs(&self) -> &[f32] {
        &self.xs
    }
    #[must_use]
    pub fn ys(&self) -> &[f32] {
        &self.ys
    }
    /// Number of points. Never zero.
    #[must_use]
    pub fn len(&self) -> usize {
        self.xs.len()
    }
    /// Always false, strokes are created with their first point. Here for clippy's sake.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.xs.is_empty()
    }
    #[must_use]
    pub fn last(&self) -> Option<(f32, f32)> {
        Some((*self.xs.last()?, *self.ys.last()?))
    }
    pub fn points(&self) -> impl ExactSizeIterator<Item = (f32, f32)> + '_ {
        self.xs.iter().copied().zip(self.ys.iter().copied())
    }
    /// Bounds grown by the line thickness, so that they cover the painted ink and not just the path.
    #[must_use]
    pub fn ink_bounds(&self) -> Rect {
        self.bounds.expanded(self.style.thickness)
    }
    /// Simplify the point sequence in place. See [`reduce::reduce`].
    /// Returns the number of points removed.
    pub fn reduce(&mut self, epsilon: f32) -> usize {
        let before = self.len();
        reduce::reduce(&mut self.xs, &mut self.ys, epsilon);
        debug_assert!(!self.xs.is_empty());
        self.recompute_derived();
        before - self.len()
    }
    fn recompute_derived(&mut self) {
        self.bounds = Rect::from_point(self.xs[0], self.ys[0]);
        self.max_dist_sq = 0.0;
        for i in 1..self.xs.len() {
            self.bounds.expand_by_point(self.xs[i], self.ys[i]);
            let dsq = sq_dist(self.xs[i - 1], self.ys[i - 1], self.xs[i], self.ys[i]);
            if dsq > self.max_dist_sq {
                self.max_dist_sq = dsq;
            }
        }
    }
}
