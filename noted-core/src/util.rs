//! Utility types, used throughout the crate.
//! Geometry in canvas units: x spans `[0, 1]` across the page width, y grows downward.

/// Axis-aligned rectangle, stored as two corners.
///
/// Not normalized on construction - callers build these from points via [`Rect::from_point`] and
/// [`Rect::expand_by_point`], which keep `x1 <= x2` and `y1 <= y2`.
#[derive(Copy, Clone, PartialEq, Debug, Default, bytemuck::Pod, bytemuck::Zeroable)]
#[repr(C)]
pub struct Rect {
    pub x1: f32,
    pub y1: f32,
    pub x2: f32,
    pub y2: f32,
}
impl Rect {
    #[must_use]
    pub const fn new(x1: f32, y1: f32, x2: f32, y2: f32) -> Self {
        Self { x1, y1, x2, y2 }
    }
    /// A zero-area rect sitting on a single point.
    #[must_use]
    pub const fn from_point(x: f32, y: f32) -> Self {
        Self::new(x, y, x, y)
    }
    #[must_use]
    pub fn width(&self) -> f32 {
        self.x2 - self.x1
    }
    #[must_use]
    pub fn height(&self) -> f32 {
        self.y2 - self.y1
    }
    /// Grow to include the given point.
    pub fn expand_by_point(&mut self, x: f32, y: f32) {
        if x > self.x2 {
            self.x2 = x;
        }
        if x < self.x1 {
            self.x1 = x;
        }
        if y > self.y2 {
            self.y2 = y;
        }
        if y < self.y1 {
            self.y1 = y;
        }
    }
    /// Outset every edge by `amount`.
    #[must_use = "returns a new rect and does not modify `self`"]
    pub fn expanded(self, amount: f32) -> Self {
        Self {
            x1: self.x1 - amount,
            y1: self.y1 - amount,
            x2: self.x2 + amount,
            y2: self.y2 + amount,
        }
    }
    #[must_use = "returns a new rect and does not modify `self`"]
    pub fn translated(self, dx: f32, dy: f32) -> Self {
        Self {
            x1: self.x1 + dx,
            y1: self.y1 + dy,
            x2: self.x2 + dx,
            y2: self.y2 + dy,
        }
    }
    /// Strict overlap test. Rects that only share an edge do *not* intersect.
    #[must_use]
    pub fn intersects(&self, other: &Self) -> bool {
        self.x1 < other.x2 && self.x2 > other.x1 && self.y1 < other.y2 && self.y2 > other.y1
    }
    /// Strict containment. Points on the border are outside.
    #[must_use]
    pub fn contains_point(&self, x: f32, y: f32) -> bool {
        x > self.x1 && x < self.x2 && y > self.y1 && y < self.y2
    }
    /// Snap outward to whole units.
    #[must_use = "returns a new rect and does not modify `self`"]
    pub fn round_out(self) -> Self {
        Self {
            x1: self.x1.floor(),
            y1: self.y1.floor(),
            x2: self.x2.ceil(),
            y2: self.y2.ceil(),
        }
    }
    #[must_use]
    pub fn as_array(&self) -> [f32; 4] {
        bytemuck::cast(*self)
    }
}
impl From<[f32; 4]> for Rect {
    fn from(value: [f32; 4]) -> Self {
        bytemuck::cast(value)
    }
}

/// Squared euclidean distance between two points.
#[must_use]
pub fn sq_dist(x1: f32, y1: f32, x2: f32, y2: f32) -> f32 {
    (x2 - x1) * (x2 - x1) + (y2 - y1) * (y2 - y1)
}
