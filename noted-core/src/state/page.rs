//! # Pages
//!
//! Fixed-width slices of the canvas, each owning the strokes drawn on it and the pattern painted
//! beneath them.

use crate::stroke::Stroke;
use crate::util::Rect;

/// Background drawn beneath a page's ink. The discriminant is the on-disk value.
#[derive(
    strum::AsRefStr,
    strum::FromRepr,
    PartialEq,
    Eq,
    Copy,
    Clone,
    Hash,
    Debug,
    Default,
    serde::Serialize,
    serde::Deserialize,
)]
#[repr(u16)]
pub enum PagePattern {
    #[default]
    Blank = 0,
    /// Horizontal lines.
    Ruled = 1,
    /// Square cells.
    Grided = 2,
}

/// A fixed-width region of the canvas, stacked vertically below the previous page.
#[derive(Clone, Debug)]
pub struct Page {
    strokes: Vec<Stroke>,
    /// Canvas-absolute. `x1 == 0` and `x2 == PAGE_WIDTH` always.
    bounds: Rect,
    pub pattern: PagePattern,
    /// Lines (ruled) or cells (grided) per page height.
    pub density: u16,
}
impl Page {
    #[must_use]
    pub fn new(bounds: Rect, pattern: PagePattern, density: u16) -> Self {
        Self {
            strokes: Vec::new(),
            bounds,
            pattern,
            density,
        }
    }
    #[must_use]
    pub fn bounds(&self) -> Rect {
        self.bounds
    }
    /// Top-left corner in canvas space. Stroke points are relative to this.
    #[must_use]
    pub fn origin(&self) -> (f32, f32) {
        (self.bounds.x1, self.bounds.y1)
    }
    #[must_use]
    pub fn strokes(&self) -> &[Stroke] {
        &self.strokes
    }
    #[must_use]
    pub fn stroke(&self, index: usize) -> Option<&Stroke> {
        self.strokes.get(index)
    }
    pub(crate) fn stroke_mut(&mut self, index: usize) -> Option<&mut Stroke> {
        self.strokes.get_mut(index)
    }
    /// Position of the stroke with this id, if it is still on this page.
    #[must_use]
    pub fn position_of(&self, id: crate::stroke::StrokeID) -> Option<usize> {
        self.strokes.iter().position(|stroke| stroke.id() == id)
    }
    /// Append a stroke on top of all others, returning its index.
    pub fn push_stroke(&mut self, stroke: Stroke) -> usize {
        self.strokes.push(stroke);
        self.strokes.len() - 1
    }
    /// Remove the stroke at `index`, shifting later strokes down to keep their order.
    pub fn remove_stroke(&mut self, index: usize) -> Option<Stroke> {
        (index < self.strokes.len()).then(|| self.strokes.remove(index))
    }
    /// Strokes whose ink could touch `rect`, a canvas-absolute rectangle. Uses the strict
    /// intersection test against each stroke's thickness-expanded bounds.
    pub fn strokes_in(&self, rect: Rect) -> impl Iterator<Item = (usize, &Stroke)> + '_ {
        let (ox, oy) = self.origin();
        let local = rect.translated(-ox, -oy);
        self.strokes
            .iter()
            .enumerate()
            .filter(move |(_, stroke)| stroke.ink_bounds().intersects(&local))
    }
}

#[cfg(test)]
mod test {
    use super::{Page, PagePattern};
    use crate::stroke::{Stroke, StrokeID, StrokeStyle};
    use crate::util::Rect;

    #[test]
    fn pattern_repr() {
        assert_eq!(PagePattern::from_repr(0), Some(PagePattern::Blank));
        assert_eq!(PagePattern::from_repr(2), Some(PagePattern::Grided));
        assert_eq!(PagePattern::from_repr(3), None);
        assert_eq!(PagePattern::Ruled as u16, 1);
        assert_eq!(PagePattern::Ruled.as_ref(), "Ruled");
    }
    #[test]
    fn removal_keeps_order() {
        let mut page = Page::new(Rect::new(0.0, 0.0, 1.0, 1.0), PagePattern::Blank, 0);
        for i in 0..4 {
            let stroke = Stroke::new(StrokeID(i), 0, 0.1 * i as f32, 0.5, StrokeStyle::default());
            page.push_stroke(stroke);
        }
        let removed = page.remove_stroke(1).unwrap();
        assert_eq!(removed.id(), StrokeID(1));
        let ids: Vec<_> = page.strokes().iter().map(Stroke::id).collect();
        assert_eq!(ids, [StrokeID(0), StrokeID(2), StrokeID(3)]);
        assert!(page.remove_stroke(3).is_none());
        assert_eq!(page.position_of(StrokeID(3)), Some(2));
    }
    #[test]
    fn query_is_page_relative() {
        // Second page, 2.0 units down.
        let mut page = Page::new(Rect::new(0.0, 2.0, 1.0, 3.0), PagePattern::Blank, 0);
        let style = StrokeStyle {
            thickness: 0.01,
            ..Default::default()
        };
        let mut stroke = Stroke::new(StrokeID(0), 1, 0.2, 0.2, style);
        stroke.push(0.3, 0.3);
        page.push_stroke(stroke);

        let hit = Rect::new(0.25, 2.25, 0.26, 2.26);
        assert_eq!(page.strokes_in(hit).count(), 1);
        // Same rect, but in page-relative coordinates, misses.
        let miss = Rect::new(0.25, 0.25, 0.26, 0.26);
        assert_eq!(page.strokes_in(miss).count(), 0);
    }
}
