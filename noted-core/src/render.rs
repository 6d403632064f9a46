//! # Rendering
//!
//! Paints pages and their ink into a host-owned pixel buffer through `tiny-skia`.

use crate::color::Color;
use crate::curve::{render_mode, trace_stroke, RenderMode};
use crate::state::{Canvas, Page, PagePattern};
use crate::stroke::Stroke;
use crate::util::Rect;

/// Paper behind every page.
const PAPER: Color = Color::WHITE;
/// Ruling and grid lines.
const PATTERN_LINE: Color = Color::rgba(0xB4, 0xC6, 0xDA, 0xFF);

/// A destination for [`Canvas::draw`].
///
/// Device space is `canvas * scale + offset`.
pub struct DrawTarget<'a> {
    pixmap: tiny_skia::PixmapMut<'a>,
    /// Device pixels per canvas unit. With canvas width fixed at `1.0`, this is the on-screen page width.
    scale: f32,
    /// Device position of the canvas origin. Scrolling moves this up.
    offset: (f32, f32),
    /// Region to repaint, canvas units. `None` repaints everything within the pixmap.
    clip: Option<Rect>,
}
impl<'a> DrawTarget<'a> {
    #[must_use]
    pub fn new(pixmap: tiny_skia::PixmapMut<'a>, scale: f32) -> Self {
        Self {
            pixmap,
            scale,
            offset: (0.0, 0.0),
            clip: None,
        }
    }
    #[must_use]
    pub fn with_offset(self, x: f32, y: f32) -> Self {
        Self {
            offset: (x, y),
            ..self
        }
    }
    #[must_use]
    pub fn with_clip(self, clip: Rect) -> Self {
        Self {
            clip: Some(clip),
            ..self
        }
    }
    #[must_use]
    pub fn scale(&self) -> f32 {
        self.scale
    }
    /// Canvas to device.
    #[must_use]
    pub fn transform(&self) -> tiny_skia::Transform {
        tiny_skia::Transform::from_row(
            self.scale,
            0.0,
            0.0,
            self.scale,
            self.offset.0,
            self.offset.1,
        )
    }
    /// The canvas-space area this target can show, narrowed by the clip if any.
    #[must_use]
    pub fn visible_rect(&self) -> Rect {
        let (ox, oy) = self.offset;
        #[allow(clippy::cast_precision_loss)]
        let (w, h) = (self.pixmap.width() as f32, self.pixmap.height() as f32);
        let whole = Rect::new(
            -ox / self.scale,
            -oy / self.scale,
            (w - ox) / self.scale,
            (h - oy) / self.scale,
        );
        match self.clip {
            Some(clip) => Rect::new(
                whole.x1.max(clip.x1),
                whole.y1.max(clip.y1),
                whole.x2.min(clip.x2),
                whole.y2.min(clip.y2),
            ),
            None => whole,
        }
    }
    /// Device-space coverage mask for the clip, if there is one.
    fn clip_mask(&self) -> Option<tiny_skia::Mask> {
        let clip = self.clip?;
        let mut mask = tiny_skia::Mask::new(self.pixmap.width(), self.pixmap.height())?;
        let rect = tiny_skia::Rect::from_ltrb(clip.x1, clip.y1, clip.x2, clip.y2)?;
        let path = tiny_skia::PathBuilder::from_rect(rect);
        mask.fill_path(
            &path,
            tiny_skia::FillRule::Winding,
            false,
            self.transform(),
        );
        Some(mask)
    }
}

/// Stroke outline style for ink of the given width, in whatever units the transform maps from.
pub(crate) fn ink_outline(width: f32) -> tiny_skia::Stroke {
    tiny_skia::Stroke {
        width,
        line_cap: tiny_skia::LineCap::Round,
        line_join: tiny_skia::LineJoin::Round,
        ..Default::default()
    }
}

/// Build a stroke's path, page-relative.
pub(crate) fn stroke_path(stroke: &Stroke, mode: RenderMode) -> Option<tiny_skia::Path> {
    let mut builder = tiny_skia::PathBuilder::with_capacity(stroke.len() + 1, stroke.len() * 3 + 2);
    trace_stroke(&mut builder, stroke, mode);
    builder.finish()
}

/// Paint a stroke as `width` wide ink. `transform` maps page-relative coordinates to device space.
///
/// Single-sample strokes are filled as a disc, the stroker may drop zero-length segments.
pub(crate) fn paint_stroke(
    pixmap: &mut tiny_skia::PixmapMut<'_>,
    stroke: &Stroke,
    mode: RenderMode,
    width: f32,
    paint: &tiny_skia::Paint<'_>,
    transform: tiny_skia::Transform,
    mask: Option<&tiny_skia::Mask>,
) {
    if stroke.len() == 1 {
        let Some((x, y)) = stroke.last() else {
            return;
        };
        if let Some(disc) = tiny_skia::PathBuilder::from_circle(x, y, width / 2.0) {
            pixmap.fill_path(&disc, paint, tiny_skia::FillRule::Winding, transform, mask);
        }
        return;
    }
    let Some(path) = stroke_path(stroke, mode) else {
        return;
    };
    pixmap.stroke_path(&path, paint, &ink_outline(width), transform, mask);
}

fn solid_paint(color: Color, anti_alias: bool) -> tiny_skia::Paint<'static> {
    let mut paint = tiny_skia::Paint::default();
    paint.set_color_rgba8(color.r, color.g, color.b, color.a);
    paint.anti_alias = anti_alias;
    paint
}

impl Canvas {
    /// Repaint everything within the target's clip: paper, background pattern, then ink in the order
    /// it was laid down. Pages and strokes not strictly intersecting the clip are skipped.
    pub fn draw(&self, target: &mut DrawTarget<'_>) {
        let region = target.visible_rect();
        if region.width() <= 0.0 || region.height() <= 0.0 {
            return;
        }
        let mask = target.clip_mask();
        let base = target.transform();
        let threshold = self.settings.min_bezier_distance_px;
        let mut drawn = 0usize;

        for (_, page) in self.pages_in(region) {
            draw_page_background(target, page, base, mask.as_ref());

            let (ox, oy) = page.origin();
            let page_transform = base.pre_translate(ox, oy);
            for (_, stroke) in page.strokes_in(region) {
                let style = stroke.style();
                let paint = solid_paint(style.color, true);
                let mode = render_mode(stroke, target.scale, threshold);
                paint_stroke(
                    &mut target.pixmap,
                    stroke,
                    mode,
                    style.thickness,
                    &paint,
                    page_transform,
                    mask.as_ref(),
                );
                drawn += 1;
            }
        }
        log::trace!("drew {drawn} strokes within {region:?}");
    }
}

/// Paper and ruling for one page.
fn draw_page_background(
    target: &mut DrawTarget<'_>,
    page: &Page,
    transform: tiny_skia::Transform,
    mask: Option<&tiny_skia::Mask>,
) {
    let bounds = page.bounds();
    if let Some(rect) = tiny_skia::Rect::from_ltrb(bounds.x1, bounds.y1, bounds.x2, bounds.y2) {
        target
            .pixmap
            .fill_rect(rect, &solid_paint(PAPER, false), transform, mask);
    }

    let Some(path) = pattern_path(page) else {
        return;
    };
    // One device pixel, regardless of zoom.
    let outline = tiny_skia::Stroke {
        width: 1.0 / target.scale,
        ..Default::default()
    };
    target.pixmap.stroke_path(
        &path,
        &solid_paint(PATTERN_LINE, false),
        &outline,
        transform,
        mask,
    );
}

/// Lines making up a page's background, canvas-absolute. `None` for blank pages.
fn pattern_path(page: &Page) -> Option<tiny_skia::Path> {
    if page.density == 0 {
        return None;
    }
    let bounds = page.bounds();
    let density = f32::from(page.density);
    let mut builder = tiny_skia::PathBuilder::new();
    match page.pattern {
        PagePattern::Blank => return None,
        PagePattern::Ruled => {
            // `density` lines, evenly spaced, none on the page edges.
            let spacing = bounds.height() / (density + 1.0);
            for i in 1..=page.density {
                let y = bounds.y1 + spacing * f32::from(i);
                builder.move_to(bounds.x1, y);
                builder.line_to(bounds.x2, y);
            }
        }
        PagePattern::Grided => {
            let cell = bounds.height() / density;
            for i in 1..page.density {
                let y = bounds.y1 + cell * f32::from(i);
                builder.move_to(bounds.x1, y);
                builder.line_to(bounds.x2, y);
            }
            let mut x = bounds.x1 + cell;
            while x < bounds.x2 {
                builder.move_to(x, bounds.y1);
                builder.line_to(x, bounds.y2);
                x += cell;
            }
        }
    }
    builder.finish()
}

#[cfg(test)]
mod test {
    use super::{pattern_path, DrawTarget};
    use crate::state::{Canvas, Page, PagePattern};
    use crate::stroke::{Stroke, StrokeStyle};
    use crate::util::Rect;

    /// A canvas with one thick horizontal stroke across the middle of the first page.
    fn canvas_with_line() -> Canvas {
        let mut canvas = Canvas::new();
        canvas.set_page_pattern(0, PagePattern::Blank, 0);
        let style = StrokeStyle {
            thickness: 0.02,
            ..Default::default()
        };
        let id = canvas.next_stroke_id();
        let mut stroke = Stroke::new(id, 0, 0.1, 0.5, style);
        stroke.push(0.9, 0.5);
        canvas.append_stroke_to_page(0, stroke);
        canvas
    }

    #[test]
    fn ink_lands_on_pixels() {
        let canvas = canvas_with_line();
        let mut pixmap = tiny_skia::Pixmap::new(100, 130).unwrap();
        canvas.draw(&mut DrawTarget::new(pixmap.as_mut(), 100.0));

        let ink = pixmap.pixel(50, 50).unwrap();
        assert_eq!((ink.red(), ink.green(), ink.blue()), (0, 0, 0));
        let paper = pixmap.pixel(50, 20).unwrap();
        assert_eq!((paper.red(), paper.alpha()), (255, 255));
    }
    #[test]
    fn clip_is_respected() {
        let canvas = canvas_with_line();
        let mut pixmap = tiny_skia::Pixmap::new(100, 130).unwrap();
        // Left half only.
        let mut target =
            DrawTarget::new(pixmap.as_mut(), 100.0).with_clip(Rect::new(0.0, 0.0, 0.5, 1.0));
        canvas.draw(&mut target);

        assert_eq!(pixmap.pixel(25, 50).unwrap().alpha(), 255);
        // Untouched outside the clip, neither paper nor ink.
        assert_eq!(pixmap.pixel(75, 50).unwrap().alpha(), 0);
        assert_eq!(pixmap.pixel(75, 20).unwrap().alpha(), 0);
    }
    #[test]
    fn offset_scrolls() {
        let canvas = canvas_with_line();
        let mut pixmap = tiny_skia::Pixmap::new(100, 100).unwrap();
        // Scroll down by 30 pixels.
        let mut target = DrawTarget::new(pixmap.as_mut(), 100.0).with_offset(0.0, -30.0);
        assert_eq!(target.visible_rect(), Rect::new(0.0, 0.3, 1.0, 1.3));
        canvas.draw(&mut target);
        assert_eq!(pixmap.pixel(50, 20).unwrap().red(), 0);
    }
    #[test]
    fn patterns() {
        let bounds = Rect::new(0.0, 0.0, 1.0, 2.0);
        assert!(pattern_path(&Page::new(bounds, PagePattern::Blank, 10)).is_none());
        assert!(pattern_path(&Page::new(bounds, PagePattern::Grided, 0)).is_none());

        let ruled = pattern_path(&Page::new(bounds, PagePattern::Ruled, 4)).unwrap();
        // Four lines of two points each.
        assert_eq!(ruled.len(), 8);
        let b = ruled.bounds();
        assert!(b.top() > 0.0 && b.bottom() < 2.0);

        // Cells of 0.5: three horizontal interior lines, one vertical line at x = 0.5.
        let grid = pattern_path(&Page::new(bounds, PagePattern::Grided, 4)).unwrap();
        assert_eq!(grid.len(), 8);
    }
}
