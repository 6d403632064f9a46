//! # Eraser
//!
//! Strokes are erased whole, when the eraser's path touches any of their ink.
//!
//! Overlap is found by rasterizing rather than geometry. Both the eraser segment and a candidate
//! stroke are painted at half alpha, additively, onto a small offscreen surface covering just the
//! eraser. Only pixels painted by both reach full alpha. The stroke is traced by the very same
//! routine used to draw it, at its true width, so what you see is what gets erased.
//!
//! Painting is aliased, a pixel is covered only when its center is inside the shape. A full alpha
//! pixel therefore has its center inside both shapes. The surface resolution is chosen so the
//! thinnest shape involved still spans a couple of pixels, keeping misses near the edge small.
//!
//! The segment runs from the previous eraser sample to the current one, so a fast swipe doesn't
//! skip over ink between samples.

use az::CheckedAs;

use crate::curve::render_mode;
use crate::input::ToolState;
use crate::render::{ink_outline, paint_stroke};
use crate::settings::Settings;
use crate::state::Canvas;
use crate::stroke::Stroke;
use crate::util::Rect;

/// Result of a single eraser sample.
#[derive(Copy, Clone, Default, PartialEq, Eq, Debug)]
pub(crate) struct EraseReport {
    /// Strokes removed.
    pub removed: usize,
    /// Whether any stroke was close enough to need a hit surface.
    pub tested: bool,
}

/// Straight eraser path between two samples, canvas-absolute.
struct Segment {
    from: (f32, f32),
    to: (f32, f32),
    width: f32,
}
impl Segment {
    /// Canvas-space area the eraser's ink may cover.
    fn bounds(&self) -> Rect {
        let mut rect = Rect::from_point(self.to.0, self.to.1);
        rect.expand_by_point(self.from.0, self.from.1);
        rect.expanded(self.width / 2.0)
    }
    fn paint(
        &self,
        pixmap: &mut tiny_skia::PixmapMut<'_>,
        paint: &tiny_skia::Paint<'_>,
        transform: tiny_skia::Transform,
    ) {
        if self.from == self.to {
            // A lone sample, stamp the round tip.
            if let Some(disc) =
                tiny_skia::PathBuilder::from_circle(self.to.0, self.to.1, self.width / 2.0)
            {
                pixmap.fill_path(&disc, paint, tiny_skia::FillRule::Winding, transform, None);
            }
            return;
        }
        let mut builder = tiny_skia::PathBuilder::with_capacity(2, 2);
        builder.move_to(self.from.0, self.from.1);
        builder.line_to(self.to.0, self.to.1);
        if let Some(path) = builder.finish() {
            pixmap.stroke_path(&path, paint, &ink_outline(self.width), transform, None);
        }
    }
}

/// Scratch raster for overlap tests. Lives for one eraser sample, and is only created once some
/// stroke is actually close enough to test.
struct HitSurface {
    pixmap: tiny_skia::Pixmap,
    /// Canvas-absolute to surface pixels.
    transform: tiny_skia::Transform,
    /// Surface pixels per canvas unit.
    scale: f32,
    /// Half of the saturating alpha. Two coats reach full coverage.
    paint: tiny_skia::Paint<'static>,
}
impl HitSurface {
    /// Cover `area`, a canvas-space rect, at `scale` pixels per canvas unit.
    /// `None` if the surface can't be allocated.
    fn new(area: Rect, scale: f32) -> Option<Self> {
        let device = Rect::new(
            area.x1 * scale,
            area.y1 * scale,
            area.x2 * scale,
            area.y2 * scale,
        )
        .round_out();
        let width = device.width().checked_as::<u32>()?.max(1);
        let height = device.height().checked_as::<u32>()?.max(1);
        let pixmap = tiny_skia::Pixmap::new(width, height)?;

        let mut paint = tiny_skia::Paint::default();
        paint.set_color_rgba8(0, 0, 0, 128);
        paint.anti_alias = false;
        paint.blend_mode = tiny_skia::BlendMode::Plus;

        Some(Self {
            pixmap,
            transform: tiny_skia::Transform::from_row(
                scale, 0.0, 0.0, scale, -device.x1, -device.y1,
            ),
            scale,
            paint,
        })
    }
    /// Does the eraser segment touch the stroke's ink?
    fn overlaps(
        &mut self,
        stroke: &Stroke,
        origin: (f32, f32),
        eraser: &Segment,
        settings: &Settings,
    ) -> bool {
        self.pixmap.fill(tiny_skia::Color::TRANSPARENT);
        let mut pixmap = self.pixmap.as_mut();

        let mode = render_mode(stroke, self.scale, settings.min_bezier_distance_px);
        paint_stroke(
            &mut pixmap,
            stroke,
            mode,
            stroke.style().thickness,
            &self.paint,
            self.transform.pre_translate(origin.0, origin.1),
            None,
        );
        eraser.paint(&mut pixmap, &self.paint, self.transform);

        self.pixmap
            .pixels()
            .iter()
            .any(|pixel| pixel.alpha() == u8::MAX)
    }
}

impl Canvas {
    /// Handle one eraser sample, canvas-absolute.
    pub(crate) fn eraser_input(&mut self, state: ToolState, x: f32, y: f32) -> EraseReport {
        if state == ToolState::Down {
            self.eraser_prev = None;
        }
        let report = self.erase_segment(self.eraser_prev.unwrap_or((x, y)), (x, y));
        if state == ToolState::Up {
            self.eraser_prev = None;
            self.autosave();
        } else {
            self.eraser_prev = Some((x, y));
        }
        report
    }

    /// Remove every stroke touched by the eraser moving from `from` to `to`.
    fn erase_segment(&mut self, from: (f32, f32), to: (f32, f32)) -> EraseReport {
        let settings = self.settings;
        let mut report = EraseReport::default();
        let segment = Segment {
            from,
            to,
            width: settings.eraser_thickness,
        };
        let area = segment.bounds();

        // Nothing nearby, no surface.
        let Some(thinnest) = self
            .pages
            .iter()
            .flat_map(|page| page.strokes_in(area))
            .map(|(_, stroke)| stroke.style().thickness)
            .reduce(f32::min)
        else {
            return report;
        };
        let scale = settings.eraser_hit_pixels / thinnest.min(segment.width);
        if !scale.is_finite() || scale <= 0.0 {
            log::warn!("eraser resolution {scale} is unusable");
            return report;
        }
        // Dropped on return, however we get there.
        let Some(mut surface) = HitSurface::new(area, scale) else {
            log::warn!("couldn't allocate eraser hit surface for {area:?} at {scale}px per unit");
            return report;
        };
        report.tested = true;

        for page_idx in 0..self.pages.len() {
            let origin = self.pages[page_idx].origin();
            let local_area = area.translated(-origin.0, -origin.1);

            let mut stroke_idx = 0;
            while let Some(stroke) = self.pages[page_idx].stroke(stroke_idx) {
                if !stroke.ink_bounds().intersects(&local_area) {
                    stroke_idx += 1;
                    continue;
                }
                if !surface.overlaps(stroke, origin, &segment, &settings) {
                    stroke_idx += 1;
                    continue;
                }

                let dirty = stroke.ink_bounds().translated(origin.0, origin.1);
                let id = stroke.id();
                self.clear_redos();
                self.remove_stroke(page_idx, stroke_idx);
                log::debug!("erased {id} from page {page_idx}");
                self.invalidate(Some(dirty));
                report.removed += 1;
                // The following stroke has shifted into `stroke_idx`.
            }
        }
        report
    }
}
