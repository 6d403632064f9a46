//! # Curve fitting
//!
//! Strokes are stored as bare samples. At draw time they're either joined with straight segments or
//! threaded with a C1-continuous cubic bezier spline through every sample, depending on how coarse
//! the samples appear on screen.

use crate::stroke::Stroke;

/// Receiver for path geometry. Implemented for [`tiny_skia::PathBuilder`], so that the same
/// tracing feeds both painting and eraser hit testing.
pub trait PathSink {
    fn move_to(&mut self, x: f32, y: f32);
    fn line_to(&mut self, x: f32, y: f32);
    fn cubic_to(&mut self, x1: f32, y1: f32, x2: f32, y2: f32, x: f32, y: f32);
}
impl PathSink for tiny_skia::PathBuilder {
    fn move_to(&mut self, x: f32, y: f32) {
        tiny_skia::PathBuilder::move_to(self, x, y);
    }
    fn line_to(&mut self, x: f32, y: f32) {
        tiny_skia::PathBuilder::line_to(self, x, y);
    }
    fn cubic_to(&mut self, x1: f32, y1: f32, x2: f32, y2: f32, x: f32, y: f32) {
        tiny_skia::PathBuilder::cubic_to(self, x1, y1, x2, y2, x, y);
    }
}

#[derive(Copy, Clone, PartialEq, Eq, Debug, strum::AsRefStr)]
pub enum RenderMode {
    /// Straight segments between samples.
    Polyline,
    /// A fitted bezier spline through every sample.
    Bezier,
}

/// Decide how to draw a stroke at the given magnification.
///
/// `scale` is device pixels per canvas unit. Curves are only worth it when there are enough samples
/// to fit and the longest gap between samples spans more than `threshold_px` on screen. Below that,
/// lines and curves are indistinguishable.
#[must_use]
pub fn render_mode(stroke: &Stroke, scale: f32, threshold_px: f32) -> RenderMode {
    if stroke.len() >= 3 && stroke.max_dist_sq().sqrt() * scale > threshold_px {
        RenderMode::Bezier
    } else {
        RenderMode::Polyline
    }
}

/// Solve for the two inner control points of every segment of a spline interpolating `p`, one
/// dimension at a time. Returns `(cp1, cp2)`, each with one entry per segment, or `None` with fewer
/// than three samples.
///
/// Segment `i` is the cubic `p[i], cp1[i], cp2[i], p[i + 1]`. The first derivative is continuous at
/// every sample, as is the second at interior samples.
#[must_use]
pub fn control_points(p: &[f32]) -> Option<(Vec<f32>, Vec<f32>)> {
    if p.len() < 3 {
        return None;
    }
    // Number of segments, and of unknowns.
    let n = p.len() - 1;

    // Tridiagonal system: a is the sub-diagonal, b the diagonal, c the super-diagonal.
    // a[0] and c[n - 1] are unused.
    let mut a = vec![1.0f32; n];
    let mut b = vec![4.0f32; n];
    let mut c = vec![1.0f32; n];
    let mut r = Vec::with_capacity(n);

    a[0] = 0.0;
    b[0] = 2.0;
    r.push(p[0] + 2.0 * p[1]);
    for i in 1..n - 1 {
        r.push(4.0 * p[i] + 2.0 * p[i + 1]);
    }
    a[n - 1] = 2.0;
    b[n - 1] = 7.0;
    c[n - 1] = 0.0;
    r.push(8.0 * p[n - 1] + p[n]);

    // Thomas algorithm. Forward elimination...
    for i in 1..n {
        let m = a[i] / b[i - 1];
        b[i] -= m * c[i - 1];
        r[i] -= m * r[i - 1];
    }
    // ...and back substitution.
    let mut cp1 = vec![0.0f32; n];
    cp1[n - 1] = r[n - 1] / b[n - 1];
    for i in (0..n - 1).rev() {
        cp1[i] = (r[i] - c[i] * cp1[i + 1]) / b[i];
    }

    let mut cp2 = Vec::with_capacity(n);
    for i in 0..n - 1 {
        cp2.push(2.0 * p[i + 1] - cp1[i + 1]);
    }
    cp2.push(0.5 * (p[n] + cp1[n - 1]));

    Some((cp1, cp2))
}

/// Emit a stroke's geometry, in page-relative coordinates.
///
/// A lone sample becomes a zero-length line so that round caps still leave a dot.
pub fn trace_stroke(sink: &mut impl PathSink, stroke: &Stroke, mode: RenderMode) {
    let xs = stroke.xs();
    let ys = stroke.ys();
    let Some((&x0, &y0)) = xs.first().zip(ys.first()) else {
        return;
    };
    sink.move_to(x0, y0);
    if xs.len() == 1 {
        sink.line_to(x0, y0);
        return;
    }

    if mode == RenderMode::Bezier {
        if let Some(((xc1, xc2), (yc1, yc2))) = control_points(xs).zip(control_points(ys)) {
            for i in 0..xs.len() - 1 {
                sink.cubic_to(xc1[i], yc1[i], xc2[i], yc2[i], xs[i + 1], ys[i + 1]);
            }
            return;
        }
    }
    for (&x, &y) in xs.iter().zip(ys).skip(1) {
        sink.line_to(x, y);
    }
}
