//! # Detail reduction
//!
//! Ramer-Douglas-Peucker over parallel coordinate lists. The tolerance is relative to the length of
//! the chord under test: a point survives when its distance from the chord exceeds
//! `epsilon * chord_length`. Multiplying through by the chord length keeps this free of square roots.

/// Simplify the point lists in place. Both lists must be of equal length.
///
/// Inputs of zero, one or two points are returned untouched, and the endpoints are always kept, so
/// any input of two or more points yields at least two points. Never grows the lists.
/// Running it again with the same epsilon removes nothing further.
pub fn reduce(xs: &mut Vec<f32>, ys: &mut Vec<f32>, epsilon: f32) {
    debug_assert_eq!(xs.len(), ys.len());
    let n = xs.len().min(ys.len());
    if n <= 2 {
        return;
    }

    let mut keep: bitvec::vec::BitVec = bitvec::vec::BitVec::repeat(false, n);
    keep.set(0, true);
    keep.set(n - 1, true);

    // Inclusive (first, last) ranges still to be examined.
    let mut ranges = vec![(0usize, n - 1)];
    while let Some((first, last)) = ranges.pop() {
        if last - first < 2 {
            continue;
        }
        if let Some(split) = farthest_beyond(&xs[first..=last], &ys[first..=last], epsilon) {
            let split = first + split;
            keep.set(split, true);
            ranges.push((first, split));
            ranges.push((split, last));
        }
    }

    let mut x_keep = keep.iter().by_vals();
    xs.retain(|_| x_keep.next().unwrap_or(true));
    let mut y_keep = keep.iter().by_vals();
    ys.retain(|_| y_keep.next().unwrap_or(true));
}

/// Index of the interior point farthest from the chord joining the first and last points, if it is
/// far enough to be kept. Ties resolve toward the earliest point.
fn farthest_beyond(xs: &[f32], ys: &[f32], epsilon: f32) -> Option<usize> {
    let last = xs.len() - 1;
    let (x0, y0) = (xs[0], ys[0]);
    let (dx, dy) = (xs[last] - x0, ys[last] - y0);
    let chord_sq = dx * dx + dy * dy;

    let mut best = None;
    let mut best_metric = 0.0;
    for i in 1..last {
        let (px, py) = (xs[i] - x0, ys[i] - y0);
        // Chord collapsed to a point: fall back on distance from it.
        let metric = if chord_sq == 0.0 {
            px * px + py * py
        } else {
            (px * dy - py * dx).abs()
        };
        if metric > best_metric {
            best_metric = metric;
            best = Some(i);
        }
    }
    // |cross| / chord > epsilon * chord
    best.filter(|_| best_metric > epsilon * chord_sq)
}
