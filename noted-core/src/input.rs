//! # Input
//!
//! Pointer events drive the canvas. A pen gesture runs from [`ToolState::Down`] to
//! [`ToolState::Up`], growing one stroke, with every sample lightly stabilized by averaging it with
//! the previous one. Eraser gestures are handled by [`crate::eraser`].

use crate::state::Canvas;
use crate::util::Rect;

#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug, strum::AsRefStr)]
pub enum Tool {
    Pen,
    Eraser,
    /// Recognized, but does nothing yet.
    Select,
}

#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug, strum::AsRefStr)]
pub enum ToolState {
    Down,
    Drag,
    Up,
}

/// Points at the end of a stroke considered dirty after each sample. Fitted curves shift slightly
/// near the newest point as samples are added, so more than the last segment needs repainting.
const DIRTY_WINDOW: usize = 4;

impl Canvas {
    /// Feed one pointer sample, in canvas coordinates.
    ///
    /// `pressure` is accepted for the host's convenience but doesn't affect the ink.
    pub fn input(&mut self, state: ToolState, tool: Tool, x: f32, y: f32, pressure: f32) {
        log::trace!(
            "{} {} at ({x}, {y}) pressure {pressure}",
            tool.as_ref(),
            state.as_ref()
        );
        match tool {
            Tool::Pen => self.pen_input(state, x, y),
            Tool::Eraser => {
                // Switching tools mid-gesture finishes the stroke as it stands.
                self.finish_stroke();
                self.eraser_input(state, x, y);
            }
            Tool::Select => (),
        }
    }

    fn pen_input(&mut self, state: ToolState, x: f32, y: f32) {
        let handle = match (state, self.current) {
            (ToolState::Down, _) | (ToolState::Drag, None) => {
                // A down without an up. Keep what was drawn.
                self.finish_stroke();
                let Some(handle) = self.begin_stroke(x, y) else {
                    return;
                };
                handle
            }
            (ToolState::Up, None) => return,
            (ToolState::Drag | ToolState::Up, Some(handle)) => {
                self.extend_stroke(handle, x, y);
                handle
            }
        };
        self.invalidate_recent(handle);

        if state == ToolState::Up {
            self.finish_stroke();
            self.autosave();
        }
    }

    /// Start a stroke on whichever page is under the point. Returns the new stroke's
    /// `(page, index)`, or `None` if the point is on no page.
    fn begin_stroke(&mut self, x: f32, y: f32) -> Option<(usize, usize)> {
        let Some(page_idx) = self.page_at(x, y) else {
            log::trace!("pen down at ({x}, {y}) is on no page");
            return None;
        };
        self.clear_redos();

        let (ox, oy) = self.pages[page_idx].origin();
        let id = self.next_stroke_id();
        let stroke = crate::stroke::Stroke::new(id, page_idx, x - ox, y - oy, self.style);
        let stroke_idx = self.append_stroke_to_page(page_idx, stroke)?;
        self.current = Some((page_idx, stroke_idx));
        log::debug!("began {id} on page {page_idx}");

        // Always leave a blank page below the last inked one.
        if page_idx + 1 == self.pages.len() {
            self.append_page();
        }
        Some((page_idx, stroke_idx))
    }

    fn extend_stroke(&mut self, (page_idx, stroke_idx): (usize, usize), x: f32, y: f32) {
        let Some(page) = self.pages.get_mut(page_idx) else {
            return;
        };
        let (ox, oy) = page.origin();
        let Some(stroke) = page.stroke_mut(stroke_idx) else {
            return;
        };
        let (x, y) = (x - ox, y - oy);
        // Stabilize by averaging with the previous point.
        let (x, y) = match stroke.last() {
            Some((px, py)) => ((px + x) / 2.0, (py + y) / 2.0),
            None => (x, y),
        };
        stroke.push(x, y);
    }

    /// Report the tail of the given stroke as needing repaint.
    fn invalidate_recent(&mut self, (page_idx, stroke_idx): (usize, usize)) {
        let Some(page) = self.pages.get(page_idx) else {
            return;
        };
        let Some(stroke) = page.stroke(stroke_idx) else {
            return;
        };
        let skip = stroke.len().saturating_sub(DIRTY_WINDOW);
        let mut points = stroke.points().skip(skip);
        let Some((x, y)) = points.next() else {
            return;
        };
        let mut dirty = Rect::from_point(x, y);
        for (x, y) in points {
            dirty.expand_by_point(x, y);
        }
        let (ox, oy) = page.origin();
        let dirty = dirty
            .translated(ox, oy)
            .expanded(stroke.style().thickness);
        self.invalidate(Some(dirty));
    }

    /// End the pen gesture in progress, if any, committing the stroke to undo history.
    pub(crate) fn finish_stroke(&mut self) {
        let Some((page_idx, stroke_idx)) = self.current.take() else {
            return;
        };
        let settings = self.settings;
        let Some(page) = self.pages.get_mut(page_idx) else {
            return;
        };
        let origin = page.origin();
        let Some(stroke) = page.stroke_mut(stroke_idx) else {
            return;
        };
        let id = stroke.id();
        if settings.reduce_strokes {
            let before = stroke.ink_bounds();
            let removed = stroke.reduce(settings.reduce_epsilon(stroke.style().thickness));
            log::trace!("reduced {id} by {removed} points, {} remain", stroke.len());
            if removed > 0 {
                self.invalidate(Some(before.translated(origin.0, origin.1)));
            }
        }
        self.push_history(page_idx, id);
        log::debug!("finished {id}");
    }
}

#[cfg(test)]
mod test {
    use super::{Tool, ToolState};
    use crate::settings::{defaults, Settings};
    use crate::state::Canvas;
    use crate::util::Rect;
    use std::{cell::RefCell, rc::Rc};

    type Log = Rc<RefCell<Vec<(Option<Rect>, usize)>>>;

    fn watched(canvas: &mut Canvas) -> Log {
        let log = Log::default();
        let sink = log.clone();
        canvas.set_invalidate_callback(move |rect, npages| sink.borrow_mut().push((rect, npages)));
        log
    }
    fn pen(canvas: &mut Canvas, state: ToolState, x: f32, y: f32) {
        canvas.input(state, Tool::Pen, x, y, 1.0);
    }

    #[test]
    fn simple_gesture() {
        let mut canvas = Canvas::new();
        let log = watched(&mut canvas);
        pen(&mut canvas, ToolState::Down, 0.2, 0.2);
        assert!(canvas.is_drawing());
        pen(&mut canvas, ToolState::Drag, 0.3, 0.25);
        pen(&mut canvas, ToolState::Drag, 0.4, 0.3);
        pen(&mut canvas, ToolState::Up, 0.5, 0.35);
        assert!(!canvas.is_drawing());

        let page = canvas.page(0).unwrap();
        assert_eq!(page.strokes().len(), 1);
        // Up contributes a point too.
        assert_eq!(page.strokes()[0].len(), 4);
        assert!(log.borrow().iter().any(|(rect, _)| rect.is_some()));
    }
    #[test]
    fn samples_are_stabilized() {
        let mut canvas = Canvas::new();
        pen(&mut canvas, ToolState::Down, 0.25, 0.25);
        pen(&mut canvas, ToolState::Drag, 0.5, 0.75);
        pen(&mut canvas, ToolState::Up, 0.5, 0.75);
        let stroke = &canvas.page(0).unwrap().strokes()[0];
        assert_eq!(stroke.xs(), [0.25, 0.375, 0.4375]);
        assert_eq!(stroke.ys(), [0.25, 0.5, 0.625]);
        assert_eq!(stroke.bounds(), Rect::new(0.25, 0.25, 0.4375, 0.625));
    }
    #[test]
    fn drawing_on_last_page_appends() {
        let mut canvas = Canvas::new();
        let log = watched(&mut canvas);
        pen(&mut canvas, ToolState::Down, 0.5, 0.5);
        pen(&mut canvas, ToolState::Up, 0.5, 0.5);
        assert_eq!(canvas.page_count(), 2);
        let first = canvas.page_rect(0).unwrap();
        let second = canvas.page_rect(1).unwrap();
        assert_eq!(second.y1, first.y2 + defaults::PAGE_GAP);
        assert!(log.borrow().contains(&(None, 2)));

        // Again on the first page. It's no longer last, nothing appended.
        pen(&mut canvas, ToolState::Down, 0.5, 0.6);
        pen(&mut canvas, ToolState::Up, 0.5, 0.6);
        assert_eq!(canvas.page_count(), 2);

        // On the second page.
        pen(&mut canvas, ToolState::Down, 0.5, second.y1 + 0.1);
        pen(&mut canvas, ToolState::Up, 0.5, second.y1 + 0.1);
        assert_eq!(canvas.page_count(), 3);
        let stroke = &canvas.page(1).unwrap().strokes()[0];
        // Stored relative to its page.
        assert!((stroke.ys()[0] - 0.1).abs() < 1e-5);
        assert_eq!(stroke.page(), 1);
    }
    #[test]
    fn off_page_is_ignored() {
        let mut canvas = Canvas::new();
        let log = watched(&mut canvas);
        pen(&mut canvas, ToolState::Down, 1.5, 0.5);
        pen(&mut canvas, ToolState::Up, 1.5, 0.5);
        assert!(canvas.page(0).unwrap().strokes().is_empty());
        assert_eq!(canvas.page_count(), 1);
        assert!(log.borrow().is_empty());
    }
    #[test]
    fn invalidation_covers_recent_points() {
        let mut canvas = Canvas::new();
        canvas.append_page();
        let log = watched(&mut canvas);
        let second = canvas.page_rect(1).unwrap();
        let thickness = canvas.stroke_style().thickness;
        let y = second.y1 + 0.5;
        pen(&mut canvas, ToolState::Down, 0.1, y);
        for x in [0.2, 0.3, 0.4, 0.5, 0.6] {
            pen(&mut canvas, ToolState::Drag, x, y);
        }
        let (rect, npages) = *log.borrow().last().unwrap();
        let rect = rect.unwrap();
        assert_eq!(npages, 3);
        let stroke = &canvas.page(1).unwrap().strokes()[0];
        // Last four points, translated back to canvas space.
        let xs = &stroke.xs()[stroke.len() - 4..];
        assert!((rect.x1 - (xs[0] - thickness)).abs() < 1e-5);
        assert!((rect.x2 - (xs[3] + thickness)).abs() < 1e-5);
        assert!((rect.y1 - (y - thickness)).abs() < 1e-4);
        assert!(rect.x1 > stroke.xs()[0]);
    }
    #[test]
    fn drag_without_down_starts() {
        let mut canvas = Canvas::new();
        pen(&mut canvas, ToolState::Drag, 0.5, 0.5);
        assert!(canvas.is_drawing());
        pen(&mut canvas, ToolState::Up, 0.6, 0.5);
        assert_eq!(canvas.page(0).unwrap().strokes()[0].len(), 2);
        // Stray up.
        pen(&mut canvas, ToolState::Up, 0.6, 0.5);
        assert_eq!(canvas.page(0).unwrap().strokes().len(), 1);
    }
    #[test]
    fn undo_pen_strokes() {
        let mut canvas = Canvas::new();
        for y in [0.2, 0.4] {
            pen(&mut canvas, ToolState::Down, 0.2, y);
            pen(&mut canvas, ToolState::Drag, 0.2, y);
            // No undo mid-gesture.
            assert!(!canvas.undo());
            pen(&mut canvas, ToolState::Up, 0.4, y);
        }
        let log = watched(&mut canvas);
        assert!(canvas.undo());
        let strokes = canvas.page(0).unwrap().strokes();
        assert_eq!(strokes.len(), 1);
        assert_eq!(strokes[0].ys()[0], 0.2);
        assert!(log.borrow()[0].0.is_some());
        assert!(canvas.undo());
        assert!(!canvas.undo());
        assert!(!canvas.redo());
    }
    #[test]
    fn reduction_is_opt_in() {
        let line = |canvas: &mut Canvas| {
            pen(canvas, ToolState::Down, 0.1, 0.5);
            for i in 2..20 {
                pen(canvas, ToolState::Drag, 0.05 * i as f32, 0.5);
            }
            pen(canvas, ToolState::Up, 1.0, 0.5);
            canvas.page(0).unwrap().strokes()[0].len()
        };
        let mut plain = Canvas::new();
        assert_eq!(line(&mut plain), 20);

        let mut reducing = Canvas::with_settings(Settings {
            reduce_strokes: true,
            ..Default::default()
        });
        assert_eq!(line(&mut reducing), 2);
    }
    #[test]
    fn select_does_nothing() {
        let mut canvas = Canvas::new();
        let log = watched(&mut canvas);
        canvas.input(ToolState::Down, Tool::Select, 0.5, 0.5, 1.0);
        canvas.input(ToolState::Up, Tool::Select, 0.5, 0.5, 1.0);
        assert!(log.borrow().is_empty());
        assert!(canvas.page(0).unwrap().strokes().is_empty());
    }
}
