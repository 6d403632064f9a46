//! # Canvas
//!
//! An endless, vertically paginated drawing surface. Coordinates are canvas units: the page width
//! is always `1.0` and y grows downward across pages, separated by a small gap.

use super::page::{Page, PagePattern};
use crate::settings::{defaults, Settings};
use crate::stroke::{Stroke, StrokeID, StrokeStyle};
use crate::util::Rect;

/// Told about every region that needs repainting, along with the current page count.
/// The rect is `None` when only the page count changed.
///
/// Called synchronously from within canvas operations, so it must not call back into the canvas.
pub type InvalidateCallback = Box<dyn FnMut(Option<Rect>, usize)>;

pub struct Canvas {
    /// Never empty.
    pub(crate) pages: Vec<Page>,
    /// `(page, stroke)` indices of the stroke being drawn, between a pen down and pen up.
    pub(crate) current: Option<(usize, usize)>,
    pub(crate) style: StrokeStyle,
    /// Last eraser sample of the ongoing eraser gesture, canvas-absolute.
    pub(crate) eraser_prev: Option<(f32, f32)>,
    /// File this canvas was opened from, saved to after every gesture.
    path: Option<std::path::PathBuf>,
    pub(crate) settings: Settings,
    invalidate: Option<InvalidateCallback>,
    /// Finished pen strokes, oldest first, for undo.
    history: Vec<(usize, StrokeID)>,
    next_id: u64,
}
impl Default for Canvas {
    fn default() -> Self {
        Self::new()
    }
}
impl std::fmt::Debug for Canvas {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Canvas")
            .field("pages", &self.pages.len())
            .field("current", &self.current)
            .field("style", &self.style)
            .field("path", &self.path)
            .finish_non_exhaustive()
    }
}
impl Canvas {
    /// A blank canvas of one page.
    #[must_use]
    pub fn new() -> Self {
        Self::with_settings(Settings::default())
    }
    #[must_use]
    pub fn with_settings(settings: Settings) -> Self {
        let first = Page::new(
            Rect::new(0.0, 0.0, defaults::PAGE_WIDTH, defaults::PAGE_HEIGHT),
            PagePattern::Grided,
            defaults::PAGE_DENSITY,
        );
        Self::from_pages(vec![first], settings)
    }
    /// Build around already-populated pages. An empty list gets the default first page.
    #[must_use]
    pub(crate) fn from_pages(pages: Vec<Page>, settings: Settings) -> Self {
        if pages.is_empty() {
            return Self::with_settings(settings);
        }
        let next_id = pages
            .iter()
            .flat_map(Page::strokes)
            .map(|stroke| stroke.id().0 + 1)
            .max()
            .unwrap_or(0);
        Self {
            pages,
            current: None,
            style: StrokeStyle::default(),
            eraser_prev: None,
            path: None,
            settings,
            invalidate: None,
            history: Vec::new(),
            next_id,
        }
    }
    /// Read a canvas file, remembering the path for auto-saving.
    ///
    /// # Errors
    /// Any IO error, or a file that is not a well-formed canvas. Nothing partial is returned.
    pub fn open(path: impl AsRef<std::path::Path>) -> Result<Self, crate::io::ReadError> {
        let path = path.as_ref();
        let file = std::fs::File::open(path)?;
        let mut canvas = crate::io::read(std::io::BufReader::new(file), Settings::default())?;
        canvas.path = Some(path.to_owned());
        Ok(canvas)
    }
    /// Write the canvas to `path`, replacing any existing file.
    ///
    /// # Errors
    /// Any IO error, or the canvas being too large for the format's count fields.
    pub fn save(&self, path: impl AsRef<std::path::Path>) -> Result<(), crate::io::WriteError> {
        let path = path.as_ref();
        let file = std::fs::File::create(path)?;
        let mut writer = std::io::BufWriter::new(file);
        crate::io::write(self, &mut writer)?;
        // Flush explicitly, so errors are reported rather than swallowed on drop.
        std::io::Write::flush(&mut writer)?;
        log::debug!("saved {} pages to {}", self.pages.len(), path.display());
        Ok(())
    }
    #[must_use]
    pub fn path(&self) -> Option<&std::path::Path> {
        self.path.as_deref()
    }
    /// Set or clear the file saved to after every gesture.
    pub fn set_path(&mut self, path: Option<std::path::PathBuf>) {
        self.path = path;
    }
    /// Save to the backing path, if any. Failures are logged and otherwise ignored.
    pub(crate) fn autosave(&self) {
        let Some(path) = self.path.as_deref() else {
            return;
        };
        if let Err(e) = self.save(path) {
            log::warn!("failed to save {}: {e}", path.display());
        }
    }
    #[must_use]
    pub fn settings(&self) -> &Settings {
        &self.settings
    }
    pub fn set_settings(&mut self, settings: Settings) {
        self.settings = settings;
    }
    pub fn set_invalidate_callback(&mut self, callback: impl FnMut(Option<Rect>, usize) + 'static) {
        self.invalidate = Some(Box::new(callback));
    }
    pub(crate) fn invalidate(&mut self, rect: Option<Rect>) {
        let npages = self.pages.len();
        if let Some(callback) = self.invalidate.as_mut() {
            callback(rect, npages);
        }
    }
    /// Style given to the next stroke.
    #[must_use]
    pub fn stroke_style(&self) -> StrokeStyle {
        self.style
    }
    pub fn set_stroke_style(&mut self, style: StrokeStyle) {
        self.style = style;
    }
    /// Is a pen gesture in progress?
    #[must_use]
    pub fn is_drawing(&self) -> bool {
        self.current.is_some()
    }
    #[must_use]
    pub fn page_count(&self) -> usize {
        self.pages.len()
    }
    #[must_use]
    pub fn pages(&self) -> &[Page] {
        &self.pages
    }
    #[must_use]
    pub fn page(&self, index: usize) -> Option<&Page> {
        self.pages.get(index)
    }
    /// Canvas-absolute bounds of a page.
    #[must_use]
    pub fn page_rect(&self, index: usize) -> Option<Rect> {
        self.pages.get(index).map(Page::bounds)
    }
    /// Bottom edge of the last page.
    #[must_use]
    pub fn height(&self) -> f32 {
        self.pages.last().map_or(0.0, |page| page.bounds().y2)
    }
    /// The page strictly containing a canvas-absolute point. Points on a page border or in a gap
    /// belong to no page.
    #[must_use]
    pub fn page_at(&self, x: f32, y: f32) -> Option<usize> {
        self.pages
            .iter()
            .position(|page| page.bounds().contains_point(x, y))
    }
    /// Pages strictly intersecting a canvas-absolute rect.
    pub fn pages_in(&self, rect: Rect) -> impl Iterator<Item = (usize, &Page)> + '_ {
        self.pages
            .iter()
            .enumerate()
            .filter(move |(_, page)| page.bounds().intersects(&rect))
    }
    /// Every stroke whose ink could touch a canvas-absolute rect, as `(page, stroke index, stroke)`.
    pub fn strokes_in(&self, rect: Rect) -> impl Iterator<Item = (usize, usize, &Stroke)> + '_ {
        self.pages_in(rect).flat_map(move |(page_idx, page)| {
            page.strokes_in(rect)
                .map(move |(stroke_idx, stroke)| (page_idx, stroke_idx, stroke))
        })
    }
    /// Stack a new page below the last, copying its height and background.
    /// Returns the index of the new page.
    pub fn append_page(&mut self) -> usize {
        // Never empty, but don't panic over it.
        let (prev, pattern, density) = self.pages.last().map_or(
            (
                Rect::new(0.0, -defaults::PAGE_GAP, defaults::PAGE_WIDTH, -defaults::PAGE_GAP),
                PagePattern::Grided,
                defaults::PAGE_DENSITY,
            ),
            |page| (page.bounds(), page.pattern, page.density),
        );
        let height = if prev.height() > 0.0 {
            prev.height()
        } else {
            defaults::PAGE_HEIGHT
        };
        let y1 = prev.y2 + defaults::PAGE_GAP;
        self.pages.push(Page::new(
            Rect::new(0.0, y1, defaults::PAGE_WIDTH, y1 + height),
            pattern,
            density,
        ));
        log::debug!("appended page {}", self.pages.len());
        self.invalidate(None);
        self.pages.len() - 1
    }
    /// Hand a stroke to a page, returning its index within that page, or `None` if there is no
    /// such page.
    pub fn append_stroke_to_page(&mut self, page: usize, stroke: Stroke) -> Option<usize> {
        debug_assert_eq!(stroke.page(), page);
        Some(self.pages.get_mut(page)?.push_stroke(stroke))
    }
    /// Remove a stroke from a page, keeping the order of the rest.
    pub fn remove_stroke(&mut self, page: usize, index: usize) -> Option<Stroke> {
        if self.current.is_some_and(|(p, _)| p == page) {
            // Indices of the live stroke would shift.
            log::warn!("removing a stroke mid-gesture, ending the gesture");
            self.current = None;
        }
        self.pages.get_mut(page)?.remove_stroke(index)
    }
    /// Change the background of a page and repaint it. False if there is no such page.
    pub fn set_page_pattern(&mut self, page: usize, pattern: PagePattern, density: u16) -> bool {
        let Some(p) = self.pages.get_mut(page) else {
            return false;
        };
        p.pattern = pattern;
        p.density = density;
        let bounds = p.bounds();
        self.invalidate(Some(bounds));
        true
    }
    pub(crate) fn next_stroke_id(&mut self) -> StrokeID {
        let id = StrokeID(self.next_id);
        self.next_id += 1;
        id
    }
    /// Record a finished pen stroke for undo.
    pub(crate) fn push_history(&mut self, page: usize, id: StrokeID) {
        self.history.push((page, id));
    }
    /// Take back the most recent pen stroke that still exists.
    /// False during a gesture, or if there is nothing left to undo.
    ///
    /// Erasing is not recorded, and so cannot be undone.
    pub fn undo(&mut self) -> bool {
        if self.current.is_some() {
            return false;
        }
        while let Some((page, id)) = self.history.pop() {
            let Some(index) = self.pages.get(page).and_then(|p| p.position_of(id)) else {
                // Erased since.
                continue;
            };
            let Some(stroke) = self.remove_stroke(page, index) else {
                continue;
            };
            let (ox, oy) = self.pages[page].origin();
            log::debug!("undo {id}");
            self.invalidate(Some(stroke.ink_bounds().translated(ox, oy)));
            return true;
        }
        false
    }
    /// Redo history is never populated, so this always fails.
    pub fn redo(&mut self) -> bool {
        false
    }
    /// Forget anything that could be redone. Called whenever new ink is started or ink is erased.
    pub(crate) fn clear_redos(&mut self) {}
}
