//! An in-memory icon grid implementing [`PresentationSurface`].
//!
//! `GridSurface` lays rows out left to right in fixed-size cells, wrapping to
//! a new line when the viewport width is used up, and scrolls vertically. It
//! does not paint; instead it records which rows need repainting so the host
//! can draw them with whatever renderer it has.
//!
//! # Example
//!
//! ```
//! use thumbgrid::{BrowserConfig, GridSurface, PresentationSurface};
//! use thumbgrid_core::Size;
//!
//! let config = BrowserConfig::default();
//! // Room for three 80px cells with 4px gaps.
//! let surface = GridSurface::new(Size::new(248.0, 400.0), &config);
//! assert_eq!(surface.columns(), 3);
//! assert_eq!(surface.row_count(), 0);
//! ```

use slotmap::SecondaryMap;
use thumbgrid_core::logging::targets;
use thumbgrid_core::{Point, Rect, Size};

use crate::config::BrowserConfig;
use crate::item::GroupId;
use crate::surface::{PresentationSurface, SearchDirection, SurfaceChrome, SurfaceRow};

/// A fixed-cell, left-to-right icon grid.
#[derive(Debug)]
pub struct GridSurface {
    cell_size: Size,
    spacing: f32,
    viewport: Size,
    rows: Vec<SurfaceRow>,
    /// Row rectangles in content coordinates.
    item_rects: Vec<Rect>,
    content_height: f32,
    scroll_y: f32,
    selected: Option<usize>,
    updating: bool,
    layout_dirty: bool,
    groups: SecondaryMap<GroupId, String>,
    redraw_requests: Vec<(usize, usize)>,
    chrome: SurfaceChrome,
    filter_focused: bool,
}

impl GridSurface {
    /// Create an empty grid with the given viewport size and the cell
    /// metrics from `config`.
    pub fn new(viewport: Size, config: &BrowserConfig) -> Self {
        Self {
            cell_size: Size::new(config.cell_width, config.cell_height),
            spacing: config.spacing,
            viewport,
            rows: Vec::new(),
            item_rects: Vec::new(),
            content_height: 0.0,
            scroll_y: 0.0,
            selected: None,
            updating: false,
            layout_dirty: false,
            groups: SecondaryMap::new(),
            redraw_requests: Vec::new(),
            chrome: SurfaceChrome {
                label_text: config.label_text.clone(),
                hide_filter_input: config.hide_filter_input,
                dark_background: config.dark_background,
            },
            filter_focused: false,
        }
    }

    /// Resize the viewport and reflow.
    pub fn set_viewport_size(&mut self, viewport: Size) {
        if self.viewport != viewport {
            self.viewport = viewport;
            self.relayout();
            self.scroll_y = self.scroll_y.clamp(0.0, self.max_scroll_y());
        }
    }

    /// The viewport size.
    #[inline]
    pub fn viewport_size(&self) -> Size {
        self.viewport
    }

    /// Number of cells per line.
    pub fn columns(&self) -> usize {
        ((self.viewport.width + self.spacing) / (self.cell_size.width + self.spacing))
            .floor()
            .max(1.0) as usize
    }

    /// Total height of the laid-out content.
    #[inline]
    pub fn content_height(&self) -> f32 {
        self.content_height
    }

    /// Current vertical scroll offset.
    #[inline]
    pub fn scroll_offset(&self) -> f32 {
        self.scroll_y
    }

    /// Scroll to `offset`, clamped to the content.
    pub fn set_scroll_offset(&mut self, offset: f32) {
        let clamped = offset.clamp(0.0, self.max_scroll_y());
        if self.scroll_y != clamped {
            self.scroll_y = clamped;
            self.request_redraw_all();
        }
    }

    fn max_scroll_y(&self) -> f32 {
        (self.content_height - self.viewport.height).max(0.0)
    }

    /// The row data pushed by the last rebuild.
    #[inline]
    pub fn rows(&self) -> &[SurfaceRow] {
        &self.rows
    }

    /// The row at `row`.
    #[inline]
    pub fn row(&self, row: usize) -> Option<&SurfaceRow> {
        self.rows.get(row)
    }

    /// The row shown as selected.
    #[inline]
    pub fn selected_row(&self) -> Option<usize> {
        self.selected
    }

    /// Hit-test a client-space point.
    pub fn row_at(&self, point: Point) -> Option<usize> {
        let content = Point::new(point.x, point.y + self.scroll_y);
        self.item_rects.iter().position(|rect| rect.contains(content))
    }

    /// Returns `true` between `begin_update` and `end_update`.
    #[inline]
    pub fn is_updating(&self) -> bool {
        self.updating
    }

    /// Name of a registered group.
    pub fn group_name(&self, id: GroupId) -> Option<&str> {
        self.groups.get(id).map(String::as_str)
    }

    /// Number of rows currently drawn under `id`.
    pub fn group_member_count(&self, id: GroupId) -> usize {
        self.rows.iter().filter(|row| row.group == Some(id)).count()
    }

    /// The applied chrome settings.
    #[inline]
    pub fn chrome(&self) -> &SurfaceChrome {
        &self.chrome
    }

    /// Whether the filter input box has keyboard focus.
    #[inline]
    pub fn is_filter_focused(&self) -> bool {
        self.filter_focused
    }

    /// Take the inclusive row ranges that need repainting since the last call.
    pub fn take_redraw_requests(&mut self) -> Vec<(usize, usize)> {
        std::mem::take(&mut self.redraw_requests)
    }

    fn request_redraw_all(&mut self) {
        if !self.updating && !self.rows.is_empty() {
            self.redraw_requests.push((0, self.rows.len() - 1));
        }
    }

    fn relayout(&mut self) {
        let columns = self.columns();
        let step_x = self.cell_size.width + self.spacing;
        let step_y = self.cell_size.height + self.spacing;

        self.item_rects.clear();
        self.item_rects.reserve(self.rows.len());
        for i in 0..self.rows.len() {
            let col = i % columns;
            let line = i / columns;
            self.item_rects.push(Rect::new(
                col as f32 * step_x,
                line as f32 * step_y,
                self.cell_size.width,
                self.cell_size.height,
            ));
        }

        let lines = self.rows.len().div_ceil(columns);
        self.content_height = (lines as f32 * step_y - self.spacing).max(0.0);
        self.layout_dirty = false;
    }

    fn content_to_client(&self, rect: Rect) -> Rect {
        rect.offset(0.0, -self.scroll_y)
    }
}

/// Distance from `value` to the span `[start, end)`, zero inside it.
fn span_distance(value: f32, start: f32, end: f32) -> f32 {
    if value < start {
        start - value
    } else if value >= end {
        value - end
    } else {
        0.0
    }
}

impl PresentationSurface for GridSurface {
    fn begin_update(&mut self) {
        self.updating = true;
    }

    fn end_update(&mut self) {
        self.updating = false;
        if self.layout_dirty {
            self.relayout();
            self.scroll_y = self.scroll_y.clamp(0.0, self.max_scroll_y());
        }
        self.request_redraw_all();
    }

    fn clear(&mut self) {
        self.rows.clear();
        self.item_rects.clear();
        self.content_height = 0.0;
        self.selected = None;
        self.scroll_y = 0.0;
    }

    fn extend_rows(&mut self, rows: Vec<SurfaceRow>) {
        self.rows.extend(rows);
        if self.updating {
            self.layout_dirty = true;
        } else {
            self.relayout();
            self.request_redraw_all();
        }
    }

    fn row_count(&self) -> usize {
        self.rows.len()
    }

    fn row_rect(&self, row: usize) -> Option<Rect> {
        self.item_rects
            .get(row)
            .map(|rect| self.content_to_client(*rect))
    }

    fn client_rect(&self) -> Rect {
        Rect::new(0.0, 0.0, self.viewport.width, self.viewport.height)
    }

    fn nearest_row(&self, origin: Point, direction: SearchDirection) -> Option<usize> {
        // Rank by gap along the search axis, then by offset across it, then
        // by layout order.
        let mut best: Option<(f32, f32, usize)> = None;

        for row in 0..self.item_rects.len() {
            let Some(rect) = self.row_rect(row) else {
                continue;
            };
            let in_band = origin.y >= rect.top() && origin.y < rect.bottom();

            let candidate = match direction {
                SearchDirection::Right if in_band && rect.left() > origin.x => {
                    Some((rect.left() - origin.x, 0.0))
                }
                SearchDirection::Left if in_band && rect.right() <= origin.x + 1.0 => {
                    Some(((origin.x - rect.right()).max(0.0), 0.0))
                }
                SearchDirection::Up if rect.bottom() <= origin.y + 1.0 => Some((
                    (origin.y - rect.bottom()).max(0.0),
                    span_distance(origin.x, rect.left(), rect.right()),
                )),
                SearchDirection::Down if rect.top() >= origin.y - 1.0 => Some((
                    (rect.top() - origin.y).max(0.0),
                    span_distance(origin.x, rect.left(), rect.right()),
                )),
                _ => None,
            };

            if let Some((gap, offset)) = candidate {
                let better = match best {
                    None => true,
                    Some((best_gap, best_offset, _)) => {
                        gap.total_cmp(&best_gap)
                            .then(offset.total_cmp(&best_offset))
                            .is_lt()
                    }
                };
                if better {
                    best = Some((gap, offset, row));
                }
            }
        }

        best.map(|(_, _, row)| row)
    }

    fn find_row_with_text(&self, prefix: &str) -> Option<usize> {
        let prefix = prefix.to_lowercase();
        self.rows
            .iter()
            .position(|row| row.text.to_lowercase().starts_with(&prefix))
    }

    fn set_selected_row(&mut self, row: Option<usize>) {
        let row = row.filter(|&r| r < self.rows.len());
        if self.selected == row {
            return;
        }
        let previous = std::mem::replace(&mut self.selected, row);
        if !self.updating {
            for r in previous.into_iter().chain(row) {
                self.redraw_requests.push((r, r));
            }
        }
    }

    fn ensure_visible(&mut self, row: usize) {
        let Some(rect) = self.item_rects.get(row).copied() else {
            return;
        };

        let viewport_top = self.scroll_y;
        let viewport_bottom = self.scroll_y + self.viewport.height;
        let mut scroll_y = self.scroll_y;
        if rect.top() < viewport_top {
            scroll_y = rect.top();
        } else if rect.bottom() > viewport_bottom {
            scroll_y = rect.bottom() - self.viewport.height;
        }
        self.set_scroll_offset(scroll_y);
    }

    fn redraw_rows(&mut self, first: usize, last: usize) {
        if self.updating || first > last || last >= self.rows.len() {
            return;
        }
        tracing::trace!(target: targets::VIEW, first, last, "rows repaint requested");
        self.redraw_requests.push((first, last));
    }

    fn add_group(&mut self, id: GroupId, name: &str) {
        self.groups.insert(id, name.to_string());
    }

    fn set_chrome(&mut self, chrome: &SurfaceChrome) {
        if &self.chrome != chrome {
            self.chrome = chrome.clone();
            self.request_redraw_all();
        }
    }

    fn focus_filter_input(&mut self) {
        self.filter_focused = true;
    }
}

static_assertions::assert_impl_all!(GridSurface: Send, Sync);
static_assertions::assert_impl_all!(crate::ImageBrowser<GridSurface>: Send, Sync);

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::preview::PreviewSlot;

    fn rows(names: &[&str]) -> Vec<SurfaceRow> {
        names
            .iter()
            .map(|name| SurfaceRow {
                text: name.to_string(),
                tooltip: None,
                group: None,
                preview: Arc::new(PreviewSlot::new()),
            })
            .collect()
    }

    /// Three columns of 80x96 cells with 4px gaps, two lines visible.
    fn surface_with(names: &[&str]) -> GridSurface {
        let mut surface = GridSurface::new(Size::new(248.0, 196.0), &BrowserConfig::default());
        surface.extend_rows(rows(names));
        surface.take_redraw_requests();
        surface
    }

    fn origin(surface: &GridSurface, row: usize, direction: SearchDirection) -> Point {
        let rect = surface.row_rect(row).unwrap();
        match direction {
            SearchDirection::Left => Point::new(rect.left() - 1.0, rect.top() + 1.0),
            SearchDirection::Right => Point::new(rect.left() + 1.0, rect.top() + 1.0),
            SearchDirection::Up => Point::new(rect.left() + 1.0, rect.top() - 1.0),
            SearchDirection::Down => Point::new(rect.left() + 1.0, rect.bottom() + 1.0),
        }
    }

    #[test]
    fn test_icon_layout_wraps() {
        let surface = surface_with(&["a", "b", "c", "d"]);
        assert_eq!(surface.columns(), 3);
        assert_eq!(surface.row_rect(1), Some(Rect::new(84.0, 0.0, 80.0, 96.0)));
        assert_eq!(surface.row_rect(3), Some(Rect::new(0.0, 100.0, 80.0, 96.0)));
        assert_eq!(surface.content_height(), 196.0);
        assert_eq!(surface.row_rect(4), None);
    }

    #[test]
    fn test_nearest_row_horizontal() {
        let surface = surface_with(&["a", "b", "c", "d", "e"]);
        let right = SearchDirection::Right;
        let left = SearchDirection::Left;

        assert_eq!(surface.nearest_row(origin(&surface, 0, right), right), Some(1));
        assert_eq!(surface.nearest_row(origin(&surface, 1, left), left), Some(0));
        // No wrap to the next line.
        assert_eq!(surface.nearest_row(origin(&surface, 2, right), right), None);
        assert_eq!(surface.nearest_row(origin(&surface, 3, left), left), None);
    }

    #[test]
    fn test_nearest_row_vertical() {
        let surface = surface_with(&["a", "b", "c", "d", "e"]);
        let up = SearchDirection::Up;
        let down = SearchDirection::Down;

        assert_eq!(surface.nearest_row(origin(&surface, 1, down), down), Some(4));
        assert_eq!(surface.nearest_row(origin(&surface, 4, up), up), Some(1));
        assert_eq!(surface.nearest_row(origin(&surface, 0, up), up), None);
        // The short last line still catches a move down from the right edge.
        assert_eq!(surface.nearest_row(origin(&surface, 2, down), down), Some(4));
        assert_eq!(surface.nearest_row(origin(&surface, 4, down), down), None);
    }

    #[test]
    fn test_find_row_with_text_is_prefix_and_case_insensitive() {
        let surface = surface_with(&["door1", "Wall1", "wall2"]);
        assert_eq!(surface.find_row_with_text("wall"), Some(1));
        assert_eq!(surface.find_row_with_text("WALL2"), Some(2));
        assert_eq!(surface.find_row_with_text("floor"), None);
    }

    #[test]
    fn test_ensure_visible_scrolls() {
        let names: Vec<String> = (0..12).map(|i| format!("tex{i}")).collect();
        let names: Vec<&str> = names.iter().map(String::as_str).collect();
        let mut surface = surface_with(&names);

        surface.ensure_visible(9);
        let rect = surface.row_rect(9).unwrap();
        assert!(rect.bottom() <= surface.client_rect().bottom());
        assert!(surface.scroll_offset() > 0.0);

        surface.ensure_visible(0);
        assert_eq!(surface.scroll_offset(), 0.0);
    }

    #[test]
    fn test_updates_defer_layout_and_redraw() {
        let mut surface = surface_with(&[]);
        surface.begin_update();
        surface.extend_rows(rows(&["a", "b"]));
        assert_eq!(surface.row_rect(0), None);
        surface.redraw_rows(0, 1);
        assert!(surface.take_redraw_requests().is_empty());

        surface.end_update();
        assert!(surface.row_rect(1).is_some());
        assert_eq!(surface.take_redraw_requests(), vec![(0, 1)]);
    }

    #[test]
    fn test_row_at_hit_test() {
        let surface = surface_with(&["a", "b", "c", "d"]);
        assert_eq!(surface.row_at(Point::new(90.0, 10.0)), Some(1));
        assert_eq!(surface.row_at(Point::new(82.0, 10.0)), None);
        assert_eq!(surface.row_at(Point::new(5.0, 150.0)), Some(3));
    }
}
