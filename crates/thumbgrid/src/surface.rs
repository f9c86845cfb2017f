//! The presentation surface interface.
//!
//! The browser never lays out or paints anything itself. It drives a
//! [`PresentationSurface`]: a virtualized list widget that owns geometry,
//! hit-testing and drawing. The browser pushes rows in batches, reads row
//! rectangles for navigation and redraw culling, and asks the surface to
//! select, scroll and repaint.
//!
//! All rectangles and points exchanged through this trait are in client
//! coordinates, so a row's rectangle moves as the surface scrolls.

use std::fmt;
use std::sync::Arc;

use thumbgrid_core::{Point, Rect};

use crate::item::GroupId;
use crate::preview::PreviewSource;

/// A direction for spatial navigation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SearchDirection {
    Left,
    Right,
    Up,
    Down,
}

/// One row pushed into the surface by a view rebuild.
#[derive(Clone)]
pub struct SurfaceRow {
    /// Display text.
    pub text: String,
    /// Tooltip, if any.
    pub tooltip: Option<String>,
    /// Group the row is drawn under.
    pub group: Option<GroupId>,
    /// Preview to draw for the row.
    pub preview: Arc<dyn PreviewSource>,
}

impl fmt::Debug for SurfaceRow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SurfaceRow")
            .field("text", &self.text)
            .field("tooltip", &self.tooltip)
            .field("group", &self.group)
            .field("preview_loaded", &self.preview.is_loaded())
            .finish()
    }
}

/// Chrome around the list: the filter label, the input box, and colors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SurfaceChrome {
    /// Caption next to the filter input box.
    pub label_text: String,
    /// Hide the filter input box and its label.
    pub hide_filter_input: bool,
    /// Black background with white text.
    pub dark_background: bool,
}

impl Default for SurfaceChrome {
    fn default() -> Self {
        Self {
            label_text: "Filter:".to_string(),
            hide_filter_input: false,
            dark_background: false,
        }
    }
}

/// The list widget the browser drives.
///
/// Implementations must treat rows as opaque and in order: row `n` is the
/// `n`-th row pushed since the last [`clear`](PresentationSurface::clear).
pub trait PresentationSurface {
    // -------------------------------------------------------------------------
    // Content
    // -------------------------------------------------------------------------

    /// Suspend layout and painting until [`end_update`](Self::end_update).
    fn begin_update(&mut self);

    /// Resume layout and painting.
    fn end_update(&mut self);

    /// Remove every row and drop every row's group membership.
    fn clear(&mut self);

    /// Append rows in one batch.
    fn extend_rows(&mut self, rows: Vec<SurfaceRow>);

    /// Number of rows.
    fn row_count(&self) -> usize;

    // -------------------------------------------------------------------------
    // Geometry
    // -------------------------------------------------------------------------

    /// Bounding box of `row`.
    fn row_rect(&self, row: usize) -> Option<Rect>;

    /// The visible client region.
    fn client_rect(&self) -> Rect;

    /// The nearest row to `origin` in `direction`, if any.
    fn nearest_row(&self, origin: Point, direction: SearchDirection) -> Option<usize>;

    /// The first row whose text starts with `prefix`, in the surface's own
    /// search order and case rules.
    fn find_row_with_text(&self, prefix: &str) -> Option<usize>;

    // -------------------------------------------------------------------------
    // Selection and painting
    // -------------------------------------------------------------------------

    /// Show `row` as selected, or clear the selection.
    fn set_selected_row(&mut self, row: Option<usize>);

    /// Scroll so `row` is in view.
    fn ensure_visible(&mut self, row: usize);

    /// Repaint rows `first..=last`.
    fn redraw_rows(&mut self, first: usize, last: usize);

    // -------------------------------------------------------------------------
    // Groups and chrome
    // -------------------------------------------------------------------------

    /// Register a group so rows can be drawn under it.
    fn add_group(&mut self, id: GroupId, name: &str);

    /// Apply label, input visibility and color settings.
    fn set_chrome(&mut self, _chrome: &SurfaceChrome) {}

    /// Move keyboard focus to the filter input box.
    fn focus_filter_input(&mut self) {}
}
