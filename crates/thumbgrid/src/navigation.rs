//! Selection state and keyboard navigation helpers.
//!
//! The browser tracks at most one selected view row. Directional moves probe
//! the surface from a point just outside the selected row's box; see
//! [`search_origin`].

use thumbgrid_core::{Point, Rect};

use crate::surface::SearchDirection;

/// A key press routed from the filter input box.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NavigationKey {
    Left,
    Right,
    Up,
    Down,
    /// Any key the browser does not handle.
    Other,
}

impl NavigationKey {
    /// The navigation direction for arrow keys.
    pub fn direction(self) -> Option<SearchDirection> {
        match self {
            NavigationKey::Left => Some(SearchDirection::Left),
            NavigationKey::Right => Some(SearchDirection::Right),
            NavigationKey::Up => Some(SearchDirection::Up),
            NavigationKey::Down => Some(SearchDirection::Down),
            NavigationKey::Other => None,
        }
    }
}

/// The probe point for a directional search from `rect`.
///
/// The point sits one unit outside the box edge facing `direction`, one unit
/// in from the top-left corner along the other axis.
pub fn search_origin(rect: Rect, direction: SearchDirection) -> Point {
    match direction {
        SearchDirection::Left => Point::new(rect.left() - 1.0, rect.top() + 1.0),
        SearchDirection::Right => Point::new(rect.left() + 1.0, rect.top() + 1.0),
        SearchDirection::Up => Point::new(rect.left() + 1.0, rect.top() - 1.0),
        SearchDirection::Down => Point::new(rect.left() + 1.0, rect.bottom() + 1.0),
    }
}

/// The selected row and the slot to restore after the next rebuild.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SelectionState {
    selected: Option<usize>,
    keep_selected_index: Option<usize>,
}

impl SelectionState {
    /// No selection, nothing kept.
    pub fn new() -> Self {
        Self::default()
    }

    /// The selected view row.
    #[inline]
    pub fn selected(&self) -> Option<usize> {
        self.selected
    }

    /// Select `row`. Returns `true` if the selection changed.
    pub fn select(&mut self, row: usize) -> bool {
        self.set(Some(row))
    }

    /// Set or clear the selection. Returns `true` if it changed.
    pub fn set(&mut self, row: Option<usize>) -> bool {
        if self.selected == row {
            false
        } else {
            self.selected = row;
            true
        }
    }

    /// Clear the selection. Returns `true` if something was selected.
    pub fn clear(&mut self) -> bool {
        self.set(None)
    }

    /// Remember the current selection's slot for the next rebuild.
    pub fn keep_current(&mut self) {
        self.keep_selected_index = self.selected;
    }

    /// Forget any kept slot.
    pub fn forget_kept(&mut self) {
        self.keep_selected_index = None;
    }

    /// The slot kept for the next rebuild.
    #[inline]
    pub fn kept(&self) -> Option<usize> {
        self.keep_selected_index
    }

    /// Consume the kept slot and pick the row a rebuilt view of `view_len`
    /// rows should select: the kept slot if it still exists, else the first
    /// row when `select_first` is set.
    pub fn take_anchor(&mut self, view_len: usize, select_first: bool) -> Option<usize> {
        let kept = self.keep_selected_index.take();
        if view_len == 0 {
            return None;
        }
        kept.filter(|&row| row < view_len)
            .or(select_first.then_some(0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_search_origins() {
        let rect = Rect::new(10.0, 20.0, 80.0, 96.0);
        assert_eq!(
            search_origin(rect, SearchDirection::Left),
            Point::new(9.0, 21.0)
        );
        assert_eq!(
            search_origin(rect, SearchDirection::Right),
            Point::new(11.0, 21.0)
        );
        assert_eq!(search_origin(rect, SearchDirection::Up), Point::new(11.0, 19.0));
        assert_eq!(
            search_origin(rect, SearchDirection::Down),
            Point::new(11.0, 117.0)
        );
    }

    #[test]
    fn test_navigation_keys() {
        assert_eq!(NavigationKey::Up.direction(), Some(SearchDirection::Up));
        assert_eq!(NavigationKey::Other.direction(), None);
    }

    #[test]
    fn test_select_reports_change() {
        let mut state = SelectionState::new();
        assert!(state.select(2));
        assert!(!state.select(2));
        assert!(state.clear());
        assert!(!state.clear());
    }

    #[test]
    fn test_anchor_prefers_kept_slot() {
        let mut state = SelectionState::new();
        state.select(3);
        state.keep_current();

        assert_eq!(state.take_anchor(5, true), Some(3));
        // Consumed by the first rebuild.
        assert_eq!(state.kept(), None);
        assert_eq!(state.take_anchor(5, false), None);
    }

    #[test]
    fn test_anchor_falls_back_to_first() {
        let mut state = SelectionState::new();
        state.select(7);
        state.keep_current();
        assert_eq!(state.take_anchor(3, true), Some(0));

        state.keep_current();
        assert_eq!(state.take_anchor(3, false), None);
        assert_eq!(state.take_anchor(0, true), None);
    }
}
