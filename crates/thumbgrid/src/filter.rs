//! Filter predicate and the derived view list.
//!
//! The view list is never edited directly. It is rebuilt from the catalog and
//! the current [`TextFilter`] and maps view rows to catalog indices, in
//! catalog order.

use crate::item::Item;

/// A case-sensitive substring filter over item text.
///
/// The empty filter matches everything.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TextFilter {
    text: String,
}

impl TextFilter {
    /// Create a filter for the given text.
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }

    /// The filter text.
    #[inline]
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Returns `true` if `candidate` contains the filter text.
    #[inline]
    pub fn matches(&self, candidate: &str) -> bool {
        candidate.contains(self.text.as_str())
    }
}

/// The currently visible subset of the catalog.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ViewList {
    /// Mapping from view row to catalog index.
    view_to_catalog: Vec<usize>,
    /// Mapping from catalog index to view row (None if filtered out).
    catalog_to_view: Vec<Option<usize>>,
}

impl ViewList {
    /// An empty view.
    pub fn new() -> Self {
        Self::default()
    }

    /// Derive the view from `items` and `filter`.
    pub fn build(items: &[Item], filter: &TextFilter) -> Self {
        let mut view = Self {
            view_to_catalog: Vec::new(),
            catalog_to_view: vec![None; items.len()],
        };
        for (index, item) in items.iter().enumerate() {
            if filter.matches(item.text()) {
                view.catalog_to_view[index] = Some(view.view_to_catalog.len());
                view.view_to_catalog.push(index);
            }
        }
        view
    }

    /// Number of visible rows.
    #[inline]
    pub fn len(&self) -> usize {
        self.view_to_catalog.len()
    }

    /// Returns `true` if nothing is visible.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.view_to_catalog.is_empty()
    }

    /// Catalog index shown at `row`.
    #[inline]
    pub fn map_to_catalog(&self, row: usize) -> Option<usize> {
        self.view_to_catalog.get(row).copied()
    }

    /// View row showing catalog index `index`, if it is visible.
    #[inline]
    pub fn map_from_catalog(&self, index: usize) -> Option<usize> {
        self.catalog_to_view.get(index).copied().flatten()
    }

    /// Visible catalog indices in view order.
    #[inline]
    pub fn catalog_indices(&self) -> &[usize] {
        &self.view_to_catalog
    }
}
