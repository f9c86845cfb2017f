//! The full, unfiltered item collection and its batch protocol.
//!
//! Items are only ever added inside a `begin_adding` / `end_adding` batch.
//! A batch stages the new items on the side; the live items stay readable
//! until `end_adding` swaps the staged set in, so no observer ever sees a
//! half-built catalog.

use thumbgrid_core::logging::targets;

use crate::item::Item;

/// The ordered set of all items.
#[derive(Debug, Default)]
pub struct Catalog {
    items: Vec<Item>,
    staging: Option<Vec<Item>>,
}

impl Catalog {
    /// Create an empty catalog.
    pub fn new() -> Self {
        Self::default()
    }

    /// Open a batch.
    ///
    /// # Panics
    ///
    /// Panics if a batch is already open.
    pub fn begin_adding(&mut self) {
        assert!(
            self.staging.is_none(),
            "begin_adding called while a batch is already open"
        );
        self.staging = Some(Vec::new());
        tracing::debug!(target: targets::CATALOG, live = self.items.len(), "batch opened");
    }

    /// Append an item to the open batch.
    ///
    /// # Panics
    ///
    /// Panics if no batch is open.
    pub fn add(&mut self, item: Item) {
        let Some(staging) = self.staging.as_mut() else {
            panic!("add called outside of a begin_adding/end_adding batch");
        };
        tracing::trace!(target: targets::CATALOG, text = item.text(), "item staged");
        staging.push(item);
    }

    /// Close the batch, replacing the live items with the staged ones.
    ///
    /// Returns the superseded items so the caller decides when they drop.
    ///
    /// # Panics
    ///
    /// Panics if no batch is open.
    pub fn end_adding(&mut self) -> Vec<Item> {
        let Some(staged) = self.staging.take() else {
            panic!("end_adding called without a matching begin_adding");
        };
        tracing::debug!(target: targets::CATALOG, items = staged.len(), "batch closed");
        std::mem::replace(&mut self.items, staged)
    }

    /// Returns `true` while a batch is open.
    #[inline]
    pub fn is_adding(&self) -> bool {
        self.staging.is_some()
    }

    /// Number of items staged in the open batch.
    pub fn staged_len(&self) -> usize {
        self.staging.as_ref().map_or(0, Vec::len)
    }

    /// Drop every live and staged item and close any open batch.
    pub fn clear(&mut self) {
        self.items.clear();
        self.staging = None;
    }

    /// The live items.
    #[inline]
    pub fn items(&self) -> &[Item] {
        &self.items
    }

    /// The live items, mutably.
    #[inline]
    pub fn items_mut(&mut self) -> &mut [Item] {
        &mut self.items
    }

    /// The live item at `index`.
    #[inline]
    pub fn get(&self, index: usize) -> Option<&Item> {
        self.items.get(index)
    }

    /// The live item at `index`, mutably.
    #[inline]
    pub fn get_mut(&mut self, index: usize) -> Option<&mut Item> {
        self.items.get_mut(index)
    }

    /// Number of live items.
    #[inline]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Returns `true` if there are no live items.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}
