//! The image browser facade.
//!
//! [`ImageBrowser`] ties the catalog, the filter, the redraw scheduler and
//! the selection together on top of a [`PresentationSurface`]. The host
//! populates it in batches, forwards filter input and surface events to it,
//! and listens on its two signals.
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//!
//! use parking_lot::Mutex;
//! use thumbgrid::{BrowserConfig, GridSurface, ImageBrowser, PreviewSlot, SearchDirection};
//! use thumbgrid_core::Size;
//!
//! let config = BrowserConfig::default();
//! let surface = GridSurface::new(Size::new(248.0, 400.0), &config);
//! let mut browser = ImageBrowser::new(surface, &config);
//!
//! let picked = Arc::new(Mutex::new(Vec::new()));
//! let sink = picked.clone();
//! browser.selected_item_changed().connect(move |_| sink.lock().push(()));
//!
//! browser.begin_adding(false);
//! for name in ["wall1", "wall2", "door1"] {
//!     browser.add(name, Arc::new(PreviewSlot::new()), None, None);
//! }
//! browser.end_adding();
//! assert_eq!(browser.selected_item().map(|item| item.text()), Some("wall1"));
//!
//! browser.set_filter_text("wall");
//! browser.select_directional(SearchDirection::Right);
//! assert_eq!(browser.selected_item().map(|item| item.text()), Some("wall2"));
//! ```

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use slotmap::SlotMap;
use thumbgrid_core::logging::targets;
use thumbgrid_core::{PerfSpan, Property, Signal};

use crate::catalog::Catalog;
use crate::config::BrowserConfig;
use crate::filter::{TextFilter, ViewList};
use crate::item::{GroupId, Item, ItemTag};
use crate::navigation::{NavigationKey, SelectionState, search_origin};
use crate::preview::PreviewSource;
use crate::refresh::{RedrawScheduler, SweepOutcome};
use crate::surface::{PresentationSurface, SearchDirection, SurfaceChrome, SurfaceRow};

/// Marks the browser as repopulating its surface for as long as it lives.
struct UpdatingGuard<'a> {
    flag: &'a AtomicBool,
}

impl<'a> UpdatingGuard<'a> {
    fn enter(flag: &'a AtomicBool) -> Self {
        flag.store(true, Ordering::Release);
        Self { flag }
    }
}

impl Drop for UpdatingGuard<'_> {
    fn drop(&mut self) {
        self.flag.store(false, Ordering::Release);
    }
}

/// A filterable thumbnail browser over a presentation surface.
pub struct ImageBrowser<S: PresentationSurface> {
    surface: S,
    catalog: Catalog,
    view: ViewList,
    filter: TextFilter,
    selection: SelectionState,
    scheduler: RedrawScheduler,
    groups: SlotMap<GroupId, String>,
    updating: AtomicBool,

    prevent_selection: Property<bool>,
    label_text: Property<String>,
    hide_filter_input: Property<bool>,
    dark_background: Property<bool>,

    selected_item_changed: Signal<()>,
    selected_item_double_clicked: Signal<()>,
}

impl<S: PresentationSurface> ImageBrowser<S> {
    /// Create an empty browser driving `surface`.
    pub fn new(mut surface: S, config: &BrowserConfig) -> Self {
        let chrome = SurfaceChrome {
            label_text: config.label_text.clone(),
            hide_filter_input: config.hide_filter_input,
            dark_background: config.dark_background,
        };
        surface.set_chrome(&chrome);

        let browser = Self {
            surface,
            catalog: Catalog::new(),
            view: ViewList::new(),
            filter: TextFilter::default(),
            selection: SelectionState::new(),
            scheduler: RedrawScheduler::new(config.refresh_interval()),
            groups: SlotMap::with_key(),
            updating: AtomicBool::new(false),
            prevent_selection: Property::new(config.prevent_selection),
            label_text: Property::new(chrome.label_text),
            hide_filter_input: Property::new(chrome.hide_filter_input),
            dark_background: Property::new(chrome.dark_background),
            selected_item_changed: Signal::new(),
            selected_item_double_clicked: Signal::new(),
        };
        browser.block_notifications(config.prevent_selection);
        browser
    }

    // =========================================================================
    // Signals
    // =========================================================================

    /// Emitted once per committed selection change and once per view rebuild
    /// while selection is allowed. Re-query [`selected_item`](Self::selected_item).
    pub fn selected_item_changed(&self) -> &Signal<()> {
        &self.selected_item_changed
    }

    /// Emitted when the selected row is double clicked.
    pub fn selected_item_double_clicked(&self) -> &Signal<()> {
        &self.selected_item_double_clicked
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    /// The presentation surface.
    pub fn surface(&self) -> &S {
        &self.surface
    }

    /// The presentation surface, mutably. Use this for viewport changes and
    /// scrolling; content is owned by the browser.
    pub fn surface_mut(&mut self) -> &mut S {
        &mut self.surface
    }

    /// The full catalog.
    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    /// The visible subset of the catalog.
    pub fn view(&self) -> &ViewList {
        &self.view
    }

    /// Visible items in view order.
    pub fn visible_items(&self) -> impl Iterator<Item = &Item> + '_ {
        self.view
            .catalog_indices()
            .iter()
            .filter_map(|&index| self.catalog.get(index))
    }

    /// The item shown at view row `row`.
    pub fn item_at_row(&self, row: usize) -> Option<&Item> {
        self.view
            .map_to_catalog(row)
            .and_then(|index| self.catalog.get(index))
    }

    /// The current filter text.
    pub fn filter_text(&self) -> &str {
        self.filter.text()
    }

    /// Returns `true` while the view is being rebuilt.
    pub fn is_updating(&self) -> bool {
        self.updating.load(Ordering::Acquire)
    }

    /// Returns `true` between `begin_adding` and `end_adding`.
    pub fn is_adding(&self) -> bool {
        self.catalog.is_adding()
    }

    // =========================================================================
    // Properties
    // =========================================================================

    /// Whether selection is disabled.
    pub fn prevent_selection(&self) -> bool {
        self.prevent_selection.get()
    }

    /// Enable or disable selection. Both signals stay silent while
    /// selection is prevented.
    ///
    /// An existing selection is left in place until the surface reports a
    /// selection change.
    pub fn set_prevent_selection(&mut self, prevent: bool) {
        if self.prevent_selection.set(prevent) {
            self.block_notifications(prevent);
            tracing::debug!(target: targets::SELECTION, prevent, "prevent selection changed");
        }
    }

    fn block_notifications(&self, blocked: bool) {
        self.selected_item_changed.set_blocked(blocked);
        self.selected_item_double_clicked.set_blocked(blocked);
    }

    /// The selected view row.
    pub fn selected_row(&self) -> Option<usize> {
        self.selection.selected()
    }

    /// The selected item.
    pub fn selected_item(&self) -> Option<&Item> {
        self.selection
            .selected()
            .and_then(|row| self.item_at_row(row))
    }

    /// Caption next to the filter input box.
    pub fn label_text(&self) -> String {
        self.label_text.get()
    }

    /// Change the filter caption.
    pub fn set_label_text(&mut self, text: impl Into<String>) {
        if self.label_text.set(text.into()) {
            self.push_chrome();
        }
    }

    /// Whether the filter input box is hidden.
    pub fn hide_filter_input(&self) -> bool {
        self.hide_filter_input.get()
    }

    /// Show or hide the filter input box.
    pub fn set_hide_filter_input(&mut self, hide: bool) {
        if self.hide_filter_input.set(hide) {
            self.push_chrome();
        }
    }

    /// Apply the host's color settings: black background with white text
    /// when `dark_background` is set, the surface defaults otherwise.
    pub fn apply_color_settings(&mut self, dark_background: bool) {
        if self.dark_background.set(dark_background) {
            self.push_chrome();
        }
    }

    fn push_chrome(&mut self) {
        let chrome = SurfaceChrome {
            label_text: self.label_text.get(),
            hide_filter_input: self.hide_filter_input.get(),
            dark_background: self.dark_background.get(),
        };
        self.surface.set_chrome(&chrome);
    }

    /// Move keyboard focus to the filter input box.
    pub fn focus_filter_input(&mut self) {
        self.surface.focus_filter_input();
    }

    // =========================================================================
    // Groups
    // =========================================================================

    /// Register a group rows can be drawn under.
    pub fn add_group(&mut self, name: impl Into<String>) -> GroupId {
        let name = name.into();
        let id = self.groups.insert(name.clone());
        self.surface.add_group(id, &name);
        id
    }

    /// The name of a registered group.
    pub fn group_name(&self, id: GroupId) -> Option<&str> {
        self.groups.get(id).map(String::as_str)
    }

    // =========================================================================
    // Batch protocol
    // =========================================================================

    /// Start repopulating the catalog.
    ///
    /// With `keep_selected_index`, the selected view row is remembered and
    /// re-selected after [`end_adding`](Self::end_adding) if the new view is
    /// long enough. The redraw scheduler is suspended until then.
    ///
    /// # Panics
    ///
    /// Panics if a batch is already open.
    pub fn begin_adding(&mut self, keep_selected_index: bool) {
        self.catalog.begin_adding();
        if keep_selected_index {
            self.selection.keep_current();
        } else {
            self.selection.forget_kept();
        }
        self.scheduler.suspend();
    }

    /// Add an item to the open batch.
    ///
    /// # Panics
    ///
    /// Panics if no batch is open.
    pub fn add(
        &mut self,
        text: impl Into<String>,
        preview: Arc<dyn PreviewSource>,
        tag: Option<ItemTag>,
        group: Option<GroupId>,
    ) {
        self.catalog.add(Item::new(text, preview, tag, group));
    }

    /// Add an item with a tooltip to the open batch.
    ///
    /// # Panics
    ///
    /// Panics if no batch is open.
    pub fn add_with_tooltip(
        &mut self,
        text: impl Into<String>,
        preview: Arc<dyn PreviewSource>,
        tag: Option<ItemTag>,
        group: Option<GroupId>,
        tooltip: impl Into<String>,
    ) {
        self.catalog
            .add(Item::new(text, preview, tag, group).with_tooltip(tooltip));
    }

    /// Finish the batch: swap in the new items, rebuild the view selecting
    /// the kept row or the first row, and resume the redraw scheduler.
    ///
    /// # Panics
    ///
    /// Panics if no batch is open.
    pub fn end_adding(&mut self) {
        let superseded = self.catalog.end_adding();
        self.rebuild(true);
        drop(superseded);
        self.scheduler.resume();
    }

    /// Drop every item, clear the surface and stop the scheduler.
    pub fn clean_up(&mut self) {
        self.scheduler.suspend();
        {
            let _guard = UpdatingGuard::enter(&self.updating);
            self.surface.begin_update();
            self.surface.clear();
            self.surface.end_update();
        }
        self.catalog.clear();
        self.view = ViewList::new();
        self.selection = SelectionState::new();
        tracing::debug!(target: targets::CATALOG, "browser cleaned up");
    }

    // =========================================================================
    // Filtering
    // =========================================================================

    /// Replace the filter text and rebuild the view, selecting the first
    /// visible row.
    ///
    /// While a batch is open only the text is stored; the view is rebuilt
    /// when the batch ends.
    pub fn set_filter_text(&mut self, text: impl Into<String>) {
        let filter = TextFilter::new(text);
        if filter == self.filter {
            return;
        }
        self.filter = filter;
        if self.catalog.is_adding() {
            tracing::debug!(
                target: targets::VIEW,
                filter = self.filter.text(),
                "filter changed during batch, rebuild deferred"
            );
            return;
        }
        self.selection.forget_kept();
        self.rebuild(true);
    }

    /// Rebuild the view with the current filter, keeping the selected slot.
    pub fn refresh_view(&mut self) {
        if self.warn_if_adding("refresh_view") {
            return;
        }
        self.selection.keep_current();
        self.rebuild(false);
    }

    fn rebuild(&mut self, select_first: bool) {
        let _perf = PerfSpan::new("view_rebuild");
        let had_selection = self.selection.selected().is_some();
        {
            let _guard = UpdatingGuard::enter(&self.updating);
            self.surface.begin_update();
            self.surface.clear();

            let items = self.catalog.items_mut();
            for item in items.iter_mut() {
                item.detach();
                item.set_selected(false);
            }

            self.view = ViewList::build(items, &self.filter);
            let rows: Vec<SurfaceRow> = self
                .view
                .catalog_indices()
                .iter()
                .map(|&index| {
                    let item = &mut items[index];
                    item.attach();
                    item.mark_drawn();
                    SurfaceRow {
                        text: item.text().to_string(),
                        tooltip: item.tooltip().map(str::to_string),
                        group: item.membership().group(),
                        preview: Arc::clone(item.preview()),
                    }
                })
                .collect();

            self.surface.extend_rows(rows);
            self.surface.end_update();
        }

        self.selection.clear();
        let anchor = self.selection.take_anchor(self.view.len(), select_first);
        if !self.prevent_selection.get()
            && let Some(row) = anchor
        {
            self.commit_selection(row);
        }

        tracing::debug!(
            target: targets::VIEW,
            filter = self.filter.text(),
            visible = self.view.len(),
            total = self.catalog.len(),
            selected = ?self.selection.selected(),
            "view rebuilt"
        );

        if self.visible_items().any(|item| !item.is_preview_loaded()) {
            self.scheduler.resume();
        }
        // An empty view that had nothing selected has nothing to report.
        if had_selection || !self.view.is_empty() {
            self.selected_item_changed.emit(());
        }
    }

    // =========================================================================
    // Selection
    // =========================================================================

    fn warn_if_adding(&self, operation: &'static str) -> bool {
        if self.catalog.is_adding() {
            tracing::warn!(target: targets::SELECTION, operation, "ignored during batch");
            true
        } else {
            false
        }
    }

    /// Drop the selection without notifying. Returns `true` if something was
    /// selected.
    fn clear_selection(&mut self) -> bool {
        if let Some(item) = self
            .selection
            .selected()
            .and_then(|r| self.view.map_to_catalog(r))
            .and_then(|index| self.catalog.get_mut(index))
        {
            item.set_selected(false);
        }
        self.selection.clear()
    }

    /// Move the selection to `row` without notifying. Returns `true` if the
    /// selection changed.
    fn commit_selection(&mut self, row: usize) -> bool {
        let previous = self.selection.selected();
        if !self.selection.select(row) {
            return false;
        }
        if let Some(item) = previous
            .and_then(|r| self.view.map_to_catalog(r))
            .and_then(|index| self.catalog.get_mut(index))
        {
            item.set_selected(false);
        }
        if let Some(item) = self
            .view
            .map_to_catalog(row)
            .and_then(|index| self.catalog.get_mut(index))
        {
            item.set_selected(true);
        }
        self.surface.set_selected_row(Some(row));
        self.surface.ensure_visible(row);
        tracing::debug!(target: targets::SELECTION, row, "selection moved");
        true
    }

    fn select_and_notify(&mut self, row: usize) -> bool {
        let changed = self.commit_selection(row);
        if changed {
            self.selected_item_changed.emit(());
        }
        changed
    }

    /// Select the item named exactly `name`.
    ///
    /// The surface's prefix search picks the candidate row; it is committed
    /// only if its text equals `name`. Returns `true` if the selection
    /// changed.
    pub fn select_item(&mut self, name: &str) -> bool {
        if self.prevent_selection.get() || self.warn_if_adding("select_item") {
            return false;
        }
        let Some(row) = self.surface.find_row_with_text(name) else {
            return false;
        };
        match self.item_at_row(row) {
            Some(item) if item.text() == name => self.select_and_notify(row),
            _ => false,
        }
    }

    /// Select the first visible row. Returns `true` if the selection changed.
    pub fn select_first(&mut self) -> bool {
        if self.prevent_selection.get() || self.warn_if_adding("select_first") {
            return false;
        }
        if self.view.is_empty() {
            return false;
        }
        self.select_and_notify(0)
    }

    /// Move the selection to the nearest row in `direction`.
    ///
    /// Without a selection this selects the first row. Moving past the edge
    /// of the grid leaves the selection alone. Returns `true` if the
    /// selection changed.
    pub fn select_directional(&mut self, direction: SearchDirection) -> bool {
        if self.prevent_selection.get() || self.warn_if_adding("select_directional") {
            return false;
        }
        let Some(current) = self.selection.selected() else {
            return self.select_first();
        };
        let Some(rect) = self.surface.row_rect(current) else {
            return false;
        };

        let origin = search_origin(rect, direction);
        match self.surface.nearest_row(origin, direction) {
            Some(row) if row < self.view.len() => {
                tracing::trace!(target: targets::SELECTION, ?direction, from = current, to = row, "directional move");
                self.select_and_notify(row)
            }
            _ => false,
        }
    }

    /// Handle a key pressed in the filter input box.
    ///
    /// Arrow keys move the selection and return `true`; the input box must
    /// then swallow the key press.
    pub fn handle_filter_key(&mut self, key: NavigationKey) -> bool {
        match key.direction() {
            Some(direction) => {
                self.select_directional(direction);
                true
            }
            None => false,
        }
    }

    // =========================================================================
    // Surface events
    // =========================================================================

    /// The user changed the surface selection, e.g. by clicking a row.
    ///
    /// Ignored while the view is rebuilding. With selection prevented the
    /// surface selection and any earlier selection are dropped silently.
    pub fn on_surface_selection_changed(&mut self, row: Option<usize>) {
        if self.is_updating() {
            return;
        }
        if self.prevent_selection.get() {
            self.clear_selection();
            self.surface.set_selected_row(None);
            return;
        }
        let row = row.filter(|&r| r < self.view.len());
        match row {
            Some(row) => {
                self.select_and_notify(row);
            }
            None => {
                if self.clear_selection() {
                    self.surface.set_selected_row(None);
                    self.selected_item_changed.emit(());
                }
            }
        }
    }

    /// The user double clicked the surface. Returns `true` if the
    /// double-click signal was emitted.
    pub fn on_surface_double_click(&mut self) -> bool {
        if self.prevent_selection.get() || self.selection.selected().is_none() {
            return false;
        }
        self.selected_item_double_clicked.emit(());
        true
    }

    /// Whether the surface may paint `row` now.
    pub fn on_surface_draw_item(&self, row: usize) -> bool {
        !self.is_updating() && row < self.view.len()
    }

    // =========================================================================
    // Preview refresh
    // =========================================================================

    /// Whether the redraw scheduler is running.
    pub fn is_refresh_active(&self) -> bool {
        self.scheduler.is_active()
    }

    /// Mark the item at view row `row` as visually changed so the next sweep
    /// repaints it. Returns `false` if there is no such row.
    pub fn invalidate_row(&mut self, row: usize) -> bool {
        let Some(item) = self
            .view
            .map_to_catalog(row)
            .and_then(|index| self.catalog.get_mut(index))
        else {
            return false;
        };
        item.invalidate();
        self.scheduler.resume();
        true
    }

    /// Run one redraw sweep now, regardless of the timer.
    pub fn refresh_tick(&mut self) -> SweepOutcome {
        if self.catalog.is_adding() {
            return SweepOutcome::default();
        }
        self.scheduler
            .sweep(self.catalog.items_mut(), &self.view, &mut self.surface)
    }

    /// Run the redraw sweep if its timer is due. Call this from the host
    /// event loop. Returns the sweep outcome if one ran.
    pub fn process_timers(&mut self) -> Option<SweepOutcome> {
        if self.scheduler.take_due() {
            Some(self.refresh_tick())
        } else {
            None
        }
    }

    /// How long the host may wait before calling
    /// [`process_timers`](Self::process_timers) again.
    pub fn time_until_next_tick(&mut self) -> Option<Duration> {
        self.scheduler.time_until_next()
    }
}

impl<S: PresentationSurface + std::fmt::Debug> std::fmt::Debug for ImageBrowser<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ImageBrowser")
            .field("surface", &self.surface)
            .field("items", &self.catalog.len())
            .field("visible", &self.view.len())
            .field("filter", &self.filter.text())
            .field("selection", &self.selection)
            .field("refresh_active", &self.scheduler.is_active())
            .field("listeners", &self.selected_item_changed.connection_count())
            .finish_non_exhaustive()
    }
}
