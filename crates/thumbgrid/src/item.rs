//! Catalog entries.

use std::any::Any;
use std::fmt;
use std::sync::Arc;

use slotmap::new_key_type;

use crate::preview::{PreviewSource, Thumbnail};

new_key_type! {
    /// Identifies a caller-defined group registered with
    /// [`ImageBrowser::add_group`](crate::ImageBrowser::add_group).
    pub struct GroupId;
}

/// Opaque caller payload attached to an item. The browser never inspects it.
pub type ItemTag = Arc<dyn Any + Send + Sync>;

/// An item's live membership in a surface group.
///
/// An item is `Detached` whenever it is outside the current view, and
/// `Attached` to its target group while it is shown.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum GroupMembership {
    /// Not contributing to any group.
    #[default]
    Detached,
    /// Drawn as part of the given group.
    Attached(GroupId),
}

impl GroupMembership {
    /// The group this membership refers to, if attached.
    #[inline]
    pub fn group(&self) -> Option<GroupId> {
        match self {
            GroupMembership::Detached => None,
            GroupMembership::Attached(id) => Some(*id),
        }
    }

    /// Returns `true` if detached.
    #[inline]
    pub fn is_detached(&self) -> bool {
        matches!(self, GroupMembership::Detached)
    }
}

/// A single selectable entry in the catalog.
///
/// Items never refer back to the catalog that holds them, so a batch can
/// discard them wholesale while their previews are still loading.
pub struct Item {
    text: String,
    preview: Arc<dyn PreviewSource>,
    tag: Option<ItemTag>,
    tooltip: Option<String>,
    target_group: Option<GroupId>,
    membership: GroupMembership,
    selected: bool,
    drawn_loaded: bool,
    dirty: bool,
}

impl Item {
    /// Create a detached, unselected item.
    pub fn new(
        text: impl Into<String>,
        preview: Arc<dyn PreviewSource>,
        tag: Option<ItemTag>,
        group: Option<GroupId>,
    ) -> Self {
        Self {
            text: text.into(),
            preview,
            tag,
            tooltip: None,
            target_group: group,
            membership: GroupMembership::Detached,
            selected: false,
            drawn_loaded: false,
            dirty: false,
        }
    }

    /// Attach a tooltip.
    #[must_use]
    pub fn with_tooltip(mut self, tooltip: impl Into<String>) -> Self {
        self.tooltip = Some(tooltip.into());
        self
    }

    /// Display text, also the filter key.
    #[inline]
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Tooltip shown when hovering the item.
    #[inline]
    pub fn tooltip(&self) -> Option<&str> {
        self.tooltip.as_deref()
    }

    /// The caller payload.
    #[inline]
    pub fn tag(&self) -> Option<&ItemTag> {
        self.tag.as_ref()
    }

    /// Downcast the caller payload.
    pub fn tag_as<T: Any>(&self) -> Option<&T> {
        self.tag.as_ref().and_then(|tag| tag.downcast_ref::<T>())
    }

    /// The preview handle.
    #[inline]
    pub fn preview(&self) -> &Arc<dyn PreviewSource> {
        &self.preview
    }

    /// The drawable thumbnail, if the preview has produced one.
    pub fn thumbnail(&self) -> Option<Thumbnail> {
        self.preview.thumbnail()
    }

    /// Whether the preview has settled.
    #[inline]
    pub fn is_preview_loaded(&self) -> bool {
        self.preview.is_loaded()
    }

    /// The group restored whenever the item becomes visible.
    #[inline]
    pub fn target_group(&self) -> Option<GroupId> {
        self.target_group
    }

    /// The item's live group membership.
    #[inline]
    pub fn membership(&self) -> GroupMembership {
        self.membership
    }

    /// Whether the item is the selected one.
    #[inline]
    pub fn is_selected(&self) -> bool {
        self.selected
    }

    pub(crate) fn set_selected(&mut self, selected: bool) {
        self.selected = selected;
    }

    pub(crate) fn detach(&mut self) {
        self.membership = GroupMembership::Detached;
    }

    /// Restore the target group. An item without one stays detached.
    pub(crate) fn attach(&mut self) {
        self.membership = match self.target_group {
            Some(id) => GroupMembership::Attached(id),
            None => GroupMembership::Detached,
        };
    }

    /// Mark the item's visual content as changed.
    pub(crate) fn invalidate(&mut self) {
        self.dirty = true;
    }

    /// Record that the surface has just painted the item in full.
    pub(crate) fn mark_drawn(&mut self) {
        self.drawn_loaded = self.preview.is_loaded();
        self.dirty = false;
    }

    /// Whether the item must be repainted: its preview settled since the last
    /// check, or it was invalidated. Clears the pending state.
    pub(crate) fn check_redraw_needed(&mut self) -> bool {
        let loaded = self.preview.is_loaded();
        let needed = self.dirty || loaded != self.drawn_loaded;
        self.drawn_loaded = loaded;
        self.dirty = false;
        needed
    }
}

impl fmt::Debug for Item {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Item")
            .field("text", &self.text)
            .field("tooltip", &self.tooltip)
            .field("target_group", &self.target_group)
            .field("membership", &self.membership)
            .field("selected", &self.selected)
            .field("preview_loaded", &self.preview.is_loaded())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use slotmap::SlotMap;

    use super::*;
    use crate::preview::PreviewSlot;

    fn group() -> GroupId {
        let mut groups = SlotMap::<GroupId, ()>::with_key();
        groups.insert(())
    }

    #[test]
    fn test_new_item_is_detached() {
        let item = Item::new("wall1", Arc::new(PreviewSlot::new()), None, Some(group()));
        assert!(item.membership().is_detached());
        assert!(!item.is_selected());
        assert!(item.tooltip().is_none());
    }

    #[test]
    fn test_attach_restores_target_group() {
        let id = group();
        let mut item = Item::new("wall1", Arc::new(PreviewSlot::new()), None, Some(id));
        item.attach();
        assert_eq!(item.membership(), GroupMembership::Attached(id));
        item.detach();
        assert_eq!(item.membership().group(), None);

        let mut ungrouped = Item::new("door1", Arc::new(PreviewSlot::new()), None, None);
        ungrouped.attach();
        assert!(ungrouped.membership().is_detached());
    }

    #[test]
    fn test_redraw_needed_once_per_load() {
        let slot = Arc::new(PreviewSlot::new());
        let mut item = Item::new("wall1", slot.clone(), None, None);
        assert!(!item.check_redraw_needed());

        slot.set_failed("gone");
        assert!(item.check_redraw_needed());
        assert!(!item.check_redraw_needed());

        item.invalidate();
        assert!(item.check_redraw_needed());
        assert!(!item.check_redraw_needed());
    }

    #[test]
    fn test_mark_drawn_clears_pending_redraw() {
        let slot = Arc::new(PreviewSlot::new());
        let mut item = Item::new("wall1", slot.clone(), None, None);
        slot.set_failed("gone");
        item.invalidate();
        item.mark_drawn();
        assert!(!item.check_redraw_needed());
    }

    #[test]
    fn test_tag_downcast() {
        let tag: ItemTag = Arc::new(42_u32);
        let item = Item::new("wall1", Arc::new(PreviewSlot::new()), Some(tag), None)
            .with_tooltip("A wall");
        assert_eq!(item.tag_as::<u32>(), Some(&42));
        assert_eq!(item.tag_as::<String>(), None);
        assert_eq!(item.tooltip(), Some("A wall"));
    }
}
