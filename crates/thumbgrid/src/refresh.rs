//! Preview redraw scheduling.
//!
//! While any visible item's preview is still loading, a low-frequency
//! repeating timer drives a sweep over the view. Each sweep repaints only the
//! on-screen rows whose preview settled (or that were invalidated) since they
//! were last drawn. Once every visible preview has settled the timer stops.

use std::time::Duration;

use thumbgrid_core::{TimerId, TimerManager};
use thumbgrid_core::logging::targets;

use crate::filter::ViewList;
use crate::item::Item;
use crate::surface::PresentationSurface;

/// What one sweep did.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SweepOutcome {
    /// Rows asked to repaint.
    pub redrawn: usize,
    /// Every visible preview has settled.
    pub all_loaded: bool,
}

/// Drives the redraw sweep from a repeating timer.
#[derive(Debug)]
pub struct RedrawScheduler {
    timers: TimerManager,
    timer: Option<TimerId>,
    interval: Duration,
}

impl RedrawScheduler {
    /// Create an inactive scheduler ticking every `interval`.
    pub fn new(interval: Duration) -> Self {
        Self {
            timers: TimerManager::new(),
            timer: None,
            interval,
        }
    }

    /// The tick period.
    #[inline]
    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Whether the tick timer is running.
    #[inline]
    pub fn is_active(&self) -> bool {
        self.timer.is_some_and(|id| self.timers.is_active(id))
    }

    /// Start ticking. Does nothing if already active.
    pub fn resume(&mut self) {
        if self.timer.is_none() {
            self.timer = Some(self.timers.start_repeating(self.interval));
            tracing::debug!(target: targets::REFRESH, interval = ?self.interval, "refresh resumed");
        }
    }

    /// Stop ticking. Does nothing if already inactive.
    pub fn suspend(&mut self) {
        if let Some(id) = self.timer.take() {
            if let Err(err) = self.timers.stop(id) {
                tracing::warn!(target: targets::REFRESH, %err, "refresh timer already gone");
            }
            tracing::debug!(target: targets::REFRESH, "refresh suspended");
        }
    }

    /// Consume expired timer fires. Returns `true` if at least one tick is
    /// due; several missed ticks collapse into one.
    pub fn take_due(&mut self) -> bool {
        let Some(id) = self.timer else {
            return false;
        };
        self.timers.process_expired().contains(&id)
    }

    /// Time until the next tick, if active.
    pub fn time_until_next(&mut self) -> Option<Duration> {
        self.timer?;
        self.timers.time_until_next()
    }

    /// Sweep the visible rows once.
    ///
    /// A row is repainted when its item needs a redraw and its box overlaps
    /// the surface's client region. The scheduler suspends itself when every
    /// visible preview has settled.
    pub fn sweep<S: PresentationSurface>(
        &mut self,
        items: &mut [Item],
        view: &ViewList,
        surface: &mut S,
    ) -> SweepOutcome {
        let client = surface.client_rect();
        let mut outcome = SweepOutcome {
            redrawn: 0,
            all_loaded: true,
        };

        for (row, &index) in view.catalog_indices().iter().enumerate() {
            let Some(item) = items.get_mut(index) else {
                continue;
            };
            outcome.all_loaded &= item.is_preview_loaded();

            if item.check_redraw_needed()
                && surface
                    .row_rect(row)
                    .is_some_and(|rect| rect.intersects(&client))
            {
                surface.redraw_rows(row, row);
                outcome.redrawn += 1;
            }
        }

        tracing::trace!(
            target: targets::REFRESH,
            redrawn = outcome.redrawn,
            all_loaded = outcome.all_loaded,
            "refresh sweep"
        );

        if outcome.all_loaded {
            self.suspend();
        }
        outcome
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use thumbgrid_core::Size;

    use super::*;
    use crate::config::BrowserConfig;
    use crate::filter::TextFilter;
    use crate::grid_surface::GridSurface;
    use crate::preview::PreviewSlot;
    use crate::surface::SurfaceRow;

    struct Fixture {
        slots: Vec<Arc<PreviewSlot>>,
        items: Vec<Item>,
        view: ViewList,
        surface: GridSurface,
    }

    /// `count` items in a 3-column grid with one visible line.
    fn fixture(count: usize) -> Fixture {
        let slots: Vec<_> = (0..count).map(|_| Arc::new(PreviewSlot::new())).collect();
        let items: Vec<Item> = slots
            .iter()
            .enumerate()
            .map(|(i, slot)| Item::new(format!("tex{i}"), slot.clone(), None, None))
            .collect();
        let view = ViewList::build(&items, &TextFilter::default());
        let mut surface = GridSurface::new(Size::new(248.0, 96.0), &BrowserConfig::default());
        surface.extend_rows(
            items
                .iter()
                .map(|item| SurfaceRow {
                    text: item.text().to_string(),
                    tooltip: None,
                    group: None,
                    preview: item.preview().clone(),
                })
                .collect(),
        );
        surface.take_redraw_requests();
        Fixture {
            slots,
            items,
            view,
            surface,
        }
    }

    #[test]
    fn test_sweep_redraws_only_settled_rows() {
        let mut f = fixture(3);
        let mut scheduler = RedrawScheduler::new(Duration::from_millis(100));
        scheduler.resume();

        let outcome = scheduler.sweep(&mut f.items, &f.view, &mut f.surface);
        assert_eq!(outcome.redrawn, 0);
        assert!(!outcome.all_loaded);

        f.slots[1].set_failed("gone");
        let outcome = scheduler.sweep(&mut f.items, &f.view, &mut f.surface);
        assert_eq!(outcome.redrawn, 1);
        assert_eq!(f.surface.take_redraw_requests(), vec![(1, 1)]);
        assert!(scheduler.is_active());
    }

    #[test]
    fn test_sweep_skips_offscreen_rows() {
        let mut f = fixture(6);
        let mut scheduler = RedrawScheduler::new(Duration::from_millis(100));

        // Row 4 sits on the second line, below the viewport.
        f.slots[4].set_failed("gone");
        let outcome = scheduler.sweep(&mut f.items, &f.view, &mut f.surface);
        assert_eq!(outcome.redrawn, 0);
        assert!(f.surface.take_redraw_requests().is_empty());
    }

    #[test]
    fn test_sweep_suspends_when_all_loaded() {
        let mut f = fixture(2);
        let mut scheduler = RedrawScheduler::new(Duration::from_millis(100));
        scheduler.resume();
        assert!(scheduler.time_until_next().is_some());

        for slot in &f.slots {
            slot.set_failed("gone");
        }
        let outcome = scheduler.sweep(&mut f.items, &f.view, &mut f.surface);
        assert!(outcome.all_loaded);
        assert_eq!(outcome.redrawn, 2);
        assert!(!scheduler.is_active());
        assert!(scheduler.time_until_next().is_none());
        assert!(!scheduler.take_due());
    }

    #[test]
    fn test_resume_and_suspend_are_idempotent() {
        let mut scheduler = RedrawScheduler::new(Duration::from_secs(60));
        scheduler.resume();
        scheduler.resume();
        assert!(scheduler.is_active());
        assert!(!scheduler.take_due());

        scheduler.suspend();
        scheduler.suspend();
        assert!(!scheduler.is_active());
    }
}
