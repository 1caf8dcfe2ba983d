//! Defines the [`DocumentView`], the per-document context that heading
//! components register into and that the host's scroll events drive.
//!
//! The host owns the event loop. It calls [`DocumentView::mount`] when a
//! document is shown, forwards every scroll event to
//! [`DocumentView::on_scroll`], and calls [`DocumentView::unmount`] when the
//! document goes away. Nothing here blocks or locks: the host serializes all
//! calls.

use log::debug;

use crate::{
    outline::{HeadingLevel, OutlineItem, OutlineRegistry},
    scroll::{is_reached, Geometry, Layout, PanelPosition, ScrollTracker},
};

/// How the viewport should move when scrolled programmatically.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ScrollBehavior {
    Instant,
    Smooth,
}

/// The host runtime's viewport.
pub trait Viewport {
    /// Current measurements, or `None` when there's no live viewport (e.g.,
    /// headless rendering).
    fn geometry(&self) -> Option<Geometry>;

    /// Scrolls the viewport so `y` is at the top.
    fn scroll_to(&mut self, y: f64, behavior: ScrollBehavior);
}

/// The outline state for one document view.
#[derive(Clone, Debug)]
pub struct DocumentView {
    registry: OutlineRegistry,
    tracker: ScrollTracker,
    listening: bool,
}

impl DocumentView {
    pub fn new(layout: Layout) -> DocumentView {
        DocumentView {
            registry: OutlineRegistry::new(),
            tracker: ScrollTracker::new(layout),
            listening: false,
        }
    }

    /// Starts a new document: clears anything left from the previous one and
    /// starts listening for scroll events. `outline_height` is the rendered
    /// height of the outline panel (`0` if not measured yet). Mounting an
    /// already mounted view starts over with a single listener.
    pub fn mount(&mut self, outline_height: f64) {
        self.registry.reset();
        self.tracker.reset();
        self.tracker.set_outline_height(outline_height);
        self.listening = true;
        debug!("document view mounted");
    }

    /// Stops listening for scroll events and drops the outline.
    pub fn unmount(&mut self) {
        self.listening = false;
        self.registry.reset();
        self.tracker.reset();
        debug!("document view unmounted");
    }

    pub fn is_listening(&self) -> bool {
        self.listening
    }

    /// Called by a heading as it renders. The reached state is computed
    /// from the viewport's current scroll position; without a viewport the
    /// heading starts unreached.
    pub fn register_heading(
        &mut self,
        title: &str,
        level: HeadingLevel,
        offset_top: f64,
        viewport: &dyn Viewport,
    ) {
        let reached = viewport.geometry().map_or(false, |g| {
            is_reached(g.scroll_y, self.tracker.layout().lead_margin, offset_top)
        });
        self.registry
            .register_heading(title, level, offset_top, reached);
    }

    pub fn set_outline_height(&mut self, outline_height: f64) {
        self.tracker.set_outline_height(outline_height);
    }

    /// Handles a scroll event. Returns whether the outline or panel was
    /// recomputed; events while unmounted or without a viewport are
    /// ignored.
    pub fn on_scroll(&mut self, viewport: &dyn Viewport) -> bool {
        if !self.listening {
            return false;
        }
        match viewport.geometry() {
            Some(geometry) => self.tracker.track(&geometry, &mut self.registry),
            None => false,
        }
    }

    /// Scrolls smoothly to the heading titled `title`. Returns `false` if
    /// there's no such heading.
    pub fn navigate(&self, title: &str, viewport: &mut dyn Viewport) -> bool {
        match self.registry.get(title) {
            Some(item) => {
                viewport.scroll_to(item.offset_top, ScrollBehavior::Smooth);
                true
            }
            None => false,
        }
    }

    pub fn outline(&self) -> &[OutlineItem] {
        self.registry.get_outline()
    }

    pub fn panel_position(&self) -> PanelPosition {
        self.tracker.position()
    }

    pub fn layout(&self) -> &Layout {
        self.tracker.layout()
    }
}
