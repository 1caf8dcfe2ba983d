//! Scroll tracking for a document view: which headings the reader has
//! reached, and where the outline panel sits.
//!
//! The panel flows with the page until the header has scrolled out of view.
//! After that it's pinned `margin` pixels from the top of the viewport,
//! except near the end of the document where it's pushed up so it never
//! covers the footer:
//!
//! ```text
//! visible_footer = max(scroll_y + viewport_height - document_height
//!                      + footer_height + content_bottom_margin, 0)
//! top            = min(viewport_height - outline_height - visible_footer,
//!                      margin)
//! ```

use log::{trace, warn};
use serde::Deserialize;

use crate::outline::OutlineRegistry;

/// The fixed page measurements the tracker works with, in pixels.
#[derive(Deserialize, Clone, Copy, Debug, PartialEq)]
#[serde(default)]
pub struct Layout {
    pub header_height: f64,
    pub footer_height: f64,

    /// Gap between the pinned panel and the top of the viewport.
    pub margin: f64,

    /// Space between the end of the post and the footer.
    pub content_bottom_margin: f64,

    /// Width of the centered content column. The panel takes half of what's
    /// left.
    pub center_column_width: f64,

    /// How far ahead of a heading the reader counts as having reached it.
    pub lead_margin: f64,
}

impl Default for Layout {
    fn default() -> Self {
        Layout {
            header_height: 80.0,
            footer_height: 100.0,
            margin: 20.0,
            content_bottom_margin: 80.0,
            center_column_width: 680.0,
            lead_margin: 20.0,
        }
    }
}

/// A snapshot of the viewport and document measurements.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Geometry {
    pub scroll_y: f64,
    pub viewport_height: f64,
    pub viewport_width: f64,
    pub document_height: f64,
}

impl Geometry {
    fn is_degenerate(&self) -> bool {
        !(self.scroll_y.is_finite()
            && self.viewport_height.is_finite()
            && self.viewport_width.is_finite()
            && self.document_height.is_finite())
            || self.viewport_height <= 0.0
    }
}

/// Where the outline panel is drawn.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum PanelPosition {
    /// Laid out with the rest of the page.
    Flowing,

    /// Fixed to the viewport.
    Pinned {
        /// Pixels from the top of the viewport. Negative once the footer
        /// pushes the panel past the top edge.
        top: f64,

        /// The side gutter width in pixels.
        width: f64,
    },
}

impl PanelPosition {
    /// The panel's top offset; `0` while flowing.
    pub fn top(&self) -> f64 {
        match self {
            PanelPosition::Flowing => 0.0,
            PanelPosition::Pinned { top, .. } => *top,
        }
    }

    pub fn is_pinned(&self) -> bool {
        matches!(self, PanelPosition::Pinned { .. })
    }

    /// Inline CSS for the panel container.
    pub fn style(&self, layout: &Layout) -> String {
        match self {
            PanelPosition::Flowing => String::new(),
            PanelPosition::Pinned { top, .. } => format!(
                "position: fixed; top: {}px; width: calc((100% - {}px) / 2);",
                top, layout.center_column_width
            ),
        }
    }
}

/// Whether a heading at `offset_top` counts as reached at `scroll_y`.
pub fn is_reached(scroll_y: f64, lead_margin: f64, offset_top: f64) -> bool {
    scroll_y + lead_margin > offset_top
}

/// Computes the panel position for `geometry`. Degenerate measurements
/// (an empty viewport, an unmeasured panel) leave the panel flowing.
pub fn panel_position(
    layout: &Layout,
    geometry: &Geometry,
    outline_height: f64,
) -> PanelPosition {
    if geometry.is_degenerate()
        || !outline_height.is_finite()
        || outline_height <= 0.0
    {
        return PanelPosition::Flowing;
    }

    if geometry.scroll_y <= layout.header_height - layout.margin {
        return PanelPosition::Flowing;
    }

    let visible_footer = (geometry.scroll_y + geometry.viewport_height
        - geometry.document_height
        + layout.footer_height
        + layout.content_bottom_margin)
        .max(0.0);
    let top = (geometry.viewport_height - outline_height - visible_footer)
        .min(layout.margin);
    let width =
        ((geometry.viewport_width - layout.center_column_width) / 2.0).max(0.0);
    PanelPosition::Pinned { top, width }
}

/// Per-view scroll state: the last panel position and the geometry it was
/// computed from.
#[derive(Clone, Debug)]
pub struct ScrollTracker {
    layout: Layout,
    outline_height: f64,
    position: PanelPosition,
    last: Option<Geometry>,
}

impl ScrollTracker {
    pub fn new(layout: Layout) -> ScrollTracker {
        ScrollTracker {
            layout,
            outline_height: 0.0,
            position: PanelPosition::Flowing,
            last: None,
        }
    }

    pub fn layout(&self) -> &Layout {
        &self.layout
    }

    pub fn position(&self) -> PanelPosition {
        self.position
    }

    /// Records the rendered panel height. Until this is set to something
    /// positive the panel stays flowing.
    pub fn set_outline_height(&mut self, outline_height: f64) {
        self.outline_height = outline_height;
        self.last = None;
    }

    /// Back to the top-of-document state.
    pub fn reset(&mut self) {
        self.position = PanelPosition::Flowing;
        self.last = None;
    }

    /// Handles one scroll event: recomputes every heading's reached state
    /// and the panel position. Returns `false` without doing anything if
    /// `geometry` is the same as last time.
    pub fn track(
        &mut self,
        geometry: &Geometry,
        registry: &mut OutlineRegistry,
    ) -> bool {
        if self.last.as_ref() == Some(geometry) {
            return false;
        }
        self.last = Some(*geometry);

        if geometry.is_degenerate() {
            warn!("degenerate viewport geometry {:?}", geometry);
        }

        let lead_margin = self.layout.lead_margin;
        let scroll_y = geometry.scroll_y;
        registry.update_reached(|item| {
            is_reached(scroll_y, lead_margin, item.offset_top)
        });
        self.position =
            panel_position(&self.layout, geometry, self.outline_height);
        trace!("scroll_y={} panel={:?}", scroll_y, self.position);
        true
    }
}
