//! Defines the [`OutlineRegistry`], which collects a document's headings as
//! they render and exposes them, in order, to the outline panel.

use std::fmt;

/// The heading depths that appear in an outline. Post titles are `h1`, so
/// the outline starts at `h2`; anything below `h4` is left out.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum HeadingLevel {
    H2,
    H3,
    H4,
}

/// Per-level panel rendering: (markup tag, indentation in pixels).
const LEVEL_STYLES: [(&str, u32); 3] = [("h2", 0), ("h3", 12), ("h4", 24)];

impl HeadingLevel {
    fn index(self) -> usize {
        match self {
            HeadingLevel::H2 => 0,
            HeadingLevel::H3 => 1,
            HeadingLevel::H4 => 2,
        }
    }

    /// The numeric depth (2, 3 or 4).
    pub fn depth(self) -> u8 {
        self.index() as u8 + 2
    }

    pub fn tag(self) -> &'static str {
        LEVEL_STYLES[self.index()].0
    }

    /// How far the panel entry is indented relative to an `h2` entry.
    pub fn indent(self) -> u32 {
        LEVEL_STYLES[self.index()].1
    }
}

impl TryFrom<u8> for HeadingLevel {
    type Error = UnsupportedLevel;

    fn try_from(depth: u8) -> Result<Self, Self::Error> {
        match depth {
            2 => Ok(HeadingLevel::H2),
            3 => Ok(HeadingLevel::H3),
            4 => Ok(HeadingLevel::H4),
            _ => Err(UnsupportedLevel(depth)),
        }
    }
}

impl TryFrom<pulldown_cmark::HeadingLevel> for HeadingLevel {
    type Error = UnsupportedLevel;

    fn try_from(level: pulldown_cmark::HeadingLevel) -> Result<Self, Self::Error> {
        HeadingLevel::try_from(level as u8)
    }
}

impl fmt::Display for HeadingLevel {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.tag())
    }
}

/// Returned when a heading depth has no [`HeadingLevel`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, thiserror::Error)]
#[error("heading level {0} is not part of the outline")]
pub struct UnsupportedLevel(pub u8);

/// One heading in a document's outline.
#[derive(Clone, Debug, PartialEq)]
pub struct OutlineItem {
    /// The heading text. Unique within an outline.
    pub title: String,
    pub level: HeadingLevel,

    /// Pixels from the top of the document.
    pub offset_top: f64,

    /// Whether the reader has scrolled to (or past) the heading.
    pub is_reached: bool,
}

/// The headings of the document currently in view, keyed by title and kept
/// in first-registration order. Registering a title that's already present
/// replaces that entry in place, so two headings with the same text share
/// one entry.
///
/// A registry belongs to a single document view; call [`Self::reset`] when a
/// new document mounts.
#[derive(Clone, Debug, Default)]
pub struct OutlineRegistry {
    items: Vec<OutlineItem>,
}

impl OutlineRegistry {
    pub fn new() -> OutlineRegistry {
        OutlineRegistry::default()
    }

    /// Inserts or replaces the entry for `title`.
    pub fn register_heading(
        &mut self,
        title: &str,
        level: HeadingLevel,
        offset_top: f64,
        is_reached: bool,
    ) {
        let item = OutlineItem {
            title: title.to_owned(),
            level,
            offset_top,
            is_reached,
        };
        match self.items.iter_mut().find(|i| i.title == title) {
            Some(existing) => *existing = item,
            None => self.items.push(item),
        }
    }

    pub fn get_outline(&self) -> &[OutlineItem] {
        &self.items
    }

    pub fn get(&self, title: &str) -> Option<&OutlineItem> {
        self.items.iter().find(|i| i.title == title)
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn reset(&mut self) {
        self.items.clear();
    }

    /// Recomputes every entry's reached state with `is_reached`. Returns
    /// whether anything changed.
    pub(crate) fn update_reached(
        &mut self,
        is_reached: impl Fn(&OutlineItem) -> bool,
    ) -> bool {
        let mut changed = false;
        for item in &mut self.items {
            let reached = is_reached(item);
            if reached != item.is_reached {
                item.is_reached = reached;
                changed = true;
            }
        }
        changed
    }
}
