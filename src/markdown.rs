//! Pulls outline headings out of a markdown body. Rendering the markdown is
//! left to the host; this only needs to know which headings exist and in
//! what order.

use pulldown_cmark::{Event, Options, Parser, Tag, TagEnd};

use crate::outline::HeadingLevel;

/// A heading found in a markdown body.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Heading {
    pub title: String,
    pub level: HeadingLevel,
}

fn options() -> Options {
    let mut options = Options::empty();
    options.insert(Options::ENABLE_FOOTNOTES);
    options.insert(Options::ENABLE_STRIKETHROUGH);
    options.insert(Options::ENABLE_TABLES);
    options.insert(Options::ENABLE_TASKLISTS);
    options
}

/// Returns the `h2`-`h4` headings of `markdown` in document order. Heading
/// text is the concatenation of its text and inline code spans.
pub fn headings(markdown: &str) -> Vec<Heading> {
    let mut headings = Vec::new();
    // The level and text of the heading being read, if it's in the outline.
    let mut current: Option<(HeadingLevel, String)> = None;

    for event in Parser::new_ext(markdown, options()) {
        match event {
            Event::Start(Tag::Heading { level, .. }) => {
                current = HeadingLevel::try_from(level)
                    .ok()
                    .map(|level| (level, String::new()));
            }
            Event::Text(text) | Event::Code(text) => {
                if let Some((_, title)) = &mut current {
                    title.push_str(&text);
                }
            }
            Event::End(TagEnd::Heading(_)) => {
                if let Some((level, title)) = current.take() {
                    let title = title.trim();
                    if !title.is_empty() {
                        headings.push(Heading {
                            title: title.to_owned(),
                            level,
                        });
                    }
                }
            }
            _ => {}
        }
    }
    headings
}
