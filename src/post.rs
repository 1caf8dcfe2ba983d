//! Defines the [`Post`] type and its projections ([`PostDescription`],
//! [`StaticPath`]), along with the derived values computed from a post's
//! composed content.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// The reading speed used for [`reading_time_in_minutes`].
pub const WORDS_PER_MINUTE: f64 = 200.0;

/// Metadata parsed from a post's frontmatter. Every field is optional;
/// consumers render whatever is present.
#[derive(Deserialize, Serialize, Clone, Debug, Default, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub struct PostMeta {
    pub title: Option<String>,

    /// ISO-8601 date (e.g., `2021-04-16`). Compared as a string.
    pub date: Option<String>,

    pub author: Option<String>,

    /// URL or path of the cover image.
    pub image: Option<String>,

    pub tags: Option<String>,

    /// Unpublished posts are left out of listings but can still be looked
    /// up directly.
    pub is_published: Option<bool>,

    /// The id of another post whose content is spliced in at every
    /// `{{<id>}}` placeholder.
    pub include_references: Option<String>,
}

impl PostMeta {
    pub fn is_published(&self) -> bool {
        self.is_published.unwrap_or(false)
    }
}

/// A post with its references resolved and its reading time computed.
#[derive(Serialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Post {
    /// The source file name less the `.md` extension.
    pub id: String,

    #[serde(flatten)]
    pub meta: PostMeta,

    /// The markdown body after reference substitution.
    pub content: String,

    pub reading_time_in_minutes: u32,
}

impl Post {
    /// Builds a [`Post`] from its parts, deriving the reading time from the
    /// (already composed) `content`.
    pub fn new(id: String, meta: PostMeta, content: String) -> Post {
        Post {
            reading_time_in_minutes: reading_time_in_minutes(&content),
            id,
            meta,
            content,
        }
    }

    pub fn is_published(&self) -> bool {
        self.meta.is_published()
    }

    /// The post date formatted for display (e.g., `April 16, 2021`), or
    /// `None` if the post has no date or it isn't a valid ISO date.
    pub fn display_date(&self) -> Option<String> {
        let date = self.meta.date.as_deref()?;
        // Accept full timestamps too; only the date part is displayed.
        let day = date.get(..10).unwrap_or(date);
        NaiveDate::parse_from_str(day, "%Y-%m-%d")
            .ok()
            .map(|d| d.format("%B %-d, %Y").to_string())
    }

    /// Projects the post onto its [`PostDescription`].
    pub fn description(&self) -> PostDescription {
        PostDescription {
            id: self.id.clone(),
            meta: self.meta.clone(),
            reading_time_in_minutes: self.reading_time_in_minutes,
        }
    }
}

/// Everything about a [`Post`] except its body. This is what listing pages
/// render.
#[derive(Serialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PostDescription {
    pub id: String,

    #[serde(flatten)]
    pub meta: PostMeta,

    pub reading_time_in_minutes: u32,
}

/// One page to pre-render, identified by post id.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct StaticPath {
    pub id: String,
}

/// Estimates the reading time of `content` at [`WORDS_PER_MINUTE`]. Words
/// are whatever lies between single spaces, so runs of spaces and
/// newline-separated words are counted as-is.
pub fn reading_time_in_minutes(content: &str) -> u32 {
    let words = content.split(' ').count();
    (words as f64 / WORDS_PER_MINUTE).round() as u32
}

/// The token which, in a post body, is replaced by the content of post `id`.
pub fn placeholder(id: &str) -> String {
    format!("{{{{{}}}}}", id)
}
