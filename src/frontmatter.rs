//! Splits a raw post document into its YAML frontmatter and markdown body.
//!
//! A document is structured as follows:
//!
//! 1. Initial frontmatter fence (`---`)
//! 2. YAML frontmatter
//! 3. Terminal frontmatter fence (`---`) on its own line
//! 4. Body
//!
//! Documents that don't open with a fence have no frontmatter at all; their
//! whole text is the body.

use serde::de::DeserializeOwned;
use thiserror::Error;

const FENCE: &str = "---";

/// A parsed document: the deserialized frontmatter plus the body text that
/// follows it.
#[derive(Debug, Clone, PartialEq)]
pub struct Document<T> {
    pub data: T,
    pub content: String,
}

/// Parses `input` into a [`Document`]. An empty frontmatter block (or none
/// at all) yields `T::default()`.
pub fn parse<T>(input: &str) -> Result<Document<T>>
where
    T: DeserializeOwned + Default,
{
    let input = input.strip_prefix('\u{feff}').unwrap_or(input);
    let (yaml, body) = match split(input)? {
        Some(parts) => parts,
        None => {
            return Ok(Document {
                data: T::default(),
                content: input.to_owned(),
            })
        }
    };

    let data = if yaml.trim().is_empty() {
        T::default()
    } else {
        serde_yaml::from_str(yaml)?
    };

    Ok(Document {
        data,
        content: body.to_owned(),
    })
}

// Returns the YAML and body slices, or `None` if there's no opening fence.
fn split(input: &str) -> Result<Option<(&str, &str)>> {
    let first_line_end = input.find('\n').unwrap_or(input.len());
    if input[..first_line_end].trim_end() != FENCE {
        return Ok(None);
    }

    // The YAML starts on the line after the opening fence.
    let yaml_start = (first_line_end + 1).min(input.len());
    let mut line_start = yaml_start;
    while line_start < input.len() {
        let line_end = input[line_start..]
            .find('\n')
            .map(|offset| line_start + offset)
            .unwrap_or(input.len());
        if input[line_start..line_end].trim_end() == FENCE {
            let body_start = (line_end + 1).min(input.len());
            return Ok(Some((
                &input[yaml_start..line_start],
                &input[body_start..],
            )));
        }
        line_start = line_end + 1;
    }

    Err(Error::FrontmatterMissingEndFence)
}

/// Represents the result of a frontmatter parse.
pub type Result<T> = std::result::Result<T, Error>;

/// Represents an error splitting or deserializing frontmatter.
#[derive(Debug, Error)]
pub enum Error {
    /// Returned when the opening fence was found but the closing one was
    /// missing.
    #[error("missing closing `---`")]
    FrontmatterMissingEndFence,

    /// Returned when there was an error parsing the frontmatter as YAML.
    #[error("deserializing frontmatter: {0}")]
    DeserializeYaml(#[from] serde_yaml::Error),
}
