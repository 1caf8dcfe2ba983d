//! The library code for the `ogham` blog engine. It covers the two parts of
//! the blog with real logic in them:
//!
//! 1. The content pipeline ([`crate::repository`]), which reads markdown
//!    posts from a content directory, splices referenced posts into one
//!    another, computes reading times, and lists the published posts most
//!    recent first.
//! 2. The outline ([`crate::outline`], [`crate::scroll`], [`crate::view`]),
//!    which follows the reader through a long post: which headings have
//!    been reached, and where the side panel listing them sits.
//!
//! Rendering, page chrome and styling belong to the host. The pipeline hands
//! it [`post::Post`]s and the outline hands it [`outline::OutlineItem`]s and
//! a [`scroll::PanelPosition`].

#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]

pub mod config;
pub mod frontmatter;
pub mod markdown;
pub mod outline;
pub mod post;
pub mod repository;
pub mod scroll;
mod util;
pub mod view;
