//! Defines the [`PostRepository`], which loads [`Post`]s from a content
//! directory, splices referenced posts into one another, and produces the
//! published listing.

use std::{
    fs,
    io,
    path::{Path, PathBuf},
};

use log::{debug, info};
use rayon::prelude::*;
use thiserror::Error;
use walkdir::WalkDir;

use crate::{
    frontmatter,
    post::{placeholder, Post, PostDescription, PostMeta, StaticPath},
};

const MARKDOWN_EXTENSION: &str = "md";

/// Reads posts from a single content directory. Every `{id}.md` file
/// directly inside `posts_directory` is one post.
pub struct PostRepository {
    posts_directory: PathBuf,

    /// The number of threads used to parse posts in [`Self::list_posts`].
    /// Anything below 2 parses on the calling thread.
    threads: usize,
}

impl PostRepository {
    pub fn new(posts_directory: impl Into<PathBuf>) -> PostRepository {
        PostRepository {
            posts_directory: posts_directory.into(),
            threads: 1,
        }
    }

    pub fn with_threads(mut self, threads: usize) -> PostRepository {
        self.threads = threads;
        self
    }

    pub fn posts_directory(&self) -> &Path {
        &self.posts_directory
    }

    /// Returns every published post, most recent first. Posts without a
    /// date sort last. The sort is stable and the directory is enumerated
    /// in file-name order, so ties come out in the same order on every run.
    pub fn list_posts(&self) -> Result<Vec<Post>> {
        let ids = self.post_ids()?;
        let mut posts = if self.threads < 2 {
            ids.iter()
                .map(|id| self.get_post(id))
                .collect::<Result<Vec<Post>>>()?
        } else {
            rayon::ThreadPoolBuilder::new()
                .num_threads(self.threads)
                .build()?
                .install(|| {
                    ids.par_iter()
                        .map(|id| self.get_post(id))
                        .collect::<Result<Vec<Post>>>()
                })?
        };

        let total = posts.len();
        posts.retain(Post::is_published);
        posts.sort_by(|a, b| date_key(b).cmp(date_key(a)));
        info!(
            "listed {} published posts ({} unpublished) from `{}`",
            posts.len(),
            total - posts.len(),
            self.posts_directory.display()
        );
        Ok(posts)
    }

    /// Same as [`Self::list_posts`], without the post bodies.
    pub fn list_descriptions(&self) -> Result<Vec<PostDescription>> {
        Ok(self.list_posts()?.iter().map(Post::description).collect())
    }

    /// One entry per published post, in listing order, for pre-rendering.
    pub fn static_paths(&self) -> Result<Vec<StaticPath>> {
        Ok(self
            .list_posts()?
            .into_iter()
            .map(|p| StaticPath { id: p.id })
            .collect())
    }

    /// Loads the post with the given `id`, published or not.
    pub fn get_post(&self, id: &str) -> Result<Post> {
        let mut in_progress = Vec::new();
        let (meta, content) = self.resolve(id, &mut in_progress)?;
        Ok(Post::new(id.to_owned(), meta, content))
    }

    // Loads `id` and recursively splices in its `includeReferences` post.
    // `in_progress` holds the chain of ids currently being resolved.
    fn resolve(
        &self,
        id: &str,
        in_progress: &mut Vec<String>,
    ) -> Result<(PostMeta, String)> {
        if in_progress.iter().any(|seen| seen == id) {
            let mut chain = in_progress.clone();
            chain.push(id.to_owned());
            return Err(Error::CyclicReference { chain });
        }

        let doc = self.load(id)?;
        let mut content = doc.content;
        if let Some(reference) = &doc.data.include_references {
            in_progress.push(id.to_owned());
            let (_, referenced) = self.resolve(reference, in_progress)?;
            in_progress.pop();
            debug!("splicing `{}` into `{}`", reference, id);
            content = content.replace(&placeholder(reference), &referenced);
        }
        Ok((doc.data, content))
    }

    fn load(&self, id: &str) -> Result<frontmatter::Document<PostMeta>> {
        if id.is_empty()
            || id == ".."
            || id.chars().any(std::path::is_separator)
        {
            return Err(Error::NotFound { id: id.to_owned() });
        }

        let path = self
            .posts_directory
            .join(format!("{}.{}", id, MARKDOWN_EXTENSION));
        let input = match fs::read_to_string(&path) {
            Ok(input) => input,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                return Err(Error::NotFound { id: id.to_owned() })
            }
            Err(e) => return Err(Error::Io { path, err: e }),
        };
        debug!("loaded `{}`", path.display());

        frontmatter::parse(&input).map_err(|err| Error::Parse { path, err })
    }

    // Enumerates post ids in file-name order. A missing content directory is
    // fatal.
    fn post_ids(&self) -> Result<Vec<String>> {
        if !self.posts_directory.is_dir() {
            return Err(Error::ContentDirectory {
                path: self.posts_directory.clone(),
                err: io::Error::new(
                    io::ErrorKind::NotFound,
                    "not a readable directory",
                ),
            });
        }

        let mut ids = Vec::new();
        for result in WalkDir::new(&self.posts_directory)
            .min_depth(1)
            .max_depth(1)
            .sort_by_file_name()
        {
            let entry = result?;
            let path = entry.path();
            let is_markdown = path
                .extension()
                .map_or(false, |ext| ext == MARKDOWN_EXTENSION);
            // `Path::is_file` follows symlinks; the entry's own file type
            // doesn't.
            if !path.is_file() || !is_markdown {
                debug!("skipping `{}`", path.display());
                continue;
            }
            match path.file_stem().and_then(|stem| stem.to_str()) {
                Some(stem) => ids.push(stem.to_owned()),
                None => return Err(Error::InvalidFileName(path.to_owned())),
            }
        }
        Ok(ids)
    }
}

// Undated posts compare lowest, so they come last in a descending sort.
fn date_key(post: &Post) -> &str {
    post.meta.date.as_deref().unwrap_or("")
}

/// Represents the result of a repository operation.
pub type Result<T> = std::result::Result<T, Error>;

/// Represents an error loading posts.
#[derive(Debug, Error)]
pub enum Error {
    /// Returned when there is no source file for the requested post id.
    #[error("post `{id}` not found")]
    NotFound { id: String },

    /// Returned when a post (transitively) includes itself. `chain` lists
    /// the ids from the outermost post to the repeated one.
    #[error("cyclic reference: {}", chain.join(" -> "))]
    CyclicReference { chain: Vec<String> },

    /// Returned when a post's frontmatter can't be parsed.
    #[error("parsing post `{}`: {err}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        err: frontmatter::Error,
    },

    /// Returned when the content directory is missing or unreadable.
    #[error("reading content directory `{}`: {err}", path.display())]
    ContentDirectory {
        path: PathBuf,
        #[source]
        err: io::Error,
    },

    /// Returned when a post file exists but can't be read.
    #[error("reading `{}`: {err}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        err: io::Error,
    },

    /// Returned for WalkDir I/O errors.
    #[error(transparent)]
    WalkDir(#[from] walkdir::Error),

    /// Returned when a post file name isn't valid UTF-8.
    #[error("invalid file name: {0:?}")]
    InvalidFileName(PathBuf),

    /// Returned when the parsing thread pool can't be started.
    #[error(transparent)]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),
}

#[cfg(test)]
mod test {
    use super::*;
    use tempfile::TempDir;

    fn write_posts(posts: &[(&str, &str)]) -> io::Result<TempDir> {
        let dir = tempfile::tempdir()?;
        for (name, contents) in posts {
            fs::write(dir.path().join(name), contents)?;
        }
        Ok(dir)
    }

    fn published(date: &str, body: &str) -> String {
        format!("---\ndate: {}\nisPublished: true\n---\n{}", date, body)
    }

    fn ids(posts: &[Post]) -> Vec<&str> {
        posts.iter().map(|p| p.id.as_str()).collect()
    }

    #[test]
    fn test_list_posts_filters_unpublished() -> anyhow::Result<()> {
        let dir = write_posts(&[
            ("a.md", &published("2021-01-01", "a")),
            ("b.md", "---\ndate: 2021-01-02\nisPublished: false\n---\nb"),
            ("c.md", "---\ndate: 2021-01-03\n---\nc"),
        ])?;
        let posts = PostRepository::new(dir.path()).list_posts()?;
        assert_eq!(vec!["a"], ids(&posts));
        Ok(())
    }

    #[test]
    fn test_list_posts_sorts_by_date_descending() -> anyhow::Result<()> {
        let dir = write_posts(&[
            ("old.md", &published("2019-05-01", "")),
            ("new.md", &published("2022-05-01", "")),
            ("mid.md", &published("2020-05-01", "")),
            ("undated.md", "---\nisPublished: true\n---\n"),
        ])?;
        let posts = PostRepository::new(dir.path()).list_posts()?;
        assert_eq!(vec!["new", "mid", "old", "undated"], ids(&posts));
        Ok(())
    }

    #[test]
    fn test_list_posts_ties_keep_file_name_order() -> anyhow::Result<()> {
        let dir = write_posts(&[
            ("c.md", &published("2021-01-01", "")),
            ("a.md", &published("2021-01-01", "")),
            ("b.md", &published("2021-01-01", "")),
        ])?;
        let repository = PostRepository::new(dir.path());
        for _ in 0..3 {
            assert_eq!(vec!["a", "b", "c"], ids(&repository.list_posts()?));
        }
        Ok(())
    }

    #[test]
    fn test_list_posts_parallel_matches_sequential() -> anyhow::Result<()> {
        let names: Vec<(String, String)> = (0..20)
            .map(|i| {
                (
                    format!("post-{:02}.md", i),
                    published(&format!("2021-01-{:02}", i % 4 + 1), "body"),
                )
            })
            .collect();
        let borrowed: Vec<(&str, &str)> = names
            .iter()
            .map(|(n, c)| (n.as_str(), c.as_str()))
            .collect();
        let dir = write_posts(&borrowed)?;

        let sequential = PostRepository::new(dir.path()).list_posts()?;
        let parallel = PostRepository::new(dir.path())
            .with_threads(4)
            .list_posts()?;
        assert_eq!(sequential, parallel);
        Ok(())
    }

    #[test]
    fn test_list_posts_skips_non_markdown() -> anyhow::Result<()> {
        let dir = write_posts(&[
            ("a.md", &published("2021-01-01", "")),
            ("notes.txt", "not a post"),
        ])?;
        fs::create_dir(dir.path().join("drafts.md"))?;
        let posts = PostRepository::new(dir.path()).list_posts()?;
        assert_eq!(vec!["a"], ids(&posts));
        Ok(())
    }

    #[cfg(unix)]
    #[test]
    fn test_list_posts_includes_symlinked_posts() -> anyhow::Result<()> {
        let elsewhere = write_posts(&[("shared.md", &published("2021-01-01", "s"))])?;
        let dir = write_posts(&[])?;
        std::os::unix::fs::symlink(
            elsewhere.path().join("shared.md"),
            dir.path().join("linked.md"),
        )?;
        std::os::unix::fs::symlink(
            elsewhere.path().join("missing.md"),
            dir.path().join("dangling.md"),
        )?;

        let repository = PostRepository::new(dir.path());
        assert_eq!(vec!["linked"], ids(&repository.list_posts()?));
        assert_eq!("s", repository.get_post("linked")?.content);
        Ok(())
    }

    #[cfg(unix)]
    #[test]
    fn test_list_posts_accepts_backslash_in_file_name() -> anyhow::Result<()> {
        let dir = write_posts(&[
            ("a\\b.md", &published("2021-01-01", "odd")),
            ("c.md", &published("2021-01-02", "")),
        ])?;
        let repository = PostRepository::new(dir.path());
        assert_eq!(vec!["c", "a\\b"], ids(&repository.list_posts()?));
        assert_eq!("odd", repository.get_post("a\\b")?.content);
        Ok(())
    }

    #[test]
    fn test_list_posts_missing_directory_is_fatal() -> anyhow::Result<()> {
        let dir = tempfile::tempdir()?;
        let result = PostRepository::new(dir.path().join("nope")).list_posts();
        assert!(matches!(result, Err(Error::ContentDirectory { .. })));
        Ok(())
    }

    #[test]
    fn test_list_posts_propagates_parse_failure() -> anyhow::Result<()> {
        let dir = write_posts(&[("bad.md", "---\ntitle: [x\n---\n")])?;
        let result = PostRepository::new(dir.path()).list_posts();
        assert!(matches!(result, Err(Error::Parse { .. })));
        Ok(())
    }

    #[test]
    fn test_get_post_returns_unpublished() -> anyhow::Result<()> {
        let dir = write_posts(&[(
            "draft.md",
            "---\ntitle: Draft\nisPublished: false\n---\nwip",
        )])?;
        let post = PostRepository::new(dir.path()).get_post("draft")?;
        assert_eq!("draft", post.id);
        assert_eq!(Some("Draft".to_owned()), post.meta.title);
        assert!(!post.is_published());
        assert_eq!("wip", post.content);
        Ok(())
    }

    #[test]
    fn test_get_post_not_found() -> anyhow::Result<()> {
        let dir = write_posts(&[])?;
        let repository = PostRepository::new(dir.path());
        for id in ["missing", "", "../etc/passwd", ".."] {
            match repository.get_post(id) {
                Err(Error::NotFound { id: found }) => assert_eq!(id, found),
                other => panic!("wanted NotFound for {:?}; found {:?}", id, other),
            }
        }
        Ok(())
    }

    #[test]
    fn test_get_post_splices_reference() -> anyhow::Result<()> {
        let dir = write_posts(&[
            ("A.md", "---\nincludeReferences: B\n---\nx {{B}} y"),
            ("B.md", "---\n---\nz"),
        ])?;
        let post = PostRepository::new(dir.path()).get_post("A")?;
        assert_eq!("x z y", post.content);
        Ok(())
    }

    #[test]
    fn test_get_post_splices_every_occurrence() -> anyhow::Result<()> {
        let dir = write_posts(&[
            ("a.md", "---\nincludeReferences: b\n---\n{{b}}-{{b}}"),
            ("b.md", "q"),
        ])?;
        let post = PostRepository::new(dir.path()).get_post("a")?;
        assert_eq!("q-q", post.content);
        Ok(())
    }

    #[test]
    fn test_get_post_resolves_reference_chains() -> anyhow::Result<()> {
        let dir = write_posts(&[
            ("a.md", "---\nincludeReferences: b\n---\n[{{b}}]"),
            ("b.md", "---\nincludeReferences: c\n---\n({{c}})"),
            ("c.md", "---\n---\nleaf"),
        ])?;
        let post = PostRepository::new(dir.path()).get_post("a")?;
        assert_eq!("[(leaf)]", post.content);
        Ok(())
    }

    #[test]
    fn test_get_post_detects_cycles() -> anyhow::Result<()> {
        let dir = write_posts(&[
            ("a.md", "---\nincludeReferences: b\n---\n{{b}}"),
            ("b.md", "---\nincludeReferences: a\n---\n{{a}}"),
            ("self.md", "---\nincludeReferences: self\n---\n{{self}}"),
        ])?;
        let repository = PostRepository::new(dir.path());
        match repository.get_post("a") {
            Err(Error::CyclicReference { chain }) => {
                assert_eq!(vec!["a", "b", "a"], chain)
            }
            other => panic!("wanted CyclicReference; found {:?}", other),
        }
        assert!(matches!(
            repository.get_post("self"),
            Err(Error::CyclicReference { .. })
        ));
        Ok(())
    }

    #[test]
    fn test_get_post_missing_reference() -> anyhow::Result<()> {
        let dir = write_posts(&[(
            "a.md",
            "---\nincludeReferences: ghost\n---\n{{ghost}}",
        )])?;
        match PostRepository::new(dir.path()).get_post("a") {
            Err(Error::NotFound { id }) => assert_eq!("ghost", id),
            other => panic!("wanted NotFound; found {:?}", other),
        }
        Ok(())
    }

    #[test]
    fn test_reading_time_counts_spliced_content() -> anyhow::Result<()> {
        let half = vec!["w"; 200].join(" ");
        let dir = write_posts(&[
            (
                "a.md",
                &format!("---\nincludeReferences: b\n---\n{} {{{{b}}}}", half),
            ),
            ("b.md", &vec!["w"; 200].join(" ")),
        ])?;
        let post = PostRepository::new(dir.path()).get_post("a")?;
        assert_eq!(400, post.content.split(' ').count());
        assert_eq!(2, post.reading_time_in_minutes);
        Ok(())
    }

    #[test]
    fn test_static_paths_and_descriptions() -> anyhow::Result<()> {
        let dir = write_posts(&[
            ("a.md", &published("2021-01-01", "a")),
            ("b.md", &published("2021-02-01", "b")),
            ("hidden.md", "hidden"),
        ])?;
        let repository = PostRepository::new(dir.path());
        assert_eq!(
            vec![
                StaticPath { id: "b".to_owned() },
                StaticPath { id: "a".to_owned() }
            ],
            repository.static_paths()?
        );
        let descriptions = repository.list_descriptions()?;
        assert_eq!(2, descriptions.len());
        assert_eq!("b", descriptions[0].id);
        Ok(())
    }

    #[test]
    fn test_testdata_corpus() -> Result<()> {
        let repository = PostRepository::new("./testdata/posts");
        let posts = repository.list_posts()?;
        assert_eq!(vec!["outlines", "hello-world"], ids(&posts));
        assert!(posts[0].content.contains("Every post ends the same way."));

        let draft = repository.get_post("drafting")?;
        assert!(!draft.is_published());
        Ok(())
    }
}
