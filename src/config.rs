//! Loads the project configuration from an `ogham.yaml` file.
//!
//! ```yaml
//! posts_directory: content   # relative to the project file
//! threads: 4
//! layout:
//!   header_height: 80
//!   margin: 20
//! ```

use crate::scroll::Layout;
use anyhow::{anyhow, Result};
use log::debug;
use serde::Deserialize;
use std::path::{Path, PathBuf};

pub const PROJECT_FILE: &str = "ogham.yaml";

const DEFAULT_POSTS_DIRECTORY: &str = "content";

#[derive(Deserialize, Default)]
#[serde(default)]
struct Project {
    posts_directory: Option<PathBuf>,
    threads: Option<usize>,
    layout: Layout,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub posts_directory: PathBuf,
    pub threads: usize,
    pub layout: Layout,
}

impl Config {
    /// Looks for `ogham.yaml` in `dir` and then in each of its ancestors. If
    /// there's none, the defaults are used with `dir` as the project root.
    pub fn from_directory(dir: &Path) -> Result<Config> {
        let mut current = Some(dir);
        while let Some(candidate) = current {
            let path = candidate.join(PROJECT_FILE);
            if path.is_file() {
                return Config::from_project_file(&path)
                    .map_err(|e| anyhow!("Loading configuration: {:?}", e));
            }
            current = candidate.parent();
        }
        debug!("no `{}` found; using defaults", PROJECT_FILE);
        Ok(Config::from_project(dir, Project::default()))
    }

    pub fn from_project_file(path: &Path) -> Result<Config> {
        use crate::util::open;
        let project: Project = serde_yaml::from_reader(open(path, "project")?)?;
        match path.parent() {
            None => Err(anyhow!(
                "Can't get parent directory for provided project file path '{:?}'",
                path
            )),
            Some(project_root) => {
                debug!("loaded `{}`", path.display());
                Ok(Config::from_project(project_root, project))
            }
        }
    }

    fn from_project(project_root: &Path, project: Project) -> Config {
        Config {
            posts_directory: project_root.join(
                project
                    .posts_directory
                    .unwrap_or_else(|| PathBuf::from(DEFAULT_POSTS_DIRECTORY)),
            ),
            threads: match project.threads {
                None => rayon::current_num_threads(),
                Some(threads) => threads,
            },
            layout: project.layout,
        }
    }
}
