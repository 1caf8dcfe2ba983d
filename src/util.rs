use anyhow::{Context, Result};
use std::fs::File;
use std::path::Path;

/// Opens `path`, naming what kind of file it is in the error.
pub fn open(path: &Path, kind: &str) -> Result<File> {
    File::open(path)
        .with_context(|| format!("opening {} file `{}`", kind, path.display()))
}
