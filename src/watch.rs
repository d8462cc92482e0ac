// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

//! Watch directory filtering.
//!
//! Restrict the set of newly added files to those living under at least one
//! __watch directory__. An empty set of watch directories watches the whole
//! repository.

use crate::path::{expand_in, is_under, resolve};

use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Ordered set of absolute watch directories.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct WatchDirs {
    dirs: Vec<PathBuf>,
}

impl WatchDirs {
    /// Construct new watch directory set.
    ///
    /// Each directory is resolved to absolute form relative to the current
    /// directory. Missing directories are kept, but will only match by their
    /// lexical form.
    pub fn new(dirs: impl IntoIterator<Item = impl AsRef<Path>>) -> Self {
        let dirs = dirs
            .into_iter()
            .map(|dir| {
                if !dir.as_ref().exists() {
                    warn!("watch directory {:?} does not exist", dir.as_ref().display());
                }
                resolve(dir)
            })
            .collect();

        Self { dirs }
    }

    /// Check if no watch directories were given.
    pub fn is_empty(&self) -> bool {
        self.dirs.is_empty()
    }

    /// Iterate through watch directories.
    pub fn iter(&self) -> impl Iterator<Item = &Path> {
        self.dirs.iter().map(PathBuf::as_path)
    }

    /// Check if absolute path lives under any watch directory.
    ///
    /// Always true for an empty watch directory set.
    pub fn watches(&self, path: impl AsRef<Path>) -> bool {
        self.is_empty() || self.dirs.iter().any(|dir| is_under(path.as_ref(), dir))
    }

    /// Keep only watched files.
    ///
    /// Files are given relative to the work tree, and are expanded against it
    /// before matching. Preserves the order of the incoming files.
    pub fn retain(
        &self,
        work_dir: impl AsRef<Path>,
        files: impl IntoIterator<Item = PathBuf>,
    ) -> Vec<PathBuf> {
        files
            .into_iter()
            .filter(|file| {
                let watched = self.watches(expand_in(file, work_dir.as_ref()));
                if !watched {
                    debug!("{:?} is not in any watch directory", file.display());
                }
                watched
            })
            .collect()
    }
}
