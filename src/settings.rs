// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

//! Run settings.
//!
//! Resolve where the repository and link manifest live, and which
//! directories to watch, from whatever the caller supplied.

use std::path::PathBuf;

/// Default repository root.
pub const DEFAULT_REPO_ROOT: &str = ".";

/// Default manifest file name at the repository root.
pub const DEFAULT_MANIFEST: &str = "dotbot.conf.yaml";

/// Resolved settings of one run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    /// Path inside the repository to discover it from.
    pub repo_root: PathBuf,

    /// Path to link manifest.
    pub manifest: PathBuf,

    /// Directories to restrict link updates to. Empty means everything.
    pub directories: Vec<PathBuf>,
}

impl Settings {
    /// Resolve settings, filling in defaults.
    ///
    /// Repository root defaults to [`DEFAULT_REPO_ROOT`]. Manifest defaults
    /// to [`DEFAULT_MANIFEST`] inside the repository root.
    pub fn resolve(
        repo_root: Option<PathBuf>,
        manifest: Option<PathBuf>,
        directories: Vec<PathBuf>,
    ) -> Self {
        let repo_root = repo_root.unwrap_or_else(|| PathBuf::from(DEFAULT_REPO_ROOT));
        let manifest = manifest.unwrap_or_else(|| repo_root.join(DEFAULT_MANIFEST));

        Self {
            repo_root,
            manifest,
            directories,
        }
    }
}
