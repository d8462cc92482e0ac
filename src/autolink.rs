// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

//! Automatic link manifest updates.
//!
//! Ties the staging area, watch directories, and link manifest together:
//!
//! 1. Read files newly added to the index relative to HEAD.
//! 2. Keep the ones living in a watch directory.
//! 3. Derive a link for each of them, e.g., "shell/bashrc" becomes
//!    "~/.bashrc: shell/bashrc".
//! 4. Append the links the manifest does not have yet, and stage the
//!    manifest so the links ride along with the commit being made.
//!
//! The manifest is neither rewritten nor staged when there is nothing new to
//! link, so a commit never picks up a spurious manifest change.

use crate::{
    manifest::{Link, ManifestFile},
    staging::{Git2Staging, Staging},
    watch::WatchDirs,
};

use std::path::PathBuf;
use tracing::{debug, info, instrument};

/// Outcome of an autolink run.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Report {
    /// Links appended to the manifest, or that would be in a dry run.
    pub links: Vec<Link>,

    /// Whether the manifest was staged into the index.
    pub staged: bool,
}

/// Link manifest updater.
pub struct Autolinker<S = Git2Staging>
where
    S: Staging,
{
    staging: S,
    manifest: ManifestFile,
    watch: WatchDirs,
}

impl<S> Autolinker<S>
where
    S: Staging,
{
    /// Construct new autolinker.
    pub fn new(staging: S, manifest: ManifestFile, watch: WatchDirs) -> Self {
        Self {
            staging,
            manifest,
            watch,
        }
    }

    /// Derive links for every watched file newly added to the index.
    ///
    /// The manifest itself is never linked, even when it is newly added.
    ///
    /// # Errors
    ///
    /// - Return [`AutolinkError::Staging`] if staged files cannot be read,
    ///   including when the repository has no commits yet.
    #[instrument(skip(self), level = "debug")]
    pub fn candidate_links(&self) -> Result<Vec<Link>> {
        let added = self.staging.added_files()?;
        debug!("{} newly added files", added.len());

        let manifest = self.staging.relative_path(self.manifest.path()).ok();
        let added = added
            .into_iter()
            .filter(|file| Some(file) != manifest.as_ref())
            .collect::<Vec<PathBuf>>();

        let links = self
            .watch
            .retain(self.staging.work_dir(), added)
            .into_iter()
            .filter_map(Link::for_added_file)
            .collect();

        Ok(links)
    }

    /// Report links that would be added without touching anything.
    ///
    /// # Errors
    ///
    /// - Return [`AutolinkError::Staging`] if staged files cannot be read.
    /// - Return [`AutolinkError::Manifest`] if manifest cannot be loaded.
    pub fn plan(&self) -> Result<Report> {
        let candidates = self.candidate_links()?;
        if candidates.is_empty() {
            return Ok(Report::default());
        }

        let links = self.manifest.load()?.new_links(candidates);
        Ok(Report {
            links,
            staged: false,
        })
    }

    /// Append new links to manifest and stage it.
    ///
    /// The manifest is only opened for an update if there are candidate
    /// links at all, and only staged if at least one link was appended.
    ///
    /// # Errors
    ///
    /// - Return [`AutolinkError::Staging`] if staged files cannot be read, or
    ///   the manifest cannot be staged. A manifest outside of the work tree
    ///   is rejected before it is written.
    /// - Return [`AutolinkError::Manifest`] if the manifest update fails. The
    ///   manifest is left as it was.
    #[instrument(skip(self), level = "debug")]
    pub fn run(&self) -> Result<Report> {
        let candidates = self.candidate_links()?;
        if candidates.is_empty() {
            info!("no newly added files to link");
            return Ok(Report::default());
        }

        // INVARIANT: Manifest must be stageable before it is ever written.
        let manifest = self.staging.relative_path(self.manifest.path())?;
        let links = self.manifest.merge_links(candidates)?;
        if links.is_empty() {
            return Ok(Report::default());
        }

        for link in &links {
            info!("link {} -> {}", link.target, link.source);
        }

        self.staging.stage(&manifest)?;
        info!("staged {:?}", self.manifest.path().display());

        Ok(Report {
            links,
            staged: true,
        })
    }
}

/// Autolink error types.
#[derive(Debug, thiserror::Error)]
pub enum AutolinkError {
    /// Staging area cannot be read or written.
    #[error(transparent)]
    Staging(#[from] crate::staging::StagingError),

    /// Link manifest cannot be updated.
    #[error(transparent)]
    Manifest(#[from] crate::manifest::ManifestError),
}

/// Friendly result alias :3
pub type Result<T, E = AutolinkError> = std::result::Result<T, E>;
