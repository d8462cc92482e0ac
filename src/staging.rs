// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

//! Staged change inspection.
//!
//! Utilities to read what the user is about to commit, and to put files back
//! into the index so they ride along with that commit. Only the staged index
//! is ever compared against HEAD; the work tree is left alone.

use git2::{Delta, DiffOptions, ErrorCode, FileMode, Repository};
use std::path::{Path, PathBuf};
use tracing::{debug, instrument};

/// Access to the staging area of a repository.
pub trait Staging {
    /// Absolute path to the work tree of the repository.
    fn work_dir(&self) -> &Path;

    /// List paths added to the index relative to HEAD.
    ///
    /// Paths are relative to the work tree, in diff order.
    fn added_files(&self) -> Result<Vec<PathBuf>>;

    /// Stage file into the index.
    fn stage(&self, path: &Path) -> Result<()>;

    /// Convert path into a path relative to the work tree.
    ///
    /// # Errors
    ///
    /// - Return [`StagingError::OutsideWorkTree`] if path does not live in
    ///   the work tree.
    fn relative_path(&self, path: &Path) -> Result<PathBuf> {
        let absolute = crate::path::resolve(path);
        absolute
            .strip_prefix(self.work_dir())
            .map(Path::to_path_buf)
            .map_err(|_| StagingError::OutsideWorkTree { path: absolute.clone() })
    }
}

/// Staging area access through libgit2.
pub struct Git2Staging {
    repository: Repository,
    work_dir: PathBuf,
}

impl Git2Staging {
    /// Open repository containing target path.
    ///
    /// Searches upward from the path for a repository, so any directory of
    /// the work tree will do.
    ///
    /// # Errors
    ///
    /// - Return [`StagingError::Git2`] if no repository can be found.
    /// - Return [`StagingError::BareRepository`] if the repository has no
    ///   work tree.
    #[instrument(skip(path), level = "debug")]
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        debug!("discover repository from {:?}", path.as_ref().display());
        let repository = Repository::discover(path.as_ref())?;
        Self::new(repository)
    }

    /// Construct new staging access from opened repository.
    ///
    /// # Errors
    ///
    /// - Return [`StagingError::BareRepository`] if the repository has no
    ///   work tree.
    pub fn new(repository: Repository) -> Result<Self> {
        let work_dir = match repository.workdir() {
            Some(work_dir) => crate::path::resolve(work_dir),
            None => {
                return Err(StagingError::BareRepository {
                    path: repository.path().to_path_buf(),
                })
            }
        };

        Ok(Self {
            repository,
            work_dir,
        })
    }

    /// Path to the gitdir of the repository.
    pub fn git_dir(&self) -> &Path {
        self.repository.path()
    }
}

impl Staging for Git2Staging {
    fn work_dir(&self) -> &Path {
        self.work_dir.as_path()
    }

    #[instrument(skip(self), level = "debug")]
    fn added_files(&self) -> Result<Vec<PathBuf>> {
        let head = match self.repository.head() {
            Ok(head) => head,
            Err(error)
                if matches!(error.code(), ErrorCode::UnbornBranch | ErrorCode::NotFound) =>
            {
                return Err(StagingError::NoHistory);
            }
            Err(error) => return Err(error.into()),
        };
        let tree = head.peel_to_tree()?;

        let mut opts = DiffOptions::new();
        opts.include_typechange(false);
        let diff = self
            .repository
            .diff_tree_to_index(Some(&tree), None, Some(&mut opts))?;

        let mut added = Vec::new();
        for delta in diff.deltas() {
            if delta.status() != Delta::Added {
                continue;
            }

            // INVARIANT: Only regular files and symlinks can be linked.
            let new_file = delta.new_file();
            if matches!(new_file.mode(), FileMode::Commit | FileMode::Tree) {
                debug!("skip non-file entry {:?}", new_file.path());
                continue;
            }

            if let Some(path) = new_file.path() {
                debug!("staged new file {:?}", path.display());
                added.push(path.to_path_buf());
            }
        }

        Ok(added)
    }

    #[instrument(skip(self), level = "debug")]
    fn stage(&self, path: &Path) -> Result<()> {
        let relative = if path.is_absolute() {
            self.relative_path(path)?
        } else {
            path.to_path_buf()
        };

        debug!("stage {:?}", relative.display());
        let mut index = self.repository.index()?;
        index.add_path(&relative)?;
        index.write()?;

        Ok(())
    }
}

/// Staging area error types.
#[derive(Debug, thiserror::Error)]
pub enum StagingError {
    /// Repository has no commit to diff the index against.
    #[error("repository has no commits yet, nothing to compare staged files against")]
    NoHistory,

    /// Repository has no work tree to resolve files in.
    #[error("repository at {:?} is bare", path.display())]
    BareRepository { path: PathBuf },

    /// Path does not live in the work tree.
    #[error("path {:?} is outside of the work tree", path.display())]
    OutsideWorkTree { path: PathBuf },

    /// Operations from libgit2 fail.
    #[error(transparent)]
    Git2(#[from] git2::Error),
}

/// Friendly result alias :3
pub type Result<T, E = StagingError> = std::result::Result<T, E>;
