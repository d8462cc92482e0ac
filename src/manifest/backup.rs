// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

//! Manifest backup handling.
//!
//! A backup copy of the manifest is taken before it is touched, and restored
//! over the manifest if anything goes wrong. The backup is removed when it
//! goes out of scope, so it never outlives the update it guards. The one
//! exception is a failed restore: the backup is then the only good copy of
//! the manifest, so it is kept on disk.

use std::{
    ffi::OsString,
    fs::{copy, remove_file, File, OpenOptions},
    io::{self, ErrorKind},
    path::{Path, PathBuf},
};
use tracing::{debug, warn};

/// Backup copy of a file, removed on drop.
#[derive(Debug)]
pub struct Backup {
    original: PathBuf,
    path: PathBuf,
    keep: bool,
}

impl Backup {
    /// Copy file to first free backup path.
    ///
    /// Probes "name.bak", then "name.bak0", "name.bak1", and so on until an
    /// unused name is found. The name is claimed by creating the file
    /// exclusively, so an existing file is never overwritten. The backup is
    /// given the permissions of the original, so a restore puts those back
    /// as well.
    ///
    /// # Errors
    ///
    /// - Return [`io::Error`] if the original cannot be read, or the backup
    ///   cannot be created.
    pub fn create(original: impl Into<PathBuf>) -> io::Result<Self> {
        let original = original.into();
        let mut source = File::open(&original)?;

        for candidate in candidates(&original)? {
            let mut backup = match OpenOptions::new()
                .write(true)
                .create_new(true)
                .open(&candidate)
            {
                Ok(file) => file,
                Err(error) if error.kind() == ErrorKind::AlreadyExists => continue,
                Err(error) => return Err(error),
            };

            // INVARIANT: Guard exists before the copy so a failed copy is cleaned up.
            let guard = Self {
                original,
                path: candidate,
                keep: false,
            };
            backup.set_permissions(source.metadata()?.permissions())?;
            io::copy(&mut source, &mut backup)?;
            backup.sync_all()?;
            debug!("backed up {:?} to {:?}", guard.original.display(), guard.path.display());

            return Ok(guard);
        }

        Err(io::Error::new(ErrorKind::AlreadyExists, "no free backup name"))
    }

    /// Path to backup copy.
    pub fn path(&self) -> &Path {
        self.path.as_path()
    }

    /// Overwrite original file with backup copy.
    ///
    /// # Errors
    ///
    /// - Return [`io::Error`] if backup cannot be copied over the original.
    pub fn restore(&self) -> io::Result<()> {
        warn!(
            "restore {:?} from backup {:?}",
            self.original.display(),
            self.path.display()
        );
        copy(&self.path, &self.original)?;

        Ok(())
    }

    /// Leave backup on disk after drop, returning its path.
    pub fn keep(mut self) -> PathBuf {
        self.keep = true;
        self.path.clone()
    }
}

impl Drop for Backup {
    fn drop(&mut self) {
        if self.keep {
            return;
        }

        if let Err(error) = remove_file(&self.path) {
            warn!("failed to remove backup {:?}: {error}", self.path.display());
        }
    }
}

fn candidates(original: &Path) -> io::Result<impl Iterator<Item = PathBuf>> {
    let name = original
        .file_name()
        .ok_or_else(|| io::Error::new(ErrorKind::InvalidInput, "path has no file name"))?
        .to_os_string();
    let parent = original.parent().map(Path::to_path_buf).unwrap_or_default();

    let suffixes = std::iter::once(String::new()).chain((0u32..).map(|n| n.to_string()));
    Ok(suffixes.map(move |suffix| {
        let mut candidate = OsString::from(&name);
        candidate.push(format!(".bak{suffix}"));
        parent.join(candidate)
    }))
}
