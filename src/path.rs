// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

//! Path resolution utilities.
//!
//! Expand and compare paths given on the command line, found in the staged
//! diff, or listed in the link manifest. Resolution is lexical: nothing here
//! requires the path to exist except [`resolve`], which prefers the
//! canonical form when it can get one.

use std::{
    borrow::Cow,
    path::{Component, Path, PathBuf},
};

/// Expand path into normalized absolute form relative to current directory.
///
/// A leading `~` is replaced with the user's home directory. Relative paths
/// are joined onto the current directory, and `.` or `..` components are
/// folded away. Never fails; if the home directory or current directory
/// cannot be determined, the path is left as literal as possible.
pub fn expand(path: impl AsRef<Path>) -> PathBuf {
    match std::env::current_dir() {
        Ok(cwd) => expand_in(path, cwd),
        Err(_) => normalize(tilde(path.as_ref())),
    }
}

/// Expand path into normalized absolute form relative to a base directory.
///
/// Same as [`expand`], but relative paths are joined onto `base` instead of
/// the current directory.
pub fn expand_in(path: impl AsRef<Path>, base: impl AsRef<Path>) -> PathBuf {
    let path = tilde(path.as_ref());
    if path.is_absolute() {
        normalize(path)
    } else {
        normalize(base.as_ref().join(path))
    }
}

/// Resolve path to canonical form, falling back to [`expand`].
///
/// Symbolic links are only followed when the path exists on disk.
pub fn resolve(path: impl AsRef<Path>) -> PathBuf {
    let expanded = expand(path);
    std::fs::canonicalize(&expanded).unwrap_or(expanded)
}

/// Check if path lives under target directory.
///
/// Both paths are expanded before comparison, and comparison is done by
/// whole path component. Thus, "/foo2/bar" is not under "/foo". A directory
/// is considered to be under itself.
pub fn is_under(path: impl AsRef<Path>, directory: impl AsRef<Path>) -> bool {
    expand(path).starts_with(expand(directory))
}

fn tilde(path: &Path) -> PathBuf {
    let raw = path.to_string_lossy();
    let home = || dirs::home_dir().map(|home| home.to_string_lossy().into_owned());
    match shellexpand::tilde_with_context(raw.as_ref(), home) {
        Cow::Borrowed(_) => path.to_path_buf(),
        Cow::Owned(expanded) => PathBuf::from(expanded),
    }
}

fn normalize(path: impl AsRef<Path>) -> PathBuf {
    let mut normal = PathBuf::new();
    for component in path.as_ref().components() {
        match component {
            Component::CurDir => continue,
            Component::ParentDir => {
                // INVARIANT: Never climb above the root, but keep leading ".."
                //   of a relative path intact.
                if normal.file_name().is_some() {
                    normal.pop();
                } else if !normal.has_root() {
                    normal.push(component);
                }
            }
            other => normal.push(other),
        }
    }

    normal
}
