// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

//! Git hook installation.
//!
//! Autobot is meant to run right before a commit is recorded, so that the
//! manifest update lands in that same commit. Install it as the repository's
//! pre-commit hook.

use std::{
    fs::{create_dir_all, write},
    io,
    path::{Path, PathBuf},
};
use tracing::info;

/// Name of the hook autobot installs as.
pub const PRE_COMMIT: &str = "pre-commit";

/// Install pre-commit hook that runs autobot with given arguments.
///
/// Creates the hooks directory if needed. An existing hook is only replaced
/// when `force` is set. Returns the path to the installed hook.
///
/// # Errors
///
/// - Return [`HookError::Exists`] if a hook already exists and `force` is
///   not set.
/// - Return [`HookError::Io`] if the hook cannot be written.
pub fn install_pre_commit(
    hooks_dir: impl AsRef<Path>,
    args: impl IntoIterator<Item = impl AsRef<str>>,
    force: bool,
) -> Result<PathBuf> {
    let hook = hooks_dir.as_ref().join(PRE_COMMIT);
    if hook.exists() && !force {
        return Err(HookError::Exists { path: hook });
    }

    let io_error = |source| HookError::Io {
        source,
        path: hook.clone(),
    };
    create_dir_all(hooks_dir.as_ref()).map_err(io_error)?;
    write(&hook, script(args)).map_err(io_error)?;
    make_executable(&hook).map_err(io_error)?;
    info!("installed {:?}", hook.display());

    Ok(hook)
}

fn script(args: impl IntoIterator<Item = impl AsRef<str>>) -> String {
    let mut command = String::from("exec autobot");
    for arg in args {
        command.push(' ');
        command.push_str(&quote(arg.as_ref()));
    }

    format!("#!/bin/sh\n# Installed by autobot: link newly added dotfiles.\n{command}\n")
}

fn quote(arg: &str) -> String {
    format!("'{}'", arg.replace('\'', r"'\''"))
}

#[cfg(unix)]
fn make_executable(path: &Path) -> io::Result<()> {
    use std::{
        fs::{metadata, set_permissions},
        os::unix::fs::PermissionsExt,
    };

    let mut perms = metadata(path)?.permissions();
    perms.set_mode(perms.mode() | 0o755);
    set_permissions(path, perms)
}

#[cfg(not(unix))]
fn make_executable(_path: &Path) -> io::Result<()> {
    Ok(())
}

/// Hook installation error types.
#[derive(Debug, thiserror::Error)]
pub enum HookError {
    /// Hook already exists.
    #[error("hook already exists at {:?}, use --force to replace it", path.display())]
    Exists { path: PathBuf },

    /// Hook cannot be written.
    #[error("failed to install hook at {:?}", path.display())]
    Io {
        #[source]
        source: io::Error,
        path: PathBuf,
    },
}

/// Friendly result alias :3
pub type Result<T, E = HookError> = std::result::Result<T, E>;
