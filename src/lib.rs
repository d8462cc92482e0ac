// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

//! Keep a Dotbot link manifest in step with a dotfiles repository.
//!
//! Autobot runs as a pre-commit hook. It looks at the files being added in
//! the commit, derives a Dotbot link for each of them, appends the links the
//! manifest does not know about yet, and stages the manifest so the commit
//! carries the new links along with the new files.
//!
//! # See Also
//!
//! 1. [Dotbot](https://github.com/anishathalye/dotbot)

pub mod autolink;
pub mod hook;
pub mod manifest;
pub mod path;
pub mod settings;
pub mod staging;
pub mod watch;

pub use autolink::{Autolinker, Report};
pub use manifest::{Link, Manifest, ManifestFile};
pub use settings::Settings;
pub use staging::{Git2Staging, Staging};
pub use watch::WatchDirs;
