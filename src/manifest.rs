// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

//! Link manifest layout and file handling.
//!
//! Dotbot reads a declarative __link manifest__: a YAML sequence of tasks,
//! where a task may carry a `link` mapping from link target to link source.
//!
//! ```yaml
//! - defaults:
//!     link:
//!       relink: true
//! - link:
//!     ~/.vimrc: vimrc
//!     ~/.bashrc: shell/bashrc
//! ```
//!
//! # Invariants
//!
//! - Link targets are unique across the entire manifest, not just one task.
//! - Existing tasks are never edited or removed, new links only ever arrive
//!   as one freshly appended task.
//! - A failed update leaves the manifest file byte-identical to what it was
//!   before the update started.

pub mod backup;

use crate::manifest::backup::Backup;

use serde::Serialize;
use serde_yaml::{Mapping, Value};
use std::{
    collections::HashSet,
    fs::{metadata, read_to_string, set_permissions},
    io::{self, Write},
    path::{Path, PathBuf},
    str::FromStr,
};
use tempfile::NamedTempFile;
use tracing::{debug, info, instrument};

/// Key of the link directive in a task.
pub const LINK_KEY: &str = "link";

/// In-memory link manifest.
#[derive(Default, Debug, PartialEq, Clone, Serialize)]
#[serde(transparent)]
pub struct Manifest {
    tasks: Vec<Task>,
}

impl Manifest {
    /// Construct new manifest from a listing of tasks.
    pub fn new(tasks: impl IntoIterator<Item = Task>) -> Self {
        Self {
            tasks: tasks.into_iter().collect(),
        }
    }

    /// Tasks of manifest in order.
    pub fn tasks(&self) -> &[Task] {
        self.tasks.as_slice()
    }

    /// Collect every link target of every task.
    pub fn link_targets(&self) -> HashSet<&str> {
        self.tasks
            .iter()
            .flat_map(Task::link_targets)
            .collect()
    }

    /// Determine which links are new to the manifest.
    ///
    /// A link is new if its target appears nowhere in the manifest. When
    /// several links share a target, the first one wins and the rest are
    /// skipped.
    pub fn new_links(&self, links: impl IntoIterator<Item = Link>) -> Vec<Link> {
        let existing = self.link_targets();
        let mut seen = HashSet::new();
        let mut fresh = Vec::new();

        for link in links {
            if existing.contains(link.target.as_str()) {
                debug!("{} already linked", link.target);
                continue;
            }

            if !seen.insert(link.target.clone()) {
                debug!("{} already claimed by an earlier file, skip {}", link.target, link.source);
                continue;
            }

            fresh.push(link);
        }

        fresh
    }

    /// Merge links into the manifest.
    ///
    /// Appends one new task holding every link returned by
    /// [`Manifest::new_links`]. Nothing is appended if there are none.
    /// Returns the links that were appended.
    pub fn merge_links(&mut self, links: impl IntoIterator<Item = Link>) -> Vec<Link> {
        let fresh = self.new_links(links);
        if !fresh.is_empty() {
            self.tasks.push(Task::with_links(fresh.iter().cloned()));
        }

        fresh
    }

    /// Serialize manifest into YAML.
    ///
    /// # Errors
    ///
    /// - Return [`ManifestError::Serialize`] if YAML emission fails.
    pub fn to_yaml(&self) -> Result<String> {
        serde_yaml::to_string(self).map_err(ManifestError::Serialize)
    }
}

impl FromStr for Manifest {
    type Err = ManifestError;

    fn from_str(data: &str) -> Result<Self, Self::Err> {
        if data.trim().is_empty() {
            return Ok(Self::default());
        }

        let tasks = match serde_yaml::from_str::<Value>(data)? {
            Value::Null => return Ok(Self::default()),
            Value::Sequence(entries) => entries,
            _ => {
                return Err(ManifestError::InvalidLayout {
                    reason: "top level must be a sequence of tasks".into(),
                })
            }
        };

        let tasks = tasks
            .into_iter()
            .enumerate()
            .map(|(index, entry)| {
                Task::try_from(entry).map_err(|reason| ManifestError::InvalidTask { index, reason })
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Self { tasks })
    }
}

/// Single task of the manifest.
///
/// Tasks are kept as raw YAML mappings so that directives other than `link`
/// pass through untouched.
#[derive(Default, Debug, PartialEq, Clone, Serialize)]
#[serde(transparent)]
pub struct Task(Mapping);

impl Task {
    /// Construct new task with a link directive.
    pub fn with_links(links: impl IntoIterator<Item = Link>) -> Self {
        let mut directive = Mapping::new();
        for link in links {
            directive.insert(Value::String(link.target), Value::String(link.source));
        }

        let mut task = Mapping::new();
        task.insert(Value::String(LINK_KEY.into()), Value::Mapping(directive));
        Self(task)
    }

    /// Link targets of the task, if it carries a link directive.
    pub fn link_targets(&self) -> impl Iterator<Item = &str> {
        self.0
            .get(LINK_KEY)
            .and_then(Value::as_mapping)
            .into_iter()
            .flat_map(Mapping::keys)
            .filter_map(Value::as_str)
    }

    /// Lookup link source of target.
    ///
    /// Dotbot also allows a mapping of options as the source, which is
    /// returned as-is.
    pub fn link_source(&self, target: &str) -> Option<&Value> {
        self.0
            .get(LINK_KEY)
            .and_then(Value::as_mapping)
            .and_then(|directive| directive.get(target))
    }
}

impl TryFrom<Value> for Task {
    type Error = String;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        let Value::Mapping(task) = value else {
            return Err("task must be a mapping".into());
        };

        match task.get(LINK_KEY) {
            None | Some(Value::Null) | Some(Value::Mapping(_)) => (),
            Some(_) => return Err("link directive must be a mapping".into()),
        }

        if let Some(Value::Mapping(directive)) = task.get(LINK_KEY) {
            if let Some(key) = directive.keys().find(|key| !key.is_string()) {
                return Err(format!("link target {key:?} must be a string"));
            }
        }

        Ok(Self(task))
    }
}

/// Link entry from link target to link source.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Link {
    /// Where the symlink goes, e.g., "~/.bashrc".
    pub target: String,

    /// What the symlink points to, relative to the repository root.
    pub source: String,
}

impl Link {
    /// Construct new link.
    pub fn new(target: impl Into<String>, source: impl Into<String>) -> Self {
        Self {
            target: target.into(),
            source: source.into(),
        }
    }

    /// Derive link for file newly added to the repository.
    ///
    /// Links every file into the home directory with a dot prepended to its
    /// base name, so "shell/bashrc" becomes "~/.bashrc: shell/bashrc". A base
    /// name that already starts with a dot is not given another one, so
    /// "git/.gitconfig" becomes "~/.gitconfig". Returns [`None`] for paths
    /// without a base name.
    pub fn for_added_file(path: impl AsRef<Path>) -> Option<Self> {
        let path = path.as_ref();
        let name = path.file_name()?.to_string_lossy();
        let name = name.strip_prefix('.').unwrap_or(name.as_ref());
        if name.is_empty() {
            return None;
        }

        Some(Self::new(
            format!("~/.{name}"),
            path.to_string_lossy().into_owned(),
        ))
    }
}

/// Link manifest stored on disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ManifestFile {
    path: PathBuf,
}

impl ManifestFile {
    /// Construct new manifest file handle.
    ///
    /// The path is resolved up front. A symlinked manifest is thus read,
    /// backed up, written, and staged through the file it points to, leaving
    /// the symlink itself intact.
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: crate::path::resolve(path),
        }
    }

    /// Resolved path to manifest file.
    pub fn path(&self) -> &Path {
        self.path.as_path()
    }

    /// Load manifest from disk.
    ///
    /// # Errors
    ///
    /// - Return [`ManifestError::Read`] if the file cannot be read.
    /// - Return [`ManifestError::Parse`] or [`ManifestError::InvalidTask`]
    ///   if the file is not a valid link manifest.
    pub fn load(&self) -> Result<Manifest> {
        read_to_string(&self.path)
            .map_err(|source| ManifestError::Read {
                source,
                path: self.path.clone(),
            })?
            .parse()
    }

    /// Merge links into manifest file.
    ///
    /// See [`ManifestFile::update_with`]. Writes through [`atomic_write`].
    ///
    /// # Errors
    ///
    /// - Return [`ManifestError`] if the update fails at any point.
    pub fn merge_links(&self, links: impl IntoIterator<Item = Link>) -> Result<Vec<Link>> {
        self.update_with(|manifest| manifest.merge_links(links), atomic_write)
    }

    /// Update manifest file through editor.
    ///
    /// Backs up the manifest, loads it, and hands it to `editor`, which
    /// returns the links it added. If it added any, the manifest is
    /// serialized, handed to `writer`, then read back to check that it
    /// landed intact. If it added none, the file is never opened for
    /// writing.
    ///
    /// On any failure after the backup is taken, the backup is restored over
    /// the manifest before the error is returned. The backup is removed in
    /// every case except a failed restore.
    ///
    /// # Errors
    ///
    /// - Return [`ManifestError::Backup`] if backup cannot be taken.
    /// - Return [`ManifestError::Parse`] if manifest is not valid YAML.
    /// - Return [`ManifestError::InvalidTask`] if manifest is not a valid
    ///   link manifest.
    /// - Return [`ManifestError::Write`] if `writer` fails.
    /// - Return [`ManifestError::Verify`] if written manifest does not match.
    /// - Return [`ManifestError::Restore`] if restoring the backup fails.
    #[instrument(skip(self, editor, writer), level = "debug")]
    pub fn update_with<E, W>(&self, editor: E, writer: W) -> Result<Vec<Link>>
    where
        E: FnOnce(&mut Manifest) -> Vec<Link>,
        W: FnOnce(&Path, &str) -> io::Result<()>,
    {
        let backup = Backup::create(&self.path).map_err(|source| ManifestError::Backup {
            source,
            path: self.path.clone(),
        })?;

        match self.apply(editor, writer) {
            Ok(added) => Ok(added),
            Err(error) => {
                debug!("update of {:?} failed: {error:?}", self.path.display());
                if let Err(source) = backup.restore() {
                    let backup = backup.keep();
                    return Err(ManifestError::Restore {
                        source,
                        backup,
                        cause: Box::new(error),
                    });
                }

                Err(error)
            }
        }
    }

    fn apply<E, W>(&self, editor: E, writer: W) -> Result<Vec<Link>>
    where
        E: FnOnce(&mut Manifest) -> Vec<Link>,
        W: FnOnce(&Path, &str) -> io::Result<()>,
    {
        let mut manifest = self.load()?;
        let added = editor(&mut manifest);
        if added.is_empty() {
            info!("no new links for {:?}", self.path.display());
            return Ok(added);
        }

        let contents = manifest.to_yaml()?;
        writer(&self.path, &contents).map_err(|source| ManifestError::Write {
            source,
            path: self.path.clone(),
        })?;

        // INVARIANT: Manifest on disk must be exactly what we meant to write.
        match self.load() {
            Ok(written) if written == manifest => Ok(added),
            _ => Err(ManifestError::Verify {
                path: self.path.clone(),
            }),
        }
    }
}

/// Replace file contents in one step.
///
/// Writes to a temporary file next to the target, gives it the target's
/// permissions, syncs it, then renames it over the target. The target is
/// either fully replaced or left alone.
///
/// # Errors
///
/// - Return [`io::Error`] if any step fails. The temporary file is removed.
pub fn atomic_write(path: &Path, contents: &str) -> io::Result<()> {
    let parent = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    let mut temp = NamedTempFile::new_in(parent)?;
    temp.write_all(contents.as_bytes())?;
    if let Ok(meta) = metadata(path) {
        set_permissions(temp.path(), meta.permissions())?;
    }
    temp.as_file().sync_all()?;
    temp.persist(path).map_err(|error| error.error)?;

    Ok(())
}

/// Link manifest error types.
#[derive(Debug, thiserror::Error)]
pub enum ManifestError {
    /// Manifest file cannot be read.
    #[error("failed to read manifest at {:?}", path.display())]
    Read {
        #[source]
        source: io::Error,
        path: PathBuf,
    },

    /// Manifest is not valid YAML.
    #[error("failed to parse manifest")]
    Parse(#[from] serde_yaml::Error),

    /// Manifest top level is not a sequence of tasks.
    #[error("invalid manifest: {reason}")]
    InvalidLayout { reason: String },

    /// Manifest task is malformed.
    #[error("invalid manifest task #{index}: {reason}")]
    InvalidTask { index: usize, reason: String },

    /// Manifest cannot be serialized.
    #[error("failed to serialize manifest")]
    Serialize(#[source] serde_yaml::Error),

    /// Manifest file cannot be written to.
    #[error("failed to write manifest at {:?}", path.display())]
    Write {
        #[source]
        source: io::Error,
        path: PathBuf,
    },

    /// Manifest on disk does not match what was written.
    #[error("manifest at {:?} does not match what was written", path.display())]
    Verify { path: PathBuf },

    /// Manifest cannot be backed up.
    #[error("failed to back up manifest at {:?}", path.display())]
    Backup {
        #[source]
        source: io::Error,
        path: PathBuf,
    },

    /// Manifest cannot be restored from backup after a failed update.
    #[error("failed to restore manifest, backup kept at {:?} ({cause})", backup.display())]
    Restore {
        #[source]
        source: io::Error,
        backup: PathBuf,
        cause: Box<ManifestError>,
    },
}

/// Friendly result alias :3
pub type Result<T, E = ManifestError> = std::result::Result<T, E>;

#[cfg(test)]
mod tests {
    use super::*;
    use indoc::indoc;
    use simple_test_case::test_case;
    use std::fs::{read, read_dir, write};

    fn manifest(data: &str) -> Manifest {
        data.parse().unwrap()
    }

    fn links(files: &[&str]) -> Vec<Link> {
        files.iter().filter_map(Link::for_added_file).collect()
    }

    fn entries(dir: &Path) -> Vec<PathBuf> {
        let mut entries = read_dir(dir)
            .unwrap()
            .map(|entry| entry.unwrap().path())
            .collect::<Vec<_>>();
        entries.sort();
        entries
    }

    #[test_case("bashrc", "~/.bashrc", "bashrc"; "top level file")]
    #[test_case("shell/zshrc", "~/.zshrc", "shell/zshrc"; "nested file")]
    #[test_case("git/.gitconfig", "~/.gitconfig", "git/.gitconfig"; "already dotted")]
    #[test_case("x/..foo", "~/..foo", "x/..foo"; "only one leading dot dropped")]
    #[test]
    fn link_for_added_file(file: &str, target: &str, source: &str) {
        pretty_assertions::assert_eq!(Link::for_added_file(file), Some(Link::new(target, source)));
    }

    #[test]
    fn link_for_path_without_name() {
        pretty_assertions::assert_eq!(Link::for_added_file(".."), None);
        pretty_assertions::assert_eq!(Link::for_added_file("shell/.."), None);
    }

    #[test]
    fn parse_collects_targets_across_tasks() {
        let result = manifest(indoc! {r#"
            - defaults:
                link:
                  relink: true
            - clean: ['~']
            - link:
                ~/.vimrc: vimrc
            - shell:
                - [git submodule update --init, Installing submodules]
            - link:
                ~/.bashrc: shell/bashrc
                ~/.config/nvim:
                  path: nvim
                  create: true
            - link:
        "#});

        let mut targets = result.link_targets().into_iter().collect::<Vec<_>>();
        targets.sort();
        pretty_assertions::assert_eq!(targets, vec!["~/.bashrc", "~/.config/nvim", "~/.vimrc"]);
        pretty_assertions::assert_eq!(result.tasks().len(), 6);
    }

    #[test_case(""; "empty")]
    #[test_case("# nothing yet\n"; "comment only")]
    #[test]
    fn parse_empty_manifest(data: &str) {
        pretty_assertions::assert_eq!(manifest(data), Manifest::default());
    }

    #[test_case("link:\n  ~/.vimrc: vimrc\n"; "top level mapping")]
    #[test_case("- just a string\n"; "task not a mapping")]
    #[test_case("- link: [vimrc]\n"; "link not a mapping")]
    #[test_case("- link:\n    [a, b]: vimrc\n"; "link target not a string")]
    #[test]
    fn parse_rejects_invalid_layout(data: &str) {
        assert!(matches!(
            data.parse::<Manifest>(),
            Err(ManifestError::InvalidLayout { .. } | ManifestError::InvalidTask { .. })
        ));
    }

    #[test]
    fn parse_rejects_invalid_yaml() {
        assert!(matches!(
            "- link: {\n".parse::<Manifest>(),
            Err(ManifestError::Parse(_))
        ));
    }

    #[test]
    fn merge_links_appends_one_task() {
        let mut result = manifest("- link:\n    ~/.vimrc: vimrc\n");
        let added = result.merge_links(links(&["bashrc", "shell/zshrc"]));

        let expect = manifest(indoc! {r#"
            - link:
                ~/.vimrc: vimrc
            - link:
                ~/.bashrc: bashrc
                ~/.zshrc: shell/zshrc
        "#});
        pretty_assertions::assert_eq!(result, expect);
        pretty_assertions::assert_eq!(added, links(&["bashrc", "shell/zshrc"]));
    }

    #[test]
    fn merge_links_is_idempotent() {
        let mut once = manifest("- link:\n    ~/.vimrc: vimrc\n");
        once.merge_links(links(&["bashrc"]));
        let mut twice = once.clone();
        let added = twice.merge_links(links(&["bashrc"]));

        assert!(added.is_empty());
        pretty_assertions::assert_eq!(twice, once);
    }

    #[test]
    fn merge_links_never_clobbers_existing_targets() {
        let mut result = manifest(indoc! {r#"
            - link:
                ~/.bashrc: shell/bashrc
            - link:
                ~/.vimrc: vim/vimrc
        "#});
        let added = result.merge_links(links(&["bashrc", "other/vimrc"]));

        assert!(added.is_empty());
        pretty_assertions::assert_eq!(result.tasks().len(), 2);
        pretty_assertions::assert_eq!(
            result.tasks()[0].link_source("~/.bashrc"),
            Some(&Value::String("shell/bashrc".into()))
        );
        pretty_assertions::assert_eq!(
            result.tasks()[1].link_source("~/.vimrc"),
            Some(&Value::String("vim/vimrc".into()))
        );
    }

    #[test]
    fn merge_links_first_duplicate_name_wins() {
        let mut result = Manifest::default();
        let added = result.merge_links(links(&["git/config", "ssh/config", "bashrc"]));

        pretty_assertions::assert_eq!(added, links(&["git/config", "bashrc"]));
        pretty_assertions::assert_eq!(
            result.tasks()[0].link_source("~/.config"),
            Some(&Value::String("git/config".into()))
        );
    }

    #[test]
    fn update_appends_new_task_and_removes_backup() -> anyhow::Result<()> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("dotbot.conf.yaml");
        write(&path, "- link:\n    ~/.vimrc: vimrc\n")?;

        let file = ManifestFile::new(&path);
        let added = file.merge_links(links(&["bashrc"]))?;

        pretty_assertions::assert_eq!(added, links(&["bashrc"]));
        pretty_assertions::assert_eq!(
            file.load()?,
            manifest("- link:\n    ~/.vimrc: vimrc\n- link:\n    ~/.bashrc: bashrc\n")
        );
        pretty_assertions::assert_eq!(entries(dir.path()), vec![path]);

        Ok(())
    }

    #[test]
    fn update_without_new_links_never_writes() -> anyhow::Result<()> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("dotbot.conf.yaml");
        let original = "# keep me\n- link:   {~/.bashrc: bashrc}\n";
        write(&path, original)?;

        let file = ManifestFile::new(&path);
        let added = file.update_with(
            |manifest| manifest.merge_links(links(&["bashrc"])),
            |_, _| panic!("writer must not be called"),
        )?;

        assert!(added.is_empty());
        pretty_assertions::assert_eq!(read(&path)?, original.as_bytes());
        pretty_assertions::assert_eq!(entries(dir.path()), vec![path]);

        Ok(())
    }

    #[test]
    fn failed_write_restores_manifest() -> anyhow::Result<()> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("dotbot.conf.yaml");
        let original = "- link:\n    ~/.vimrc: vimrc # editor\n";
        write(&path, original)?;

        let file = ManifestFile::new(&path);
        let result = file.update_with(
            |manifest| manifest.merge_links(links(&["bashrc"])),
            |path, _| {
                write(path, "- link:\n    ~/.vim")?;
                Err(io::Error::other("disk full"))
            },
        );

        assert!(matches!(result, Err(ManifestError::Write { .. })));
        pretty_assertions::assert_eq!(read(&path)?, original.as_bytes());
        pretty_assertions::assert_eq!(entries(dir.path()), vec![path]);

        Ok(())
    }

    #[test]
    fn corrupt_write_restores_manifest() -> anyhow::Result<()> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("dotbot.conf.yaml");
        let original = "- link:\n    ~/.vimrc: vimrc\n";
        write(&path, original)?;

        let file = ManifestFile::new(&path);
        let result = file.update_with(
            |manifest| manifest.merge_links(links(&["bashrc"])),
            |path, _| write(path, "- link:\n    ~/.vimrc: vimrc\n"),
        );

        assert!(matches!(result, Err(ManifestError::Verify { .. })));
        pretty_assertions::assert_eq!(read(&path)?, original.as_bytes());
        pretty_assertions::assert_eq!(entries(dir.path()), vec![path]);

        Ok(())
    }

    #[test]
    fn invalid_manifest_is_left_alone() -> anyhow::Result<()> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("dotbot.conf.yaml");
        let original = "link:\n  ~/.vimrc: vimrc\n";
        write(&path, original)?;

        let file = ManifestFile::new(&path);
        let result = file.merge_links(links(&["bashrc"]));

        assert!(matches!(result, Err(ManifestError::InvalidLayout { .. })));
        pretty_assertions::assert_eq!(read(&path)?, original.as_bytes());
        pretty_assertions::assert_eq!(entries(dir.path()), vec![path]);

        Ok(())
    }

    #[test]
    fn missing_manifest_is_backup_error() {
        let dir = tempfile::tempdir().unwrap();
        let file = ManifestFile::new(dir.path().join("dotbot.conf.yaml"));

        assert!(matches!(
            file.merge_links(links(&["bashrc"])),
            Err(ManifestError::Backup { .. })
        ));
        assert!(entries(dir.path()).is_empty());
    }

    #[cfg(unix)]
    #[test]
    fn update_writes_through_symlink() -> anyhow::Result<()> {
        use std::{fs::create_dir, os::unix::fs::symlink};

        let dir = tempfile::tempdir()?;
        create_dir(dir.path().join("conf"))?;
        let real = dir.path().join("conf").join("dotbot.yaml");
        let link = dir.path().join("dotbot.conf.yaml");
        write(&real, "- link:\n    ~/.vimrc: vimrc\n")?;
        symlink(&real, &link)?;

        let file = ManifestFile::new(&link);
        file.merge_links(links(&["bashrc"]))?;

        assert!(std::fs::symlink_metadata(&link)?.file_type().is_symlink());
        pretty_assertions::assert_eq!(
            ManifestFile::new(&real).load()?,
            manifest("- link:\n    ~/.vimrc: vimrc\n- link:\n    ~/.bashrc: bashrc\n")
        );
        pretty_assertions::assert_eq!(file.path().to_path_buf(), std::fs::canonicalize(&real)?);

        Ok(())
    }

    #[cfg(unix)]
    #[test]
    fn failed_update_keeps_permissions() -> anyhow::Result<()> {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir()?;
        let path = dir.path().join("dotbot.conf.yaml");
        write(&path, "- link:\n    ~/.vimrc: vimrc\n")?;
        set_permissions(&path, std::fs::Permissions::from_mode(0o600))?;

        let file = ManifestFile::new(&path);
        let result = file.update_with(
            |manifest| manifest.merge_links(links(&["bashrc"])),
            |path, _| write(path, "garbage: ["),
        );

        assert!(result.is_err());
        pretty_assertions::assert_eq!(read(&path)?, b"- link:\n    ~/.vimrc: vimrc\n");
        pretty_assertions::assert_eq!(metadata(&path)?.permissions().mode() & 0o777, 0o600);
        pretty_assertions::assert_eq!(entries(dir.path()), vec![path]);

        Ok(())
    }

    #[cfg(unix)]
    #[test]
    fn atomic_write_keeps_permissions() -> anyhow::Result<()> {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir()?;
        let path = dir.path().join("dotbot.conf.yaml");
        write(&path, "old")?;
        set_permissions(&path, std::fs::Permissions::from_mode(0o644))?;

        atomic_write(&path, "new")?;

        pretty_assertions::assert_eq!(read_to_string(&path)?, "new");
        pretty_assertions::assert_eq!(metadata(&path)?.permissions().mode() & 0o777, 0o644);
        pretty_assertions::assert_eq!(entries(dir.path()), vec![path]);

        Ok(())
    }
}
