// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

use autobot::{
    hook::install_pre_commit, Autolinker, Git2Staging, ManifestFile, Settings, Staging, WatchDirs,
};

use anyhow::{Context, Result};
use clap::Parser;
use std::{
    ffi::OsString,
    path::{Path, PathBuf},
    process::exit,
};
use tracing::{debug, error, info};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Add Dotbot links for dotfiles newly staged for commit.
#[derive(Debug, Clone, Parser)]
#[command(
    about,
    override_usage = "autobot [options] [directory]...",
    version
)]
struct Cli {
    /// Directories to restrict the update to [default: entire repository].
    #[arg(value_name = "directory")]
    pub directories: Vec<PathBuf>,

    /// Alternate location of link manifest [default: <repo-root>/dotbot.conf.yaml].
    #[arg(short, long, env = "DOTBOT_CONF", value_name = "file")]
    pub config_file: Option<PathBuf>,

    /// Path inside the dotfiles repository.
    #[arg(short, long, env = "REPO_ROOT", value_name = "path")]
    pub repo_root: Option<PathBuf>,

    /// Report links that would be added without changing anything.
    #[arg(short = 'n', long)]
    pub dry_run: bool,

    /// Install autobot as pre-commit hook with the given options, then exit.
    #[arg(long)]
    pub install_hook: bool,

    /// Replace an existing pre-commit hook.
    #[arg(long, requires = "install_hook")]
    pub force: bool,

    /// Enable verbose diagnostic logging.
    #[arg(short, long)]
    pub debug: bool,
}

impl Cli {
    fn run(self) -> Result<()> {
        let settings = Settings::resolve(
            self.repo_root.clone(),
            self.config_file.clone(),
            self.directories.clone(),
        );
        debug!("{settings:?}");

        let staging = Git2Staging::open(&settings.repo_root)
            .with_context(|| format!("cannot open repository at {:?}", settings.repo_root))?;

        if self.install_hook {
            let hooks_dir = staging.git_dir().join("hooks");
            install_pre_commit(hooks_dir, self.hook_args(&staging), self.force)?;
            return Ok(());
        }

        let watch = WatchDirs::new(&settings.directories);
        for dir in watch.iter() {
            debug!("watch {:?}", dir.display());
        }

        let autolinker = Autolinker::new(staging, ManifestFile::new(&settings.manifest), watch);
        if self.dry_run {
            let report = autolinker.plan()?;
            if report.links.is_empty() {
                info!("nothing to link");
            }
            for link in report.links {
                info!("would link {} -> {}", link.target, link.source);
            }
            return Ok(());
        }

        let report = autolinker.run()?;
        debug!("{report:?}");

        Ok(())
    }

    /// Arguments to hand to autobot from the installed hook.
    ///
    /// Git runs the hook from the root of the work tree, so paths are
    /// rewritten relative to it. Paths outside of the work tree are written
    /// out in full.
    fn hook_args(&self, staging: &impl Staging) -> Vec<String> {
        let mut args = Vec::new();
        if let Some(config_file) = &self.config_file {
            args.push("--config-file".into());
            args.push(hook_path(staging, config_file));
        }

        if self.debug {
            args.push("--debug".into());
        }

        if !self.directories.is_empty() {
            args.push("--".into());
            args.extend(self.directories.iter().map(|dir| hook_path(staging, dir)));
        }

        args
    }
}

fn hook_path(staging: &impl Staging, path: &Path) -> String {
    let path = match staging.relative_path(path) {
        Ok(relative) if relative.as_os_str().is_empty() => PathBuf::from("."),
        Ok(relative) => relative,
        Err(_) => autobot::path::resolve(path),
    };

    path.to_string_lossy().into_owned()
}

fn main() {
    exit(run(std::env::args_os()));
}

fn run(args: impl IntoIterator<Item = impl Into<OsString> + Clone>) -> i32 {
    let cli = Cli::parse_from(args);
    let debug = cli.debug;

    let layer = fmt::layer()
        .compact()
        .with_writer(std::io::stderr)
        .with_target(false)
        .without_time();
    let filter = if debug {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };
    let subscriber = tracing_subscriber::registry().with(layer).with(filter);

    tracing::subscriber::with_default(subscriber, || match cli.run() {
        Ok(()) => 0,
        Err(error) if debug => {
            error!("{error:?}");
            1
        }
        Err(error) => {
            error!("{error:#}");
            1
        }
    })
}
