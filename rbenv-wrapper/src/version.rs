//! Ruby version resolution and installation.

use std::collections::BTreeSet;
use std::io::Write;
use std::path::Path;

use tracing::{debug, info};

use crate::command_runner::{quote, quote_path, CommandRunner};
use crate::error::Result;
use crate::layout::Layout;
use crate::repo::update_repository;

/// Pick the effective Ruby version.
///
/// Unless `ignore_local` is set, a `.ruby-version` in the workspace (as
/// reported by `rbenv local`) overrides `configured`. The lookup exits
/// non-zero when there is no local file; any failure here means "no override".
pub fn resolve_version(
    runner: &dyn CommandRunner,
    layout: &Layout,
    configured: &str,
    workspace: &Path,
    ignore_local: bool,
) -> Result<String> {
    if ignore_local {
        return Ok(configured.to_string());
    }

    let command = format!(
        "cd {} && {} local 2>/dev/null || true",
        quote_path(workspace)?,
        quote_path(&layout.rbenv_bin())?
    );
    let local = runner
        .capture(&command)
        .map(|out| out.trim().to_string())
        .unwrap_or_default();

    if local.is_empty() {
        Ok(configured.to_string())
    } else {
        debug!(local = %local, configured, "Workspace pins a Ruby version");
        Ok(local)
    }
}

/// Versions rbenv reports as installed under this root.
pub fn installed_versions(runner: &dyn CommandRunner, layout: &Layout) -> Result<BTreeSet<String>> {
    let command = format!(
        "RBENV_ROOT={} {} versions --bare",
        quote_path(layout.root())?,
        quote_path(&layout.rbenv_bin())?
    );
    let out = runner.capture(&command)?;
    Ok(out.split_whitespace().map(str::to_string).collect())
}

/// Steps of [`ensure_version`], in the order they run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InstallStep {
    CheckPresence,
    UpdateManager,
    UpdateBuildPlugin,
    InstallVersion,
    Done,
}

impl InstallStep {
    fn next(self) -> Self {
        match self {
            InstallStep::CheckPresence => InstallStep::UpdateManager,
            InstallStep::UpdateManager => InstallStep::UpdateBuildPlugin,
            InstallStep::UpdateBuildPlugin => InstallStep::InstallVersion,
            InstallStep::InstallVersion | InstallStep::Done => InstallStep::Done,
        }
    }
}

/// Whether [`ensure_version`] had to install anything.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VersionStatus {
    installed: bool,
}

impl VersionStatus {
    /// Returns true if the version was installed during this run.
    #[must_use]
    pub fn installed(&self) -> bool {
        self.installed
    }
}

/// Make sure `version` is installed, refreshing rbenv and ruby-build first
/// so that recently released definitions are available.
pub fn ensure_version(
    runner: &dyn CommandRunner,
    layout: &Layout,
    version: &str,
    sink: &mut dyn Write,
) -> Result<VersionStatus> {
    let mut step = InstallStep::CheckPresence;
    let mut installed = false;

    while step != InstallStep::Done {
        step = match step {
            InstallStep::CheckPresence => {
                if installed_versions(runner, layout)?.contains(version) {
                    debug!(version, "Ruby already installed");
                    InstallStep::Done
                } else {
                    step.next()
                }
            }
            InstallStep::UpdateManager => {
                update_repository(runner, "rbenv", layout.root(), sink)?;
                step.next()
            }
            InstallStep::UpdateBuildPlugin => {
                update_repository(runner, "ruby-build", &layout.build_plugin(), sink)?;
                step.next()
            }
            InstallStep::InstallVersion => {
                writeln!(sink, "Install {version}")?;
                info!(version, "Installing Ruby");
                let command = format!(
                    "RBENV_ROOT={} {} install {}",
                    quote_path(layout.root())?,
                    quote_path(&layout.rbenv_bin())?,
                    quote(version)?
                );
                runner.run(&command, sink)?;
                installed = true;
                step.next()
            }
            InstallStep::Done => InstallStep::Done,
        };
    }

    Ok(VersionStatus { installed })
}
