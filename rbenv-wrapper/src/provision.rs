//! The provisioning sequence.
//!
//! Each run inspects the rbenv root from scratch and issues only the
//! commands needed to reach the configured state:
//!
//! 1. Clone rbenv, then ruby-build into `<root>/plugins`, if missing
//! 2. Resolve the Ruby version (workspace `.ruby-version` wins unless ignored)
//! 3. Install that version if rbenv does not list it
//! 4. Install missing gems, rehashing after each
//! 5. Publish `RBENV_ROOT`, `RBENV_VERSION` and the shims `PATH` prefix
//!
//! The first failing command ends the run. Nothing already cloned or
//! installed is rolled back, and no environment is produced.
//!
//! Runs against the same root must not overlap; callers serialize them.

use std::io::Write;
use std::path::Path;
use std::sync::Arc;

use tracing::{debug, info};

use crate::command_runner::{CommandRunner, ShellCommandRunner};
use crate::config::Configuration;
use crate::environment::{publish, EnvironmentContribution};
use crate::error::{ProvisionError, Result};
use crate::layout::Layout;
use crate::packages::ensure_packages;
use crate::repo::ensure_repository;
use crate::version::{ensure_version, resolve_version};

/// What a run changed on disk.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProvisionReport {
    pub cloned_manager: bool,
    pub cloned_build_plugin: bool,
    pub installed_version: Option<String>,
    pub installed_packages: Vec<String>,
}

impl ProvisionReport {
    /// True when the run found everything already in place.
    pub fn is_noop(&self) -> bool {
        !self.cloned_manager
            && !self.cloned_build_plugin
            && self.installed_version.is_none()
            && self.installed_packages.is_empty()
    }
}

/// Result of a successful run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Provisioned {
    pub version: String,
    pub environment: EnvironmentContribution,
    pub report: ProvisionReport,
}

pub struct Provisioner {
    config: Configuration,
    runner: Arc<dyn CommandRunner>,
}

impl Provisioner {
    pub fn new(config: Configuration, runner: Arc<dyn CommandRunner>) -> Self {
        Self { config, runner }
    }

    /// Provisioner that runs real commands through `bash`.
    pub fn with_shell(config: Configuration) -> Self {
        Self::new(config, Arc::new(ShellCommandRunner::new()))
    }

    /// Run the whole sequence for the build whose workspace is `workspace`.
    ///
    /// Progress lines and the output of clone/install commands go to `sink`.
    pub fn provision(&self, workspace: &Path, sink: &mut dyn Write) -> Result<Provisioned> {
        self.config.validate()?;

        let runner = self.runner.as_ref();
        let config = &self.config;
        let layout = Layout::new(&config.root_path);
        let mut report = ProvisionReport::default();

        info!(
            root = %layout.root().display(),
            workspace = %workspace.display(),
            "Provisioning rbenv"
        );

        report.cloned_manager =
            ensure_repository(runner, "rbenv", &config.remotes.manager, layout.root(), sink)?;
        report.cloned_build_plugin = ensure_repository(
            runner,
            "ruby-build",
            &config.remotes.build_plugin,
            &layout.build_plugin(),
            sink,
        )?;

        let version = resolve_version(
            runner,
            &layout,
            &config.version,
            workspace,
            config.ignore_local_version,
        )?;
        if version.trim().is_empty() {
            return Err(ProvisionError::BlankVersion);
        }
        debug!(version = %version, "Resolved Ruby version");

        if ensure_version(runner, &layout, &version, sink)?.installed() {
            report.installed_version = Some(version.clone());
        }

        report.installed_packages =
            ensure_packages(runner, &layout, &version, &config.packages(), sink)?;

        let environment = publish(layout.root(), &version);
        info!(version = %version, noop = report.is_noop(), "rbenv ready");

        Ok(Provisioned {
            version,
            environment,
            report,
        })
    }
}
