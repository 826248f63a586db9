//! rbenv-wrapper - provision an rbenv-managed Ruby for a build job
//!
//! Before a build runs, the host calls [`Provisioner::provision`] once with
//! the job's [`Configuration`]. The provisioner makes sure rbenv and
//! ruby-build are checked out, installs the requested Ruby and gems when
//! they are missing, and returns the environment the build should run with.
//!
//! All external work goes through a [`CommandRunner`]. With the
//! `test-support` feature, `testing::MockCommandRunner` stands in for real
//! git and rbenv.
//!
//! ```rust,ignore
//! use rbenv_wrapper::{Configuration, Provisioner};
//!
//! let config = Configuration::from_json(&attrs)?;
//! let done = Provisioner::with_shell(config).provision(&workspace, &mut console)?;
//! for (name, value) in done.environment.entries() {
//!     build_env.insert(name, value);
//! }
//! ```

pub mod command_runner;
pub mod config;
pub mod environment;
pub mod error;
pub mod layout;
pub mod packages;
pub mod provision;
pub mod repo;
#[cfg(any(test, feature = "test-support"))]
pub mod testing;
pub mod version;

pub use command_runner::{CommandRunner, ExecutionResult, ShellCommandRunner};
pub use config::{Configuration, PackageList, Remotes, DEFAULT_PACKAGES};
pub use environment::{EnvironmentContribution, PathPrefix};
pub use error::{ProvisionError, Result};
pub use provision::{ProvisionReport, Provisioned, Provisioner};

/// Name shown when the wrapper is registered with the host.
pub const DISPLAY_NAME: &str = "rbenv build wrapper";
