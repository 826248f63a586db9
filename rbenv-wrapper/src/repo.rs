//! Git checkouts of rbenv and ruby-build.
//!
//! Presence is decided by `test -d` alone. A `test -d` that fails for any
//! reason (missing directory, permission denied) reads as "absent", and the
//! following clone then reports the real problem.

use std::io::Write;
use std::path::Path;

use tracing::info;

use crate::command_runner::{quote, quote_path, CommandRunner};
use crate::error::Result;

/// True when `test -d <path>` succeeds.
pub fn directory_exists(runner: &dyn CommandRunner, path: &Path) -> Result<bool> {
    let command = format!("test -d {}", quote_path(path)?);
    let mut discard = std::io::sink();
    Ok(runner.execute(&command, &mut discard)? == 0)
}

/// Clone `remote` into `path` unless the directory is already there.
///
/// Returns whether a clone was performed.
pub fn ensure_repository(
    runner: &dyn CommandRunner,
    label: &str,
    remote: &str,
    path: &Path,
    sink: &mut dyn Write,
) -> Result<bool> {
    if directory_exists(runner, path)? {
        return Ok(false);
    }

    writeln!(sink, "Install {label}")?;
    info!(label, remote, path = %path.display(), "Cloning repository");
    let command = format!(
        "git clone {} {}",
        quote(remote)?,
        quote_path(path)?
    );
    runner.run(&command, sink)?;
    Ok(true)
}

/// Pull the latest commits into an existing checkout.
pub fn update_repository(
    runner: &dyn CommandRunner,
    label: &str,
    path: &Path,
    sink: &mut dyn Write,
) -> Result<()> {
    writeln!(sink, "Update {label}")?;
    info!(label, path = %path.display(), "Updating repository");
    let command = format!("cd {} && git pull", quote_path(path)?);
    runner.run(&command, sink)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::MockCommandRunner;
    use crate::error::ProvisionError;

    const REMOTE: &str = "git://github.com/sstephenson/rbenv.git";

    #[test]
    fn test_present_directory_issues_no_clone() {
        let runner = MockCommandRunner::new();
        let mut sink = Vec::new();
        let cloned =
            ensure_repository(&runner, "rbenv", REMOTE, Path::new("/opt/rbenv"), &mut sink).unwrap();
        assert!(!cloned);
        assert_eq!(runner.calls(), vec!["test -d /opt/rbenv"]);
        assert!(sink.is_empty());
    }

    #[test]
    fn test_absent_directory_is_cloned() {
        let runner = MockCommandRunner::new().fail("test -d", 1);
        let mut sink = Vec::new();
        let cloned =
            ensure_repository(&runner, "rbenv", REMOTE, Path::new("/opt/rbenv"), &mut sink).unwrap();
        assert!(cloned);
        assert_eq!(
            runner.calls(),
            vec![
                "test -d /opt/rbenv".to_string(),
                format!("git clone {REMOTE} /opt/rbenv"),
            ]
        );
        assert_eq!(String::from_utf8(sink).unwrap(), "Install rbenv\n");
    }

    #[test]
    fn test_presence_check_failure_is_treated_as_absent() {
        // Permission denied looks the same as missing.
        let runner = MockCommandRunner::new().fail("test -d", 126);
        let cloned = ensure_repository(
            &runner,
            "rbenv",
            REMOTE,
            Path::new("/opt/rbenv"),
            &mut std::io::sink(),
        )
        .unwrap();
        assert!(cloned);
    }

    #[test]
    fn test_clone_failure_propagates() {
        let runner = MockCommandRunner::new().fail("test -d", 1).fail("git clone", 128);
        let err = ensure_repository(
            &runner,
            "rbenv",
            REMOTE,
            Path::new("/opt/rbenv"),
            &mut std::io::sink(),
        )
        .unwrap_err();
        assert_eq!(err.exit_code(), Some(128));
        assert!(matches!(err, ProvisionError::CommandFailed { .. }));
    }

    #[test]
    fn test_update_runs_git_pull_in_checkout() {
        let runner = MockCommandRunner::new();
        let mut sink = Vec::new();
        update_repository(
            &runner,
            "ruby-build",
            Path::new("/opt/rbenv/plugins/ruby-build"),
            &mut sink,
        )
        .unwrap();
        assert_eq!(
            runner.calls(),
            vec!["cd /opt/rbenv/plugins/ruby-build && git pull"]
        );
        assert_eq!(String::from_utf8(sink).unwrap(), "Update ruby-build\n");
    }

    #[test]
    fn test_non_utf8_root_is_rejected_before_any_command() {
        use std::ffi::OsStr;
        use std::os::unix::ffi::OsStrExt;

        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().join(OsStr::from_bytes(b"rbenv-\xff"));
        std::fs::create_dir(&root).unwrap();

        let runner = MockCommandRunner::new().fail("test -d", 1);
        let err = ensure_repository(&runner, "rbenv", REMOTE, &root, &mut std::io::sink())
            .unwrap_err();
        assert!(matches!(err, ProvisionError::UnquotableArgument { .. }));
        assert!(runner.calls().is_empty());

        let shell = crate::command_runner::ShellCommandRunner::new();
        assert!(directory_exists(&shell, &root).is_err());
    }

    #[test]
    fn test_directory_exists_against_real_shell() {
        let runner = crate::command_runner::ShellCommandRunner::new();
        let dir = tempfile::tempdir().unwrap();
        assert!(directory_exists(&runner, dir.path()).unwrap());
        assert!(!directory_exists(&runner, &dir.path().join("missing")).unwrap());
    }
}
