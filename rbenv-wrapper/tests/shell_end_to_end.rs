//! End-to-end run through real `bash` against stub rbenv and gem scripts.
//!
//! Kept to a single test so that no other test in this binary spawns
//! processes while the stubs are being written.

use std::collections::BTreeMap;
use std::fs;
use std::os::unix::fs::PermissionsExt;
use std::path::Path;

use rbenv_wrapper::{Configuration, Provisioner};

const RBENV_STUB: &str = r#"#!/bin/sh
case "$1" in
  versions) echo 2.6.5; echo 2.7.0 ;;
  local) [ -f .ruby-version ] && cat .ruby-version || exit 1 ;;
  install) echo "rbenv install $2" >> "$RBENV_ROOT/commands.log" ;;
  rehash) echo "rbenv rehash" >> "$RBENV_ROOT/commands.log" ;;
  *) exit 2 ;;
esac
"#;

const GEM_STUB: &str = r#"#!/bin/sh
case "$1" in
  list) [ -f "$RBENV_ROOT/gems" ] && sed 's/$/ (1.0.0)/' "$RBENV_ROOT/gems" ;;
  install)
    echo "$2" >> "$RBENV_ROOT/gems"
    echo "Successfully installed $2-1.0.0"
    echo "gem install $2 for $RBENV_VERSION" >> "$RBENV_ROOT/commands.log" ;;
  *) exit 2 ;;
esac
exit 0
"#;

fn write_executable(path: &Path, content: &str) {
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, content).unwrap();
    fs::set_permissions(path, fs::Permissions::from_mode(0o755)).unwrap();
}

fn read_log(root: &Path) -> Vec<String> {
    fs::read_to_string(root.join("commands.log"))
        .unwrap_or_default()
        .lines()
        .map(str::to_string)
        .collect()
}

#[test]
fn provisions_with_real_shell_and_is_idempotent() {
    let root_dir = tempfile::tempdir().unwrap();
    let workspace = tempfile::tempdir().unwrap();
    let root = root_dir.path();

    write_executable(&root.join("bin/rbenv"), RBENV_STUB);
    write_executable(&root.join("shims/gem"), GEM_STUB);
    fs::create_dir_all(root.join("plugins/ruby-build")).unwrap();

    let config = Configuration::new(root).with_version("2.7.0");
    let provisioner = Provisioner::with_shell(config);

    // First run: rbenv and the version are present, both gems are missing.
    let mut console = Vec::new();
    let first = provisioner.provision(workspace.path(), &mut console).unwrap();
    let console = String::from_utf8(console).unwrap();

    assert_eq!(first.version, "2.7.0");
    assert!(!first.report.cloned_manager);
    assert!(!first.report.cloned_build_plugin);
    assert!(first.report.installed_version.is_none());
    assert_eq!(first.report.installed_packages, vec!["bundler", "rake"]);
    assert_eq!(
        read_log(root),
        vec![
            "gem install bundler for 2.7.0",
            "rbenv rehash",
            "gem install rake for 2.7.0",
            "rbenv rehash",
        ]
    );
    assert!(console.contains("Install bundler\n"));
    assert!(console.contains("Successfully installed rake-1.0.0"));

    // Second run changes nothing.
    let second = provisioner
        .provision(workspace.path(), &mut std::io::sink())
        .unwrap();
    assert!(second.report.is_noop());
    assert_eq!(read_log(root).len(), 4);

    // A .ruby-version in the workspace picks 2.6.5, which is also installed.
    fs::write(workspace.path().join(".ruby-version"), "2.6.5\n").unwrap();
    fs::remove_file(root.join("gems")).unwrap();
    let pinned = provisioner
        .provision(workspace.path(), &mut std::io::sink())
        .unwrap();
    assert_eq!(pinned.version, "2.6.5");
    assert!(pinned.report.installed_version.is_none());

    let mut env = BTreeMap::new();
    env.insert("PATH".to_string(), "/usr/bin".to_string());
    pinned.environment.apply_to(&mut env);
    assert_eq!(env["RBENV_VERSION"], "2.6.5");
    assert_eq!(
        env["PATH"],
        format!("{}:/usr/bin", root.join("shims").display())
    );
}
