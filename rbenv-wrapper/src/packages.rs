//! Gem installation for the selected Ruby.

use std::collections::BTreeSet;
use std::io::Write;

use tracing::info;

use crate::command_runner::{quote, quote_path, CommandRunner};
use crate::error::Result;
use crate::layout::Layout;

/// Words printed by `gem list` for `version`.
///
/// The listing is split on whitespace, so `rake (13.0.6)` contributes `rake`.
pub fn installed_packages(
    runner: &dyn CommandRunner,
    layout: &Layout,
    version: &str,
) -> Result<BTreeSet<String>> {
    let command = format!(
        "RBENV_ROOT={} RBENV_VERSION={} {} list",
        quote_path(layout.root())?,
        quote(version)?,
        quote_path(&layout.gem_bin())?
    );
    let out = runner.capture(&command)?;
    Ok(out.split_whitespace().map(str::to_string).collect())
}

/// Install every gem in `names` that is missing, in order, rehashing the
/// shims after each one. Stops at the first failure.
///
/// Returns the gems that were installed.
pub fn ensure_packages(
    runner: &dyn CommandRunner,
    layout: &Layout,
    version: &str,
    names: &[String],
    sink: &mut dyn Write,
) -> Result<Vec<String>> {
    let present = installed_packages(runner, layout, version)?;
    let root = quote_path(layout.root())?;
    let mut installed = Vec::new();

    for name in names.iter().filter(|name| !present.contains(name.as_str())) {
        writeln!(sink, "Install {name}")?;
        info!(gem = %name, version, "Installing gem");

        let install = format!(
            "RBENV_ROOT={root} RBENV_VERSION={} {} install {}",
            quote(version)?,
            quote_path(&layout.gem_bin())?,
            quote(name)?
        );
        runner.run(&install, sink)?;

        let rehash = format!(
            "RBENV_ROOT={root} {} rehash",
            quote_path(&layout.rbenv_bin())?
        );
        runner.run(&rehash, sink)?;

        installed.push(name.clone());
    }

    Ok(installed)
}
