//! Environment variables handed back to the build.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use crate::layout::Layout;

pub const ROOT_VAR: &str = "RBENV_ROOT";
pub const VERSION_VAR: &str = "RBENV_VERSION";

/// A directory to put in front of `PATH`.
///
/// The tag names the contributor, so that several provisioning steps can
/// each add their own prefix without overwriting one another. The host sees
/// it as a `PATH+<TAG>` entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathPrefix {
    pub tag: String,
    pub dir: PathBuf,
}

impl PathPrefix {
    pub fn key(&self) -> String {
        format!("PATH+{}", self.tag)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnvironmentContribution {
    pub vars: BTreeMap<String, String>,
    pub path_prefix: PathPrefix,
}

impl EnvironmentContribution {
    pub fn get(&self, name: &str) -> Option<&str> {
        self.vars.get(name).map(String::as_str)
    }

    /// All entries in host form, `PATH+RBENV` included.
    pub fn entries(&self) -> Vec<(String, String)> {
        let mut entries: Vec<(String, String)> = self
            .vars
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect();
        entries.push((
            self.path_prefix.key(),
            self.path_prefix.dir.to_string_lossy().into_owned(),
        ));
        entries
    }

    /// Merge into `env`. Variables are overwritten; the prefix is prepended
    /// to any existing `PATH`.
    pub fn apply_to(&self, env: &mut BTreeMap<String, String>) {
        for (name, value) in &self.vars {
            env.insert(name.clone(), value.clone());
        }

        let dir = self.path_prefix.dir.to_string_lossy();
        let path = match env.get("PATH") {
            Some(existing) if !existing.is_empty() => format!("{dir}:{existing}"),
            _ => dir.into_owned(),
        };
        env.insert("PATH".to_string(), path);
    }
}

/// Build the environment for a provisioned root and version.
pub fn publish(root: &Path, version: &str) -> EnvironmentContribution {
    let layout = Layout::new(root);
    let mut vars = BTreeMap::new();
    vars.insert(ROOT_VAR.to_string(), root.to_string_lossy().into_owned());
    vars.insert(VERSION_VAR.to_string(), version.to_string());

    EnvironmentContribution {
        vars,
        path_prefix: PathPrefix {
            tag: "RBENV".to_string(),
            dir: layout.shims(),
        },
    }
}
