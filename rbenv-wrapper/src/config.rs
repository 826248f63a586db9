//! Provisioning configuration as supplied by the host build system.
//!
//! The host hands over the job's form fields as a flat attribute map. The
//! keys keep the names the host form uses (`gem_list`, `rbenv_root`), with
//! aliases for the descriptive names.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Deserializer};

use crate::error::ProvisionError;

/// Gems installed when the configuration does not name any.
pub const DEFAULT_PACKAGES: [&str; 2] = ["bundler", "rake"];

/// Fixed upstream locations of rbenv and ruby-build.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Remotes {
    pub manager: String,
    pub build_plugin: String,
}

impl Remotes {
    pub const RBENV: &'static str = "git://github.com/sstephenson/rbenv.git";
    pub const RUBY_BUILD: &'static str = "git://github.com/sstephenson/ruby-build.git";
}

impl Default for Remotes {
    fn default() -> Self {
        Self {
            manager: Self::RBENV.to_string(),
            build_plugin: Self::RUBY_BUILD.to_string(),
        }
    }
}

/// Ordered list of gem names.
///
/// Accepts either the host form's comma-separated string (`"bundler,rake"`)
/// or a JSON array. Blank entries are dropped.
#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
#[serde(from = "RawPackageList")]
pub struct PackageList(Vec<String>);

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RawPackageList {
    Csv(String),
    List(Vec<String>),
}

impl From<RawPackageList> for PackageList {
    fn from(raw: RawPackageList) -> Self {
        match raw {
            RawPackageList::Csv(csv) => PackageList::parse(&csv),
            RawPackageList::List(names) => names.into_iter().collect(),
        }
    }
}

impl PackageList {
    /// Parse a comma-separated list such as `"bundler, rake"`.
    pub fn parse(csv: &str) -> Self {
        csv.split(',').collect()
    }

    pub fn names(&self) -> &[String] {
        &self.0
    }
}

impl<S: AsRef<str>> FromIterator<S> for PackageList {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|name| name.as_ref().trim().to_string())
                .filter(|name| !name.is_empty())
                .collect(),
        )
    }
}

/// Immutable input for one provisioning run.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Configuration {
    /// Ruby version to provision. Blank means "take it from the workspace".
    #[serde(default, deserialize_with = "null_as_default")]
    pub version: String,

    /// `None` selects [`DEFAULT_PACKAGES`]; an explicitly empty list installs nothing.
    #[serde(default, rename = "gem_list", alias = "package_list")]
    pub package_list: Option<PackageList>,

    #[serde(default, deserialize_with = "null_as_default")]
    pub ignore_local_version: bool,

    /// Where rbenv lives (`RBENV_ROOT`).
    #[serde(rename = "rbenv_root", alias = "root_path")]
    pub root_path: PathBuf,

    /// Fixed upstreams; the host form cannot change them.
    #[serde(skip)]
    pub remotes: Remotes,
}

fn null_as_default<'de, D, T>(deserializer: D) -> std::result::Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Option::unwrap_or_default)
}

impl Configuration {
    pub fn new(root_path: impl Into<PathBuf>) -> Self {
        Self {
            version: String::new(),
            package_list: None,
            ignore_local_version: false,
            root_path: root_path.into(),
            remotes: Remotes::default(),
        }
    }

    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.version = version.into();
        self
    }

    pub fn with_packages<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.package_list = Some(names.into_iter().collect());
        self
    }

    pub fn ignore_local_version(mut self, ignore: bool) -> Self {
        self.ignore_local_version = ignore;
        self
    }

    pub fn with_remotes(mut self, remotes: Remotes) -> Self {
        self.remotes = remotes;
        self
    }

    /// Gems to ensure, in order.
    pub fn packages(&self) -> Vec<String> {
        match &self.package_list {
            Some(list) => list.names().to_vec(),
            None => DEFAULT_PACKAGES.iter().map(|s| s.to_string()).collect(),
        }
    }

    pub fn validate(&self) -> std::result::Result<(), ProvisionError> {
        if self.root_path.as_os_str().is_empty() {
            return Err(ProvisionError::InvalidConfig(
                "rbenv_root must not be empty".to_string(),
            ));
        }
        if self.remotes.manager.trim().is_empty() || self.remotes.build_plugin.trim().is_empty() {
            return Err(ProvisionError::InvalidConfig(
                "repository remotes must not be empty".to_string(),
            ));
        }
        Ok(())
    }

    /// Parse and validate a configuration from the host's JSON attribute map.
    pub fn from_json(json: &str) -> std::result::Result<Self, ProvisionError> {
        let config: Configuration = serde_json::from_str(json)
            .map_err(|err| ProvisionError::InvalidConfig(err.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Load a configuration from a JSON file.
    pub fn load_from(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read configuration from {}", path.display()))?;
        Self::from_json(&content)
            .with_context(|| format!("Failed to parse configuration from {}", path.display()))
    }
}
