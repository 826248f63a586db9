//! Paths inside an rbenv root.

use std::path::{Path, PathBuf};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Layout {
    root: PathBuf,
}

impl Layout {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// `<root>/plugins/ruby-build`
    pub fn build_plugin(&self) -> PathBuf {
        self.root.join("plugins").join("ruby-build")
    }

    /// `<root>/bin/rbenv`
    pub fn rbenv_bin(&self) -> PathBuf {
        self.root.join("bin").join("rbenv")
    }

    pub fn shims(&self) -> PathBuf {
        self.root.join("shims")
    }

    /// `<root>/shims/gem`, resolved through `RBENV_VERSION`.
    pub fn gem_bin(&self) -> PathBuf {
        self.shims().join("gem")
    }
}
