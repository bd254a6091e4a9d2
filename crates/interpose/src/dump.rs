//! Writing generated class files to disk for inspection.

use std::path::{Path, PathBuf};

use interpose_core::names;
use interpose_gen::GeneratedArtifact;

pub const DUMP_VAR: &str = "INTERPOSE_DUMP";
pub const DUMP_DIR_VAR: &str = "INTERPOSE_DUMP_DIR";
pub const DEFAULT_DUMP_DIR: &str = "interpose";

/// Where (and whether) to write generated class files.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DumpConfig {
    pub enabled: bool,
    pub dir: PathBuf,
}

impl Default for DumpConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            dir: PathBuf::from(DEFAULT_DUMP_DIR),
        }
    }
}

impl DumpConfig {
    /// Dumping enabled, into `dir`.
    pub fn to_dir(dir: impl Into<PathBuf>) -> Self {
        Self {
            enabled: true,
            dir: dir.into(),
        }
    }

    /// Read `INTERPOSE_DUMP` and `INTERPOSE_DUMP_DIR`.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Like [`from_env`](Self::from_env), with an explicit variable lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let enabled = lookup(DUMP_VAR).is_some_and(|value| is_truthy(&value));
        let dir = lookup(DUMP_DIR_VAR)
            .filter(|dir| !dir.trim().is_empty())
            .map_or_else(|| PathBuf::from(DEFAULT_DUMP_DIR), PathBuf::from);
        Self { enabled, dir }
    }

    /// `<dir>/<package path>/<Simple>.class`
    pub fn path_for(&self, class_name: &str) -> PathBuf {
        let mut path = self.dir.clone();
        let package = names::package_of(class_name);
        if !package.is_empty() {
            path.extend(package.split('.'));
        }
        path.push(format!("{}.class", names::simple_name(class_name)));
        path
    }

    /// Write the artifact if dumping is enabled.
    ///
    /// I/O failures are logged and swallowed; returns the written path.
    pub fn write(&self, artifact: &GeneratedArtifact) -> Option<PathBuf> {
        if !self.enabled {
            return None;
        }
        let path = self.path_for(&artifact.name);
        match write_file(&path, &artifact.bytes) {
            Ok(()) => {
                tracing::debug!(name = %artifact.name, path = %path.display(), "dumped artifact");
                Some(path)
            }
            Err(err) => {
                tracing::warn!(name = %artifact.name, path = %path.display(), error = %err, "failed to dump artifact");
                None
            }
        }
    }
}

fn write_file(path: &Path, bytes: &[u8]) -> std::io::Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, bytes)
}

fn is_truthy(value: &str) -> bool {
    matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "1" | "true" | "yes"
    )
}
