//! A loaded project: workspace root, manifest, and metadata.
//!
//! The version file is read once, while the project loads. A bad version file
//! fails the command before any step runs.

use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};

use crate::defaults::Defaults;
use crate::error::{Error, Result};
use crate::manifest::{self, Manifest, PrebuildSettings};
use crate::metadata::PackageMetadata;
use crate::package;
use crate::version_file;

#[derive(Debug, Clone)]
pub struct Project {
    pub root: PathBuf,
    pub manifest_path: PathBuf,
    pub manifest: Manifest,
    pub metadata: PackageMetadata,
    pub defaults: Defaults,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectSummary {
    pub root: String,
    pub manifest_path: String,
    pub version_file: String,
}

impl Project {
    /// Find the manifest (explicit path or walking up from `cwd`) and load it.
    pub fn discover(explicit: Option<&Path>, cwd: &Path, defaults: Defaults) -> Result<Self> {
        let path = manifest::locate(explicit, cwd)?;
        Self::load(&path, defaults)
    }

    pub fn load(manifest_path: &Path, defaults: Defaults) -> Result<Self> {
        let manifest_path = fs::canonicalize(manifest_path).map_err(|e| {
            Error::internal_io(
                e.to_string(),
                Some(format!("resolve {}", manifest_path.display())),
            )
        })?;

        let root = manifest_path
            .parent()
            .map(Path::to_path_buf)
            .ok_or_else(|| Error::other(format!("Manifest has no parent: {}", manifest_path.display())))?;

        let manifest = Manifest::load(&manifest_path)?;
        let version = version_file::load_version(&root.join(manifest.version_file()))?;
        let metadata = PackageMetadata::from_manifest(&manifest, version)?;

        Ok(Self {
            root,
            manifest_path,
            manifest,
            metadata,
            defaults,
        })
    }

    pub fn version(&self) -> &str {
        &self.metadata.version
    }

    pub fn version_file_path(&self) -> PathBuf {
        self.root.join(self.manifest.version_file())
    }

    pub fn build_dir(&self) -> PathBuf {
        self.root.join(&self.defaults.build_dir)
    }

    pub fn build_lib(&self) -> PathBuf {
        self.build_dir().join("lib")
    }

    pub fn dist_dir(&self) -> PathBuf {
        self.root.join(&self.defaults.dist_dir)
    }

    pub fn prebuild_settings(&self) -> PrebuildSettings {
        self.manifest.prebuild_settings(&self.defaults)
    }

    /// Packages to ship: the manifest list if given, otherwise discovered on disk.
    pub fn packages(&self) -> Result<Vec<String>> {
        match &self.manifest.packages {
            Some(explicit) => {
                package::validate_packages(&self.root, explicit)?;
                Ok(explicit.clone())
            }
            None => package::find_packages(&self.root, &self.excluded_dirs()),
        }
    }

    fn excluded_dirs(&self) -> Vec<String> {
        vec![self.defaults.build_dir.clone(), self.defaults.dist_dir.clone()]
    }

    pub fn summary(&self) -> ProjectSummary {
        ProjectSummary {
            root: self.root.display().to_string(),
            manifest_path: self.manifest_path.display().to_string(),
            version_file: self.version_file_path().display().to_string(),
        }
    }
}
