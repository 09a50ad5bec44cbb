use serde::Serialize;

use crate::manifest::Manifest;
use crate::requirement::Requirement;
use crate::Result;

pub const METADATA_VERSION: &str = "2.1";

/// Package metadata emitted into wheels and installed `.dist-info` directories.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PackageMetadata {
    pub name: String,
    pub version: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub license: Option<String>,
    pub requires: Vec<Requirement>,
}

impl PackageMetadata {
    pub fn from_manifest(manifest: &Manifest, version: String) -> Result<Self> {
        Ok(Self {
            name: manifest.name.clone(),
            version,
            url: manifest.url.clone(),
            license: manifest.license.clone(),
            requires: Requirement::parse_all(&manifest.install_requires)?,
        })
    }

    /// Distribution name escaped for file names (`tensorflow-privacy` -> `tensorflow_privacy`).
    pub fn dist_name(&self) -> String {
        escape_component(&self.name)
    }

    pub fn dist_info_dir(&self) -> String {
        format!("{}-{}.dist-info", self.dist_name(), self.file_version())
    }

    pub fn wheel_file_name(&self) -> String {
        format!(
            "{}-{}-py3-none-any.whl",
            self.dist_name(),
            self.file_version()
        )
    }

    fn file_version(&self) -> String {
        self.version.replace('-', "_")
    }

    /// Render the `METADATA` / `PKG-INFO` document.
    pub fn render(&self) -> String {
        let mut out = String::new();
        out.push_str(&format!("Metadata-Version: {}\n", METADATA_VERSION));
        out.push_str(&format!("Name: {}\n", self.name));
        out.push_str(&format!("Version: {}\n", self.version));
        if let Some(url) = &self.url {
            out.push_str(&format!("Home-page: {}\n", url));
        }
        if let Some(license) = &self.license {
            out.push_str(&format!("License: {}\n", license));
        }
        for req in &self.requires {
            out.push_str(&format!("Requires-Dist: {}\n", req));
        }
        out
    }
}

/// Replace runs of `-`, `_` and `.` with a single underscore.
fn escape_component(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    let mut in_run = false;
    for ch in value.chars() {
        if matches!(ch, '-' | '_' | '.') {
            if !in_run {
                out.push('_');
            }
            in_run = true;
        } else {
            out.push(ch);
            in_run = false;
        }
    }
    out
}
