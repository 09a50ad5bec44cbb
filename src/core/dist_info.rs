//! `.dist-info` documents shared by wheels and direct installs.

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use sha2::{Digest, Sha256};
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};
use crate::package::to_unix;

pub const WHEEL_VERSION: &str = "1.0";
pub const WHEEL_TAG: &str = "py3-none-any";
pub const INSTALLER: &str = "bazelpack";

/// One line of a `RECORD` file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordEntry {
    pub path: String,
    pub hash: Option<String>,
    pub size: Option<u64>,
}

impl RecordEntry {
    pub fn for_bytes(path: impl Into<String>, bytes: &[u8]) -> Self {
        Self {
            path: path.into(),
            hash: Some(hash_bytes(bytes)),
            size: Some(bytes.len() as u64),
        }
    }

    /// The `RECORD` file lists itself without hash or size.
    pub fn unhashed(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            hash: None,
            size: None,
        }
    }

    fn render(&self) -> String {
        format!(
            "{},{},{}",
            csv_field(&self.path),
            self.hash.as_deref().unwrap_or(""),
            self.size.map(|s| s.to_string()).unwrap_or_default()
        )
    }
}

/// `sha256=<urlsafe base64, unpadded>` digest as used in `RECORD`.
pub fn hash_bytes(bytes: &[u8]) -> String {
    format!("sha256={}", URL_SAFE_NO_PAD.encode(Sha256::digest(bytes)))
}

fn csv_field(value: &str) -> String {
    if value.contains(',') || value.contains('"') {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}

pub fn render_record(entries: &[RecordEntry]) -> String {
    entries.iter().map(|e| format!("{}\n", e.render())).collect()
}

pub fn render_wheel() -> String {
    format!(
        "Wheel-Version: {}\nGenerator: {} ({})\nRoot-Is-Purelib: true\nTag: {}\n",
        WHEEL_VERSION,
        INSTALLER,
        env!("CARGO_PKG_VERSION"),
        WHEEL_TAG
    )
}

/// Distinct top-level import names, one per line.
pub fn render_top_level(packages: &[String]) -> String {
    let names: BTreeSet<&str> = packages
        .iter()
        .filter_map(|p| p.split('.').next())
        .filter(|p| !p.is_empty())
        .collect();
    names.into_iter().map(|n| format!("{}\n", n)).collect()
}

/// Every regular file under `dir`, as (archive path, absolute path), sorted.
pub fn collect_files(dir: &Path) -> Result<Vec<(String, PathBuf)>> {
    let pattern = format!("{}/**/*", glob::Pattern::escape(&dir.to_string_lossy()));
    let entries = glob::glob(&pattern)
        .map_err(|e| Error::internal_unexpected(format!("Invalid glob '{}': {}", pattern, e)))?;

    let mut files = Vec::new();
    for entry in entries {
        let path = entry
            .map_err(|e| Error::internal_io(e.to_string(), Some(format!("scan {}", dir.display()))))?;
        if !path.is_file() {
            continue;
        }
        if let Ok(rel) = path.strip_prefix(dir) {
            files.push((to_unix(rel), path.clone()));
        }
    }

    files.sort();
    Ok(files)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn hash_matches_known_digest() {
        // sha256("") in urlsafe base64 without padding
        assert_eq!(
            hash_bytes(b""),
            "sha256=47DEQpj8HBSa-_TImW-5JCeuQeRkm5NMpJWZG3hSuFU"
        );
    }

    #[test]
    fn record_lists_itself_last_without_hash() {
        let entries = vec![
            RecordEntry::for_bytes("pkg/__init__.py", b""),
            RecordEntry::unhashed("pkg-1.0.dist-info/RECORD"),
        ];
        let record = render_record(&entries);
        let lines: Vec<&str> = record.lines().collect();
        assert_eq!(
            lines[0],
            "pkg/__init__.py,sha256=47DEQpj8HBSa-_TImW-5JCeuQeRkm5NMpJWZG3hSuFU,0"
        );
        assert_eq!(lines[1], "pkg-1.0.dist-info/RECORD,,");
    }

    #[test]
    fn record_quotes_paths_with_commas() {
        let record = render_record(&[RecordEntry::unhashed("a,b.py")]);
        assert_eq!(record, "\"a,b.py\",,\n");
    }

    #[test]
    fn top_level_deduplicates_roots() {
        let packages = vec![
            "privacy".to_string(),
            "privacy.analysis".to_string(),
            "dp_accounting".to_string(),
        ];
        assert_eq!(render_top_level(&packages), "dp_accounting\nprivacy\n");
    }

    #[test]
    fn wheel_file_declares_pure_python_tag() {
        let wheel = render_wheel();
        assert!(wheel.starts_with("Wheel-Version: 1.0\n"));
        assert!(wheel.contains("Root-Is-Purelib: true\n"));
        assert!(wheel.ends_with("Tag: py3-none-any\n"));
    }

    #[test]
    fn collect_files_is_sorted_and_relative() {
        let dir = TempDir::new().unwrap();
        fs::create_dir_all(dir.path().join("pkg/sub")).unwrap();
        fs::write(dir.path().join("pkg/sub/b.py"), "").unwrap();
        fs::write(dir.path().join("pkg/a.py"), "").unwrap();

        let files: Vec<String> = collect_files(dir.path())
            .unwrap()
            .into_iter()
            .map(|(rel, _)| rel)
            .collect();
        assert_eq!(files, vec!["pkg/a.py", "pkg/sub/b.py"]);
    }
}
