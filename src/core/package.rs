//! Package discovery and the `build_py` step.

use serde::Serialize;
use std::fs;
use std::path::{Component, Path, PathBuf};

use crate::error::{Error, Result};
use crate::utils::io;

const INIT_FILE: &str = "__init__.py";

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BuildPyOutput {
    pub build_lib: String,
    pub packages: Vec<String>,
    pub files: Vec<String>,
}

/// Discover importable packages under `root`.
///
/// A directory is a package when it holds `__init__.py` and every parent
/// between it and `root` is a package too. Directories whose names are not
/// identifiers (hidden ones, `bazel-*` output links) and `excluded` top-level
/// directories are never entered.
pub fn find_packages(root: &Path, excluded: &[String]) -> Result<Vec<String>> {
    let mut packages = Vec::new();
    for name in child_dirs(root)? {
        if excluded.iter().any(|e| e == &name) {
            continue;
        }
        collect_packages(&root.join(&name), name, &mut packages)?;
    }
    packages.sort();
    Ok(packages)
}

fn collect_packages(dir: &Path, dotted: String, out: &mut Vec<String>) -> Result<()> {
    if !dir.join(INIT_FILE).is_file() {
        return Ok(());
    }
    for name in child_dirs(dir)? {
        collect_packages(&dir.join(&name), format!("{}.{}", dotted, name), out)?;
    }
    out.push(dotted);
    Ok(())
}

/// Subdirectory names that can be Python packages.
fn child_dirs(dir: &Path) -> Result<Vec<String>> {
    let entries = fs::read_dir(dir).map_err(|e| {
        Error::internal_io(e.to_string(), Some(format!("scan {}", dir.display())))
    })?;

    let mut names = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|e| {
            Error::internal_io(e.to_string(), Some(format!("scan {}", dir.display())))
        })?;
        let name = entry.file_name().to_string_lossy().to_string();
        if is_identifier(&name) && entry.path().is_dir() {
            names.push(name);
        }
    }
    Ok(names)
}

fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    matches!(chars.next(), Some(c) if c == '_' || c.is_ascii_alphabetic())
        && chars.all(|c| c == '_' || c.is_ascii_alphanumeric())
}

/// Check that every explicitly listed package exists with an `__init__.py`.
pub fn validate_packages(root: &Path, packages: &[String]) -> Result<()> {
    for package in packages {
        if !package_dir(root, package).join(INIT_FILE).is_file() {
            return Err(Error::config_invalid_value(
                "packages",
                Some(package.clone()),
                format!("Package directory has no {}", INIT_FILE),
            ));
        }
    }
    Ok(())
}

pub fn package_dir(root: &Path, package: &str) -> PathBuf {
    package.split('.').fold(root.to_path_buf(), |dir, part| dir.join(part))
}

/// Copy each package's `.py` modules into `build_lib`, preserving layout.
pub fn build_py(root: &Path, packages: &[String], build_lib: &Path) -> Result<BuildPyOutput> {
    io::ensure_dir(build_lib, "create build/lib")?;

    let mut files = Vec::new();
    for package in packages {
        let src_dir = package_dir(root, package);
        let pattern = format!("{}/*.py", glob::Pattern::escape(&src_dir.to_string_lossy()));
        let entries = glob::glob(&pattern).map_err(|e| {
            Error::internal_unexpected(format!("Invalid module glob '{}': {}", pattern, e))
        })?;

        for entry in entries {
            let src = entry.map_err(|e| {
                Error::internal_io(e.to_string(), Some(format!("scan {}", package)))
            })?;
            if !src.is_file() {
                continue;
            }
            let rel = src.strip_prefix(root).map_err(|e| Error::other(e.to_string()))?;
            io::copy_file(&src, &build_lib.join(rel), "copy module")?;
            files.push(to_unix(rel));
        }
    }

    files.sort();
    crate::log_status!("build_py", "Copied {} module(s) into {}", files.len(), build_lib.display());

    Ok(BuildPyOutput {
        build_lib: build_lib.display().to_string(),
        packages: packages.to_vec(),
        files,
    })
}

/// Relative path with `/` separators, as archives and RECORD files expect.
pub fn to_unix(rel: &Path) -> String {
    rel.components()
        .filter_map(|c| match c {
            Component::Normal(name) => Some(name.to_string_lossy().to_string()),
            _ => None,
        })
        .collect::<Vec<_>>()
        .join("/")
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn touch(root: &Path, rel: &str, content: &str) {
        let path = root.join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
    }

    fn excluded() -> Vec<String> {
        vec!["build".to_string(), "dist".to_string()]
    }

    #[test]
    fn finds_nested_packages_in_order() {
        let dir = TempDir::new().unwrap();
        touch(dir.path(), "privacy/__init__.py", "");
        touch(dir.path(), "privacy/analysis/__init__.py", "");
        touch(dir.path(), "privacy/analysis/rdp.py", "");
        touch(dir.path(), "privacy/optimizers/__init__.py", "");

        let packages = find_packages(dir.path(), &excluded()).unwrap();
        assert_eq!(
            packages,
            vec!["privacy", "privacy.analysis", "privacy.optimizers"]
        );
    }

    #[test]
    fn skips_orphans_and_excluded_directories() {
        let dir = TempDir::new().unwrap();
        touch(dir.path(), "pkg/__init__.py", "");
        touch(dir.path(), "pkg/data/nested/__init__.py", "");
        touch(dir.path(), "build/lib/pkg/__init__.py", "");
        touch(dir.path(), ".venv/site/__init__.py", "");
        touch(dir.path(), "bazel-out/x/__init__.py", "");

        let packages = find_packages(dir.path(), &excluded()).unwrap();
        assert_eq!(packages, vec!["pkg"]);
    }

    #[test]
    fn validate_rejects_missing_package() {
        let dir = TempDir::new().unwrap();
        touch(dir.path(), "pkg/__init__.py", "");

        assert!(validate_packages(dir.path(), &["pkg".to_string()]).is_ok());
        let err = validate_packages(dir.path(), &["pkg.missing".to_string()]).unwrap_err();
        assert_eq!(err.code.as_str(), "config.invalid_value");
    }

    #[test]
    fn build_py_copies_modules_only() {
        let dir = TempDir::new().unwrap();
        touch(dir.path(), "pkg/__init__.py", "");
        touch(dir.path(), "pkg/version.py", "__version__ = '1.0'\n");
        touch(dir.path(), "pkg/BUILD", "py_library()\n");
        touch(dir.path(), "pkg/sub/__init__.py", "");
        touch(dir.path(), "pkg/sub/mod.py", "x = 1\n");

        let build_lib = dir.path().join("build").join("lib");
        let packages = vec!["pkg".to_string(), "pkg.sub".to_string()];
        let output = build_py(dir.path(), &packages, &build_lib).unwrap();

        assert_eq!(
            output.files,
            vec![
                "pkg/__init__.py",
                "pkg/sub/__init__.py",
                "pkg/sub/mod.py",
                "pkg/version.py"
            ]
        );
        assert!(build_lib.join("pkg/version.py").is_file());
        assert!(!build_lib.join("pkg/BUILD").exists());
    }

    #[test]
    fn package_dir_maps_dots_to_directories() {
        assert_eq!(
            package_dir(Path::new("/r"), "a.b.c"),
            PathBuf::from("/r/a/b/c")
        );
    }
}
