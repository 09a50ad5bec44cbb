use crate::error::{Error, Result};
use std::env;
use std::path::{Path, PathBuf};

/// Manifest file name expected at the workspace root.
pub const MANIFEST_FILE: &str = "bazelpack.json";

/// Base bazelpack config directory (universal ~/.config/bazelpack/ on all platforms)
pub fn bazelpack() -> Result<PathBuf> {
    #[cfg(windows)]
    {
        let appdata = env::var("APPDATA").map_err(|_| {
            Error::internal_unexpected(
                "APPDATA environment variable not set on Windows".to_string(),
            )
        })?;
        Ok(PathBuf::from(appdata).join("bazelpack"))
    }

    #[cfg(not(windows))]
    {
        let home = env::var("HOME").map_err(|_| {
            Error::internal_unexpected(
                "HOME environment variable not set on Unix-like system".to_string(),
            )
        })?;
        Ok(PathBuf::from(home).join(".config").join("bazelpack"))
    }
}

/// Global config.json path
pub fn config_json() -> Result<PathBuf> {
    Ok(bazelpack()?.join("config.json"))
}

/// Walk up from `start` until a directory containing the manifest is found.
pub fn find_manifest(start: &Path) -> Option<PathBuf> {
    start
        .ancestors()
        .map(|dir| dir.join(MANIFEST_FILE))
        .find(|candidate| candidate.is_file())
}

/// Expand a leading `~` in a user-configured path.
pub fn expand(path: &str) -> PathBuf {
    PathBuf::from(shellexpand::tilde(path).into_owned())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn find_manifest_walks_up_to_workspace_root() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join(MANIFEST_FILE), "{}").unwrap();
        let nested = dir.path().join("pkg").join("sub");
        fs::create_dir_all(&nested).unwrap();

        let found = find_manifest(&nested).unwrap();
        assert_eq!(found, dir.path().join(MANIFEST_FILE));
    }

    #[test]
    fn find_manifest_returns_none_without_manifest() {
        let dir = TempDir::new().unwrap();
        let nested = dir.path().join("a");
        fs::create_dir_all(&nested).unwrap();

        // A manifest may exist above the tempdir; nothing inside it may match.
        if let Some(found) = find_manifest(&nested) {
            assert!(!found.starts_with(dir.path()));
        }
    }

    #[test]
    fn expand_leaves_absolute_paths_alone() {
        assert_eq!(expand("/usr/bin/python3"), PathBuf::from("/usr/bin/python3"));
    }
}
