//! Project manifest (`bazelpack.json`) at the workspace root.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::defaults::Defaults;
use crate::error::{Error, Result};
use crate::paths;
use crate::utils::io;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Manifest {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub license: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version_file: Option<String>,
    #[serde(default)]
    pub install_requires: Vec<String>,
    /// Explicit package list; `None` means discover packages on disk.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub packages: Option<Vec<String>>,
    #[serde(default)]
    pub prebuild: PrebuildManifest,
}

/// Per-project overrides for the external build step.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PrebuildManifest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub args: Option<Vec<String>>,
    #[serde(default = "default_always_run")]
    pub always_run: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub interpreter_env: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub interpreter: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub install_hint: Option<String>,
}

fn default_always_run() -> bool {
    true
}

impl Default for PrebuildManifest {
    fn default() -> Self {
        Self {
            tool: None,
            args: None,
            always_run: default_always_run(),
            interpreter_env: None,
            interpreter: None,
            install_hint: None,
        }
    }
}

/// Fully resolved prebuild settings: manifest values over global defaults.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PrebuildSettings {
    pub tool: String,
    pub args: Vec<String>,
    pub always_run: bool,
    pub interpreter_env: String,
    pub interpreter: Option<PathBuf>,
    pub interpreter_candidates: Vec<String>,
    pub install_hint: String,
}

impl PrebuildSettings {
    /// Checks the merged values, which may come from the global defaults.
    pub fn validate(&self) -> Result<()> {
        if self.tool.trim().is_empty() {
            return Err(Error::config_invalid_value(
                "prebuild.tool",
                Some(self.tool.clone()),
                "Tool name cannot be empty",
            ));
        }
        if self.args.is_empty() {
            return Err(Error::config_invalid_value(
                "prebuild.args",
                None,
                "At least one argument is required",
            ));
        }
        if self.interpreter_env.trim().is_empty() {
            return Err(Error::config_invalid_value(
                "prebuild.interpreterEnv",
                Some(self.interpreter_env.clone()),
                "Environment variable name cannot be empty",
            ));
        }
        Ok(())
    }
}

impl Manifest {
    pub fn parse(content: &str, path: &Path) -> Result<Self> {
        let manifest: Manifest = serde_json::from_str(content)
            .map_err(|e| Error::config_invalid_json(path.display().to_string(), e))?;
        manifest.validate(path)?;
        Ok(manifest)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let content = io::read_file(path, &format!("read {}", path.display()))?;
        Self::parse(&content, path)
    }

    fn validate(&self, path: &Path) -> Result<()> {
        if self.name.trim().is_empty() {
            return Err(Error::config_missing_key(
                "name",
                Some(path.display().to_string()),
            ));
        }

        if let Some(args) = &self.prebuild.args {
            if args.is_empty() {
                return Err(Error::config_invalid_value(
                    "prebuild.args",
                    None,
                    "At least one argument is required",
                ));
            }
        }

        if let Some(tool) = &self.prebuild.tool {
            if tool.trim().is_empty() {
                return Err(Error::config_invalid_value(
                    "prebuild.tool",
                    Some(tool.clone()),
                    "Tool name cannot be empty",
                ));
            }
        }

        Ok(())
    }

    /// Version file path relative to the workspace root.
    pub fn version_file(&self) -> String {
        self.version_file
            .clone()
            .unwrap_or_else(|| format!("{}/version.py", self.name))
    }

    pub fn prebuild_settings(&self, defaults: &Defaults) -> PrebuildSettings {
        let d = &defaults.prebuild;
        let p = &self.prebuild;
        PrebuildSettings {
            tool: p.tool.clone().unwrap_or_else(|| d.tool.clone()),
            args: p.args.clone().unwrap_or_else(|| d.args.clone()),
            always_run: p.always_run,
            interpreter_env: p
                .interpreter_env
                .clone()
                .unwrap_or_else(|| d.interpreter_env.clone()),
            interpreter: p.interpreter.as_deref().map(paths::expand),
            interpreter_candidates: d.interpreter_candidates.clone(),
            install_hint: p
                .install_hint
                .clone()
                .unwrap_or_else(|| d.install_hint.clone()),
        }
    }
}

/// Locate the manifest: an explicit path wins, otherwise walk up from `cwd`.
pub fn locate(explicit: Option<&Path>, cwd: &Path) -> Result<PathBuf> {
    if let Some(path) = explicit {
        let path = if path.is_dir() {
            path.join(paths::MANIFEST_FILE)
        } else {
            path.to_path_buf()
        };
        if !path.is_file() {
            return Err(Error::validation_invalid_argument(
                "manifest_path",
                format!("Manifest not found: {}", path.display()),
                None,
                None,
            ));
        }
        return Ok(path);
    }

    paths::find_manifest(cwd).ok_or_else(|| Error::manifest_not_found(cwd.display().to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::defaults::builtin_defaults;
    use std::fs;
    use tempfile::TempDir;

    fn parse(json: &str) -> Result<Manifest> {
        Manifest::parse(json, Path::new("bazelpack.json"))
    }

    #[test]
    fn minimal_manifest_uses_defaults() {
        let manifest = parse(r#"{"name": "tensorflow_privacy"}"#).unwrap();
        assert_eq!(manifest.version_file(), "tensorflow_privacy/version.py");
        assert!(manifest.install_requires.is_empty());
        assert!(manifest.prebuild.always_run);

        let settings = manifest.prebuild_settings(&builtin_defaults());
        assert_eq!(settings.tool, "bazel");
        assert_eq!(settings.args, vec!["run", "-c", "opt", "//..."]);
        assert_eq!(settings.interpreter_env, "PYTHON_BIN_PATH");
        assert!(settings.interpreter.is_none());
    }

    #[test]
    fn manifest_overrides_prebuild_defaults() {
        let manifest = parse(
            r#"{
                "name": "pkg",
                "versionFile": "src/pkg/_version.py",
                "prebuild": {
                    "tool": "bazelisk",
                    "args": ["build", "//pkg:all"],
                    "alwaysRun": false,
                    "interpreter": "/opt/python/bin/python3"
                }
            }"#,
        )
        .unwrap();

        assert_eq!(manifest.version_file(), "src/pkg/_version.py");
        let settings = manifest.prebuild_settings(&builtin_defaults());
        assert_eq!(settings.tool, "bazelisk");
        assert_eq!(settings.args, vec!["build", "//pkg:all"]);
        assert!(!settings.always_run);
        assert_eq!(
            settings.interpreter,
            Some(PathBuf::from("/opt/python/bin/python3"))
        );
    }

    #[test]
    fn merged_settings_reject_blank_default_tool() {
        let mut defaults = builtin_defaults();
        defaults.prebuild.tool = "  ".to_string();
        let manifest = parse(r#"{"name": "pkg"}"#).unwrap();

        let err = manifest.prebuild_settings(&defaults).validate().unwrap_err();
        assert_eq!(err.details["key"], "prebuild.tool");

        let settings = manifest.prebuild_settings(&builtin_defaults());
        assert!(settings.validate().is_ok());
    }

    #[test]
    fn missing_name_is_rejected() {
        let err = parse(r#"{"name": " "}"#).unwrap_err();
        assert_eq!(err.code.as_str(), "config.missing_key");
    }

    #[test]
    fn empty_prebuild_args_are_rejected() {
        let err = parse(r#"{"name": "pkg", "prebuild": {"args": []}}"#).unwrap_err();
        assert_eq!(err.code.as_str(), "config.invalid_value");
    }

    #[test]
    fn invalid_json_is_config_error() {
        let err = parse("{").unwrap_err();
        assert_eq!(err.code.as_str(), "config.invalid_json");
    }

    #[test]
    fn locate_accepts_directory() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join(paths::MANIFEST_FILE), "{}").unwrap();

        let found = locate(Some(dir.path()), Path::new("/")).unwrap();
        assert_eq!(found, dir.path().join(paths::MANIFEST_FILE));
    }

    #[test]
    fn locate_rejects_missing_explicit_path() {
        let dir = TempDir::new().unwrap();
        let err = locate(Some(&dir.path().join("nope.json")), dir.path()).unwrap_err();
        assert_eq!(err.code.as_str(), "validation.invalid_argument");
    }
}
