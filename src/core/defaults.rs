use serde::{Deserialize, Serialize};
use std::fs;

use crate::paths;

/// Root configuration structure for config.json
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct BazelpackConfig {
    #[serde(default)]
    pub defaults: Defaults,
}

/// All configurable defaults that can be overridden via config.json
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Defaults {
    #[serde(default = "default_prebuild")]
    pub prebuild: PrebuildDefaults,

    #[serde(default = "default_build_dir")]
    pub build_dir: String,

    #[serde(default = "default_dist_dir")]
    pub dist_dir: String,
}

impl Default for Defaults {
    fn default() -> Self {
        Self {
            prebuild: default_prebuild(),
            build_dir: default_build_dir(),
            dist_dir: default_dist_dir(),
        }
    }
}

/// Defaults for the external build step that runs ahead of packaging.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PrebuildDefaults {
    #[serde(default = "default_tool")]
    pub tool: String,

    #[serde(default = "default_tool_args")]
    pub args: Vec<String>,

    #[serde(default = "default_interpreter_env")]
    pub interpreter_env: String,

    #[serde(default = "default_interpreter_candidates")]
    pub interpreter_candidates: Vec<String>,

    #[serde(default = "default_install_hint")]
    pub install_hint: String,
}

// =============================================================================
// Default value functions
// =============================================================================

fn default_prebuild() -> PrebuildDefaults {
    PrebuildDefaults {
        tool: default_tool(),
        args: default_tool_args(),
        interpreter_env: default_interpreter_env(),
        interpreter_candidates: default_interpreter_candidates(),
        install_hint: default_install_hint(),
    }
}

fn default_tool() -> String {
    "bazel".to_string()
}

fn default_tool_args() -> Vec<String> {
    vec![
        "run".to_string(),
        "-c".to_string(),
        "opt".to_string(),
        "//...".to_string(),
    ]
}

fn default_interpreter_env() -> String {
    "PYTHON_BIN_PATH".to_string()
}

fn default_interpreter_candidates() -> Vec<String> {
    vec!["python3".to_string(), "python".to_string()]
}

fn default_install_hint() -> String {
    "https://docs.bazel.build/versions/master/install.html".to_string()
}

fn default_build_dir() -> String {
    "build".to_string()
}

fn default_dist_dir() -> String {
    "dist".to_string()
}

// =============================================================================
// Loading functions
// =============================================================================

/// Load defaults, merging file config with built-in defaults.
/// If config.json is missing or invalid, silently returns built-in defaults.
pub fn load_defaults() -> Defaults {
    load_config().defaults
}

/// Load the full config.json, falling back to defaults on any error.
pub fn load_config() -> BazelpackConfig {
    load_config_from_file().unwrap_or_default()
}

fn load_config_from_file() -> crate::Result<BazelpackConfig> {
    let path = paths::config_json()?;

    if !path.exists() {
        return Err(crate::Error::other("config.json not found"));
    }

    let content = fs::read_to_string(&path).map_err(|e| {
        crate::Error::internal_io(e.to_string(), Some(format!("read {}", path.display())))
    })?;

    parse_config(&content)
}

fn parse_config(content: &str) -> crate::Result<BazelpackConfig> {
    serde_json::from_str(content).map_err(|e| {
        crate::Error::validation_invalid_json(e, Some("parse config.json".to_string()))
    })
}

/// Check if config.json file exists
pub fn config_exists() -> bool {
    paths::config_json()
        .map(|p| p.exists())
        .unwrap_or(false)
}

/// Delete config.json file (reset to defaults)
pub fn reset_config() -> crate::Result<bool> {
    let path = paths::config_json()?;

    if path.exists() {
        fs::remove_file(&path).map_err(|e| {
            crate::Error::internal_io(e.to_string(), Some(format!("delete {}", path.display())))
        })?;
        Ok(true)
    } else {
        Ok(false)
    }
}

/// Get the path to config.json (for display purposes)
pub fn config_path() -> crate::Result<String> {
    Ok(paths::config_json()?.display().to_string())
}

/// Get built-in defaults (ignoring any file config)
pub fn builtin_defaults() -> Defaults {
    Defaults::default()
}
