use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    ConfigMissingKey,
    ConfigInvalidJson,
    ConfigInvalidValue,
    ConfigManifestNotFound,

    ValidationMissingArgument,
    ValidationInvalidArgument,
    ValidationInvalidJson,

    ToolNotFound,
    BuildFailed,
    VersionLoadFailed,

    InternalIoError,
    InternalJsonError,
    InternalUnexpected,
}

impl ErrorCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::ConfigMissingKey => "config.missing_key",
            ErrorCode::ConfigInvalidJson => "config.invalid_json",
            ErrorCode::ConfigInvalidValue => "config.invalid_value",
            ErrorCode::ConfigManifestNotFound => "config.manifest_not_found",

            ErrorCode::ValidationMissingArgument => "validation.missing_argument",
            ErrorCode::ValidationInvalidArgument => "validation.invalid_argument",
            ErrorCode::ValidationInvalidJson => "validation.invalid_json",

            ErrorCode::ToolNotFound => "tool.not_found",
            ErrorCode::BuildFailed => "build.failed",
            ErrorCode::VersionLoadFailed => "version.load_failed",

            ErrorCode::InternalIoError => "internal.io_error",
            ErrorCode::InternalJsonError => "internal.json_error",
            ErrorCode::InternalUnexpected => "internal.unexpected",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Hint {
    pub message: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfigMissingKeyDetails {
    pub key: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfigInvalidJsonDetails {
    pub path: String,
    pub error: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfigInvalidValueDetails {
    pub key: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
    pub problem: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MissingArgumentDetails {
    pub args: Vec<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InvalidArgumentDetails {
    pub field: String,
    pub problem: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tried: Option<Vec<String>>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolNotFoundDetails {
    pub tool: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub install_hint: Option<String>,
}

/// Details for an external build that ran and exited unsuccessfully.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BuildFailedDetails {
    pub command: String,
    pub working_dir: String,
    /// `None` when the process was terminated by a signal.
    pub exit_code: Option<i32>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VersionLoadFailedDetails {
    pub path: String,
    pub problem: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InternalIoErrorDetails {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub context: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InternalJsonErrorDetails {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub context: Option<String>,
}

#[derive(Debug, Clone)]
pub struct Error {
    pub code: ErrorCode,
    pub message: String,
    pub details: Value,
    pub hints: Vec<Hint>,
}

pub type Result<T> = std::result::Result<T, Error>;

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for Error {}

fn to_details<T: Serialize>(details: T) -> Value {
    serde_json::to_value(details).unwrap_or_else(|_| Value::Object(serde_json::Map::new()))
}

impl Error {
    pub fn new(code: ErrorCode, message: impl Into<String>, details: Value) -> Self {
        Self {
            code,
            message: message.into(),
            details,
            hints: Vec::new(),
        }
    }

    pub fn validation_missing_argument(args: Vec<String>) -> Self {
        Self::new(
            ErrorCode::ValidationMissingArgument,
            "Missing required argument",
            to_details(MissingArgumentDetails { args }),
        )
    }

    pub fn validation_invalid_argument(
        field: impl Into<String>,
        problem: impl Into<String>,
        id: Option<String>,
        tried: Option<Vec<String>>,
    ) -> Self {
        let details = to_details(InvalidArgumentDetails {
            field: field.into(),
            problem: problem.into(),
            id,
            tried,
        });

        Self::new(
            ErrorCode::ValidationInvalidArgument,
            "Invalid argument",
            details,
        )
    }

    pub fn validation_invalid_json(err: serde_json::Error, context: Option<String>) -> Self {
        let details = serde_json::json!({
            "error": err.to_string(),
            "context": context,
        });

        Self::new(ErrorCode::ValidationInvalidJson, "Invalid JSON", details)
    }

    pub fn config_missing_key(key: impl Into<String>, path: Option<String>) -> Self {
        let details = to_details(ConfigMissingKeyDetails {
            key: key.into(),
            path,
        });

        Self::new(
            ErrorCode::ConfigMissingKey,
            "Missing required configuration key",
            details,
        )
    }

    pub fn config_invalid_json(path: impl Into<String>, err: serde_json::Error) -> Self {
        let details = to_details(ConfigInvalidJsonDetails {
            path: path.into(),
            error: err.to_string(),
        });

        Self::new(
            ErrorCode::ConfigInvalidJson,
            "Invalid JSON in configuration",
            details,
        )
    }

    pub fn config_invalid_value(
        key: impl Into<String>,
        value: Option<String>,
        problem: impl Into<String>,
    ) -> Self {
        let details = to_details(ConfigInvalidValueDetails {
            key: key.into(),
            value,
            problem: problem.into(),
        });

        Self::new(
            ErrorCode::ConfigInvalidValue,
            "Invalid configuration value",
            details,
        )
    }

    pub fn manifest_not_found(searched_from: impl Into<String>) -> Self {
        let from = searched_from.into();
        Self::new(
            ErrorCode::ConfigManifestNotFound,
            format!("No bazelpack.json found in {} or any parent directory", from),
            serde_json::json!({ "searchedFrom": from }),
        )
        .with_hint("Create bazelpack.json at the workspace root or pass --manifest-path")
    }

    /// External executable missing from the search path.
    pub fn tool_not_found(tool: impl Into<String>, install_hint: Option<String>) -> Self {
        let tool = tool.into();
        let message = format!("Could not find \"{}\" binary on PATH", tool);
        let details = to_details(ToolNotFoundDetails {
            tool,
            install_hint: install_hint.clone(),
        });

        let err = Self::new(ErrorCode::ToolNotFound, message, details);
        match install_hint {
            Some(hint) => err.with_hint(format!("Please visit {} for installation instructions", hint)),
            None => err,
        }
    }

    pub fn build_failed(details: BuildFailedDetails) -> Self {
        let message = match details.exit_code {
            Some(code) => format!("External build failed (exit code {}): {}", code, details.command),
            None => format!("External build terminated by signal: {}", details.command),
        };

        Self::new(ErrorCode::BuildFailed, message, to_details(details))
    }

    pub fn version_load_failed(path: impl Into<String>, problem: impl Into<String>) -> Self {
        let path = path.into();
        let problem = problem.into();
        Self::new(
            ErrorCode::VersionLoadFailed,
            format!("Could not load __version__ from {}: {}", path, problem),
            to_details(VersionLoadFailedDetails { path, problem }),
        )
    }

    pub fn internal_io(error: impl Into<String>, context: Option<String>) -> Self {
        let details = to_details(InternalIoErrorDetails {
            error: error.into(),
            context,
        });

        Self::new(ErrorCode::InternalIoError, "IO error", details)
    }

    pub fn internal_json(error: impl Into<String>, context: Option<String>) -> Self {
        let details = to_details(InternalJsonErrorDetails {
            error: error.into(),
            context,
        });

        Self::new(ErrorCode::InternalJsonError, "JSON error", details)
    }

    pub fn internal_unexpected(error: impl Into<String>) -> Self {
        Self::new(
            ErrorCode::InternalUnexpected,
            "Unexpected error",
            serde_json::json!({ "error": error.into() }),
        )
    }

    pub fn other(message: impl Into<String>) -> Self {
        Self::internal_unexpected(message)
    }

    pub fn with_hint(mut self, message: impl Into<String>) -> Self {
        self.hints.push(Hint {
            message: message.into(),
        });
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tool_not_found_mentions_tool_and_install_hint() {
        let err = Error::tool_not_found(
            "bazel",
            Some("https://docs.bazel.build/versions/master/install.html".to_string()),
        );

        assert_eq!(err.code.as_str(), "tool.not_found");
        assert!(err.message.contains("bazel"));
        assert_eq!(err.details["tool"], "bazel");
        assert_eq!(err.hints.len(), 1);
        assert!(err.hints[0].message.contains("docs.bazel.build"));
    }

    #[test]
    fn tool_not_found_without_hint_has_no_hints() {
        let err = Error::tool_not_found("python3", None);
        assert!(err.hints.is_empty());
        assert!(err.details.get("installHint").is_none());
    }

    #[test]
    fn build_failed_carries_exit_code() {
        let err = Error::build_failed(BuildFailedDetails {
            command: "bazel run -c opt //...".to_string(),
            working_dir: "/work".to_string(),
            exit_code: Some(3),
        });

        assert_eq!(err.code, ErrorCode::BuildFailed);
        assert!(err.message.contains("exit code 3"));
        assert_eq!(err.details["exitCode"], 3);
        assert_eq!(err.details["workingDir"], "/work");
    }

    #[test]
    fn build_failed_by_signal_has_null_exit_code() {
        let err = Error::build_failed(BuildFailedDetails {
            command: "bazel run".to_string(),
            working_dir: "/work".to_string(),
            exit_code: None,
        });

        assert!(err.message.contains("signal"));
        assert!(err.details["exitCode"].is_null());
    }

    #[test]
    fn version_load_failed_names_path() {
        let err = Error::version_load_failed("pkg/version.py", "no __version__ assignment");
        assert_eq!(err.code.as_str(), "version.load_failed");
        assert!(err.message.contains("pkg/version.py"));
        assert_eq!(err.details["problem"], "no __version__ assignment");
    }
}
