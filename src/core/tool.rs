//! External executables: lookup on the search path and blocking invocation.

use std::collections::BTreeMap;
use std::env;
use std::ffi::OsStr;
use std::path::{Path, PathBuf};
use std::process::Command;

use crate::error::{Error, Result};

/// Environment variables layered over the inherited process environment.
pub type EnvOverrides = BTreeMap<String, String>;

/// Exit status of a finished external process.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExitStatus {
    /// `None` when the process was terminated by a signal.
    pub code: Option<i32>,
}

impl ExitStatus {
    pub fn from_code(code: i32) -> Self {
        Self { code: Some(code) }
    }

    pub fn success(&self) -> bool {
        self.code == Some(0)
    }
}

impl From<std::process::ExitStatus> for ExitStatus {
    fn from(status: std::process::ExitStatus) -> Self {
        Self {
            code: status.code(),
        }
    }
}

/// Capability for running an external program to completion.
pub trait ExternalToolRunner {
    fn run(
        &self,
        program: &Path,
        args: &[String],
        cwd: &Path,
        env_overrides: &EnvOverrides,
    ) -> Result<ExitStatus>;
}

/// Spawns real processes with inherited stdio and waits for them.
#[derive(Debug, Default, Clone, Copy)]
pub struct ProcessRunner;

impl ExternalToolRunner for ProcessRunner {
    fn run(
        &self,
        program: &Path,
        args: &[String],
        cwd: &Path,
        env_overrides: &EnvOverrides,
    ) -> Result<ExitStatus> {
        let status = Command::new(program)
            .args(args)
            .current_dir(cwd)
            .envs(env_overrides)
            .status()
            .map_err(|e| {
                Error::internal_io(
                    format!("Failed to run {}: {}", program.display(), e),
                    Some(format!("spawn in {}", cwd.display())),
                )
            })?;

        Ok(status.into())
    }
}

fn current_dir() -> Result<PathBuf> {
    env::current_dir()
        .map_err(|e| Error::internal_io(e.to_string(), Some("read current dir".to_string())))
}

/// Resolve `name` to an absolute path by searching `PATH`.
pub fn resolve_executable(name: &str, install_hint: Option<&str>) -> Result<PathBuf> {
    resolve_executable_in(name, env::var_os("PATH"), &current_dir()?, install_hint)
}

/// Search `search_path` (a `PATH`-style list) for `name`.
pub fn resolve_executable_in<P: AsRef<OsStr>>(
    name: &str,
    search_path: Option<P>,
    cwd: &Path,
    install_hint: Option<&str>,
) -> Result<PathBuf> {
    which::which_in(name, search_path, cwd)
        .map_err(|_| Error::tool_not_found(name, install_hint.map(str::to_string)))
}

/// Resolve the first candidate found on `PATH`.
pub fn resolve_first(candidates: &[String]) -> Result<PathBuf> {
    resolve_first_in(candidates, env::var_os("PATH"), &current_dir()?)
}

/// Like [`resolve_first`] over an explicit search path.
pub fn resolve_first_in<P: AsRef<OsStr>>(
    candidates: &[String],
    search_path: Option<P>,
    cwd: &Path,
) -> Result<PathBuf> {
    for candidate in candidates {
        if let Ok(path) = resolve_executable_in(candidate, search_path.as_ref(), cwd, None) {
            return Ok(path);
        }
    }

    let name = candidates.first().cloned().unwrap_or_else(|| "python3".to_string());
    Err(Error::tool_not_found(name, None)
        .with_hint("Set prebuild.interpreter in bazelpack.json to the interpreter path"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn exit_status_success_only_for_zero() {
        assert!(ExitStatus::from_code(0).success());
        assert!(!ExitStatus::from_code(1).success());
        assert!(!ExitStatus { code: None }.success());
    }

    #[test]
    fn resolve_missing_tool_reports_tool_not_found() {
        let dir = TempDir::new().unwrap();
        let search = dir.path().to_string_lossy().to_string();

        let err = resolve_executable_in(
            "definitely-not-a-real-tool-xyz",
            Some(&search),
            dir.path(),
            Some("https://example.invalid/install"),
        )
        .unwrap_err();

        assert_eq!(err.code.as_str(), "tool.not_found");
        assert!(err.message.contains("definitely-not-a-real-tool-xyz"));
        assert_eq!(err.hints.len(), 1);
    }

    #[cfg(unix)]
    #[test]
    fn resolve_finds_executable_on_search_path() {
        use std::os::unix::fs::PermissionsExt;

        let dir = TempDir::new().unwrap();
        let tool = dir.path().join("bazel");
        fs::write(&tool, "#!/bin/sh\nexit 0\n").unwrap();
        fs::set_permissions(&tool, fs::Permissions::from_mode(0o755)).unwrap();

        let search = dir.path().to_string_lossy().to_string();
        let found = resolve_executable_in("bazel", Some(&search), dir.path(), None).unwrap();
        assert_eq!(found, tool);
    }

    #[test]
    fn resolve_first_reports_first_candidate() {
        let dir = TempDir::new().unwrap();
        let candidates = vec!["no-such-python-abc".to_string(), "no-such-python-def".to_string()];
        let err = resolve_first_in(&candidates, Some(dir.path()), dir.path()).unwrap_err();
        assert_eq!(err.details["tool"], "no-such-python-abc");
        assert_eq!(err.hints.len(), 1);
    }

    #[cfg(unix)]
    #[test]
    fn resolve_first_falls_through_to_later_candidate() {
        use std::os::unix::fs::PermissionsExt;

        let dir = TempDir::new().unwrap();
        let python = dir.path().join("python");
        fs::write(&python, "#!/bin/sh\nexit 0\n").unwrap();
        fs::set_permissions(&python, fs::Permissions::from_mode(0o755)).unwrap();

        let candidates = vec!["python3".to_string(), "python".to_string()];
        let found = resolve_first_in(&candidates, Some(dir.path()), dir.path()).unwrap();
        assert_eq!(found, python);
    }

    #[cfg(unix)]
    #[test]
    fn process_runner_applies_cwd_env_and_exit_code() {
        let dir = TempDir::new().unwrap();
        let mut env = EnvOverrides::new();
        env.insert("BAZELPACK_TEST_VALUE".to_string(), "42".to_string());

        let args = vec![
            "-c".to_string(),
            "pwd > out.txt; echo \"$BAZELPACK_TEST_VALUE\" >> out.txt; exit 7".to_string(),
        ];
        let status = ProcessRunner
            .run(Path::new("/bin/sh"), &args, dir.path(), &env)
            .unwrap();

        assert_eq!(status, ExitStatus::from_code(7));
        let out = fs::read_to_string(dir.path().join("out.txt")).unwrap();
        let mut lines = out.lines();
        let pwd = lines.next().unwrap();
        assert_eq!(
            fs::canonicalize(pwd).unwrap(),
            fs::canonicalize(dir.path()).unwrap()
        );
        assert_eq!(lines.next().unwrap(), "42");
    }
}
