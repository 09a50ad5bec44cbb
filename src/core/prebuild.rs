//! External build step that runs ahead of the packaging steps.
//!
//! Resolution is deferred to [`ExternalBuild::finalize`], which runs when the
//! step executes. A missing tool therefore fails the step before anything is
//! spawned, and commands that never reach the step never look it up.

use serde::Serialize;
use std::path::{Path, PathBuf};

use crate::error::{BuildFailedDetails, Error, Result};
use crate::manifest::PrebuildSettings;
use crate::tool::{self, EnvOverrides, ExternalToolRunner};
use crate::utils::shell;

/// Looks up executables by name. Split out so tests can control the search path.
pub trait ExecutableResolver {
    fn resolve(&self, name: &str, install_hint: Option<&str>) -> Result<PathBuf>;

    fn resolve_first(&self, candidates: &[String]) -> Result<PathBuf>;
}

/// Resolver backed by the process `PATH`.
#[derive(Debug, Default, Clone, Copy)]
pub struct PathResolver;

impl ExecutableResolver for PathResolver {
    fn resolve(&self, name: &str, install_hint: Option<&str>) -> Result<PathBuf> {
        tool::resolve_executable(name, install_hint)
    }

    fn resolve_first(&self, candidates: &[String]) -> Result<PathBuf> {
        tool::resolve_first(candidates)
    }
}

/// A fully resolved invocation, ready to spawn.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PreparedInvocation {
    pub program: PathBuf,
    pub args: Vec<String>,
    pub working_dir: PathBuf,
    pub env: EnvOverrides,
}

impl PreparedInvocation {
    pub fn command_line(&self) -> String {
        let mut parts = vec![self.program.to_string_lossy().to_string()];
        parts.extend(self.args.iter().cloned());
        shell::quote_args(&parts)
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PrebuildOutput {
    pub command: String,
    pub working_dir: String,
    pub exit_code: Option<i32>,
}

pub struct ExternalBuild {
    settings: PrebuildSettings,
    workspace_root: PathBuf,
}

impl ExternalBuild {
    pub fn new(settings: PrebuildSettings, workspace_root: &Path) -> Self {
        Self {
            settings,
            workspace_root: workspace_root.to_path_buf(),
        }
    }

    pub fn settings(&self) -> &PrebuildSettings {
        &self.settings
    }

    /// Resolve the tool and interpreter and assemble the invocation.
    pub fn finalize(&self, resolver: &dyn ExecutableResolver) -> Result<PreparedInvocation> {
        self.settings.validate()?;

        let program = resolver.resolve(&self.settings.tool, Some(&self.settings.install_hint))?;

        let interpreter = match &self.settings.interpreter {
            Some(path) => path.clone(),
            None => resolver.resolve_first(&self.settings.interpreter_candidates)?,
        };

        let mut env = EnvOverrides::new();
        env.insert(
            self.settings.interpreter_env.clone(),
            interpreter.to_string_lossy().to_string(),
        );

        Ok(PreparedInvocation {
            program,
            args: self.settings.args.clone(),
            working_dir: self.workspace_root.clone(),
            env,
        })
    }

    /// Finalize, run once, and turn a non-zero exit into a build failure.
    pub fn run(
        &self,
        resolver: &dyn ExecutableResolver,
        runner: &dyn ExternalToolRunner,
    ) -> Result<PrebuildOutput> {
        let invocation = self.finalize(resolver)?;
        let command = invocation.command_line();
        let working_dir = invocation.working_dir.display().to_string();

        crate::log_status!("prebuild", "Running {} in {}", command, working_dir);

        let status = runner.run(
            &invocation.program,
            &invocation.args,
            &invocation.working_dir,
            &invocation.env,
        )?;

        if !status.success() {
            return Err(Error::build_failed(BuildFailedDetails {
                command,
                working_dir,
                exit_code: status.code,
            })
            .with_hint("Fix the external build and re-run the command"));
        }

        Ok(PrebuildOutput {
            command,
            working_dir,
            exit_code: status.code,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::defaults::builtin_defaults;
    use crate::manifest::Manifest;
    use crate::tool::ExitStatus;
    use std::cell::RefCell;

    struct FakeResolver {
        tool: Option<PathBuf>,
        interpreter: Option<PathBuf>,
    }

    impl ExecutableResolver for FakeResolver {
        fn resolve(&self, name: &str, install_hint: Option<&str>) -> Result<PathBuf> {
            self.tool
                .clone()
                .ok_or_else(|| Error::tool_not_found(name, install_hint.map(str::to_string)))
        }

        fn resolve_first(&self, candidates: &[String]) -> Result<PathBuf> {
            self.interpreter
                .clone()
                .ok_or_else(|| Error::tool_not_found(candidates[0].clone(), None))
        }
    }

    #[derive(Default)]
    struct RecordingRunner {
        exit_code: i32,
        calls: RefCell<Vec<PreparedInvocation>>,
    }

    impl ExternalToolRunner for RecordingRunner {
        fn run(
            &self,
            program: &Path,
            args: &[String],
            cwd: &Path,
            env_overrides: &EnvOverrides,
        ) -> Result<ExitStatus> {
            self.calls.borrow_mut().push(PreparedInvocation {
                program: program.to_path_buf(),
                args: args.to_vec(),
                working_dir: cwd.to_path_buf(),
                env: env_overrides.clone(),
            });
            Ok(ExitStatus::from_code(self.exit_code))
        }
    }

    fn external_build(json: &str) -> ExternalBuild {
        let manifest = Manifest::parse(json, Path::new("bazelpack.json")).unwrap();
        ExternalBuild::new(
            manifest.prebuild_settings(&builtin_defaults()),
            Path::new("/work/privacy"),
        )
    }

    fn found() -> FakeResolver {
        FakeResolver {
            tool: Some(PathBuf::from("/usr/local/bin/bazel")),
            interpreter: Some(PathBuf::from("/usr/bin/python3")),
        }
    }

    #[test]
    fn invokes_bazel_run_opt_in_workspace_root() {
        let build = external_build(r#"{"name": "tensorflow_privacy"}"#);
        let runner = RecordingRunner::default();

        let output = build.run(&found(), &runner).unwrap();

        let calls = runner.calls.borrow();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].program, PathBuf::from("/usr/local/bin/bazel"));
        assert_eq!(calls[0].args, vec!["run", "-c", "opt", "//..."]);
        assert_eq!(calls[0].working_dir, PathBuf::from("/work/privacy"));
        assert_eq!(output.command, "/usr/local/bin/bazel run -c opt //...");
        assert_eq!(output.exit_code, Some(0));
    }

    #[test]
    fn injects_interpreter_path_only() {
        let build = external_build(r#"{"name": "pkg"}"#);
        let runner = RecordingRunner::default();

        build.run(&found(), &runner).unwrap();

        let calls = runner.calls.borrow();
        assert_eq!(calls[0].env.len(), 1);
        assert_eq!(
            calls[0].env.get("PYTHON_BIN_PATH").map(String::as_str),
            Some("/usr/bin/python3")
        );
    }

    #[test]
    fn configured_interpreter_skips_lookup() {
        let build = external_build(
            r#"{"name": "pkg", "prebuild": {"interpreter": "/opt/py/bin/python", "interpreterEnv": "PY"}}"#,
        );
        let resolver = FakeResolver {
            tool: Some(PathBuf::from("/bin/bazel")),
            interpreter: None,
        };

        let invocation = build.finalize(&resolver).unwrap();
        assert_eq!(
            invocation.env.get("PY").map(String::as_str),
            Some("/opt/py/bin/python")
        );
    }

    #[test]
    fn missing_tool_fails_before_spawning() {
        let build = external_build(r#"{"name": "pkg"}"#);
        let resolver = FakeResolver {
            tool: None,
            interpreter: Some(PathBuf::from("/usr/bin/python3")),
        };
        let runner = RecordingRunner::default();

        let err = build.run(&resolver, &runner).unwrap_err();

        assert_eq!(err.code.as_str(), "tool.not_found");
        assert!(err.message.contains("bazel"));
        assert!(runner.calls.borrow().is_empty());
    }

    #[test]
    fn empty_args_from_global_defaults_fail_before_spawning() {
        let mut defaults = builtin_defaults();
        defaults.prebuild.args.clear();
        let manifest = Manifest::parse(r#"{"name": "pkg"}"#, Path::new("bazelpack.json")).unwrap();
        let build = ExternalBuild::new(manifest.prebuild_settings(&defaults), Path::new("/work"));
        let runner = RecordingRunner::default();

        let err = build.run(&found(), &runner).unwrap_err();

        assert_eq!(err.code.as_str(), "config.invalid_value");
        assert_eq!(err.details["key"], "prebuild.args");
        assert!(runner.calls.borrow().is_empty());
    }

    #[test]
    fn non_zero_exit_is_build_failure() {
        let build = external_build(r#"{"name": "pkg"}"#);
        let runner = RecordingRunner {
            exit_code: 1,
            ..Default::default()
        };

        let err = build.run(&found(), &runner).unwrap_err();

        assert_eq!(err.code.as_str(), "build.failed");
        assert_eq!(err.details["exitCode"], 1);
        assert_eq!(err.details["workingDir"], "/work/privacy");
        assert_eq!(runner.calls.borrow().len(), 1);
    }
}
