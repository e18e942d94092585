//! External command execution.
//!
//! Every step that shells out (git, the configure script, make, the
//! simulation and analysis binaries) describes its command as a
//! [`CommandSpec`] and hands it to a [`CommandRunner`]. The working directory
//! is part of the [`CommandSpec`]; nothing here changes the process-wide current
//! directory.

use super::error::EngineError;
use std::collections::BTreeMap;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;
use tracing::debug;

/// Environment variables as captured from the configure script.
pub type Environment = BTreeMap<String, String>;

pub const ENVIRONMENT_FILE: &str = "environment";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandSpec {
    pub program: String,
    pub args: Vec<String>,
    pub working_dir: PathBuf,
    /// Replaces the inherited environment when set.
    pub env: Option<Environment>,
    /// Applied on top of the inherited or replaced environment.
    pub extra_env: Vec<(String, String)>,
}

impl CommandSpec {
    pub fn new(program: impl Into<String>, working_dir: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            working_dir: working_dir.into(),
            env: None,
            extra_env: Vec::new(),
        }
    }

    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    pub fn env_clear_with(mut self, env: Environment) -> Self {
        self.env = Some(env);
        self
    }

    pub fn env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.extra_env.push((key.into(), value.into()));
        self
    }

    /// Value of `key` as the child will see it, if set by this spec.
    pub fn env_value(&self, key: &str) -> Option<&str> {
        self.extra_env
            .iter()
            .rev()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
            .or_else(|| {
                self.env
                    .as_ref()
                    .and_then(|env| env.get(key))
                    .map(String::as_str)
            })
    }
}

impl fmt::Display for CommandSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.program)?;
        for arg in &self.args {
            write!(f, " {}", arg)?;
        }
        Ok(())
    }
}

pub trait CommandRunner: Send + Sync {
    /// Runs the command to completion; a non-zero exit is an error.
    fn run(&self, spec: &CommandSpec) -> Result<(), EngineError>;
}

/// Runs commands as child processes of this one.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemRunner;

impl CommandRunner for SystemRunner {
    fn run(&self, spec: &CommandSpec) -> Result<(), EngineError> {
        debug!("Running '{}' in {}", spec, spec.working_dir.display());
        let mut command = Command::new(&spec.program);
        command.args(&spec.args).current_dir(&spec.working_dir);
        if let Some(env) = &spec.env {
            command.env_clear().envs(env);
        }
        command.envs(spec.extra_env.iter().map(|(k, v)| (k, v)));

        let status = command.status().map_err(|source| EngineError::Spawn {
            program: spec.program.clone(),
            source,
        })?;
        if !status.success() {
            return Err(EngineError::CommandFailed {
                command: spec.to_string(),
                status: status.to_string(),
            });
        }
        Ok(())
    }
}

/// Parses the output of `env`.
///
/// Lines without `=` are continuation lines of multi-line values and are
/// dropped, as are exported shell functions (`BASH_FUNC_name%%=...`).
pub fn parse_environment(content: &str) -> Environment {
    content
        .lines()
        .filter(|line| line.contains('='))
        .filter(|line| !(line.starts_with("BASH_FUNC") && line.contains("%%=")))
        .filter_map(|line| line.trim().split_once('='))
        .map(|(key, value)| (key.to_string(), value.to_string()))
        .collect()
}

/// Sources the configure script in `alf_dir` with `config_args` and returns
/// the resulting environment.
pub fn capture_environment(
    runner: &dyn CommandRunner,
    alf_dir: &Path,
    config_args: &str,
) -> Result<Environment, EngineError> {
    let script = format!(
        ". ./configure.sh {} || exit 1 && env > {}",
        config_args, ENVIRONMENT_FILE
    );
    runner.run(&CommandSpec::new("bash", alf_dir).arg("-c").arg(script))?;

    let path = alf_dir.join(ENVIRONMENT_FILE);
    let content = fs::read_to_string(&path).map_err(|e| EngineError::io(&path, e))?;
    let env = parse_environment(&content);
    debug!("Captured {} environment variables.", env.len());
    Ok(env)
}
