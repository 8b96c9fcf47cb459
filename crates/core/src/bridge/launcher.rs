//! Starting the enhancer inside a boundary.

use std::ffi::OsString;
use std::io;
use std::path::PathBuf;
use std::process::Command;

use tracing::debug;

/// Environment variables never passed to the enhancer process.
pub const SCRUBBED_ENV: [&str; 1] = ["CLASSPATH"];

/// One enhancer launch: program, arguments and environment.
#[derive(Debug, Clone, PartialEq)]
pub struct Invocation {
    pub program: PathBuf,
    pub args: Vec<OsString>,
    pub env_remove: Vec<String>,
    pub working_dir: Option<PathBuf>,
}

impl Invocation {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            env_remove: SCRUBBED_ENV.iter().map(|s| s.to_string()).collect(),
            working_dir: None,
        }
    }

    pub fn arg(mut self, arg: impl Into<OsString>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<OsString>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    pub fn with_working_dir(mut self, dir: PathBuf) -> Self {
        self.working_dir = Some(dir);
        self
    }

    /// Arguments as strings, lossy.
    pub fn arg_strings(&self) -> Vec<String> {
        self.args
            .iter()
            .map(|arg| arg.to_string_lossy().into_owned())
            .collect()
    }

    pub fn to_shell_command(&self) -> String {
        let mut cmd = self.program.to_string_lossy().into_owned();
        for arg in self.arg_strings() {
            cmd.push(' ');
            if arg.contains(' ') {
                cmd.push_str(&format!("'{arg}'"));
            } else {
                cmd.push_str(&arg);
            }
        }
        cmd
    }
}

/// Outcome of a finished launch.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LaunchOutput {
    pub success: bool,
    pub code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
}

impl LaunchOutput {
    pub fn succeeded() -> Self {
        Self {
            success: true,
            code: Some(0),
            ..Default::default()
        }
    }

    pub fn failed(code: i32, stderr: impl Into<String>) -> Self {
        Self {
            success: false,
            code: Some(code),
            stdout: String::new(),
            stderr: stderr.into(),
        }
    }
}

/// Runs an invocation to completion. There is no way to interrupt it.
pub trait Launcher {
    fn launch(&self, invocation: &Invocation) -> io::Result<LaunchOutput>;
}

/// Starts a child process per invocation.
#[derive(Debug, Default, Clone, Copy)]
pub struct ProcessLauncher;

impl Launcher for ProcessLauncher {
    fn launch(&self, invocation: &Invocation) -> io::Result<LaunchOutput> {
        debug!("Launching: {}", invocation.to_shell_command());

        let mut cmd = Command::new(&invocation.program);
        cmd.args(&invocation.args);
        for key in &invocation.env_remove {
            cmd.env_remove(key);
        }
        if let Some(ref dir) = invocation.working_dir {
            cmd.current_dir(dir);
        }

        let output = cmd.output()?;
        Ok(LaunchOutput {
            success: output.status.success(),
            code: output.status.code(),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shell_command_quotes_spaces() {
        let invocation = Invocation::new("java")
            .arg("-cp")
            .arg("/opt/my libs/a.jar")
            .args(["a.Main", "x"]);
        insta::assert_snapshot!(invocation.to_shell_command(), @"java -cp '/opt/my libs/a.jar' a.Main x");
    }

    #[test]
    fn test_classpath_is_scrubbed_by_default() {
        let invocation = Invocation::new("java");
        assert_eq!(invocation.env_remove, vec!["CLASSPATH"]);
    }

    #[cfg(unix)]
    #[test]
    fn test_process_launcher_captures_output() {
        let invocation = Invocation::new("sh")
            .arg("-c")
            .arg("echo out; echo err >&2; exit 3");
        let output = ProcessLauncher.launch(&invocation).unwrap();
        assert!(!output.success);
        assert_eq!(output.code, Some(3));
        assert_eq!(output.stdout.trim(), "out");
        assert_eq!(output.stderr.trim(), "err");
    }

    #[test]
    fn test_missing_program_is_an_io_error() {
        let invocation = Invocation::new("/definitely/not/a/program");
        assert!(ProcessLauncher.launch(&invocation).is_err());
    }
}
