//! External style-sheet compiler integration.
//!
//! The engine never evaluates value expressions itself; it hands a whole
//! compilation unit to an external compiler and reads the output back.
//! [`Compiler`] is that boundary: one blocking call, source text in,
//! compiled text (or a [`CompileError`]) out. Any `Fn(&str) -> Result<...>`
//! works, so tests and embedded integrations can stay in-process while
//! production points [`CommandCompiler`] at a real binary.

use std::io::{Read, Write};
use std::process::{Command, Stdio};
use std::time::Duration;

use thiserror::Error;

/// Errors from a compiler invocation.
#[derive(Debug, Error)]
pub enum CompileError {
    /// The compiler process could not be spawned or piped.
    #[error("compiler I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The compiler rejected the source.
    #[error("compiler `{command}` failed: {stderr}")]
    Failed { command: String, stderr: String },

    /// The compiler did not finish in time and was killed.
    #[error("compiler `{0}` timed out after {1:?}")]
    Timeout(String, Duration),

    /// The compiler produced output that was not UTF-8.
    #[error("compiler output was not valid UTF-8")]
    InvalidUtf8(#[from] std::string::FromUtf8Error),
}

/// A style-sheet compiler: source text in, compiled output text out.
pub trait Compiler {
    /// Compiles `source`, returning the compiler's full output.
    fn compile(&self, source: &str) -> Result<String, CompileError>;
}

impl<F> Compiler for F
where
    F: Fn(&str) -> Result<String, CompileError>,
{
    fn compile(&self, source: &str) -> Result<String, CompileError> {
        self(source)
    }
}

/// Runs an external compiler binary, piping the source to its stdin and
/// capturing stdout as the compiled output.
///
/// # Example
///
/// ```rust,no_run
/// use swatch_vars::CommandCompiler;
///
/// let sass = CommandCompiler::sass();
/// let custom = CommandCompiler::new("scss")
///     .arg("--stdin")
///     .arg("--style=expanded");
/// ```
pub struct CommandCompiler {
    program: String,
    args: Vec<String>,
    timeout: Option<Duration>,
}

impl CommandCompiler {
    /// Creates a compiler around the given program, with a 30 second
    /// timeout.
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            timeout: Some(Duration::from_secs(30)),
        }
    }

    /// The standard `sass` CLI reading from stdin.
    pub fn sass() -> Self {
        Self::new("sass").arg("--stdin")
    }

    /// Appends an argument.
    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    /// Sets the timeout; `None` waits indefinitely.
    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    /// The command line this compiler runs, for display.
    pub fn command_line(&self) -> String {
        let mut line = self.program.clone();
        for arg in &self.args {
            line.push(' ');
            line.push_str(arg);
        }
        line
    }
}

impl Compiler for CommandCompiler {
    fn compile(&self, source: &str) -> Result<String, CompileError> {
        use wait_timeout::ChildExt;

        let mut child = Command::new(&self.program)
            .args(&self.args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()?;

        if let Some(mut stdin) = child.stdin.take() {
            stdin.write_all(source.as_bytes())?;
            // Dropping stdin closes the pipe so the compiler sees EOF.
        }

        let status = match self.timeout {
            Some(duration) => match child.wait_timeout(duration)? {
                Some(status) => status,
                None => {
                    child.kill()?;
                    child.wait()?;
                    return Err(CompileError::Timeout(self.command_line(), duration));
                }
            },
            None => child.wait()?,
        };

        if !status.success() {
            let mut stderr = String::new();
            if let Some(mut pipe) = child.stderr.take() {
                pipe.read_to_string(&mut stderr)?;
            }
            return Err(CompileError::Failed {
                command: self.command_line(),
                stderr: stderr.trim_end().to_string(),
            });
        }

        let mut output = Vec::new();
        if let Some(mut stdout) = child.stdout.take() {
            stdout.read_to_end(&mut output)?;
        }
        Ok(String::from_utf8(output)?)
    }
}
