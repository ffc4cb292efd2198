use std::process::Output;

/// Crate-wide result type.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors produced by the systemctl adapter and the command dispatcher.
///
/// Variants are classifiable so the binary can pick exit codes, and carry the
/// underlying tool's own diagnostics (stderr, exit code) unmodified apart from
/// a length bound on captured stderr.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The service manager does not know the unit.
    #[error("unit not found: {unit}")]
    UnitNotFound { unit: String },

    /// A subcommand exited nonzero. `stderr` is the captured error text.
    #[error("{command} failed (exit={exit_code:?}): {stderr}")]
    CommandFailed {
        command: String,
        exit_code: Option<i32>,
        stderr: String,
    },

    /// The service manager produced output we could not interpret at all.
    #[error("unexpected output from {command}: {context}")]
    Parse { command: String, context: String },

    /// The external binary could not be launched. Fatal.
    #[error("failed to launch {command}: {source}")]
    Spawn {
        command: String,
        #[source]
        source: std::io::Error,
    },
}

const MAX_STDERR_BYTES: usize = 8 * 1024;

impl Error {
    pub(crate) fn command_failed(command: impl Into<String>, output: &Output) -> Self {
        let stderr = String::from_utf8_lossy(&output.stderr);
        Self::CommandFailed {
            command: command.into(),
            exit_code: output.status.code(),
            stderr: truncate(stderr.trim_end(), MAX_STDERR_BYTES).to_string(),
        }
    }
}

/// Truncate at a char boundary so captured stderr cannot grow without bound.
fn truncate(input: &str, max_bytes: usize) -> &str {
    if input.len() <= max_bytes {
        return input;
    }
    let mut end = max_bytes;
    while end > 0 && !input.is_char_boundary(end) {
        end -= 1;
    }
    &input[..end]
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::os::unix::process::ExitStatusExt;
    use std::process::ExitStatus;

    fn output(raw_status: i32, stderr: &str) -> Output {
        Output {
            status: ExitStatus::from_raw(raw_status),
            stdout: Vec::new(),
            stderr: stderr.as_bytes().to_vec(),
        }
    }

    #[test]
    fn command_failed_captures_exit_code_and_stderr() {
        // raw wait status 0x100 is exit code 1
        let err = Error::command_failed("systemctl --user start x.service", &output(0x100, "boom\n"));
        match err {
            Error::CommandFailed {
                command,
                exit_code,
                stderr,
            } => {
                assert_eq!(command, "systemctl --user start x.service");
                assert_eq!(exit_code, Some(1));
                assert_eq!(stderr, "boom");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn stderr_is_bounded() {
        let huge = "x".repeat(MAX_STDERR_BYTES * 2);
        let err = Error::command_failed("cmd", &output(0x100, &huge));
        match err {
            Error::CommandFailed { stderr, .. } => assert_eq!(stderr.len(), MAX_STDERR_BYTES),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn truncate_respects_char_boundaries() {
        // 'é' is two bytes; cutting in the middle must back off
        let s = "aé";
        assert_eq!(truncate(s, 2), "a");
        assert_eq!(truncate(s, 3), "aé");
    }

    #[test]
    fn display_includes_unit_name() {
        let err = Error::UnitNotFound {
            unit: "foo.service".into(),
        };
        assert_eq!(err.to_string(), "unit not found: foo.service");
    }
}
