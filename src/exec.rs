use std::ffi::OsStr;
use std::path::Path;
use std::process::Stdio;
use std::time::Duration;

use tokio::process::Command;
use tracing::debug;

use crate::error::ExecError;

/// Captured output of a finished command.
#[derive(Debug, Clone)]
pub struct Output {
    pub stdout: String,
    pub stderr: String,
}

/// Run `program` with `args` and wait up to `timeout` for it to exit.
///
/// The child gets no stdin and is killed if the timeout elapses. A non-zero
/// exit status is an error.
pub async fn run<I, S>(program: &Path, args: I, timeout: Duration) -> Result<Output, ExecError>
where
    I: IntoIterator<Item = S>,
    S: AsRef<OsStr>,
{
    let name = program.display().to_string();

    let child = Command::new(program)
        .args(args)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true)
        .spawn()
        .map_err(|source| ExecError::Spawn {
            program: name.clone(),
            source,
        })?;

    // Dropping the wait future on timeout drops the child, which kills it.
    let output = match tokio::time::timeout(timeout, child.wait_with_output()).await {
        Ok(result) => result.map_err(|source| ExecError::Spawn {
            program: name.clone(),
            source,
        })?,
        Err(_) => {
            return Err(ExecError::Timeout {
                program: name,
                timeout,
            })
        }
    };

    let stdout = String::from_utf8_lossy(&output.stdout).into_owned();
    let stderr = String::from_utf8_lossy(&output.stderr).into_owned();

    if !output.status.success() {
        return Err(ExecError::Failed {
            program: name,
            status: output.status,
            stderr: stderr.trim().to_string(),
        });
    }

    debug!(program = %name, "Command finished");
    Ok(Output { stdout, stderr })
}
