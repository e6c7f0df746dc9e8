/*!
 * Tool Runner
 * Process execution seam for the external control tool
 */

use async_trait::async_trait;
use std::io;
use std::process::ExitStatus;
use std::sync::Arc;
use tokio::process::Command;

/// Captured result of one finished tool invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolOutput {
    pub success: bool,
    pub status: String,
    pub stdout: String,
    pub stderr: String,
}

impl ToolOutput {
    pub fn from_status(status: ExitStatus, stdout: &[u8], stderr: &[u8]) -> Self {
        Self {
            success: status.success(),
            status: status.to_string(),
            stdout: String::from_utf8_lossy(stdout).into_owned(),
            stderr: String::from_utf8_lossy(stderr).into_owned(),
        }
    }
}

#[async_trait]
pub trait ToolRunner: Send + Sync {
    /// Run `program` with `args` to completion, capturing both output streams.
    async fn run(&self, program: &str, args: &[&str]) -> io::Result<ToolOutput>;
}

#[async_trait]
impl<T: ToolRunner + ?Sized> ToolRunner for Arc<T> {
    async fn run(&self, program: &str, args: &[&str]) -> io::Result<ToolOutput> {
        (**self).run(program, args).await
    }
}

/// Spawns real child processes.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemRunner;

#[async_trait]
impl ToolRunner for SystemRunner {
    async fn run(&self, program: &str, args: &[&str]) -> io::Result<ToolOutput> {
        let output = Command::new(program)
            .args(args)
            .stdin(std::process::Stdio::null())
            .kill_on_drop(true)
            .output()
            .await?;

        Ok(ToolOutput::from_status(
            output.status,
            &output.stdout,
            &output.stderr,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn missing_program_reports_not_found() {
        let err = SystemRunner
            .run("bluedeck-definitely-not-installed", &["devices"])
            .await
            .unwrap_err();

        assert_eq!(err.kind(), io::ErrorKind::NotFound);
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn captures_streams_and_status() {
        let output = SystemRunner
            .run("sh", &["-c", "echo listed; echo broken >&2; exit 3"])
            .await
            .unwrap();

        assert!(!output.success);
        assert_eq!(output.stdout, "listed\n");
        assert_eq!(output.stderr, "broken\n");
        assert!(output.status.contains('3'));
    }
}
