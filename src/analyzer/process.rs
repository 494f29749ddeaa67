//! Analyzer subprocess launch and teardown.

use std::path::PathBuf;
use std::process::Stdio;
use std::time::Duration;

use tokio::process::{Child, Command};

use crate::analyzer::channel::PipeChannel;
use crate::analyzer::command::{build_args, user_dict_path};
use crate::config::AnalyzerConfig;

/// How long shutdown waits for the analyzer to be reaped.
const REAP_TIMEOUT: Duration = Duration::from_secs(5);

/// Fatal errors while launching the analyzer.
#[derive(Debug, thiserror::Error)]
pub enum LaunchError {
    #[error("Can't find user dictionary \"{}\"", .0.display())]
    MissingDictionary(PathBuf),
    #[error("failed to spawn analyzer '{binary}': {source}")]
    Spawn {
        binary: String,
        #[source]
        source: std::io::Error,
    },
    #[error("analyzer {0} was not captured")]
    MissingPipe(&'static str),
}

/// Handle to the running analyzer.
///
/// The pipes are handed out as a [`PipeChannel`] at spawn time; this handle
/// only keeps the child for teardown.
#[derive(Debug)]
pub struct AnalyzerProcess {
    child: Child,
    binary: String,
}

impl AnalyzerProcess {
    /// Launch the analyzer and capture its stdin/stdout.
    pub fn spawn(config: &AnalyzerConfig) -> Result<(Self, PipeChannel), LaunchError> {
        if let Some(path) = user_dict_path(config) {
            if !path.exists() {
                return Err(LaunchError::MissingDictionary(path));
            }
        }

        let args = build_args(config);
        let mut child = Command::new(&config.binary)
            .args(&args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::inherit())
            .kill_on_drop(true)
            .spawn()
            .map_err(|source| LaunchError::Spawn {
                binary: config.binary.clone(),
                source,
            })?;

        let stdin = child.stdin.take().ok_or(LaunchError::MissingPipe("stdin"))?;
        let stdout = child.stdout.take().ok_or(LaunchError::MissingPipe("stdout"))?;

        tracing::info!(
            binary = %config.binary,
            args = ?args,
            pid = child.id(),
            "Analyzer started"
        );

        let process = Self {
            child,
            binary: config.binary.clone(),
        };
        Ok((process, PipeChannel::new(stdin, stdout)))
    }

    /// Whether the child is still running.
    pub fn is_alive(&mut self) -> bool {
        matches!(self.child.try_wait(), Ok(None))
    }

    /// Kill the analyzer and wait briefly for it to exit. Best effort.
    pub async fn shutdown(mut self) {
        if let Err(e) = self.child.start_kill() {
            tracing::debug!(binary = %self.binary, error = %e, "Analyzer already gone");
        }

        match tokio::time::timeout(REAP_TIMEOUT, self.child.wait()).await {
            Ok(Ok(status)) => tracing::info!(binary = %self.binary, %status, "Analyzer stopped"),
            Ok(Err(e)) => tracing::warn!(binary = %self.binary, error = %e, "Failed to reap analyzer"),
            Err(_) => tracing::warn!(binary = %self.binary, "Analyzer did not exit in time"),
        }
    }
}
