//! Artifact discovery: map an artifact to a file in the local repository,
//! fetching it with Maven when it is not there yet.
//!
//! There is no coordination between resolvers sharing a repository root; two
//! concurrent misses for the same artifact both run the fetch tool.
mod process;

use crate::artifact::Artifact;
use crate::config::JarvizConfig;
use crate::error::{DiscoveryError, FetchFailure};
use process::{exit_status_string, run_with_timeout, RunOutcome};
use std::path::{Path, PathBuf};
use std::process::Command;
use std::time::{Duration, Instant};

#[cfg(windows)]
const MAVEN_TOOL_NAME: &str = "mvn.cmd";
#[cfg(not(windows))]
const MAVEN_TOOL_NAME: &str = "mvn";

/// Resolves artifacts to local files.
pub trait ArtifactDiscovery {
    /// Return the local path of `artifact`, fetching it when absent.
    fn discover(&self, artifact: &Artifact) -> Result<PathBuf, DiscoveryError>;
}

/// Fetches missing artifacts with `mvn dependency:copy`.
#[derive(Debug, Clone)]
pub struct MavenArtifactResolver {
    local_repo: PathBuf,
    continue_on_error: bool,
    timeout: Duration,
    tool: Option<PathBuf>,
}

impl MavenArtifactResolver {
    pub fn new(config: &JarvizConfig) -> Self {
        Self {
            local_repo: config.artifact_directory.clone(),
            continue_on_error: config.continue_on_maven_error,
            timeout: Duration::from_secs(config.maven_time_out_seconds),
            tool: config.maven_tool.clone(),
        }
    }

    pub fn local_repo(&self) -> &Path {
        &self.local_repo
    }

    /// Where `artifact` lives once fetched.
    pub fn expected_path(&self, artifact: &Artifact) -> PathBuf {
        self.local_repo.join(artifact.to_file_name())
    }

    /// Resolve `artifact` to its expected local path.
    ///
    /// The existence check runs on every call. After a fetch attempt the path
    /// is returned without re-checking it, so an absorbed failure (or a tool
    /// that exits 0 without writing the file) yields a path that may not exist.
    /// A tool that cannot be started fails regardless of continue-on-error.
    pub fn resolve(&self, artifact: &Artifact) -> Result<PathBuf, DiscoveryError> {
        let file = self.expected_path(artifact);
        if file.exists() {
            tracing::debug!(path = %file.display(), "artifact already in local repository");
            return Ok(file);
        }

        if let Err(cause) = self.fetch(artifact) {
            let coordinate = artifact.to_maven_id();
            if !self.continue_on_error || !cause.is_absorbable() {
                return Err(DiscoveryError::ArtifactNotFound { coordinate, cause });
            }
            tracing::warn!(
                artifact = %coordinate,
                error = %cause,
                "continuing after maven fetch failure"
            );
        }

        Ok(file)
    }

    /// Arguments for one `dependency:copy` invocation.
    pub fn fetch_args(&self, artifact: &Artifact) -> Vec<String> {
        vec![
            "dependency:copy".to_string(),
            format!("-DoutputDirectory={}", self.local_repo.display()),
            format!("-Dartifact={}", artifact.to_maven_id()),
            format!(
                "-Dmdep.stripVersion={}",
                artifact.is_version_latest_or_release()
            ),
        ]
    }

    fn fetch(&self, artifact: &Artifact) -> Result<(), FetchFailure> {
        let coordinate = artifact.to_maven_id();
        tracing::info!(artifact = %coordinate, "maven: fetching artifact");

        let args = self.fetch_args(artifact);
        let tool = self.tool_path()?;
        let command_line = format_command_line(&tool, &args);

        let start = Instant::now();
        let outcome = run_with_timeout(Command::new(&tool).args(&args), self.timeout).map_err(
            |source| FetchFailure::ToolInvocation {
                tool: tool.display().to_string(),
                source,
            },
        )?;
        let elapsed_ms = start.elapsed().as_millis();

        match outcome {
            RunOutcome::Exited(status) if status.success() => {
                tracing::info!(elapsed_ms, artifact = %coordinate, "maven fetch complete");
                Ok(())
            }
            RunOutcome::Exited(status) => {
                tracing::error!(
                    elapsed_ms,
                    status = %exit_status_string(&status),
                    "maven command failed: {command_line}"
                );
                Err(FetchFailure::ExitStatus {
                    status: exit_status_string(&status),
                })
            }
            RunOutcome::TimedOut => {
                tracing::error!(
                    "maven command failed to execute in {} seconds: {command_line}; \
                     consider increasing the mavenTimeOutSeconds config value",
                    self.timeout.as_secs()
                );
                Err(FetchFailure::ProcessTimeout {
                    timeout: self.timeout,
                })
            }
        }
    }

    /// Explicit paths are used as-is; bare names are looked up on PATH.
    fn tool_path(&self) -> Result<PathBuf, FetchFailure> {
        let candidate = self
            .tool
            .clone()
            .unwrap_or_else(|| PathBuf::from(MAVEN_TOOL_NAME));
        if candidate.components().count() > 1 {
            return Ok(candidate);
        }
        which::which(&candidate).map_err(|source| FetchFailure::ToolNotFound {
            tool: candidate.display().to_string(),
            source,
        })
    }
}

impl ArtifactDiscovery for MavenArtifactResolver {
    fn discover(&self, artifact: &Artifact) -> Result<PathBuf, DiscoveryError> {
        self.resolve(artifact)
    }
}

fn format_command_line(tool: &Path, args: &[String]) -> String {
    let tool = tool.to_string_lossy();
    shell_words::join(std::iter::once(&*tool).chain(args.iter().map(String::as_str)))
}

#[cfg(test)]
#[path = "discovery_tests.rs"]
mod tests;
