//! Typed failures for artifact discovery and record persistence.
//!
//! Exit and timeout failures may be absorbed by the continue-on-error
//! switch; spawn failures and persistence failures always reach the caller.
use std::path::PathBuf;
use std::time::Duration;

/// Why an external fetch did not produce the artifact.
#[derive(Debug, thiserror::Error)]
pub enum FetchFailure {
    #[error("fetch tool exited with status {status}")]
    ExitStatus { status: String },

    #[error("fetch tool did not finish within {}s", .timeout.as_secs())]
    ProcessTimeout { timeout: Duration },

    #[error("could not invoke fetch tool {tool}: {source}")]
    ToolInvocation {
        tool: String,
        #[source]
        source: std::io::Error,
    },

    #[error("fetch tool {tool} not found: {source}")]
    ToolNotFound {
        tool: String,
        #[source]
        source: which::Error,
    },
}

impl FetchFailure {
    /// Whether the continue-on-error switch may absorb this failure.
    ///
    /// Only a tool that ran and failed qualifies; a tool that could not be
    /// started at all always reaches the caller.
    pub fn is_absorbable(&self) -> bool {
        matches!(
            self,
            FetchFailure::ExitStatus { .. } | FetchFailure::ProcessTimeout { .. }
        )
    }
}

/// Top-level error for resolving an artifact to a local file.
#[derive(Debug, thiserror::Error)]
pub enum DiscoveryError {
    #[error("unable to fetch the artifact {coordinate} from Maven repository")]
    ArtifactNotFound {
        coordinate: String,
        #[source]
        cause: FetchFailure,
    },
}

impl DiscoveryError {
    pub fn coordinate(&self) -> &str {
        match self {
            DiscoveryError::ArtifactNotFound { coordinate, .. } => coordinate,
        }
    }

    pub fn is_timeout(&self) -> bool {
        matches!(
            self,
            DiscoveryError::ArtifactNotFound {
                cause: FetchFailure::ProcessTimeout { .. },
                ..
            }
        )
    }
}

/// Any failure opening, writing to, or closing a record destination.
#[derive(Debug, thiserror::Error)]
pub enum PersistenceError {
    #[error("cannot write to file {}: {source}", .path.display())]
    Open {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("unable to generate coupling record file {}: {source}", .path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("unable to generate coupling record file {}: {source}", .path.display())]
    Encode {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("unable to generate coupling record file {}: {source}", .path.display())]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    #[error("unable to properly close the file stream {}: {source}", .path.display())]
    Close {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl PersistenceError {
    pub fn path(&self) -> &std::path::Path {
        match self {
            PersistenceError::Open { path, .. }
            | PersistenceError::Write { path, .. }
            | PersistenceError::Encode { path, .. }
            | PersistenceError::Csv { path, .. }
            | PersistenceError::Close { path, .. } => path,
        }
    }
}
