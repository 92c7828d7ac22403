//! CLI argument parsing.
//!
//! The CLI only wires inputs to the resolver and the record sink; the
//! coupling analysis that produces records happens elsewhere.
use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Root CLI entrypoint.
#[derive(Parser, Debug)]
#[command(
    name = "jarviz",
    version,
    about = "Fetch dependency jars and persist coupling records",
    after_help = "Examples:\n  jarviz init-config --out jarviz.json\n  jarviz resolve --config jarviz.json com.google.guava:guava:28.1-jre\n  jarviz resolve --artifacts artifacts.json --continue-on-error --json\n  jarviz export --input records.jsonl --out coupling.csv",
    subcommand_required = true,
    arg_required_else_help = true
)]
pub struct RootArgs {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    InitConfig(InitConfigArgs),
    Resolve(ResolveArgs),
    Export(ExportArgs),
}

/// Write a config file populated with defaults.
#[derive(Parser, Debug)]
#[command(about = "Write a resolver config stub")]
pub struct InitConfigArgs {
    /// Output path for the config JSON
    #[arg(long, value_name = "PATH")]
    pub out: PathBuf,

    /// Overwrite an existing file
    #[arg(long)]
    pub force: bool,
}

/// Resolve artifacts into the local repository.
#[derive(Parser, Debug)]
#[command(about = "Resolve artifacts to local jar files, fetching with Maven on a miss")]
pub struct ResolveArgs {
    /// Artifact coordinates (group:artifact:version[:classifier])
    #[arg(value_name = "COORD")]
    pub coordinates: Vec<String>,

    /// JSON file holding an array of artifacts (groupId, artifactId, version, ...)
    #[arg(long, value_name = "PATH")]
    pub artifacts: Option<PathBuf>,

    /// Resolver config JSON
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Local repository root (overrides artifactDirectory)
    #[arg(long, value_name = "DIR")]
    pub artifact_dir: Option<PathBuf>,

    /// Fetch timeout in seconds (overrides mavenTimeOutSeconds)
    #[arg(long, value_name = "SECONDS")]
    pub timeout_seconds: Option<u64>,

    /// Keep going when a fetch fails (overrides continueOnMavenError)
    #[arg(long)]
    pub continue_on_error: bool,

    /// Fetch tool to run instead of mvn (overrides mavenTool)
    #[arg(long, value_name = "PATH")]
    pub tool: Option<PathBuf>,

    /// Emit machine-readable JSON output
    #[arg(long)]
    pub json: bool,
}

/// Stream coupling records into a CSV or JSON-lines file.
#[derive(Parser, Debug)]
#[command(about = "Persist JSON-lines coupling records as CSV or JSON lines")]
pub struct ExportArgs {
    /// JSON-lines record input, or - for stdin
    #[arg(long, value_name = "PATH")]
    pub input: PathBuf,

    /// Destination; a name ending in csv selects CSV, anything else JSON lines
    #[arg(long, value_name = "PATH")]
    pub out: PathBuf,
}
