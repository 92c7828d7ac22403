use anyhow::{anyhow, Context, Result};
use clap::Parser;
use serde::Serialize;
use std::fs;
use std::io::{self, BufRead, BufReader};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

mod artifact;
mod cli;
mod config;
mod discovery;
mod error;
mod record;
mod sink;

use artifact::Artifact;
use cli::{Command, ExportArgs, InitConfigArgs, ResolveArgs, RootArgs};
use config::JarvizConfig;
use discovery::{ArtifactDiscovery, MavenArtifactResolver};
use record::CouplingRecord;
use sink::RecordSink;

const LOG_ENV: &str = "JARVIZ_LOG";

fn main() -> Result<()> {
    init_tracing();
    let args = RootArgs::parse();

    match args.command {
        Command::InitConfig(args) => cmd_init_config(args),
        Command::Resolve(args) => cmd_resolve(args),
        Command::Export(args) => cmd_export(args),
    }
}

/// Logs go to stderr so stdout stays machine-readable.
fn init_tracing() {
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(io::stderr)
        .init();
}

fn cmd_init_config(args: InitConfigArgs) -> Result<()> {
    if args.out.exists() && !args.force {
        return Err(anyhow!(
            "{} already exists (use --force to overwrite)",
            args.out.display()
        ));
    }
    config::write_config(&args.out, &config::default_config())?;
    println!("wrote {}", args.out.display());
    Ok(())
}

#[derive(Debug, Serialize)]
struct ResolvedArtifact {
    artifact: String,
    path: PathBuf,
    exists: bool,
}

fn cmd_resolve(args: ResolveArgs) -> Result<()> {
    let config = resolve_config(&args)?;
    let artifacts = collect_artifacts(&args)?;
    if artifacts.is_empty() {
        return Err(anyhow!("no artifacts given (pass COORD arguments or --artifacts)"));
    }

    let resolver = MavenArtifactResolver::new(&config);
    tracing::debug!(
        local_repo = %resolver.local_repo().display(),
        artifacts = artifacts.len(),
        "resolving artifacts"
    );
    let resolved = resolve_all(&resolver, &artifacts)?;

    if args.json {
        let text = serde_json::to_string_pretty(&resolved).context("serialize resolved artifacts")?;
        println!("{text}");
    } else {
        for entry in &resolved {
            println!("{}", entry.path.display());
        }
    }
    Ok(())
}

fn resolve_all<D: ArtifactDiscovery>(
    discovery: &D,
    artifacts: &[Artifact],
) -> Result<Vec<ResolvedArtifact>> {
    artifacts
        .iter()
        .map(|artifact| {
            let path = discovery
                .discover(artifact)
                .inspect_err(|err| {
                    if err.is_timeout() {
                        tracing::error!(
                            artifact = %err.coordinate(),
                            "fetch timed out; raise mavenTimeOutSeconds or pass --timeout-seconds"
                        );
                    }
                })
                .with_context(|| format!("resolve {artifact}"))?;
            let exists = path.is_file();
            if !exists {
                tracing::warn!(path = %path.display(), "resolved artifact is not present locally");
            }
            Ok(ResolvedArtifact {
                artifact: artifact.to_maven_id(),
                path,
                exists,
            })
        })
        .collect()
}

/// File values first, then explicit flags.
fn resolve_config(args: &ResolveArgs) -> Result<JarvizConfig> {
    let mut config = match &args.config {
        Some(path) => config::load_config(path)?,
        None => config::default_config(),
    };
    if let Some(dir) = &args.artifact_dir {
        config.artifact_directory = dir.clone();
    }
    if let Some(seconds) = args.timeout_seconds {
        config.maven_time_out_seconds = seconds;
    }
    if args.continue_on_error {
        config.continue_on_maven_error = true;
    }
    if let Some(tool) = &args.tool {
        config.maven_tool = Some(tool.clone());
    }
    config::validate_config(&config)?;
    Ok(config)
}

fn collect_artifacts(args: &ResolveArgs) -> Result<Vec<Artifact>> {
    let mut artifacts = Vec::new();
    if let Some(path) = &args.artifacts {
        artifacts.extend(load_artifacts(path)?);
    }
    for coordinate in &args.coordinates {
        artifacts.push(coordinate.parse::<Artifact>()?);
    }
    Ok(artifacts)
}

fn load_artifacts(path: &Path) -> Result<Vec<Artifact>> {
    let bytes = fs::read(path).with_context(|| format!("read artifacts {}", path.display()))?;
    let artifacts: Vec<Artifact> = serde_json::from_slice(&bytes)
        .with_context(|| format!("parse artifacts JSON {}", path.display()))?;
    for (idx, artifact) in artifacts.iter().enumerate() {
        artifact
            .validate()
            .with_context(|| format!("artifact #{idx} in {}", path.display()))?;
    }
    Ok(artifacts)
}

fn cmd_export(args: ExportArgs) -> Result<()> {
    let reader: Box<dyn BufRead> = if args.input.as_os_str() == "-" {
        Box::new(BufReader::new(io::stdin()))
    } else {
        let file = fs::File::open(&args.input)
            .with_context(|| format!("open {}", args.input.display()))?;
        Box::new(BufReader::new(file))
    };

    let mut sink = RecordSink::new(&args.out);
    let streamed = stream_records(reader, &mut sink);
    let written = sink.records_written();
    let closed = sink.close();

    // The sink is closed on every path; a streaming failure wins over a close failure.
    if let Err(err) = streamed {
        if let Err(close_err) = closed {
            tracing::error!(
                path = %close_err.path().display(),
                error = %close_err,
                "close after failed export"
            );
        }
        return Err(err);
    }
    if closed? {
        println!("wrote {written} records to {}", args.out.display());
    } else {
        println!("no records to write; {} not created", args.out.display());
    }
    Ok(())
}

fn stream_records(reader: impl BufRead, sink: &mut RecordSink) -> Result<()> {
    for (idx, line) in reader.lines().enumerate() {
        let line = line.with_context(|| format!("read record line {}", idx + 1))?;
        if line.trim().is_empty() {
            continue;
        }
        let record: CouplingRecord = serde_json::from_str(&line)
            .with_context(|| format!("parse record on line {}", idx + 1))?;
        sink.write(&record)?;
    }
    tracing::info!(
        records = sink.records_written(),
        path = %sink.path().display(),
        format = ?sink.format(),
        "records persisted"
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{DiscoveryError, FetchFailure};
    use std::cell::RefCell;
    use std::time::Duration;

    struct RecordingDiscovery {
        root: PathBuf,
        seen: RefCell<Vec<String>>,
        fail_on: Option<String>,
    }

    impl ArtifactDiscovery for RecordingDiscovery {
        fn discover(&self, artifact: &Artifact) -> Result<PathBuf, DiscoveryError> {
            let coordinate = artifact.to_maven_id();
            self.seen.borrow_mut().push(coordinate.clone());
            if self.fail_on.as_deref() == Some(coordinate.as_str()) {
                return Err(DiscoveryError::ArtifactNotFound {
                    coordinate,
                    cause: FetchFailure::ProcessTimeout {
                        timeout: Duration::from_secs(1),
                    },
                });
            }
            Ok(self.root.join(artifact.to_file_name()))
        }
    }

    fn artifacts() -> Vec<Artifact> {
        vec![
            "com.foo:a:1.0".parse().expect("parse a"),
            "com.foo:b:LATEST".parse().expect("parse b"),
        ]
    }

    #[test]
    fn resolve_all_keeps_input_order() {
        let discovery = RecordingDiscovery {
            root: PathBuf::from("/nonexistent/repo"),
            seen: RefCell::new(Vec::new()),
            fail_on: None,
        };
        let resolved = resolve_all(&discovery, &artifacts()).expect("resolve all");
        let paths: Vec<_> = resolved.iter().map(|entry| entry.path.clone()).collect();
        assert_eq!(
            paths,
            vec![
                PathBuf::from("/nonexistent/repo/a-1.0.jar"),
                PathBuf::from("/nonexistent/repo/b.jar"),
            ]
        );
        assert!(resolved.iter().all(|entry| !entry.exists));
    }

    #[test]
    fn resolve_all_stops_at_first_failure() {
        let discovery = RecordingDiscovery {
            root: PathBuf::from("/nonexistent/repo"),
            seen: RefCell::new(Vec::new()),
            fail_on: Some("com.foo:a:1.0:jar".to_string()),
        };
        let err = resolve_all(&discovery, &artifacts()).expect_err("first artifact fails");
        assert!(format!("{err:#}").contains("com.foo:a:1.0:jar"));
        assert_eq!(discovery.seen.borrow().len(), 1);
    }

    #[test]
    fn load_artifacts_rejects_blank_classifier() {
        let path = std::env::temp_dir().join(format!(
            "jarviz-artifacts-{}-{}.json",
            std::process::id(),
            std::time::SystemTime::now()
                .duration_since(std::time::UNIX_EPOCH)
                .expect("clock before epoch")
                .as_nanos()
        ));
        let list = serde_json::json!([
            { "groupId": "g", "artifactId": "a", "version": "1.0", "classifier": "" }
        ]);
        fs::write(&path, list.to_string()).expect("write artifacts");
        let err = load_artifacts(&path).expect_err("blank classifier rejected");
        assert!(format!("{err:#}").contains("artifact #0"));
        let _ = fs::remove_file(path);
    }

    #[test]
    fn stream_records_skips_blank_lines_and_reports_bad_line() {
        let root = std::env::temp_dir().join(format!(
            "jarviz-stream-{}-{}",
            std::process::id(),
            std::time::SystemTime::now()
                .duration_since(std::time::UNIX_EPOCH)
                .expect("clock before epoch")
                .as_nanos()
        ));
        let record = serde_json::json!({
            "appSetName": "set",
            "applicationName": "app",
            "artifactFileName": "a-1.0.jar",
            "artifactId": "a",
            "artifactGroup": "com.foo",
            "artifactVersion": "1.0",
            "sourceClass": "x.Y",
            "sourceMethod": "m",
            "targetClass": "z.W",
            "targetMethod": "n"
        });
        let input = format!("{record}\n\n{record}\nnot json\n");
        let mut sink = RecordSink::new(root.join("out.jsonl"));
        let err = stream_records(input.as_bytes(), &mut sink).expect_err("bad line fails");
        assert!(format!("{err:#}").contains("line 4"));
        assert_eq!(sink.records_written(), 2);
        assert!(sink.close().expect("close sink"));
        let _ = fs::remove_dir_all(root);
    }
}
