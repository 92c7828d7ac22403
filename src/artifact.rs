//! Artifact descriptors and their derived names.
//!
//! An artifact is addressed two ways: the file name it has inside the local
//! repository, and the coordinate string handed to the fetch tool.
use anyhow::{anyhow, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

pub const DEFAULT_PACKAGING: &str = "jar";

const VERSION_LATEST: &str = "LATEST";
const VERSION_RELEASE: &str = "RELEASE";

/// A versioned dependency identified by group, artifact, version and classifier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Artifact {
    group_id: String,
    artifact_id: String,
    version: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    classifier: Option<String>,
    #[serde(default = "default_packaging")]
    packaging: String,
}

fn default_packaging() -> String {
    DEFAULT_PACKAGING.to_string()
}

impl Artifact {
    pub fn new(
        group_id: impl Into<String>,
        artifact_id: impl Into<String>,
        version: impl Into<String>,
    ) -> Result<Self> {
        let artifact = Self {
            group_id: group_id.into(),
            artifact_id: artifact_id.into(),
            version: version.into(),
            classifier: None,
            packaging: default_packaging(),
        };
        artifact.validate()?;
        Ok(artifact)
    }

    pub fn with_classifier(mut self, classifier: impl Into<String>) -> Self {
        let classifier = classifier.into();
        self.classifier = (!classifier.is_empty()).then_some(classifier);
        self
    }

    /// Reject descriptors the fetch tool could never satisfy.
    ///
    /// Deserialized artifacts bypass `new`, so callers loading artifact lists
    /// run this explicitly.
    pub fn validate(&self) -> Result<()> {
        for (label, value) in [
            ("groupId", &self.group_id),
            ("artifactId", &self.artifact_id),
            ("version", &self.version),
            ("packaging", &self.packaging),
        ] {
            if value.trim().is_empty() {
                return Err(anyhow!("artifact {label} must not be empty"));
            }
            if value.contains(':') {
                return Err(anyhow!("artifact {label} {value:?} must not contain ':'"));
            }
        }
        if let Some(classifier) = &self.classifier {
            if classifier.trim().is_empty() {
                return Err(anyhow!("artifact classifier must be omitted or non-empty"));
            }
            if classifier.contains(':') {
                return Err(anyhow!("artifact classifier {classifier:?} must not contain ':'"));
            }
        }
        Ok(())
    }

    /// True when the version is a symbolic marker resolved by the repository.
    pub fn is_version_latest_or_release(&self) -> bool {
        self.version.eq_ignore_ascii_case(VERSION_LATEST)
            || self.version.eq_ignore_ascii_case(VERSION_RELEASE)
    }

    /// File name of the artifact inside the local repository root.
    ///
    /// Symbolic versions are fetched with the version stripped, so their file
    /// name carries no version segment.
    pub fn to_file_name(&self) -> String {
        let mut stem = self.artifact_id.clone();
        if !self.is_version_latest_or_release() {
            stem.push('-');
            stem.push_str(&self.version);
        }
        if let Some(classifier) = &self.classifier {
            stem.push('-');
            stem.push_str(classifier);
        }
        format!("{stem}.{}", self.packaging)
    }

    /// Coordinate understood by `mvn dependency:copy -Dartifact=...`.
    pub fn to_maven_id(&self) -> String {
        let base = format!(
            "{}:{}:{}:{}",
            self.group_id, self.artifact_id, self.version, self.packaging
        );
        match &self.classifier {
            Some(classifier) => format!("{base}:{classifier}"),
            None => base,
        }
    }
}

impl fmt::Display for Artifact {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_maven_id())
    }
}

/// Parses `group:artifact:version[:classifier]`.
impl FromStr for Artifact {
    type Err = anyhow::Error;

    fn from_str(input: &str) -> Result<Self> {
        let parts: Vec<&str> = input.trim().split(':').collect();
        let artifact = match parts.as_slice() {
            [group, artifact, version] => Artifact::new(*group, *artifact, *version)?,
            [group, artifact, version, classifier] => {
                if classifier.is_empty() {
                    return Err(anyhow!("artifact coordinate {input:?} has an empty classifier"));
                }
                Artifact::new(*group, *artifact, *version)?.with_classifier(*classifier)
            }
            _ => {
                return Err(anyhow!(
                    "artifact coordinate {input:?} must look like group:artifact:version[:classifier]"
                ))
            }
        };
        Ok(artifact)
    }
}

#[cfg(test)]
#[path = "artifact_tests.rs"]
mod tests;
