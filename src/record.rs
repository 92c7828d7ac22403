//! Coupling records emitted by the analysis stage.
use serde::{Deserialize, Serialize};

/// One reference from a method in an application class to a method of a
/// class that lives in a dependency artifact.
///
/// Field order is the column order of the CSV output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CouplingRecord {
    pub app_set_name: String,
    pub application_name: String,
    pub artifact_file_name: String,
    pub artifact_id: String,
    pub artifact_group: String,
    pub artifact_version: String,
    pub source_class: String,
    pub source_method: String,
    pub target_class: String,
    pub target_method: String,
}

/// Column names in schema order, matching the serialized field names.
pub const COUPLING_RECORD_COLUMNS: [&str; 10] = [
    "appSetName",
    "applicationName",
    "artifactFileName",
    "artifactId",
    "artifactGroup",
    "artifactVersion",
    "sourceClass",
    "sourceMethod",
    "targetClass",
    "targetMethod",
];
