//! Export job specification and asset kinds

use super::ids::PartitionId;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// How a job splits the dashboard into documents
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExportType {
    /// One document from the unfiltered dashboard
    NoPartition,
    /// One document filtered to a single partition
    SinglePartition,
    /// One document per partition plus an unfiltered baseline
    AllPartitionsSeparate,
}

impl FromStr for ExportType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "none" | "no_partition" => Ok(ExportType::NoPartition),
            "single" | "single_partition" => Ok(ExportType::SinglePartition),
            "all" | "all_partitions_separate" => Ok(ExportType::AllPartitionsSeparate),
            other => Err(format!(
                "Invalid export mode '{other}'. Must be one of: none, single, all"
            )),
        }
    }
}

/// Output document format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DocumentFormat {
    #[default]
    Pdf,
    Pptx,
}

impl DocumentFormat {
    /// Format name as sent to the document generator
    pub fn as_str(self) -> &'static str {
        match self {
            DocumentFormat::Pdf => "pdf",
            DocumentFormat::Pptx => "pptx",
        }
    }
}

impl fmt::Display for DocumentFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DocumentFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "pdf" => Ok(DocumentFormat::Pdf),
            "pptx" => Ok(DocumentFormat::Pptx),
            other => Err(format!("Invalid format '{other}'. Must be one of: pdf, pptx")),
        }
    }
}

/// A user-requested export, built once per command and consumed by the orchestrator
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExportJobSpec {
    pub export_type: ExportType,

    /// Partitions in processing order
    #[serde(default)]
    pub partitions: Vec<PartitionId>,

    #[serde(default)]
    pub format: DocumentFormat,
}

impl ExportJobSpec {
    /// Unfiltered single-document export
    pub fn unpartitioned(format: DocumentFormat) -> Self {
        Self {
            export_type: ExportType::NoPartition,
            partitions: Vec::new(),
            format,
        }
    }

    /// Checks that the partition list fits the export type
    pub fn validate(&self) -> Result<(), String> {
        match self.export_type {
            ExportType::NoPartition => Ok(()),
            ExportType::SinglePartition => match self.partitions.len() {
                1 => Ok(()),
                0 => Err("single-partition export requires a partition".to_string()),
                n => Err(format!(
                    "single-partition export takes exactly one partition, got {n}"
                )),
            },
            ExportType::AllPartitionsSeparate => {
                if self.partitions.is_empty() {
                    Err("per-partition export requires at least one partition".to_string())
                } else {
                    Ok(())
                }
            }
        }
    }
}

/// Image encoding of an uploaded asset
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImageFormat {
    Png,
    Svg,
}

impl ImageFormat {
    /// MIME type for uploads
    pub fn mime_type(self) -> &'static str {
        match self {
            ImageFormat::Png => "image/png",
            ImageFormat::Svg => "image/svg+xml",
        }
    }
}

/// What an uploaded asset is used for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AssetRole {
    /// The widget image placed in the document
    Display,
    /// The secondary detail chart
    Detail,
}

/// Kind of an asset passed to the asset store
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssetKind {
    pub role: AssetRole,
    pub format: ImageFormat,
}

impl AssetKind {
    pub fn display(format: ImageFormat) -> Self {
        Self {
            role: AssetRole::Display,
            format,
        }
    }

    pub fn detail(format: ImageFormat) -> Self {
        Self {
            role: AssetRole::Detail,
            format,
        }
    }
}
