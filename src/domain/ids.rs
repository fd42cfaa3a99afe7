//! Domain identifier types with validation
//!
//! Newtype wrappers keep dashboard, widget, partition and asset identifiers
//! from being mixed up. Each rejects empty input.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Dashboard identifier
///
/// # Examples
///
/// ```
/// use folio::domain::ids::DashboardId;
/// use std::str::FromStr;
///
/// let id = DashboardId::from_str("district-overview").unwrap();
/// assert_eq!(id.as_str(), "district-overview");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DashboardId(String);

impl DashboardId {
    /// Creates a new DashboardId, rejecting blank input
    pub fn new(id: impl Into<String>) -> Result<Self, String> {
        let id = id.into();
        if id.trim().is_empty() {
            return Err("Dashboard ID cannot be empty".to_string());
        }
        Ok(Self(id))
    }

    /// Returns the dashboard ID as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DashboardId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for DashboardId {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

/// Widget identifier
///
/// Widget ids are stable across partitions: the same widget filtered for two
/// schools keeps its id.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WidgetId(String);

impl WidgetId {
    /// Creates a new WidgetId, rejecting blank input
    pub fn new(id: impl Into<String>) -> Result<Self, String> {
        let id = id.into();
        if id.trim().is_empty() {
            return Err("Widget ID cannot be empty".to_string());
        }
        Ok(Self(id))
    }

    /// Returns the widget ID as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for WidgetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for WidgetId {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

/// A partition value, e.g. a school name
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PartitionId(String);

impl PartitionId {
    /// Creates a new PartitionId; surrounding whitespace is trimmed
    pub fn new(value: impl Into<String>) -> Result<Self, String> {
        let value = value.into();
        let trimmed = value.trim();
        if trimmed.is_empty() {
            return Err("Partition value cannot be empty".to_string());
        }
        Ok(Self(trimmed.to_string()))
    }

    /// Returns the partition value as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Parses a comma-separated list, skipping blank entries
    pub fn parse_list(input: &str) -> Vec<PartitionId> {
        input
            .split(',')
            .filter_map(|part| PartitionId::new(part).ok())
            .collect()
    }
}

impl fmt::Display for PartitionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for PartitionId {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

/// Opaque handle to a binary object held by the remote asset store
///
/// Only the handle travels through the pipeline, never the bytes.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AssetRef(String);

impl AssetRef {
    /// Wraps a handle returned by the asset store
    pub fn new(handle: impl Into<String>) -> Result<Self, String> {
        let handle = handle.into();
        if handle.trim().is_empty() {
            return Err("Asset reference cannot be empty".to_string());
        }
        Ok(Self(handle))
    }

    /// Returns the handle as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for AssetRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
