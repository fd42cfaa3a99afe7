//! Collaborator traits
//!
//! The export pipeline talks to the outside world only through these traits:
//! the data provider, the session service, the asset store, the document
//! generator, the renderer that owns widget pixels, and the local state store.
//! HTTP implementations live in [`crate::adapters::http`]; tests use in-memory
//! fakes.

use crate::domain::{
    AssetKind, AssetRef, DashboardId, Dataset, DocumentFormat, ImageFormat, PartitionId,
    ProgressSnapshot, Result, Widget, WidgetId,
};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Supplies dashboard datasets
#[async_trait]
pub trait DashboardDataProvider: Send + Sync {
    /// Fetch the unfiltered dashboard
    async fn get_dashboard(&self, id: &DashboardId) -> Result<Dataset>;

    /// Fetch the dashboard filtered to the given partition values
    async fn get_dashboard_filtered_by_partition(
        &self,
        id: &DashboardId,
        partitions: &[PartitionId],
    ) -> Result<Dataset>;
}

/// Reports how long the current credentials stay valid
#[async_trait]
pub trait SessionValidity: Send + Sync {
    /// Milliseconds until the session expires (0 when already expired)
    async fn remaining_ms(&self) -> Result<u64>;

    /// Whether at least `min_ms` remain
    async fn has_enough_time_for(&self, min_ms: u64) -> Result<bool> {
        Ok(self.remaining_ms().await? >= min_ms)
    }
}

/// Remote binary object store
#[async_trait]
pub trait RemoteAssetStore: Send + Sync {
    /// Upload `bytes` and return the handle of the stored object
    async fn upload(&self, bytes: Vec<u8>, kind: AssetKind) -> Result<AssetRef>;
}

/// A document produced by the remote generator
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeneratedDocument {
    /// Download URL; may be empty when the generator produced nothing
    #[serde(default)]
    pub url: String,
}

/// Remote document generation endpoints
#[async_trait]
pub trait RemoteDocumentGenerator: Send + Sync {
    /// Generate the document for one widget
    async fn generate_widget_document(
        &self,
        widget_id: &WidgetId,
        format: DocumentFormat,
        display: Option<&AssetRef>,
        detail: Option<&AssetRef>,
    ) -> Result<GeneratedDocument>;

    /// Generate one document for a whole dashboard from its widget assets
    async fn generate_full_dashboard_document(
        &self,
        dashboard_id: &DashboardId,
        format: DocumentFormat,
        assets: &[AssetRef],
    ) -> Result<GeneratedDocument>;

    /// Merge documents, in order, into one named deliverable
    async fn merge_documents(&self, urls: &[String], output_name: &str)
        -> Result<GeneratedDocument>;
}

/// An encoded image produced by the renderer
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedImage {
    pub bytes: Vec<u8>,
    pub format: ImageFormat,
}

impl RenderedImage {
    pub fn png(bytes: Vec<u8>) -> Self {
        Self {
            bytes,
            format: ImageFormat::Png,
        }
    }

    pub fn svg(markup: impl Into<String>) -> Self {
        Self {
            bytes: markup.into().into_bytes(),
            format: ImageFormat::Svg,
        }
    }
}

/// The drawing surface a chart was rendered on
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum ChartSurface {
    /// Raster surface exported as a `data:image/png;base64,...` URL
    Canvas { data_url: String },
    /// Vector surface as SVG markup
    Svg { markup: String },
}

/// The rendering layer that owns widget pixels
#[async_trait]
pub trait WidgetRenderer: Send + Sync {
    /// Snapshot the widget's rendered container
    async fn snapshot_container(&self, widget: &Widget) -> Result<RenderedImage>;

    /// Snapshot the card enclosing the widget, frame and legend included
    async fn snapshot_card(&self, widget: &Widget) -> Result<RenderedImage>;

    /// The chart surface, if the widget draws on one
    async fn chart_surface(&self, widget: &Widget) -> Result<Option<ChartSurface>>;

    /// Clone the widget into an offscreen canvas and rasterize it
    async fn render_offscreen(&self, widget: &Widget) -> Result<RenderedImage>;

    /// Render the secondary detail chart, if the widget has one
    async fn render_detail_chart(&self, widget: &Widget) -> Result<Option<RenderedImage>>;
}

/// Receives batch progress; the presentation layer implements this
pub trait ProgressObserver: Send + Sync {
    /// A batch of `total` widgets is starting for `partition`
    fn on_batch_start(&self, _partition: &str, _total: usize) {}

    /// Counters changed
    fn on_progress(&self, snapshot: ProgressSnapshot);
}

/// Persistent key/value state
#[async_trait]
pub trait StateStore: Send + Sync {
    /// Read a value
    async fn get(&self, key: &str) -> Result<Option<serde_json::Value>>;

    /// Write a value, replacing any previous one
    async fn put(&self, key: &str, value: serde_json::Value) -> Result<()>;

    /// Delete a value, returning it
    async fn remove(&self, key: &str) -> Result<Option<serde_json::Value>>;

    /// Read a value and delete it, for one-shot entries
    async fn take(&self, key: &str) -> Result<Option<serde_json::Value>> {
        self.remove(key).await
    }

    /// Keys starting with `prefix`, sorted
    async fn keys_with_prefix(&self, prefix: &str) -> Result<Vec<String>>;
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FixedSession(u64);

    #[async_trait]
    impl SessionValidity for FixedSession {
        async fn remaining_ms(&self) -> Result<u64> {
            Ok(self.0)
        }
    }

    #[tokio::test]
    async fn test_has_enough_time_for_default() {
        let session = FixedSession(5 * 60 * 1000);
        assert!(!session.has_enough_time_for(12 * 60 * 1000).await.unwrap());
        assert!(session.has_enough_time_for(5 * 60 * 1000).await.unwrap());
    }

    #[test]
    fn test_chart_surface_tagged_json() {
        let surface: ChartSurface =
            serde_json::from_str(r#"{"kind": "svg", "markup": "<svg></svg>"}"#).unwrap();
        assert_eq!(
            surface,
            ChartSurface::Svg {
                markup: "<svg></svg>".to_string()
            }
        );
    }

    #[test]
    fn test_generated_document_missing_url_is_empty() {
        let doc: GeneratedDocument = serde_json::from_str("{}").unwrap();
        assert!(doc.url.is_empty());
    }
}
