//! Export service adapter
//!
//! One remote service backs four collaborators: dashboard data, session
//! validity, asset storage and document generation.
//!
//! | Operation | Request |
//! |-----------|---------|
//! | dashboard | `GET dashboards/{id}` |
//! | filtered dashboard | `POST dashboards/{id}/filter` |
//! | session | `GET session` |
//! | upload | `POST assets?role=..&format=..` (raw body) |
//! | widget document | `POST widgets/{id}/documents` |
//! | full dashboard document | `POST dashboards/{id}/documents` |
//! | merge | `POST documents/merge` |

use super::client::ServiceClient;
use crate::adapters::traits::{
    DashboardDataProvider, GeneratedDocument, RemoteAssetStore, RemoteDocumentGenerator,
    SessionValidity,
};
use crate::domain::{
    AssetKind, AssetRef, AssetRole, DashboardId, Dataset, DocumentFormat, FolioError, ImageFormat,
    PartitionId, Result, WidgetId,
};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// HTTP client for the export service
///
/// # Example
///
/// ```no_run
/// use folio::adapters::http::{HttpExportService, ServiceClient};
/// use folio::adapters::traits::SessionValidity;
/// use folio::config::ServiceConfig;
///
/// # async fn example() -> folio::domain::Result<()> {
/// let client = ServiceClient::for_service(&ServiceConfig::default())?;
/// let service = HttpExportService::new(client);
/// let remaining = service.remaining_ms().await?;
/// println!("{remaining} ms left");
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct HttpExportService {
    client: ServiceClient,
}

impl HttpExportService {
    pub fn new(client: ServiceClient) -> Self {
        Self { client }
    }
}

#[derive(Serialize)]
struct PartitionFilter<'a> {
    partitions: &'a [PartitionId],
}

#[derive(Deserialize)]
struct SessionInfo {
    expires_at: DateTime<Utc>,
}

#[derive(Deserialize)]
struct UploadResponse {
    #[serde(rename = "ref")]
    handle: String,
}

#[derive(Serialize)]
struct WidgetDocumentRequest<'a> {
    format: DocumentFormat,
    display_asset: Option<&'a AssetRef>,
    detail_asset: Option<&'a AssetRef>,
}

#[derive(Serialize)]
struct DashboardDocumentRequest<'a> {
    format: DocumentFormat,
    assets: &'a [AssetRef],
}

#[derive(Serialize)]
struct MergeRequest<'a> {
    urls: &'a [String],
    output_name: &'a str,
}

#[async_trait]
impl DashboardDataProvider for HttpExportService {
    async fn get_dashboard(&self, id: &DashboardId) -> Result<Dataset> {
        tracing::debug!(dashboard_id = %id, "Fetching dashboard");
        self.client
            .get_json(&["dashboards", id.as_str()], "get_dashboard")
            .await
    }

    async fn get_dashboard_filtered_by_partition(
        &self,
        id: &DashboardId,
        partitions: &[PartitionId],
    ) -> Result<Dataset> {
        tracing::debug!(
            dashboard_id = %id,
            partitions = partitions.len(),
            "Fetching filtered dashboard"
        );
        let mut dataset: Dataset = self
            .client
            .query_json(
                &["dashboards", id.as_str(), "filter"],
                &PartitionFilter { partitions },
                "get_dashboard_filtered",
            )
            .await?;

        // Services that omit the echo still get a labelled dataset
        if dataset.partition.is_none() {
            if let [only] = partitions {
                dataset.partition = Some(only.clone());
            }
        }

        Ok(dataset)
    }
}

#[async_trait]
impl SessionValidity for HttpExportService {
    async fn remaining_ms(&self) -> Result<u64> {
        let info: SessionInfo = self
            .client
            .get_json(&["session"], "get_session")
            .await
            .map_err(|e| FolioError::Session(e.to_string()))?;

        let remaining = (info.expires_at - Utc::now()).num_milliseconds();
        Ok(remaining.max(0) as u64)
    }
}

#[async_trait]
impl RemoteAssetStore for HttpExportService {
    async fn upload(&self, bytes: Vec<u8>, kind: AssetKind) -> Result<AssetRef> {
        let role = match kind.role {
            AssetRole::Display => "display",
            AssetRole::Detail => "detail",
        };
        let format = match kind.format {
            ImageFormat::Png => "png",
            ImageFormat::Svg => "svg",
        };
        let size = bytes.len();

        let response: UploadResponse = self
            .client
            .post_bytes(
                &["assets"],
                &[("role", role), ("format", format)],
                bytes,
                kind.format.mime_type(),
                "upload_asset",
            )
            .await
            .map_err(|e| match e {
                FolioError::Timeout { .. } => e,
                other => FolioError::Storage(other.to_string()),
            })?;

        let asset = AssetRef::new(response.handle).map_err(FolioError::Storage)?;
        tracing::debug!(asset = %asset, role, size, "Uploaded asset");
        Ok(asset)
    }
}

#[async_trait]
impl RemoteDocumentGenerator for HttpExportService {
    async fn generate_widget_document(
        &self,
        widget_id: &WidgetId,
        format: DocumentFormat,
        display: Option<&AssetRef>,
        detail: Option<&AssetRef>,
    ) -> Result<GeneratedDocument> {
        self.client
            .post_json(
                &["widgets", widget_id.as_str(), "documents"],
                &WidgetDocumentRequest {
                    format,
                    display_asset: display,
                    detail_asset: detail,
                },
                "generate_widget_document",
            )
            .await
    }

    async fn generate_full_dashboard_document(
        &self,
        dashboard_id: &DashboardId,
        format: DocumentFormat,
        assets: &[AssetRef],
    ) -> Result<GeneratedDocument> {
        self.client
            .post_json(
                &["dashboards", dashboard_id.as_str(), "documents"],
                &DashboardDocumentRequest { format, assets },
                "generate_full_dashboard_document",
            )
            .await
    }

    async fn merge_documents(
        &self,
        urls: &[String],
        output_name: &str,
    ) -> Result<GeneratedDocument> {
        self.client
            .post_json(
                &["documents", "merge"],
                &MergeRequest { urls, output_name },
                "merge_documents",
            )
            .await
    }
}
