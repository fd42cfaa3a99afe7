//! Per-widget export task
//!
//! Captures a widget, optionally renders its detail chart, and asks the
//! document generator for the widget's document. Every failure is converted
//! into a failed [`ExportTaskResult`]; nothing escapes the task.

use crate::core::capture::CaptureChain;
use crate::core::export::progress::ProgressTracker;
use crate::core::export::services::ExportServices;
use crate::domain::{
    AssetKind, AssetRef, DocumentFormat, ExportFailure, FolioError, Result, Widget, WidgetId,
};
use serde::Serialize;
use std::time::Duration;
use tracing::Instrument;

/// Outcome of one widget
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskOutcome {
    Success,
    Failed,
}

/// Result of exporting one widget
///
/// Built only through [`ExportTaskResult::success`] (which requires the
/// document URL) and [`ExportTaskResult::failed`].
#[derive(Debug, Clone, Serialize)]
pub struct ExportTaskResult {
    pub widget_id: WidgetId,
    pub title: String,
    /// 1-based position within the batch
    pub position: usize,
    pub display_asset: Option<AssetRef>,
    pub detail_asset: Option<AssetRef>,
    document_url: Option<String>,
    outcome: TaskOutcome,
    failure: Option<ExportFailure>,
}

impl ExportTaskResult {
    pub fn success(
        widget: &Widget,
        position: usize,
        display_asset: AssetRef,
        detail_asset: Option<AssetRef>,
        document_url: String,
    ) -> Self {
        Self {
            widget_id: widget.id.clone(),
            title: widget.title.clone(),
            position,
            display_asset: Some(display_asset),
            detail_asset,
            document_url: Some(document_url),
            outcome: TaskOutcome::Success,
            failure: None,
        }
    }

    pub fn failed(
        widget: &Widget,
        position: usize,
        display_asset: Option<AssetRef>,
        detail_asset: Option<AssetRef>,
        reason: ExportFailure,
    ) -> Self {
        Self {
            widget_id: widget.id.clone(),
            title: widget.title.clone(),
            position,
            display_asset,
            detail_asset,
            document_url: None,
            outcome: TaskOutcome::Failed,
            failure: Some(reason),
        }
    }

    pub fn outcome(&self) -> TaskOutcome {
        self.outcome
    }

    pub fn is_success(&self) -> bool {
        self.outcome == TaskOutcome::Success
    }

    pub fn document_url(&self) -> Option<&str> {
        self.document_url.as_deref()
    }

    pub fn failure(&self) -> Option<&ExportFailure> {
        self.failure.as_ref()
    }
}

/// Exports single widgets of one batch
pub struct WidgetExportTask<'a> {
    services: &'a ExportServices,
    chain: &'a CaptureChain,
    format: DocumentFormat,
    capture_timeout: Duration,
    remote_timeout: Duration,
}

impl<'a> WidgetExportTask<'a> {
    pub fn new(
        services: &'a ExportServices,
        chain: &'a CaptureChain,
        format: DocumentFormat,
        capture_timeout: Duration,
        remote_timeout: Duration,
    ) -> Self {
        Self {
            services,
            chain,
            format,
            capture_timeout,
            remote_timeout,
        }
    }

    /// Export `widget`, recording exactly one progress step
    pub async fn run(
        &self,
        widget: &Widget,
        position: usize,
        progress: &ProgressTracker,
    ) -> ExportTaskResult {
        let mut ticket = progress.ticket();

        let span = tracing::debug_span!("widget_export", widget_id = %widget.id, position);
        let result = self.execute(widget, position).instrument(span).await;

        if result.is_success() {
            ticket.succeeded();
        }
        result
    }

    async fn execute(&self, widget: &Widget, position: usize) -> ExportTaskResult {
        let Some(display) = self.chain.capture(widget).await else {
            return ExportTaskResult::failed(
                widget,
                position,
                None,
                None,
                ExportFailure::CaptureFailure {
                    widget_id: widget.id.to_string(),
                },
            );
        };

        let detail = self.capture_detail(widget).await;

        match self.generate(widget, &display, detail.as_ref()).await {
            Ok(url) => {
                if let Err(e) = self
                    .services
                    .state
                    .cache_widget_document(&widget.id, &url)
                    .await
                {
                    tracing::warn!(widget_id = %widget.id, error = %e, "Failed to cache widget document");
                }
                tracing::debug!(widget_id = %widget.id, "Widget document generated");
                ExportTaskResult::success(widget, position, display, detail, url)
            }
            Err(e) => {
                let failure = ExportFailure::RemoteGenerationFailure {
                    widget_id: widget.id.to_string(),
                    reason: e.to_string(),
                };
                tracing::warn!(widget_id = %widget.id, title = %widget.title, error = %failure, "Widget export failed");
                ExportTaskResult::failed(widget, position, Some(display), detail, failure)
            }
        }
    }

    /// Best-effort detail chart; failures are logged and dropped
    async fn capture_detail(&self, widget: &Widget) -> Option<AssetRef> {
        let outcome = match tokio::time::timeout(self.capture_timeout, self.upload_detail(widget)).await
        {
            Ok(outcome) => outcome,
            Err(_) => Err(FolioError::timeout("detail chart", self.capture_timeout)),
        };

        match outcome {
            Ok(asset) => asset,
            Err(e) => {
                let failure = ExportFailure::AuxiliaryChartFailure {
                    widget_id: widget.id.to_string(),
                    reason: e.to_string(),
                };
                tracing::warn!(widget_id = %widget.id, error = %failure, "Continuing without detail chart");
                None
            }
        }
    }

    async fn upload_detail(&self, widget: &Widget) -> Result<Option<AssetRef>> {
        let Some(image) = self.services.renderer.render_detail_chart(widget).await? else {
            return Ok(None);
        };
        let asset = self
            .services
            .assets
            .upload(image.bytes, AssetKind::detail(image.format))
            .await?;
        Ok(Some(asset))
    }

    async fn generate(
        &self,
        widget: &Widget,
        display: &AssetRef,
        detail: Option<&AssetRef>,
    ) -> Result<String> {
        let call = self.services.generator.generate_widget_document(
            &widget.id,
            self.format,
            Some(display),
            detail,
        );
        let document = tokio::time::timeout(self.remote_timeout, call)
            .await
            .map_err(|_| FolioError::timeout("generate_widget_document", self.remote_timeout))??;

        if document.url.trim().is_empty() {
            return Err(FolioError::Remote {
                status: 200,
                message: "generator returned an empty document URL".to_string(),
            });
        }
        Ok(document.url)
    }
}
