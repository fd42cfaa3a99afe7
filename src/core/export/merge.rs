//! Merging a batch's widget documents into one deliverable
//!
//! The remote merge is tried first. If it fails, the whole dashboard is
//! regenerated once from the widget assets gathered during the batch.

use crate::adapters::traits::{GeneratedDocument, RemoteDocumentGenerator};
use crate::domain::{AssetRef, DashboardId, DocumentFormat, ExportFailure, FolioError, Result};
use std::future::Future;
use std::time::Duration;

/// Fallback name when sanitizing leaves nothing
const DEFAULT_DOCUMENT_NAME: &str = "dashboard";

/// Inputs of one merge
#[derive(Debug, Clone, Copy)]
pub struct MergeRequest<'a> {
    pub dashboard_id: &'a DashboardId,
    pub format: DocumentFormat,
    /// Widget document URLs, in widget order
    pub urls: &'a [String],
    pub output_name: &'a str,
    /// Display assets for the full-dashboard fallback
    pub assets: &'a [AssetRef],
}

pub struct DocumentMergeService<'a> {
    generator: &'a dyn RemoteDocumentGenerator,
    timeout: Duration,
}

impl<'a> DocumentMergeService<'a> {
    pub fn new(generator: &'a dyn RemoteDocumentGenerator, timeout: Duration) -> Self {
        Self { generator, timeout }
    }

    /// Merge the documents, falling back to one full-dashboard export
    ///
    /// # Errors
    ///
    /// Returns [`ExportFailure::MergeFailure`] carrying the merge error when
    /// both the merge and the fallback fail.
    pub async fn merge(&self, request: MergeRequest<'_>) -> Result<String> {
        let primary = self
            .guarded(
                "merge_documents",
                self.generator.merge_documents(request.urls, request.output_name),
            )
            .await;

        let merge_error = match primary {
            Ok(url) => {
                tracing::info!(
                    output_name = %request.output_name,
                    documents = request.urls.len(),
                    "Documents merged"
                );
                return Ok(url);
            }
            Err(e) => e,
        };

        tracing::warn!(
            output_name = %request.output_name,
            error = %merge_error,
            assets = request.assets.len(),
            "Merge failed, regenerating the full dashboard"
        );

        let fallback = self
            .guarded(
                "generate_full_dashboard_document",
                self.generator.generate_full_dashboard_document(
                    request.dashboard_id,
                    request.format,
                    request.assets,
                ),
            )
            .await;

        match fallback {
            Ok(url) => Ok(url),
            Err(fallback_error) => {
                tracing::error!(
                    output_name = %request.output_name,
                    merge_error = %merge_error,
                    fallback_error = %fallback_error,
                    "Full-dashboard fallback failed"
                );
                Err(ExportFailure::MergeFailure(merge_error.to_string()).into())
            }
        }
    }

    async fn guarded<F>(&self, operation: &str, call: F) -> Result<String>
    where
        F: Future<Output = Result<GeneratedDocument>>,
    {
        let document = tokio::time::timeout(self.timeout, call)
            .await
            .map_err(|_| FolioError::timeout(operation, self.timeout))??;

        if document.url.trim().is_empty() {
            return Err(FolioError::Remote {
                status: 200,
                message: format!("{operation} returned an empty document URL"),
            });
        }
        Ok(document.url)
    }
}

/// Output document name: `"{dashboard} - {partition}"`, made filename-safe
pub fn document_name(dashboard_name: &str, partition_label: &str) -> String {
    sanitize_document_name(&format!("{dashboard_name} - {partition_label}"))
}

/// Make `name` safe to use as a file name
///
/// Path-unsafe and control characters become `_`, whitespace runs collapse
/// to one space, and leading/trailing spaces and dots are trimmed.
pub fn sanitize_document_name(name: &str) -> String {
    let replaced: String = name
        .chars()
        .map(|c| match c {
            '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => '_',
            c if c.is_whitespace() => ' ',
            c if c.is_control() => '_',
            c => c,
        })
        .collect();

    let collapsed = replaced.split_whitespace().collect::<Vec<_>>().join(" ");
    let trimmed = collapsed.trim_matches(|c: char| c == '.' || c == ' ');

    if trimmed.is_empty() {
        DEFAULT_DOCUMENT_NAME.to_string()
    } else {
        trimmed.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::test_support::FakeGenerator;
    use test_case::test_case;

    #[test_case("District - North", "District - North" ; "clean")]
    #[test_case("A/B: C*D?", "A_B_ C_D_" ; "unsafe characters")]
    #[test_case("  Many   spaces\there ", "Many spaces here" ; "whitespace collapse")]
    #[test_case("..hidden name..", "hidden name" ; "dots trimmed")]
    #[test_case("Bell\u{7}", "Bell_" ; "control characters")]
    #[test_case(" . . ", "dashboard" ; "empty becomes default")]
    fn test_sanitize_document_name(input: &str, expected: &str) {
        assert_eq!(sanitize_document_name(input), expected);
    }

    #[test]
    fn test_document_name() {
        assert_eq!(document_name("District <2025>", "All"), "District _2025_ - All");
    }

    fn request<'a>(
        dashboard: &'a DashboardId,
        urls: &'a [String],
        assets: &'a [AssetRef],
    ) -> MergeRequest<'a> {
        MergeRequest {
            dashboard_id: dashboard,
            format: DocumentFormat::Pdf,
            urls,
            output_name: "District - North",
            assets,
        }
    }

    #[tokio::test]
    async fn test_merge_success_skips_fallback() {
        let generator = FakeGenerator::new();
        let service = DocumentMergeService::new(&generator, Duration::from_secs(5));
        let dashboard = DashboardId::new("d-1").unwrap();
        let urls = vec!["u1".to_string(), "u2".to_string()];

        let url = service.merge(request(&dashboard, &urls, &[])).await.unwrap();

        assert_eq!(url, "https://docs/merged/District - North.pdf");
        assert_eq!(generator.merge_calls().len(), 1);
        assert_eq!(generator.merge_calls()[0].0, urls);
        assert!(generator.full_calls().is_empty());
    }

    #[tokio::test]
    async fn test_merge_failure_falls_back_exactly_once() {
        let generator = FakeGenerator::new();
        generator.fail_merge();
        let service = DocumentMergeService::new(&generator, Duration::from_secs(5));
        let dashboard = DashboardId::new("d-1").unwrap();
        let urls = vec!["u1".to_string()];
        let assets = vec![AssetRef::new("a1").unwrap(), AssetRef::new("a2").unwrap()];

        let url = service
            .merge(request(&dashboard, &urls, &assets))
            .await
            .unwrap();

        assert_eq!(url, "https://docs/full/d-1.pdf");
        assert_eq!(generator.full_calls(), vec![assets]);
    }

    #[tokio::test]
    async fn test_both_failing_surfaces_merge_error() {
        let generator = FakeGenerator::new();
        generator.fail_merge();
        generator.fail_full();
        let service = DocumentMergeService::new(&generator, Duration::from_secs(5));
        let dashboard = DashboardId::new("d-1").unwrap();
        let urls = vec!["u1".to_string()];

        let err = service.merge(request(&dashboard, &urls, &[])).await.unwrap_err();

        match err {
            FolioError::Export(ExportFailure::MergeFailure(message)) => {
                assert!(message.contains("merge unavailable"), "{message}");
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert_eq!(generator.full_calls().len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_merge_timeout_triggers_fallback() {
        let generator = FakeGenerator::new();
        generator.hang_merge();
        let service = DocumentMergeService::new(&generator, Duration::from_secs(60));
        let dashboard = DashboardId::new("d-1").unwrap();
        let urls = vec!["u1".to_string()];

        let url = service.merge(request(&dashboard, &urls, &[])).await.unwrap();
        assert_eq!(url, "https://docs/full/d-1.pdf");
    }
}
