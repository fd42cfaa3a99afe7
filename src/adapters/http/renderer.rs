//! Render service adapter
//!
//! The render service owns widget pixels. Every call posts the widget itself
//! so the service can locate (or re-create) its visual.

use super::client::{RawBody, ServiceClient};
use crate::adapters::traits::{ChartSurface, RenderedImage, WidgetRenderer};
use crate::domain::{FolioError, ImageFormat, Result, Widget};
use async_trait::async_trait;
use serde::Serialize;

/// HTTP client for the render service
#[derive(Debug, Clone)]
pub struct HttpWidgetRenderer {
    client: ServiceClient,
}

impl HttpWidgetRenderer {
    pub fn new(client: ServiceClient) -> Self {
        Self { client }
    }

    async fn snapshot(&self, widget: &Widget, target: SnapshotTarget) -> Result<RenderedImage> {
        let body = self
            .client
            .post_for_body(
                &["widgets", widget.id.as_str(), "snapshot"],
                &SnapshotRequest { target, widget },
                "snapshot",
            )
            .await?;

        match body {
            Some(raw) if !raw.bytes.is_empty() => Ok(into_image(raw)),
            _ => Err(FolioError::Render(format!(
                "Empty {} snapshot for widget {}",
                target.as_str(),
                widget.id
            ))),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize)]
#[serde(rename_all = "lowercase")]
enum SnapshotTarget {
    Container,
    Card,
}

impl SnapshotTarget {
    fn as_str(self) -> &'static str {
        match self {
            SnapshotTarget::Container => "container",
            SnapshotTarget::Card => "card",
        }
    }
}

#[derive(Serialize)]
struct SnapshotRequest<'a> {
    target: SnapshotTarget,
    widget: &'a Widget,
}

#[derive(Serialize)]
struct WidgetRequest<'a> {
    widget: &'a Widget,
}

fn into_image(raw: RawBody) -> RenderedImage {
    let format = if raw.content_type.contains("svg") {
        ImageFormat::Svg
    } else {
        ImageFormat::Png
    };
    RenderedImage {
        bytes: raw.bytes,
        format,
    }
}

#[async_trait]
impl WidgetRenderer for HttpWidgetRenderer {
    async fn snapshot_container(&self, widget: &Widget) -> Result<RenderedImage> {
        self.snapshot(widget, SnapshotTarget::Container).await
    }

    async fn snapshot_card(&self, widget: &Widget) -> Result<RenderedImage> {
        self.snapshot(widget, SnapshotTarget::Card).await
    }

    async fn chart_surface(&self, widget: &Widget) -> Result<Option<ChartSurface>> {
        let body = self
            .client
            .post_for_body(
                &["widgets", widget.id.as_str(), "surface"],
                &WidgetRequest { widget },
                "chart_surface",
            )
            .await?;

        match body {
            Some(raw) if !raw.bytes.is_empty() => Ok(Some(serde_json::from_slice(&raw.bytes)?)),
            _ => Ok(None),
        }
    }

    async fn render_offscreen(&self, widget: &Widget) -> Result<RenderedImage> {
        let body = self
            .client
            .post_for_body(
                &["widgets", widget.id.as_str(), "offscreen"],
                &WidgetRequest { widget },
                "render_offscreen",
            )
            .await?;

        match body {
            Some(raw) if !raw.bytes.is_empty() => Ok(into_image(raw)),
            _ => Err(FolioError::Render(format!(
                "Offscreen render produced nothing for widget {}",
                widget.id
            ))),
        }
    }

    async fn render_detail_chart(&self, widget: &Widget) -> Result<Option<RenderedImage>> {
        let body = self
            .client
            .post_for_body(
                &["widgets", widget.id.as_str(), "detail"],
                &WidgetRequest { widget },
                "render_detail_chart",
            )
            .await?;

        Ok(body.filter(|raw| !raw.bytes.is_empty()).map(into_image))
    }
}
