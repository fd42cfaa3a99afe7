//! Capture strategies, in chain order

use super::profile::CaptureProfile;
use super::svg::normalize_svg;
use super::{placeholder, synthetic};
use crate::adapters::traits::{ChartSurface, RenderedImage, WidgetRenderer};
use crate::domain::{FolioError, ImageFormat, Result, Widget};
use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use std::sync::Arc;

/// One way of turning a widget into an image
#[async_trait]
pub trait CaptureStrategy: Send + Sync {
    /// Stable name for logs
    fn name(&self) -> &'static str;

    /// Whether the strategy is attempted for this profile
    fn applies_to(&self, profile: CaptureProfile) -> bool;

    async fn capture(&self, widget: &Widget) -> Result<RenderedImage>;
}

/// Snapshot of the widget's rendered container
pub struct ContainerSnapshot {
    renderer: Arc<dyn WidgetRenderer>,
}

impl ContainerSnapshot {
    pub fn new(renderer: Arc<dyn WidgetRenderer>) -> Self {
        Self { renderer }
    }
}

#[async_trait]
impl CaptureStrategy for ContainerSnapshot {
    fn name(&self) -> &'static str {
        "container_snapshot"
    }

    fn applies_to(&self, _profile: CaptureProfile) -> bool {
        true
    }

    async fn capture(&self, widget: &Widget) -> Result<RenderedImage> {
        self.renderer.snapshot_container(widget).await
    }
}

/// Snapshot of the enclosing card, for maps
pub struct CardSnapshot {
    renderer: Arc<dyn WidgetRenderer>,
}

impl CardSnapshot {
    pub fn new(renderer: Arc<dyn WidgetRenderer>) -> Self {
        Self { renderer }
    }
}

#[async_trait]
impl CaptureStrategy for CardSnapshot {
    fn name(&self) -> &'static str {
        "card_snapshot"
    }

    fn applies_to(&self, profile: CaptureProfile) -> bool {
        profile.uses_card()
    }

    async fn capture(&self, widget: &Widget) -> Result<RenderedImage> {
        self.renderer.snapshot_card(widget).await
    }
}

/// Direct conversion of the chart's canvas or SVG surface
pub struct SurfaceRaster {
    renderer: Arc<dyn WidgetRenderer>,
}

impl SurfaceRaster {
    pub fn new(renderer: Arc<dyn WidgetRenderer>) -> Self {
        Self { renderer }
    }
}

#[async_trait]
impl CaptureStrategy for SurfaceRaster {
    fn name(&self) -> &'static str {
        "surface_raster"
    }

    fn applies_to(&self, profile: CaptureProfile) -> bool {
        profile.has_surface()
    }

    async fn capture(&self, widget: &Widget) -> Result<RenderedImage> {
        match self.renderer.chart_surface(widget).await? {
            Some(ChartSurface::Canvas { data_url }) => decode_data_url(&data_url),
            Some(ChartSurface::Svg { markup }) => {
                normalize_svg(&markup, widget.background()).map(RenderedImage::svg)
            }
            None => Err(FolioError::Render(format!(
                "Widget {} exposes no chart surface",
                widget.id
            ))),
        }
    }
}

/// Decode a `data:image/...;base64,` URL
pub fn decode_data_url(data_url: &str) -> Result<RenderedImage> {
    let rest = data_url
        .strip_prefix("data:")
        .ok_or_else(|| FolioError::Render("Not a data URL".to_string()))?;
    let (meta, payload) = rest
        .split_once(',')
        .ok_or_else(|| FolioError::Render("Data URL has no payload".to_string()))?;

    let mime = meta
        .strip_suffix(";base64")
        .ok_or_else(|| FolioError::Render("Data URL is not base64-encoded".to_string()))?;
    let format = match mime {
        "image/png" => ImageFormat::Png,
        "image/svg+xml" => ImageFormat::Svg,
        other => {
            return Err(FolioError::Render(format!(
                "Unsupported surface image type: {other}"
            )))
        }
    };

    let bytes = STANDARD
        .decode(payload.trim())
        .map_err(|e| FolioError::Render(format!("Invalid base64 surface data: {e}")))?;
    if bytes.is_empty() {
        return Err(FolioError::Render("Surface is blank".to_string()));
    }

    Ok(RenderedImage { bytes, format })
}

/// Image rebuilt from the widget's data
pub struct SyntheticRender {
    renderer: Arc<dyn WidgetRenderer>,
}

impl SyntheticRender {
    pub fn new(renderer: Arc<dyn WidgetRenderer>) -> Self {
        Self { renderer }
    }
}

#[async_trait]
impl CaptureStrategy for SyntheticRender {
    fn name(&self) -> &'static str {
        "synthetic_render"
    }

    fn applies_to(&self, profile: CaptureProfile) -> bool {
        profile.synthesizes()
    }

    async fn capture(&self, widget: &Widget) -> Result<RenderedImage> {
        match synthetic::render(widget) {
            Some(svg) => Ok(RenderedImage::svg(svg)),
            None => {
                tracing::debug!(widget_id = %widget.id, "No synthetic layout fits, rendering offscreen");
                self.renderer.render_offscreen(widget).await
            }
        }
    }
}

/// Title and notice; always produces an image
pub struct Placeholder;

#[async_trait]
impl CaptureStrategy for Placeholder {
    fn name(&self) -> &'static str {
        "placeholder"
    }

    fn applies_to(&self, _profile: CaptureProfile) -> bool {
        true
    }

    async fn capture(&self, widget: &Widget) -> Result<RenderedImage> {
        Ok(placeholder::render(widget))
    }
}

/// The standard chain: container, card, surface, synthetic, placeholder
pub fn standard_strategies(renderer: Arc<dyn WidgetRenderer>) -> Vec<Box<dyn CaptureStrategy>> {
    vec![
        Box::new(ContainerSnapshot::new(renderer.clone())),
        Box::new(CardSnapshot::new(renderer.clone())),
        Box::new(SurfaceRaster::new(renderer.clone())),
        Box::new(SyntheticRender::new(renderer)),
        Box::new(Placeholder),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_png_data_url() {
        let url = format!("data:image/png;base64,{}", STANDARD.encode([0x89, b'P', b'N', b'G']));
        let image = decode_data_url(&url).unwrap();
        assert_eq!(image.format, ImageFormat::Png);
        assert_eq!(image.bytes, vec![0x89, b'P', b'N', b'G']);
    }

    #[test]
    fn test_decode_rejects_blank_canvas() {
        assert!(decode_data_url("data:,").is_err());
        assert!(decode_data_url("data:image/png;base64,").is_err());
    }

    #[test]
    fn test_decode_rejects_other_types() {
        assert!(decode_data_url("data:image/jpeg;base64,AAAA").is_err());
        assert!(decode_data_url("https://example.org/x.png").is_err());
    }

    #[test]
    fn test_standard_order() {
        struct NoRenderer;

        #[async_trait]
        impl WidgetRenderer for NoRenderer {
            async fn snapshot_container(&self, _: &Widget) -> Result<RenderedImage> {
                Err(FolioError::Render("none".into()))
            }
            async fn snapshot_card(&self, _: &Widget) -> Result<RenderedImage> {
                Err(FolioError::Render("none".into()))
            }
            async fn chart_surface(&self, _: &Widget) -> Result<Option<ChartSurface>> {
                Ok(None)
            }
            async fn render_offscreen(&self, _: &Widget) -> Result<RenderedImage> {
                Err(FolioError::Render("none".into()))
            }
            async fn render_detail_chart(&self, _: &Widget) -> Result<Option<RenderedImage>> {
                Ok(None)
            }
        }

        let names: Vec<_> = standard_strategies(Arc::new(NoRenderer))
            .iter()
            .map(|s| s.name())
            .collect();
        assert_eq!(
            names,
            vec![
                "container_snapshot",
                "card_snapshot",
                "surface_raster",
                "synthetic_render",
                "placeholder"
            ]
        );
    }
}
