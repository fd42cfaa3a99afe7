//! Capture strategy chain
//!
//! Tries the applicable strategies in order, each capture + upload pair under
//! its own timeout, and stops at the first success.

use super::profile::CaptureProfile;
use super::strategies::{standard_strategies, CaptureStrategy};
use crate::adapters::traits::{RemoteAssetStore, WidgetRenderer};
use crate::domain::{AssetKind, AssetRef, FolioError, Result, Widget, WidgetId};
use crate::log_strategy_fallback;
use std::future::Future;
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Run `attempt` on each strategy until one succeeds
///
/// Every attempt is bounded by `limit`; an elapsed timeout counts as a
/// failure. Returns `None` when all attempts fail.
pub async fn first_success<'a, S, T, F, Fut>(
    strategies: impl IntoIterator<Item = &'a S>,
    limit: Duration,
    widget_id: &WidgetId,
    mut attempt: F,
) -> Option<T>
where
    S: CaptureStrategy + ?Sized + 'a,
    F: FnMut(&'a S) -> Fut,
    Fut: Future<Output = Result<T>>,
{
    for strategy in strategies {
        let started = Instant::now();
        let outcome = match tokio::time::timeout(limit, attempt(strategy)).await {
            Ok(outcome) => outcome,
            Err(_) => Err(FolioError::timeout(strategy.name(), limit)),
        };

        match outcome {
            Ok(value) => {
                tracing::debug!(
                    widget_id = %widget_id,
                    strategy = strategy.name(),
                    elapsed_ms = started.elapsed().as_millis() as u64,
                    "Widget captured"
                );
                return Some(value);
            }
            Err(e) => {
                log_strategy_fallback!(widget_id, strategy.name(), e);
            }
        }
    }

    None
}

/// Ordered fallback chain producing a stored display image
pub struct CaptureChain {
    strategies: Vec<Box<dyn CaptureStrategy>>,
    assets: Arc<dyn RemoteAssetStore>,
    timeout: Duration,
}

impl CaptureChain {
    pub fn new(
        strategies: Vec<Box<dyn CaptureStrategy>>,
        assets: Arc<dyn RemoteAssetStore>,
        timeout: Duration,
    ) -> Self {
        Self {
            strategies,
            assets,
            timeout,
        }
    }

    /// Chain with the standard strategies
    pub fn standard(
        renderer: Arc<dyn WidgetRenderer>,
        assets: Arc<dyn RemoteAssetStore>,
        timeout: Duration,
    ) -> Self {
        Self::new(standard_strategies(renderer), assets, timeout)
    }

    /// Capture and upload the display image of `widget`
    ///
    /// Never fails: `None` means every strategy, the placeholder included,
    /// failed, which in practice means the asset store is unreachable.
    pub async fn capture(&self, widget: &Widget) -> Option<AssetRef> {
        let profile = CaptureProfile::from(widget.kind);
        let applicable = self
            .strategies
            .iter()
            .map(|s| &**s)
            .filter(|s| s.applies_to(profile));

        let asset = first_success(applicable, self.timeout, &widget.id, |strategy| async move {
            let image = strategy.capture(widget).await?;
            self.assets
                .upload(image.bytes, AssetKind::display(image.format))
                .await
        })
        .await;

        if asset.is_none() {
            tracing::error!(
                widget_id = %widget.id,
                kind = ?widget.kind,
                "Every capture strategy failed"
            );
        }

        asset
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::traits::RenderedImage;
    use crate::core::test_support::{FakeAssetStore, FakeRenderer, Step};
    use crate::domain::{ChartKind, DataPoint, ImageFormat, Series};
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    const LIMIT: Duration = Duration::from_secs(10);

    struct Scripted {
        name: &'static str,
        step: Step,
        calls: Arc<AtomicUsize>,
    }

    impl Scripted {
        fn boxed(name: &'static str, step: Step, calls: &Arc<AtomicUsize>) -> Box<dyn CaptureStrategy> {
            Box::new(Self {
                name,
                step,
                calls: calls.clone(),
            })
        }
    }

    #[async_trait]
    impl CaptureStrategy for Scripted {
        fn name(&self) -> &'static str {
            self.name
        }

        fn applies_to(&self, _profile: CaptureProfile) -> bool {
            true
        }

        async fn capture(&self, _widget: &Widget) -> Result<RenderedImage> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.step.run(RenderedImage::png(self.name.as_bytes().to_vec())).await
        }
    }

    fn widget(kind: ChartKind) -> Widget {
        Widget::new(WidgetId::new("w-1").unwrap(), "Attendance", kind)
    }

    #[tokio::test]
    async fn test_first_success_short_circuits() {
        let first = Arc::new(AtomicUsize::new(0));
        let second = Arc::new(AtomicUsize::new(0));
        let assets = Arc::new(FakeAssetStore::new());
        let chain = CaptureChain::new(
            vec![
                Scripted::boxed("one", Step::Succeed, &first),
                Scripted::boxed("two", Step::Succeed, &second),
            ],
            assets.clone(),
            LIMIT,
        );

        let asset = chain.capture(&widget(ChartKind::Bar)).await;

        assert!(asset.is_some());
        assert_eq!(first.load(Ordering::SeqCst), 1);
        assert_eq!(second.load(Ordering::SeqCst), 0);
        assert_eq!(assets.uploads(), 1);
    }

    #[tokio::test]
    async fn test_failure_advances_to_next() {
        let first = Arc::new(AtomicUsize::new(0));
        let second = Arc::new(AtomicUsize::new(0));
        let assets = Arc::new(FakeAssetStore::new());
        let chain = CaptureChain::new(
            vec![
                Scripted::boxed("one", Step::Fail, &first),
                Scripted::boxed("two", Step::Succeed, &second),
            ],
            assets.clone(),
            LIMIT,
        );

        assert!(chain.capture(&widget(ChartKind::Bar)).await.is_some());
        assert_eq!(first.load(Ordering::SeqCst), 1);
        assert_eq!(second.load(Ordering::SeqCst), 1);
        assert_eq!(assets.uploaded_bytes(), vec![b"two".to_vec()]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_timeout_advances_to_next() {
        let first = Arc::new(AtomicUsize::new(0));
        let second = Arc::new(AtomicUsize::new(0));
        let chain = CaptureChain::new(
            vec![
                Scripted::boxed("slow", Step::Hang, &first),
                Scripted::boxed("fast", Step::Succeed, &second),
            ],
            Arc::new(FakeAssetStore::new()),
            LIMIT,
        );

        let started = tokio::time::Instant::now();
        assert!(chain.capture(&widget(ChartKind::Bar)).await.is_some());
        assert_eq!(second.load(Ordering::SeqCst), 1);
        assert!(started.elapsed() >= LIMIT);
    }

    #[tokio::test]
    async fn test_upload_failure_advances_chain() {
        let first = Arc::new(AtomicUsize::new(0));
        let second = Arc::new(AtomicUsize::new(0));
        let assets = Arc::new(FakeAssetStore::new().failing_first(1));
        let chain = CaptureChain::new(
            vec![
                Scripted::boxed("one", Step::Succeed, &first),
                Scripted::boxed("two", Step::Succeed, &second),
            ],
            assets.clone(),
            LIMIT,
        );

        assert!(chain.capture(&widget(ChartKind::Bar)).await.is_some());
        assert_eq!(second.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_storage_outage_yields_none() {
        let renderer = Arc::new(FakeRenderer::new());
        let assets = Arc::new(FakeAssetStore::new().always_failing());
        let chain = CaptureChain::standard(renderer, assets, LIMIT);

        assert!(chain.capture(&widget(ChartKind::Bar)).await.is_none());
    }

    #[tokio::test]
    async fn test_container_snapshot_wins_for_charts() {
        let renderer = Arc::new(FakeRenderer::new().with_container(Step::Succeed));
        let assets = Arc::new(FakeAssetStore::new());
        let chain = CaptureChain::standard(renderer.clone(), assets.clone(), LIMIT);

        assert!(chain.capture(&widget(ChartKind::Line)).await.is_some());
        assert_eq!(renderer.calls("snapshot_container"), 1);
        assert_eq!(renderer.calls("chart_surface"), 0);
        assert_eq!(assets.uploads(), 1);
    }

    #[tokio::test]
    async fn test_card_snapshot_only_for_maps() {
        let renderer = Arc::new(FakeRenderer::new().with_card(Step::Succeed));
        let chain = CaptureChain::standard(renderer.clone(), Arc::new(FakeAssetStore::new()), LIMIT);

        chain.capture(&widget(ChartKind::Bar)).await;
        assert_eq!(renderer.calls("snapshot_card"), 0);

        chain.capture(&widget(ChartKind::Choropleth)).await;
        assert_eq!(renderer.calls("snapshot_card"), 1);
    }

    #[tokio::test]
    async fn test_metric_falls_to_synthetic_svg() {
        let renderer = Arc::new(FakeRenderer::new());
        let assets = Arc::new(FakeAssetStore::new());
        let chain = CaptureChain::standard(renderer.clone(), assets.clone(), LIMIT);

        let metric = widget(ChartKind::Metric)
            .with_series(vec![Series::new("s", vec![DataPoint::new("Enrolled", 1200.0)])]);
        assert!(chain.capture(&metric).await.is_some());

        assert_eq!(renderer.calls("chart_surface"), 0);
        assert_eq!(renderer.calls("render_offscreen"), 0);
        let kinds = assets.uploaded_kinds();
        assert_eq!(kinds, vec![AssetKind::display(ImageFormat::Svg)]);
        let svg = String::from_utf8(assets.uploaded_bytes().remove(0)).unwrap();
        assert!(svg.contains(">1200<"));
    }

    #[tokio::test]
    async fn test_metric_without_data_renders_offscreen() {
        let renderer = Arc::new(FakeRenderer::new().with_offscreen(Step::Succeed));
        let chain = CaptureChain::standard(renderer.clone(), Arc::new(FakeAssetStore::new()), LIMIT);

        assert!(chain.capture(&widget(ChartKind::Card)).await.is_some());
        assert_eq!(renderer.calls("render_offscreen"), 1);
    }

    #[tokio::test]
    async fn test_everything_failing_uploads_placeholder() {
        let renderer = Arc::new(FakeRenderer::new());
        let assets = Arc::new(FakeAssetStore::new());
        let chain = CaptureChain::standard(renderer, assets.clone(), LIMIT);

        assert!(chain.capture(&widget(ChartKind::Table)).await.is_some());
        let svg = String::from_utf8(assets.uploaded_bytes().remove(0)).unwrap();
        assert!(svg.contains("No chart image available"));
    }
}
