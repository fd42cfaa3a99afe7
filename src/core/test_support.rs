//! Scriptable in-memory collaborators for pipeline tests

use crate::adapters::state::MemoryStateStore;
use crate::adapters::traits::{
    ChartSurface, DashboardDataProvider, GeneratedDocument, RemoteAssetStore,
    RemoteDocumentGenerator, RenderedImage, SessionValidity, StateStore, WidgetRenderer,
};
use crate::core::export::ExportServices;
use crate::core::state::StateManager;
use crate::domain::{
    AssetKind, AssetRef, ChartKind, DashboardId, Dataset, DocumentFormat, FolioError,
    PartitionId, Result, Widget, WidgetId, ALL_PARTITIONS_LABEL,
};
use async_trait::async_trait;
use serde_json::Value;
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Scripted outcome of a fake call
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    Succeed,
    Fail,
    Hang,
}

impl Step {
    pub async fn run<T>(self, value: T) -> Result<T> {
        match self {
            Step::Succeed => Ok(value),
            Step::Fail => Err(FolioError::Render("scripted failure".to_string())),
            Step::Hang => std::future::pending::<Result<T>>().await,
        }
    }
}

/// Dataset of bar charts for dashboard "District"
pub fn dataset(partition: Option<&str>, widgets: &[(&str, &str)]) -> Dataset {
    Dataset {
        dashboard_id: DashboardId::new("d-1").unwrap(),
        dashboard_name: "District".to_string(),
        partition: partition.map(|p| PartitionId::new(p).unwrap()),
        widgets: widgets
            .iter()
            .map(|(id, title)| Widget::new(WidgetId::new(*id).unwrap(), *title, ChartKind::Bar))
            .collect(),
    }
}

/// Renderer whose snapshots fail unless scripted otherwise
///
/// Images carry the widget title so asset-store rejections can target a
/// widget.
pub struct FakeRenderer {
    container: Step,
    card: Step,
    offscreen: Step,
    detail: Option<Step>,
    calls: Mutex<HashMap<&'static str, usize>>,
}

impl FakeRenderer {
    pub fn new() -> Self {
        Self {
            container: Step::Fail,
            card: Step::Fail,
            offscreen: Step::Fail,
            detail: None,
            calls: Mutex::new(HashMap::new()),
        }
    }

    pub fn with_container(mut self, step: Step) -> Self {
        self.container = step;
        self
    }

    pub fn with_card(mut self, step: Step) -> Self {
        self.card = step;
        self
    }

    pub fn with_offscreen(mut self, step: Step) -> Self {
        self.offscreen = step;
        self
    }

    pub fn with_detail(mut self, step: Step) -> Self {
        self.detail = Some(step);
        self
    }

    pub fn calls(&self, operation: &str) -> usize {
        self.calls.lock().unwrap().get(operation).copied().unwrap_or(0)
    }

    fn record(&self, operation: &'static str) {
        *self.calls.lock().unwrap().entry(operation).or_insert(0) += 1;
    }

    fn image(widget: &Widget, source: &str) -> RenderedImage {
        RenderedImage::png(format!("{source}:{}", widget.title).into_bytes())
    }
}

#[async_trait]
impl WidgetRenderer for FakeRenderer {
    async fn snapshot_container(&self, widget: &Widget) -> Result<RenderedImage> {
        self.record("snapshot_container");
        self.container.run(Self::image(widget, "container")).await
    }

    async fn snapshot_card(&self, widget: &Widget) -> Result<RenderedImage> {
        self.record("snapshot_card");
        self.card.run(Self::image(widget, "card")).await
    }

    async fn chart_surface(&self, _widget: &Widget) -> Result<Option<ChartSurface>> {
        self.record("chart_surface");
        Ok(None)
    }

    async fn render_offscreen(&self, widget: &Widget) -> Result<RenderedImage> {
        self.record("render_offscreen");
        self.offscreen.run(Self::image(widget, "offscreen")).await
    }

    async fn render_detail_chart(&self, widget: &Widget) -> Result<Option<RenderedImage>> {
        self.record("render_detail_chart");
        match self.detail {
            None => Ok(None),
            Some(step) => step.run(Some(Self::image(widget, "detail"))).await,
        }
    }
}

#[derive(Default)]
struct AssetState {
    uploads: Vec<(Vec<u8>, AssetKind)>,
    fail_remaining: usize,
    always_fail: bool,
    reject_markers: Vec<String>,
}

/// Asset store returning `asset-{n}` handles
#[derive(Default)]
pub struct FakeAssetStore {
    state: Mutex<AssetState>,
}

impl FakeAssetStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fail the first `n` uploads
    pub fn failing_first(self, n: usize) -> Self {
        self.state.lock().unwrap().fail_remaining = n;
        self
    }

    pub fn always_failing(self) -> Self {
        self.fail_always();
        self
    }

    pub fn fail_always(&self) {
        self.state.lock().unwrap().always_fail = true;
    }

    /// Reject uploads whose bytes contain `marker`
    pub fn reject_containing(&self, marker: &str) {
        self.state.lock().unwrap().reject_markers.push(marker.to_string());
    }

    pub fn uploads(&self) -> usize {
        self.state.lock().unwrap().uploads.len()
    }

    pub fn uploaded_bytes(&self) -> Vec<Vec<u8>> {
        self.state
            .lock()
            .unwrap()
            .uploads
            .iter()
            .map(|(bytes, _)| bytes.clone())
            .collect()
    }

    pub fn uploaded_kinds(&self) -> Vec<AssetKind> {
        self.state
            .lock()
            .unwrap()
            .uploads
            .iter()
            .map(|(_, kind)| *kind)
            .collect()
    }
}

#[async_trait]
impl RemoteAssetStore for FakeAssetStore {
    async fn upload(&self, bytes: Vec<u8>, kind: AssetKind) -> Result<AssetRef> {
        let mut state = self.state.lock().unwrap();
        if state.always_fail {
            return Err(FolioError::Storage("asset store unavailable".to_string()));
        }
        if state.fail_remaining > 0 {
            state.fail_remaining -= 1;
            return Err(FolioError::Storage("upload rejected".to_string()));
        }
        let text = String::from_utf8_lossy(&bytes);
        if state.reject_markers.iter().any(|m| text.contains(m.as_str())) {
            return Err(FolioError::Storage("upload rejected".to_string()));
        }
        state.uploads.push((bytes, kind));
        Ok(AssetRef::new(format!("asset-{}", state.uploads.len())).unwrap())
    }
}

#[derive(Default)]
struct GeneratorState {
    fail_merge: bool,
    fail_full: bool,
    hang_merge: bool,
    failing_widgets: HashSet<String>,
    empty_widgets: HashSet<String>,
    hanging_widgets: HashSet<String>,
    delays: HashMap<String, Duration>,
    merge_calls: Vec<(Vec<String>, String)>,
    full_calls: Vec<Vec<AssetRef>>,
    widget_calls: usize,
    in_flight: usize,
    max_in_flight: usize,
    last_detail: Option<AssetRef>,
}

/// Document generator with per-widget scripting
///
/// Widget documents are `https://docs/{id}.pdf`, merges
/// `https://docs/merged/{name}.pdf`, full exports
/// `https://docs/full/{dashboard}.{format}`.
#[derive(Default)]
pub struct FakeGenerator {
    state: Mutex<GeneratorState>,
}

impl FakeGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fail_merge(&self) {
        self.state.lock().unwrap().fail_merge = true;
    }

    pub fn fail_full(&self) {
        self.state.lock().unwrap().fail_full = true;
    }

    pub fn hang_merge(&self) {
        self.state.lock().unwrap().hang_merge = true;
    }

    pub fn fail_widget(&self, id: &str) {
        self.state.lock().unwrap().failing_widgets.insert(id.to_string());
    }

    pub fn empty_url_for(&self, id: &str) {
        self.state.lock().unwrap().empty_widgets.insert(id.to_string());
    }

    pub fn hang_widget(&self, id: &str) {
        self.state.lock().unwrap().hanging_widgets.insert(id.to_string());
    }

    pub fn delay_widget(&self, id: &str, delay: Duration) {
        self.state.lock().unwrap().delays.insert(id.to_string(), delay);
    }

    pub fn merge_calls(&self) -> Vec<(Vec<String>, String)> {
        self.state.lock().unwrap().merge_calls.clone()
    }

    pub fn merge_output_names(&self) -> Vec<String> {
        self.merge_calls().into_iter().map(|(_, name)| name).collect()
    }

    pub fn full_calls(&self) -> Vec<Vec<AssetRef>> {
        self.state.lock().unwrap().full_calls.clone()
    }

    pub fn widget_calls(&self) -> usize {
        self.state.lock().unwrap().widget_calls
    }

    pub fn max_in_flight(&self) -> usize {
        self.state.lock().unwrap().max_in_flight
    }

    pub fn last_detail_asset(&self) -> Option<AssetRef> {
        self.state.lock().unwrap().last_detail.clone()
    }
}

#[async_trait]
impl RemoteDocumentGenerator for FakeGenerator {
    async fn generate_widget_document(
        &self,
        widget_id: &WidgetId,
        _format: DocumentFormat,
        _display: Option<&AssetRef>,
        detail: Option<&AssetRef>,
    ) -> Result<GeneratedDocument> {
        let id = widget_id.to_string();
        let (hang, delay) = {
            let mut state = self.state.lock().unwrap();
            state.widget_calls += 1;
            state.in_flight += 1;
            state.max_in_flight = state.max_in_flight.max(state.in_flight);
            (state.hanging_widgets.contains(&id), state.delays.get(&id).copied())
        };

        if hang {
            return std::future::pending().await;
        }
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        let mut state = self.state.lock().unwrap();
        state.in_flight -= 1;
        if state.failing_widgets.contains(&id) {
            return Err(FolioError::Remote {
                status: 500,
                message: "generation failed".to_string(),
            });
        }
        if state.empty_widgets.contains(&id) {
            return Ok(GeneratedDocument { url: String::new() });
        }
        state.last_detail = detail.cloned();
        Ok(GeneratedDocument {
            url: format!("https://docs/{id}.pdf"),
        })
    }

    async fn generate_full_dashboard_document(
        &self,
        dashboard_id: &DashboardId,
        format: DocumentFormat,
        assets: &[AssetRef],
    ) -> Result<GeneratedDocument> {
        let mut state = self.state.lock().unwrap();
        state.full_calls.push(assets.to_vec());
        if state.fail_full {
            return Err(FolioError::Remote {
                status: 502,
                message: "full export unavailable".to_string(),
            });
        }
        Ok(GeneratedDocument {
            url: format!("https://docs/full/{dashboard_id}.{format}"),
        })
    }

    async fn merge_documents(&self, urls: &[String], output_name: &str) -> Result<GeneratedDocument> {
        let hang = {
            let mut state = self.state.lock().unwrap();
            state.merge_calls.push((urls.to_vec(), output_name.to_string()));
            if state.fail_merge {
                return Err(FolioError::Remote {
                    status: 503,
                    message: "merge unavailable".to_string(),
                });
            }
            state.hang_merge
        };

        if hang {
            return std::future::pending().await;
        }
        Ok(GeneratedDocument {
            url: format!("https://docs/merged/{output_name}.pdf"),
        })
    }
}

/// Memory store whose writes can be made to fail
#[derive(Default)]
pub struct FakeStateStore {
    inner: MemoryStateStore,
    fail_writes: AtomicBool,
}

impl FakeStateStore {
    pub fn fail_writes(&self) {
        self.fail_writes.store(true, Ordering::SeqCst);
    }
}

#[async_trait]
impl StateStore for FakeStateStore {
    async fn get(&self, key: &str) -> Result<Option<Value>> {
        self.inner.get(key).await
    }

    async fn put(&self, key: &str, value: Value) -> Result<()> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(FolioError::State("disk full".to_string()));
        }
        self.inner.put(key, value).await
    }

    async fn remove(&self, key: &str) -> Result<Option<Value>> {
        self.inner.remove(key).await
    }

    async fn keys_with_prefix(&self, prefix: &str) -> Result<Vec<String>> {
        self.inner.keys_with_prefix(prefix).await
    }
}

/// Provider serving two bar charts per request
///
/// Requests are recorded by partition label, `All` when unfiltered.
#[derive(Default)]
pub struct FakeProvider {
    requests: Mutex<Vec<String>>,
    failing: Mutex<HashSet<String>>,
}

impl FakeProvider {
    pub fn fail_partition(&self, label: &str) {
        self.failing.lock().unwrap().insert(label.to_string());
    }

    pub fn requests(&self) -> Vec<String> {
        self.requests.lock().unwrap().clone()
    }

    pub fn calls(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    fn serve(&self, id: &DashboardId, partition: Option<&str>) -> Result<Dataset> {
        let label = partition.unwrap_or(ALL_PARTITIONS_LABEL).to_string();
        self.requests.lock().unwrap().push(label.clone());
        if self.failing.lock().unwrap().contains(&label) {
            return Err(FolioError::Connection(format!("no data for {label}")));
        }
        let mut data = dataset(partition, &[("w-1", "Enrollment"), ("w-2", "Attendance")]);
        data.dashboard_id = id.clone();
        Ok(data)
    }
}

#[async_trait]
impl DashboardDataProvider for FakeProvider {
    async fn get_dashboard(&self, id: &DashboardId) -> Result<Dataset> {
        self.serve(id, None)
    }

    async fn get_dashboard_filtered_by_partition(
        &self,
        id: &DashboardId,
        partitions: &[PartitionId],
    ) -> Result<Dataset> {
        let label = partitions
            .iter()
            .map(PartitionId::as_str)
            .collect::<Vec<_>>()
            .join(",");
        self.serve(id, Some(&label))
    }
}

/// Session with an adjustable remaining time, one hour by default
pub struct FakeSession {
    remaining_ms: AtomicU64,
    calls: AtomicUsize,
}

impl Default for FakeSession {
    fn default() -> Self {
        Self {
            remaining_ms: AtomicU64::new(60 * 60 * 1000),
            calls: AtomicUsize::new(0),
        }
    }
}

impl FakeSession {
    pub fn set_remaining_minutes(&self, minutes: u64) {
        self.remaining_ms.store(minutes * 60 * 1000, Ordering::SeqCst);
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl SessionValidity for FakeSession {
    async fn remaining_ms(&self) -> Result<u64> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.remaining_ms.load(Ordering::SeqCst))
    }
}

/// Every collaborator of the pipeline, faked
pub struct Fakes {
    pub provider: Arc<FakeProvider>,
    pub session: Arc<FakeSession>,
    pub assets: Arc<FakeAssetStore>,
    pub generator: Arc<FakeGenerator>,
    pub renderer: Arc<FakeRenderer>,
    pub state_store: Arc<FakeStateStore>,
    pub state: StateManager,
}

impl Fakes {
    pub fn new() -> Self {
        Self::with_renderer(FakeRenderer::new())
    }

    pub fn with_renderer(renderer: FakeRenderer) -> Self {
        let state_store = Arc::new(FakeStateStore::default());
        Self {
            provider: Arc::new(FakeProvider::default()),
            session: Arc::new(FakeSession::default()),
            assets: Arc::new(FakeAssetStore::new()),
            generator: Arc::new(FakeGenerator::new()),
            renderer: Arc::new(renderer),
            state: StateManager::new_with_storage(state_store.clone()),
            state_store,
        }
    }

    pub fn services(&self) -> ExportServices {
        ExportServices {
            provider: self.provider.clone(),
            session: self.session.clone(),
            assets: self.assets.clone(),
            generator: self.generator.clone(),
            renderer: self.renderer.clone(),
            state: self.state.clone(),
        }
    }
}
