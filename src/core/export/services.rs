//! Collaborators shared by every stage of an export job

use crate::adapters::http::{HttpExportService, HttpWidgetRenderer, ServiceClient};
use crate::adapters::state::FileStateStore;
use crate::adapters::traits::{
    DashboardDataProvider, RemoteAssetStore, RemoteDocumentGenerator, SessionValidity,
    WidgetRenderer,
};
use crate::config::FolioConfig;
use crate::core::state::StateManager;
use crate::domain::Result;
use std::sync::Arc;

/// Handles to every external collaborator of the pipeline
#[derive(Clone)]
pub struct ExportServices {
    pub provider: Arc<dyn DashboardDataProvider>,
    pub session: Arc<dyn SessionValidity>,
    pub assets: Arc<dyn RemoteAssetStore>,
    pub generator: Arc<dyn RemoteDocumentGenerator>,
    pub renderer: Arc<dyn WidgetRenderer>,
    pub state: StateManager,
}

impl ExportServices {
    /// HTTP collaborators and the file state store described by `config`
    ///
    /// # Errors
    ///
    /// Returns a configuration error if a service client cannot be built.
    pub fn from_config(config: &FolioConfig) -> Result<Self> {
        let export_service = Arc::new(HttpExportService::new(ServiceClient::for_service(
            &config.service,
        )?));
        let renderer = Arc::new(HttpWidgetRenderer::new(ServiceClient::for_renderer(
            &config.renderer,
            &config.service,
        )?));
        let state = StateManager::new_with_storage(Arc::new(FileStateStore::new(&config.state.path)));

        tracing::debug!(
            service = %config.service.base_url,
            renderer = %config.renderer.base_url,
            state_path = %config.state.path,
            "Export services configured"
        );

        Ok(Self {
            provider: export_service.clone(),
            session: export_service.clone(),
            assets: export_service.clone(),
            generator: export_service,
            renderer,
            state,
        })
    }
}
