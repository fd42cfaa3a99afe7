//! State manager for cached documents and auto-export options
//!
//! Typed access over a [`StateStore`]; the store itself only sees JSON values.

use crate::adapters::traits::StateStore;
use crate::core::state::records::{
    auto_export_key, widget_document_key, AutoExportOptions, CachedDocument, AUTO_EXPORT_PREFIX,
    WIDGET_DOCUMENT_PREFIX,
};
use crate::domain::ids::{DashboardId, WidgetId};
use crate::domain::{FolioError, Result};
use serde::de::DeserializeOwned;
use std::sync::Arc;

/// State manager
///
/// Shared by the export tasks (document cache writes) and the CLI
/// (`schedule`, `status`, `export --auto`).
#[derive(Clone)]
pub struct StateManager {
    storage: Arc<dyn StateStore>,
}

impl StateManager {
    /// Create a new StateManager with a state storage backend
    pub fn new_with_storage(storage: Arc<dyn StateStore>) -> Self {
        Self { storage }
    }

    /// Record the document generated for a widget
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be written.
    pub async fn cache_widget_document(&self, widget_id: &WidgetId, url: &str) -> Result<()> {
        let record = CachedDocument::new(url);
        self.storage
            .put(&widget_document_key(widget_id), serde_json::to_value(&record)?)
            .await
    }

    /// The last document generated for a widget, if any
    pub async fn cached_widget_document(&self, widget_id: &WidgetId) -> Result<Option<CachedDocument>> {
        let key = widget_document_key(widget_id);
        match self.storage.get(&key).await? {
            Some(value) => decode(&key, value).map(Some),
            None => Ok(None),
        }
    }

    /// Every cached widget document, keyed by widget id
    ///
    /// Entries that no longer decode are skipped with a warning.
    pub async fn cached_widget_documents(&self) -> Result<Vec<(String, CachedDocument)>> {
        self.list(WIDGET_DOCUMENT_PREFIX).await
    }

    /// Save options for the next `export --auto` of a dashboard
    ///
    /// Replaces any pending options for the same dashboard.
    pub async fn save_auto_export_options(
        &self,
        dashboard_id: &DashboardId,
        options: &AutoExportOptions,
    ) -> Result<()> {
        tracing::info!(
            dashboard_id = %dashboard_id,
            export_type = ?options.export_type,
            partitions = options.partitions.len(),
            "Saving auto-export options"
        );
        self.storage
            .put(&auto_export_key(dashboard_id), serde_json::to_value(options)?)
            .await
    }

    /// The pending options of a dashboard, left in place
    pub async fn auto_export_options(
        &self,
        dashboard_id: &DashboardId,
    ) -> Result<Option<AutoExportOptions>> {
        let key = auto_export_key(dashboard_id);
        match self.storage.get(&key).await? {
            Some(value) => decode(&key, value).map(Some),
            None => Ok(None),
        }
    }

    /// Consume the pending options of a dashboard
    ///
    /// Returns them at most once: the entry is deleted as it is read.
    pub async fn take_auto_export_options(
        &self,
        dashboard_id: &DashboardId,
    ) -> Result<Option<AutoExportOptions>> {
        let key = auto_export_key(dashboard_id);
        match self.storage.take(&key).await? {
            Some(value) => decode(&key, value).map(Some),
            None => Ok(None),
        }
    }

    /// Pending auto-export options, keyed by dashboard id
    pub async fn pending_auto_exports(&self) -> Result<Vec<(String, AutoExportOptions)>> {
        self.list(AUTO_EXPORT_PREFIX).await
    }

    async fn list<T: DeserializeOwned>(&self, prefix: &str) -> Result<Vec<(String, T)>> {
        let mut records = Vec::new();
        for key in self.storage.keys_with_prefix(prefix).await? {
            let Some(value) = self.storage.get(&key).await? else {
                continue;
            };
            match decode::<T>(&key, value) {
                Ok(record) => {
                    let id = key.trim_start_matches(prefix).to_string();
                    records.push((id, record));
                }
                Err(e) => tracing::warn!(key = %key, error = %e, "Skipping unreadable state entry"),
            }
        }
        Ok(records)
    }
}

fn decode<T: DeserializeOwned>(key: &str, value: serde_json::Value) -> Result<T> {
    serde_json::from_value(value)
        .map_err(|e| FolioError::State(format!("Entry {key} has an unexpected shape: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::state::MemoryStateStore;
    use crate::domain::{DocumentFormat, ExportJobSpec};
    use serde_json::json;

    fn manager() -> (StateManager, Arc<MemoryStateStore>) {
        let store = Arc::new(MemoryStateStore::new());
        (StateManager::new_with_storage(store.clone()), store)
    }

    #[tokio::test]
    async fn test_cache_widget_document() {
        let (manager, _) = manager();
        let widget = WidgetId::new("w-1").unwrap();

        manager
            .cache_widget_document(&widget, "https://files/w-1.pdf")
            .await
            .unwrap();

        let cached = manager.cached_widget_document(&widget).await.unwrap().unwrap();
        assert_eq!(cached.url, "https://files/w-1.pdf");

        let all = manager.cached_widget_documents().await.unwrap();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].0, "w-1");
    }

    #[tokio::test]
    async fn test_auto_export_options_are_one_shot() {
        let (manager, _) = manager();
        let dashboard = DashboardId::new("d-1").unwrap();
        let options =
            AutoExportOptions::from_spec(&ExportJobSpec::unpartitioned(DocumentFormat::Pdf));

        manager
            .save_auto_export_options(&dashboard, &options)
            .await
            .unwrap();
        assert_eq!(manager.pending_auto_exports().await.unwrap().len(), 1);

        let peeked = manager.auto_export_options(&dashboard).await.unwrap();
        assert_eq!(peeked.as_ref(), Some(&options));
        assert_eq!(manager.pending_auto_exports().await.unwrap().len(), 1);

        let taken = manager.take_auto_export_options(&dashboard).await.unwrap();
        assert_eq!(taken, Some(options));
        assert!(manager
            .take_auto_export_options(&dashboard)
            .await
            .unwrap()
            .is_none());
        assert!(manager.pending_auto_exports().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_unreadable_entries_are_skipped_in_listing() {
        let (manager, store) = manager();
        store
            .put("widget-pdf:broken", json!("not a record"))
            .await
            .unwrap();
        manager
            .cache_widget_document(&WidgetId::new("ok").unwrap(), "u")
            .await
            .unwrap();

        let all = manager.cached_widget_documents().await.unwrap();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].0, "ok");
    }

    #[tokio::test]
    async fn test_malformed_entry_is_state_error() {
        let (manager, store) = manager();
        store.put("widget-pdf:w-1", json!(42)).await.unwrap();

        let err = manager
            .cached_widget_document(&WidgetId::new("w-1").unwrap())
            .await
            .unwrap_err();
        assert!(matches!(err, FolioError::State(_)));
    }
}
