// Local state: widget document cache and one-shot auto-export options

pub mod manager;
pub mod records;

pub use manager::StateManager;
pub use records::{AutoExportOptions, CachedDocument, AUTO_EXPORT_PREFIX, WIDGET_DOCUMENT_PREFIX};
