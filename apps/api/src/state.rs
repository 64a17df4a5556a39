use std::sync::Arc;

use crate::export::{AssetStore, PdfRenderer};
use crate::store::LetterStore;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    /// Pluggable data access. Default: `PgStore`.
    pub store: Arc<dyn LetterStore>,
    /// Pluggable PDF backend. Default: `ChromePdfRenderer` (shared browser, bounded tabs).
    pub pdf: Arc<dyn PdfRenderer>,
    /// Public assets root; image paths in company details resolve against it.
    pub assets: AssetStore,
}
