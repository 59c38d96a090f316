use std::sync::Arc;

use client::DataApi;
use content::ContentStore;
use service::notify::AccountMailer;

/// Shared application state. Everything behind `Arc` so the router clones
/// are cheap; the `DataApi` and mailer are traits so tests can script them.
#[derive(Clone)]
pub struct AppState {
    pub api: Arc<dyn DataApi>,
    pub content: Arc<ContentStore>,
    pub mailer: Arc<dyn AccountMailer>,
    pub session_secret: String,
}
