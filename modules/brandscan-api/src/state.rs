use std::sync::Arc;

use brandscan_analyze::Services;
use brandscan_common::{Config, ScreenshotCache};

/// Shared across every connection: one `Services` (LLM cascade, cache,
/// scheduler) and one `ScreenshotCache`, both process-wide per §5's shared
/// resources.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub services: Arc<Services>,
    pub screenshots: Arc<ScreenshotCache>,
}
