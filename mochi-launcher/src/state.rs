//! Shared handler state

use std::sync::Arc;

use crate::service::PipelineLauncher;

#[derive(Clone)]
pub struct AppState {
    pub launcher: Arc<PipelineLauncher>,
}

impl AppState {
    pub fn new(launcher: PipelineLauncher) -> Self {
        Self {
            launcher: Arc::new(launcher),
        }
    }
}
