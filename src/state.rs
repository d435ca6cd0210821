use crate::config::ServerConfig;
use std::sync::Arc;

/// Shared, read-only handler state. Uploads never land here; every request
/// carries its own workbook bytes.
#[derive(Debug, Clone)]
pub struct AppState {
    config: Arc<ServerConfig>,
}

impl AppState {
    pub fn new(config: Arc<ServerConfig>) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ServerConfig {
        &self.config
    }

    pub fn report_file_name(&self) -> String {
        self.config.report_file_name.clone()
    }
}
