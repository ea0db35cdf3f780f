//! Application state shared across API handlers

use std::sync::Arc;

use bucket::BucketClient;
use bucket_core::{AppConfig, Network};

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: AppConfig,
    client: BucketClient,
}

impl AppState {
    pub fn new(config: AppConfig, client: BucketClient) -> Self {
        Self {
            inner: Arc::new(AppStateInner { config, client }),
        }
    }

    pub fn config(&self) -> &AppConfig {
        &self.inner.config
    }

    pub fn client(&self) -> &BucketClient {
        &self.inner.client
    }

    pub fn network(&self) -> Network {
        self.inner.client.network()
    }
}
