use std::sync::Arc;

use autoreel_core::artifact::ArtifactStore;
use autoreel_pipeline::Stages;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// Cheaply cloneable: everything is behind an `Arc`.
#[derive(Clone)]
pub struct AppState {
    /// The stages exposed over HTTP, sharing one artifact store.
    pub stages: Arc<Stages>,
}

impl AppState {
    pub fn store(&self) -> &ArtifactStore {
        self.stages.store()
    }
}
