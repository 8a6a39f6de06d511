use crate::models::AppData;
use crate::storage::Backend;
use std::sync::Arc;
use tokio::sync::Mutex;

/// Shared handler state. Every write happens while `data` is locked, so
/// writes to the same (habit, date) are applied and persisted one at a time.
/// Handlers stage a change on a copy and only swap it in once it is on disk.
#[derive(Clone)]
pub struct AppState {
    pub backend: Arc<Backend>,
    pub data: Arc<Mutex<AppData>>,
}

impl AppState {
    pub fn new(backend: Backend, data: AppData) -> Self {
        Self {
            backend: Arc::new(backend),
            data: Arc::new(Mutex::new(data)),
        }
    }
}
