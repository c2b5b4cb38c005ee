use tokio::sync::RwLock;

use crate::store::Backend;

pub struct AppState {
    pub backend: RwLock<Backend>,
}

impl AppState {
    pub fn new(backend: Backend) -> Self {
        Self {
            backend: RwLock::new(backend),
        }
    }
}
