use crate::chat::ChatStore;
use crate::core::AppConfig;

pub struct AppState {
    pub store: ChatStore,
    pub config: AppConfig,
}

impl AppState {
    pub fn new(store: ChatStore, config: AppConfig) -> Self {
        Self { store, config }
    }
}
