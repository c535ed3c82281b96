use std::sync::Arc;

use axum::extract::FromRef;

use crate::{
    config::Config,
    repositories::{CatalogRepository, ResponseRepository, UserRepository},
    services::assistant::Assistant,
};

/// Shared application state.
/// Storage and the language model sit behind traits so handlers never touch a driver directly.
#[derive(Clone)]
pub struct AppState {
    pub users: Arc<dyn UserRepository>,
    pub catalog: Arc<dyn CatalogRepository>,
    pub responses: Arc<dyn ResponseRepository>,
    pub assistant: Arc<dyn Assistant>,
    pub config: Config,
}

impl FromRef<AppState> for Config {
    fn from_ref(state: &AppState) -> Self {
        state.config.clone()
    }
}
