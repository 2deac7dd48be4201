use std::sync::Arc;

use crate::catalog::ProductRepository;

#[derive(Clone)]
pub struct AppState {
    pub repo: Arc<dyn ProductRepository>,
}

impl AppState {
    pub fn new(repo: Arc<dyn ProductRepository>) -> Self {
        Self { repo }
    }
}
