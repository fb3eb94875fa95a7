use std::sync::Arc;

use crate::config::AppConfig;
use crate::database::{MemoryStore, Store};
use crate::services::{CommentService, PostService, UserService};

/// Shared per-process state handed to every handler and middleware
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn Store>,
    pub config: Arc<AppConfig>,
}

impl AppState {
    pub fn new(store: Arc<dyn Store>, config: AppConfig) -> Self {
        Self {
            store,
            config: Arc::new(config),
        }
    }

    /// State backed by a fresh in-memory store
    pub fn in_memory(config: AppConfig) -> Self {
        Self::new(Arc::new(MemoryStore::new()), config)
    }

    pub fn posts(&self) -> PostService {
        PostService::new(self.store.clone())
    }

    pub fn comments(&self) -> CommentService {
        CommentService::new(self.store.clone())
    }

    pub fn users(&self) -> UserService {
        UserService::new(self.store.clone(), self.config.clone())
    }
}
