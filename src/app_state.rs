use std::sync::Arc;

use crate::{config::Config, graph::SocialGraph, store::SqliteStore};

#[derive(Clone)]
pub struct AppState {
    pub graph: Arc<SocialGraph>,
    pub config: Config,
}

impl AppState {
    pub async fn new(config: Config) -> anyhow::Result<Self> {
        let store = SqliteStore::new(&config.database.url)
            .await
            .map_err(|e| anyhow::anyhow!("failed to open graph store: {}", e))?;
        let graph = Arc::new(SocialGraph::new(Arc::new(store)));

        Ok(Self { graph, config })
    }
}
