use std::sync::Arc;
use tokio::sync::broadcast;

use crate::config::Config;
use crate::content_loader::PostRepository;
use crate::render::PageRenderer;

pub type RefreshBroadcaster = broadcast::Sender<()>;

pub struct AppState {
    pub repository: PostRepository,
    pub renderer: PageRenderer,
    pub is_development: bool,
}

impl AppState {
    pub fn from_config(config: &Config) -> Self {
        Self {
            repository: PostRepository::new(&config.posts_dir),
            renderer: PageRenderer::new(&config.site_title, config.development),
            is_development: config.development,
        }
    }
}

#[derive(Clone)]
pub struct RouterState {
    pub app_state: Arc<AppState>,
    pub broadcaster: RefreshBroadcaster,
}

impl axum::extract::FromRef<RouterState> for Arc<AppState> {
    fn from_ref(state: &RouterState) -> Self {
        state.app_state.clone()
    }
}

impl axum::extract::FromRef<RouterState> for RefreshBroadcaster {
    fn from_ref(state: &RouterState) -> Self {
        state.broadcaster.clone()
    }
}
