use std::{path::Path as FsPath, sync::Arc};

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::Html,
    routing::{get, get_service},
    Router,
};
use tokio::sync::broadcast;
use tower_http::{services::ServeDir, trace::TraceLayer};
use tracing::error;

use crate::content_loader::PostRepository;
use crate::error::ContentError;
use crate::hot_reload::ws_handler;
use crate::models::Post;
use crate::state::{AppState, RefreshBroadcaster, RouterState};

type PageResponse = (StatusCode, Html<String>);

pub fn build_router(
    app_state: Arc<AppState>,
    broadcaster: RefreshBroadcaster,
    static_dir: &FsPath,
) -> Router {
    let is_development = app_state.is_development;
    let router_state = RouterState {
        app_state,
        broadcaster,
    };

    let mut app = Router::new()
        .route("/", get(homepage))
        .route("/posts", get(homepage))
        .route("/posts/{slug}", get(render_post))
        .nest_service("/static", get_service(ServeDir::new(static_dir)));

    if is_development {
        app = app.route("/ws", get(ws_handler));
    }

    app.layer(TraceLayer::new_for_http()).with_state(router_state)
}

/// Router without live reload, for callers that never broadcast.
pub fn router_for(app_state: Arc<AppState>, static_dir: &FsPath) -> Router {
    let (tx, _rx) = broadcast::channel(1);
    build_router(app_state, tx, static_dir)
}

/// Repository calls block on the file system, so they run off the async
/// worker threads.
async fn with_repository<T, F>(state: &AppState, f: F) -> Result<T, ContentError>
where
    T: Send + 'static,
    F: FnOnce(&PostRepository) -> Result<T, ContentError> + Send + 'static,
{
    let repository = state.repository.clone();
    match tokio::task::spawn_blocking(move || f(&repository)).await {
        Ok(result) => result,
        Err(join_error) => Err(ContentError::StorageUnavailable {
            path: state.repository.root().to_path_buf(),
            source: std::io::Error::other(join_error),
        }),
    }
}

fn server_error(state: &AppState, e: &ContentError) -> PageResponse {
    error!("Failed to serve page: {}", e);
    (StatusCode::INTERNAL_SERVER_ERROR, Html(state.renderer.error()))
}

async fn homepage(State(state): State<Arc<AppState>>) -> PageResponse {
    match with_repository(&state, PostRepository::list_all).await {
        Ok(posts) => (StatusCode::OK, Html(state.renderer.index(&posts))),
        Err(e) => server_error(&state, &e),
    }
}

async fn render_post(
    Path(slug): Path<String>,
    State(state): State<Arc<AppState>>,
) -> PageResponse {
    let lookup = slug.clone();
    let found: Result<Option<Post>, _> =
        with_repository(&state, move |repo| repo.find_by_slug(&lookup)).await;

    match found {
        Ok(Some(post)) => (StatusCode::OK, Html(state.renderer.post(&post))),
        Ok(None) => (StatusCode::NOT_FOUND, Html(state.renderer.not_found(&slug))),
        Err(e) => server_error(&state, &e),
    }
}
