use std::{path::PathBuf, time::Duration};

use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        State,
    },
    response::IntoResponse,
};
use notify_debouncer_full::{
    new_debouncer,
    notify::{Error as NotifyError, RecursiveMode, Watcher},
    DebouncedEvent,
};
use tracing::{debug, error, info};

use crate::state::RefreshBroadcaster;

pub async fn ws_handler(
    ws: WebSocketUpgrade,
    State(tx): State<RefreshBroadcaster>,
) -> impl IntoResponse {
    ws.on_upgrade(|socket| handle_socket(socket, tx))
}

async fn handle_socket(mut socket: WebSocket, tx: RefreshBroadcaster) {
    let mut rx = tx.subscribe();

    // One signal per connection; the page reconnects after reloading.
    if rx.recv().await.is_ok()
        && socket.send(Message::Text("reload".into())).await.is_err()
    {
        debug!("Client disconnected before reload message could be sent");
    }
}

/// Editor scratch files (Emacs `.#foo`, `foo~`) should not trigger reloads.
fn is_temp_file(event: &DebouncedEvent) -> bool {
    event.event.paths.iter().any(|path| {
        path.file_name()
            .and_then(|name| name.to_str())
            .is_some_and(|s| s.starts_with(".#") || s.ends_with('~'))
    })
}

fn is_relevant(event: &DebouncedEvent) -> bool {
    let kind = &event.kind;
    (kind.is_modify() || kind.is_create() || kind.is_remove()) && !is_temp_file(event)
}

/// Posts are read on every request, so a change only needs to tell open
/// browsers to fetch the page again.
pub fn start_posts_watcher(tx: RefreshBroadcaster, posts_dir: PathBuf) {
    info!("Watching {} for changes", posts_dir.display());
    tokio::spawn(async move {
        let (watcher_tx, mut watcher_rx) = tokio::sync::mpsc::channel(1);

        let debouncer = new_debouncer(
            Duration::from_millis(200),
            None,
            move |res: Result<Vec<DebouncedEvent>, Vec<NotifyError>>| match res {
                Ok(events) => {
                    let changed: Vec<_> = events
                        .iter()
                        .filter(|e| is_relevant(e))
                        .flat_map(|e| &e.event.paths)
                        .map(|p| p.display().to_string())
                        .collect();
                    if !changed.is_empty() {
                        debug!("Post files changed: {:?}", changed);
                        if let Err(e) = watcher_tx.blocking_send(()) {
                            error!("Failed to send watcher event: {}", e);
                        }
                    }
                }
                Err(errors) => {
                    for e in errors {
                        error!("Watcher error: {}", e);
                    }
                }
            },
        );
        let mut debouncer = match debouncer {
            Ok(d) => d,
            Err(e) => {
                error!("Failed to create file watcher: {}", e);
                return;
            }
        };

        if let Err(e) = debouncer.watcher().watch(&posts_dir, RecursiveMode::Recursive) {
            error!("Failed to watch {}: {}", posts_dir.display(), e);
            return;
        }

        while watcher_rx.recv().await.is_some() {
            info!("Posts changed, telling browsers to reload");
            // No receivers just means no browser tab is open.
            if tx.send(()).is_err() {
                debug!("No live-reload clients connected");
            }
        }
    });
}
