use std::{net::SocketAddr, path::PathBuf, sync::Arc};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tokio::{net::TcpListener, sync::broadcast};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use markdown_blog::{
    config::Config, export::export_from_config, hot_reload::start_posts_watcher, routes::build_router,
    state::AppState,
};

#[derive(Parser)]
#[command(name = "markdown-blog", version, about = "Serve a directory of Markdown posts as a blog")]
struct Cli {
    /// Config file (defaults to ./blog.toml when present)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Development mode: live reload on post changes
    #[arg(long, global = true)]
    dev: bool,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Run the HTTP server
    Serve {
        #[arg(short, long)]
        port: Option<u16>,
    },
    /// Write static HTML pages for every post
    Export {
        #[arg(short, long)]
        out: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let mut config = Config::load(cli.config.as_deref())?;
    config.development |= cli.dev;
    info!("Development mode: {}", config.development);

    match cli.command.unwrap_or(Command::Serve { port: None }) {
        Command::Serve { port } => {
            if let Some(port) = port {
                config.port = port;
            }
            serve(config).await
        }
        Command::Export { out } => {
            let out_dir = out.unwrap_or_else(|| config.output_dir.clone());
            tokio::task::spawn_blocking(move || export_from_config(&config, &out_dir)).await??;
            Ok(())
        }
    }
}

async fn serve(config: Config) -> Result<()> {
    let state = Arc::new(AppState::from_config(&config));

    let (tx, _rx) = broadcast::channel(1);
    if config.development {
        info!("Hot reload enabled. Check logs for file change events.");
        start_posts_watcher(tx.clone(), config.posts_dir.clone());
    }

    let app = build_router(state, tx, &config.static_dir);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    info!(%addr, posts_dir = %config.posts_dir.display(), "listening");
    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("binding {addr}"))?;
    axum::serve(listener, app).await?;
    Ok(())
}
