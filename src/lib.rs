pub mod config;
pub mod content_loader;
pub mod error;
pub mod export;
pub mod hot_reload;
pub mod markdown;
pub mod models;
pub mod render;
pub mod routes;
pub mod slug;
pub mod state;

pub use content_loader::PostRepository;
pub use error::ContentError;
pub use models::{Post, PostEntry};
