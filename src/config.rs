use std::{
    fs,
    path::{Path, PathBuf},
};

use serde::Deserialize;
use tracing::debug;

use crate::error::ConfigError;

pub const DEFAULT_CONFIG_FILE: &str = "blog.toml";

#[derive(Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct Config {
    pub site_title: String,
    pub posts_dir: PathBuf,
    pub static_dir: PathBuf,
    pub output_dir: PathBuf,
    pub port: u16,
    pub development: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            site_title: "My Blog".to_string(),
            posts_dir: PathBuf::from("content/posts"),
            static_dir: PathBuf::from("content/static"),
            output_dir: PathBuf::from("dist"),
            port: 8080,
            development: false,
        }
    }
}

impl Config {
    /// Reads `path` if given, otherwise `blog.toml` when it exists, then
    /// applies environment overrides.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let config = match path {
            Some(path) => Self::from_file(path)?,
            None if Path::new(DEFAULT_CONFIG_FILE).is_file() => {
                Self::from_file(Path::new(DEFAULT_CONFIG_FILE))?
            }
            None => Self::default(),
        };
        Ok(config.with_env(|key| std::env::var(key).ok()))
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        debug!("Loading config from {}", path.display());
        let raw = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        toml::from_str(&raw).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// `RUST_ENV`, `PORT` and `BLOG_POSTS_DIR` win over the file.
    pub fn with_env(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        if let Some(env) = lookup("RUST_ENV") {
            self.development = env == "development";
        }
        if let Some(port) = lookup("PORT").and_then(|p| p.parse().ok()) {
            self.port = port;
        }
        if let Some(dir) = lookup("BLOG_POSTS_DIR") {
            self.posts_dir = PathBuf::from(dir);
        }
        self
    }
}
