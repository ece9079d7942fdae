//! Static export: pre-renders the index and one page per post.

use std::{fs, path::Path};

use anyhow::{Context, Result};
use tracing::{debug, info};
use walkdir::WalkDir;

use crate::config::Config;
use crate::content_loader::PostRepository;
use crate::render::PageRenderer;

/// Exports the configured site. Exported pages never carry the live-reload
/// script, whatever `development` says.
pub fn export_from_config(config: &Config, out_dir: &Path) -> Result<Vec<String>> {
    let repository = PostRepository::new(&config.posts_dir);
    let renderer = PageRenderer::new(&config.site_title, false);

    let slugs = export_site(&repository, &renderer, out_dir)?;
    copy_static(&config.static_dir, &out_dir.join("static"))?;
    Ok(slugs)
}

/// Writes `index.html`, `posts/index.html` and `posts/<slug>/index.html`
/// under `out_dir`, returning the exported slugs in listing order.
pub fn export_site(
    repository: &PostRepository,
    renderer: &PageRenderer,
    out_dir: &Path,
) -> Result<Vec<String>> {
    let posts = repository.list_all()?;
    let index = renderer.index(&posts);

    let posts_dir = out_dir.join("posts");
    fs::create_dir_all(&posts_dir)
        .with_context(|| format!("creating {}", posts_dir.display()))?;
    write_page(&out_dir.join("index.html"), &index)?;
    write_page(&posts_dir.join("index.html"), &index)?;

    let mut slugs = Vec::with_capacity(posts.len());
    for post in &posts {
        let page_dir = posts_dir.join(&post.slug);
        fs::create_dir_all(&page_dir)
            .with_context(|| format!("creating {}", page_dir.display()))?;
        write_page(&page_dir.join("index.html"), &renderer.post(post))?;
        slugs.push(post.slug.clone());
    }

    info!("Exported {} posts to {}", slugs.len(), out_dir.display());
    Ok(slugs)
}

/// Mirrors `static_dir` into `dest`. A missing static dir is not an error.
fn copy_static(static_dir: &Path, dest: &Path) -> Result<()> {
    if !static_dir.is_dir() {
        debug!("No static directory at {}", static_dir.display());
        return Ok(());
    }

    for entry in WalkDir::new(static_dir).follow_links(true) {
        let entry = entry.with_context(|| format!("walking {}", static_dir.display()))?;
        let path = entry.path();
        if !path.is_file() {
            continue;
        }

        let target = dest.join(path.strip_prefix(static_dir)?);
        if let Some(parent) = target.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("creating {}", parent.display()))?;
        }
        fs::copy(path, &target)
            .with_context(|| format!("copying {} to {}", path.display(), target.display()))?;
    }

    Ok(())
}

fn write_page(path: &Path, html: &str) -> Result<()> {
    fs::write(path, html).with_context(|| format!("writing {}", path.display()))
}
