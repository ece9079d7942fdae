use htmlescape::encode_minimal as escape;

use crate::markdown::render_post_body;
use crate::models::Post;

const HOT_RELOAD_SCRIPT: &str = r#"
<script>
    const socket = new WebSocket("ws://" + window.location.host + "/ws");
    socket.onmessage = (event) => {
        if (event.data === "reload") {
            window.location.reload();
        }
    };
</script>
"#;

/// Wraps page bodies in the site layout.
#[derive(Debug, Clone)]
pub struct PageRenderer {
    site_title: String,
    is_development: bool,
}

impl PageRenderer {
    pub fn new(site_title: impl Into<String>, is_development: bool) -> Self {
        Self {
            site_title: site_title.into(),
            is_development,
        }
    }

    pub fn index(&self, posts: &[Post]) -> String {
        let mut list_items = String::new();
        for post in posts {
            list_items.push_str(&format!(
                "<li><a href=\"/posts/{}\">{} - {}</a></li>",
                escape(&post.slug),
                escape(&post.title),
                escape(&post.date)
            ));
        }

        let body = format!(
            "<h1>{}</h1><ul class=\"posts\">{}</ul>",
            escape(&self.site_title),
            list_items
        );
        self.with_layout(&self.site_title, &body)
    }

    pub fn post(&self, post: &Post) -> String {
        let body = format!(
            "<article><h1>{}</h1><p class=\"date\">{}</p>{}</article>",
            escape(&post.title),
            escape(&post.date),
            render_post_body(&post.content)
        );
        self.with_layout(&post.title, &body)
    }

    pub fn not_found(&self, slug: &str) -> String {
        let body = format!(
            "<h1>Not found</h1><p>There is no post called <code>{}</code>.</p>",
            escape(slug)
        );
        self.with_layout("Not found", &body)
    }

    pub fn error(&self) -> String {
        self.with_layout(
            "Error",
            "<h1>Something went wrong</h1><p>The posts could not be read. Please try again later.</p>",
        )
    }

    fn with_layout(&self, page_title: &str, content: &str) -> String {
        let page_title = if page_title == self.site_title {
            escape(page_title)
        } else {
            format!("{} | {}", escape(page_title), escape(&self.site_title))
        };

        let site_title = escape(&self.site_title);
        let reload = if self.is_development { HOT_RELOAD_SCRIPT } else { "" };

        // Single pass: values are never scanned for placeholders.
        format!(
            r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="utf-8">
    <meta name="viewport" content="width=device-width, initial-scale=1">
    <title>{page_title}</title>
    <link rel="stylesheet" href="/static/style.css">
</head>
<body>
    <nav class="navbar"><a href="/" class="brand">{site_title}</a></nav>
    <div class="page">
        <aside class="sidebar">
            <h2>Navigation</h2>
            <ul>
                <li><a href="/">Home</a></li>
                <li><a href="/posts">Blog Posts</a></li>
            </ul>
        </aside>
        <main>{content}</main>
    </div>
{reload}</body>
</html>
"#
        )
    }
}
