use serde::Deserialize;

#[derive(Deserialize, Debug, Clone)]
pub struct FrontMatter {
    pub title: String,
    pub date: String,
}

/// One blog entry, read from `<slug>.md`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Post {
    pub slug: String,
    pub title: String,
    /// Kept verbatim from the front matter.
    pub date: String,
    /// Markdown body, front matter and surrounding blank lines stripped.
    pub content: String,
}

/// Outcome of loading a single entry of the posts directory.
#[derive(Debug)]
pub enum PostEntry {
    Loaded(Post),
    Rejected { slug: String, reason: String },
}

impl PostEntry {
    pub fn into_post(self) -> Option<Post> {
        match self {
            PostEntry::Loaded(post) => Some(post),
            PostEntry::Rejected { .. } => None,
        }
    }
}
