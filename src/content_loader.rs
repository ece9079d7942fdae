use std::{
    fs,
    io::ErrorKind,
    path::{Path, PathBuf},
};

use gray_matter::{engine::YAML, Matter};
use tracing::{debug, warn};

use crate::error::{ContentError, Result};
use crate::models::{FrontMatter, Post, PostEntry};
use crate::slug::Slug;

/// Read-only view over a directory of `<slug>.md` files.
///
/// Nothing is cached: every call goes back to the file system, so edits are
/// visible on the next request.
#[derive(Debug, Clone)]
pub struct PostRepository {
    root: PathBuf,
}

impl PostRepository {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Returns `Ok(None)` for unknown slugs, including ones that could never
    /// name a file in the posts directory.
    pub fn find_by_slug(&self, slug: &str) -> Result<Option<Post>> {
        let Some(slug) = Slug::parse(slug) else {
            debug!(slug, "Rejecting unsafe slug");
            return Ok(None);
        };

        let path = self.root.join(slug.file_name());
        let file_content = match fs::read_to_string(&path) {
            Ok(c) => c,
            Err(e) if e.kind() == ErrorKind::NotFound || path.is_dir() => return Ok(None),
            Err(e) if e.kind() == ErrorKind::InvalidData => {
                return Err(ContentError::MalformedFrontMatter {
                    slug: slug.to_string(),
                    reason: "file is not valid UTF-8".to_string(),
                })
            }
            Err(source) => return Err(ContentError::StorageUnavailable { path, source }),
        };

        parse_post(slug.as_str(), &file_content).map(Some)
    }

    /// Loads every Markdown file in directory order, keeping failures as
    /// `PostEntry::Rejected` instead of dropping them.
    pub fn load_all(&self) -> Result<Vec<PostEntry>> {
        let entries = fs::read_dir(&self.root).map_err(|source| ContentError::StorageUnavailable {
            path: self.root.clone(),
            source,
        })?;

        let mut loaded = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|source| ContentError::StorageUnavailable {
                path: self.root.clone(),
                source,
            })?;
            let path = entry.path();
            if !path.is_file() {
                continue;
            }

            let Some(file_name) = entry.file_name().to_str().map(str::to_owned) else {
                debug!("Skipping non UTF-8 file name {:?}", path);
                continue;
            };
            let Some(slug) = Slug::from_file_name(&file_name) else {
                continue;
            };

            loaded.push(self.load_entry(slug));
        }

        Ok(loaded)
    }

    /// Every post that loads cleanly. Rejected entries are logged and skipped.
    pub fn list_all(&self) -> Result<Vec<Post>> {
        let posts = self
            .load_all()?
            .into_iter()
            .filter_map(|entry| {
                if let PostEntry::Rejected { slug, reason } = &entry {
                    warn!(slug = %slug, "Skipping post: {}", reason);
                }
                entry.into_post()
            })
            .collect();
        Ok(posts)
    }

    fn load_entry(&self, slug: &str) -> PostEntry {
        match self.find_by_slug(slug) {
            Ok(Some(post)) => PostEntry::Loaded(post),
            Ok(None) => {
                let reason = if Slug::parse(slug).is_some() {
                    "file disappeared before it could be read"
                } else {
                    "file name is not a valid slug"
                };
                PostEntry::Rejected {
                    slug: slug.to_string(),
                    reason: reason.to_string(),
                }
            }
            Err(ContentError::MalformedFrontMatter { slug, reason }) => {
                PostEntry::Rejected { slug, reason }
            }
            Err(e) => PostEntry::Rejected {
                slug: slug.to_string(),
                reason: e.to_string(),
            },
        }
    }
}

fn parse_post(slug: &str, file_content: &str) -> Result<Post> {
    let malformed = |reason: String| ContentError::MalformedFrontMatter {
        slug: slug.to_string(),
        reason,
    };

    let matter = Matter::<YAML>::new();
    let parsed = matter
        .parse::<FrontMatter>(file_content)
        .map_err(|e| malformed(e.to_string()))?;
    let front_matter = parsed
        .data
        .ok_or_else(|| malformed("missing front matter block".to_string()))?;

    Ok(Post {
        slug: slug.to_string(),
        title: front_matter.title,
        date: front_matter.date,
        content: parsed.content.trim_start_matches(['\n', '\r']).trim_end().to_string(),
    })
}

#[cfg(test)]
mod tests {
    use std::fs;

    use tempfile::TempDir;

    use super::PostRepository;
    use crate::error::ContentError;
    use crate::models::{Post, PostEntry};

    fn write_post(dir: &TempDir, name: &str, body: &str) {
        fs::write(dir.path().join(name), body).unwrap();
    }

    fn sample_dir() -> TempDir {
        let dir = TempDir::new().unwrap();
        write_post(&dir, "a.md", "---\ntitle: \"A\"\ndate: \"2024-01-01\"\n---\nAlpha");
        write_post(&dir, "b.md", "---\ntitle: \"B\"\ndate: \"2024-01-02\"\n---\nBeta");
        dir
    }

    #[test]
    fn finds_post_with_front_matter_fields() {
        let dir = TempDir::new().unwrap();
        write_post(&dir, "hello.md", "---\ntitle: \"Hello\"\ndate: \"2024-01-01\"\n---\nWorld");
        let repo = PostRepository::new(dir.path());

        let post = repo.find_by_slug("hello").unwrap();
        assert_eq!(
            post,
            Some(Post {
                slug: "hello".to_string(),
                title: "Hello".to_string(),
                date: "2024-01-01".to_string(),
                content: "World".to_string(),
            })
        );
    }

    #[test]
    fn body_drops_blank_lines_around_it() {
        let dir = TempDir::new().unwrap();
        write_post(
            &dir,
            "spaced.md",
            "---\ntitle: \"Spaced\"\ndate: \"2024-03-01\"\n---\n\n\nFirst\n\nSecond\n\n",
        );
        let repo = PostRepository::new(dir.path());

        let post = repo.find_by_slug("spaced").unwrap().unwrap();
        assert_eq!(post.content, "First\n\nSecond");
    }

    #[test]
    fn directory_named_like_a_post_is_absent() {
        let dir = sample_dir();
        fs::create_dir(dir.path().join("drafts.md")).unwrap();
        let repo = PostRepository::new(dir.path());

        assert_eq!(repo.find_by_slug("drafts").unwrap(), None);
    }

    #[test]
    fn invalid_utf8_is_malformed() {
        let dir = sample_dir();
        fs::write(dir.path().join("binary.md"), [0xff, 0xfe, 0x00, 0x80]).unwrap();
        let repo = PostRepository::new(dir.path());

        let err = repo.find_by_slug("binary").unwrap_err();
        assert!(matches!(err, ContentError::MalformedFrontMatter { .. }));

        let rejected = repo
            .load_all()
            .unwrap()
            .into_iter()
            .find_map(|e| match e {
                PostEntry::Rejected { slug, reason } if slug == "binary" => Some(reason),
                _ => None,
            });
        assert_eq!(rejected.as_deref(), Some("file is not valid UTF-8"));
    }

    #[test]
    fn unknown_slug_is_absent() {
        let dir = sample_dir();
        let repo = PostRepository::new(dir.path());
        assert_eq!(repo.find_by_slug("c").unwrap(), None);
    }

    #[test]
    fn unsafe_slugs_are_absent() {
        let dir = sample_dir();
        fs::write(dir.path().join("secret.md"), "---\ntitle: x\ndate: y\n---\n").unwrap();
        let nested = PostRepository::new(dir.path().join("posts"));
        fs::create_dir(nested.root()).unwrap();

        assert_eq!(nested.find_by_slug("../secret").unwrap(), None);
        assert_eq!(nested.find_by_slug("").unwrap(), None);
        assert_eq!(nested.find_by_slug("a/b").unwrap(), None);
    }

    #[test]
    fn repeated_lookups_are_equal() {
        let dir = sample_dir();
        let repo = PostRepository::new(dir.path());
        let first = repo.find_by_slug("a").unwrap();
        let second = repo.find_by_slug("a").unwrap();
        assert!(first.is_some());
        assert_eq!(first, second);
    }

    #[test]
    fn missing_title_is_malformed() {
        let dir = TempDir::new().unwrap();
        write_post(&dir, "untitled.md", "---\ndate: \"2024-01-01\"\n---\nBody");
        let repo = PostRepository::new(dir.path());

        let err = repo.find_by_slug("untitled").unwrap_err();
        assert!(err.to_string().contains("untitled"));
    }

    #[test]
    fn missing_front_matter_is_malformed() {
        let dir = TempDir::new().unwrap();
        write_post(&dir, "plain.md", "Just some text.");
        let repo = PostRepository::new(dir.path());
        assert!(repo.find_by_slug("plain").is_err());
    }

    #[test]
    fn lists_every_valid_post() {
        let dir = sample_dir();
        let repo = PostRepository::new(dir.path());

        let mut posts = repo.list_all().unwrap();
        posts.sort_by(|a, b| a.slug.cmp(&b.slug));
        let slugs: Vec<&str> = posts.iter().map(|p| p.slug.as_str()).collect();
        assert_eq!(slugs, ["a", "b"]);
        assert_eq!(posts[0].title, "A");
        assert_eq!(posts[0].content, "Alpha");
        assert_eq!(posts[1].date, "2024-01-02");
        assert_eq!(posts[1].content, "Beta");
    }

    #[test]
    fn load_all_reports_rejected_entries() {
        let dir = sample_dir();
        write_post(&dir, "broken.md", "---\ntitle: \"No date\"\n---\nBody");
        write_post(&dir, "bad name.md", "---\ntitle: x\ndate: y\n---\n");
        let repo = PostRepository::new(dir.path());

        let entries = repo.load_all().unwrap();
        assert_eq!(entries.len(), 4);
        let mut rejected: Vec<&str> = entries
            .iter()
            .filter_map(|e| match e {
                PostEntry::Rejected { slug, .. } => Some(slug.as_str()),
                PostEntry::Loaded(_) => None,
            })
            .collect();
        rejected.sort();
        assert_eq!(rejected, ["bad name", "broken"]);

        assert_eq!(repo.list_all().unwrap().len(), 2);
    }

    #[test]
    fn ignores_other_files_and_directories() {
        let dir = sample_dir();
        write_post(&dir, "notes.txt", "not a post");
        fs::create_dir(dir.path().join("drafts.md")).unwrap();
        let repo = PostRepository::new(dir.path());

        assert_eq!(repo.load_all().unwrap().len(), 2);
    }

    #[test]
    fn empty_directory_lists_nothing() {
        let dir = TempDir::new().unwrap();
        let repo = PostRepository::new(dir.path());
        assert!(repo.list_all().unwrap().is_empty());
    }

    #[test]
    fn missing_directory_is_storage_error() {
        let dir = TempDir::new().unwrap();
        let repo = PostRepository::new(dir.path().join("nope"));
        let err = repo.list_all().unwrap_err();
        assert!(err.to_string().starts_with("storage unavailable"));
    }
}
