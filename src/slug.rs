use std::fmt;

pub const MARKDOWN_EXTENSION: &str = "md";

/// A post identifier that is safe to join onto the posts directory.
///
/// Only ASCII letters, digits, `-` and `_` are accepted, and the first
/// character may not be `-`. That rules out separators, `..`, hidden files
/// and anything a shell or URL would need to escape.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Slug(String);

impl Slug {
    pub fn parse(raw: &str) -> Option<Self> {
        let is_valid = !raw.is_empty()
            && !raw.starts_with('-')
            && raw
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');

        is_valid.then(|| Slug(raw.to_string()))
    }

    /// Slug for a directory entry, or `None` when it is not a Markdown file.
    pub fn from_file_name(file_name: &str) -> Option<&str> {
        file_name
            .strip_suffix(MARKDOWN_EXTENSION)
            .and_then(|stem| stem.strip_suffix('.'))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn file_name(&self) -> String {
        format!("{}.{}", self.0, MARKDOWN_EXTENSION)
    }
}

impl fmt::Display for Slug {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
