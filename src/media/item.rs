//! Illustration references and per-page download targets.

use std::fmt;
use std::path::PathBuf;

/// One illustration yielded by the listing resolver.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ItemRef {
    /// Numeric illustration id, kept as a string.
    pub id: String,

    pub title: String,

    pub author_name: String,

    /// Number of pages (always at least 1).
    pub page_count: u32,
}

impl ItemRef {
    pub fn new(
        id: impl Into<String>,
        title: impl Into<String>,
        author_name: impl Into<String>,
        page_count: u32,
    ) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            author_name: author_name.into(),
            page_count: page_count.max(1),
        }
    }
}

impl fmt::Display for ItemRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} \"{}\" by {}", self.id, self.title, self.author_name)
    }
}

/// A single file to be written for one page of an illustration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaTarget {
    /// Source URL. `None` when the target was resolved from disk alone, or
    /// stands in for an item whose page list could not be fetched.
    pub url: Option<String>,

    /// Final location of the file.
    pub local_path: PathBuf,

    /// Zero-based page index.
    pub page_index: u32,
}

impl MediaTarget {
    /// Target with a known source URL.
    pub fn remote(url: impl Into<String>, local_path: PathBuf, page_index: u32) -> Self {
        Self {
            url: Some(url.into()),
            local_path,
            page_index,
        }
    }

    /// Target located on disk without consulting the service.
    pub fn local(local_path: PathBuf, page_index: u32) -> Self {
        Self {
            url: None,
            local_path,
            page_index,
        }
    }
}
