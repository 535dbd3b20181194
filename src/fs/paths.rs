//! Path and directory management.

use std::path::{Path, PathBuf};

use tokio::fs;

use crate::error::{Error, Result};
use crate::fs::naming::{author_dir_name, item_dir_name, page_file_name, page_stem};
use crate::media::ItemRef;

/// Suffix of in-progress downloads.
pub const PARTIAL_SUFFIX: &str = "part";

/// File recording the page count of an item once every page is saved.
pub const COMPLETION_MARKER: &str = ".complete";

/// Directory holding every page of an illustration:
/// `root/{author}/{id}_{title}`.
pub fn item_directory(root: &Path, item: &ItemRef) -> PathBuf {
    root.join(author_dir_name(item)).join(item_dir_name(item))
}

/// Final path of one page.
pub fn page_path(item_dir: &Path, page_index: u32, extension: &str) -> PathBuf {
    item_dir.join(page_file_name(page_index, extension))
}

/// Sibling path a page is written to before being renamed into place.
pub fn partial_path(final_path: &Path) -> PathBuf {
    let mut name = final_path
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_default();
    name.push(format!(".{}.{}", uuid::Uuid::new_v4().simple(), PARTIAL_SUFFIX));
    final_path.with_file_name(name)
}

/// Whether `path` is a regular file with at least one byte.
pub async fn is_complete_file(path: &Path) -> bool {
    match fs::metadata(path).await {
        Ok(meta) => meta.is_file() && meta.len() > 0,
        Err(_) => false,
    }
}

/// Find a completed file for a page regardless of its extension.
///
/// Used before the page list is known, when only the `p{index}` stem can be
/// derived.
pub async fn find_existing_page(item_dir: &Path, page_index: u32) -> Option<PathBuf> {
    let stem = page_stem(page_index);
    let mut entries = fs::read_dir(item_dir).await.ok()?;

    while let Ok(Some(entry)) = entries.next_entry().await {
        let path = entry.path();
        let matches_stem = path
            .file_stem()
            .and_then(|s| s.to_str())
            .map(|s| s == stem)
            .unwrap_or(false);

        if matches_stem && is_complete_file(&path).await {
            return Some(path);
        }
    }

    None
}

/// Page count stored in the item's completion marker, if there is one.
pub async fn completed_page_count(item_dir: &Path) -> Option<u32> {
    let content = fs::read_to_string(item_dir.join(COMPLETION_MARKER))
        .await
        .ok()?;
    content.trim().parse().ok().filter(|count| *count > 0)
}

/// Record that all `page_count` pages of an item are on disk.
pub async fn write_completion_marker(item_dir: &Path, page_count: u32) -> std::io::Result<()> {
    fs::write(item_dir.join(COMPLETION_MARKER), format!("{}\n", page_count)).await
}

/// Delete `.part` files left in `item_dir` by an interrupted write.
///
/// Returns how many were removed.
pub async fn remove_stale_partials(item_dir: &Path) -> usize {
    let Ok(mut entries) = fs::read_dir(item_dir).await else {
        return 0;
    };

    let mut removed = 0;
    while let Ok(Some(entry)) = entries.next_entry().await {
        let path = entry.path();
        let is_partial = path.extension().and_then(|e| e.to_str()) == Some(PARTIAL_SUFFIX);
        if is_partial && fs::remove_file(&path).await.is_ok() {
            removed += 1;
        }
    }
    removed
}

/// Create the output root, failing early if it cannot be used.
pub async fn ensure_output_root(path: &Path) -> Result<()> {
    let to_error = |source: std::io::Error| Error::OutputDirectory {
        path: path.display().to_string(),
        source,
    };

    fs::create_dir_all(path).await.map_err(to_error)?;
    let meta = fs::metadata(path).await.map_err(to_error)?;
    if meta.permissions().readonly() {
        return Err(to_error(std::io::Error::new(
            std::io::ErrorKind::PermissionDenied,
            "directory is read-only",
        )));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sunset() -> ItemRef {
        ItemRef::new("123", "Sunset", "Art Person", 2)
    }

    #[test]
    fn test_layout_is_deterministic() {
        let root = Path::new("/downloads");
        let item = sunset();

        let first: Vec<PathBuf> = (0..item.page_count)
            .map(|i| page_path(&item_directory(root, &item), i, "jpg"))
            .collect();
        let second: Vec<PathBuf> = (0..item.page_count)
            .map(|i| page_path(&item_directory(root, &item), i, "jpg"))
            .collect();

        assert_eq!(first, second);
        assert_eq!(
            first,
            vec![
                PathBuf::from("/downloads/Art Person/123_Sunset/p0.jpg"),
                PathBuf::from("/downloads/Art Person/123_Sunset/p1.jpg"),
            ]
        );
    }

    #[test]
    fn test_partial_path_is_sibling() {
        let final_path = PathBuf::from("/downloads/a/1_b/p0.png");
        let partial = partial_path(&final_path);

        assert_eq!(partial.parent(), final_path.parent());
        let name = partial.file_name().unwrap().to_str().unwrap();
        assert!(name.starts_with("p0.png."));
        assert!(name.ends_with(".part"));
        assert_ne!(partial_path(&final_path), partial);
    }

    #[tokio::test]
    async fn test_find_existing_page() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("p0.png"), b"data").unwrap();
        std::fs::write(dir.path().join("p1.jpg"), b"").unwrap();
        std::fs::write(dir.path().join("p2.jpg.0123abcd.part"), b"data").unwrap();

        assert_eq!(
            find_existing_page(dir.path(), 0).await,
            Some(dir.path().join("p0.png"))
        );
        // Empty files do not count as downloaded
        assert_eq!(find_existing_page(dir.path(), 1).await, None);
        // Partial files do not count either
        assert_eq!(find_existing_page(dir.path(), 2).await, None);
        assert_eq!(find_existing_page(&dir.path().join("missing"), 0).await, None);
    }

    #[tokio::test]
    async fn test_completion_marker() {
        let dir = tempfile::tempdir().unwrap();
        assert_eq!(completed_page_count(dir.path()).await, None);

        write_completion_marker(dir.path(), 3).await.unwrap();
        assert_eq!(completed_page_count(dir.path()).await, Some(3));

        std::fs::write(dir.path().join(COMPLETION_MARKER), b"garbage").unwrap();
        assert_eq!(completed_page_count(dir.path()).await, None);
        // The marker never counts as a page
        assert_eq!(find_existing_page(dir.path(), 0).await, None);
    }

    #[tokio::test]
    async fn test_remove_stale_partials() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("p0.png"), b"data").unwrap();
        std::fs::write(dir.path().join("p1.jpg.0123abcd.part"), b"half").unwrap();
        std::fs::write(dir.path().join("p2.jpg.4567cdef.part"), b"").unwrap();

        assert_eq!(remove_stale_partials(dir.path()).await, 2);
        assert!(dir.path().join("p0.png").exists());
        assert!(!dir.path().join("p1.jpg.0123abcd.part").exists());
        assert_eq!(remove_stale_partials(&dir.path().join("missing")).await, 0);
    }

    #[tokio::test]
    async fn test_ensure_output_root_creates_directories() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().join("a").join("b");
        ensure_output_root(&root).await.unwrap();
        assert!(root.is_dir());
    }

    #[tokio::test]
    async fn test_ensure_output_root_rejects_file() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("taken");
        std::fs::write(&file, b"x").unwrap();

        let err = ensure_output_root(&file).await.unwrap_err();
        assert!(matches!(err, Error::OutputDirectory { .. }));
    }
}
