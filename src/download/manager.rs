//! Per-item page resolution and file download.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use tokio::fs::{self, File};
use tokio::io::AsyncWriteExt;

use crate::api::PixivApi;
use crate::download::outcome::{DownloadOutcome, DownloadStatus, SkipReason};
use crate::download::retry::{FetchError, RetryPolicy};
use crate::download::state::DownloadReport;
use crate::fs::{
    completed_page_count, find_existing_page, is_complete_file, item_directory, page_path,
    partial_path, remove_stale_partials, write_completion_marker,
};
use crate::media::{extension_for_url, ItemRef, MediaTarget};

/// Downloads every page of an illustration under `output_root`.
#[derive(Debug, Clone)]
pub struct DownloadManager {
    api: Arc<PixivApi>,
    policy: RetryPolicy,
    output_root: PathBuf,
}

impl DownloadManager {
    pub fn new(api: Arc<PixivApi>, policy: RetryPolicy, output_root: impl Into<PathBuf>) -> Self {
        Self {
            api,
            policy,
            output_root: output_root.into(),
        }
    }

    pub fn output_root(&self) -> &Path {
        &self.output_root
    }

    /// Download a batch of items in order. A failing item never stops the batch.
    pub async fn download(&self, items: &[ItemRef]) -> DownloadReport {
        let mut report = DownloadReport::default();
        for item in items {
            report.push_item(self.download_item(item).await);
        }
        report
    }

    /// Download one item, returning one outcome per page in page order.
    ///
    /// If the page list itself cannot be fetched, a single `Failed` outcome
    /// targeting the item directory is returned instead.
    pub async fn download_item(&self, item: &ItemRef) -> Vec<DownloadOutcome> {
        let item_dir = item_directory(&self.output_root, item);

        if let Some(existing) = self.existing_pages(&item_dir).await {
            tracing::info!("Skipping {}: already downloaded", item);
            return existing
                .into_iter()
                .zip(0..)
                .map(|(path, index)| {
                    DownloadOutcome::new(
                        &item.id,
                        MediaTarget::local(path, index),
                        DownloadStatus::Skipped(SkipReason::AlreadyDownloaded),
                    )
                })
                .collect();
        }

        tracing::info!("Downloading {} ({} page(s))", item, item.page_count);

        let removed = remove_stale_partials(&item_dir).await;
        if removed > 0 {
            tracing::debug!("Removed {} stale partial file(s) for {}", removed, item);
        }

        let api = self.api.as_ref();
        let label = format!("illust {} page list", item.id);
        let urls = match self
            .policy
            .run(api.clock(), &label, |_| api.fetch_illust_pages(&item.id))
            .await
        {
            Ok(urls) => urls,
            Err(e) => {
                tracing::error!("Failed to fetch page list for {}: {}", item, e);
                return vec![DownloadOutcome::new(
                    &item.id,
                    MediaTarget::local(item_dir, 0),
                    DownloadStatus::Failed(e),
                )];
            }
        };

        if urls.len() != item.page_count as usize {
            tracing::debug!(
                "Illust {} lists {} page(s), page list has {}",
                item.id,
                item.page_count,
                urls.len()
            );
        }

        let mut outcomes = Vec::with_capacity(urls.len());
        for (url, index) in urls.into_iter().zip(0..) {
            let path = page_path(&item_dir, index, &extension_for_url(&url));
            let target = MediaTarget::remote(url, path, index);
            let status = self.download_target(&item.id, &target).await;
            outcomes.push(DownloadOutcome::new(&item.id, target, status));
        }

        let failed = outcomes.iter().filter(|o| o.status.is_failed()).count();
        if failed == 0 {
            if let Err(e) = write_completion_marker(&item_dir, outcomes.len() as u32).await {
                tracing::warn!("Failed to mark {} as complete: {}", item, e);
            }
            tracing::info!("Finished {}", item);
        } else {
            tracing::warn!("Finished {} with {} failed page(s)", item, failed);
        }

        outcomes
    }

    /// Paths of every page if a previous run saved all of them.
    ///
    /// The listing's page count is only a hint, so the count comes from
    /// the completion marker written after the page list was resolved.
    async fn existing_pages(&self, item_dir: &Path) -> Option<Vec<PathBuf>> {
        let page_count = completed_page_count(item_dir).await?;
        let mut found = Vec::with_capacity(page_count as usize);
        for index in 0..page_count {
            found.push(find_existing_page(item_dir, index).await?);
        }
        Some(found)
    }

    async fn download_target(&self, item_id: &str, target: &MediaTarget) -> DownloadStatus {
        if is_complete_file(&target.local_path).await {
            tracing::debug!("Skipping existing file: {}", target.local_path.display());
            return DownloadStatus::Skipped(SkipReason::AlreadyDownloaded);
        }

        let Some(url) = target.url.as_deref() else {
            return DownloadStatus::Failed(FetchError::InvalidRequest(
                "target has no source URL".to_string(),
            ));
        };

        let api = self.api.as_ref();
        let label = format!("illust {} p{}", item_id, target.page_index);
        let bytes = match self
            .policy
            .run(api.clock(), &label, |_| api.fetch_media(url))
            .await
        {
            Ok(bytes) => bytes,
            Err(e) => {
                tracing::warn!("Failed to download {}: {}", url, e);
                return DownloadStatus::Failed(e);
            }
        };

        match write_atomically(&target.local_path, &bytes).await {
            Ok(()) => {
                tracing::debug!(
                    "Saved {} ({} bytes)",
                    target.local_path.display(),
                    bytes.len()
                );
                DownloadStatus::Success
            }
            Err(e) => {
                tracing::error!("Failed to write {}: {}", target.local_path.display(), e);
                DownloadStatus::Failed(FetchError::Io(e.to_string()))
            }
        }
    }
}

/// Write `bytes` to a uniquely named sibling, then rename it onto `path`.
async fn write_atomically(path: &Path, bytes: &[u8]) -> std::io::Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).await?;
    }

    let partial = partial_path(path);
    let result: std::io::Result<()> = async {
        let mut file = File::create(&partial).await?;
        file.write_all(bytes).await?;
        file.flush().await?;
        file.sync_all().await?;
        drop(file);
        fs::rename(&partial, path).await
    }
    .await;

    if result.is_err() {
        let _ = fs::remove_file(&partial).await;
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::{RawResponse, TransportError};
    use crate::download::state::DownloadSummary;
    use crate::test_support::{bytes, fake_api, json, status};
    use serde_json::{json, Value};
    use std::time::Duration;
    use tempfile::TempDir;
    use url::Url;

    const IMAGE: &[u8] = b"\x89PNG fake image bytes";

    fn pages_body(id: &str, extensions: &[&str]) -> Value {
        let pages: Vec<Value> = extensions
            .iter()
            .enumerate()
            .map(|(index, ext)| {
                json!({"urls": {"original": format!(
                    "https://i.pximg.net/img-original/img/2025/11/28/00/00/00/{}_p{}.{}",
                    id, index, ext
                )}})
            })
            .collect();
        json!({"error": false, "message": "", "body": pages})
    }

    /// Id of a `/ajax/illust/{id}/pages` request, `None` for media requests.
    fn illust_id(url: &Url) -> Option<String> {
        if url.host_str() == Some("i.pximg.net") {
            return None;
        }
        url.path_segments()?.nth(2).map(str::to_string)
    }

    fn is_media(url: &Url) -> bool {
        url.host_str() == Some("i.pximg.net")
    }

    /// Serves a png and a jpg page for every illustration.
    fn two_page_service(url: &Url, _: usize) -> Result<RawResponse, TransportError> {
        match illust_id(url) {
            Some(id) => json(pages_body(&id, &["png", "jpg"])),
            None => bytes(IMAGE),
        }
    }

    /// Serves two pages for illustration 123 and one page for the rest.
    fn sized_service(url: &Url, _: usize) -> Result<RawResponse, TransportError> {
        match illust_id(url) {
            Some(id) if id == "123" => json(pages_body(&id, &["png", "jpg"])),
            Some(id) => json(pages_body(&id, &["jpg"])),
            None => bytes(IMAGE),
        }
    }

    fn sunset() -> ItemRef {
        ItemRef::new("123", "Sunset", "Art Person", 2)
    }

    fn manager(
        root: &Path,
        attempts: u32,
        handler: impl Fn(&Url, usize) -> Result<RawResponse, TransportError> + Send + Sync + 'static,
    ) -> (DownloadManager, Arc<crate::test_support::FakeTransport>) {
        let (api, transport, _) = fake_api(Duration::ZERO, handler);
        let policy = RetryPolicy::new(attempts, Duration::from_millis(500));
        (DownloadManager::new(api, policy, root), transport)
    }

    fn statuses(outcomes: &[DownloadOutcome]) -> Vec<DownloadStatus> {
        outcomes.iter().map(|o| o.status.clone()).collect()
    }

    #[tokio::test]
    async fn test_downloads_into_deterministic_layout() {
        let dir = TempDir::new().unwrap();
        let (manager, transport) = manager(dir.path(), 3, two_page_service);

        let outcomes = manager.download_item(&sunset()).await;

        assert_eq!(
            statuses(&outcomes),
            vec![DownloadStatus::Success, DownloadStatus::Success]
        );
        let item_dir = dir.path().join("Art Person").join("123_Sunset");
        assert_eq!(outcomes[0].target.local_path, item_dir.join("p0.png"));
        assert_eq!(outcomes[1].target.local_path, item_dir.join("p1.jpg"));
        assert_eq!(std::fs::read(item_dir.join("p0.png")).unwrap(), IMAGE);
        assert_eq!(transport.call_count(), 3);
    }

    #[tokio::test]
    async fn test_second_run_skips_without_network() {
        let dir = TempDir::new().unwrap();
        let (manager, transport) = manager(dir.path(), 3, sized_service);
        let items = vec![sunset(), ItemRef::new("456", "Dawn", "Other", 1)];

        let first = manager.download(&items).await;
        assert_eq!(first.summary.success, 3);
        assert_eq!(first.summary.failed, 0);
        let calls_after_first = transport.call_count();

        let second = manager.download(&items).await;

        assert_eq!(transport.call_count(), calls_after_first);
        assert_eq!(second.summary.skipped, first.summary.success);
        assert_eq!(
            second.summary,
            DownloadSummary {
                items: 2,
                success: 0,
                skipped: 3,
                failed: 0
            }
        );
        assert!(second
            .outcomes
            .iter()
            .all(|o| o.status == DownloadStatus::Skipped(SkipReason::AlreadyDownloaded)));
        assert_eq!(
            second.outcomes[1].target.local_path,
            first.outcomes[1].target.local_path
        );
    }

    #[tokio::test]
    async fn test_existing_page_is_skipped_individually() {
        let dir = TempDir::new().unwrap();
        let item_dir = dir.path().join("Art Person").join("123_Sunset");
        std::fs::create_dir_all(&item_dir).unwrap();
        std::fs::write(item_dir.join("p0.png"), b"already here").unwrap();

        let (manager, transport) = manager(dir.path(), 3, two_page_service);
        let outcomes = manager.download_item(&sunset()).await;

        assert_eq!(
            statuses(&outcomes),
            vec![
                DownloadStatus::Skipped(SkipReason::AlreadyDownloaded),
                DownloadStatus::Success
            ]
        );
        // Page list plus the missing page only
        assert_eq!(transport.call_count(), 2);
        assert_eq!(
            std::fs::read(item_dir.join("p0.png")).unwrap(),
            b"already here"
        );
    }

    #[tokio::test]
    async fn test_empty_file_is_not_complete() {
        let dir = TempDir::new().unwrap();
        let item_dir = dir.path().join("Art Person").join("123_Sunset");
        std::fs::create_dir_all(&item_dir).unwrap();
        std::fs::write(item_dir.join("p0.png"), b"").unwrap();
        std::fs::write(item_dir.join("p1.jpg"), b"ok").unwrap();

        let (manager, _) = manager(dir.path(), 3, two_page_service);
        let outcomes = manager.download_item(&sunset()).await;

        assert_eq!(outcomes[0].status, DownloadStatus::Success);
        assert_eq!(std::fs::read(item_dir.join("p0.png")).unwrap(), IMAGE);
    }

    fn flaky_media(failures: usize) -> impl Fn(&Url, usize) -> Result<RawResponse, TransportError> {
        move |url: &Url, previous: usize| match illust_id(url) {
            Some(id) => json(pages_body(&id, &["png"])),
            None if previous < failures => status(503),
            None => bytes(IMAGE),
        }
    }

    #[tokio::test]
    async fn test_retry_bound_allows_exactly_n_attempts() {
        let n = 3;
        let dir = TempDir::new().unwrap();
        let (manager, transport) = manager(dir.path(), n, flaky_media(n as usize - 1));
        let item = ItemRef::new("1", "Flaky", "Artist", 1);

        let outcomes = manager.download_item(&item).await;

        assert_eq!(statuses(&outcomes), vec![DownloadStatus::Success]);
        let media_calls = transport
            .called_urls()
            .iter()
            .filter(|u| is_media(u))
            .count();
        assert_eq!(media_calls, n as usize);
    }

    #[tokio::test]
    async fn test_retry_bound_fails_with_one_attempt_less() {
        let n = 3;
        let dir = TempDir::new().unwrap();
        let (manager, transport) = manager(dir.path(), n - 1, flaky_media(n as usize - 1));
        let item = ItemRef::new("1", "Flaky", "Artist", 1);

        let outcomes = manager.download_item(&item).await;

        assert_eq!(
            statuses(&outcomes),
            vec![DownloadStatus::Failed(FetchError::Status(503))]
        );
        let media_calls = transport
            .called_urls()
            .iter()
            .filter(|u| is_media(u))
            .count();
        assert_eq!(media_calls, n as usize - 1);
    }

    #[tokio::test]
    async fn test_failed_item_does_not_stop_batch() {
        let dir = TempDir::new().unwrap();
        let (manager, transport) = manager(dir.path(), 3, |url, _| match illust_id(url) {
            Some(id) if id == "2" => status(404),
            Some(id) => json(pages_body(&id, &["jpg"])),
            None => bytes(IMAGE),
        });
        let items = vec![
            ItemRef::new("1", "One", "Artist", 1),
            ItemRef::new("2", "Two", "Artist", 1),
            ItemRef::new("3", "Three", "Artist", 1),
        ];

        let report = manager.download(&items).await;

        assert_eq!(
            statuses(&report.outcomes),
            vec![
                DownloadStatus::Success,
                DownloadStatus::Failed(FetchError::Status(404)),
                DownloadStatus::Success
            ]
        );
        assert_eq!(report.summary.failed, 1);
        assert_eq!(report.summary.success, 2);
        // 404 on the page list is not retried
        assert_eq!(transport.call_count(), 5);
        assert_eq!(report.outcomes[1].target.url, None);
    }

    #[tokio::test]
    async fn test_missing_media_is_not_retried() {
        let dir = TempDir::new().unwrap();
        let (manager, transport) = manager(dir.path(), 5, |url, _| match illust_id(url) {
            Some(id) => json(pages_body(&id, &["jpg"])),
            None => status(404),
        });
        let item = ItemRef::new("1", "Gone", "Artist", 1);

        let outcomes = manager.download_item(&item).await;

        assert_eq!(
            statuses(&outcomes),
            vec![DownloadStatus::Failed(FetchError::Status(404))]
        );
        assert_eq!(transport.call_count(), 2);
        assert!(!outcomes[0].target.local_path.exists());
    }

    #[tokio::test]
    async fn test_no_partial_files_left_behind() {
        let dir = TempDir::new().unwrap();
        let (manager, _) = manager(dir.path(), 3, two_page_service);

        manager.download_item(&sunset()).await;

        let item_dir = dir.path().join("Art Person").join("123_Sunset");
        let mut names: Vec<String> = std::fs::read_dir(&item_dir)
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        names.sort();
        assert_eq!(names, vec![".complete", "p0.png", "p1.jpg"]);
    }

    #[tokio::test]
    async fn test_stale_partial_files_are_removed() {
        let dir = TempDir::new().unwrap();
        let item_dir = dir.path().join("Art Person").join("123_Sunset");
        std::fs::create_dir_all(&item_dir).unwrap();
        std::fs::write(item_dir.join("p1.jpg.deadbeef.part"), b"interrupted").unwrap();

        let (manager, _) = manager(dir.path(), 3, two_page_service);
        manager.download_item(&sunset()).await;

        assert!(!item_dir.join("p1.jpg.deadbeef.part").exists());
        assert_eq!(std::fs::read(item_dir.join("p1.jpg")).unwrap(), IMAGE);
    }

    #[tokio::test]
    async fn test_incomplete_item_is_resumed_when_listing_undercounts() {
        let dir = TempDir::new().unwrap();
        // Listing says one page, the page list has two and p1 fails once
        let (manager, transport) = manager(dir.path(), 1, |url: &Url, previous: usize| {
            match illust_id(url) {
                Some(id) => json(pages_body(&id, &["png", "jpg"])),
                None if url.path().ends_with("_p1.jpg") && previous == 0 => status(503),
                None => bytes(IMAGE),
            }
        });
        let item = ItemRef::new("7", "Multi", "A", 1);
        let item_dir = dir.path().join("A").join("7_Multi");

        let first = manager.download_item(&item).await;
        assert_eq!(
            statuses(&first),
            vec![
                DownloadStatus::Success,
                DownloadStatus::Failed(FetchError::Status(503))
            ]
        );
        assert!(!item_dir.join(".complete").exists());
        let calls_after_first = transport.call_count();

        let second = manager.download_item(&item).await;

        assert!(transport.call_count() > calls_after_first);
        assert_eq!(
            statuses(&second),
            vec![
                DownloadStatus::Skipped(SkipReason::AlreadyDownloaded),
                DownloadStatus::Success
            ]
        );
        assert_eq!(std::fs::read(item_dir.join("p1.jpg")).unwrap(), IMAGE);

        // Complete now, so a third run stays off the network
        let calls_after_second = transport.call_count();
        let third = manager.download_item(&item).await;
        assert_eq!(transport.call_count(), calls_after_second);
        assert_eq!(third.len(), 2);
    }

    #[tokio::test]
    async fn test_write_error_fails_only_that_item() {
        let dir = TempDir::new().unwrap();
        // A file where the author directory should go
        std::fs::write(dir.path().join("Blocked"), b"not a directory").unwrap();

        let (manager, _) = manager(dir.path(), 3, |url, _| match illust_id(url) {
            Some(id) => json(pages_body(&id, &["jpg"])),
            None => bytes(IMAGE),
        });
        let items = vec![
            ItemRef::new("1", "One", "Blocked", 1),
            ItemRef::new("2", "Two", "Open", 1),
        ];

        let report = manager.download(&items).await;

        assert!(matches!(
            report.outcomes[0].status,
            DownloadStatus::Failed(FetchError::Io(_))
        ));
        assert_eq!(report.outcomes[1].status, DownloadStatus::Success);
    }

    #[tokio::test]
    async fn test_every_request_is_rate_limited() {
        let dir = TempDir::new().unwrap();
        let delay = Duration::from_secs(1);
        let (api, transport, _) = fake_api(delay, two_page_service);
        let manager = DownloadManager::new(api, RetryPolicy::new(3, delay), dir.path());

        manager.download_item(&sunset()).await;

        let times = transport.call_times();
        assert_eq!(times.len(), 3);
        for pair in times.windows(2) {
            assert!(pair[1] - pair[0] >= delay);
        }
    }
}
