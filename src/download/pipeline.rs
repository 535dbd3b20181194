//! Listing-to-disk pipeline.

use futures::{pin_mut, TryStreamExt};
use indicatif::ProgressBar;

use crate::download::manager::DownloadManager;
use crate::download::state::DownloadReport;
use crate::error::Result;
use crate::resolver::{QueryDescriptor, Resolver};

/// Resolve `query` and download each item as soon as it is listed.
///
/// The next listing page is only requested once every item of the current
/// page has been handled. Outcomes keep listing order.
pub async fn run_query(
    resolver: &Resolver,
    manager: &DownloadManager,
    query: &QueryDescriptor,
    progress: Option<&ProgressBar>,
) -> Result<DownloadReport> {
    tracing::info!("Starting {}", query);

    let items = resolver.resolve(query);
    pin_mut!(items);

    let mut report = DownloadReport::default();
    while let Some(item) = items.try_next().await? {
        if let Some(pb) = progress {
            pb.set_message(format!("{} - {}", item.id, item.title));
        }

        report.push_item(manager.download_item(&item).await);

        if let Some(pb) = progress {
            pb.inc(1);
        }
    }

    let summary = &report.summary;
    tracing::info!(
        "Finished {}: {} items, {} downloaded, {} skipped, {} failed",
        query,
        summary.items,
        summary.success,
        summary.skipped,
        summary.failed
    );

    Ok(report)
}
