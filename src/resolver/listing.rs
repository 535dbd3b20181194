//! Lazy pagination over the listing endpoints.

use std::collections::{HashSet, VecDeque};
use std::fmt;
use std::sync::Arc;

use chrono::NaiveDate;
use futures::stream::{self, Stream};

use crate::api::{ListingPage, PixivApi, RANKING_MAX_PAGES};
use crate::config::{RankingMode, SortOrder};
use crate::download::retry::{Attempt, FetchError, RetryPolicy};
use crate::error::{Error, Result};
use crate::media::ItemRef;
use crate::resolver::query::{QueryDescriptor, RankingWindow};

/// Turns a [`QueryDescriptor`] into a sequence of unique [`ItemRef`]s.
#[derive(Debug, Clone)]
pub struct Resolver {
    api: Arc<PixivApi>,
    policy: RetryPolicy,
}

impl Resolver {
    pub fn new(api: Arc<PixivApi>, policy: RetryPolicy) -> Self {
        Self { api, policy }
    }

    /// Start a fresh cursor for `query`. No request is made until the
    /// first item is pulled.
    pub fn cursor(&self, query: &QueryDescriptor) -> ListingCursor {
        ListingCursor::new(self.api.clone(), self.policy.clone(), query)
    }

    /// Stream the items of `query`, fetching listing pages on demand.
    ///
    /// The stream is finite and ends after its first error.
    pub fn resolve(&self, query: &QueryDescriptor) -> impl Stream<Item = Result<ItemRef>> {
        stream::try_unfold(self.cursor(query), |mut cursor| async move {
            let next = cursor.next_item().await?;
            Ok::<_, Error>(next.map(|item| (item, cursor)))
        })
    }
}

/// Listing endpoint a cursor pages through.
#[derive(Debug, Clone)]
enum Source {
    Search { term: String, sort: SortOrder },
    Ranking { mode: RankingMode, date: NaiveDate },
}

impl Source {
    async fn fetch(&self, api: &PixivApi, page: u32) -> Attempt<ListingPage> {
        match self {
            Source::Search { term, sort } => api.fetch_search_page(term, *sort, page).await,
            Source::Ranking { mode, date } => api.fetch_ranking_page(*mode, *date, page).await,
        }
    }
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Source::Search { term, .. } => write!(f, "search '{}'", term),
            Source::Ranking { mode, date } => write!(f, "{} ranking {}", mode, date),
        }
    }
}

/// Pagination state of one resolver run.
#[derive(Debug)]
pub struct ListingCursor {
    api: Arc<PixivApi>,
    policy: RetryPolicy,
    source: Source,
    next_page: u32,
    last_page: u32,
    buffer: VecDeque<ItemRef>,
    seen: HashSet<String>,
    pages_parsed: u32,
    unparsable_pages: u32,
    failed_pages: u32,
    finished: bool,
}

impl ListingCursor {
    fn new(api: Arc<PixivApi>, policy: RetryPolicy, query: &QueryDescriptor) -> Self {
        let (source, last_page, finished) = match query {
            QueryDescriptor::Keyword {
                term,
                sort,
                max_pages,
            } => {
                let source = Source::Search {
                    term: term.clone(),
                    sort: *sort,
                };
                (source, *max_pages, *max_pages == 0)
            }
            QueryDescriptor::Ranking {
                mode,
                reference_date,
            } => {
                let window = RankingWindow::derive(*mode, *reference_date);
                let today = api.clock().today();
                let in_future = *reference_date > today;
                if in_future {
                    tracing::warn!(
                        "Ranking date {} is after today ({}), nothing to list",
                        reference_date,
                        today
                    );
                } else {
                    tracing::info!("Listing {} ranking for {}", mode, window);
                }

                let source = Source::Ranking {
                    mode: *mode,
                    date: window.end,
                };
                (source, RANKING_MAX_PAGES, in_future)
            }
        };

        Self {
            api,
            policy,
            source,
            next_page: 1,
            last_page,
            buffer: VecDeque::new(),
            seen: HashSet::new(),
            pages_parsed: 0,
            unparsable_pages: 0,
            failed_pages: 0,
            finished,
        }
    }

    /// Listing pages requested so far.
    pub fn pages_requested(&self) -> u32 {
        self.next_page - 1
    }

    /// Next unique item, or `None` once the listing is exhausted.
    ///
    /// Fails with [`Error::IncompatibleResponse`] if every page that came
    /// back during the run was unparsable.
    pub async fn next_item(&mut self) -> Result<Option<ItemRef>> {
        loop {
            if let Some(item) = self.buffer.pop_front() {
                return Ok(Some(item));
            }
            if self.finished {
                return self.finish();
            }
            self.fetch_next_page().await;
        }
    }

    /// End of the listing.
    ///
    /// The run is treated as an incompatible format only when every page
    /// that came back was unparsable. Pages lost to transport or status
    /// errors say nothing about the format, so any of them keeps the run
    /// an ordinary empty listing.
    fn finish(&mut self) -> Result<Option<ItemRef>> {
        if self.pages_parsed == 0 && self.unparsable_pages > 0 && self.failed_pages == 0 {
            let pages = std::mem::take(&mut self.unparsable_pages);
            return Err(Error::IncompatibleResponse(format!(
                "none of the {} listing page(s) fetched for {} could be parsed",
                pages, self.source
            )));
        }
        Ok(None)
    }

    async fn fetch_next_page(&mut self) {
        let page = self.next_page;
        if page > self.last_page {
            tracing::debug!("{}: page budget of {} reached", self.source, self.last_page);
            self.finished = true;
            return;
        }
        self.next_page += 1;

        let label = format!("{} page {}", self.source, page);
        let api = self.api.as_ref();
        let source = &self.source;
        let result = self
            .policy
            .run(api.clock(), &label, |_| source.fetch(api, page))
            .await;

        match result {
            Ok(listing) => self.accept_page(page, listing),
            Err(e) if e.is_end_of_data() => {
                tracing::debug!("{}: end of results ({})", label, e);
                self.finished = true;
            }
            Err(e @ FetchError::Status(401 | 403)) => {
                tracing::warn!("{}: access denied ({}), stopping", label, e);
                self.finished = true;
            }
            Err(FetchError::Parse(message)) => {
                tracing::warn!("{}: unparsable response, skipping page: {}", label, message);
                self.unparsable_pages += 1;
            }
            Err(e) => {
                tracing::warn!("{}: skipping page: {}", label, e);
                self.failed_pages += 1;
            }
        }
    }

    fn accept_page(&mut self, page: u32, listing: ListingPage) {
        self.pages_parsed += 1;

        if listing.items.is_empty() {
            tracing::debug!("{} page {} is empty, stopping", self.source, page);
            self.finished = true;
            return;
        }

        let received = listing.items.len();
        for item in listing.items {
            if self.seen.insert(item.id.clone()) {
                self.buffer.push_back(item);
            } else {
                tracing::debug!("Dropping duplicate item {}", item.id);
            }
        }

        tracing::info!(
            "Fetched {} page {}: {} items, {} new",
            self.source,
            page,
            received,
            self.buffer.len()
        );

        if !listing.has_next {
            self.finished = true;
        }
    }
}
