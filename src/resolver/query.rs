//! Logical listing requests.

use std::fmt;

use chrono::{Days, NaiveDate};

use crate::config::{validate_keyword, RankingMode, SortOrder};
use crate::error::Result;

/// What to list. Immutable once built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueryDescriptor {
    /// Keyword search over `1..=max_pages`.
    Keyword {
        term: String,
        sort: SortOrder,
        max_pages: u32,
    },
    /// Ranking ending on `reference_date`.
    Ranking {
        mode: RankingMode,
        reference_date: NaiveDate,
    },
}

impl QueryDescriptor {
    /// Build a keyword query, rejecting blank terms.
    pub fn keyword(term: &str, sort: SortOrder, max_pages: u32) -> Result<Self> {
        Ok(QueryDescriptor::Keyword {
            term: validate_keyword(term)?,
            sort,
            max_pages,
        })
    }

    pub fn ranking(mode: RankingMode, reference_date: NaiveDate) -> Self {
        QueryDescriptor::Ranking {
            mode,
            reference_date,
        }
    }
}

impl fmt::Display for QueryDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QueryDescriptor::Keyword {
                term,
                sort,
                max_pages,
            } => write!(f, "search '{}' ({}, up to {} pages)", term, sort, max_pages),
            QueryDescriptor::Ranking {
                mode,
                reference_date,
            } => write!(
                f,
                "{} ranking {}",
                mode,
                RankingWindow::derive(*mode, *reference_date)
            ),
        }
    }
}

/// Inclusive date range covered by a ranking.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RankingWindow {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl RankingWindow {
    /// Window ending on `reference`: 30 days for monthly, 7 for weekly, 1 for daily.
    pub fn derive(mode: RankingMode, reference: NaiveDate) -> Self {
        let span = match mode {
            RankingMode::Monthly => 29,
            RankingMode::Weekly => 6,
            RankingMode::Daily => 0,
        };
        let start = reference
            .checked_sub_days(Days::new(span))
            .unwrap_or(NaiveDate::MIN);

        Self {
            start,
            end: reference,
        }
    }

    /// Number of days covered, both ends included.
    pub fn days(&self) -> i64 {
        (self.end - self.start).num_days() + 1
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }
}

impl fmt::Display for RankingWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.start == self.end {
            write!(f, "{}", self.end)
        } else {
            write!(f, "{} to {}", self.start, self.end)
        }
    }
}
