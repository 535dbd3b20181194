//! Ranking mode and search order definitions.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Ranking periods supported by the listing resolver.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RankingMode {
    Daily,
    Weekly,
    /// Default, matching the original command line.
    #[default]
    Monthly,
}

impl RankingMode {
    /// Value of the `mode` query parameter.
    pub fn as_param(&self) -> &'static str {
        match self {
            RankingMode::Daily => "daily",
            RankingMode::Weekly => "weekly",
            RankingMode::Monthly => "monthly",
        }
    }
}

impl fmt::Display for RankingMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_param())
    }
}

impl FromStr for RankingMode {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "daily" => Ok(RankingMode::Daily),
            "weekly" => Ok(RankingMode::Weekly),
            "monthly" => Ok(RankingMode::Monthly),
            _ => Err(format!("Unknown ranking mode: {}", s)),
        }
    }
}

/// Search result ordering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SortOrder {
    /// Newest first (`date_d`).
    #[default]
    #[serde(rename = "date_d")]
    DateDesc,
    /// Oldest first (`date`).
    #[serde(rename = "date")]
    DateAsc,
    /// Most popular first (`popular_d`, premium accounts only).
    #[serde(rename = "popular_d")]
    PopularDesc,
}

impl SortOrder {
    /// Value of the `order` query parameter.
    pub fn as_param(&self) -> &'static str {
        match self {
            SortOrder::DateDesc => "date_d",
            SortOrder::DateAsc => "date",
            SortOrder::PopularDesc => "popular_d",
        }
    }
}

impl fmt::Display for SortOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_param())
    }
}

impl FromStr for SortOrder {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "date_d" | "newest" => Ok(SortOrder::DateDesc),
            "date" | "oldest" => Ok(SortOrder::DateAsc),
            "popular_d" | "popular" => Ok(SortOrder::PopularDesc),
            _ => Err(format!("Unknown sort order: {}", s)),
        }
    }
}
