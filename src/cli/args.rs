//! Command-line argument definitions using clap.

use chrono::NaiveDate;
use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

use crate::config::{parse_ranking_date, Config, RankingMode, SortOrder};
use crate::error::{Error, Result};
use crate::resolver::QueryDescriptor;

/// pixiv illustration downloader CLI.
#[derive(Parser, Debug)]
#[command(
    name = "pixiv-downloader",
    version,
    about = "Download illustrations from pixiv searches and rankings",
    long_about = "A CLI tool to download pixiv illustrations by keyword search or ranking.\n\n\
                  Files are stored as <output>/<author>/<id>_<title>/p<N>.<ext>; \
                  re-running a command skips everything already on disk."
)]
pub struct Args {
    /// Path to configuration file.
    #[arg(short, long, default_value = "config.toml", global = true)]
    pub config: PathBuf,

    /// Enable debug logging.
    #[arg(long, global = true)]
    pub debug: bool,

    /// Only log warnings and errors, and hide the progress spinner.
    #[arg(long, short, global = true)]
    pub quiet: bool,

    /// Seconds to wait between requests.
    #[arg(long, global = true)]
    pub delay: Option<f64>,

    /// Attempts per request, including the first.
    #[arg(long, global = true)]
    pub retries: Option<u32>,

    /// Per-request timeout in seconds.
    #[arg(long, global = true)]
    pub timeout: Option<u64>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone, PartialEq)]
pub enum Command {
    /// Download illustrations matching a keyword.
    Search {
        /// Keyword or tag to search for.
        keyword: String,

        /// Maximum number of result pages to walk.
        #[arg(short = 'p', long)]
        max_pages: Option<u32>,

        /// Base directory for downloads.
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Result order.
        #[arg(long, value_enum, default_value_t = SortOrderArg::DateD)]
        order: SortOrderArg,
    },

    /// Download a daily, weekly or monthly ranking.
    Ranking {
        /// Ranking period.
        #[arg(short, long, value_enum, default_value_t = RankingModeArg::Monthly)]
        mode: RankingModeArg,

        /// Last day of the ranking (YYYYMMDD or YYYY-MM-DD). Defaults to yesterday.
        #[arg(short, long)]
        date: Option<String>,

        /// Base directory for downloads.
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Generate or display the configuration file.
    Config {
        /// Write a default configuration file to the --config path.
        #[arg(long)]
        generate: bool,

        /// Print the effective configuration.
        #[arg(long)]
        show: bool,
    },
}

/// CLI ranking mode argument.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum RankingModeArg {
    Daily,
    Weekly,
    Monthly,
}

impl From<RankingModeArg> for RankingMode {
    fn from(arg: RankingModeArg) -> Self {
        match arg {
            RankingModeArg::Daily => RankingMode::Daily,
            RankingModeArg::Weekly => RankingMode::Weekly,
            RankingModeArg::Monthly => RankingMode::Monthly,
        }
    }
}

/// CLI search order argument.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum SortOrderArg {
    /// Newest first.
    #[value(name = "date_d")]
    DateD,
    /// Oldest first.
    #[value(name = "date")]
    Date,
    /// Most popular first (premium accounts only).
    #[value(name = "popular_d")]
    PopularD,
}

impl From<SortOrderArg> for SortOrder {
    fn from(arg: SortOrderArg) -> Self {
        match arg {
            SortOrderArg::DateD => SortOrder::DateDesc,
            SortOrderArg::Date => SortOrder::DateAsc,
            SortOrderArg::PopularD => SortOrder::PopularDesc,
        }
    }
}

impl Args {
    /// Merge CLI arguments into an existing config, overriding where specified.
    pub fn merge_into_config(&self, config: &mut Config) {
        if let Some(delay) = self.delay {
            config.download.delay = delay;
        }

        if let Some(retries) = self.retries {
            config.download.retry_times = retries;
        }

        if let Some(timeout) = self.timeout {
            config.download.timeout = timeout;
        }

        match &self.command {
            Command::Search {
                max_pages, output, ..
            } => {
                if let Some(max_pages) = max_pages {
                    config.download.max_pages = *max_pages;
                }
                if let Some(output) = output {
                    config.download.output_dir = output.clone();
                }
            }
            Command::Ranking {
                output: Some(output),
                ..
            } => {
                config.download.output_dir = output.clone();
            }
            _ => {}
        }
    }
}

impl Command {
    /// Build the listing query for a download command.
    ///
    /// `today` resolves the default ranking date (yesterday). Returns
    /// `Ok(None)` for the `config` command.
    pub fn to_query(&self, config: &Config, today: NaiveDate) -> Result<Option<QueryDescriptor>> {
        match self {
            Command::Search { keyword, order, .. } => Ok(Some(QueryDescriptor::keyword(
                keyword,
                (*order).into(),
                config.download.max_pages,
            )?)),
            Command::Ranking { mode, date, .. } => {
                let reference_date = match date {
                    Some(date) => parse_ranking_date(date)?,
                    None => today.pred_opt().ok_or_else(|| {
                        Error::InvalidQuery(format!("No day before {}", today))
                    })?,
                };
                Ok(Some(QueryDescriptor::ranking((*mode).into(), reference_date)))
            }
            Command::Config { .. } => Ok(None),
        }
    }
}
