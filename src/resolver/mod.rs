//! Listing resolution.
//!
//! Turns a keyword search or a ranking request into a lazy sequence of
//! unique illustration references.

pub mod listing;
pub mod query;

pub use listing::{ListingCursor, Resolver};
pub use query::{QueryDescriptor, RankingWindow};
