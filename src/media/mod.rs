//! Media module for item representation and URL helpers.

pub mod item;
pub mod parser;

pub use item::{ItemRef, MediaTarget};
pub use parser::extension_for_url;
