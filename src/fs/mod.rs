//! Filesystem module.
//!
//! Provides:
//! - Deterministic directory layout for downloaded pages
//! - Path component sanitisation

pub mod naming;
pub mod paths;

pub use naming::{sanitize_component, MAX_COMPONENT_CHARS};
pub use paths::{
    completed_page_count, ensure_output_root, find_existing_page, is_complete_file,
    item_directory, page_path, partial_path, remove_stale_partials, write_completion_marker,
};
