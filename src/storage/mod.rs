//! Storage module for downloaded documents
//!
//! Downloaded files live directly in the destination directory; a file's presence
//! and modification time are the only persisted record of a crawl. This module
//! provides the directory operations the crawler and its callers need:
//!
//! - Creating the destination directory on demand
//! - Listing downloaded files, most recently modified first
//! - Resolving a file name for retrieval without escaping the directory

mod files;

pub use files::{count_files, ensure_dir, list_downloaded_files, open_file, resolve_file, StoredFile};
