//! nhelper-notion
//!
//! Workspace API backend: database queries, page creation and block appends
//! over HTTP, the JSON wire encoding of documents, and the markdown converter.
//! Implements the record source and document publisher traits of nhelper-core.

pub mod client;
pub mod encode;
pub mod error;
pub mod markdown;

pub use client::{NotionClient, NotionClientSettings};
pub use error::NotionError;
pub use markdown::MarkdownBlocks;
