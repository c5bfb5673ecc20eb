//! nhelper-coze
//!
//! Workflow runner backend. Sends report figures to a hosted workflow and
//! reads back the narrative it writes. Implements the narrative generator
//! trait of nhelper-core.

pub mod client;
pub mod error;

pub use client::{CozeClient, CozeClientSettings};
pub use error::CozeError;
