//! nhelper-domain
//!
//! Pure report and record models (time windows, task facts, bill facts,
//! report documents, record drafts). No I/O, no HTTP, no configuration.
//! Only data types and core enums.

pub mod bill;
pub mod common;
pub mod document;
pub mod records;
pub mod task;
pub mod window;

pub use bill::*;
pub use common::*;
pub use document::*;
pub use records::*;
pub use task::*;
pub use window::*;
