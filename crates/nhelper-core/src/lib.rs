//! nhelper-core
//!
//! Report pipeline and record services.
//! Depends on nhelper-domain. No HTTP, no configuration files; every external
//! system is reached through the traits in [`collaborators`].

pub mod bill_service;
pub mod collaborators;
pub mod composer;
pub mod entry_service;
pub mod error;
pub mod format;
pub mod records;
pub mod report_service;
pub mod schema;
pub mod task_service;
pub mod time;
pub mod window_service;

pub use bill_service::BillService;
pub use collaborators::*;
pub use composer::{ComposeOptions, ReportComposer};
pub use entry_service::{EntryCollections, EntryService};
pub use error::CoreError;
pub use records::RawRecord;
pub use report_service::{ReportRequest, ReportService, ReportSettings};
pub use task_service::TaskService;
pub use time::{Clock, FixedClock, SystemClock};
pub use window_service::{WindowService, WindowSettings};
