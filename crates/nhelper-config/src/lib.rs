//! nhelper-config
//!
//! Service configuration model.
//! Owns the Config data structure, disk persistence and the environment overlay.

pub mod error;
pub mod manager;
pub mod model;

pub use error::ConfigError;
pub use manager::ConfigManager;
pub use model::{
    CalendarSettings, Config, CozeSettings, DatabaseIds, NotionSettings, ReportPresentation,
    ServerSettings, WeekStart,
};
