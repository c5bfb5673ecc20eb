#![doc(test(attr(deny(warnings))))]

//! Notion Helper exposes todo, bill and note records and the activity report
//! pipeline of a personal workspace over a small authenticated HTTP API.

pub mod errors;
pub mod requests;
pub mod server;
pub mod utils;

use std::sync::Once;

static INIT_TRACING: Once = Once::new();

/// Initializes global tracing and emits a startup info log.
pub fn init() {
    INIT_TRACING.call_once(|| {
        utils::init_tracing();
        tracing::info!("Notion Helper tracing initialized.");
    });
}
