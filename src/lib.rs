#![doc(test(attr(deny(warnings))))]

//! Receipt Core offers the purchase, line-item, and warranty data primitives
//! that power list, detail, and dashboard views over an in-memory record set.

pub mod core;
pub mod derive;
pub mod domain;
pub mod errors;
pub mod money;
pub mod normalize;
pub mod query;
pub mod store;
pub mod summary;
pub mod utils;

use std::sync::Once;

static INIT_TRACING: Once = Once::new();

/// Initializes global tracing and emits a startup info log.
pub fn init() {
    INIT_TRACING.call_once(|| {
        utils::init_tracing();
        tracing::info!("Receipt Core tracing initialized.");
    });
}
