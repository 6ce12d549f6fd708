//! prometheus metrics about received batches and outgoing pushes
//!
//! Counters are registered lazily in the default registry and exposed via
//! the `/metrics` route.

use once_cell::sync::Lazy;
use prometheus::{opts, register_int_counter_vec, IntCounterVec};

#[allow(clippy::expect_used)]
pub static RECEIVED_BATCHES: Lazy<IntCounterVec> = Lazy::new(|| {
    register_int_counter_vec!(
        opts!("received_batches", "total number of deserialized alert batches")
            .namespace("gong")
            .subsystem("webhook"),
        &["provider", "env"]
    )
    .expect("received_batches registered once")
});

#[allow(clippy::expect_used)]
pub static SENT_MESSAGES: Lazy<IntCounterVec> = Lazy::new(|| {
    register_int_counter_vec!(
        opts!("sent_messages", "total number of messages pushed to chat providers")
            .namespace("gong")
            .subsystem("notifier"),
        &["provider", "env"]
    )
    .expect("sent_messages registered once")
});

#[allow(clippy::expect_used)]
pub static DELIVERY_ERRORS: Lazy<IntCounterVec> = Lazy::new(|| {
    register_int_counter_vec!(
        opts!("delivery_errors", "pushes that failed in transport or were rejected")
            .namespace("gong")
            .subsystem("notifier"),
        &["provider", "env"]
    )
    .expect("delivery_errors registered once")
});
