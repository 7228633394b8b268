pub mod application;
pub mod cli;
pub mod domain;
pub mod io;
pub mod storage;

use std::sync::Once;

use tracing_subscriber::EnvFilter;

pub use application::{Document, ServiceError, Services};
pub use domain::*;

static TRACING: Once = Once::new();

/// Install the global fmt subscriber. `RUST_LOG` wins over `default_directive`;
/// later calls are no-ops.
pub fn init_tracing(default_directive: &str) {
    TRACING.call_once(|| {
        let filter = EnvFilter::try_from_default_env()
            .or_else(|_| EnvFilter::try_new(default_directive))
            .unwrap_or_else(|_| EnvFilter::new("gogoaccount=info"));
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .try_init()
            .ok();
    });
}
