pub mod application;
pub mod cli;
pub mod domain;
pub mod io;

pub use application::{WalletError, WalletService};
pub use domain::*;

use std::sync::Once;

static TRACING_INIT: Once = Once::new();

/// Initializes the global tracing subscriber with sensible defaults.
pub fn init_tracing() {
    TRACING_INIT.call_once(|| {
        use tracing_subscriber::{fmt, EnvFilter};

        let filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new("dailywallet=info"));

        fmt().with_env_filter(filter).init();
    });
}
