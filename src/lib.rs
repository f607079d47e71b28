pub mod access;
pub mod billing;
pub mod board;
pub mod config;
pub mod error;
pub mod format;
pub mod residents;
pub mod store;

#[cfg(test)]
mod fixtures;

pub use access::Actor;
pub use config::{Config, Session};
pub use error::{Result, SocietyError};
pub use store::{Database, Store};

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Initialize tracing with the SOCIETY_LOG environment variable.
///
/// Defaults to "warn" so command output stays readable. Logs go to stderr.
pub fn init_tracing() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_env("SOCIETY_LOG")
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}
