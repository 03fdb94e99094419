//! Tracing setup for pack/deploy runs.
//!
//! Progress lines (module import, command responses) are emitted at `info`,
//! so a CI build log shows the same milestones the shell session goes
//! through. Set `RUST_LOG` to tighten or widen the filter.

use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Initialize the tracing subscriber.
///
/// Reads `RUST_LOG`. Defaults to `info` if unset. Output: stderr, compact
/// format.
pub fn init() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr).compact())
        .init();
}
