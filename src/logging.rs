//! Tracing subscriber setup for the CLI.

use tracing_subscriber::filter::EnvFilter;
use tracing_subscriber::fmt;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use crate::config::LOG_ENV;

/// Filter directive for the given `-v` count.
///
/// An explicit `-v` wins; otherwise `LABSYNC_LOG`, then `RUST_LOG`, then
/// `warn`.
#[must_use]
pub fn directive(verbosity: u8, lookup: impl Fn(&str) -> Option<String>) -> String {
    match verbosity {
        0 => {
            let set = |key: &str| lookup(key).filter(|d| !d.trim().is_empty());
            set(LOG_ENV).or_else(|| set("RUST_LOG")).unwrap_or_else(|| "warn".to_string())
        }
        1 => "info".to_string(),
        _ => "debug".to_string(),
    }
}

/// Installs a stderr subscriber. Later calls are ignored.
pub fn init(verbosity: u8) {
    let directive = directive(verbosity, |key| std::env::var(key).ok());
    let filter = EnvFilter::try_new(&directive).unwrap_or_else(|err| {
        eprintln!("invalid {LOG_ENV} directive ({err}); defaulting to warn");
        EnvFilter::new("warn")
    });

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
        .try_init()
        .ok();
}
