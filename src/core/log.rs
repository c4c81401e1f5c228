use tracing_subscriber::{
    EnvFilter, fmt, prelude::__tracing_subscriber_SubscriberExt, util::SubscriberInitExt,
};

/// Installs the global subscriber.
///
/// A set `RUST_LOG` replaces the default filter entirely, so it can both raise and lower
/// levels. Otherwise this crate logs at INFO (DEBUG with `verbose`) and everything else at WARN.
pub fn init_logging(verbose: bool) {
    let rust_log = std::env::var(EnvFilter::DEFAULT_ENV).ok();

    tracing_subscriber::registry()
        .with(fmt::layer().pretty().without_time())
        .with(log_filter(verbose, rust_log.as_deref()))
        .init();
}

fn log_filter(verbose: bool, rust_log: Option<&str>) -> EnvFilter {
    let default = if verbose {
        "warn,forex=debug"
    } else {
        "warn,forex=info"
    };
    match rust_log {
        Some(directives) if !directives.trim().is_empty() => {
            EnvFilter::try_new(directives).unwrap_or_else(|_| EnvFilter::new(default))
        }
        _ => EnvFilter::new(default),
    }
}
