use tracing::subscriber::DefaultGuard;
use tracing_subscriber::filter::EnvFilter;
use tracing_subscriber::fmt;
use tracing_subscriber::layer::SubscriberExt;

/// Keeps a thread-local subscriber alive when a global one was already set.
pub struct LoggingGuard {
    _guard: Option<DefaultGuard>,
}

/// Logs go to stderr; stdout is reserved for the payload.
///
/// `BIVAR_LOG` wins over `RUST_LOG`; without either the level is `warn`, or
/// `debug` with `--verbose`.
pub fn init_logging(verbose: bool) -> LoggingGuard {
    let fallback = if verbose { "debug" } else { "warn" };
    let build_subscriber = || {
        let env_filter = EnvFilter::try_from_env("BIVAR_LOG")
            .or_else(|_| EnvFilter::try_from_default_env())
            .or_else(|_| EnvFilter::try_new(fallback))
            .unwrap_or_else(|_| EnvFilter::new("warn"));
        tracing_subscriber::registry().with(env_filter).with(
            fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false),
        )
    };

    let guard = match tracing::subscriber::set_global_default(build_subscriber()) {
        Ok(()) => None,
        Err(_) => Some(tracing::subscriber::set_default(build_subscriber())),
    };
    LoggingGuard { _guard: guard }
}
