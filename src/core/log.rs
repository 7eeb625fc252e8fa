use tracing_subscriber::{
    EnvFilter, fmt, prelude::__tracing_subscriber_SubscriberExt, util::SubscriberInitExt,
};

const APP_TARGET: &str = "cambio";

/// Filter directive applied when `RUST_LOG` is not set.
fn default_directive(verbose: bool) -> String {
    if verbose {
        format!("warn,{APP_TARGET}=debug")
    } else {
        "off".to_string()
    }
}

/// Installs the global subscriber on stderr. Quiet unless `verbose` or `RUST_LOG` is set.
pub fn init_logging(verbose: bool) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directive(verbose)));
    let layer = fmt::layer()
        .pretty()
        .without_time()
        .with_target(verbose)
        .with_writer(std::io::stderr);

    if let Err(e) = tracing_subscriber::registry()
        .with(layer)
        .with(filter)
        .try_init()
    {
        eprintln!("Logging was already initialized: {e}");
    }
}
