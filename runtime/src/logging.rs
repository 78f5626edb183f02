use std::io::{self, IsTerminal};

use tracing_subscriber::util::TryInitError;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Registry};

/// Install the global subscriber.
///
/// `verbose_level` 0 = info, 1 = debug with hyper's connection chatter
/// suppressed, 2+ = trace. `RUST_LOG` wins when set. Output is JSON when
/// `RUST_LOG_JSON=true` or stderr is not a terminal (device log capture).
pub fn init_logging(verbose_level: u8) -> Result<(), TryInitError> {
    let default_filter = match verbose_level {
        0 => "info",
        1 => "debug,hyper_util=warn,hyper::proto=warn",
        _ => "trace",
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    let json = std::env::var("RUST_LOG_JSON")
        .map(|v| v == "true")
        .unwrap_or_else(|_| !io::stderr().is_terminal());

    let registry = Registry::default().with(filter);
    if json {
        registry
            .with(fmt::layer().json().with_writer(io::stderr))
            .try_init()
    } else {
        registry.with(fmt::layer().with_writer(io::stderr)).try_init()
    }
}
