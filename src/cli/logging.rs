use std::{env, io};

use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Install the stderr log subscriber.
///
/// `RUST_LOG` takes precedence over the verbosity flag.
pub fn init_logging(verbose: bool) {
    let default = if verbose { "strata=debug" } else { "strata=info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    let layer = fmt::layer()
        .without_time()
        .with_target(false)
        .with_ansi(env::var_os("NO_COLOR").is_none())
        .with_writer(io::stderr);

    // keep an already installed subscriber
    let _ = tracing_subscriber::registry().with(filter).with(layer).try_init();
}
