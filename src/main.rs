#![warn(rust_2018_idioms)]
#![forbid(unsafe_code)]

#[macro_use]
extern crate slog;
#[macro_use]
extern crate slog_scope;

mod base85;
mod error;
mod extractors;
mod headers;
mod logging;
mod metrics;
mod routers;
mod routes;
mod server;
mod settings;
mod util;

use std::env;

use docopt::Docopt;
use serde::Deserialize;

use crate::error::{ApiErrorKind, ApiResult};

const USAGE: &str = "
Usage: pushbridge [options]

Options:
    -h, --help              Show this message
    --config=CONFIGFILE     Pushbridge configuration file path.
";

#[derive(Debug, Deserialize)]
struct Args {
    flag_config: Option<String>,
}

#[actix_web::main]
async fn main() -> ApiResult<()> {
    let args: Args = Docopt::new(USAGE)
        .and_then(|d| d.deserialize())
        .unwrap_or_else(|e| e.exit());
    let settings = settings::Settings::with_env_and_config_file(&args.flag_config)
        .map_err(|e| ApiErrorKind::Internal(format!("Configuration error: {e}")))?;
    logging::init_logging(
        !settings.human_logs,
        logging::get_default_hostname(settings::ENV_PREFIX),
    )?;
    debug!("Starting up...");

    // Sentry requires the environment variable "SENTRY_DSN".
    if env::var("SENTRY_DSN").unwrap_or_default().is_empty() {
        debug!("SENTRY_DSN not set. Error reporting disabled.");
    }
    let _guard = sentry::init(sentry::ClientOptions {
        release: sentry::release_name!(),
        ..Default::default()
    });

    let server = server::Server::with_settings(settings).await?;
    info!("Server started");
    server.await?;

    info!("Server closing");
    logging::reset_logging();
    Ok(())
}
