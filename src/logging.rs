use std::io;

use gethostname::gethostname;
use slog::{self, Drain};
use slog_mozlog_json::MozLogJson;

use crate::error::ApiResult;

/// Initialize logging.
///
/// This will generate either mozilla standardized JSON output or a more
/// "human readable" form, tagged with the provided hostname identifier.
pub fn init_logging(json: bool, hostname: String) -> ApiResult<()> {
    let logger = if json {
        let drain = MozLogJson::new(io::stdout())
            .logger_name(format!(
                "{}-{}",
                env!("CARGO_PKG_NAME"),
                env!("CARGO_PKG_VERSION")
            ))
            .msg_type(format!("{}:log", env!("CARGO_PKG_NAME")))
            .hostname(hostname)
            .build()
            .fuse();
        let drain = slog_async::Async::new(drain).build().fuse();
        slog::Logger::root(drain, slog_o!())
    } else {
        let decorator = slog_term::TermDecorator::new().build();
        let drain = slog_term::FullFormat::new(decorator).build().fuse();
        let drain = slog_async::Async::new(drain).build().fuse();
        slog::Logger::root(drain, slog_o!())
    };
    slog_scope::set_global_logger(logger).cancel_reset();
    slog_stdlog::init().ok();
    Ok(())
}

pub fn reset_logging() {
    let logger = slog::Logger::root(slog::Discard, o!());
    slog_scope::set_global_logger(logger).cancel_reset();
}

/// Use the runtime specific hostname identifier, falling back to the system
/// level hostname
pub fn get_default_hostname(prefix: &str) -> String {
    std::env::var(format!("{}_HOSTNAME", prefix.to_uppercase()))
        .unwrap_or_else(|_| gethostname().to_string_lossy().to_string())
}
