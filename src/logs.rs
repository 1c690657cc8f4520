//! Logging setup.
//!
//! Library code logs through the `log` facade; binaries call [`init`] once.

use std::env;

use env_logger::Env;

/// Environment variable holding the log filter, e.g. `ALTFRONT_LOG=debug`.
pub const LOG_ENV: &str = "ALTFRONT_LOG";

/// Install the stderr logger.
///
/// Setting the `DEBUG` environment variable turns on debug output; otherwise
/// only warnings and errors are shown unless [`LOG_ENV`] says differently.
/// Calling this more than once is harmless.
///
/// # Returns
///
/// `true` if this call installed the logger.
pub fn init() -> bool {
    let default = if env::var_os("DEBUG").is_some() {
        "debug"
    } else {
        "warn"
    };
    env_logger::Builder::from_env(Env::new().filter_or(LOG_ENV, default))
        .format_timestamp(None)
        .try_init()
        .is_ok()
}
