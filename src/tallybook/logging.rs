//! Logging bootstrap.
//!
//! The library only talks to the `log` facade. Binaries call [`init_logging`]
//! once to route records to stderr through `flexi_logger`. `RUST_LOG`, when
//! set, takes precedence over the requested level.

use flexi_logger::{Logger, LoggerHandle};
use log::debug;
use once_cell::sync::OnceCell;

static LOGGER: OnceCell<LoggerHandle> = OnceCell::new();

/// Level used when neither `--verbose` nor `RUST_LOG` say otherwise.
pub const DEFAULT_LEVEL: &str = "warn";
pub const VERBOSE_LEVEL: &str = "debug";

/// Start the stderr logger. Repeated calls are no-ops; failures are
/// returned as a message instead of panicking.
pub fn init_logging(verbose: bool) -> Result<(), String> {
    let level = if verbose { VERBOSE_LEVEL } else { DEFAULT_LEVEL };
    LOGGER
        .get_or_try_init(|| {
            let handle = Logger::try_with_env_or_str(level)
                .map_err(|err| format!("invalid log level `{level}`: {err}"))?
                .log_to_stderr()
                .format(flexi_logger::default_format)
                .start()
                .map_err(|err| format!("failed to start logger: {err}"))?;
            debug!("logging started at level {level}");
            Ok(handle)
        })
        .map(|_| ())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn init_is_idempotent() {
        assert!(init_logging(false).is_ok());
        assert!(init_logging(true).is_ok());
        assert!(LOGGER.get().is_some());
    }
}
