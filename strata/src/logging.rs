use std::sync::OnceLock;

use log::LevelFilter;
use simplelog::{ColorChoice, Config, TermLogger, TerminalMode};

static LOGGER_INIT: OnceLock<()> = OnceLock::new();

/// Log to stderr at `level`.
///
/// Optional: without it, Strata's log records go to whatever logger the application installs, or
/// nowhere. Only the first call has an effect.
pub fn init_logging(level: LevelFilter) {
    LOGGER_INIT.get_or_init(|| {
        TermLogger::init(
            level,
            Config::default(),
            TerminalMode::Stderr,
            ColorChoice::Auto,
        )
        .ok();
    });
}
