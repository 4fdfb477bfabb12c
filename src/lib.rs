#[allow(non_snake_case)]
pub mod Reactions;
#[allow(non_snake_case)]
pub mod Specie;
pub mod config;
pub mod database;
pub mod selection;

use log::LevelFilter;
use simplelog::{ColorChoice, Config as LogConfig, TermLogger, TerminalMode};

/// Initialize terminal logging for binaries and examples. Safe to call more
/// than once; only the first call installs the logger.
pub fn init_logging(level: LevelFilter) {
    let _ = TermLogger::init(
        level,
        LogConfig::default(),
        TerminalMode::Mixed,
        ColorChoice::Auto,
    );
}
