//! Logging setup.
//!
//! Simplified relative to the original desktop app's `setup_logger`: there is
//! no "frontend" target to separate out, and log files live wherever
//! `LOG_FILE` points rather than next to the executable. The terminal logger
//! always runs; the file logger is only added when `LOG_FILE` is set.

use anyhow::Context;
use simplelog::{
    ColorChoice, CombinedLogger, ConfigBuilder, LevelFilter, SharedLogger, TermLogger,
    TerminalMode, WriteLogger,
};
use std::fs::File;

use crate::config::Config;

pub fn setup_logger(config: &Config) -> anyhow::Result<()> {
    let term_config = ConfigBuilder::new().set_time_offset_to_local().unwrap().build();

    let mut loggers: Vec<Box<dyn SharedLogger>> = vec![TermLogger::new(
        LevelFilter::Info,
        term_config,
        TerminalMode::Mixed,
        ColorChoice::Auto,
    )];

    if let Some(path) = &config.log_file {
        let file = File::create(path)
            .with_context(|| format!("failed to create log file {path:?}"))?;
        let file_config = ConfigBuilder::new().set_time_offset_to_local().unwrap().build();
        loggers.push(WriteLogger::new(LevelFilter::Debug, file_config, file));
    }

    CombinedLogger::init(loggers).ok();
    log::info!("logging initialized");
    Ok(())
}
