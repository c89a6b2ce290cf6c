use std::path::Path;

use log::LevelFilter;
use log4rs::{
    append::console::ConsoleAppender,
    config::{Appender, Config, Root},
    encode::pattern::PatternEncoder,
};

use crate::LOG_CONFIG_PATH;

pub const HOST: &str = "HOST";
pub const PORT: &str = "PORT";

pub const VAR_ALADHAN_BASE_URL: &str = "ALADHAN_BASE_URL";
pub const VAR_GEOLOCATION_BASE_URL: &str = "GEOLOCATION_BASE_URL";
pub const VAR_FALLBACK_TIMEZONE: &str = "FALLBACK_TIMEZONE";
pub const VAR_DEFAULT_METHOD: &str = "DEFAULT_METHOD";
pub const VAR_UPSTREAM_TIMEOUT_SECS: &str = "UPSTREAM_TIMEOUT_SECS";
pub const VAR_LOG_LEVEL: &str = "LOG_LEVEL";

pub const ALL_VARS: [&str; 8] = [
    HOST,
    PORT,
    VAR_ALADHAN_BASE_URL,
    VAR_GEOLOCATION_BASE_URL,
    VAR_FALLBACK_TIMEZONE,
    VAR_DEFAULT_METHOD,
    VAR_UPSTREAM_TIMEOUT_SECS,
    VAR_LOG_LEVEL,
];

/// Uses `log4rs.yaml` when present, otherwise logs to stdout at `level`.
pub fn init_logging(level: LevelFilter) {
    if Path::new(LOG_CONFIG_PATH).exists() {
        match log4rs::init_file(LOG_CONFIG_PATH, Default::default()) {
            Ok(_) => return,
            Err(e) => eprintln!("Failed to load {LOG_CONFIG_PATH}, logging to stdout: {e}"),
        }
    }

    let stdout = ConsoleAppender::builder()
        .encoder(Box::new(PatternEncoder::new("{d(%Y-%m-%d %H:%M:%S)} {l} {t} - {m}{n}")))
        .build();
    let config = Config::builder()
        .appender(Appender::builder().build("stdout", Box::new(stdout)))
        .build(Root::builder().appender("stdout").build(level));

    match config {
        Ok(config) => {
            if let Err(e) = log4rs::init_config(config) {
                eprintln!("Failed to initialise logging: {e}");
            }
        }
        Err(e) => eprintln!("Invalid logging config: {e}"),
    }
}
