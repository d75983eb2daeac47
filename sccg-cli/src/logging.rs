use chrono::Local;
use log::{LevelFilter, Metadata, Record, SetLoggerError};

use crate::PROGRESS_BAR;

const LIBRARY_TARGET_PREFIX: &str = "sccg::";

/// Writes log records to the standard error, above the progress bar if it is
/// visible.
struct Logger;

impl Logger {
    /// `sccg::matching::global` becomes `matching::global`; targets outside
    /// the library are kept as they are.
    fn short_target<'a>(record: &'a Record) -> &'a str {
        let target = record.target();
        target
            .strip_prefix(LIBRARY_TARGET_PREFIX)
            .unwrap_or(target)
    }
}

impl log::Log for Logger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= log::max_level()
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }

        let msg = format!(
            "{} {:<5} [{}] {}",
            Local::now().format("%H:%M:%S%.3f"),
            record.level(),
            Self::short_target(record),
            record.args()
        );

        if PROGRESS_BAR.is_hidden() {
            eprintln!("{}", msg);
        } else {
            PROGRESS_BAR.println(msg);
        }
    }

    fn flush(&self) {}
}

static LOGGER: Logger = Logger;

pub fn init_logging(filter: LevelFilter) -> Result<(), SetLoggerError> {
    log::set_logger(&LOGGER)?;
    log::set_max_level(filter);

    Ok(())
}
