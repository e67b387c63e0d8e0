use dbsdk_rs::db;
use log::{LevelFilter, Log, Metadata, Record, SetLoggerError};

/// Forwards `log` records to the console's debug log
struct DbLogger;

impl Log for DbLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= log::max_level()
    }

    fn log(&self, record: &Record) {
        if self.enabled(record.metadata()) {
            db::log(format!("[{}] {}: {}", record.level(), record.target(), record.args()).as_str());
        }
    }

    fn flush(&self) {}
}

static LOGGER: DbLogger = DbLogger;

pub fn init(level: LevelFilter) -> Result<(), SetLoggerError> {
    log::set_logger(&LOGGER)?;
    log::set_max_level(level);
    Ok(())
}
