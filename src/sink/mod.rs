// Copyright 2025
// Licensed under the Elastic License v2.0

mod console;
mod daily_file;
mod record;

use anyhow::Result;
use std::path::Path;

pub use console::Console;
pub use daily_file::DailyLogFile;
pub use record::{LogLevel, LogRecord};

/// Destino de registros de log
pub trait LogSink: Send {
    fn write(&mut self, record: &LogRecord) -> Result<()>;
}

/// Logger de doble canal: fichero (info.log / error.log) + consola.
///
/// Info va a `info.log`; Warning, Error y Critical a `error.log`.
pub struct Logger {
    info: DailyLogFile,
    error: DailyLogFile,
    console: Console,
}

impl Logger {
    /// Abrir los dos ficheros bajo `root`. Un fallo aquí es fatal para el proceso.
    pub fn open(root: &Path, rotate: bool, color: bool) -> Result<Self> {
        Self::with_console(root, rotate, Console::stdio(color))
    }

    pub fn with_console(root: &Path, rotate: bool, console: Console) -> Result<Self> {
        let info = DailyLogFile::open(root, "info", rotate)?;
        let error = DailyLogFile::open(root, "error", rotate)?;
        log::debug!("Logging to {} and {}", info.path().display(), error.path().display());
        Ok(Self { info, error, console })
    }

    /// Escribir un registro en su fichero y en consola.
    /// Los fallos de escritura no se propagan: se reportan por `log` y se sigue.
    pub fn record(&mut self, record: &LogRecord) {
        let file = match record.level {
            LogLevel::Info => &mut self.info,
            LogLevel::Warning | LogLevel::Error | LogLevel::Critical => &mut self.error,
        };
        if let Err(e) = file.write(record) {
            log::error!("Log file write failed: {:#}", e);
        }
        if let Err(e) = self.console.write(record) {
            log::error!("Console write failed: {:#}", e);
        }
    }

    pub fn log(&mut self, level: LogLevel, message: impl Into<String>) {
        self.record(&LogRecord::new(level, message));
    }

    pub fn info(&mut self, message: impl Into<String>) {
        self.log(LogLevel::Info, message);
    }

    pub fn warning(&mut self, message: impl Into<String>) {
        self.log(LogLevel::Warning, message);
    }

    pub fn error(&mut self, message: impl Into<String>) {
        self.log(LogLevel::Error, message);
    }

    pub fn critical(&mut self, message: impl Into<String>) {
        self.log(LogLevel::Critical, message);
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use chrono::Local;
    use std::fs;
    use tempfile::TempDir;

    pub(crate) use super::console::tests::SharedBuf;

    /// Logger sobre un directorio temporal con consola capturada
    pub(crate) fn test_logger(root: &Path) -> (Logger, SharedBuf, SharedBuf) {
        let (console, out, err) = super::console::tests::captured(false);
        let logger = Logger::with_console(root, true, console).unwrap();
        (logger, out, err)
    }

    pub(crate) fn read_log(root: &Path, kind: &str) -> String {
        let dir = root.join(Local::now().format("%Y-%m-%d").to_string());
        fs::read_to_string(dir.join(format!("{}.log", kind))).unwrap_or_default()
    }

    #[test]
    fn test_open_creates_both_files() {
        let tmp = TempDir::new().unwrap();
        let _logger = test_logger(tmp.path());
        let dir = tmp.path().join(Local::now().format("%Y-%m-%d").to_string());
        assert!(dir.join("info.log").exists());
        assert!(dir.join("error.log").exists());
    }

    #[test]
    fn test_routes_levels_to_files() {
        let tmp = TempDir::new().unwrap();
        let (mut logger, out, err) = test_logger(tmp.path());

        logger.info("cycle start");
        logger.warning("io thread down");
        logger.critical("cannot connect");

        let info = read_log(tmp.path(), "info");
        let error = read_log(tmp.path(), "error");
        assert!(info.contains("[INFO] cycle start"));
        assert!(!info.contains("io thread down"));
        assert!(error.contains("[WARNING] io thread down"));
        assert!(error.contains("[CRITICAL] cannot connect"));

        assert!(out.contents().contains("io thread down"));
        assert!(err.contents().contains("cannot connect"));
    }
}
