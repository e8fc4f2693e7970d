// Copyright 2025
// Licensed under the Elastic License v2.0

use anyhow::Result;
use colored::Colorize;
use std::io::{self, Write};

use super::record::{LogLevel, LogRecord};
use super::LogSink;

/// Espejo de los registros en consola.
///
/// Info/Warning van a stdout, Error/Critical a stderr en rojo. El color va
/// embebido en la propia cadena (con su reset), así que nunca queda activo
/// entre una escritura y la siguiente.
pub struct Console {
    out: Box<dyn Write + Send>,
    err: Box<dyn Write + Send>,
    color: bool,
}

impl Console {
    pub fn stdio(color: bool) -> Self {
        Self::new(Box::new(io::stdout()), Box::new(io::stderr()), color)
    }

    pub fn new(out: Box<dyn Write + Send>, err: Box<dyn Write + Send>, color: bool) -> Self {
        Self { out, err, color }
    }

    fn paint(&self, record: &LogRecord) -> String {
        let line = record.to_string();
        if !self.color {
            return line;
        }
        match record.level {
            LogLevel::Info => line,
            LogLevel::Warning => line.yellow().to_string(),
            LogLevel::Error | LogLevel::Critical => line.red().bold().to_string(),
        }
    }
}

impl LogSink for Console {
    fn write(&mut self, record: &LogRecord) -> Result<()> {
        let line = format!("{}\n", self.paint(record));
        let stream = if record.level.is_error() {
            &mut self.err
        } else {
            &mut self.out
        };
        stream.write_all(line.as_bytes())?;
        stream.flush()?;
        Ok(())
    }
}
