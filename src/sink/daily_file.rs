// Copyright 2025
// Licensed under the Elastic License v2.0

use anyhow::{Context, Result};
use chrono::{Local, NaiveDate};
use std::fs::{self, File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use super::record::LogRecord;
use super::LogSink;

/// Fichero `<root>/<YYYY-MM-DD>/<kind>.log` abierto en modo append.
///
/// Con `rotate` activo, el primer registro de un día nuevo reabre el
/// fichero bajo el directorio de ese día. Sin rotación, el proceso sigue
/// escribiendo en el directorio del día de arranque.
pub struct DailyLogFile {
    root: PathBuf,
    kind: String,
    rotate: bool,
    date: NaiveDate,
    path: PathBuf,
    file: File,
}

impl DailyLogFile {
    /// Abrir el fichero del día actual
    pub fn open(root: &Path, kind: &str, rotate: bool) -> Result<Self> {
        Self::open_for(root, kind, rotate, Local::now().date_naive())
    }

    pub fn open_for(root: &Path, kind: &str, rotate: bool, date: NaiveDate) -> Result<Self> {
        let (path, file) = open_dated(root, kind, date)?;
        Ok(Self {
            root: root.to_path_buf(),
            kind: kind.to_string(),
            rotate,
            date,
            path,
            file,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn roll_to(&mut self, date: NaiveDate) -> Result<()> {
        let (path, file) = open_dated(&self.root, &self.kind, date)?;
        log::info!("Rotating {} log to {}", self.kind, path.display());
        self.date = date;
        self.path = path;
        self.file = file;
        Ok(())
    }
}

impl LogSink for DailyLogFile {
    fn write(&mut self, record: &LogRecord) -> Result<()> {
        if self.rotate && record.date() != self.date {
            self.roll_to(record.date())?;
        }

        // Una sola escritura por línea; File no tiene buffer propio
        self.file
            .write_all(record.render().as_bytes())
            .with_context(|| format!("Failed to write {}", self.path.display()))?;
        self.file.flush()?;
        Ok(())
    }
}

/// Crear `<root>/<date>` (tolerando que ya exista) y abrir `<kind>.log`
fn open_dated(root: &Path, kind: &str, date: NaiveDate) -> Result<(PathBuf, File)> {
    let dir = root.join(date.format("%Y-%m-%d").to_string());
    fs::create_dir_all(&dir)
        .with_context(|| format!("Failed to create log directory {}", dir.display()))?;

    let path = dir.join(format!("{}.log", kind));
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&path)
        .with_context(|| format!("Failed to open log file {}", path.display()))?;

    Ok((path, file))
}
