// Copyright 2025
// Licensed under the Elastic License v2.0

use std::fmt;

// Posiciones documentadas de SHOW SLAVE STATUS, sólo como respaldo
// cuando la fila no trae nombres de columna reconocibles.
const IO_RUNNING_POSITION: usize = 10;
const SQL_RUNNING_POSITION: usize = 11;
const SECONDS_BEHIND_POSITION: usize = 32;

const IO_RUNNING_NAMES: &[&str] = &["Slave_IO_Running", "Replica_IO_Running"];
const SQL_RUNNING_NAMES: &[&str] = &["Slave_SQL_Running", "Replica_SQL_Running"];
const SECONDS_BEHIND_NAMES: &[&str] = &["Seconds_Behind_Master", "Seconds_Behind_Source"];

/// Estado de un hilo de replicación
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ThreadState {
    Yes,
    No,
    /// El hilo de I/O está reintentando conectar con el maestro
    Connecting,
    Unknown,
}

impl ThreadState {
    pub fn parse(value: Option<&str>) -> Self {
        match value.map(str::trim) {
            Some(v) if v.eq_ignore_ascii_case("yes") => ThreadState::Yes,
            Some(v) if v.eq_ignore_ascii_case("no") => ThreadState::No,
            Some(v) if v.eq_ignore_ascii_case("connecting") => ThreadState::Connecting,
            _ => ThreadState::Unknown,
        }
    }
}

impl fmt::Display for ThreadState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ThreadState::Yes => "Yes",
            ThreadState::No => "No",
            ThreadState::Connecting => "Connecting",
            ThreadState::Unknown => "unknown",
        };
        f.write_str(s)
    }
}

/// Fila cruda de SHOW SLAVE STATUS con acceso por nombre de columna.
///
/// Los valores NULL se guardan como `None`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StatusRow {
    columns: Vec<String>,
    values: Vec<Option<String>>,
}

impl StatusRow {
    pub fn new(columns: Vec<String>, values: Vec<Option<String>>) -> Self {
        Self { columns, values }
    }

    /// Buscar por nombre; si ningún nombre coincide, usar la posición fija
    pub fn field(&self, names: &[&str], position: usize) -> Option<&str> {
        let index = self
            .columns
            .iter()
            .position(|col| names.iter().any(|n| col.eq_ignore_ascii_case(n)))
            .unwrap_or(position);
        self.values.get(index)?.as_deref()
    }
}

/// Resultado de una comprobación correcta (conexión y consulta OK)
#[derive(Debug, Clone, PartialEq)]
pub struct ReplicationStatus {
    pub io_running: ThreadState,
    pub sql_running: ThreadState,
    /// `None` = desconocido (NULL, ausente o no numérico)
    pub seconds_behind: Option<u64>,
    /// `false` cuando la consulta no devolvió ninguna fila
    pub replica_configured: bool,
}

impl ReplicationStatus {
    pub fn new(io_running: ThreadState, sql_running: ThreadState, seconds_behind: Option<u64>) -> Self {
        Self {
            io_running,
            sql_running,
            seconds_behind,
            replica_configured: true,
        }
    }

    pub fn from_row(row: &StatusRow) -> Self {
        let io = row.field(IO_RUNNING_NAMES, IO_RUNNING_POSITION);
        let sql = row.field(SQL_RUNNING_NAMES, SQL_RUNNING_POSITION);
        let lag = row
            .field(SECONDS_BEHIND_NAMES, SECONDS_BEHIND_POSITION)
            .and_then(|v| v.trim().parse::<u64>().ok());

        Self::new(ThreadState::parse(io), ThreadState::parse(sql), lag)
    }

    /// El servidor respondió pero no está configurado como réplica
    pub fn no_status_row() -> Self {
        Self {
            io_running: ThreadState::No,
            sql_running: ThreadState::No,
            seconds_behind: None,
            replica_configured: false,
        }
    }

    pub fn healthy(&self) -> bool {
        self.io_running == ThreadState::Yes && self.sql_running == ThreadState::Yes
    }

    /// Retraso para el log: número o `unknown`
    pub fn lag_display(&self) -> String {
        match self.seconds_behind {
            Some(secs) => secs.to_string(),
            None => "unknown".to_string(),
        }
    }
}

impl fmt::Display for ReplicationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Slave_IO_Running: {}, Slave_SQL_Running: {}, Seconds_Behind_Master: {}",
            self.io_running,
            self.sql_running,
            self.lag_display()
        )
    }
}
