// Copyright 2025
// Licensed under the Elastic License v2.0

use std::fmt;

/// Fallos de una comprobación de replicación.
///
/// Cada variante corta la comprobación en el paso donde ocurre. Un servidor
/// sin fila de estado no es un error (ver `ReplicationStatus::no_status_row`).
#[derive(Debug, Clone, PartialEq)]
pub enum CheckError {
    /// No se pudo preparar la sesión del cliente
    InitFailed { error: String },
    /// Fallo de red o autenticación; `error` es el texto del servidor/driver
    ConnectFailed { host: String, port: u16, user: String, error: String },
    QueryFailed { query: String, error: String },
    ResultFetchFailed { error: String },
    /// La comprobación completa superó el plazo configurado
    Timeout { host: String, port: u16, secs: u64 },
}

impl CheckError {
    /// Mensaje para el log de errores
    pub fn to_log_message(&self) -> String {
        match self {
            CheckError::InitFailed { error } => {
                format!("MySQL client initialization failed: {}", error)
            }
            CheckError::ConnectFailed { host, port, user, error } => {
                format!(
                    "Cannot connect to MySQL server {}:{} as user {}. Error: {}",
                    host, port, user, error
                )
            }
            CheckError::QueryFailed { query, error } => {
                format!("{} query failed: {}", query, error)
            }
            CheckError::ResultFetchFailed { error } => {
                format!("Failed to fetch query result: {}", error)
            }
            CheckError::Timeout { host, port, secs } => {
                format!(
                    "Replication check against {}:{} did not finish within {} seconds",
                    host, port, secs
                )
            }
        }
    }
}

impl fmt::Display for CheckError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_log_message())
    }
}

impl std::error::Error for CheckError {}
