// Copyright 2025
// Licensed under the Elastic License v2.0

use async_trait::async_trait;
use mysql_async::{prelude::Queryable, Conn, OptsBuilder, Row, Value};
use std::fmt;

use super::error::CheckError;
use super::status::StatusRow;
use crate::config::Config;

/// Parámetros de conexión al servidor vigilado
#[derive(Clone)]
pub struct ConnectionParams {
    pub host: String,
    pub port: u16,
    pub user: String,
    pub password: String,
}

impl ConnectionParams {
    pub fn from_config(config: &Config) -> Self {
        Self {
            host: config.host.clone(),
            port: config.port,
            user: config.user.clone(),
            password: config.password.clone(),
        }
    }
}

impl fmt::Debug for ConnectionParams {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConnectionParams")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("user", &self.user)
            .field("password", &"******")
            .finish()
    }
}

/// Capacidad "conectar, ejecutar la consulta de estado, leer como mucho una fila".
///
/// `Ok(None)` significa que la consulta funcionó pero no devolvió filas.
#[async_trait]
pub trait StatusProbe: Send + Sync {
    async fn fetch_status_row(&self, params: &ConnectionParams) -> Result<Option<StatusRow>, CheckError>;
}

/// Sonda MySQL: una conexión nueva por comprobación, sin pool ni reintentos
pub struct MysqlProbe {
    status_query: String,
}

impl MysqlProbe {
    pub fn new(status_query: impl Into<String>) -> Self {
        Self {
            status_query: status_query.into(),
        }
    }

    fn opts(params: &ConnectionParams) -> Result<OptsBuilder, CheckError> {
        if params.host.trim().is_empty() {
            return Err(CheckError::InitFailed {
                error: "empty host".to_string(),
            });
        }
        if params.port == 0 {
            return Err(CheckError::InitFailed {
                error: "port must be a positive number".to_string(),
            });
        }

        Ok(OptsBuilder::default()
            .ip_or_hostname(params.host.clone())
            .tcp_port(params.port)
            .user(Some(params.user.clone()))
            .pass(Some(params.password.clone()))
            .prefer_socket(false))
    }

    async fn query_status(&self, conn: &mut Conn) -> Result<Vec<Row>, CheckError> {
        let result = conn
            .query_iter(self.status_query.as_str())
            .await
            .map_err(|e| CheckError::QueryFailed {
                query: self.status_query.clone(),
                error: e.to_string(),
            })?;

        result
            .collect_and_drop::<Row>()
            .await
            .map_err(|e| CheckError::ResultFetchFailed { error: e.to_string() })
    }
}

#[async_trait]
impl StatusProbe for MysqlProbe {
    async fn fetch_status_row(&self, params: &ConnectionParams) -> Result<Option<StatusRow>, CheckError> {
        let opts = Self::opts(params)?;

        log::debug!("Connecting to {}:{} as {}", params.host, params.port, params.user);
        let mut conn = Conn::new(opts).await.map_err(|e| CheckError::ConnectFailed {
            host: params.host.clone(),
            port: params.port,
            user: params.user.clone(),
            error: e.to_string(),
        })?;

        let rows = self.query_status(&mut conn).await;

        if let Err(e) = conn.disconnect().await {
            log::debug!("Disconnect from {} failed: {}", params.host, e);
        }

        let rows = rows?;
        log::debug!("{} returned {} row(s)", self.status_query, rows.len());
        Ok(rows.first().map(to_status_row))
    }
}

fn to_status_row(row: &Row) -> StatusRow {
    let columns = row
        .columns_ref()
        .iter()
        .map(|col| col.name_str().into_owned())
        .collect();
    let values = (0..row.len())
        .map(|i| row.as_ref(i).and_then(value_to_text))
        .collect();
    StatusRow::new(columns, values)
}

/// Valor de columna a texto; NULL se queda en `None`
fn value_to_text(value: &Value) -> Option<String> {
    match value {
        Value::NULL => None,
        Value::Bytes(bytes) => Some(String::from_utf8_lossy(bytes).into_owned()),
        Value::Int(v) => Some(v.to_string()),
        Value::UInt(v) => Some(v.to_string()),
        other => Some(other.as_sql(true)),
    }
}
