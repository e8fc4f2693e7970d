// Copyright 2025
// Licensed under the Elastic License v2.0

mod error;
mod probe;
mod status;

use std::time::Duration;

pub use error::CheckError;
pub use probe::{ConnectionParams, MysqlProbe, StatusProbe};
pub use status::{ReplicationStatus, StatusRow, ThreadState};

/// Comprobación de replicación de un ciclo.
///
/// Sin estado entre llamadas: cada `check` abre y cierra su propia conexión.
pub struct ReplicationChecker<P> {
    probe: P,
    timeout: Duration,
}

impl<P: StatusProbe> ReplicationChecker<P> {
    pub fn new(probe: P, timeout: Duration) -> Self {
        Self { probe, timeout }
    }

    /// Consultar el estado y clasificarlo. La sonda completa (conexión +
    /// consulta) tiene como plazo `timeout`.
    pub async fn check(&self, params: &ConnectionParams) -> Result<ReplicationStatus, CheckError> {
        let row = tokio::time::timeout(self.timeout, self.probe.fetch_status_row(params))
            .await
            .map_err(|_| CheckError::Timeout {
                host: params.host.clone(),
                port: params.port,
                secs: self.timeout.as_secs(),
            })??;

        Ok(match row {
            Some(row) => ReplicationStatus::from_row(&row),
            None => ReplicationStatus::no_status_row(),
        })
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::collections::VecDeque;
    use std::sync::{Arc, Mutex};
    use tokio::time::Instant;

    pub(crate) type ProbeReply = Result<Option<StatusRow>, CheckError>;

    /// Sonda con respuestas predefinidas; registra el instante de cada llamada.
    /// Cuando se agotan las respuestas, se queda colgada (simula un servidor mudo).
    #[derive(Clone, Default)]
    pub(crate) struct ScriptedProbe {
        replies: Arc<Mutex<VecDeque<ProbeReply>>>,
        pub calls: Arc<Mutex<Vec<Instant>>>,
    }

    impl ScriptedProbe {
        pub fn new(replies: Vec<ProbeReply>) -> Self {
            Self {
                replies: Arc::new(Mutex::new(replies.into())),
                calls: Arc::default(),
            }
        }

        pub fn call_times(&self) -> Vec<Instant> {
            self.calls.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl StatusProbe for ScriptedProbe {
        async fn fetch_status_row(&self, _params: &ConnectionParams) -> ProbeReply {
            self.calls.lock().unwrap().push(Instant::now());
            let reply = self.replies.lock().unwrap().pop_front();
            match reply {
                Some(reply) => reply,
                None => std::future::pending().await,
            }
        }
    }

    pub(crate) fn status_row(io: &str, sql: &str, lag: Option<&str>) -> StatusRow {
        StatusRow::new(
            vec![
                "Slave_IO_Running".to_string(),
                "Slave_SQL_Running".to_string(),
                "Seconds_Behind_Master".to_string(),
            ],
            vec![
                Some(io.to_string()),
                Some(sql.to_string()),
                lag.map(str::to_string),
            ],
        )
    }

    pub(crate) fn params() -> ConnectionParams {
        ConnectionParams {
            host: "10.0.0.5".to_string(),
            port: 3307,
            user: "mon".to_string(),
            password: "secret".to_string(),
        }
    }

    #[tokio::test]
    async fn test_check_classifies_row() {
        let probe = ScriptedProbe::new(vec![Ok(Some(status_row("Yes", "No", Some("120"))))]);
        let checker = ReplicationChecker::new(probe, Duration::from_secs(30));
        let status = checker.check(&params()).await.unwrap();
        assert!(!status.healthy());
        assert_eq!(status.sql_running, ThreadState::No);
        assert_eq!(status.seconds_behind, Some(120));
    }

    #[tokio::test]
    async fn test_zero_rows_is_not_an_error() {
        let checker = ReplicationChecker::new(ScriptedProbe::new(vec![Ok(None)]), Duration::from_secs(30));
        let status = checker.check(&params()).await.unwrap();
        assert!(!status.healthy());
        assert!(!status.replica_configured);
    }

    #[tokio::test]
    async fn test_probe_errors_pass_through() {
        let err = CheckError::QueryFailed {
            query: "SHOW SLAVE STATUS".to_string(),
            error: "Access denied; you need the REPLICATION CLIENT privilege".to_string(),
        };
        let checker = ReplicationChecker::new(ScriptedProbe::new(vec![Err(err.clone())]), Duration::from_secs(30));
        assert_eq!(checker.check(&params()).await.unwrap_err(), err);
    }

    #[tokio::test(start_paused = true)]
    async fn test_hung_probe_times_out() {
        let checker = ReplicationChecker::new(ScriptedProbe::default(), Duration::from_secs(30));
        let err = checker.check(&params()).await.unwrap_err();
        assert_eq!(
            err,
            CheckError::Timeout {
                host: "10.0.0.5".to_string(),
                port: 3307,
                secs: 30,
            }
        );
    }
}
