// Copyright 2025
// Licensed under the Elastic License v2.0

use anyhow::Result;
use std::time::Duration;

use crate::config::Config;
use crate::replication::{CheckError, ConnectionParams, ReplicationChecker, ReplicationStatus, StatusProbe};
use crate::sink::Logger;

/// Resultado de un ciclo de comprobación
#[derive(Debug, Clone, PartialEq)]
pub enum CycleOutcome {
    Healthy(ReplicationStatus),
    /// Consulta correcta pero algún hilo parado
    Degraded(ReplicationStatus),
    /// Consulta correcta sin filas: el servidor no es réplica
    NotReplica,
    Failed(CheckError),
}

/// Bucle principal del monitor: comprobar, registrar, dormir, repetir.
///
/// Un ciclo fallido nunca detiene el bucle; sólo termina por señal externa.
pub struct MonitorEngine<P> {
    params: ConnectionParams,
    checker: ReplicationChecker<P>,
    logger: Logger,
    interval: Duration,
}

impl<P: StatusProbe> MonitorEngine<P> {
    pub fn new(config: &Config, probe: P, logger: Logger) -> Self {
        Self {
            params: ConnectionParams::from_config(config),
            checker: ReplicationChecker::new(probe, config.check_timeout()),
            logger,
            interval: config.check_interval(),
        }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Ejecutar ciclos indefinidamente
    pub async fn run(mut self) -> Result<()> {
        self.logger.info(format!(
            "Monitoring MySQL replication status on {}:{}, checking every {} seconds.",
            self.params.host,
            self.params.port,
            self.interval.as_secs()
        ));

        loop {
            match self.run_cycle().await {
                CycleOutcome::Healthy(status) | CycleOutcome::Degraded(status) => {
                    log::debug!("Cycle finished, healthy={} ({})", status.healthy(), status)
                }
                CycleOutcome::NotReplica => log::debug!("Cycle finished, no status row"),
                CycleOutcome::Failed(e) => log::debug!("Cycle failed: {:?}", e),
            }

            // Intervalo fijo, independiente del resultado
            tokio::time::sleep(self.interval).await;
        }
    }

    /// Un ciclo: registro de inicio, comprobación y un único registro de resultado
    pub async fn run_cycle(&mut self) -> CycleOutcome {
        self.logger.info("Checking MySQL replication status...");

        match self.checker.check(&self.params).await {
            Err(e) => {
                self.logger.critical(format!(
                    "{}. Replication check failed, handle immediately!",
                    e
                ));
                CycleOutcome::Failed(e)
            }
            Ok(status) if !status.replica_configured => {
                self.logger.warning(format!(
                    "No replication status found on {}:{}, server is not configured as a replica. {}",
                    self.params.host, self.params.port, status
                ));
                CycleOutcome::NotReplica
            }
            Ok(status) if !status.healthy() => {
                self.logger.warning(format!("Replication is broken. {}", status));
                CycleOutcome::Degraded(status)
            }
            Ok(status) => {
                self.logger.info(format!(
                    "Replication is healthy, Seconds_Behind_Master: {}. Check passed.",
                    status.lag_display()
                ));
                CycleOutcome::Healthy(status)
            }
        }
    }
}
