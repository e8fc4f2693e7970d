mod config;
mod engine;
mod replication;
mod sink;

use anyhow::{Context, Result};
use dotenvy::dotenv;

use crate::config::{config_path, Config, ConfigStore};
use crate::engine::MonitorEngine;
use crate::replication::MysqlProbe;
use crate::sink::Logger;

// Un solo hilo: la comprobación y la espera se ejecutan en secuencia
#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    env_logger::init();
    dotenv().ok();

    // 1. Cargar configuración (nunca falla: valores por defecto)
    let store = ConfigStore::load(&config_path());
    let config = Config::from_store(&store);

    // 2. Abrir info.log / error.log
    let mut logger = Logger::open(&config.log_root, config.daily_rotation, config.color)
        .with_context(|| {
            format!("Cannot open log files under root path {}", config.log_root.display())
        })?;
    logger.info(config.summary());

    // 3. Validar credenciales antes de tocar la red
    if let Err(e) = config.validate() {
        logger.error(e.to_string());
        return Err(e.into());
    }
    for warning in config.warnings() {
        logger.warning(warning.to_string());
    }

    // 4. Bucle de monitorización
    let probe = MysqlProbe::new(config.status_query.clone());
    MonitorEngine::new(&config, probe, logger).run().await
}
