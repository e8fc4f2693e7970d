// Copyright 2025
// Licensed under the Elastic License v2.0

use ini::Ini;
use std::env;
use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;

const DEFAULT_CONFIG_PATH: &str = "config.ini";
const DEFAULT_CHECK_INTERVAL_SECS: u64 = 60;
const DEFAULT_CHECK_TIMEOUT_SECS: u64 = 30;
const DEFAULT_PORT: u16 = 3306;

/// Almacén clave/valor por secciones (formato INI).
///
/// Nunca falla: si el fichero no existe o no se puede parsear, todas las
/// lecturas devuelven su valor por defecto.
#[derive(Debug, Default)]
pub struct ConfigStore {
    ini: Option<Ini>,
}

impl ConfigStore {
    /// Cargar desde disco. Sin escapes: las rutas Windows (`D:\logs`) se leen tal cual.
    pub fn load(path: &Path) -> Self {
        match Ini::load_from_file_noescape(path) {
            Ok(ini) => {
                log::debug!("Loaded configuration from {}", path.display());
                Self { ini: Some(ini) }
            }
            Err(e) => {
                log::warn!("Cannot read {} ({}), using defaults", path.display(), e);
                Self::default()
            }
        }
    }

    pub fn parse(contents: &str) -> Self {
        Self {
            ini: Ini::load_from_str_noescape(contents).ok(),
        }
    }

    /// Leer `section.key`, devolviendo `default` tal cual si no existe.
    /// Secciones y claves no distinguen mayúsculas.
    pub fn get(&self, section: &str, key: &str, default: &str) -> String {
        self.lookup(section, key)
            .map(str::to_string)
            .unwrap_or_else(|| default.to_string())
    }

    fn lookup(&self, section: &str, key: &str) -> Option<&str> {
        let ini = self.ini.as_ref()?;
        ini.iter()
            .filter(|(name, _)| name.map_or(false, |n| n.eq_ignore_ascii_case(section)))
            .flat_map(|(_, props)| props.iter())
            .find(|(k, _)| k.eq_ignore_ascii_case(key))
            .map(|(_, v)| v)
    }
}

/// Ruta del fichero de configuración (`MONITOR_CONFIG` o `config.ini`)
pub fn config_path() -> PathBuf {
    env::var("MONITOR_CONFIG")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from(DEFAULT_CONFIG_PATH))
}

/// Configuración del monitor, leída una sola vez al arrancar
#[derive(Debug, Clone)]
pub struct Config {
    // Database
    pub host: String,
    pub port: u16,
    pub user: String,
    pub password: String,
    pub status_query: String,

    // Settings
    pub log_root: PathBuf,
    pub check_interval_secs: u64,
    pub check_timeout_secs: u64,
    pub daily_rotation: bool,
    pub color: bool,

    /// Valores inválidos encontrados al cargar
    pub issues: Vec<ConfigIssue>,
}

impl Config {
    pub fn from_store(store: &ConfigStore) -> Self {
        let mut issues = Vec::new();

        let raw_port = store.get("Database", "Port", "3306");
        let port = match raw_port.trim().parse::<u16>() {
            Ok(p) if p > 0 => p,
            _ => {
                issues.push(ConfigIssue::InvalidPort(raw_port));
                DEFAULT_PORT
            }
        };

        let raw_interval = store.get("Settings", "CheckInterval", "60");
        let check_interval_secs = parse_positive_secs(&raw_interval).unwrap_or_else(|| {
            issues.push(ConfigIssue::InvalidInterval(raw_interval));
            DEFAULT_CHECK_INTERVAL_SECS
        });

        let raw_timeout = store.get("Settings", "CheckTimeout", "30");
        let check_timeout_secs = parse_positive_secs(&raw_timeout).unwrap_or_else(|| {
            issues.push(ConfigIssue::InvalidTimeout(raw_timeout));
            DEFAULT_CHECK_TIMEOUT_SECS
        });

        let raw_rotation = store.get("Settings", "DailyRotation", "true");
        let daily_rotation = parse_bool(&raw_rotation).unwrap_or_else(|| {
            issues.push(ConfigIssue::InvalidFlag {
                key: "DailyRotation",
                value: raw_rotation,
            });
            true
        });

        let raw_color = store.get("Settings", "Color", "true");
        let color = parse_bool(&raw_color).unwrap_or_else(|| {
            issues.push(ConfigIssue::InvalidFlag {
                key: "Color",
                value: raw_color,
            });
            true
        }) && env::var_os("NO_COLOR").is_none();

        Self {
            host: store.get("Database", "Host", "127.0.0.1"),
            port,
            user: store.get("Database", "User", "root"),
            password: store.get("Database", "Password", ""),
            status_query: store.get("Database", "StatusQuery", "SHOW SLAVE STATUS"),
            log_root: PathBuf::from(store.get("Settings", "LogRoot", "./logs")),
            check_interval_secs,
            check_timeout_secs,
            daily_rotation,
            color,
            issues,
        }
    }

    /// Condiciones fatales de arranque (credenciales vacías, puerto inválido)
    pub fn validate(&self) -> Result<(), ConfigError> {
        let missing: Vec<&'static str> = [
            ("Host", &self.host),
            ("User", &self.user),
            ("Password", &self.password),
        ]
        .into_iter()
        .filter(|(_, value)| value.trim().is_empty())
        .map(|(key, _)| key)
        .collect();

        if !missing.is_empty() {
            return Err(ConfigError::MissingCredentials { missing });
        }

        for issue in &self.issues {
            if let ConfigIssue::InvalidPort(value) = issue {
                return Err(ConfigError::InvalidPort(value.clone()));
            }
        }

        Ok(())
    }

    /// Problemas no fatales que sólo se registran como aviso
    pub fn warnings(&self) -> impl Iterator<Item = &ConfigIssue> {
        self.issues.iter().filter(|issue| !issue.is_fatal())
    }

    pub fn check_interval(&self) -> Duration {
        Duration::from_secs(self.check_interval_secs)
    }

    pub fn check_timeout(&self) -> Duration {
        Duration::from_secs(self.check_timeout_secs)
    }

    /// Resumen de la configuración para el log (sin contraseña)
    pub fn summary(&self) -> String {
        let masked = if self.password.is_empty() { "(empty)" } else { "******" };
        format!(
            "Database host: {}, port: {}, user: {}, password: {}, log root: {}",
            self.host,
            self.port,
            self.user,
            masked,
            self.log_root.display()
        )
    }
}

fn parse_positive_secs(raw: &str) -> Option<u64> {
    raw.trim().parse::<u64>().ok().filter(|secs| *secs > 0)
}

fn parse_bool(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

/// Valor de configuración que no se pudo interpretar
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigIssue {
    InvalidPort(String),
    InvalidInterval(String),
    InvalidTimeout(String),
    InvalidFlag { key: &'static str, value: String },
}

impl ConfigIssue {
    pub fn is_fatal(&self) -> bool {
        matches!(self, ConfigIssue::InvalidPort(_))
    }
}

impl fmt::Display for ConfigIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigIssue::InvalidPort(value) => {
                write!(f, "Invalid Port value '{}' in configuration", value)
            }
            ConfigIssue::InvalidInterval(value) => write!(
                f,
                "Invalid CheckInterval value '{}' in configuration, using default: {} seconds",
                value, DEFAULT_CHECK_INTERVAL_SECS
            ),
            ConfigIssue::InvalidTimeout(value) => write!(
                f,
                "Invalid CheckTimeout value '{}' in configuration, using default: {} seconds",
                value, DEFAULT_CHECK_TIMEOUT_SECS
            ),
            ConfigIssue::InvalidFlag { key, value } => write!(
                f,
                "Invalid {} value '{}' in configuration, using default: true",
                key, value
            ),
        }
    }
}

/// Errores fatales de configuración
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigError {
    MissingCredentials { missing: Vec<&'static str> },
    InvalidPort(String),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::MissingCredentials { missing } => write!(
                f,
                "Database host, user or password missing in configuration (empty: {})",
                missing.join(", ")
            ),
            ConfigError::InvalidPort(value) => write!(
                f,
                "Database port '{}' is not a valid port number",
                value
            ),
        }
    }
}

impl std::error::Error for ConfigError {}

#[cfg(test)]
mod tests {
    use super::*;

    const FULL: &str = "\
[Database]
Host=10.0.0.5
Port=3307
User=mon
Password=secret

[Settings]
LogRoot=/var/log/sync
CheckInterval=5
";

    #[test]
    fn test_get_returns_value_or_default() {
        let store = ConfigStore::parse(FULL);
        assert_eq!(store.get("Database", "Host", "127.0.0.1"), "10.0.0.5");
        assert_eq!(store.get("Database", "Missing", "fallback"), "fallback");
        assert_eq!(store.get("Nope", "Host", "fallback"), "fallback");
    }

    #[test]
    fn test_get_is_case_insensitive() {
        let store = ConfigStore::parse(FULL);
        assert_eq!(store.get("database", "HOST", ""), "10.0.0.5");
    }

    #[test]
    fn test_unreadable_store_falls_back_to_defaults() {
        let store = ConfigStore::load(Path::new("/nonexistent/dir/config.ini"));
        assert_eq!(store.get("Database", "Port", "3306"), "3306");

        let config = Config::from_store(&store);
        assert_eq!(config.host, "127.0.0.1");
        assert_eq!(config.port, 3306);
        assert_eq!(config.user, "root");
        assert_eq!(config.password, "");
        assert_eq!(config.log_root, PathBuf::from("./logs"));
        assert_eq!(config.check_interval_secs, 60);
        assert_eq!(config.status_query, "SHOW SLAVE STATUS");
    }

    #[test]
    fn test_full_config() {
        let config = Config::from_store(&ConfigStore::parse(FULL));
        assert_eq!(config.port, 3307);
        assert_eq!(config.user, "mon");
        assert_eq!(config.check_interval(), Duration::from_secs(5));
        assert_eq!(config.check_timeout_secs, 30);
        assert!(config.daily_rotation);
        assert!(config.issues.is_empty());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_missing_password_is_fatal() {
        let store = ConfigStore::parse("[Database]\nHost=db\nUser=mon\n");
        let err = Config::from_store(&store).validate().unwrap_err();
        assert_eq!(err, ConfigError::MissingCredentials { missing: vec!["Password"] });
    }

    #[test]
    fn test_empty_host_and_user_are_fatal() {
        let store = ConfigStore::parse("[Database]\nHost=\nUser=\nPassword=x\n");
        let err = Config::from_store(&store).validate().unwrap_err();
        assert_eq!(err, ConfigError::MissingCredentials { missing: vec!["Host", "User"] });
    }

    #[test]
    fn test_invalid_interval_defaults_to_sixty() {
        for raw in ["abc", "-5", "0", ""] {
            let store = ConfigStore::parse(&format!(
                "[Database]\nPassword=x\n[Settings]\nCheckInterval={}\n",
                raw
            ));
            let config = Config::from_store(&store);
            assert_eq!(config.check_interval_secs, 60, "raw value {:?}", raw);

            let warnings: Vec<String> = config.warnings().map(|w| w.to_string()).collect();
            assert_eq!(warnings.len(), 1);
            assert!(warnings[0].contains(&format!("'{}'", raw)));
            assert!(config.validate().is_ok());
        }
    }

    #[test]
    fn test_invalid_port_is_fatal() {
        let store = ConfigStore::parse("[Database]\nPort=mysql\nPassword=x\n");
        let config = Config::from_store(&store);
        assert_eq!(config.validate(), Err(ConfigError::InvalidPort("mysql".to_string())));
        assert_eq!(config.warnings().count(), 0);
    }

    #[test]
    fn test_windows_paths_are_not_unescaped() {
        let store = ConfigStore::parse("[Settings]\nLogRoot=D:\\monitor\\logs\n");
        assert_eq!(store.get("Settings", "LogRoot", ""), "D:\\monitor\\logs");
    }

    #[test]
    fn test_summary_masks_password() {
        let config = Config::from_store(&ConfigStore::parse(FULL));
        let summary = config.summary();
        assert!(summary.contains("10.0.0.5"));
        assert!(!summary.contains("secret"));
    }
}
