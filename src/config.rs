//! Node Configuration
//!
//! Both binaries take `--flag value` pairs on the command line. Values not
//! given on the command line fall back to environment variables where the
//! deployment traditionally provided them (`PASSWORD_FILE_PATH`), then to
//! the defaults below.

use crate::coordinator::types::CoordinatorSettings;
use crate::worker::enumerate::KeyspaceMode;

use anyhow::{Context, Result, anyhow};
use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_CENTRAL_BIND: &str = "127.0.0.1:5000";
pub const DEFAULT_WORKER_BIND: &str = "127.0.0.1:5099";
pub const DEFAULT_DICTIONARY_DIR: &str = "./dictionary";
pub const DEFAULT_CREDENTIALS_FILE: &str = "./data/users_passwords.txt";
pub const DEFAULT_DICTIONARY_GRANULARITY: u64 = 10_000;
pub const DEFAULT_DICTIONARY_BUDGET: Duration = Duration::from_secs(60);

const CREDENTIALS_ENV: &str = "PASSWORD_FILE_PATH";

#[derive(Debug, Clone)]
pub struct CentralConfig {
    pub bind_addr: SocketAddr,
    pub dictionary_dir: PathBuf,
    /// Maximum number of corpus lines per dictionary chunk.
    pub granularity: u64,
    /// When set, usernames are checked before any work is dispatched.
    pub credentials_file: Option<PathBuf>,
    pub metrics_dir: Option<PathBuf>,
    pub keyspace_mode: KeyspaceMode,
    pub coordinator: CoordinatorSettings,
}

impl Default for CentralConfig {
    fn default() -> Self {
        Self {
            bind_addr: DEFAULT_CENTRAL_BIND
                .parse()
                .unwrap_or_else(|_| SocketAddr::from(([127, 0, 0, 1], 5000))),
            dictionary_dir: PathBuf::from(DEFAULT_DICTIONARY_DIR),
            granularity: DEFAULT_DICTIONARY_GRANULARITY,
            credentials_file: None,
            metrics_dir: None,
            keyspace_mode: KeyspaceMode::LeadingCharacter,
            coordinator: CoordinatorSettings::default(),
        }
    }
}

impl CentralConfig {
    /// Parses central node flags. `args` excludes the program name.
    pub fn from_args(args: &[String]) -> Result<Self> {
        let mut config = Self {
            credentials_file: std::env::var_os(CREDENTIALS_ENV).map(PathBuf::from),
            ..Self::default()
        };

        let mut i = 0;
        while i < args.len() {
            let flag = args[i].as_str();
            match flag {
                "--portion-only" => {
                    config.keyspace_mode = KeyspaceMode::PortionOnly;
                    i += 1;
                    continue;
                }
                "--bind" => config.bind_addr = value(args, i)?.parse()?,
                "--dictionary-dir" => config.dictionary_dir = PathBuf::from(value(args, i)?),
                "--granularity" => {
                    config.granularity = value(args, i)?.parse()?;
                    if config.granularity == 0 {
                        return Err(anyhow!("--granularity must be greater than 0"));
                    }
                }
                "--credentials" => config.credentials_file = Some(PathBuf::from(value(args, i)?)),
                "--metrics-dir" => config.metrics_dir = Some(PathBuf::from(value(args, i)?)),
                "--health-timeout-ms" => {
                    config.coordinator.health_timeout = millis(value(args, i)?)?
                }
                "--dispatch-timeout-secs" => {
                    config.coordinator.dispatch_timeout =
                        Duration::from_secs(value(args, i)?.parse()?)
                }
                "--backoff-ms" => config.coordinator.backoff = millis(value(args, i)?)?,
                other => {
                    tracing::warn!("Ignoring unknown argument {}", other);
                    i += 1;
                    continue;
                }
            }
            i += 2;
        }

        Ok(config)
    }
}

#[derive(Debug, Clone)]
pub struct WorkerConfig {
    pub bind_addr: SocketAddr,
    /// Address announced to the central node; defaults to `bind_addr`.
    pub advertise_addr: Option<String>,
    /// Central node to self-register with on startup.
    pub central_addr: Option<String>,
    pub dictionary_dir: PathBuf,
    pub credentials_file: PathBuf,
    /// Wall-clock budget for one dictionary chunk.
    pub dictionary_budget: Duration,
}

impl Default for WorkerConfig {
    fn default() -> Self {
        Self {
            bind_addr: DEFAULT_WORKER_BIND
                .parse()
                .unwrap_or_else(|_| SocketAddr::from(([127, 0, 0, 1], 5099))),
            advertise_addr: None,
            central_addr: None,
            dictionary_dir: PathBuf::from(DEFAULT_DICTIONARY_DIR),
            credentials_file: PathBuf::from(DEFAULT_CREDENTIALS_FILE),
            dictionary_budget: DEFAULT_DICTIONARY_BUDGET,
        }
    }
}

impl WorkerConfig {
    /// Parses worker node flags. `args` excludes the program name.
    pub fn from_args(args: &[String]) -> Result<Self> {
        let mut config = Self::default();
        if let Some(path) = std::env::var_os(CREDENTIALS_ENV) {
            config.credentials_file = PathBuf::from(path);
        }

        let mut i = 0;
        while i < args.len() {
            match args[i].as_str() {
                "--bind" => config.bind_addr = value(args, i)?.parse()?,
                "--advertise" => config.advertise_addr = Some(value(args, i)?.to_string()),
                "--central" => config.central_addr = Some(value(args, i)?.to_string()),
                "--dictionary-dir" => config.dictionary_dir = PathBuf::from(value(args, i)?),
                "--credentials" => config.credentials_file = PathBuf::from(value(args, i)?),
                "--budget-secs" => {
                    config.dictionary_budget = Duration::from_secs(value(args, i)?.parse()?)
                }
                other => {
                    tracing::warn!("Ignoring unknown argument {}", other);
                    i += 1;
                    continue;
                }
            }
            i += 2;
        }

        Ok(config)
    }

    /// The address the central node should use to reach this worker.
    pub fn advertised(&self) -> String {
        self.advertise_addr
            .clone()
            .unwrap_or_else(|| self.bind_addr.to_string())
    }
}

fn value(args: &[String], i: usize) -> Result<&str> {
    args.get(i + 1)
        .map(String::as_str)
        .with_context(|| format!("{} requires a value", args[i]))
}

fn millis(raw: &str) -> Result<Duration> {
    Ok(Duration::from_millis(raw.parse()?))
}
