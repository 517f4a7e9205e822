//! Loading metric records
//!
//! Records come either from a CSV export of the `metrics` table or, with the
//! `mysql` feature, straight from the MySQL database the benchmark harness
//! writes into. Connection settings for the database are taken from the
//! environment and must all be present before anything else happens.

use crate::record::{MetricRecord, UnknownMetricType};
use std::path::Path;
use thiserror::Error;

/// Table holding the collected metrics
pub const METRICS_TABLE: &str = "metrics";

/// Environment variables required for database mode
pub const DATABASE_ENV_VARS: [&str; 5] =
    ["DB_USER", "DB_PASSWORD", "DB_HOST", "DB_PORT", "DB_DATABASE"];

/// Errors for record loading
#[derive(Error, Debug)]
pub enum InputError {
    #[error(
        "missing environment variable(s): {} (required: DB_USER, DB_PASSWORD, DB_HOST, DB_PORT, DB_DATABASE)",
        .0.join(", ")
    )]
    MissingEnvironment(Vec<String>),

    #[error("invalid DB_PORT '{0}'")]
    InvalidPort(String),

    #[error("Failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Malformed CSV input: {0}")]
    Csv(#[from] csv::Error),

    #[error(transparent)]
    UnknownMetricType(#[from] UnknownMetricType),

    #[error("non-finite value {value} for {technology}/{source_name}/{metric}")]
    NonFiniteValue {
        technology: String,
        source_name: String,
        metric: String,
        value: f64,
    },

    #[error("database query failed: {0}")]
    Database(String),

    #[error("this build has no MySQL support; rebuild with the `mysql` feature or pass --input")]
    DatabaseUnsupported,
}

pub type Result<T> = std::result::Result<T, InputError>;

/// Connection settings for the metrics database
#[derive(Clone, PartialEq, Eq)]
pub struct DatabaseConfig {
    pub user: String,
    pub password: String,
    pub host: String,
    pub port: u16,
    pub database: String,
}

impl std::fmt::Debug for DatabaseConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DatabaseConfig")
            .field("user", &self.user)
            .field("password", &"***")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("database", &self.database)
            .finish()
    }
}

impl DatabaseConfig {
    /// Read the connection settings from the process environment
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read the connection settings through an arbitrary lookup
    ///
    /// Every missing variable is reported, not just the first one.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let values: Vec<Option<String>> = DATABASE_ENV_VARS.iter().map(|k| lookup(k)).collect();
        let missing: Vec<String> = DATABASE_ENV_VARS
            .iter()
            .zip(&values)
            .filter(|(_, v)| v.is_none())
            .map(|(k, _)| k.to_string())
            .collect();
        if !missing.is_empty() {
            return Err(InputError::MissingEnvironment(missing));
        }

        let mut values = values.into_iter().flatten();
        let mut next = || values.next().unwrap_or_default();
        let user = next();
        let password = next();
        let host = next();
        let port_raw = next();
        let database = next();

        let port = port_raw
            .trim()
            .parse::<u16>()
            .map_err(|_| InputError::InvalidPort(port_raw.clone()))?;

        Ok(Self {
            user,
            password,
            host,
            port,
            database,
        })
    }

    /// `host:port/database`, for log lines and error messages
    pub fn endpoint(&self) -> String {
        format!("{}:{}/{}", self.host, self.port, self.database)
    }

    /// Driver connection options; credentials are passed as-is, never through a URL
    #[cfg(feature = "mysql")]
    pub fn connect_options(&self) -> sqlx::mysql::MySqlConnectOptions {
        sqlx::mysql::MySqlConnectOptions::new()
            .host(&self.host)
            .port(self.port)
            .username(&self.user)
            .password(&self.password)
            .database(&self.database)
    }
}

/// Reads the metrics table; `Value + 0E0` yields a DOUBLE on every MySQL version
#[cfg_attr(not(feature = "mysql"), allow(dead_code))]
fn metrics_query() -> String {
    format!(
        "SELECT Technology, Source, MetricType, Value + 0E0 FROM {}",
        METRICS_TABLE
    )
}

/// Reject NaN and infinite values; the statistics below assume finite input
fn check_finite(records: &[MetricRecord]) -> Result<()> {
    if let Some(bad) = records.iter().find(|r| !r.value.is_finite()) {
        return Err(InputError::NonFiniteValue {
            technology: bad.technology.clone(),
            source_name: bad.source.clone(),
            metric: bad.metric_type.to_string(),
            value: bad.value,
        });
    }
    Ok(())
}

/// Parse records from CSV text with a `Technology,Source,MetricType,Value` header
///
/// Extra columns (row ids, timestamps) are ignored.
pub fn read_csv<R: std::io::Read>(reader: R) -> Result<Vec<MetricRecord>> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);
    let records = csv_reader
        .deserialize::<MetricRecord>()
        .collect::<std::result::Result<Vec<_>, _>>()?;
    check_finite(&records)?;
    Ok(records)
}

/// Load records from a CSV file
pub fn load_csv(path: &Path) -> Result<Vec<MetricRecord>> {
    let file = std::fs::File::open(path).map_err(|source| InputError::Io {
        path: path.display().to_string(),
        source,
    })?;
    let records = read_csv(std::io::BufReader::new(file))?;
    tracing::info!("Loaded {} records from {}", records.len(), path.display());
    Ok(records)
}

/// Load every record of the metrics table
#[cfg(feature = "mysql")]
pub fn load_database(config: &DatabaseConfig) -> Result<Vec<MetricRecord>> {
    use sqlx::mysql::MySqlPoolOptions;

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(|e| InputError::Database(e.to_string()))?;

    let rows: Vec<(String, String, String, f64)> = runtime.block_on(async {
        let pool = MySqlPoolOptions::new()
            .max_connections(1)
            .connect_with(config.connect_options())
            .await?;
        let query = metrics_query();
        let rows = sqlx::query_as::<_, (String, String, String, f64)>(&query)
            .fetch_all(&pool)
            .await;
        pool.close().await;
        rows
    })
    .map_err(|e| InputError::Database(e.to_string()))?;

    let records = rows
        .into_iter()
        .map(|(technology, source, metric, value)| {
            Ok(MetricRecord::new(technology, source, metric.parse()?, value))
        })
        .collect::<Result<Vec<_>>>()?;
    check_finite(&records)?;

    tracing::info!("Loaded {} records from {}", records.len(), config.endpoint());
    Ok(records)
}

/// Load every record of the metrics table
#[cfg(not(feature = "mysql"))]
pub fn load_database(_config: &DatabaseConfig) -> Result<Vec<MetricRecord>> {
    Err(InputError::DatabaseUnsupported)
}
