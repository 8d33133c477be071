//! Configuration structs, fetched report data and error types.

use std::fmt;
use std::time::Duration;

use polars::prelude::{DataFrame, PolarsError};
use sqlx::mysql::MySqlConnectOptions;
use timesync_io_xlsx::{SpecReportStyles, XlsxReportError, derive_default_report_styles};

use crate::conf::{
    C_DB_HOST_DEFAULT, C_DB_NAME_DEFAULT, C_DB_PASS_DEFAULT, C_DB_USER_DEFAULT, C_ENV_DB_HOST,
    C_ENV_DB_NAME, C_ENV_DB_PASS, C_ENV_DB_PORT, C_ENV_DB_USER, DUR_RETRY_DELAY,
    EnumReportView, N_DB_PORT_DEFAULT, N_RETRY_ATTEMPTS_MAX,
};

////////////////////////////////////////////////////////////////////////////////
// #region ConfigSpecification

/// Database connection settings, read once at process start.
#[derive(Clone, PartialEq, Eq)]
pub struct SpecDbConfig {
    pub host: String,
    pub port: u16,
    pub user: String,
    pub password: String,
    pub database: String,
}

impl SpecDbConfig {
    /// Read settings from the process environment.
    pub fn from_env() -> Result<Self, ReportError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read settings through `lookup`, falling back to defaults for unset keys.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ReportError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let port = match lookup(C_ENV_DB_PORT) {
            Some(c_port) => c_port.trim().parse::<u16>().map_err(|err| {
                ReportError::Config(format!("{C_ENV_DB_PORT}={c_port:?} is not a valid port: {err}"))
            })?,
            None => N_DB_PORT_DEFAULT,
        };

        Ok(Self {
            host: lookup(C_ENV_DB_HOST).unwrap_or_else(|| C_DB_HOST_DEFAULT.to_string()),
            port,
            user: lookup(C_ENV_DB_USER).unwrap_or_else(|| C_DB_USER_DEFAULT.to_string()),
            password: lookup(C_ENV_DB_PASS).unwrap_or_else(|| C_DB_PASS_DEFAULT.to_string()),
            database: lookup(C_ENV_DB_NAME).unwrap_or_else(|| C_DB_NAME_DEFAULT.to_string()),
        })
    }

    pub fn to_connect_options(&self) -> MySqlConnectOptions {
        MySqlConnectOptions::new()
            .host(&self.host)
            .port(self.port)
            .username(&self.user)
            .password(&self.password)
            .database(&self.database)
    }
}

// Keeps the password out of logs.
impl fmt::Debug for SpecDbConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SpecDbConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("user", &self.user)
            .field("password", &"***")
            .field("database", &self.database)
            .finish()
    }
}

/// Fixed-delay retry policy for establishing the connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SpecRetryPolicy {
    /// Total attempts, the first one included. Values below 1 act as 1.
    pub attempts_max: u32,
    pub delay: Duration,
}

impl Default for SpecRetryPolicy {
    fn default() -> Self {
        Self {
            attempts_max: N_RETRY_ATTEMPTS_MAX,
            delay: DUR_RETRY_DELAY,
        }
    }
}

/// Everything one report run needs, shared read-only across requests.
#[derive(Debug, Clone)]
pub struct SpecReportContext {
    pub db: SpecDbConfig,
    pub retry: SpecRetryPolicy,
    pub styles: SpecReportStyles,
}

impl SpecReportContext {
    pub fn new(db: SpecDbConfig) -> Self {
        Self {
            db,
            retry: SpecRetryPolicy::default(),
            styles: derive_default_report_styles(),
        }
    }

    pub fn from_env() -> Result<Self, ReportError> {
        Ok(Self::new(SpecDbConfig::from_env()?))
    }
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region DataSpecification

/// The four fetched views of one report run.
#[derive(Debug, Clone, Default)]
pub struct SpecReportData {
    pub df_project: DataFrame,
    pub df_resources: DataFrame,
    pub df_efficiency: DataFrame,
    pub df_comparison: DataFrame,
}

impl SpecReportData {
    pub fn get(&self, view: EnumReportView) -> &DataFrame {
        match view {
            EnumReportView::ProjectReport => &self.df_project,
            EnumReportView::ResourceAllocation => &self.df_resources,
            EnumReportView::EfficiencyIndicators => &self.df_efficiency,
            EnumReportView::MonthlyComparison => &self.df_comparison,
        }
    }

    pub fn set(&mut self, view: EnumReportView, df: DataFrame) {
        match view {
            EnumReportView::ProjectReport => self.df_project = df,
            EnumReportView::ResourceAllocation => self.df_resources = df,
            EnumReportView::EfficiencyIndicators => self.df_efficiency = df,
            EnumReportView::MonthlyComparison => self.df_comparison = df,
        }
    }
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region ErrorSpecification

/// Last failure of an exhausted retry loop.
#[derive(Debug)]
pub struct SpecRetryExhausted<E> {
    pub attempts: u32,
    pub error: E,
}

/// Errors raised while producing a report.
#[derive(Debug, thiserror::Error)]
pub enum ReportError {
    #[error("invalid configuration: {0}")]
    Config(String),
    #[error("could not connect to database at {host} after {attempts} attempt(s)")]
    Connection {
        host: String,
        attempts: u32,
        #[source]
        source: sqlx::Error,
    },
    #[error("query on view {view} failed")]
    Query {
        view: String,
        #[source]
        source: sqlx::Error,
    },
    #[error("could not build a table from view {view}")]
    Frame {
        view: String,
        #[source]
        source: PolarsError,
    },
    #[error("workbook rendering failed")]
    Render(#[from] XlsxReportError),
    #[error("report rendering task did not complete")]
    Task(#[from] tokio::task::JoinError),
    #[error("server error")]
    Server(#[from] std::io::Error),
}

impl ReportError {
    /// Error message followed by its source chain, one cause per line.
    pub fn to_chain_text(&self) -> String {
        let mut c_text = self.to_string();
        let mut source = std::error::Error::source(self);
        while let Some(err) = source {
            c_text.push_str("\ncaused by: ");
            c_text.push_str(&err.to_string());
            source = err.source();
        }
        c_text
    }
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
