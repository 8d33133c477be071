//! Database connection with a fixed-delay retry loop.

use std::fmt::Display;
use std::future::Future;

use sqlx::{Connection, MySqlConnection};
use tracing::{info, warn};

use crate::spec::{ReportError, SpecDbConfig, SpecRetryExhausted, SpecRetryPolicy};

/// Run `op` until it succeeds or `policy.attempts_max` attempts have failed.
///
/// `op` receives the 1-based attempt number. The loop sleeps `policy.delay`
/// between failures and never after the last one.
pub async fn run_with_retry<T, E, F, Fut>(
    policy: &SpecRetryPolicy,
    label: &str,
    mut op: F,
) -> Result<T, SpecRetryExhausted<E>>
where
    F: FnMut(u32) -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: Display,
{
    let n_attempts_max = policy.attempts_max.max(1);
    let mut n_attempt = 1;
    loop {
        match op(n_attempt).await {
            Ok(val) => {
                info!(attempt = n_attempt, "{label} succeeded");
                return Ok(val);
            }
            Err(err) => {
                warn!(
                    attempt = n_attempt,
                    attempts_max = n_attempts_max,
                    error = %err,
                    "{label} failed"
                );
                if n_attempt >= n_attempts_max {
                    return Err(SpecRetryExhausted {
                        attempts: n_attempt,
                        error: err,
                    });
                }
                tokio::time::sleep(policy.delay).await;
                n_attempt += 1;
            }
        }
    }
}

/// Open one MySQL connection, retrying per `policy`.
pub async fn connect_with_retry(
    cfg: &SpecDbConfig,
    policy: &SpecRetryPolicy,
) -> Result<MySqlConnection, ReportError> {
    let options = cfg.to_connect_options();
    info!(host = %cfg.host, port = cfg.port, database = %cfg.database, "connecting to database");

    run_with_retry(policy, "database connection", |_| {
        MySqlConnection::connect_with(&options)
    })
    .await
    .map_err(|exhausted| ReportError::Connection {
        host: format!("{}:{}", cfg.host, cfg.port),
        attempts: exhausted.attempts,
        source: exhausted.error,
    })
}
