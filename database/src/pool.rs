//! Connection pool bounds and the periodic health monitor.

use std::time::Duration;

use sqlx::{postgres::PgPoolOptions, PgPool};
use tokio::task::JoinHandle;

use crate::query::PING;

/// Upper bound on open connections
pub const MAX_CONNECTIONS: u32 = 10;
/// Connections kept open while idle
pub const MIN_CONNECTIONS: u32 = 1;
/// Interval between background liveness pings
pub const HEALTH_CHECK_PERIOD: Duration = Duration::from_secs(30);
/// How long an operation waits for a free connection
pub const ACQUIRE_TIMEOUT: Duration = Duration::from_secs(30);

/// Pool bounds applied when the repository connects
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PoolSettings {
    pub max_connections: u32,
    pub min_connections: u32,
    pub health_check_period: Duration,
    pub acquire_timeout: Duration,
}

impl Default for PoolSettings {
    fn default() -> Self {
        Self {
            max_connections: MAX_CONNECTIONS,
            min_connections: MIN_CONNECTIONS,
            health_check_period: HEALTH_CHECK_PERIOD,
            acquire_timeout: ACQUIRE_TIMEOUT,
        }
    }
}

impl PoolSettings {
    /// Check the bounds are usable
    pub fn validate(&self) -> Result<(), String> {
        if self.max_connections == 0 {
            return Err("max_connections must be greater than 0".to_string());
        }
        if self.min_connections > self.max_connections {
            return Err(format!(
                "min_connections ({}) exceeds max_connections ({})",
                self.min_connections, self.max_connections
            ));
        }
        if self.health_check_period.is_zero() {
            return Err("health_check_period must be greater than 0".to_string());
        }
        if self.acquire_timeout.is_zero() {
            return Err("acquire_timeout must be greater than 0".to_string());
        }
        Ok(())
    }

    /// Pool options carrying these bounds
    pub fn pool_options(&self) -> PgPoolOptions {
        PgPoolOptions::new()
            .max_connections(self.max_connections)
            .min_connections(self.min_connections)
            .acquire_timeout(self.acquire_timeout)
            .test_before_acquire(true)
    }
}

/// Ping the pool every `period` until it is closed.
///
/// Failures are logged and never stop the monitor; the pool itself replaces
/// broken connections on the next acquire.
pub fn spawn_health_monitor(pool: PgPool, period: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(period);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
        // first tick fires immediately and the connect probe already covered it
        ticker.tick().await;

        loop {
            ticker.tick().await;
            if pool.is_closed() {
                break;
            }
            match sqlx::query(PING).execute(&pool).await {
                Ok(_) => tracing::debug!(
                    size = pool.size(),
                    idle = pool.num_idle(),
                    "Pool health check passed"
                ),
                Err(sqlx::Error::PoolClosed) => break,
                Err(error) => tracing::warn!(error = %error, "Pool health check failed"),
            }
        }

        tracing::debug!("Pool health monitor stopped");
    })
}
