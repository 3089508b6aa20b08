//! Session Driver
//!
//! Schedules the two timed callbacks the controller needs:
//!
//! - the fixed connect delay (simulated latency, default 2 s) that
//!   turns Connecting into Connected, and
//! - the once-per-second tick that advances the session timer while
//!   Connected.
//!
//! The tick task handle is owned by the driver and aborted on every
//! exit from Connected, so repeated connect/disconnect cycles never
//! leave a stale timer running or start a duplicate one.

use crate::catalog::{CatalogError, ServerId};
use crate::session::{ConnectionController, ConnectionStatus, StatusSnapshot, ToggleOutcome};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{Mutex, RwLock};
use tokio::task::JoinHandle;
use tracing::{debug, info};

/// Driver timing configuration
#[derive(Debug, Clone, Copy)]
pub struct DriverConfig {
    /// Simulated connect latency
    pub connect_delay: Duration,
    /// Session timer resolution
    pub tick_interval: Duration,
}

impl Default for DriverConfig {
    fn default() -> Self {
        Self {
            connect_delay: Duration::from_secs(2),
            tick_interval: Duration::from_secs(1),
        }
    }
}

/// Async wrapper around [`ConnectionController`]
///
/// All transitions are serialized through one lock, so events are
/// processed one at a time regardless of which task delivers them.
pub struct SessionDriver {
    controller: Arc<RwLock<ConnectionController>>,
    config: DriverConfig,
    /// Running tick task, held so it can be aborted on disconnect
    tick_task: Arc<Mutex<Option<JoinHandle<()>>>>,
}

impl SessionDriver {
    /// Create a driver over a controller
    pub fn new(controller: ConnectionController, config: DriverConfig) -> Self {
        Self {
            controller: Arc::new(RwLock::new(controller)),
            config,
            tick_task: Arc::new(Mutex::new(None)),
        }
    }

    /// Shared handle to the controller
    pub fn controller(&self) -> Arc<RwLock<ConnectionController>> {
        self.controller.clone()
    }

    /// Current state
    pub async fn status(&self) -> ConnectionStatus {
        self.controller.read().await.status()
    }

    /// Copy out everything the dashboard renders
    pub async fn snapshot(&self) -> StatusSnapshot {
        self.controller.read().await.snapshot()
    }

    /// Replace the selection (valid in every state)
    pub async fn select_server(&self, id: ServerId) -> Result<(), CatalogError> {
        self.controller.write().await.select_server(id)
    }

    /// Handle the connect/disconnect button
    ///
    /// From Disconnected this schedules the delayed completion; from
    /// Connected it tears the session down and stops the tick task;
    /// while Connecting it does nothing.
    pub async fn toggle(&self) {
        let outcome = self.controller.write().await.toggle();

        match outcome {
            ToggleOutcome::ConnectStarted => {
                let server = self.controller.read().await.selected_profile().name.clone();
                info!("connecting to {}...", server);
                self.spawn_connect();
            }
            ToggleOutcome::Disconnected => {
                self.stop_tick().await;
                info!("disconnected");
            }
            ToggleOutcome::Ignored => {}
        }
    }

    /// Schedule the simulated negotiation
    fn spawn_connect(&self) {
        let controller = self.controller.clone();
        let tick_task = self.tick_task.clone();
        let delay = self.config.connect_delay;
        let tick_interval = self.config.tick_interval;

        tokio::spawn(async move {
            tokio::time::sleep(delay).await;

            controller.write().await.complete_connect();
            info!("connected");

            let handle = spawn_tick(controller, tick_interval);
            *tick_task.lock().await = Some(handle);
        });
    }

    /// Abort the running tick task, if any
    async fn stop_tick(&self) {
        if let Some(handle) = self.tick_task.lock().await.take() {
            handle.abort();
            debug!("session timer stopped");
        }
    }
}

/// Spawn the per-second session timer
fn spawn_tick(
    controller: Arc<RwLock<ConnectionController>>,
    tick_interval: Duration,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(tick_interval);
        // The first tick completes immediately; consume it so the
        // timer advances one full interval after connecting
        interval.tick().await;

        loop {
            interval.tick().await;

            let mut guard = controller.write().await;
            if !guard.status().is_connected() {
                break;
            }
            guard.tick();
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::address::FixedMaskedGenerator;
    use std::net::{Ipv4Addr, Ipv6Addr};

    fn driver() -> SessionDriver {
        let controller = ConnectionController::with_defaults(Box::new(
            FixedMaskedGenerator::new(Ipv4Addr::new(198, 51, 100, 42), Ipv6Addr::LOCALHOST),
        ));
        SessionDriver::new(controller, DriverConfig::default())
    }

    async fn settle(ms: u64) {
        // Paused clock: this advances virtual time, waking every
        // scheduled task with an earlier deadline first
        tokio::time::sleep(Duration::from_millis(ms)).await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_connect_after_fixed_delay() {
        let driver = driver();

        driver.toggle().await;
        assert_eq!(driver.status().await, ConnectionStatus::Connecting);
        assert!(driver.snapshot().await.masked.is_none());

        settle(1_900).await;
        assert_eq!(driver.status().await, ConnectionStatus::Connecting);

        settle(200).await;
        let snapshot = driver.snapshot().await;
        assert_eq!(snapshot.status, ConnectionStatus::Connected);
        assert_eq!(
            snapshot.masked.unwrap().v4,
            Ipv4Addr::new(198, 51, 100, 42)
        );
        assert_eq!(snapshot.uptime_secs, 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_toggle_ignored_while_connecting() {
        let driver = driver();

        driver.toggle().await;
        driver.toggle().await;
        driver.toggle().await;
        assert_eq!(driver.status().await, ConnectionStatus::Connecting);

        settle(2_100).await;
        assert_eq!(driver.status().await, ConnectionStatus::Connected);
    }

    #[tokio::test(start_paused = true)]
    async fn test_timer_advances_one_per_second() {
        let driver = driver();

        driver.toggle().await;
        settle(2_100).await;
        assert_eq!(driver.snapshot().await.uptime_secs, 0);

        settle(3_000).await;
        assert_eq!(driver.snapshot().await.uptime_secs, 3);

        settle(1_000).await;
        assert_eq!(driver.snapshot().await.uptime_secs, 4);
    }

    #[tokio::test(start_paused = true)]
    async fn test_disconnect_stops_timer_and_clears_mask() {
        let driver = driver();

        driver.toggle().await;
        settle(2_100).await;
        settle(2_000).await;
        assert_eq!(driver.snapshot().await.uptime_secs, 2);

        driver.toggle().await;
        let snapshot = driver.snapshot().await;
        assert_eq!(snapshot.status, ConnectionStatus::Disconnected);
        assert!(snapshot.masked.is_none());
        assert_eq!(snapshot.uptime_secs, 0);

        // No leaked timer keeps counting
        settle(5_000).await;
        assert_eq!(driver.snapshot().await.uptime_secs, 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_reconnect_cycle_restarts_timer_cleanly() {
        let driver = driver();

        driver.toggle().await;
        settle(2_100).await;
        settle(4_000).await;
        assert_eq!(driver.snapshot().await.uptime_secs, 4);

        driver.toggle().await;
        driver.toggle().await;
        settle(2_100).await;

        let snapshot = driver.snapshot().await;
        assert_eq!(snapshot.status, ConnectionStatus::Connected);
        assert_eq!(snapshot.uptime_secs, 0);

        // A single timer, not the old one plus a new one
        settle(2_000).await;
        assert_eq!(driver.snapshot().await.uptime_secs, 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_select_server_mid_connection() {
        let driver = driver();

        driver.toggle().await;
        driver.select_server(ServerId::Germany).await.unwrap();
        assert_eq!(driver.snapshot().await.server.name, "Frankfurt");

        settle(2_100).await;
        assert_eq!(driver.status().await, ConnectionStatus::Connected);
        assert_eq!(driver.snapshot().await.server.name, "Frankfurt");
    }
}
