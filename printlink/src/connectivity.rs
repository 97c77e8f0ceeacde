//! Connection lifecycle orchestration.
//!
//! [`ConnectivityService`] ties the collaborators together: it enumerates
//! paired devices through the transport provider, classifies each record,
//! drives the connect state machine against the printer adapter under the
//! configured timeout, and publishes every state transition on the event
//! bus.
//!
//! For one connect attempt the published order is always
//! `disconnected → connecting → {connected | failed}`; no transition is
//! skipped and a caller awaiting the returned future observes the same
//! final state as a caller watching the bus.

use std::sync::{Arc, Mutex, MutexGuard};

use log::{debug, info, warn};
use tokio::time::timeout;

use crate::Result;
use crate::adapter::{PrinterAdapter, PrinterStatus};
use crate::classify::classify;
use crate::constants::defaults;
use crate::event_bus::EventBus;
use crate::models::{
    ConnectError, ConnectionConfig, ConnectionState, ConnectivityEvent, DeviceRecord,
};
use crate::transport::TransportProvider;

/// Orchestrates device discovery and the connection state machine.
///
/// The service is the sole owner of the [`ConnectionState`]; collaborators
/// are injected at construction so tests and alternate vendor stacks can
/// substitute their own implementations. One service instance exclusively
/// drives one adapter: the state-machine precondition guarantees that two
/// connect attempts never overlap.
pub struct ConnectivityService {
    provider: Arc<dyn TransportProvider>,
    adapter: Arc<dyn PrinterAdapter>,
    bus: Arc<EventBus>,
    state: Arc<Mutex<ConnectionState>>,
}

impl ConnectivityService {
    pub fn new(
        provider: Arc<dyn TransportProvider>,
        adapter: Arc<dyn PrinterAdapter>,
        bus: Arc<EventBus>,
    ) -> Self {
        Self {
            provider,
            adapter,
            bus,
            state: Arc::new(Mutex::new(ConnectionState::Disconnected)),
        }
    }

    /// Current state snapshot.
    pub fn state(&self) -> ConnectionState {
        *lock(&self.state)
    }

    /// Whether Bluetooth hardware exists on this system.
    pub async fn is_bluetooth_supported(&self) -> bool {
        self.provider.is_supported().await
    }

    /// Whether Bluetooth is currently enabled.
    pub async fn is_bluetooth_enabled(&self) -> bool {
        self.provider.is_enabled().await
    }

    /// Enumerates paired devices and classifies every record.
    ///
    /// Ordering follows the provider's snapshot. Publishes
    /// [`ConnectivityEvent::DiscoveryCompleted`] on success; provider
    /// failures propagate unchanged.
    pub async fn paired_devices(&self) -> Result<Vec<DeviceRecord>> {
        let raw = self.provider.list_paired_devices().await?;
        let records: Vec<DeviceRecord> = raw.iter().map(classify).collect();

        debug!(
            "Discovery found {} paired devices ({} printer candidates)",
            records.len(),
            records.iter().filter(|r| r.printer_candidate).count()
        );
        self.bus.publish(ConnectivityEvent::DiscoveryCompleted {
            count: records.len(),
        });
        Ok(records)
    }

    /// Starts an inquiry scan on the transport.
    pub async fn start_discovery(&self) -> Result<()> {
        self.provider.start_discovery().await
    }

    /// Stops a running inquiry scan.
    pub async fn stop_discovery(&self) -> Result<()> {
        self.provider.stop_discovery().await
    }

    /// Opens a connection to the peripheral described by `config`.
    ///
    /// Validates the configuration, transitions to `Connecting`, then
    /// drives the adapter's `open` under `config.timeout_ms`. The attempt
    /// itself runs in a spawned task: a caller that drops this future
    /// abandons only the await, not the attempt. The adapter still
    /// reaches a terminal state and the terminal events are still
    /// published.
    ///
    /// # Errors
    ///
    /// - [`ConnectError::InvalidConfig`] before the adapter is touched.
    /// - [`ConnectError::AlreadyConnecting`] / [`ConnectError::AlreadyConnected`]
    ///   when an attempt is in flight or a channel is open; the adapter's
    ///   `open` is not re-invoked.
    /// - [`ConnectError::ConnectTimeout`] when the channel does not open
    ///   within the budget, [`ConnectError::Adapter`] when the peripheral
    ///   reports a failure. Either way the state ends `Failed` and the
    ///   adapter is closed.
    pub async fn connect(&self, config: ConnectionConfig) -> Result<()> {
        config.validate()?;

        let old = {
            let mut state = lock(&self.state);
            match *state {
                ConnectionState::Connecting => return Err(ConnectError::AlreadyConnecting),
                ConnectionState::Connected => return Err(ConnectError::AlreadyConnected),
                current => {
                    *state = ConnectionState::Connecting;
                    current
                }
            }
        };
        self.bus.publish(ConnectivityEvent::StateChanged {
            old,
            new: ConnectionState::Connecting,
        });
        info!(
            "Connecting to {} over {} (timeout {} ms)",
            config.address, config.transport, config.timeout_ms
        );

        let attempt = tokio::spawn(drive_open(
            Arc::clone(&self.adapter),
            Arc::clone(&self.bus),
            Arc::clone(&self.state),
            config,
        ));

        attempt
            .await
            .unwrap_or_else(|e| Err(ConnectError::Adapter(format!("connect task failed: {e}"))))
    }

    /// Closes the connection.
    ///
    /// From `Connected`: closes the adapter, transitions to `Disconnected`
    /// and publishes the state change. From any other state this is a
    /// no-op success, so calling it twice in a row is fine.
    pub async fn disconnect(&self) -> Result<()> {
        {
            let mut state = lock(&self.state);
            if *state != ConnectionState::Connected {
                debug!("Disconnect requested while {}; nothing to do", *state);
                return Ok(());
            }
            *state = ConnectionState::Disconnected;
        }

        match timeout(defaults::disconnect_timeout(), self.adapter.close()).await {
            Ok(Ok(())) => {}
            Ok(Err(e)) => warn!("Adapter close reported: {e}"),
            Err(_) => warn!(
                "Adapter close did not finish within {} ms",
                defaults::DISCONNECT_TIMEOUT_MS
            ),
        }

        self.bus.publish(ConnectivityEvent::StateChanged {
            old: ConnectionState::Connected,
            new: ConnectionState::Disconnected,
        });
        info!("Disconnected");
        Ok(())
    }

    /// Writes raw bytes to the connected peripheral.
    ///
    /// Fails with [`ConnectError::InvalidState`] unless the state is
    /// `Connected`. When the adapter reports a failure and its channel
    /// collapsed, the state resets to `Disconnected`.
    pub async fn write(&self, bytes: &[u8]) -> Result<()> {
        {
            let state = lock(&self.state);
            if *state != ConnectionState::Connected {
                return Err(ConnectError::InvalidState {
                    operation: "write",
                    state: *state,
                });
            }
        }

        match self.adapter.write(bytes).await {
            Ok(()) => Ok(()),
            Err(err) => {
                if !self.adapter.is_open() {
                    warn!("Channel collapsed during write: {err}");
                    *lock(&self.state) = ConnectionState::Disconnected;
                    self.bus.publish(ConnectivityEvent::StateChanged {
                        old: ConnectionState::Connected,
                        new: ConnectionState::Disconnected,
                    });
                }
                Err(err)
            }
        }
    }

    /// Queries the peripheral's condition through the adapter.
    pub async fn printer_status(&self) -> Result<PrinterStatus> {
        self.adapter.status().await
    }
}

/// Runs one connect attempt to its terminal state.
///
/// Lives in its own task (see [`ConnectivityService::connect`]) so the
/// attempt finishes even when the caller goes away.
async fn drive_open(
    adapter: Arc<dyn PrinterAdapter>,
    bus: Arc<EventBus>,
    state: Arc<Mutex<ConnectionState>>,
    config: ConnectionConfig,
) -> Result<()> {
    let outcome = match timeout(config.timeout(), adapter.open(&config)).await {
        Ok(Ok(())) => Ok(()),
        Ok(Err(e)) => Err(e),
        Err(_) => Err(ConnectError::ConnectTimeout {
            timeout_ms: config.timeout_ms,
        }),
    };

    match outcome {
        Ok(()) => {
            *lock(&state) = ConnectionState::Connected;
            bus.publish(ConnectivityEvent::StateChanged {
                old: ConnectionState::Connecting,
                new: ConnectionState::Connected,
            });
            bus.publish(ConnectivityEvent::ConnectionSucceeded {
                address: config.address.clone(),
            });
            info!("Connected to {}", config.address);
            Ok(())
        }
        Err(err) => {
            // A timed-out `open` was dropped mid-flight; close to make sure
            // nothing is left half-open.
            if let Err(close_err) = adapter.close().await {
                warn!("Adapter close after failed connect also failed: {close_err}");
            }
            *lock(&state) = ConnectionState::Failed;
            bus.publish(ConnectivityEvent::StateChanged {
                old: ConnectionState::Connecting,
                new: ConnectionState::Failed,
            });
            bus.publish(ConnectivityEvent::ConnectionFailed {
                reason: err.to_string(),
            });
            warn!("Connect to {} failed: {err}", config.address);
            Err(err)
        }
    }
}

fn lock(state: &Mutex<ConnectionState>) -> MutexGuard<'_, ConnectionState> {
    state.lock().unwrap_or_else(|e| e.into_inner())
}
