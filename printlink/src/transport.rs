//! Transport provider capability.
//!
//! A transport provider enumerates the peripherals reachable over one
//! transport (paired Bluetooth devices, mDNS-announced network printers,
//! ...). The connectivity service depends only on this trait; the crate
//! ships [`BluezTransportProvider`](crate::BluezTransportProvider) for
//! classic Bluetooth on Linux.

use async_trait::async_trait;

use crate::Result;
use crate::models::RawDeviceInfo;

/// Enumerates available peripherals for one transport.
#[async_trait]
pub trait TransportProvider: Send + Sync {
    /// Whether the transport hardware exists on this system.
    ///
    /// Pure capability query: no side effects, never fails, safe to call at
    /// any time including before any discovery.
    async fn is_supported(&self) -> bool;

    /// Whether the transport is currently powered/enabled.
    ///
    /// Same contract as [`is_supported`](TransportProvider::is_supported).
    async fn is_enabled(&self) -> bool;

    /// Produces a snapshot of devices paired with this system.
    ///
    /// Enumeration order is whatever the underlying platform reports;
    /// callers must not assume anything beyond "same call, same snapshot".
    ///
    /// # Errors
    ///
    /// Returns [`ConnectError::TransportUnavailable`](crate::ConnectError::TransportUnavailable)
    /// when the hardware is missing or disabled. Must not block
    /// indefinitely.
    async fn list_paired_devices(&self) -> Result<Vec<RawDeviceInfo>>;

    /// Starts an inquiry scan for nearby devices.
    async fn start_discovery(&self) -> Result<()>;

    /// Stops a running inquiry scan.
    async fn stop_discovery(&self) -> Result<()>;

    /// Whether an inquiry scan is currently running.
    async fn is_discovering(&self) -> bool;
}
