//! BlueZ-backed transport provider.
//!
//! Enumerates paired devices and answers capability queries by talking to
//! the BlueZ daemon over the system D-Bus. Devices must already be paired
//! (via `bluetoothctl` or a desktop applet) to show up in
//! [`list_paired_devices`](TransportProvider::list_paired_devices);
//! [`start_discovery`](TransportProvider::start_discovery) runs an inquiry
//! scan so new peripherals become visible to the pairing agent.

use std::pin::Pin;

use async_trait::async_trait;
use futures::stream::{Stream, StreamExt};
use log::{debug, warn};
use zbus::Connection;
use zbus::fdo::ObjectManagerProxy;
use zvariant::OwnedObjectPath;

use crate::Result;
use crate::models::{ConnectError, RawDeviceInfo};
use crate::proxies::{BluezAdapterProxy, BluezDeviceProxy};
use crate::transport::TransportProvider;

const BLUEZ_SERVICE: &str = "org.bluez";
const ADAPTER_INTERFACE: &str = "org.bluez.Adapter1";
const DEVICE_INTERFACE: &str = "org.bluez.Device1";

/// Transport provider for classic Bluetooth via BlueZ.
#[derive(Clone)]
pub struct BluezTransportProvider {
    conn: Connection,
}

impl BluezTransportProvider {
    /// Connects to the system D-Bus.
    pub async fn new() -> Result<Self> {
        let conn = Connection::system().await.map_err(|e| {
            ConnectError::TransportUnavailable(format!("system bus unavailable: {e}"))
        })?;
        Ok(Self { conn })
    }

    /// Wraps an existing D-Bus connection (e.g. a shared session-wide one).
    pub fn with_connection(conn: Connection) -> Self {
        Self { conn }
    }

    async fn object_manager(&self) -> Result<ObjectManagerProxy<'_>> {
        ObjectManagerProxy::builder(&self.conn)
            .destination(BLUEZ_SERVICE)
            .map_err(transport_err)?
            .path("/")
            .map_err(transport_err)?
            .build()
            .await
            .map_err(transport_err)
    }

    /// Object paths of all local adapters (`/org/bluez/hci0`, ...).
    async fn adapter_paths(&self) -> Result<Vec<OwnedObjectPath>> {
        let om = self.object_manager().await?;
        let objects = om.get_managed_objects().await.map_err(transport_err)?;
        Ok(objects
            .into_iter()
            .filter(|(_, ifaces)| ifaces.keys().any(|i| i.as_str() == ADAPTER_INTERFACE))
            .map(|(path, _)| path)
            .collect())
    }

    /// Proxy for the first local adapter.
    async fn first_adapter(&self) -> Result<BluezAdapterProxy<'_>> {
        let path = self
            .adapter_paths()
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| {
                ConnectError::TransportUnavailable("no Bluetooth adapter found".into())
            })?;
        BluezAdapterProxy::builder(&self.conn)
            .path(path)
            .map_err(transport_err)?
            .build()
            .await
            .map_err(transport_err)
    }

    async fn device_proxy(&self, path: OwnedObjectPath) -> Result<BluezDeviceProxy<'_>> {
        BluezDeviceProxy::builder(&self.conn)
            .path(path)
            .map_err(transport_err)?
            .build()
            .await
            .map_err(transport_err)
    }

    /// Monitors the BlueZ object tree for device additions and removals.
    ///
    /// Subscribes to the ObjectManager `InterfacesAdded` and
    /// `InterfacesRemoved` signals and invokes the callback whenever the
    /// tree changes, so callers can re-enumerate without polling. Runs
    /// until an error occurs; spawn it on a background task.
    pub async fn monitor_device_changes<F>(&self, callback: F) -> Result<()>
    where
        F: Fn() + 'static,
    {
        let om = self.object_manager().await?;
        let added = om.receive_interfaces_added().await.map_err(transport_err)?;
        let removed = om
            .receive_interfaces_removed()
            .await
            .map_err(transport_err)?;

        let streams: Vec<Pin<Box<dyn Stream<Item = ()>>>> =
            vec![Box::pin(added.map(|_| ())), Box::pin(removed.map(|_| ()))];
        let mut merged = futures::stream::select_all(streams);

        debug!("Monitoring BlueZ object tree for device changes");
        while let Some(()) = merged.next().await {
            debug!("Bluetooth device tree changed");
            callback();
        }

        warn!("BlueZ signal stream ended unexpectedly");
        Err(ConnectError::TransportUnavailable(
            "signal stream ended".into(),
        ))
    }
}

#[async_trait]
impl TransportProvider for BluezTransportProvider {
    async fn is_supported(&self) -> bool {
        match self.adapter_paths().await {
            Ok(paths) => !paths.is_empty(),
            Err(e) => {
                debug!("Bluetooth support query failed: {e}");
                false
            }
        }
    }

    async fn is_enabled(&self) -> bool {
        let adapter = match self.first_adapter().await {
            Ok(adapter) => adapter,
            Err(e) => {
                debug!("Bluetooth enabled query failed: {e}");
                return false;
            }
        };
        adapter.powered().await.unwrap_or(false)
    }

    async fn list_paired_devices(&self) -> Result<Vec<RawDeviceInfo>> {
        // Fail loudly here rather than returning an empty list: a missing
        // or powered-off adapter is a user-actionable condition.
        let adapter = self.first_adapter().await?;
        if !adapter.powered().await.unwrap_or(false) {
            return Err(ConnectError::TransportUnavailable(
                "Bluetooth adapter is powered off".into(),
            ));
        }

        let om = self.object_manager().await?;
        let objects = om.get_managed_objects().await.map_err(transport_err)?;

        let mut devices = Vec::new();
        for (path, ifaces) in objects {
            if !ifaces.keys().any(|i| i.as_str() == DEVICE_INTERFACE) {
                continue;
            }

            let dev = self.device_proxy(path.clone()).await?;
            if !dev.paired().await.unwrap_or(false) {
                continue;
            }

            let address = match dev.address().await {
                Ok(addr) => addr,
                Err(e) => {
                    warn!("Failed to read address for {}: {e}", path.as_str());
                    continue;
                }
            };

            devices.push(RawDeviceInfo {
                address,
                name: dev.name().await.ok(),
                alias: dev.alias().await.ok(),
                class_of_device: dev.class().await.ok(),
                paired: true,
            });
        }

        debug!("Enumerated {} paired Bluetooth devices", devices.len());
        Ok(devices)
    }

    async fn start_discovery(&self) -> Result<()> {
        let adapter = self.first_adapter().await?;
        adapter.start_discovery().await.map_err(transport_err)?;
        debug!("Bluetooth inquiry scan started");
        Ok(())
    }

    async fn stop_discovery(&self) -> Result<()> {
        let adapter = self.first_adapter().await?;
        if adapter.discovering().await.unwrap_or(false) {
            adapter.stop_discovery().await.map_err(transport_err)?;
            debug!("Bluetooth inquiry scan stopped");
        }
        Ok(())
    }

    async fn is_discovering(&self) -> bool {
        let adapter = match self.first_adapter().await {
            Ok(adapter) => adapter,
            Err(_) => return false,
        };
        adapter.discovering().await.unwrap_or(false)
    }
}

/// Folds any platform bus error into `TransportUnavailable`.
fn transport_err(e: impl std::fmt::Display) -> ConnectError {
    ConnectError::TransportUnavailable(e.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transport_err_preserves_message() {
        let err = transport_err("org.bluez not activatable");
        match err {
            ConnectError::TransportUnavailable(msg) => {
                assert_eq!(msg, "org.bluez not activatable");
            }
            other => panic!("expected TransportUnavailable, got {other:?}"),
        }
    }

    // Enumeration and discovery control need a running BlueZ daemon on the
    // system bus, so they are exercised by the examples rather than unit
    // tests; the service-level behavior is covered in tests/ against an
    // in-memory provider.
}
