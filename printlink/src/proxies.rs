//! D-Bus proxy interfaces for BlueZ.
//!
//! These proxies cover the subset of the BlueZ D-Bus API that device
//! enumeration and capability queries need. Object discovery itself goes
//! through the standard `org.freedesktop.DBus.ObjectManager` interface
//! (`zbus::fdo::ObjectManagerProxy`).

use zbus::Result;
use zbus::proxy;

/// Proxy for a local Bluetooth adapter (`hci0`, ...).
///
/// # Example
///
/// ```ignore
/// let conn = Connection::system().await?;
/// let adapter = BluezAdapterProxy::builder(&conn)
///     .path("/org/bluez/hci0")?
///     .build()
///     .await?;
/// println!("powered: {}", adapter.powered().await?);
/// ```
#[proxy(interface = "org.bluez.Adapter1", default_service = "org.bluez")]
pub trait BluezAdapter {
    /// Starts an inquiry scan for nearby devices.
    fn start_discovery(&self) -> Result<()>;

    /// Stops a running inquiry scan.
    fn stop_discovery(&self) -> Result<()>;

    /// Whether the adapter radio is powered on.
    #[zbus(property)]
    fn powered(&self) -> Result<bool>;

    /// Whether an inquiry scan is in progress.
    #[zbus(property)]
    fn discovering(&self) -> Result<bool>;
}

/// Proxy for a remote Bluetooth device known to BlueZ.
///
/// One object per remote device, at
/// `/org/bluez/<adapter>/dev_XX_XX_XX_XX_XX_XX`.
#[proxy(interface = "org.bluez.Device1", default_service = "org.bluez")]
pub trait BluezDevice {
    /// Manufacturer-assigned device name.
    #[zbus(property)]
    fn name(&self) -> Result<String>;

    /// User-customizable name; falls back to `name` when unset.
    #[zbus(property)]
    fn alias(&self) -> Result<String>;

    /// Remote device address (`XX:XX:XX:XX:XX:XX`).
    #[zbus(property)]
    fn address(&self) -> Result<String>;

    /// Whether the device is paired with this system.
    #[zbus(property)]
    fn paired(&self) -> Result<bool>;

    /// Raw 24-bit Class-of-Device value.
    #[zbus(property)]
    fn class(&self) -> Result<u32>;
}
