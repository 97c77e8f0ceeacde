use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};
use std::time::Duration;
use thiserror::Error;

use crate::constants::{defaults, major_class};

/// Lifecycle states of a logical printer connection.
///
/// Exactly one [`ConnectivityService`](crate::ConnectivityService) instance
/// owns the current state; callers observe it but never mutate it directly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConnectionState {
    /// No channel is open and no attempt is in flight.
    Disconnected,
    /// A connect attempt is in flight.
    Connecting,
    /// A channel to the peripheral is open.
    Connected,
    /// The last connect attempt ended in an error.
    Failed,
}

impl Display for ConnectionState {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Disconnected => write!(f, "disconnected"),
            Self::Connecting => write!(f, "connecting"),
            Self::Connected => write!(f, "connected"),
            Self::Failed => write!(f, "failed"),
        }
    }
}

/// Transports over which a peripheral can be reached.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TransportType {
    /// Classic Bluetooth (RFCOMM/SPP class of peripherals).
    Bluetooth,
    /// TCP network printing (raw stream, conventionally port 9100).
    Network,
}

impl Display for TransportType {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Bluetooth => write!(f, "Bluetooth"),
            Self::Network => write!(f, "Network"),
        }
    }
}

/// Bluetooth Class-of-Device major device classes.
///
/// Decoded from bits 8-12 of the 24-bit Class-of-Device field that BlueZ
/// reports for each remote device.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DeviceClass {
    Miscellaneous,
    Computer,
    Phone,
    NetworkAccessPoint,
    AudioVideo,
    Peripheral,
    Imaging,
    Wearable,
    Toy,
    Health,
    /// Reserved value reported by devices that do not declare a class.
    Uncategorized,
    /// Major class code not mapped to a specific variant.
    Other(u32),
}

impl DeviceClass {
    /// Extracts the major device class from a raw Class-of-Device value.
    pub fn from_cod(cod: u32) -> Self {
        Self::from((cod >> major_class::SHIFT) & major_class::MASK)
    }
}

impl From<u32> for DeviceClass {
    fn from(code: u32) -> Self {
        match code {
            0x00 => Self::Miscellaneous,
            0x01 => Self::Computer,
            0x02 => Self::Phone,
            0x03 => Self::NetworkAccessPoint,
            0x04 => Self::AudioVideo,
            0x05 => Self::Peripheral,
            0x06 => Self::Imaging,
            0x07 => Self::Wearable,
            0x08 => Self::Toy,
            0x09 => Self::Health,
            0x1f => Self::Uncategorized,
            v => Self::Other(v),
        }
    }
}

impl Display for DeviceClass {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Miscellaneous => write!(f, "Miscellaneous"),
            Self::Computer => write!(f, "Computer"),
            Self::Phone => write!(f, "Phone"),
            Self::NetworkAccessPoint => write!(f, "Network Access Point"),
            Self::AudioVideo => write!(f, "Audio/Video"),
            Self::Peripheral => write!(f, "Peripheral"),
            Self::Imaging => write!(f, "Imaging"),
            Self::Wearable => write!(f, "Wearable"),
            Self::Toy => write!(f, "Toy"),
            Self::Health => write!(f, "Health"),
            Self::Uncategorized => write!(f, "Uncategorized"),
            Self::Other(v) => write!(f, "Other({v})"),
        }
    }
}

bitflags::bitflags! {
    /// Service-class bits of the Class-of-Device field (bits 13-23).
    ///
    /// Printers conventionally advertise `RENDERING`.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct ServiceClasses: u32 {
        const LIMITED_DISCOVERABLE = 1 << 13;
        const POSITIONING = 1 << 16;
        const NETWORKING = 1 << 17;
        const RENDERING = 1 << 18;
        const CAPTURING = 1 << 19;
        const OBJECT_TRANSFER = 1 << 20;
        const AUDIO = 1 << 21;
        const TELEPHONY = 1 << 22;
        const INFORMATION = 1 << 23;
    }
}

impl ServiceClasses {
    /// Extracts the service-class bits from a raw Class-of-Device value.
    pub fn from_cod(cod: u32) -> Self {
        Self::from_bits_truncate(cod)
    }
}

/// Transport-level device record as reported by a
/// [`TransportProvider`](crate::TransportProvider).
///
/// This is the raw material the classifier turns into a [`DeviceRecord`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawDeviceInfo {
    pub address: String,
    pub name: Option<String>,
    pub alias: Option<String>,
    pub class_of_device: Option<u32>,
    pub paired: bool,
}

/// A discovered peripheral, annotated by the classifier.
///
/// Immutable once produced; identity is `address`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceRecord {
    pub name: String,
    pub address: String,
    pub device_class: DeviceClass,
    pub printer_candidate: bool,
}

impl Display for DeviceRecord {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({}) [{}]", self.name, self.address, self.device_class)?;
        if self.printer_candidate {
            write!(f, " *printer*")?;
        }
        Ok(())
    }
}

/// Configuration for one connect attempt.
///
/// Created fresh per call and discarded after use. Constructors carry the
/// conventional defaults; [`ConnectionConfig::validate`] rejects malformed
/// values instead of silently correcting them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnectionConfig {
    pub transport: TransportType,
    /// Bluetooth device address or network host, depending on `transport`.
    pub address: String,
    /// TCP port; ignored for Bluetooth.
    pub port: u16,
    pub timeout_ms: u64,
}

impl ConnectionConfig {
    /// Bluetooth connection to a paired device address.
    pub fn bluetooth(address: impl Into<String>) -> Self {
        Self {
            transport: TransportType::Bluetooth,
            address: address.into(),
            port: 0,
            timeout_ms: defaults::CONNECT_TIMEOUT_MS,
        }
    }

    /// Raw-stream network connection to `host:port`.
    pub fn network(host: impl Into<String>, port: u16) -> Self {
        Self {
            transport: TransportType::Network,
            address: host.into(),
            port,
            timeout_ms: defaults::CONNECT_TIMEOUT_MS,
        }
    }

    /// Overrides the connect timeout.
    pub fn with_timeout(mut self, timeout_ms: u64) -> Self {
        self.timeout_ms = timeout_ms;
        self
    }

    /// The connect budget as a [`Duration`].
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    /// Checks the configuration against the accepted ranges.
    ///
    /// # Errors
    ///
    /// Returns [`ConnectError::InvalidConfig`] when the timeout is zero, the
    /// address is empty or (for Bluetooth) not a device address, or the port
    /// is zero for a network connection.
    pub fn validate(&self) -> crate::Result<()> {
        if self.timeout_ms == 0 {
            return Err(ConnectError::InvalidConfig(
                "timeout must be greater than zero".into(),
            ));
        }
        if self.address.is_empty() {
            return Err(ConnectError::InvalidConfig("address must not be empty".into()));
        }
        match self.transport {
            TransportType::Bluetooth => {
                if !is_device_address(&self.address) {
                    return Err(ConnectError::InvalidConfig(format!(
                        "'{}' is not a Bluetooth device address",
                        self.address
                    )));
                }
            }
            TransportType::Network => {
                if self.port == 0 {
                    return Err(ConnectError::InvalidConfig(
                        "network port must be in 1..=65535".into(),
                    ));
                }
            }
        }
        Ok(())
    }
}

/// Whether `s` looks like a colon-separated Bluetooth device address
/// (`XX:XX:XX:XX:XX:XX`).
fn is_device_address(s: &str) -> bool {
    let parts: Vec<&str> = s.split(':').collect();
    parts.len() == 6
        && parts
            .iter()
            .all(|p| p.len() == 2 && p.chars().all(|c| c.is_ascii_hexdigit()))
}

/// Connectivity lifecycle notifications.
///
/// Published once per transition on the [`EventBus`](crate::EventBus); each
/// subscriber observes events in publish order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConnectivityEvent {
    /// A device enumeration pass finished.
    DiscoveryCompleted { count: usize },
    /// The connection state machine moved from `old` to `new`.
    StateChanged {
        old: ConnectionState,
        new: ConnectionState,
    },
    /// A connect attempt reached the connected state.
    ConnectionSucceeded { address: String },
    /// A connect attempt ended in an error.
    ConnectionFailed { reason: String },
}

/// Errors that can occur during connectivity operations.
#[derive(Debug, Error)]
pub enum ConnectError {
    /// Transport hardware is missing, disabled, or unreachable.
    #[error("transport unavailable: {0}")]
    TransportUnavailable(String),

    /// The channel did not open within the configured budget.
    #[error("connect timed out after {timeout_ms} ms")]
    ConnectTimeout { timeout_ms: u64 },

    /// The peripheral or its driver reported a failure.
    #[error("adapter error: {0}")]
    Adapter(String),

    /// A connect attempt is already in flight.
    #[error("a connect attempt is already in progress")]
    AlreadyConnecting,

    /// A channel is already open.
    #[error("already connected")]
    AlreadyConnected,

    /// The operation is not allowed in the current connection state.
    #[error("cannot {operation} while {state}")]
    InvalidState {
        operation: &'static str,
        state: ConnectionState,
    },

    /// The connection configuration failed validation.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}
