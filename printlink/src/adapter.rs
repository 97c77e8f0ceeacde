//! Printer adapter capability.
//!
//! The adapter is the seam to vendor-specific hardware control: the
//! connectivity service drives connections exclusively through this trait,
//! so peripherals and vendor stacks can be substituted without touching the
//! service. The crate ships [`TcpPrinterAdapter`](crate::TcpPrinterAdapter)
//! for raw network printing; Bluetooth vendor stacks plug in behind the
//! same trait.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::Result;
use crate::models::ConnectionConfig;

/// Point-in-time report of a peripheral's condition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrinterStatus {
    pub online: bool,
    pub has_paper: bool,
    pub has_error: bool,
    pub message: Option<String>,
}

impl PrinterStatus {
    /// Status of an open channel reporting no faults.
    pub fn ready() -> Self {
        Self {
            online: true,
            has_paper: true,
            has_error: false,
            message: None,
        }
    }

    /// Status of a closed channel.
    pub fn offline() -> Self {
        Self {
            online: false,
            has_paper: false,
            has_error: false,
            message: None,
        }
    }
}

/// Capability boundary to one concrete peripheral.
///
/// An adapter instance is exclusively driven by one
/// [`ConnectivityService`](crate::ConnectivityService) at a time.
#[async_trait]
pub trait PrinterAdapter: Send + Sync {
    /// Opens a channel to the peripheral described by `config`.
    ///
    /// The service runs this under the configured timeout. Whenever `open`
    /// fails or its future is dropped mid-flight, the adapter must be left
    /// closed: `is_open()` reports `false` and no resource is leaked.
    async fn open(&self, config: &ConnectionConfig) -> Result<()>;

    /// Closes the channel. Idempotent; closing a closed adapter succeeds.
    async fn close(&self) -> Result<()>;

    /// Whether a channel is currently open.
    fn is_open(&self) -> bool;

    /// Writes raw bytes to the peripheral.
    async fn write(&self, bytes: &[u8]) -> Result<()>;

    /// Queries the peripheral's condition.
    async fn status(&self) -> Result<PrinterStatus>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ready_status() {
        let status = PrinterStatus::ready();
        assert!(status.online);
        assert!(status.has_paper);
        assert!(!status.has_error);
        assert!(status.message.is_none());
    }

    #[test]
    fn offline_status() {
        let status = PrinterStatus::offline();
        assert!(!status.online);
        assert!(!status.has_error);
    }
}
