//! A Rust library for printer connectivity over BlueZ D-Bus and TCP.
//!
//! This crate provides a high-level async API for reaching receipt and
//! label printers:
//!
//! - Enumerating paired Bluetooth peripherals and classifying printer
//!   candidates
//! - Driving a connection state machine with timeout and clean failure
//!   handling
//! - Broadcasting lifecycle events to any number of subscribers
//! - Writing raw bytes to a connected peripheral
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use printlink::{
//!     BluezTransportProvider, ConnectionConfig, ConnectivityService, EventBus,
//!     TcpPrinterAdapter, preferred_target,
//! };
//!
//! # async fn example() -> printlink::Result<()> {
//! let provider = Arc::new(BluezTransportProvider::new().await?);
//! let bus = Arc::new(EventBus::new());
//! let service = ConnectivityService::new(
//!     provider,
//!     Arc::new(TcpPrinterAdapter::new()),
//!     Arc::clone(&bus),
//! );
//!
//! let devices = service.paired_devices().await?;
//! if let Some(target) = preferred_target(&devices) {
//!     println!("would connect to {target}");
//! }
//!
//! service
//!     .connect(ConnectionConfig::network("192.168.0.87", 9100))
//!     .await?;
//! service.write(b"HELLO\n").await?;
//! service.disconnect().await?;
//! # Ok(())
//! # }
//! ```
//!
//! # Error Handling
//!
//! All operations return `Result<T, ConnectError>`. The error type provides
//! specific variants for common failures like unavailable transports,
//! connect timeouts, and operations attempted from the wrong state. No
//! failure is fatal: the service stays usable after any error, and the
//! library never retries on its own. Retry policy belongs to the caller,
//! where conditions like "Bluetooth is off" are user-actionable.
//!
//! # Lifecycle Events
//!
//! Every state transition is broadcast on an [`EventBus`] the caller
//! constructs and owns. Subscribers see events in publish order; a caller
//! that only watches the bus observes the same final state as a caller
//! awaiting the direct result.
//!
//! # Logging
//!
//! This crate uses the [`log`](https://docs.rs/log) facade for logging. To
//! see log output, add a logging implementation like `env_logger`:
//!
//! ```no_run,ignore
//! env_logger::init();
//! // ...
//! ```

// Internal implementation modules
mod proxies;

// Public API modules
pub mod adapter;
pub mod bluetooth;
pub mod classify;
pub mod connectivity;
pub mod constants;
pub mod event_bus;
pub mod models;
pub mod tcp;
pub mod transport;

// Re-exported public API
pub use adapter::{PrinterAdapter, PrinterStatus};
pub use bluetooth::BluezTransportProvider;
pub use classify::{classify, preferred_target};
pub use connectivity::ConnectivityService;
pub use event_bus::{EventBus, Subscription, SubscriptionId};
pub use models::{
    ConnectError, ConnectionConfig, ConnectionState, ConnectivityEvent, DeviceClass, DeviceRecord,
    RawDeviceInfo, ServiceClasses, TransportType,
};
pub use tcp::TcpPrinterAdapter;
pub use transport::TransportProvider;

/// A specialized `Result` type for connectivity operations.
pub type Result<T> = std::result::Result<T, ConnectError>;
