//! Raw TCP stream adapter.
//!
//! Speaks no vendor protocol: bytes written go straight to the socket,
//! which is the convention for port-9100 network printing. Vendor stacks
//! that need a control protocol implement
//! [`PrinterAdapter`](crate::PrinterAdapter) themselves.

use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use log::{debug, warn};
use tokio::io::AsyncWriteExt;
use tokio::net::TcpStream;
use tokio::sync::Mutex;

use crate::Result;
use crate::adapter::{PrinterAdapter, PrinterStatus};
use crate::models::{ConnectError, ConnectionConfig, TransportType};

/// Printer adapter backed by a plain TCP stream.
#[derive(Default)]
pub struct TcpPrinterAdapter {
    stream: Mutex<Option<TcpStream>>,
    // `is_open` is synchronous, so the flag lives outside the async mutex.
    open: AtomicBool,
}

impl TcpPrinterAdapter {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl PrinterAdapter for TcpPrinterAdapter {
    async fn open(&self, config: &ConnectionConfig) -> Result<()> {
        if config.transport != TransportType::Network {
            return Err(ConnectError::InvalidConfig(format!(
                "TCP adapter cannot open {} connections",
                config.transport
            )));
        }

        let mut guard = self.stream.lock().await;
        if guard.is_some() {
            return Err(ConnectError::AlreadyConnected);
        }

        debug!("Opening TCP channel to {}:{}", config.address, config.port);
        match TcpStream::connect((config.address.as_str(), config.port)).await {
            Ok(stream) => {
                *guard = Some(stream);
                self.open.store(true, Ordering::SeqCst);
                Ok(())
            }
            Err(e) => Err(ConnectError::Adapter(format!(
                "connect to {}:{} failed: {e}",
                config.address, config.port
            ))),
        }
    }

    async fn close(&self) -> Result<()> {
        let mut guard = self.stream.lock().await;
        self.open.store(false, Ordering::SeqCst);
        if let Some(mut stream) = guard.take() {
            if let Err(e) = stream.shutdown().await {
                warn!("TCP shutdown failed: {e}");
            }
            debug!("TCP channel closed");
        }
        Ok(())
    }

    fn is_open(&self) -> bool {
        self.open.load(Ordering::SeqCst)
    }

    async fn write(&self, bytes: &[u8]) -> Result<()> {
        let mut guard = self.stream.lock().await;
        let Some(stream) = guard.as_mut() else {
            return Err(ConnectError::Adapter("channel is not open".into()));
        };

        match stream.write_all(bytes).await {
            Ok(()) => Ok(()),
            Err(e) => {
                // A write error means the socket is gone; drop it so the
                // adapter reports closed.
                guard.take();
                self.open.store(false, Ordering::SeqCst);
                Err(ConnectError::Adapter(format!("write failed: {e}")))
            }
        }
    }

    /// A raw socket carries no printer status channel; this reports
    /// reachability only.
    async fn status(&self) -> Result<PrinterStatus> {
        Ok(if self.is_open() {
            PrinterStatus::ready()
        } else {
            PrinterStatus::offline()
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::AsyncReadExt;
    use tokio::net::TcpListener;

    async fn local_listener() -> (TcpListener, ConnectionConfig) {
        let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
        let port = listener.local_addr().expect("local addr").port();
        (listener, ConnectionConfig::network("127.0.0.1", port))
    }

    #[tokio::test]
    async fn open_rejects_bluetooth_config() {
        let adapter = TcpPrinterAdapter::new();
        let config = ConnectionConfig::bluetooth("00:11:22:33:44:55");
        let result = adapter.open(&config).await;
        assert!(matches!(result, Err(ConnectError::InvalidConfig(_))));
        assert!(!adapter.is_open());
    }

    #[tokio::test]
    async fn write_on_closed_channel_fails() {
        let adapter = TcpPrinterAdapter::new();
        let result = adapter.write(b"data").await;
        assert!(matches!(result, Err(ConnectError::Adapter(_))));
    }

    #[tokio::test]
    async fn open_write_close_roundtrip() {
        let (listener, config) = local_listener().await;
        let adapter = TcpPrinterAdapter::new();

        adapter.open(&config).await.expect("open");
        assert!(adapter.is_open());
        assert_eq!(adapter.status().await.expect("status"), PrinterStatus::ready());

        let (mut peer, _) = listener.accept().await.expect("accept");
        adapter.write(b"HELLO").await.expect("write");

        let mut buf = [0u8; 5];
        peer.read_exact(&mut buf).await.expect("read");
        assert_eq!(&buf, b"HELLO");

        adapter.close().await.expect("close");
        assert!(!adapter.is_open());
        assert_eq!(
            adapter.status().await.expect("status"),
            PrinterStatus::offline()
        );
    }

    #[tokio::test]
    async fn close_is_idempotent() {
        let adapter = TcpPrinterAdapter::new();
        adapter.close().await.expect("first close");
        adapter.close().await.expect("second close");
        assert!(!adapter.is_open());
    }

    #[tokio::test]
    async fn reopen_while_open_is_rejected() {
        let (_listener, config) = local_listener().await;
        let adapter = TcpPrinterAdapter::new();

        adapter.open(&config).await.expect("open");
        let result = adapter.open(&config).await;
        assert!(matches!(result, Err(ConnectError::AlreadyConnected)));
        assert!(adapter.is_open());
    }

    #[tokio::test]
    async fn failed_open_leaves_adapter_closed() {
        let (listener, config) = local_listener().await;
        // Close the listener so the port refuses connections.
        drop(listener);

        let adapter = TcpPrinterAdapter::new();
        let result = adapter.open(&config).await;
        assert!(matches!(result, Err(ConnectError::Adapter(_))));
        assert!(!adapter.is_open());
    }
}
