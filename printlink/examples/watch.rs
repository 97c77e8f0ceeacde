use std::sync::Arc;

use printlink::{BluezTransportProvider, Result};

#[tokio::main]
async fn main() -> Result<()> {
    let provider = Arc::new(BluezTransportProvider::new().await?);

    println!("Watching for Bluetooth device changes (Ctrl-C to stop)...");
    provider
        .monitor_device_changes(|| {
            println!("Device tree changed; re-enumerate paired devices.");
        })
        .await
}
