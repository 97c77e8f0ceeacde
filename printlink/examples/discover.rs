use std::sync::Arc;

use printlink::{
    BluezTransportProvider, ConnectivityService, EventBus, Result, TcpPrinterAdapter,
    preferred_target,
};

#[tokio::main]
async fn main() -> Result<()> {
    let provider = Arc::new(BluezTransportProvider::new().await?);
    let service = ConnectivityService::new(
        provider,
        Arc::new(TcpPrinterAdapter::new()),
        Arc::new(EventBus::new()),
    );

    println!(
        "Bluetooth supported: {}",
        service.is_bluetooth_supported().await
    );
    println!(
        "Bluetooth enabled:   {}",
        service.is_bluetooth_enabled().await
    );

    let devices = service.paired_devices().await?;
    println!("Paired devices ({}):", devices.len());
    for device in &devices {
        println!("  {device}");
    }

    match preferred_target(&devices) {
        Some(target) => println!("Would connect to: {target}"),
        None => println!("Nothing to connect to."),
    }

    Ok(())
}
