use std::sync::Arc;

use printlink::constants::defaults;
use printlink::{
    BluezTransportProvider, ConnectionConfig, ConnectivityService, EventBus, Result,
    TcpPrinterAdapter,
};

#[tokio::main]
async fn main() -> Result<()> {
    let bus = Arc::new(EventBus::new());
    let mut events = bus.subscribe();

    let service = ConnectivityService::new(
        Arc::new(BluezTransportProvider::new().await?),
        Arc::new(TcpPrinterAdapter::new()),
        Arc::clone(&bus),
    );

    let listener = tokio::spawn(async move {
        while let Some(event) = events.recv().await {
            println!("event: {event:?}");
        }
    });

    // Point this at a network printer on your LAN.
    let config =
        ConnectionConfig::network("192.168.0.87", defaults::NETWORK_PORT).with_timeout(5_000);

    match service.connect(config).await {
        Ok(()) => {
            println!("Connected ({})", service.state());
            service.write(b"printlink connect example\n\n\n").await?;
            service.disconnect().await?;
        }
        Err(e) => eprintln!("Connect failed: {e}"),
    }

    drop(service);
    drop(bus);
    let _ = listener.await;
    Ok(())
}
