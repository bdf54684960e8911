use std::sync::Arc;
use tracing::info;
use wsaconfig::get_config;
use wsaecs::EcsHandler;
use wsaias::IasHandler;
use wsaserver::ServerBuilder;
use wsasoap::{ECS_PATH, IAS_PATH, SoapDispatcher, SoapServerExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // ========== PHASE 1 : Infrastructure HTTP ==========
    let config = get_config();
    let mut server = ServerBuilder::new_configured().build();
    server.init_logging().await;

    let server_info = server.info();
    server
        .add_route("/info", move || {
            let server_info = server_info.clone();
            async move {
                serde_json::json!({
                    "server": server_info,
                    "version": env!("CARGO_PKG_VERSION"),
                    "services": ["ecs", "ias"],
                })
            }
        })
        .await;

    // ========== PHASE 2 : Services SOAP ==========
    let vendor_domain = config.get_vendor_domain();
    info!("📡 Registering SOAP services (vendor domain {})...", vendor_domain);

    let ecs = SoapDispatcher::new(vendor_domain.clone()).with_handler(EcsHandler::from_config(&config)?);
    server
        .register_soap_dispatcher(&[ECS_PATH], Arc::new(ecs))
        .await;

    let ias = SoapDispatcher::new(vendor_domain).with_handler(IasHandler::from_config(&config)?);
    server
        .register_soap_dispatcher(&[IAS_PATH], Arc::new(ias))
        .await;

    info!("✅ ECS ready at {}", ECS_PATH);
    info!("✅ IAS ready at {}", IAS_PATH);

    // ========== PHASE 3 : Démarrage du serveur ==========
    info!("🌐 Starting HTTP server...");
    server.start().await?;

    info!("✅ WSAShop is ready!");
    info!("Press Ctrl+C to stop...");
    server.wait().await;

    Ok(())
}
