//! # wsaserver - Serveur web haut niveau basé sur Axum
//!
//! Cette crate fournit le serveur HTTP de WSAShop : un router Axum partagé
//! auquel les services SOAP viennent s'attacher, et l'initialisation des logs.
//!
//! ## Architecture
//!
//! - [`server`] : Implémentation du serveur principal et du builder
//! - [`logs`] : Buffer de logs en mémoire et réglage dynamique du niveau
//!
//! Les crates de services étendent [`Server`] par des traits d'extension
//! (voir `wsasoap::SoapServerExt`) plutôt que de le modifier.
//!
//! ## Exemple d'utilisation
//!
//! ```rust,no_run
//! use wsaserver::ServerBuilder;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let mut server = ServerBuilder::new_configured().build();
//!     server.init_logging().await;
//!
//!     server.add_route("/api/status", || async {
//!         serde_json::json!({"status": "ok"})
//!     }).await;
//!
//!     server.start().await?;
//!     server.wait().await;
//!     Ok(())
//! }
//! ```

pub mod logs;
pub mod server;

pub use logs::{CaptureLayer, LogState};
pub use server::{Server, ServerBuilder, ServerInfo};
