//! Extension du serveur pour les points d'entrée SOAP
//!
//! Ce module fournit un trait d'extension qui permet d'ajouter les
//! services SOAP à un [`wsaserver::Server`] sans créer de dépendance
//! circulaire entre les crates.

use crate::SoapDispatcher;
use axum::Router;
use axum::body::Bytes;
use axum::extract::State;
use axum::http::{HeaderMap, StatusCode, header};
use axum::response::{IntoResponse, Response};
use axum::routing::post;
use std::sync::Arc;
use tracing::{error, warn};
use wsaserver::Server;

/// Nom de l'en-tête portant l'action demandée
pub const SOAP_ACTION_HEADER: &str = "SOAPAction";

/// Chemin HTTP du service de commerce
pub const ECS_PATH: &str = "/ecs/services/ECommerceSOAP";

/// Chemin HTTP du service d'identification
pub const IAS_PATH: &str = "/ias/services/IdentityAuthenticationSOAP";

/// Trait d'extension pour monter les services SOAP
pub trait SoapServerExt {
    /// Monte le dispatcher sur chacun des chemins donnés (POST)
    async fn register_soap_dispatcher(&mut self, paths: &[&str], dispatcher: Arc<SoapDispatcher>);
}

impl SoapServerExt for Server {
    async fn register_soap_dispatcher(&mut self, paths: &[&str], dispatcher: Arc<SoapDispatcher>) {
        for path in paths {
            self.add_post_handler_with_state(path, soap_endpoint, dispatcher.clone())
                .await;
        }
    }
}

/// Router Axum servant le dispatcher sur les chemins donnés
pub fn soap_router(paths: &[&str], dispatcher: Arc<SoapDispatcher>) -> Router {
    let mut router: Router<Arc<SoapDispatcher>> = Router::new();
    for path in paths {
        router = router.route(path, post(soap_endpoint));
    }
    router.with_state(dispatcher)
}

async fn soap_endpoint(
    State(dispatcher): State<Arc<SoapDispatcher>>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let soap_action = headers
        .get(SOAP_ACTION_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(|v| v.trim().trim_matches('"'))
        .unwrap_or_default();

    match dispatcher.dispatch(soap_action, &body) {
        Ok(reply) => (
            StatusCode::OK,
            [(header::CONTENT_TYPE, "text/xml; charset=utf-8")],
            reply.xml,
        )
            .into_response(),
        Err(e) if e.is_rejection() => {
            warn!("❌ SOAP request rejected: {}", e);
            (StatusCode::BAD_REQUEST, e.to_string()).into_response()
        }
        Err(e) => {
            error!("❌ SOAP response failed: {}", e);
            (StatusCode::INTERNAL_SERVER_ERROR, "internal error").into_response()
        }
    }
}
