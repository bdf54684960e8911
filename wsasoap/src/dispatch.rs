//! Routage des requêtes vers les handlers de service

use crate::action::resolve;
use crate::{Envelope, NormalizedDocument, SoapError, SoapReply};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Code d'erreur renvoyé quand un champ commun ou obligatoire manque
pub const MISSING_FIELD_ERROR: i32 = 5;

/// Handler d'un service SOAP (ecs, ias, ...)
///
/// L'enveloppe reçue a déjà ses champs communs remplis ; le handler
/// ajoute ses champs et la consomme par `return_success` ou
/// `return_error`.
pub trait SoapHandler: Send + Sync {
    /// Identifiant du service sur 3 caractères
    fn service(&self) -> &'static str;

    /// Actions acceptées par le service
    fn actions(&self) -> &'static [&'static str];

    fn supports(&self, action: &str) -> bool {
        self.actions().contains(&action)
    }

    fn handle(&self, envelope: Envelope, doc: &NormalizedDocument) -> Result<SoapReply, SoapError>;
}

/// Table des services enregistrés
pub struct SoapDispatcher {
    vendor_domain: String,
    handlers: HashMap<String, Arc<dyn SoapHandler>>,
}

impl SoapDispatcher {
    pub fn new(vendor_domain: impl Into<String>) -> Self {
        Self {
            vendor_domain: vendor_domain.into(),
            handlers: HashMap::new(),
        }
    }

    /// Enregistre un handler (remplace celui du même service)
    pub fn register(&mut self, handler: Arc<dyn SoapHandler>) {
        info!(
            "📡 SOAP service {} registered ({} actions)",
            handler.service(),
            handler.actions().len()
        );
        self.handlers.insert(handler.service().to_string(), handler);
    }

    pub fn with_handler(mut self, handler: impl SoapHandler + 'static) -> Self {
        self.register(Arc::new(handler));
        self
    }

    pub fn vendor_domain(&self) -> &str {
        &self.vendor_domain
    }

    pub fn services(&self) -> Vec<&str> {
        let mut services: Vec<&str> = self.handlers.keys().map(String::as_str).collect();
        services.sort_unstable();
        services
    }

    /// Traite une requête complète
    ///
    /// Les erreurs retournées sont des refus (voir
    /// [`SoapError::is_rejection`]) ou des échecs de sérialisation. Toute
    /// autre erreur est déjà convertie en enveloppe d'erreur.
    pub fn dispatch(&self, soap_action: &str, body: &[u8]) -> Result<SoapReply, SoapError> {
        let id = resolve(soap_action, &self.vendor_domain)
            .ok_or_else(|| SoapError::Unroutable(soap_action.to_string()))?;

        let handler = self
            .handlers
            .get(&id.service)
            .filter(|h| h.supports(&id.action))
            .ok_or_else(|| SoapError::Unroutable(id.to_string()))?;

        let doc = NormalizedDocument::parse(&id.service, &id.action, body)?;
        let mut envelope = Envelope::with_vendor_domain(&id.service, &id.action, &self.vendor_domain);

        if let Err(e) = envelope.obtain_common(&doc) {
            warn!("❌ {}: {}", id, e);
            return envelope.return_error(MISSING_FIELD_ERROR, "missing common field", e);
        }

        debug!(device_id = %envelope.device_id(), "SOAP action {}", id);
        handler.handle(envelope, &doc)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Echo;

    impl SoapHandler for Echo {
        fn service(&self) -> &'static str {
            "ecs"
        }

        fn actions(&self) -> &'static [&'static str] {
            &["Ping"]
        }

        fn handle(
            &self,
            mut envelope: Envelope,
            doc: &NormalizedDocument,
        ) -> Result<SoapReply, SoapError> {
            envelope.add_field("Echo", doc.get_field("Payload")?);
            envelope.return_success()
        }
    }

    fn request(payload: &str) -> String {
        format!(
            r#"<?xml version="1.0"?>
<soapenv:Envelope xmlns:soapenv="http://schemas.xmlsoap.org/soap/envelope/"
    xmlns:ecs="urn:ecs.wsapi.broadon.com">
  <soapenv:Body>
    <ecs:Ping>
      <ecs:Version>2.0</ecs:Version>
      <ecs:DeviceId>1</ecs:DeviceId>
      <ecs:MessageId>m</ecs:MessageId>
      {}
    </ecs:Ping>
  </soapenv:Body>
</soapenv:Envelope>"#,
            payload
        )
    }

    fn dispatcher() -> SoapDispatcher {
        SoapDispatcher::new("broadon.com").with_handler(Echo)
    }

    #[test]
    fn test_dispatch_to_handler() {
        let reply = dispatcher()
            .dispatch(
                "urn:ecs.wsapi.broadon.com/Ping",
                request("<ecs:Payload>hi</ecs:Payload>").as_bytes(),
            )
            .unwrap();
        assert!(reply.success);
        assert!(reply.xml.contains("<Echo>hi</Echo>"));
        assert!(reply.xml.contains("<PingResponse xmlns=\"urn:ecs.wsapi.broadon.com\">"));
    }

    #[test]
    fn test_unknown_service_is_unroutable() {
        let err = dispatcher()
            .dispatch("urn:cas.wsapi.broadon.com/Ping", request("").as_bytes())
            .unwrap_err();
        assert!(matches!(err, SoapError::Unroutable(_)));
    }

    #[test]
    fn test_unknown_action_is_unroutable() {
        let err = dispatcher()
            .dispatch("urn:ecs.wsapi.broadon.com/Pong", request("").as_bytes())
            .unwrap_err();
        assert!(matches!(err, SoapError::Unroutable(_)));
    }

    #[test]
    fn test_missing_common_field_gives_error_envelope() {
        let body = r#"<?xml version="1.0"?>
<soapenv:Envelope xmlns:soapenv="http://schemas.xmlsoap.org/soap/envelope/"
    xmlns:ecs="urn:ecs.wsapi.broadon.com">
  <soapenv:Body><ecs:Ping><ecs:Version>2.0</ecs:Version></ecs:Ping></soapenv:Body>
</soapenv:Envelope>"#;
        let reply = dispatcher()
            .dispatch("urn:ecs.wsapi.broadon.com/Ping", body.as_bytes())
            .unwrap();
        assert!(!reply.success);
        assert!(reply.xml.contains("<ErrorCode>5</ErrorCode>"));
        assert!(reply.xml.contains("<ServerReason>missing mandatory field DeviceId</ServerReason>"));
    }

    #[test]
    fn test_services_listing() {
        assert_eq!(dispatcher().services(), vec!["ecs"]);
    }
}
