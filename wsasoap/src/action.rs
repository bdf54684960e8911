//! Résolution de l'en-tête `SOAPAction`
//!
//! Une action est identifiée par une URN de la forme
//! `urn:<service>.wsapi.<domaine>/<action>`, par exemple
//! `urn:ecs.wsapi.broadon.com/CheckDeviceStatus`.

use std::fmt;

/// Domaine vendeur par défaut des namespaces de service
pub const DEFAULT_VENDOR_DOMAIN: &str = "broadon.com";

const URN_PREFIX: &str = "urn:";
const WSAPI_SEPARATOR: &str = ".wsapi.";

/// Couple (service, action) extrait d'un en-tête `SOAPAction`
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ActionIdentifier {
    /// Service sur 3 caractères (ex: "ecs", "ias")
    pub service: String,
    /// Nom de l'action (ex: "Register")
    pub action: String,
}

impl ActionIdentifier {
    pub fn new(service: impl Into<String>, action: impl Into<String>) -> Self {
        Self {
            service: service.into(),
            action: action.into(),
        }
    }
}

impl fmt::Display for ActionIdentifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.service, self.action)
    }
}

/// Namespace XML d'un service : `urn:<service>.wsapi.<domaine>`
pub fn service_namespace(service: &str, vendor_domain: &str) -> String {
    format!("{}{}{}{}", URN_PREFIX, service, WSAPI_SEPARATOR, vendor_domain)
}

/// Extrait le service et l'action d'une valeur `SOAPAction`
///
/// Retourne `None` si la valeur ne suit pas le motif attendu, si le
/// service ne fait pas exactement 3 caractères, si le domaine diffère
/// de `vendor_domain` ou si l'action est vide.
pub fn resolve(soap_action: &str, vendor_domain: &str) -> Option<ActionIdentifier> {
    let rest = soap_action.strip_prefix(URN_PREFIX)?;
    let (service, rest) = rest.split_once(WSAPI_SEPARATOR)?;

    if service.chars().count() != 3 {
        return None;
    }

    let (domain, action) = rest.split_once('/')?;
    if domain != vendor_domain || action.is_empty() {
        return None;
    }

    Some(ActionIdentifier::new(service, action))
}

/// Opération inverse de [`resolve`]
pub fn format_action(identifier: &ActionIdentifier, vendor_domain: &str) -> String {
    format!(
        "{}/{}",
        service_namespace(&identifier.service, vendor_domain),
        identifier.action
    )
}
