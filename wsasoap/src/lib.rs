//! # wsasoap - Protocole SOAP des services WSAShop
//!
//! Cette crate porte tout ce que les services `ecs` et `ias` ont en commun :
//!
//! - ✅ Résolution de l'en-tête `SOAPAction` en (service, action)
//! - ✅ Normalisation des requêtes (suppression des préfixes de namespace)
//! - ✅ Construction et sérialisation des enveloppes de réponse
//! - ✅ Routage vers les handlers de service
//! - ✅ Montage HTTP sur un [`wsaserver::Server`]
//!
//! ## Architecture
//!
//! - [`action`] : [`ActionIdentifier`], [`resolve`], [`format_action`]
//! - [`NormalizedDocument`] : élément d'action extrait de la requête
//! - [`Envelope`] : réponse en construction, consommée en [`SoapReply`]
//! - [`SoapDispatcher`] / [`SoapHandler`] : table des services
//! - [`SoapServerExt`] : trait d'extension du serveur
//!
//! ## Exemple
//!
//! ```ignore
//! use wsasoap::{Envelope, NormalizedDocument};
//!
//! let doc = NormalizedDocument::parse("ias", "GetChallenge", body)?;
//! let mut envelope = Envelope::new("ias", "GetChallenge");
//! envelope.obtain_common(&doc)?;
//! envelope.add_field("Challenge", "NintyWhyPls");
//! let reply = envelope.return_success()?;
//! ```

pub mod action;
mod builder;
mod dispatch;
mod document;
mod envelope;
mod errors;
mod server_ext;

pub use action::{
    ActionIdentifier, DEFAULT_VENDOR_DOMAIN, format_action, resolve, service_namespace,
};
pub use builder::{SOAP_ENVELOPE_NS, XSD_NS, XSI_NS};
pub use dispatch::{MISSING_FIELD_ERROR, SoapDispatcher, SoapHandler};
pub use document::{NormalizedDocument, normalize};
pub use envelope::{
    Balance, COMMON_FIELDS, Envelope, Field, Group, SoapReply, Transaction,
};
pub use errors::SoapError;
pub use server_ext::{ECS_PATH, IAS_PATH, SOAP_ACTION_HEADER, SoapServerExt, soap_router};
