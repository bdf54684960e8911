//! # wsaias - Service d'identification WSAShop
//!
//! Implémente les actions `ias` : `CheckRegistration`, `GetChallenge`,
//! `GetRegistrationInfo`, `Register` et `Unregister`.
//!
//! ## Architecture
//!
//! - [`handler`] : routage des actions et construction des réponses
//! - [`registration`] : validation, génération des identifiants, hachage
//! - [`db`] : stockage SQLite des consoles enregistrées
//! - [`device_code`] : vérification des codes de console
//! - [`IasConfigExt`] : réglages du service dans wsaconfig
//!
//! ```rust,ignore
//! use wsaconfig::get_config;
//! use wsaias::IasHandler;
//!
//! let handler = IasHandler::from_config(&get_config())?;
//! ```

mod config_ext;
pub mod db;
pub mod device_code;
pub mod handler;
pub mod registration;

pub use config_ext::IasConfigExt;
pub use db::{RegistrationRecord, RegistrationStore, SqliteRegistrationStore, StoreError};
pub use handler::{IAS_ACTIONS, IAS_SERVICE, IasHandler, REGISTRATION_ERROR};
pub use registration::{Credentials, RegistrationRequest, RegistrationService};

use wsaconfig::Config;

impl IasHandler {
    /// Construit le handler à partir de la configuration
    ///
    /// Ouvre la base SQLite configurée et lit le challenge partagé une
    /// seule fois.
    pub fn from_config(config: &Config) -> anyhow::Result<Self> {
        let store = config.open_registration_store()?;
        let challenge = config.get_ias_challenge()?;
        Ok(Self::new(challenge, RegistrationService::new(store)))
    }
}
