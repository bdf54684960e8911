//! # wsaecs - Service de commerce WSAShop
//!
//! Implémente les actions `ecs` attendues par la console :
//! `CheckDeviceStatus`, `NotifiedETicketsSynced`, `ListETickets` et
//! `PurchaseTitle`. Le solde annoncé vient de la configuration
//! (voir [`EcsConfigExt`]).
//!
//! ```rust,ignore
//! use wsaconfig::get_config;
//! use wsaecs::EcsHandler;
//! use wsasoap::SoapDispatcher;
//!
//! let handler = EcsHandler::from_config(&get_config())?;
//! let dispatcher = SoapDispatcher::new("broadon.com").with_handler(handler);
//! ```

mod config_ext;
mod handler;

pub use config_ext::EcsConfigExt;
pub use handler::{ECS_ACTIONS, ECS_SERVICE, EcsHandler};

use wsaconfig::Config;

impl EcsHandler {
    /// Construit le handler à partir de la configuration
    pub fn from_config(config: &Config) -> anyhow::Result<Self> {
        Ok(Self::new(config.get_ecs_balance()?))
    }
}
