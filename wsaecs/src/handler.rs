//! Handler du service de commerce (`ecs`)
//!
//! Le service ne tient aucun état : chaque action renvoie un jeu de champs
//! fixe, horodaté avec l'instant de création de l'enveloppe.

use tracing::debug;
use wsasoap::{
    Balance, Envelope, NormalizedDocument, SoapError, SoapHandler, SoapReply, Transaction,
};

pub const ECS_SERVICE: &str = "ecs";

pub const ECS_ACTIONS: &[&str] = &[
    "CheckDeviceStatus",
    "NotifiedETicketsSynced",
    "ListETickets",
    "PurchaseTitle",
];

/// Identifiant placeholder des tickets, certificats et titres
const PLACEHOLDER_ID: &str = "00000000";
const PURCHASE_TYPE: &str = "PURCHGAME";

pub struct EcsHandler {
    balance: Balance,
}

impl EcsHandler {
    pub fn new(balance: Balance) -> Self {
        Self { balance }
    }

    pub fn balance(&self) -> &Balance {
        &self.balance
    }

    fn check_device_status(&self, envelope: &mut Envelope) {
        let ts = envelope.timestamp().to_string();
        envelope.add_structured_field(self.balance.clone());
        envelope.add_field("ForceSyncTime", "0");
        envelope.add_field("ExtTicketTime", ts.clone());
        envelope.add_field("SyncTime", ts);
    }

    fn list_etickets(&self, envelope: &mut Envelope) {
        let ts = envelope.timestamp().to_string();
        envelope.add_field("ForceSyncTime", "0");
        envelope.add_field("ExtTicketTime", ts.clone());
        envelope.add_field("SyncTime", ts);
    }

    fn purchase_title(&self, envelope: &mut Envelope) {
        let ts = envelope.timestamp().to_string();
        envelope.add_structured_field(self.balance.clone());
        envelope.add_structured_field(Transaction {
            transaction_id: PLACEHOLDER_ID.to_string(),
            date: ts.clone(),
            kind: PURCHASE_TYPE.to_string(),
        });
        envelope.add_field("SyncTime", ts);
        envelope.add_field("ETickets", PLACEHOLDER_ID);
        envelope.add_field("Certs", PLACEHOLDER_ID);
        envelope.add_field("Certs", PLACEHOLDER_ID);
        envelope.add_field("TitleId", PLACEHOLDER_ID);
    }
}

impl SoapHandler for EcsHandler {
    fn service(&self) -> &'static str {
        ECS_SERVICE
    }

    fn actions(&self) -> &'static [&'static str] {
        ECS_ACTIONS
    }

    fn handle(&self, mut envelope: Envelope, _doc: &NormalizedDocument) -> Result<SoapReply, SoapError> {
        debug!(device_id = %envelope.device_id(), "ECS {}", envelope.action());

        let action = envelope.action().to_string();
        match action.as_str() {
            "CheckDeviceStatus" => self.check_device_status(&mut envelope),
            "ListETickets" => self.list_etickets(&mut envelope),
            "PurchaseTitle" => self.purchase_title(&mut envelope),
            "NotifiedETicketsSynced" => {}
            other => return Err(SoapError::Unroutable(format!("{}/{}", ECS_SERVICE, other))),
        }

        envelope.return_success()
    }
}
