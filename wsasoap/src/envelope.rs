//! Enveloppe de réponse SOAP
//!
//! Une [`Envelope`] est créée pour chaque requête routée, complétée par
//! [`Envelope::obtain_common`] puis par les champs propres à l'action, et
//! enfin consommée par [`Envelope::return_success`] ou
//! [`Envelope::return_error`].

use crate::action::{DEFAULT_VENDOR_DOMAIN, service_namespace};
use crate::builder::render_envelope;
use crate::{NormalizedDocument, SoapError};
use tracing::debug;

/// Champs communs lus dans chaque requête
pub const COMMON_FIELDS: [&str; 3] = ["Version", "DeviceId", "MessageId"];

/// Solde de points du compte
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Balance {
    pub amount: i64,
    pub currency: String,
}

/// Transaction d'achat
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transaction {
    pub transaction_id: String,
    pub date: String,
    pub kind: String,
}

/// Champ structuré de la réponse
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Group {
    Balance(Balance),
    Transactions(Transaction),
}

impl Group {
    pub fn element_name(&self) -> &'static str {
        match self {
            Group::Balance(_) => "Balance",
            Group::Transactions(_) => "Transactions",
        }
    }

    /// Enfants dans leur ordre de sérialisation
    pub fn children(&self) -> Vec<(&'static str, String)> {
        match self {
            Group::Balance(b) => vec![
                ("Amount", b.amount.to_string()),
                ("Currency", b.currency.clone()),
            ],
            Group::Transactions(t) => vec![
                ("TransactionId", t.transaction_id.clone()),
                ("Date", t.date.clone()),
                ("Type", t.kind.clone()),
            ],
        }
    }
}

impl From<Balance> for Group {
    fn from(balance: Balance) -> Self {
        Group::Balance(balance)
    }
}

impl From<Transaction> for Group {
    fn from(transaction: Transaction) -> Self {
        Group::Transactions(transaction)
    }
}

/// Champ propre à une action
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Field {
    Leaf { name: String, value: String },
    Group(Group),
}

/// Élément `<ActionResponse>` du corps de l'enveloppe
#[derive(Debug, Clone)]
pub struct Response {
    pub(crate) action: String,
    pub(crate) namespace: String,
    pub(crate) version: String,
    pub(crate) device_id: String,
    pub(crate) message_id: String,
    pub(crate) timestamp: String,
    pub(crate) error_code: i32,
    pub(crate) service_standby_mode: bool,
    pub(crate) custom_fields: Vec<Field>,
}

impl Response {
    pub(crate) fn element_name(&self) -> String {
        format!("{}Response", self.action)
    }
}

/// Résultat final d'une action
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SoapReply {
    /// Vrai si l'enveloppe porte le code d'erreur 0
    pub success: bool,
    /// Document XML complet
    pub xml: String,
}

/// Enveloppe de réponse en cours de construction
#[derive(Debug)]
pub struct Envelope {
    service: String,
    response: Response,
}

impl Envelope {
    /// Crée l'enveloppe d'une action dans le domaine vendeur par défaut
    pub fn new(service: &str, action: &str) -> Self {
        Self::with_vendor_domain(service, action, DEFAULT_VENDOR_DOMAIN)
    }

    /// Crée l'enveloppe d'une action pour un domaine vendeur donné
    ///
    /// L'horodatage est figé à la création : millisecondes Unix en décimal.
    pub fn with_vendor_domain(service: &str, action: &str, vendor_domain: &str) -> Self {
        Self {
            service: service.to_string(),
            response: Response {
                action: action.to_string(),
                namespace: service_namespace(service, vendor_domain),
                version: String::new(),
                device_id: String::new(),
                message_id: String::new(),
                timestamp: chrono::Utc::now().timestamp_millis().to_string(),
                error_code: 0,
                service_standby_mode: false,
                custom_fields: Vec::new(),
            },
        }
    }

    pub fn service(&self) -> &str {
        &self.service
    }

    pub fn action(&self) -> &str {
        &self.response.action
    }

    pub fn namespace(&self) -> &str {
        &self.response.namespace
    }

    pub fn version(&self) -> &str {
        &self.response.version
    }

    pub fn device_id(&self) -> &str {
        &self.response.device_id
    }

    pub fn message_id(&self) -> &str {
        &self.response.message_id
    }

    pub fn timestamp(&self) -> &str {
        &self.response.timestamp
    }

    pub fn error_code(&self) -> i32 {
        self.response.error_code
    }

    pub fn custom_fields(&self) -> &[Field] {
        &self.response.custom_fields
    }

    /// Copie Version, DeviceId et MessageId depuis la requête
    ///
    /// Si l'un des trois manque, l'enveloppe n'est pas modifiée.
    pub fn obtain_common(&mut self, doc: &NormalizedDocument) -> Result<(), SoapError> {
        let [version, device_id, message_id] = COMMON_FIELDS.map(|name| doc.get_field(name));
        let (version, device_id, message_id) = (version?, device_id?, message_id?);

        self.response.version = version;
        self.response.device_id = device_id;
        self.response.message_id = message_id;
        Ok(())
    }

    /// Ajoute un champ simple, dans l'ordre d'appel
    pub fn add_field(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.response.custom_fields.push(Field::Leaf {
            name: name.into(),
            value: value.into(),
        });
    }

    /// Ajoute un champ structuré (solde, transaction)
    pub fn add_structured_field(&mut self, group: impl Into<Group>) {
        self.response
            .custom_fields
            .push(Field::Group(group.into()));
    }

    /// Sérialise l'enveloppe avec le code d'erreur 0
    pub fn return_success(mut self) -> Result<SoapReply, SoapError> {
        self.response.error_code = 0;
        let xml = render_envelope(&self.response)?;
        Ok(SoapReply { success: true, xml })
    }

    /// Sérialise l'enveloppe avec un code d'erreur
    ///
    /// Les champs propres à l'action sont abandonnés et remplacés par
    /// `UserReason` puis `ServerReason` (description de `cause`). Les champs
    /// communs restent tels qu'ils ont été remplis.
    pub fn return_error(
        mut self,
        code: i32,
        user_reason: &str,
        cause: impl std::fmt::Display,
    ) -> Result<SoapReply, SoapError> {
        let server_reason = cause.to_string();
        debug!(
            service = %self.service,
            action = %self.response.action,
            code,
            "{}: {}",
            user_reason,
            server_reason
        );

        self.response.error_code = code;
        self.response.custom_fields.clear();
        self.add_field("UserReason", user_reason);
        self.add_field("ServerReason", server_reason);

        let xml = render_envelope(&self.response)?;
        Ok(SoapReply {
            success: false,
            xml,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CHECK: &str = r#"<?xml version="1.0"?>
<soapenv:Envelope xmlns:soapenv="http://schemas.xmlsoap.org/soap/envelope/"
    xmlns:ecs="urn:ecs.wsapi.broadon.com">
  <soapenv:Body>
    <ecs:CheckDeviceStatus>
      <ecs:Version>2.0</ecs:Version>
      <ecs:MessageId>ECDK-1</ecs:MessageId>
      <ecs:DeviceId>4362227774</ecs:DeviceId>
    </ecs:CheckDeviceStatus>
  </soapenv:Body>
</soapenv:Envelope>"#;

    const NO_MESSAGE_ID: &str = r#"<?xml version="1.0"?>
<soapenv:Envelope xmlns:soapenv="http://schemas.xmlsoap.org/soap/envelope/"
    xmlns:ecs="urn:ecs.wsapi.broadon.com">
  <soapenv:Body>
    <ecs:CheckDeviceStatus>
      <ecs:Version>2.0</ecs:Version>
      <ecs:DeviceId>4362227774</ecs:DeviceId>
    </ecs:CheckDeviceStatus>
  </soapenv:Body>
</soapenv:Envelope>"#;

    fn doc(xml: &str) -> NormalizedDocument {
        NormalizedDocument::parse("ecs", "CheckDeviceStatus", xml.as_bytes()).unwrap()
    }

    #[test]
    fn test_new_envelope() {
        let env = Envelope::new("ecs", "CheckDeviceStatus");
        assert_eq!(env.namespace(), "urn:ecs.wsapi.broadon.com");
        assert_eq!(env.action(), "CheckDeviceStatus");
        assert_eq!(env.error_code(), 0);
        assert!(env.timestamp().chars().all(|c| c.is_ascii_digit()));
        assert!(env.timestamp().len() >= 13);
    }

    #[test]
    fn test_obtain_common() {
        let mut env = Envelope::new("ecs", "CheckDeviceStatus");
        env.obtain_common(&doc(CHECK)).unwrap();
        assert_eq!(env.version(), "2.0");
        assert_eq!(env.device_id(), "4362227774");
        assert_eq!(env.message_id(), "ECDK-1");
    }

    #[test]
    fn test_obtain_common_missing_field_leaves_envelope_untouched() {
        let mut env = Envelope::new("ecs", "CheckDeviceStatus");
        let err = env.obtain_common(&doc(NO_MESSAGE_ID)).unwrap_err();
        assert_eq!(err, SoapError::MissingMandatoryField("MessageId".into()));
        assert_eq!(env.version(), "");
        assert_eq!(env.device_id(), "");
    }

    #[test]
    fn test_custom_fields_keep_insertion_order() {
        let mut env = Envelope::new("ecs", "ListETickets");
        env.add_field("ForceSyncTime", "0");
        env.add_structured_field(Balance {
            amount: 2018,
            currency: "POINTS".into(),
        });
        env.add_field("SyncTime", "1");

        let names: Vec<_> = env
            .custom_fields()
            .iter()
            .map(|f| match f {
                Field::Leaf { name, .. } => name.clone(),
                Field::Group(g) => g.element_name().to_string(),
            })
            .collect();
        assert_eq!(names, vec!["ForceSyncTime", "Balance", "SyncTime"]);
    }

    #[test]
    fn test_return_error_drops_custom_fields() {
        let mut env = Envelope::new("ecs", "CheckDeviceStatus");
        env.obtain_common(&doc(CHECK)).unwrap();
        env.add_field("ForceSyncTime", "0");

        let reply = env
            .return_error(5, "missing field", SoapError::MissingMandatoryField("Region".into()))
            .unwrap();
        assert!(!reply.success);
        assert!(reply.xml.contains("<ErrorCode>5</ErrorCode>"));
        assert!(reply.xml.contains("<DeviceId>4362227774</DeviceId>"));
        assert!(!reply.xml.contains("ForceSyncTime"));

        let user = reply.xml.find("<UserReason>missing field</UserReason>").unwrap();
        let server = reply
            .xml
            .find("<ServerReason>missing mandatory field Region</ServerReason>")
            .unwrap();
        assert!(user < server);
    }

    #[test]
    fn test_return_success() {
        let mut env = Envelope::new("ecs", "CheckDeviceStatus");
        env.obtain_common(&doc(CHECK)).unwrap();
        let reply = env.return_success().unwrap();
        assert!(reply.success);
        assert!(reply.xml.contains("<ErrorCode>0</ErrorCode>"));
    }
}
