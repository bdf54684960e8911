//! Handler du service d'identification (`ias`)

use crate::registration::{RegistrationRequest, RegistrationService};
use wsasoap::{Envelope, MISSING_FIELD_ERROR, NormalizedDocument, SoapError, SoapHandler, SoapReply};

pub const IAS_SERVICE: &str = "ias";

pub const IAS_ACTIONS: &[&str] = &[
    "CheckRegistration",
    "GetChallenge",
    "GetRegistrationInfo",
    "Register",
    "Unregister",
];

/// Code d'erreur des actions liées à l'enregistrement
pub const REGISTRATION_ERROR: i32 = 7;

const MISSING_FIELD_REASON: &str = "missing mandatory field";
const REGISTRATION_REASON: &str = "registration refused";

/// Statut d'une console enregistrée
const DEVICE_STATUS_REGISTERED: &str = "R";
const PLACEHOLDER_TOKEN: &str = "00000000";
const CURRENCY: &str = "POINTS";

struct Failure {
    code: i32,
    reason: &'static str,
    cause: SoapError,
}

impl Failure {
    fn missing(cause: SoapError) -> Self {
        Self {
            code: MISSING_FIELD_ERROR,
            reason: MISSING_FIELD_REASON,
            cause,
        }
    }

    fn registration(cause: SoapError) -> Self {
        Self {
            code: REGISTRATION_ERROR,
            reason: REGISTRATION_REASON,
            cause,
        }
    }
}

/// Champs obligatoires de toute requête IAS
struct Locale {
    region: String,
    country: String,
    language: String,
}

pub struct IasHandler {
    challenge: String,
    registration: RegistrationService,
}

impl IasHandler {
    pub fn new(challenge: impl Into<String>, registration: RegistrationService) -> Self {
        Self {
            challenge: challenge.into(),
            registration,
        }
    }

    fn respond(&self, envelope: &mut Envelope, doc: &NormalizedDocument) -> Result<(), Failure> {
        let locale = Locale {
            region: doc.get_field("Region").map_err(Failure::missing)?,
            country: doc.get_field("Country").map_err(Failure::missing)?,
            language: doc.get_field("Language").map_err(Failure::missing)?,
        };

        let action = envelope.action().to_string();
        match action.as_str() {
            "CheckRegistration" => {
                let serial = doc.get_field("SerialNumber").map_err(Failure::missing)?;
                envelope.add_field("OriginalSerialNumber", serial);
                envelope.add_field("DeviceStatus", DEVICE_STATUS_REGISTERED);
            }
            "GetChallenge" => {
                envelope.add_field("Challenge", self.challenge.as_str());
            }
            "GetRegistrationInfo" => {
                let account_id = doc.get_field("AccountId").map_err(Failure::registration)?;
                let device_code = doc.get_field("DeviceCode").map_err(Failure::registration)?;

                envelope.add_field("AccountId", account_id);
                envelope.add_field("DeviceToken", PLACEHOLDER_TOKEN);
                envelope.add_field("DeviceTokenExpired", "false");
                envelope.add_field("Country", locale.country);
                envelope.add_field("ExtAccountId", "");
                envelope.add_field("DeviceCode", device_code);
                envelope.add_field("DeviceStatus", DEVICE_STATUS_REGISTERED);
                envelope.add_field("Currency", CURRENCY);
            }
            "Register" => self.register(envelope, doc, locale)?,
            "Unregister" => {}
            other => {
                return Err(Failure::missing(SoapError::Unroutable(format!(
                    "{}/{}",
                    IAS_SERVICE, other
                ))));
            }
        }
        Ok(())
    }

    fn register(
        &self,
        envelope: &mut Envelope,
        doc: &NormalizedDocument,
        locale: Locale,
    ) -> Result<(), Failure> {
        let request = RegistrationRequest {
            device_id: envelope.device_id().to_string(),
            device_code: doc.get_field("DeviceCode").map_err(Failure::registration)?,
            register_region: doc.get_field("RegisterRegion").map_err(Failure::registration)?,
            serial_number: doc.get_field("SerialNumber").map_err(Failure::registration)?,
            region: locale.region,
            country: locale.country,
            language: locale.language,
        };

        let credentials = self
            .registration
            .register(&request)
            .map_err(Failure::registration)?;

        envelope.add_field("AccountId", credentials.account_id);
        envelope.add_field("DeviceToken", credentials.device_token);
        envelope.add_field("DeviceTokenExpired", "false");
        envelope.add_field("Country", request.country);
        envelope.add_field("ExtAccountId", "");
        envelope.add_field("DeviceCode", request.device_code);
        Ok(())
    }
}

impl SoapHandler for IasHandler {
    fn service(&self) -> &'static str {
        IAS_SERVICE
    }

    fn actions(&self) -> &'static [&'static str] {
        IAS_ACTIONS
    }

    fn handle(&self, mut envelope: Envelope, doc: &NormalizedDocument) -> Result<SoapReply, SoapError> {
        match self.respond(&mut envelope, doc) {
            Ok(()) => envelope.return_success(),
            Err(f) => envelope.return_error(f.code, f.reason, f.cause),
        }
    }
}
