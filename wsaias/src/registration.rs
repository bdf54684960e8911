//! Enregistrement des consoles
//!
//! `Register` valide la requête, génère un numéro de compte et un jeton,
//! puis persiste l'enregistrement. Le jeton en clair n'est renvoyé qu'une
//! fois, à la console ; la base n'en garde que
//! `hex(sha256(hex(md5(jeton))))`.

use crate::db::{RegistrationRecord, RegistrationStore, StoreError};
use crate::device_code::{CHECK_OK, nwc24_check_user_id};
use md5::Md5;
use rand::Rng;
use rand::distr::Alphanumeric;
use sha2::{Digest, Sha256};
use std::sync::Arc;
use tracing::{error, info, warn};
use wsasoap::SoapError;

/// Longueur du jeton remis à la console
pub const DEVICE_TOKEN_LENGTH: usize = 21;

const ACCOUNT_ID_RANGE: u32 = 999_999_999;

/// Champs de la requête `Register`
#[derive(Debug, Clone)]
pub struct RegistrationRequest {
    pub device_id: String,
    pub region: String,
    pub country: String,
    pub language: String,
    pub register_region: String,
    pub serial_number: String,
    pub device_code: String,
}

/// Identifiants émis pour une console
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credentials {
    pub account_id: String,
    /// Jeton en clair, jamais stocké
    pub device_token: String,
}

/// Numéro de compte à 9 chiffres, complété par des zéros
pub fn generate_account_id<R: Rng + ?Sized>(rng: &mut R) -> String {
    format!("{:09}", rng.random_range(0..ACCOUNT_ID_RANGE))
}

pub fn generate_device_token<R: Rng + ?Sized>(rng: &mut R) -> String {
    rng.sample_iter(Alphanumeric)
        .take(DEVICE_TOKEN_LENGTH)
        .map(char::from)
        .collect()
}

/// Empreinte stockée : `hex(sha256(hex(md5(token))))`
///
/// La console renvoie le md5 hexadécimal du jeton lors des appels
/// suivants, c'est donc ce md5 qui est haché une seconde fois.
pub fn hash_device_token(token: &str) -> String {
    let md5_hex = hex::encode(Md5::digest(token.as_bytes()));
    hex::encode(Sha256::digest(md5_hex.as_bytes()))
}

/// Service d'enregistrement
pub struct RegistrationService {
    store: Arc<dyn RegistrationStore>,
}

impl RegistrationService {
    pub fn new(store: Arc<dyn RegistrationStore>) -> Self {
        Self { store }
    }

    /// Enregistre une console
    ///
    /// Rien n'est persisté si la région ou le code de la console sont
    /// invalides.
    pub fn register(&self, request: &RegistrationRequest) -> Result<Credentials, SoapError> {
        if request.register_region != request.region {
            return Err(SoapError::Registration(
                "region does not match registration region".to_string(),
            ));
        }

        let user_id: u64 = request
            .device_code
            .parse()
            .map_err(|e| SoapError::Registration(format!("invalid device code: {}", e)))?;

        let check = nwc24_check_user_id(user_id);
        if check != CHECK_OK {
            return Err(SoapError::Registration(format!(
                "device code failed verification ({})",
                check
            )));
        }

        let mut rng = rand::rng();
        let credentials = Credentials {
            account_id: generate_account_id(&mut rng),
            device_token: generate_device_token(&mut rng),
        };

        let record = RegistrationRecord {
            device_id: request.device_id.clone(),
            hashed_token: hash_device_token(&credentials.device_token),
            account_id: credentials.account_id.clone(),
            region: request.region.clone(),
            country: request.country.clone(),
            language: request.language.clone(),
            serial_number: request.serial_number.clone(),
            // Forme décimale canonique : "0123" et "+123" désignent le même code
            device_code: user_id.to_string(),
        };

        match self.store.insert(&record) {
            Ok(()) => {
                info!(
                    device_id = %record.device_id,
                    account_id = %record.account_id,
                    "✅ Device registered"
                );
                Ok(credentials)
            }
            Err(StoreError::Duplicate) => {
                warn!(device_id = %record.device_id, "Device already registered");
                Err(SoapError::Registration("user already exists".to_string()))
            }
            Err(e) => {
                error!(device_id = %record.device_id, "❌ Registration insert failed: {}", e);
                Err(SoapError::Storage("failed to execute db operation".to_string()))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::SqliteRegistrationStore;
    use crate::device_code::nwc24_make_user_id;
    use std::collections::HashSet;

    fn request(device_id: &str, device_code: u64) -> RegistrationRequest {
        RegistrationRequest {
            device_id: device_id.to_string(),
            region: "USA".to_string(),
            country: "US".to_string(),
            language: "en".to_string(),
            register_region: "USA".to_string(),
            serial_number: "LU123456789".to_string(),
            device_code: device_code.to_string(),
        }
    }

    fn service() -> (Arc<SqliteRegistrationStore>, RegistrationService) {
        let store = Arc::new(SqliteRegistrationStore::in_memory().unwrap());
        let service = RegistrationService::new(store.clone());
        (store, service)
    }

    #[test]
    fn test_account_id_format() {
        let mut rng = rand::rng();
        for _ in 0..100 {
            let id = generate_account_id(&mut rng);
            assert_eq!(id.len(), 9);
            assert!(id.chars().all(|c| c.is_ascii_digit()));
        }
    }

    #[test]
    fn test_device_token_format() {
        let token = generate_device_token(&mut rand::rng());
        assert_eq!(token.len(), DEVICE_TOKEN_LENGTH);
        assert!(token.chars().all(|c| c.is_ascii_alphanumeric()));
    }

    #[test]
    fn test_hash_device_token() {
        // md5("abc") = 900150983cd24fb0d6963f7d28e17f72
        let expected = hex::encode(Sha256::digest(b"900150983cd24fb0d6963f7d28e17f72"));
        let hashed = hash_device_token("abc");
        assert_eq!(hashed, expected);
        assert_eq!(hashed.len(), 64);
        assert_ne!(hashed, "900150983cd24fb0d6963f7d28e17f72");
    }

    #[test]
    fn test_register_persists_double_hash() {
        let (store, service) = service();
        let code = nwc24_make_user_id(0x0403_AC68, 0, 1, 1);

        let credentials = service.register(&request("4362227774", code)).unwrap();

        let record = store.find_by_device_id("4362227774").unwrap().unwrap();
        assert_eq!(record.account_id, credentials.account_id);
        assert_eq!(record.hashed_token, hash_device_token(&credentials.device_token));
        assert_ne!(record.hashed_token, credentials.device_token);
        assert_eq!(record.device_code, code.to_string());
    }

    #[test]
    fn test_region_mismatch_persists_nothing() {
        let (store, service) = service();
        let mut req = request("1", nwc24_make_user_id(7, 0, 1, 1));
        req.register_region = "EUR".to_string();

        let err = service.register(&req).unwrap_err();
        assert!(matches!(err, SoapError::Registration(_)));
        assert_eq!(store.count().unwrap(), 0);
    }

    #[test]
    fn test_invalid_device_code() {
        let (store, service) = service();
        let mut req = request("1", 0);
        req.device_code = "not-a-number".to_string();
        assert!(matches!(service.register(&req), Err(SoapError::Registration(_))));

        let valid = nwc24_make_user_id(7, 0, 1, 1);
        let req = request("1", valid ^ 1);
        assert!(matches!(service.register(&req), Err(SoapError::Registration(_))));
        assert_eq!(store.count().unwrap(), 0);
    }

    #[test]
    fn test_device_tokens_are_distinct() {
        let mut rng = rand::rng();
        let tokens: HashSet<String> =
            (0..100_000).map(|_| generate_device_token(&mut rng)).collect();
        assert_eq!(tokens.len(), 100_000);
    }

    #[test]
    fn test_each_registration_gets_a_fresh_token() {
        let (_store, service) = service();
        let first = service
            .register(&request("1001", nwc24_make_user_id(0x0403_AC68, 0, 1, 1)))
            .unwrap();
        let second = service
            .register(&request("1002", nwc24_make_user_id(0x0102_0304, 2, 1, 1)))
            .unwrap();
        assert_ne!(first.device_token, second.device_token);
    }

    #[test]
    fn test_device_code_stored_in_canonical_form() {
        let (store, service) = service();
        let code = nwc24_make_user_id(0x0403_AC68, 0, 1, 1);
        let mut req = request("4362227774", code);
        req.device_code = format!("00{}", code);

        service.register(&req).unwrap();
        let record = store.find_by_device_id("4362227774").unwrap().unwrap();
        assert_eq!(record.device_code, code.to_string());
    }

    #[test]
    fn test_same_code_under_another_device_id() {
        let (store, service) = service();
        let code = nwc24_make_user_id(0x0403_AC68, 0, 1, 1);
        service.register(&request("1111", code)).unwrap();

        let mut padded = request("2222", code);
        padded.device_code = format!("0{}", code);
        let mut signed = request("3333", code);
        signed.device_code = format!("+{}", code);

        for req in [request("4444", code), padded, signed] {
            assert_eq!(
                service.register(&req).unwrap_err(),
                SoapError::Registration("user already exists".to_string())
            );
        }
        assert_eq!(store.count().unwrap(), 1);
    }

    #[test]
    fn test_duplicate_registration() {
        let (store, service) = service();
        let code = nwc24_make_user_id(0x0403_AC68, 0, 1, 1);

        let first = service.register(&request("4362227774", code)).unwrap();
        let err = service.register(&request("4362227774", code)).unwrap_err();

        assert_eq!(err, SoapError::Registration("user already exists".to_string()));
        let record = store.find_by_device_id("4362227774").unwrap().unwrap();
        assert_eq!(record.account_id, first.account_id);
        assert_eq!(store.count().unwrap(), 1);
    }
}
