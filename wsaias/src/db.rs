//! Module de gestion de la base de données SQLite des consoles enregistrées
//!
//! La table `userbase` ne reçoit que des insertions : un enregistrement est
//! créé une fois par `Register` et n'est jamais modifié ensuite. Les
//! contraintes d'unicité sur `DeviceId` et `DeviceCode` servent de
//! détection des doublons.

use parking_lot::Mutex;
use rusqlite::{Connection, ErrorCode, OptionalExtension, params};
use std::path::Path;
use thiserror::Error;
use tracing::info;

/// Erreurs du stockage des enregistrements
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("user already exists")]
    Duplicate,

    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),
}

/// Console enregistrée
///
/// Seul le double hash du jeton est conservé.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegistrationRecord {
    pub device_id: String,
    pub hashed_token: String,
    pub account_id: String,
    pub region: String,
    pub country: String,
    pub language: String,
    pub serial_number: String,
    pub device_code: String,
}

/// Stockage des enregistrements
pub trait RegistrationStore: Send + Sync {
    /// Insère un enregistrement en une seule opération
    ///
    /// Retourne [`StoreError::Duplicate`] si la console ou son code sont
    /// déjà connus.
    fn insert(&self, record: &RegistrationRecord) -> Result<(), StoreError>;
}

/// Stockage SQLite
#[derive(Debug)]
pub struct SqliteRegistrationStore {
    conn: Mutex<Connection>,
}

impl SqliteRegistrationStore {
    /// Ouvre (ou crée) la base et la table `userbase`
    ///
    /// # Exemple
    ///
    /// ```rust,no_run
    /// use wsaias::db::SqliteRegistrationStore;
    /// use std::path::Path;
    ///
    /// let store = SqliteRegistrationStore::open(Path::new("wsashop.db")).unwrap();
    /// ```
    pub fn open(path: &Path) -> Result<Self, StoreError> {
        let conn = Connection::open(path)?;
        info!(path = %path.display(), "Registration database opened");
        Self::init(conn)
    }

    /// Base en mémoire, perdue à la fermeture
    pub fn in_memory() -> Result<Self, StoreError> {
        Self::init(Connection::open_in_memory()?)
    }

    fn init(conn: Connection) -> Result<Self, StoreError> {
        conn.execute(
            "CREATE TABLE IF NOT EXISTS userbase (
                DeviceId TEXT PRIMARY KEY,
                DeviceToken TEXT NOT NULL,
                AccountId TEXT NOT NULL,
                Region TEXT NOT NULL,
                Country TEXT NOT NULL,
                Language TEXT NOT NULL,
                SerialNo TEXT NOT NULL,
                DeviceCode TEXT NOT NULL UNIQUE
            )",
            [],
        )?;

        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Nombre de consoles enregistrées
    pub fn count(&self) -> Result<usize, StoreError> {
        let conn = self.conn.lock();
        let n: i64 = conn.query_row("SELECT COUNT(*) FROM userbase", [], |row| row.get(0))?;
        Ok(n as usize)
    }

    /// Recherche l'enregistrement d'une console
    pub fn find_by_device_id(&self, device_id: &str) -> Result<Option<RegistrationRecord>, StoreError> {
        let conn = self.conn.lock();
        let record = conn
            .query_row(
                "SELECT DeviceId, DeviceToken, AccountId, Region, Country, Language, SerialNo, DeviceCode
                 FROM userbase WHERE DeviceId = ?1",
                params![device_id],
                |row| {
                    Ok(RegistrationRecord {
                        device_id: row.get(0)?,
                        hashed_token: row.get(1)?,
                        account_id: row.get(2)?,
                        region: row.get(3)?,
                        country: row.get(4)?,
                        language: row.get(5)?,
                        serial_number: row.get(6)?,
                        device_code: row.get(7)?,
                    })
                },
            )
            .optional()?;
        Ok(record)
    }
}

impl RegistrationStore for SqliteRegistrationStore {
    fn insert(&self, record: &RegistrationRecord) -> Result<(), StoreError> {
        let conn = self.conn.lock();
        let result = conn.execute(
            "INSERT INTO userbase (DeviceId, DeviceToken, AccountId, Region, Country, Language, SerialNo, DeviceCode)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
            params![
                record.device_id,
                record.hashed_token,
                record.account_id,
                record.region,
                record.country,
                record.language,
                record.serial_number,
                record.device_code,
            ],
        );

        match result {
            Ok(_) => Ok(()),
            Err(rusqlite::Error::SqliteFailure(e, _)) if e.code == ErrorCode::ConstraintViolation => {
                Err(StoreError::Duplicate)
            }
            Err(e) => Err(StoreError::Database(e)),
        }
    }
}
