//! Extension pour intégrer les réglages du service d'identification dans wsaconfig
//!
//! Ce module fournit le trait `IasConfigExt` qui ajoute à `wsaconfig::Config`
//! le challenge partagé et l'emplacement de la base des enregistrements.

use crate::db::SqliteRegistrationStore;
use anyhow::Result;
use serde_yaml::Value;
use std::path::Path;
use std::sync::Arc;
use wsaconfig::Config;

const DEFAULT_CHALLENGE: &str = "NintyWhyPls";
const DEFAULT_DATABASE_PATH: &str = "wsashop.db";

/// Trait d'extension pour gérer le service IAS dans wsaconfig
///
/// # Exemple
///
/// ```rust,ignore
/// use wsaconfig::get_config;
/// use wsaias::IasConfigExt;
///
/// let config = get_config();
/// let store = config.open_registration_store()?;
/// ```
pub trait IasConfigExt {
    /// Challenge renvoyé par `GetChallenge` (default: "NintyWhyPls")
    fn get_ias_challenge(&self) -> Result<String>;

    fn set_ias_challenge(&self, challenge: String) -> Result<()>;

    /// Chemin absolu de la base SQLite
    ///
    /// Un chemin relatif est résolu depuis le répertoire de configuration.
    fn get_ias_database_path(&self) -> Result<String>;

    fn set_ias_database_path(&self, path: String) -> Result<()>;

    /// Ouvre la base des enregistrements à l'emplacement configuré
    fn open_registration_store(&self) -> Result<Arc<SqliteRegistrationStore>>;
}

impl IasConfigExt for Config {
    fn get_ias_challenge(&self) -> Result<String> {
        match self.get_value(&["ias", "challenge"]) {
            Ok(Value::String(s)) if !s.is_empty() => Ok(s),
            _ => Ok(DEFAULT_CHALLENGE.to_string()),
        }
    }

    fn set_ias_challenge(&self, challenge: String) -> Result<()> {
        self.set_value(&["ias", "challenge"], Value::String(challenge))
    }

    fn get_ias_database_path(&self) -> Result<String> {
        let path = match self.get_value(&["ias", "database", "path"]) {
            Ok(Value::String(s)) if !s.is_empty() => s,
            _ => DEFAULT_DATABASE_PATH.to_string(),
        };
        self.resolve_path(&path)
    }

    fn set_ias_database_path(&self, path: String) -> Result<()> {
        self.set_value(&["ias", "database", "path"], Value::String(path))
    }

    fn open_registration_store(&self) -> Result<Arc<SqliteRegistrationStore>> {
        let path = self.get_ias_database_path()?;
        Ok(Arc::new(SqliteRegistrationStore::open(Path::new(&path))?))
    }
}
