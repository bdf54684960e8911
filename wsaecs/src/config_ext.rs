//! Extension pour intégrer les réglages du service de commerce dans wsaconfig
//!
//! Ce module fournit le trait `EcsConfigExt` qui ajoute à `wsaconfig::Config`
//! la lecture du solde annoncé aux consoles.

use anyhow::Result;
use serde_yaml::{Number, Value};
use wsaconfig::Config;
use wsasoap::Balance;

const DEFAULT_BALANCE_AMOUNT: i64 = 2018;
const DEFAULT_BALANCE_CURRENCY: &str = "POINTS";

/// Trait d'extension pour gérer le service ECS dans wsaconfig
///
/// # Exemple
///
/// ```rust,ignore
/// use wsaconfig::get_config;
/// use wsaecs::EcsConfigExt;
///
/// let balance = get_config().get_ecs_balance()?;
/// assert_eq!(balance.currency, "POINTS");
/// ```
pub trait EcsConfigExt {
    /// Montant du solde (default: 2018)
    fn get_ecs_balance_amount(&self) -> Result<i64>;

    fn set_ecs_balance_amount(&self, amount: i64) -> Result<()>;

    /// Devise du solde (default: "POINTS")
    fn get_ecs_balance_currency(&self) -> Result<String>;

    fn set_ecs_balance_currency(&self, currency: String) -> Result<()>;

    /// Solde complet, prêt à être ajouté à une enveloppe
    fn get_ecs_balance(&self) -> Result<Balance>;
}

impl EcsConfigExt for Config {
    fn get_ecs_balance_amount(&self) -> Result<i64> {
        match self.get_value(&["ecs", "balance", "amount"]) {
            Ok(Value::Number(n)) => Ok(n.as_i64().unwrap_or(DEFAULT_BALANCE_AMOUNT)),
            _ => Ok(DEFAULT_BALANCE_AMOUNT),
        }
    }

    fn set_ecs_balance_amount(&self, amount: i64) -> Result<()> {
        self.set_value(&["ecs", "balance", "amount"], Value::Number(Number::from(amount)))
    }

    fn get_ecs_balance_currency(&self) -> Result<String> {
        match self.get_value(&["ecs", "balance", "currency"]) {
            Ok(Value::String(s)) if !s.is_empty() => Ok(s),
            _ => Ok(DEFAULT_BALANCE_CURRENCY.to_string()),
        }
    }

    fn set_ecs_balance_currency(&self, currency: String) -> Result<()> {
        self.set_value(&["ecs", "balance", "currency"], Value::String(currency))
    }

    fn get_ecs_balance(&self) -> Result<Balance> {
        Ok(Balance {
            amount: self.get_ecs_balance_amount()?,
            currency: self.get_ecs_balance_currency()?,
        })
    }
}
