use thiserror::Error;

/// Erreurs du protocole SOAP
///
/// Les trois premières variantes sont levées avant qu'une enveloppe de
/// réponse n'existe : elles donnent lieu à un refus en texte brut. Les
/// autres sont converties en réponse d'erreur via
/// [`Envelope::return_error`](crate::Envelope::return_error).
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SoapError {
    #[error("unroutable request: {0}")]
    Unroutable(String),

    #[error("malformed XML input: {0}")]
    MalformedInput(String),

    #[error("missing root node {service}:{action}")]
    MissingRootNode { service: String, action: String },

    #[error("missing mandatory field {0}")]
    MissingMandatoryField(String),

    #[error("{0}")]
    Registration(String),

    #[error("storage failure: {0}")]
    Storage(String),

    #[error("failed to serialize envelope: {0}")]
    Serialize(String),
}

impl SoapError {
    /// Vrai si la requête doit être refusée sans enveloppe XML
    pub fn is_rejection(&self) -> bool {
        matches!(
            self,
            SoapError::Unroutable(_) | SoapError::MalformedInput(_) | SoapError::MissingRootNode { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejection_classification() {
        assert!(SoapError::Unroutable("x".into()).is_rejection());
        assert!(SoapError::MalformedInput("x".into()).is_rejection());
        assert!(
            SoapError::MissingRootNode {
                service: "ias".into(),
                action: "Register".into()
            }
            .is_rejection()
        );
        assert!(!SoapError::MissingMandatoryField("Region".into()).is_rejection());
        assert!(!SoapError::Registration("user already exists".into()).is_rejection());
    }

    #[test]
    fn test_registration_message_is_verbatim() {
        let err = SoapError::Registration("user already exists".into());
        assert_eq!(err.to_string(), "user already exists");
    }
}
