//! Normalisation des requêtes SOAP entrantes
//!
//! Le corps d'une requête est un document XML complet (enveloppe, body,
//! élément d'action préfixé par le service). Seul l'élément d'action est
//! conservé, débarrassé de tous ses préfixes de namespace, pour que les
//! handlers puissent chercher leurs champs par nom local.

use crate::SoapError;
use std::io::BufReader;
use xmltree::{Element, XMLNode};

/// Élément d'action extrait et normalisé
#[derive(Debug, Clone)]
pub struct NormalizedDocument {
    root: Element,
}

impl NormalizedDocument {
    /// Parse `xml` et isole l'élément `<service:action>`
    ///
    /// # Errors
    ///
    /// - [`SoapError::MalformedInput`] si le XML est invalide
    /// - [`SoapError::MissingRootNode`] si aucun élément ne porte le nom
    ///   `action` avec le préfixe `service`
    pub fn parse(service: &str, action: &str, xml: &[u8]) -> Result<Self, SoapError> {
        let parsed = Element::parse(BufReader::new(xml))
            .map_err(|e| SoapError::MalformedInput(e.to_string()))?;

        let target = find_action_element(&parsed, service, action).ok_or_else(|| {
            SoapError::MissingRootNode {
                service: service.to_string(),
                action: action.to_string(),
            }
        })?;

        Ok(Self {
            root: strip_prefixes(target),
        })
    }

    /// Nom local de l'élément d'action
    pub fn action_name(&self) -> &str {
        &self.root.name
    }

    pub fn root(&self) -> &Element {
        &self.root
    }

    /// Texte du premier descendant nommé `name`, en ordre de document
    ///
    /// Un élément présent mais vide donne une chaîne vide.
    pub fn get_field(&self, name: &str) -> Result<String, SoapError> {
        find_descendant(&self.root, name)
            .map(|el| el.get_text().map(|t| t.trim().to_string()).unwrap_or_default())
            .ok_or_else(|| SoapError::MissingMandatoryField(name.to_string()))
    }

    /// Variante de [`get_field`](Self::get_field) pour les champs facultatifs
    pub fn find_field(&self, name: &str) -> Option<String> {
        self.get_field(name).ok()
    }
}

/// Raccourci pour [`NormalizedDocument::parse`]
pub fn normalize(service: &str, action: &str, xml: &[u8]) -> Result<NormalizedDocument, SoapError> {
    NormalizedDocument::parse(service, action, xml)
}

fn find_action_element<'a>(el: &'a Element, service: &str, action: &str) -> Option<&'a Element> {
    if el.name == action && el.prefix.as_deref() == Some(service) {
        return Some(el);
    }
    el.children
        .iter()
        .filter_map(XMLNode::as_element)
        .find_map(|child| find_action_element(child, service, action))
}

fn find_descendant<'a>(el: &'a Element, name: &str) -> Option<&'a Element> {
    for child in el.children.iter().filter_map(XMLNode::as_element) {
        if child.name == name {
            return Some(child);
        }
        if let Some(found) = find_descendant(child, name) {
            return Some(found);
        }
    }
    None
}

fn strip_prefixes(el: &Element) -> Element {
    let mut out = Element::new(&el.name);
    out.attributes = el.attributes.clone();
    out.children = el
        .children
        .iter()
        .map(|node| match node {
            XMLNode::Element(child) => XMLNode::Element(strip_prefixes(child)),
            other => other.clone(),
        })
        .collect();
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    const REGISTER: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<SOAP-ENV:Envelope xmlns:SOAP-ENV="http://schemas.xmlsoap.org/soap/envelope/"
    xmlns:ias="urn:ias.wsapi.broadon.com">
  <SOAP-ENV:Body>
    <ias:Register xsi:type="ias:RegisterRequestType"
        xmlns:xsi="http://www.w3.org/2001/XMLSchema-instance">
      <ias:Version>2.0</ias:Version>
      <ias:DeviceId>4362227774</ias:DeviceId>
      <ias:Region>USA</ias:Region>
      <ias:ExtAccountId></ias:ExtAccountId>
      <ias:Nested><ias:Inner>deep</ias:Inner></ias:Nested>
      <ias:Inner>shallow</ias:Inner>
    </ias:Register>
  </SOAP-ENV:Body>
</SOAP-ENV:Envelope>"#;

    fn assert_no_prefix(el: &Element) {
        assert!(el.prefix.is_none(), "prefix left on {}", el.name);
        for child in el.children.iter().filter_map(XMLNode::as_element) {
            assert_no_prefix(child);
        }
    }

    #[test]
    fn test_parse_extracts_action_element() {
        let doc = NormalizedDocument::parse("ias", "Register", REGISTER.as_bytes()).unwrap();
        assert_eq!(doc.action_name(), "Register");
        assert_no_prefix(doc.root());
    }

    #[test]
    fn test_get_field() {
        let doc = NormalizedDocument::parse("ias", "Register", REGISTER.as_bytes()).unwrap();
        assert_eq!(doc.get_field("DeviceId").unwrap(), "4362227774");
        assert_eq!(doc.get_field("Region").unwrap(), "USA");
    }

    #[test]
    fn test_get_field_empty_element() {
        let doc = NormalizedDocument::parse("ias", "Register", REGISTER.as_bytes()).unwrap();
        assert_eq!(doc.get_field("ExtAccountId").unwrap(), "");
    }

    #[test]
    fn test_get_field_document_order() {
        let doc = NormalizedDocument::parse("ias", "Register", REGISTER.as_bytes()).unwrap();
        assert_eq!(doc.get_field("Inner").unwrap(), "deep");
    }

    #[test]
    fn test_get_field_missing() {
        let doc = NormalizedDocument::parse("ias", "Register", REGISTER.as_bytes()).unwrap();
        assert_eq!(
            doc.get_field("SerialNumber"),
            Err(SoapError::MissingMandatoryField("SerialNumber".to_string()))
        );
        assert_eq!(doc.find_field("SerialNumber"), None);
    }

    #[test]
    fn test_children_with_another_prefix() {
        let xml = r#"<?xml version="1.0"?>
<soapenv:Envelope xmlns:soapenv="http://schemas.xmlsoap.org/soap/envelope/">
  <soapenv:Body>
    <ias:Register xmlns:ias="urn:ias.wsapi.broadon.com" xmlns:q="urn:ias.wsapi.broadon.com">
      <q:Version>2.0</q:Version>
      <q:DeviceId>4362227774</q:DeviceId>
      <ias:Region>USA</ias:Region>
      <q:Profile><q:Country>US</q:Country></q:Profile>
    </ias:Register>
  </soapenv:Body>
</soapenv:Envelope>"#;

        let doc = NormalizedDocument::parse("ias", "Register", xml.as_bytes()).unwrap();
        assert_no_prefix(doc.root());
        assert_eq!(doc.get_field("Version").unwrap(), "2.0");
        assert_eq!(doc.get_field("DeviceId").unwrap(), "4362227774");
        assert_eq!(doc.get_field("Region").unwrap(), "USA");
        assert_eq!(doc.get_field("Country").unwrap(), "US");
        assert!(doc.root().get_child("Profile").is_some());
    }

    #[test]
    fn test_wrong_action_is_missing_root() {
        let err = NormalizedDocument::parse("ias", "Unregister", REGISTER.as_bytes()).unwrap_err();
        assert!(matches!(err, SoapError::MissingRootNode { .. }));
    }

    #[test]
    fn test_wrong_prefix_is_missing_root() {
        let err = NormalizedDocument::parse("ecs", "Register", REGISTER.as_bytes()).unwrap_err();
        assert!(matches!(err, SoapError::MissingRootNode { .. }));
    }

    #[test]
    fn test_malformed_input() {
        let err = NormalizedDocument::parse("ias", "Register", b"<ias:Register>").unwrap_err();
        assert!(matches!(err, SoapError::MalformedInput(_)));
    }
}
