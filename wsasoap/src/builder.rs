//! Sérialisation des enveloppes de réponse

use crate::SoapError;
use crate::envelope::{Field, Response};
use quick_xml::Writer;
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};

pub const SOAP_ENVELOPE_NS: &str = "http://schemas.xmlsoap.org/soap/envelope/";
pub const XSD_NS: &str = "http://www.w3.org/2001/XMLSchema";
pub const XSI_NS: &str = "http://www.w3.org/2001/XMLSchema-instance";

type XmlWriter = Writer<Vec<u8>>;

fn write(writer: &mut XmlWriter, event: Event<'_>) -> Result<(), SoapError> {
    writer
        .write_event(event)
        .map_err(|e| SoapError::Serialize(e.to_string()))
}

fn start(writer: &mut XmlWriter, name: &str) -> Result<(), SoapError> {
    write(writer, Event::Start(BytesStart::new(name)))
}

fn end(writer: &mut XmlWriter, name: &str) -> Result<(), SoapError> {
    write(writer, Event::End(BytesEnd::new(name)))
}

fn leaf(writer: &mut XmlWriter, name: &str, value: &str) -> Result<(), SoapError> {
    start(writer, name)?;
    write(writer, Event::Text(BytesText::new(value)))?;
    end(writer, name)
}

/// Produit le document XML complet d'une réponse
///
/// Ordre fixe : Version, DeviceId, MessageId, TimeStamp, ErrorCode,
/// ServiceStandbyMode, puis les champs de l'action dans leur ordre d'ajout.
pub(crate) fn render_envelope(response: &Response) -> Result<String, SoapError> {
    let mut writer = Writer::new_with_indent(Vec::new(), b' ', 2);

    write(
        &mut writer,
        Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)),
    )?;

    let mut envelope = BytesStart::new("soapenv:Envelope");
    envelope.push_attribute(("xmlns:soapenv", SOAP_ENVELOPE_NS));
    envelope.push_attribute(("xmlns:xsd", XSD_NS));
    envelope.push_attribute(("xmlns:xsi", XSI_NS));
    write(&mut writer, Event::Start(envelope))?;
    start(&mut writer, "soapenv:Body")?;

    let response_name = response.element_name();
    let mut response_start = BytesStart::new(response_name.as_str());
    response_start.push_attribute(("xmlns", response.namespace.as_str()));
    write(&mut writer, Event::Start(response_start))?;

    leaf(&mut writer, "Version", &response.version)?;
    leaf(&mut writer, "DeviceId", &response.device_id)?;
    leaf(&mut writer, "MessageId", &response.message_id)?;
    leaf(&mut writer, "TimeStamp", &response.timestamp)?;
    leaf(&mut writer, "ErrorCode", &response.error_code.to_string())?;
    leaf(
        &mut writer,
        "ServiceStandbyMode",
        if response.service_standby_mode { "true" } else { "false" },
    )?;

    for field in &response.custom_fields {
        match field {
            Field::Leaf { name, value } => leaf(&mut writer, name, value)?,
            Field::Group(group) => {
                start(&mut writer, group.element_name())?;
                for (name, value) in group.children() {
                    leaf(&mut writer, name, &value)?;
                }
                end(&mut writer, group.element_name())?;
            }
        }
    }

    end(&mut writer, &response_name)?;
    end(&mut writer, "soapenv:Body")?;
    end(&mut writer, "soapenv:Envelope")?;

    String::from_utf8(writer.into_inner()).map_err(|e| SoapError::Serialize(e.to_string()))
}
