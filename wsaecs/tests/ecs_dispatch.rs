use wsaecs::EcsHandler;
use wsasoap::{Balance, SoapDispatcher, SoapError};

fn dispatcher() -> SoapDispatcher {
    SoapDispatcher::new("broadon.com").with_handler(EcsHandler::new(Balance {
        amount: 2018,
        currency: "POINTS".to_string(),
    }))
}

fn request(action: &str, prefix: &str) -> String {
    format!(
        r#"<?xml version="1.0" encoding="UTF-8"?>
<SOAP-ENV:Envelope xmlns:SOAP-ENV="http://schemas.xmlsoap.org/soap/envelope/"
    xmlns:{prefix}="urn:ecs.wsapi.broadon.com">
  <SOAP-ENV:Body>
    <{prefix}:{action} xmlns:xsi="http://www.w3.org/2001/XMLSchema-instance">
      <{prefix}:Version>2.0</{prefix}:Version>
      <{prefix}:MessageId>ECDK-4362227774-98765</{prefix}:MessageId>
      <{prefix}:DeviceId>4362227774</{prefix}:DeviceId>
      <{prefix}:AccountId>123456789</{prefix}:AccountId>
    </{prefix}:{action}>
  </SOAP-ENV:Body>
</SOAP-ENV:Envelope>"#
    )
}

#[test]
fn test_check_device_status_end_to_end() {
    let reply = dispatcher()
        .dispatch(
            "urn:ecs.wsapi.broadon.com/CheckDeviceStatus",
            request("CheckDeviceStatus", "ecs").as_bytes(),
        )
        .unwrap();

    assert!(reply.success);
    assert!(reply.xml.contains("<CheckDeviceStatusResponse xmlns=\"urn:ecs.wsapi.broadon.com\">"));
    assert!(reply.xml.contains("<DeviceId>4362227774</DeviceId>"));
    assert!(reply.xml.contains("<MessageId>ECDK-4362227774-98765</MessageId>"));
    assert!(reply.xml.contains("<Currency>POINTS</Currency>"));
}

#[test]
fn test_every_action_succeeds() {
    for action in wsaecs::ECS_ACTIONS {
        let reply = dispatcher()
            .dispatch(
                &format!("urn:ecs.wsapi.broadon.com/{}", action),
                request(action, "ecs").as_bytes(),
            )
            .unwrap();
        assert!(reply.success, "{} failed", action);
        assert!(reply.xml.contains(&format!("<{}Response", action)));
    }
}

#[test]
fn test_body_prefix_must_match_service() {
    let err = dispatcher()
        .dispatch(
            "urn:ecs.wsapi.broadon.com/ListETickets",
            request("ListETickets", "ias").as_bytes(),
        )
        .unwrap_err();
    assert!(matches!(err, SoapError::MissingRootNode { .. }));
}
