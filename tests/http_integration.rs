// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Integration tests for the HTTP/XML controller transport using wiremock.

use std::time::Duration;

use ezr2mqtt::model::{DeviceMessage, HeatArea};
use ezr2mqtt::transport::{DeviceTransport, HttpConfig, HttpTransport};
use ezr2mqtt::types::HeatAreaMode;
use ezr2mqtt::{Error, ParseError, ProtocolError};
use wiremock::matchers::{body_string_contains, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const STATIC_XML: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<Devices>
  <Device>
    <ID>EZR-0001</ID>
    <TYPE>EZR</TYPE>
    <NAME>Floor 1</NAME>
    <VERS_SW_ETH>2.1.0</VERS_SW_ETH>
    <DATETIME>2025-01-01T12:00:00</DATETIME>
    <VACATION><VACATION_STATE>0</VACATION_STATE><START_DATE>2025-01-01</START_DATE></VACATION>
    <NETWORK><MAC>00:11:22:33:44:55</MAC><DHCP>1</DHCP></NETWORK>
    <HEATAREA nr="1">
      <HEATAREA_NAME>Living Room</HEATAREA_NAME>
      <HEATAREA_MODE>1</HEATAREA_MODE>
      <T_ACTUAL>21.37</T_ACTUAL>
      <T_TARGET>22.5</T_TARGET>
      <T_TARGET_MIN>5</T_TARGET_MIN>
      <T_TARGET_MAX>30</T_TARGET_MAX>
    </HEATAREA>
    <HEATAREA nr="2">
      <HEATAREA_NAME>Bedroom</HEATAREA_NAME>
      <HEATAREA_MODE>2</HEATAREA_MODE>
      <T_ACTUAL>18.9</T_ACTUAL>
      <T_TARGET>18</T_TARGET>
    </HEATAREA>
    <HEATCTRL nr="1"><INUSE>1</INUSE><HEATAREA_NR>1</HEATAREA_NR><ACTOR_PERCENT>40</ACTOR_PERCENT></HEATCTRL>
    <HEATCTRL nr="2"><INUSE>1</INUSE><HEATAREA_NR>2</HEATAREA_NR><ACTOR_PERCENT>0</ACTOR_PERCENT></HEATCTRL>
  </Device>
</Devices>"#;

fn transport_for(server: &MockServer) -> HttpTransport {
    let address = server.address();
    HttpConfig::new(address.ip().to_string())
        .with_port(address.port())
        .with_timeout(Duration::from_secs(2))
        .into_transport()
        .unwrap()
}

// ============================================================================
// Snapshot Tests
// ============================================================================

mod fetch_snapshot {
    use super::*;

    #[tokio::test]
    async fn decodes_static_document() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/data/static.xml"))
            .respond_with(ResponseTemplate::new(200).set_body_string(STATIC_XML))
            .expect(1)
            .mount(&mock_server)
            .await;

        let snapshot = transport_for(&mock_server).fetch_snapshot().await.unwrap();
        let device = &snapshot.device;

        assert_eq!(device.id.as_deref(), Some("EZR-0001"));
        assert_eq!(device.kind.as_deref(), Some("EZR"));
        assert_eq!(device.name.as_deref(), Some("Floor 1"));
        assert_eq!(device.heat_areas.len(), 2);
        assert_eq!(device.heat_ctrls.len(), 2);

        let living = device.heat_area(1).unwrap();
        assert_eq!(living.display_name(), "Living Room");
        assert_eq!(living.mode, Some(HeatAreaMode::Day));
        assert_eq!(living.t_actual, Some(21.37));
        assert_eq!(living.t_target_max, Some(30.0));

        assert_eq!(device.heat_area(2).unwrap().mode, Some(HeatAreaMode::Night));
    }

    #[tokio::test]
    async fn server_error_is_unexpected_status() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/data/static.xml"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&mock_server)
            .await;

        let err = transport_for(&mock_server).fetch_snapshot().await.unwrap_err();
        assert!(matches!(
            err,
            Error::Protocol(ProtocolError::UnexpectedStatus { status: 503, .. })
        ));
    }

    #[tokio::test]
    async fn malformed_document_is_parse_error() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/data/static.xml"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_string("<Devices><Device><HEATAREA nr=\"1\"><T_TARGET>warm</T_TARGET></HEATAREA></Device></Devices>"),
            )
            .mount(&mock_server)
            .await;

        let err = transport_for(&mock_server).fetch_snapshot().await.unwrap_err();
        assert!(matches!(err, Error::Parse(ParseError::Xml(_))));
    }

    #[tokio::test]
    async fn unknown_mode_does_not_reject_snapshot() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/data/static.xml"))
            .respond_with(
                ResponseTemplate::new(200).set_body_string(STATIC_XML.replace(
                    "<HEATAREA_MODE>1</HEATAREA_MODE>",
                    "<HEATAREA_MODE>7</HEATAREA_MODE>",
                )),
            )
            .mount(&mock_server)
            .await;

        let snapshot = transport_for(&mock_server).fetch_snapshot().await.unwrap();
        let device = &snapshot.device;
        assert_eq!(device.id.as_deref(), Some("EZR-0001"));
        assert_eq!(device.heat_area(1).unwrap().mode, Some(HeatAreaMode::Unknown(7)));
        assert_eq!(device.heat_area(1).unwrap().t_actual, Some(21.37));
        assert_eq!(device.heat_area(2).unwrap().mode, Some(HeatAreaMode::Night));
    }

    #[tokio::test]
    async fn unreachable_controller_is_http_error() {
        let transport = HttpConfig::new("127.0.0.1")
            .with_port(1)
            .with_timeout(Duration::from_millis(500))
            .into_transport()
            .unwrap();

        let err = transport.fetch_snapshot().await.unwrap_err();
        assert!(matches!(err, Error::Protocol(ProtocolError::Http(_))));
    }
}

// ============================================================================
// Update Tests
// ============================================================================

mod send_update {
    use super::*;

    #[tokio::test]
    async fn posts_sparse_target_update() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/data/changes.xml"))
            .and(header("content-type", "application/xml"))
            .and(body_string_contains("<?xml version=\"1.0\" encoding=\"UTF-8\"?>"))
            .and(body_string_contains("<ID>EZR-0001</ID>"))
            .and(body_string_contains("<HEATAREA nr=\"1\">"))
            .and(body_string_contains("<T_TARGET>23.5</T_TARGET>"))
            .respond_with(ResponseTemplate::new(200))
            .expect(1)
            .mount(&mock_server)
            .await;

        let mut update = DeviceMessage::heat_area_update(HeatArea::new(1).with_target(23.5));
        update.device.id = Some("EZR-0001".to_string());

        transport_for(&mock_server).send_update(&update).await.unwrap();
    }

    #[tokio::test]
    async fn auto_mode_is_sent_as_zero() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/data/changes.xml"))
            .and(body_string_contains("<HEATAREA_MODE>0</HEATAREA_MODE>"))
            .respond_with(ResponseTemplate::new(200))
            .expect(1)
            .mount(&mock_server)
            .await;

        let update = DeviceMessage::heat_area_update(HeatArea::new(2).with_mode(HeatAreaMode::Auto));
        transport_for(&mock_server).send_update(&update).await.unwrap();
    }

    #[tokio::test]
    async fn rejected_update_is_unexpected_status() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/data/changes.xml"))
            .respond_with(ResponseTemplate::new(400))
            .mount(&mock_server)
            .await;

        let update = DeviceMessage::heat_area_update(HeatArea::new(1).with_target(20.0));
        let err = transport_for(&mock_server).send_update(&update).await.unwrap_err();
        assert!(matches!(
            err,
            Error::Protocol(ProtocolError::UnexpectedStatus { status: 400, .. })
        ));
    }
}
