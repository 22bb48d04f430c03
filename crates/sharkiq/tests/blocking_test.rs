#![allow(clippy::unwrap_used)]
// Blocking facade tests. The mock server runs on its own multi-thread
// runtime; the blocking client drives a private current-thread one, so
// these are plain `#[test]` functions.

use serde_json::json;
use url::Url;
use wiremock::matchers::{body_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use sharkiq::blocking::AylaClient;
use sharkiq::{Credentials, Error, OperatingMode, Property, PropertyValue};

// ── Helpers ─────────────────────────────────────────────────────────

fn start_server(rt: &tokio::runtime::Runtime) -> MockServer {
    rt.block_on(async {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/users/sign_in.json"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "access_token": "abc",
                "refresh_token": "def",
                "expires_in": 3600,
            })))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/apiv1/devices.json"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([{
                "device": {
                    "dsn": "AC000W000000001",
                    "key": 32065,
                    "product_name": "Living Room",
                    "oem_model": "RV1001AE",
                }
            }])))
            .mount(&server)
            .await;

        server
    })
}

fn client_for(server: &MockServer) -> AylaClient {
    let base_url = Url::parse(&server.uri()).unwrap();
    AylaClient::with_endpoints(
        Credentials::new("user@example.com", "hunter2", "app-id", "app-secret"),
        base_url.clone(),
        base_url,
    )
    .unwrap()
}

// ── Tests ───────────────────────────────────────────────────────────

#[test]
fn blocking_sign_in_and_device_listing() {
    let rt = tokio::runtime::Runtime::new().unwrap();
    let server = start_server(&rt);
    let client = client_for(&server);

    assert!(!client.is_authenticated());
    client.sign_in().unwrap();
    assert!(client.is_authenticated());

    let vacuums = client.get_devices().unwrap();
    assert_eq!(vacuums.len(), 1);
    assert_eq!(vacuums[0].serial_number(), "AC000W000000001");
    assert_eq!(vacuums[0].name(), "Living Room");
}

#[test]
fn blocking_requests_require_session() {
    let rt = tokio::runtime::Runtime::new().unwrap();
    let server = start_server(&rt);
    let client = client_for(&server);

    let result = client.list_devices();
    assert!(matches!(result, Err(Error::NotAuthenticated)), "got: {result:?}");
}

#[test]
fn blocking_property_write_round_trip() {
    let rt = tokio::runtime::Runtime::new().unwrap();
    let server = start_server(&rt);

    rt.block_on(async {
        Mock::given(method("POST"))
            .and(path(
                "/apiv1/dsns/AC000W000000001/properties/SET_Operating_Mode/datapoints.json",
            ))
            .and(body_json(json!({"datapoint": {"value": 2}})))
            .respond_with(ResponseTemplate::new(201).set_body_json(json!({
                "datapoint": {"value": 2}
            })))
            .expect(1)
            .mount(&server)
            .await;
    });

    let client = client_for(&server);
    client.sign_in().unwrap();

    let mut vacuums = client.get_devices().unwrap();
    let vacuum = &mut vacuums[0];
    vacuum.set_operating_mode(OperatingMode::Start).unwrap();

    assert_eq!(
        vacuum.get_property_value(Property::OperatingMode),
        Some(PropertyValue::Int(2))
    );
}
