#![allow(clippy::unwrap_used)]
// Integration tests for `SleepIqClient` using wiremock.

use pretty_assertions::assert_eq;
use secrecy::SecretString;
use serde_json::json;
use url::Url;
use wiremock::matchers::{body_json, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use bedcontrol_api::{
    Actuator, BedSide, Credentials, Error, FootwarmingLevel, FootwarmingRequest, OnOff, Outlet,
    PauseMode, Preset, SleepIqClient,
};

// ── Helpers ─────────────────────────────────────────────────────────

async fn setup() -> (MockServer, SleepIqClient) {
    let server = MockServer::start().await;
    let base_url = Url::parse(&format!("{}/rest/", server.uri())).unwrap();
    let client = SleepIqClient::with_client(
        reqwest::Client::new(),
        base_url,
        Credentials::new("sleeper@example.com", SecretString::from("hunter2")),
    );
    (server, client)
}

async fn mount_login(server: &MockServer, key: &str) {
    Mock::given(method("PUT"))
        .and(path("/rest/login"))
        .and(body_json(json!({
            "login": "sleeper@example.com",
            "password": "hunter2",
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "userId": "user-1",
            "key": key,
            "registrationState": 13,
            "edpLoginStatus": 200,
            "edpLoginMessage": "not used",
        })))
        .mount(server)
        .await;
}

async fn logged_in() -> (MockServer, SleepIqClient) {
    let (server, client) = setup().await;
    mount_login(&server, "key-1").await;
    client.login().await.unwrap();
    (server, client)
}

// ── Authentication ──────────────────────────────────────────────────

#[tokio::test]
async fn test_login_stores_session() {
    let (server, client) = setup().await;
    mount_login(&server, "abc").await;

    let session = client.login().await.unwrap();

    assert_eq!(session.user_id, "user-1");
    assert_eq!(session.key, "abc");
    assert_eq!(client.session(), Some(session));
}

#[tokio::test]
async fn test_login_rejected() {
    let (server, client) = setup().await;

    Mock::given(method("PUT"))
        .and(path("/rest/login"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({
            "Error": { "Code": 50002, "Message": "Invalid credentials" }
        })))
        .mount(&server)
        .await;

    let result = client.login().await;
    assert!(
        matches!(result, Err(Error::Authentication { .. })),
        "expected Authentication error, got: {result:?}"
    );
    assert_eq!(client.session(), None);
}

#[tokio::test]
async fn test_request_before_login_is_not_logged_in() {
    let (_server, client) = setup().await;

    let result = client.family_status().await;
    assert!(matches!(result, Err(Error::NotLoggedIn)));
    assert!(result.unwrap_err().is_auth_expired());
}

#[tokio::test]
async fn test_session_key_sent_as_query_param() {
    let (server, client) = logged_in().await;

    Mock::given(method("GET"))
        .and(path("/rest/bed/familyStatus"))
        .and(query_param("_k", "key-1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "beds": [] })))
        .expect(1)
        .mount(&server)
        .await;

    let beds = client.family_status().await.unwrap();
    assert!(beds.is_empty());
}

#[tokio::test]
async fn test_expired_session_maps_to_authentication() {
    let (server, client) = logged_in().await;

    Mock::given(method("GET"))
        .and(path("/rest/bed/42/status"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({
            "Error": { "Code": 50002, "Message": "Session is invalid" }
        })))
        .mount(&server)
        .await;

    let err = client.bed_status("42").await.unwrap_err();
    assert!(err.is_auth_expired(), "got {err:?}");
}

// ── Status mapping ──────────────────────────────────────────────────

#[tokio::test]
async fn test_missing_foundation_maps_to_not_found() {
    let (server, client) = logged_in().await;

    Mock::given(method("GET"))
        .and(path("/rest/bed/42/foundation/status"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let err = client.foundation_status("42").await.unwrap_err();
    assert!(err.is_not_found(), "got {err:?}");
    assert!(!err.is_auth_expired());
}

#[tokio::test]
async fn test_server_error_maps_to_api() {
    let (server, client) = logged_in().await;

    Mock::given(method("GET"))
        .and(path("/rest/bed/42/pauseMode"))
        .respond_with(ResponseTemplate::new(503).set_body_string("maintenance"))
        .mount(&server)
        .await;

    let err = client.pause_mode("42").await.unwrap_err();
    match err {
        Error::Api { status, message } => {
            assert_eq!(status, 503);
            assert_eq!(message, "maintenance");
        }
        other => panic!("expected Api error, got {other:?}"),
    }
}

#[tokio::test]
async fn test_malformed_body_maps_to_deserialization() {
    let (server, client) = logged_in().await;

    Mock::given(method("GET"))
        .and(path("/rest/bed/42/pump/status"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>"))
        .mount(&server)
        .await;

    let err = client.pump_status("42").await.unwrap_err();
    assert!(matches!(err, Error::Deserialization { ref body, .. } if body == "<html>"));
}

// ── Bed endpoints ───────────────────────────────────────────────────

#[tokio::test]
async fn test_family_status_parses_sides() {
    let (server, client) = logged_in().await;

    Mock::given(method("GET"))
        .and(path("/rest/bed/familyStatus"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "beds": [{
                "status": 1,
                "bedId": "42",
                "leftSide": {
                    "isInBed": true,
                    "alertDetailedMessage": "No Alert",
                    "sleepNumber": 35,
                    "alertId": 0,
                    "lastLink": "00:00:00",
                    "pressure": 1017
                },
                "rightSide": {
                    "isInBed": false,
                    "alertDetailedMessage": "Data Out of Sync",
                    "sleepNumber": 60,
                    "alertId": 0,
                    "lastLink": "00:00:00",
                    "pressure": 0
                }
            }]
        })))
        .mount(&server)
        .await;

    let beds = client.family_status().await.unwrap();
    assert_eq!(beds.len(), 1);
    let bed = &beds[0];
    assert_eq!(bed.bed_id, "42");
    assert!(bed.left_side.is_in_bed);
    assert_eq!(bed.left_side.sleep_number, 35);
    assert!(!bed.left_side.is_out_of_sync());
    assert!(bed.right_side.is_out_of_sync());
}

#[tokio::test]
async fn test_list_beds() {
    let (server, client) = logged_in().await;

    Mock::given(method("GET"))
        .and(path("/rest/bed"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "beds": [{
                "bedId": "42",
                "name": "Master",
                "model": "P6",
                "size": "KING",
                "dualSleep": true,
                "timezone": "US/Pacific"
            }]
        })))
        .mount(&server)
        .await;

    let beds = client.list_beds().await.unwrap();
    assert_eq!(beds[0].name, "Master");
    assert!(beds[0].dual_sleep);
}

#[tokio::test]
async fn test_pause_mode_roundtrip() {
    let (server, client) = logged_in().await;

    Mock::given(method("GET"))
        .and(path("/rest/bed/42/pauseMode"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "accountId": "acct",
            "bedId": "42",
            "pauseMode": "on"
        })))
        .mount(&server)
        .await;

    Mock::given(method("PUT"))
        .and(path("/rest/bed/42/pauseMode"))
        .and(query_param("mode", "off"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    assert_eq!(client.pause_mode("42").await.unwrap(), PauseMode::On);
    client.set_pause_mode("42", PauseMode::Off).await.unwrap();
}

#[tokio::test]
async fn test_set_sleep_number_body() {
    let (server, client) = logged_in().await;

    Mock::given(method("PUT"))
        .and(path("/rest/bed/42/sleepNumber"))
        .and(body_json(json!({ "side": "R", "sleepNumber": 45 })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .expect(1)
        .mount(&server)
        .await;

    client
        .set_sleep_number("42", BedSide::Right, 45)
        .await
        .unwrap();
}

#[tokio::test]
async fn test_set_responsive_air_only_sends_given_sides() {
    let (server, client) = logged_in().await;

    Mock::given(method("PUT"))
        .and(path("/rest/bed/42/responsiveAir"))
        .and(body_json(json!({ "leftSideEnabled": true })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .expect(1)
        .mount(&server)
        .await;

    client
        .set_responsive_air("42", Some(true), None)
        .await
        .unwrap();
}

#[tokio::test]
async fn test_pump_status() {
    let (server, client) = logged_in().await;

    Mock::given(method("GET"))
        .and(path("/rest/bed/42/pump/status"))
        .and(query_param("_k", "key-1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "activeTask": 0,
            "chamberType": 1,
            "leftSideSleepNumber": 40,
            "rightSideSleepNumber": 65
        })))
        .mount(&server)
        .await;

    let pump = client.pump_status("42").await.unwrap();
    assert_eq!(pump.chamber_type, 1);
    assert_eq!(pump.left_side_sleep_number, 40);
    assert_eq!(pump.right_side_sleep_number, 65);
}

#[tokio::test]
async fn test_force_idle() {
    let (server, client) = logged_in().await;

    Mock::given(method("PUT"))
        .and(path("/rest/bed/42/pump/forceIdle"))
        .and(body_json(json!({})))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    client.force_idle("42").await.unwrap();
}

// ── Foundation endpoints ────────────────────────────────────────────

#[tokio::test]
async fn test_preset_body() {
    let (server, client) = logged_in().await;

    Mock::given(method("PUT"))
        .and(path("/rest/bed/42/foundation/preset"))
        .and(body_json(json!({ "speed": 0, "side": "R", "preset": 2 })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .expect(1)
        .mount(&server)
        .await;

    client
        .preset("42", BedSide::Right, Preset::ZeroG)
        .await
        .unwrap();
}

#[tokio::test]
async fn test_motion_body() {
    let (server, client) = logged_in().await;

    Mock::given(method("PUT"))
        .and(path("/rest/bed/42/foundation/motion"))
        .and(body_json(json!({
            "side": "L",
            "headMotion": 1,
            "massageMotion": 0,
            "footMotion": 1
        })))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    client
        .motion("42", BedSide::Left, OnOff::On, OnOff::Off, OnOff::On)
        .await
        .unwrap();
}

#[tokio::test]
async fn test_underbed_light() {
    let (server, client) = logged_in().await;

    Mock::given(method("GET"))
        .and(path("/rest/bed/42/foundation/underbedLight"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "enableAuto": true,
            "prefSyncState": "Unset"
        })))
        .mount(&server)
        .await;

    Mock::given(method("PUT"))
        .and(path("/rest/bed/42/foundation/underbedLight"))
        .and(body_json(json!({ "enableAuto": false })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .expect(1)
        .mount(&server)
        .await;

    let light = client.underbed_light("42").await.unwrap();
    assert!(light.enable_auto);
    assert_eq!(light.pref_sync_state, "Unset");

    client.set_underbed_light("42", false).await.unwrap();
}

#[tokio::test]
async fn test_massage_body() {
    let (server, client) = logged_in().await;

    Mock::given(method("PUT"))
        .and(path("/rest/bed/42/foundation/adjustment"))
        .and(body_json(json!({
            "side": "R",
            "headMassageMotor": 1,
            "massageWaveMode": 0,
            "footMassageMotor": 1,
            "massageTimer": 15
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .expect(1)
        .mount(&server)
        .await;

    client
        .massage("42", BedSide::Right, OnOff::On, OnOff::Off, OnOff::On, 15)
        .await
        .unwrap();
}

#[tokio::test]
async fn test_adjust_body() {
    let (server, client) = logged_in().await;

    Mock::given(method("PUT"))
        .and(path("/rest/bed/42/foundation/adjustment/micro"))
        .and(body_json(json!({
            "speed": 0,
            "side": "L",
            "position": 30,
            "actuator": "F"
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .expect(1)
        .mount(&server)
        .await;

    client
        .adjust("42", BedSide::Left, Actuator::Foot, 30)
        .await
        .unwrap();
}

#[tokio::test]
async fn test_outlet_status_and_set() {
    let (server, client) = logged_in().await;

    Mock::given(method("GET"))
        .and(path("/rest/bed/42/foundation/outlet"))
        .and(query_param("outletId", "3"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "bedId": "42",
            "outlet": 3,
            "setting": 1,
            "timer": null
        })))
        .mount(&server)
        .await;

    Mock::given(method("PUT"))
        .and(path("/rest/bed/42/foundation/outlet"))
        .and(query_param("outletId", "2"))
        .and(query_param("setting", "0"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    let status = client.outlet_status("42", Outlet::LeftLight).await.unwrap();
    assert_eq!(status.outlet, Outlet::LeftLight);
    assert_eq!(status.setting, OnOff::On);

    client
        .set_outlet("42", Outlet::RightPlug, OnOff::Off)
        .await
        .unwrap();
}

#[tokio::test]
async fn test_footwarming() {
    let (server, client) = logged_in().await;

    Mock::given(method("GET"))
        .and(path("/rest/bed/42/foundation/footwarming"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "footWarmingStatusLeft": 57,
            "footWarmingStatusRight": 0,
            "footWarmingTimerLeft": 100,
            "footWarmingTimerRight": 0
        })))
        .mount(&server)
        .await;

    Mock::given(method("PUT"))
        .and(path("/rest/bed/42/foundation/footwarming"))
        .and(body_json(json!({
            "footWarmingStatusLeft": 72,
            "footWarmingTimerLeft": 30
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .expect(1)
        .mount(&server)
        .await;

    let status = client.footwarming("42").await.unwrap();
    assert_eq!(status.level(BedSide::Left), FootwarmingLevel::Med);
    assert_eq!(status.timer(BedSide::Left), 100);

    client
        .set_footwarming(
            "42",
            &FootwarmingRequest::for_side(BedSide::Left, FootwarmingLevel::High, 30),
        )
        .await
        .unwrap();
}

// ── Account endpoints ───────────────────────────────────────────────

#[tokio::test]
async fn test_sleepers() {
    let (server, client) = logged_in().await;

    Mock::given(method("GET"))
        .and(path("/rest/sleeper"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "sleepers": [{
                "sleeperId": "s-1",
                "firstName": "Ada",
                "bedId": "42",
                "side": 0,
                "isAccountOwner": true,
                "duration": null
            }]
        })))
        .mount(&server)
        .await;

    let sleepers = client.sleepers().await.unwrap();
    assert_eq!(sleepers.len(), 1);
    assert_eq!(sleepers[0].first_name.as_deref(), Some("Ada"));
    assert!(sleepers[0].extra.contains_key("duration"));
}

#[tokio::test]
async fn test_registration() {
    let (server, client) = logged_in().await;

    Mock::given(method("GET"))
        .and(path("/rest/registration"))
        .and(query_param("_k", "key-1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "accountId": "acct-9",
            "registrationState": 13
        })))
        .mount(&server)
        .await;

    let registration = client.registration().await.unwrap();
    assert_eq!(registration.account_id, "acct-9");
    assert_eq!(registration.registration_state, json!(13));
}

#[tokio::test]
async fn test_sleep_data_query() {
    let (server, client) = logged_in().await;

    Mock::given(method("GET"))
        .and(path("/rest/sleepData"))
        .and(query_param("date", "2024-03-01"))
        .and(query_param("interval", "D1"))
        .and(query_param("sleeper", "s-1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "sleeperId": "s-1",
            "sleepDataDays": [{ "date": "2024-03-01", "sleepIQAvg": 78 }]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let data = client.sleep_data("2024-03-01", "D1", "s-1").await.unwrap();
    assert_eq!(data["sleepDataDays"][0]["sleepIQAvg"], 78);
}

#[tokio::test]
async fn test_sleep_slice_data_optional_format() {
    let (server, client) = logged_in().await;

    Mock::given(method("GET"))
        .and(path("/rest/sleepSliceData"))
        .and(query_param("date", "2024-03-01"))
        .and(query_param("sleeper", "s-1"))
        .and(query_param("format", "csv"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "sleepers": [] })))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/rest/sleepSliceData"))
        .and(query_param("date", "2024-03-02"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "sleepers": [1] })))
        .expect(1)
        .mount(&server)
        .await;

    let with_format = client
        .sleep_slice_data("2024-03-01", "s-1", Some("csv"))
        .await
        .unwrap();
    assert_eq!(with_format["sleepers"], json!([]));

    let plain = client
        .sleep_slice_data("2024-03-02", "s-1", None)
        .await
        .unwrap();
    assert_eq!(plain["sleepers"], json!([1]));
}
