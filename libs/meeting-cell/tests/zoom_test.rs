// libs/meeting-cell/tests/zoom_test.rs
use assert_matches::assert_matches;
use chrono::{TimeZone, Utc};
use serde_json::json;
use wiremock::matchers::{body_partial_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use meeting_cell::{CreateMeetingRequest, MeetingError, MeetingProvisioner, ZoomMeetingClient};
use shared_config::AppConfig;

fn config(server: &MockServer) -> AppConfig {
    AppConfig {
        jwt_secret: "irrelevant".to_string(),
        zoom_account_id: "acct-1".to_string(),
        zoom_client_id: "client-1".to_string(),
        zoom_client_secret: "secret-1".to_string(),
        zoom_fallback_host: "me".to_string(),
        zoom_api_base_url: format!("{}/v2", server.uri()),
        zoom_oauth_token_url: format!("{}/oauth/token", server.uri()),
    }
}

fn meeting_request(host: Option<&str>) -> CreateMeetingRequest {
    CreateMeetingRequest {
        host_id: host.map(String::from),
        topic: "Therapy session".to_string(),
        start_time: Utc.with_ymd_and_hms(2029, 1, 1, 9, 0, 0).unwrap(),
        duration_minutes: 30,
        timezone: "UTC".to_string(),
    }
}

async fn mount_token_endpoint(server: &MockServer) {
    Mock::given(method("POST"))
        .and(path("/oauth/token"))
        .and(query_param("grant_type", "account_credentials"))
        .and(query_param("account_id", "acct-1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "access_token": "test-token",
            "token_type": "bearer",
            "expires_in": 3600
        })))
        .mount(server)
        .await;
}

fn meeting_response() -> ResponseTemplate {
    ResponseTemplate::new(201).set_body_json(json!({
        "id": 987654321,
        "join_url": "https://zoom.example/j/987654321",
        "start_url": "https://zoom.example/s/987654321",
        "password": "abc123"
    }))
}

#[tokio::test]
async fn creates_scheduled_meeting_for_known_host() {
    let server = MockServer::start().await;
    mount_token_endpoint(&server).await;

    Mock::given(method("POST"))
        .and(path("/v2/users/dr-ada/meetings"))
        .and(header("Authorization", "Bearer test-token"))
        .and(body_partial_json(json!({ "type": 2, "duration": 30 })))
        .respond_with(meeting_response())
        .expect(1)
        .mount(&server)
        .await;

    let client = ZoomMeetingClient::new(&config(&server));
    let meeting = client
        .create_meeting(meeting_request(Some("dr-ada")))
        .await
        .unwrap();

    assert_eq!(meeting.id, "987654321");
    assert_eq!(meeting.join_url, "https://zoom.example/j/987654321");
    assert_eq!(meeting.password.as_deref(), Some("abc123"));
}

#[tokio::test]
async fn missing_host_id_uses_the_fallback_host_directly() {
    let server = MockServer::start().await;
    mount_token_endpoint(&server).await;

    Mock::given(method("POST"))
        .and(path("/v2/users/me/meetings"))
        .respond_with(meeting_response())
        .expect(1)
        .mount(&server)
        .await;

    let client = ZoomMeetingClient::new(&config(&server));
    let meeting = client.create_meeting(meeting_request(None)).await.unwrap();
    assert_eq!(meeting.id, "987654321");
}

#[tokio::test]
async fn unknown_host_retries_once_against_fallback() {
    let server = MockServer::start().await;
    mount_token_endpoint(&server).await;

    Mock::given(method("POST"))
        .and(path("/v2/users/ghost/meetings"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({
            "code": 1001,
            "message": "User does not exist: ghost"
        })))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/v2/users/me/meetings"))
        .respond_with(meeting_response())
        .expect(1)
        .mount(&server)
        .await;

    let client = ZoomMeetingClient::new(&config(&server));
    let meeting = client
        .create_meeting(meeting_request(Some("ghost")))
        .await
        .unwrap();
    assert_eq!(meeting.id, "987654321");
}

#[tokio::test]
async fn non_host_errors_are_not_retried() {
    let server = MockServer::start().await;
    mount_token_endpoint(&server).await;

    Mock::given(method("POST"))
        .and(path("/v2/users/dr-ada/meetings"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "code": 300,
            "message": "Invalid meeting time"
        })))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/v2/users/me/meetings"))
        .respond_with(meeting_response())
        .expect(0)
        .mount(&server)
        .await;

    let client = ZoomMeetingClient::new(&config(&server));
    let result = client.create_meeting(meeting_request(Some("dr-ada"))).await;

    assert_matches!(
        result,
        Err(MeetingError::ApiError { status: 400, ref message }) if message == "Invalid meeting time"
    );
}

#[tokio::test]
async fn token_failure_surfaces_as_token_error() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/oauth/token"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({
            "reason": "Invalid client credentials"
        })))
        .mount(&server)
        .await;

    let client = ZoomMeetingClient::new(&config(&server));
    let result = client.create_meeting(meeting_request(Some("dr-ada"))).await;

    assert_matches!(result, Err(MeetingError::TokenError(_)));
}

#[tokio::test]
async fn missing_credentials_fail_before_any_request() {
    let server = MockServer::start().await;

    let mut config = config(&server);
    config.zoom_account_id = String::new();

    let client = ZoomMeetingClient::new(&config);
    let result = client.create_meeting(meeting_request(Some("dr-ada"))).await;

    assert_matches!(result, Err(MeetingError::NotConfigured));
    assert!(server.received_requests().await.unwrap().is_empty());
}
