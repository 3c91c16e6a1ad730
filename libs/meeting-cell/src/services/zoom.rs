// libs/meeting-cell/src/services/zoom.rs
use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD, Engine};
use reqwest::Client;
use serde::Deserialize;
use serde_json::json;
use tracing::{debug, info, warn};

use shared_config::AppConfig;

use crate::models::{CreateMeetingRequest, Meeting, MeetingError, MeetingProvisioner};

/// Zoom API client using server-to-server OAuth.
/// Based on: https://developers.zoom.us/docs/internal-apps/s2s-oauth/
pub struct ZoomMeetingClient {
    client: Client,
    account_id: String,
    client_id: String,
    client_secret: String,
    fallback_host: String,
    api_base_url: String,
    oauth_token_url: String,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
}

#[derive(Debug, Deserialize)]
struct ZoomMeetingResponse {
    id: serde_json::Value,
    join_url: String,
    start_url: String,
    password: Option<String>,
}

impl ZoomMeetingClient {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            client: Client::new(),
            account_id: config.zoom_account_id.clone(),
            client_id: config.zoom_client_id.clone(),
            client_secret: config.zoom_client_secret.clone(),
            fallback_host: config.zoom_fallback_host.clone(),
            api_base_url: config.zoom_api_base_url.clone(),
            oauth_token_url: config.zoom_oauth_token_url.clone(),
        }
    }

    fn is_configured(&self) -> bool {
        !self.account_id.is_empty() && !self.client_id.is_empty() && !self.client_secret.is_empty()
    }

    async fn fetch_access_token(&self) -> Result<String, MeetingError> {
        let url = format!(
            "{}?grant_type=account_credentials&account_id={}",
            self.oauth_token_url,
            urlencoding::encode(&self.account_id)
        );
        let basic = STANDARD.encode(format!("{}:{}", self.client_id, self.client_secret));

        debug!("Fetching Zoom access token");

        let response = self
            .client
            .post(&url)
            .header("Authorization", format!("Basic {}", basic))
            .header("Content-Type", "application/x-www-form-urlencoded")
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            return Err(MeetingError::TokenError(format!(
                "HTTP {}: {}",
                status, body
            )));
        }

        let token: TokenResponse = serde_json::from_str(&body)
            .map_err(|e| MeetingError::TokenError(format!("non-JSON token response: {}", e)))?;

        Ok(token.access_token)
    }

    async fn create_for_host(
        &self,
        access_token: &str,
        host: &str,
        request: &CreateMeetingRequest,
    ) -> Result<Meeting, MeetingError> {
        let url = format!("{}/users/{}/meetings", self.api_base_url, urlencoding::encode(host));

        // type 2 = scheduled meeting
        let body = json!({
            "topic": request.topic,
            "type": 2,
            "start_time": request.start_time.to_rfc3339(),
            "duration": request.duration_minutes,
            "timezone": request.timezone,
            "settings": {
                "host_video": true,
                "participant_video": true,
                "join_before_host": false,
                "mute_upon_entry": true,
                "waiting_room": true,
                "approval_type": 2
            }
        });

        debug!("Creating Zoom meeting for host {}", host);

        let response = self
            .client
            .post(&url)
            .header("Authorization", format!("Bearer {}", access_token))
            .header("Content-Type", "application/json")
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        let text = response.text().await?;

        if !status.is_success() {
            let message = serde_json::from_str::<serde_json::Value>(&text)
                .ok()
                .and_then(|v| v["message"].as_str().map(String::from))
                .unwrap_or_else(|| text.clone());
            return Err(MeetingError::ApiError {
                status: status.as_u16(),
                message,
            });
        }

        let meeting: ZoomMeetingResponse = serde_json::from_str(&text)
            .map_err(|e| MeetingError::InvalidResponse(e.to_string()))?;

        // Zoom returns numeric meeting ids
        let id = match &meeting.id {
            serde_json::Value::Number(n) => n.to_string(),
            serde_json::Value::String(s) => s.clone(),
            other => {
                return Err(MeetingError::InvalidResponse(format!(
                    "unexpected meeting id: {}",
                    other
                )))
            }
        };

        Ok(Meeting {
            id,
            join_url: meeting.join_url,
            start_url: meeting.start_url,
            password: meeting.password,
        })
    }

    fn is_unknown_host_error(error: &MeetingError) -> bool {
        match error {
            MeetingError::ApiError { message, .. } => {
                let msg = message.to_lowercase();
                msg.contains("user does not exist") || msg.contains("not found")
            }
            _ => false,
        }
    }
}

#[async_trait]
impl MeetingProvisioner for ZoomMeetingClient {
    /// Create a scheduled meeting for the requested host. If the host is not
    /// a known user in the upstream account, retry once against the
    /// account-level fallback host before surfacing the failure.
    async fn create_meeting(&self, request: CreateMeetingRequest) -> Result<Meeting, MeetingError> {
        if !self.is_configured() {
            return Err(MeetingError::NotConfigured);
        }

        let access_token = self.fetch_access_token().await?;

        let host = request
            .host_id
            .clone()
            .unwrap_or_else(|| self.fallback_host.clone());

        match self.create_for_host(&access_token, &host, &request).await {
            Ok(meeting) => {
                info!("Zoom meeting {} created for host {}", meeting.id, host);
                Ok(meeting)
            }
            Err(err) if Self::is_unknown_host_error(&err) && host != self.fallback_host => {
                warn!(
                    "Zoom host {} unknown upstream, retrying with fallback host {}",
                    host, self.fallback_host
                );
                let meeting = self
                    .create_for_host(&access_token, &self.fallback_host, &request)
                    .await?;
                info!(
                    "Zoom meeting {} created via fallback host {}",
                    meeting.id, self.fallback_host
                );
                Ok(meeting)
            }
            Err(err) => Err(err),
        }
    }
}
