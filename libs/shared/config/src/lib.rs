use std::env;
use tracing::warn;

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub jwt_secret: String,
    pub zoom_account_id: String,
    pub zoom_client_id: String,
    pub zoom_client_secret: String,
    pub zoom_fallback_host: String,
    pub zoom_api_base_url: String,
    pub zoom_oauth_token_url: String,
}

impl AppConfig {
    pub fn from_env() -> Self {
        let config = Self {
            jwt_secret: env::var("JWT_SECRET")
                .unwrap_or_else(|_| {
                    warn!("JWT_SECRET not set, using empty value");
                    String::new()
                }),
            zoom_account_id: env::var("ZOOM_ACCOUNT_ID")
                .unwrap_or_else(|_| {
                    warn!("ZOOM_ACCOUNT_ID not set, using empty value");
                    String::new()
                }),
            zoom_client_id: env::var("ZOOM_CLIENT_ID")
                .unwrap_or_else(|_| {
                    warn!("ZOOM_CLIENT_ID not set, using empty value");
                    String::new()
                }),
            zoom_client_secret: env::var("ZOOM_CLIENT_SECRET")
                .unwrap_or_else(|_| {
                    warn!("ZOOM_CLIENT_SECRET not set, using empty value");
                    String::new()
                }),
            zoom_fallback_host: env::var("ZOOM_FALLBACK_HOST_EMAIL")
                .unwrap_or_else(|_| "me".to_string()),
            zoom_api_base_url: env::var("ZOOM_API_BASE_URL")
                .unwrap_or_else(|_| "https://api.zoom.us/v2".to_string()),
            zoom_oauth_token_url: env::var("ZOOM_OAUTH_TOKEN_URL")
                .unwrap_or_else(|_| "https://zoom.us/oauth/token".to_string()),
        };

        if !config.is_configured() {
            warn!("Application not fully configured - missing environment variables");
        }

        config
    }

    pub fn is_configured(&self) -> bool {
        !self.jwt_secret.is_empty()
    }

    pub fn is_meeting_provisioning_configured(&self) -> bool {
        !self.zoom_account_id.is_empty()
            && !self.zoom_client_id.is_empty()
            && !self.zoom_client_secret.is_empty()
    }
}
