// apps/api/src/main.rs
use std::sync::Arc;

use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use meeting_cell::ZoomMeetingClient;
use scheduling_cell::SchedulingState;
use shared_config::AppConfig;

mod router;

#[tokio::main]
async fn main() {
    dotenv::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "therapy_api=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Arc::new(AppConfig::from_env());
    if !config.is_meeting_provisioning_configured() {
        tracing::warn!("meeting provisioning credentials missing, bookings will fail upstream");
    }

    let provisioner = Arc::new(ZoomMeetingClient::new(&config));
    let state = SchedulingState::new(config, provisioner);

    let app = router::create_router(state);

    let listener = tokio::net::TcpListener::bind("0.0.0.0:3000")
        .await
        .expect("failed to bind to port 3000");

    info!("therapy api listening on {}", listener.local_addr().expect("listener has no address"));

    axum::serve(listener, app)
        .await
        .expect("server error");
}
