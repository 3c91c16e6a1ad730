// libs/scheduling-cell/src/router.rs
use axum::{
    middleware,
    routing::{get, patch, post},
    Router,
};

use shared_utils::auth_middleware;

use crate::handlers;
use crate::state::SchedulingState;

/// Scheduling routes. The therapist directory is public; everything else
/// requires a valid bearer token.
pub fn scheduling_routes(state: SchedulingState) -> Router {
    let public_routes = Router::new().route("/therapists", get(handlers::list_therapists));

    let protected_routes = Router::new()
        .route(
            "/availability",
            get(handlers::get_my_availability).put(handlers::upsert_my_availability),
        )
        .route("/availability/slots", get(handlers::get_free_slots))
        .route("/appointments/book", post(handlers::book_appointment))
        .route("/appointments/mine", get(handlers::my_appointments))
        .route("/appointments/{appointment_id}", get(handlers::get_appointment))
        .route(
            "/appointments/{appointment_id}/cancel",
            patch(handlers::cancel_appointment),
        )
        .route(
            "/appointments/{appointment_id}/complete",
            patch(handlers::complete_appointment),
        )
        .layer(middleware::from_fn_with_state(
            state.config.clone(),
            auth_middleware,
        ));

    Router::new()
        .merge(public_routes)
        .merge(protected_routes)
        .with_state(state)
}
