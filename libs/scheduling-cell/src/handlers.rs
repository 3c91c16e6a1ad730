// libs/scheduling-cell/src/handlers.rs
use axum::{
    extract::{Extension, Path, Query, State},
    Json,
};
use serde_json::{json, Value};
use tracing::debug;
use uuid::Uuid;

use shared_models::{AppError, User};

use crate::models::{
    Appointment, BookAppointmentRequest, CompleteAppointmentRequest, SchedulingError, SlotsQuery,
    SlotsResponse, UpsertTherapistProfileRequest,
};
use crate::services::{
    AppointmentLifecycleService, AvailabilityService, BookingCoordinator, SlotGenerator,
};
use crate::state::SchedulingState;

fn parse_user_id(user: &User) -> Result<Uuid, AppError> {
    Uuid::parse_str(&user.id)
        .map_err(|_| AppError::Auth("Invalid user id in token".to_string()))
}

fn map_scheduling_error(err: SchedulingError) -> AppError {
    match err {
        SchedulingError::NotFound
        | SchedulingError::TherapistNotFound
        | SchedulingError::ProfileNotFound => AppError::NotFound(err.to_string()),
        SchedulingError::Validation(message) => AppError::ValidationError(message),
        SchedulingError::Conflict => {
            AppError::Conflict("The requested time is no longer available".to_string())
        }
        SchedulingError::InvalidStatusTransition(_) => AppError::BadRequest(err.to_string()),
        SchedulingError::Forbidden => AppError::Forbidden(err.to_string()),
        SchedulingError::MeetingProvisioning(message) => AppError::ExternalService(message),
    }
}

fn can_view(appointment: &Appointment, user: &User, user_id: Uuid) -> bool {
    user.is_admin() || appointment.patient_id == user_id || appointment.therapist_id == user_id
}

// ==============================================================================
// THERAPIST DIRECTORY & AVAILABILITY
// ==============================================================================

/// GET /therapists - public directory of accepting therapists
pub async fn list_therapists(State(state): State<SchedulingState>) -> Result<Json<Value>, AppError> {
    let service = AvailabilityService::new(state.store.clone());
    let therapists = service.list_therapists().await;
    Ok(Json(json!({ "therapists": therapists })))
}

/// GET /availability - the calling therapist's own profile
pub async fn get_my_availability(
    State(state): State<SchedulingState>,
    Extension(user): Extension<User>,
) -> Result<Json<Value>, AppError> {
    if !user.is_therapist() && !user.is_admin() {
        return Err(AppError::Forbidden(
            "Only therapists can manage availability".to_string(),
        ));
    }
    let therapist_id = parse_user_id(&user)?;

    let service = AvailabilityService::new(state.store.clone());
    let profile = service
        .get_profile(therapist_id)
        .await
        .map_err(map_scheduling_error)?;

    Ok(Json(json!(profile)))
}

/// PUT /availability - publish or replace the calling therapist's profile
pub async fn upsert_my_availability(
    State(state): State<SchedulingState>,
    Extension(user): Extension<User>,
    Json(request): Json<UpsertTherapistProfileRequest>,
) -> Result<Json<Value>, AppError> {
    if !user.is_therapist() && !user.is_admin() {
        return Err(AppError::Forbidden(
            "Only therapists can manage availability".to_string(),
        ));
    }
    let therapist_id = parse_user_id(&user)?;

    let service = AvailabilityService::new(state.store.clone());
    let profile = service
        .upsert_profile(therapist_id, request)
        .await
        .map_err(map_scheduling_error)?;

    Ok(Json(json!({
        "success": true,
        "profile": profile
    })))
}

/// GET /availability/slots?therapist_id=&date= - free 30-minute slots
pub async fn get_free_slots(
    State(state): State<SchedulingState>,
    Query(query): Query<SlotsQuery>,
) -> Result<Json<SlotsResponse>, AppError> {
    debug!(therapist_id = %query.therapist_id, date = %query.date, "slot lookup");

    let generator = SlotGenerator::new(state.store.clone());
    let slots = generator
        .free_slots(query.therapist_id, query.date)
        .await
        .map_err(map_scheduling_error)?;

    Ok(Json(SlotsResponse { slots }))
}

// ==============================================================================
// APPOINTMENTS
// ==============================================================================

/// POST /appointments/book
pub async fn book_appointment(
    State(state): State<SchedulingState>,
    Extension(user): Extension<User>,
    Json(request): Json<BookAppointmentRequest>,
) -> Result<Json<Value>, AppError> {
    if !user.is_patient() && !user.is_admin() {
        return Err(AppError::Forbidden(
            "Only patients can book appointments".to_string(),
        ));
    }
    let patient_id = parse_user_id(&user)?;

    let coordinator = BookingCoordinator::new(
        state.store.clone(),
        state.provisioner.clone(),
        state.events.clone(),
    );
    let appointment = coordinator
        .book(patient_id, request)
        .await
        .map_err(map_scheduling_error)?;

    Ok(Json(json!({
        "success": true,
        "message": "Appointment booked successfully",
        "appointment": appointment
    })))
}

/// GET /appointments/mine - the calling user's appointments, newest first
pub async fn my_appointments(
    State(state): State<SchedulingState>,
    Extension(user): Extension<User>,
) -> Result<Json<Value>, AppError> {
    let user_id = parse_user_id(&user)?;

    let appointments = if user.is_therapist() {
        state.store.appointments_for_therapist(user_id).await
    } else {
        state.store.appointments_for_patient(user_id).await
    };

    Ok(Json(json!({ "appointments": appointments })))
}

/// GET /appointments/{appointment_id}
pub async fn get_appointment(
    State(state): State<SchedulingState>,
    Path(appointment_id): Path<Uuid>,
    Extension(user): Extension<User>,
) -> Result<Json<Value>, AppError> {
    let user_id = parse_user_id(&user)?;

    let appointment = state
        .store
        .get_appointment(appointment_id)
        .await
        .ok_or_else(|| AppError::NotFound("Appointment not found".to_string()))?;

    if !can_view(&appointment, &user, user_id) {
        return Err(AppError::Forbidden(
            "Not authorized for this appointment".to_string(),
        ));
    }

    Ok(Json(json!(appointment)))
}

/// PATCH /appointments/{appointment_id}/cancel
pub async fn cancel_appointment(
    State(state): State<SchedulingState>,
    Path(appointment_id): Path<Uuid>,
    Extension(user): Extension<User>,
) -> Result<Json<Value>, AppError> {
    let user_id = parse_user_id(&user)?;

    let appointment = state
        .store
        .get_appointment(appointment_id)
        .await
        .ok_or_else(|| AppError::NotFound("Appointment not found".to_string()))?;

    if !can_view(&appointment, &user, user_id) {
        return Err(AppError::Forbidden(
            "Not authorized for this appointment".to_string(),
        ));
    }

    let lifecycle = AppointmentLifecycleService::new(state.store.clone(), state.events.clone());
    let cancelled = lifecycle
        .cancel(appointment_id, user_id)
        .await
        .map_err(map_scheduling_error)?;

    Ok(Json(json!({
        "success": true,
        "message": "Appointment cancelled",
        "appointment": cancelled
    })))
}

/// PATCH /appointments/{appointment_id}/complete - therapist of record only
pub async fn complete_appointment(
    State(state): State<SchedulingState>,
    Path(appointment_id): Path<Uuid>,
    Extension(user): Extension<User>,
    Json(request): Json<CompleteAppointmentRequest>,
) -> Result<Json<Value>, AppError> {
    let user_id = parse_user_id(&user)?;

    let appointment = state
        .store
        .get_appointment(appointment_id)
        .await
        .ok_or_else(|| AppError::NotFound("Appointment not found".to_string()))?;

    if !user.is_admin() && appointment.therapist_id != user_id {
        return Err(AppError::Forbidden(
            "Only the session therapist can complete an appointment".to_string(),
        ));
    }

    let lifecycle = AppointmentLifecycleService::new(state.store.clone(), state.events.clone());
    let completed = lifecycle
        .complete(appointment_id, user_id, request)
        .await
        .map_err(map_scheduling_error)?;

    Ok(Json(json!({
        "success": true,
        "message": "Appointment completed",
        "appointment": completed
    })))
}
