use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::routing::{get, post, put};
use axum::Json;
use axum::Router;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::engine::dispatch::list_open;
use crate::engine::lifecycle::{
    accept_ride, complete_ride, create_ride, current_ride_for_driver, current_ride_for_rider,
    verify_otp_and_start, CreateRideParams, RideReceipt,
};
use crate::error::AppError;
use crate::models::ride::{GeoPoint, Ride};
use crate::state::AppState;

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/rides", post(request_ride))
        .route("/rides/open", get(open_rides))
        .route("/rides/:id", get(get_ride))
        .route("/rides/:id/accept", put(accept))
        .route("/rides/:id/verify-otp", post(verify_otp))
        .route("/rides/:id/complete", put(complete))
        .route("/rides/rider/:rider_id/current", get(current_for_rider))
        .route("/rides/driver/:driver_id/current", get(current_for_driver))
}

#[derive(Deserialize)]
pub struct CreateRideRequest {
    pub rider_id: Uuid,
    pub rider_name: String,
    pub pickup_label: String,
    pub dropoff_label: String,
    pub pickup: GeoPoint,
    pub dropoff: GeoPoint,
    pub vehicle_class: String,
}

#[derive(Deserialize)]
pub struct AcceptRideRequest {
    pub driver_id: Uuid,
}

#[derive(Deserialize)]
pub struct VerifyOtpRequest {
    pub otp: String,
}

#[derive(Deserialize)]
pub struct OpenRidesQuery {
    pub vehicle_class: Option<String>,
    pub location: Option<String>,
}

/// What a polling driver sees per open request. The OTP never leaves the
/// rider-facing receipt.
#[derive(Serialize)]
pub struct OpenRideSummary {
    pub ride_id: Uuid,
    pub rider_name: String,
    pub pickup_label: String,
    pub dropoff_label: String,
    pub distance_km: f64,
    pub fare: f64,
    pub requested_at: DateTime<Utc>,
}

impl From<Ride> for OpenRideSummary {
    fn from(ride: Ride) -> Self {
        Self {
            ride_id: ride.id,
            rider_name: ride.rider_name,
            pickup_label: ride.pickup_label,
            dropoff_label: ride.dropoff_label,
            distance_km: ride.distance_km,
            fare: ride.fare,
            requested_at: ride.requested_at,
        }
    }
}

async fn request_ride(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<CreateRideRequest>,
) -> Result<Json<RideReceipt>, AppError> {
    if payload.rider_name.trim().is_empty() {
        return Err(AppError::BadRequest("rider_name cannot be empty".to_string()));
    }

    if payload.vehicle_class.trim().is_empty() {
        return Err(AppError::BadRequest(
            "vehicle_class cannot be empty".to_string(),
        ));
    }

    let receipt = create_ride(
        &state,
        CreateRideParams {
            rider_id: payload.rider_id,
            rider_name: payload.rider_name,
            pickup_label: payload.pickup_label,
            dropoff_label: payload.dropoff_label,
            pickup: payload.pickup,
            dropoff: payload.dropoff,
            vehicle_class: payload.vehicle_class,
        },
    )?;

    Ok(Json(receipt))
}

async fn open_rides(
    State(state): State<Arc<AppState>>,
    Query(query): Query<OpenRidesQuery>,
) -> Json<Vec<OpenRideSummary>> {
    let open = list_open(
        &state.ledger,
        query.vehicle_class.as_deref(),
        query.location.as_deref(),
    );

    Json(open.into_iter().map(OpenRideSummary::from).collect())
}

async fn get_ride(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<Json<Ride>, AppError> {
    let ride = state
        .ledger
        .get_ride(&id)
        .ok_or_else(|| AppError::NotFound(format!("ride {id} not found")))?;

    Ok(Json(ride))
}

async fn accept(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    Json(payload): Json<AcceptRideRequest>,
) -> Result<Json<Ride>, AppError> {
    let ride = accept_ride(&state, payload.driver_id, id)?;
    Ok(Json(ride))
}

async fn verify_otp(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    Json(payload): Json<VerifyOtpRequest>,
) -> Result<Json<Ride>, AppError> {
    let ride = verify_otp_and_start(&state, id, &payload.otp)?;
    Ok(Json(ride))
}

async fn complete(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<Json<Ride>, AppError> {
    let ride = complete_ride(&state, id)?;
    Ok(Json(ride))
}

async fn current_for_rider(
    State(state): State<Arc<AppState>>,
    Path(rider_id): Path<Uuid>,
) -> Json<Option<Ride>> {
    Json(current_ride_for_rider(&state, rider_id))
}

async fn current_for_driver(
    State(state): State<Arc<AppState>>,
    Path(driver_id): Path<Uuid>,
) -> Json<Option<Ride>> {
    Json(current_ride_for_driver(&state, driver_id))
}
