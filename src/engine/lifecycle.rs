use chrono::Utc;
use rand::Rng;
use serde::Serialize;
use tracing::{info, warn};
use uuid::Uuid;

use crate::engine::fare::estimate_fare;
use crate::error::AppError;
use crate::geo::haversine_km;
use crate::models::driver::DriverStatus;
use crate::models::event::RideEvent;
use crate::models::ride::{GeoPoint, Ride, RideStatus};
use crate::state::AppState;

pub struct CreateRideParams {
    pub rider_id: Uuid,
    pub rider_name: String,
    pub pickup_label: String,
    pub dropoff_label: String,
    pub pickup: GeoPoint,
    pub dropoff: GeoPoint,
    pub vehicle_class: String,
}

/// What the rider gets back on creation. The OTP is handed to the rider and
/// later relayed to the driver in person.
#[derive(Debug, Clone, Serialize)]
pub struct RideReceipt {
    pub ride_id: Uuid,
    pub otp: String,
    pub fare: f64,
    pub distance_km: f64,
}

/// Uniformly random 4-digit passcode. Scoped per ride; collisions across
/// rides are permitted.
fn generate_otp() -> String {
    format!("{:04}", rand::thread_rng().gen_range(0..10_000))
}

pub fn create_ride(state: &AppState, params: CreateRideParams) -> Result<RideReceipt, AppError> {
    if !params.pickup.is_valid() || !params.dropoff.is_valid() {
        return Err(AppError::BadRequest(
            "pickup/dropoff coordinates out of range".to_string(),
        ));
    }

    let distance_km = haversine_km(&params.pickup, &params.dropoff);
    let fare = estimate_fare(distance_km, &params.vehicle_class);

    let ride = Ride {
        id: Uuid::new_v4(),
        rider_id: params.rider_id,
        rider_name: params.rider_name,
        pickup_label: params.pickup_label,
        dropoff_label: params.dropoff_label,
        pickup: params.pickup,
        dropoff: params.dropoff,
        vehicle_class: params.vehicle_class,
        distance_km,
        fare,
        otp: generate_otp(),
        status: RideStatus::Requested,
        driver_id: None,
        requested_at: Utc::now(),
        accepted_at: None,
        started_at: None,
        completed_at: None,
    };

    let receipt = RideReceipt {
        ride_id: ride.id,
        otp: ride.otp.clone(),
        fare: ride.fare,
        distance_km: ride.distance_km,
    };

    info!(
        ride_id = %ride.id,
        rider_id = %ride.rider_id,
        vehicle_class = %ride.vehicle_class,
        distance_km = ride.distance_km,
        fare = ride.fare,
        "ride requested"
    );

    let event = RideEvent::Requested {
        ride_id: ride.id,
        vehicle_class: ride.vehicle_class.clone(),
        fare: ride.fare,
    };
    state.ledger.insert_ride(ride);

    state.metrics.rides_requested_total.inc();
    state.metrics.open_requests.inc();
    state.emit(event);

    Ok(receipt)
}

/// Race-resolved accept. The conditional update in the ledger guarantees that
/// of N concurrent attempts on one ride exactly one returns Ok; the losers
/// observe Conflict with nothing mutated.
pub fn accept_ride(state: &AppState, driver_id: Uuid, ride_id: Uuid) -> Result<Ride, AppError> {
    let now = Utc::now();
    let ride = match state.ledger.try_assign(ride_id, driver_id, now) {
        Ok(ride) => ride,
        Err(err) => {
            let outcome = match &err {
                AppError::Conflict(_) => "conflict",
                AppError::NotFound(_) => "not_found",
                _ => "error",
            };
            state
                .metrics
                .accept_attempts_total
                .with_label_values(&[outcome])
                .inc();
            warn!(ride_id = %ride_id, driver_id = %driver_id, error = %err, "accept rejected");
            return Err(err);
        }
    };

    // Driver status flip happens after the ride commit, never under the ride
    // entry lock. Identity is trusted as given; a driver without a stored
    // record still wins the ride.
    if state
        .ledger
        .set_driver_status(&driver_id, DriverStatus::Riding, now)
        .is_err()
    {
        warn!(driver_id = %driver_id, "accepting driver has no stored record");
    }

    state
        .metrics
        .accept_attempts_total
        .with_label_values(&["won"])
        .inc();
    state.metrics.open_requests.dec();
    state
        .metrics
        .ride_transitions_total
        .with_label_values(&["accepted"])
        .inc();

    info!(ride_id = %ride_id, driver_id = %driver_id, "ride accepted");
    state.emit(RideEvent::Accepted { ride_id, driver_id });

    Ok(ride)
}

pub fn verify_otp_and_start(
    state: &AppState,
    ride_id: Uuid,
    submitted_otp: &str,
) -> Result<Ride, AppError> {
    let ride = state.ledger.try_start(ride_id, submitted_otp, Utc::now())?;

    state
        .metrics
        .ride_transitions_total
        .with_label_values(&["started"])
        .inc();

    info!(ride_id = %ride_id, "ride started");
    state.emit(RideEvent::Started { ride_id });

    Ok(ride)
}

pub fn complete_ride(state: &AppState, ride_id: Uuid) -> Result<Ride, AppError> {
    let ride = state.ledger.try_complete(ride_id, Utc::now())?;

    state
        .metrics
        .ride_transitions_total
        .with_label_values(&["completed"])
        .inc();

    info!(ride_id = %ride_id, driver_id = ?ride.driver_id, "ride completed");
    state.emit(RideEvent::Completed {
        ride_id,
        driver_id: ride.driver_id,
    });

    Ok(ride)
}

/// The rider's in-flight ride, if any. Should several exist (an inconsistency
/// the engine tolerates), the most recently requested one is authoritative.
pub fn current_ride_for_rider(state: &AppState, rider_id: Uuid) -> Option<Ride> {
    state
        .ledger
        .rides
        .iter()
        .filter(|entry| {
            let ride = entry.value();
            ride.rider_id == rider_id && ride.is_active_for_rider()
        })
        .max_by(|a, b| {
            a.value()
                .requested_at
                .cmp(&b.value().requested_at)
                .then_with(|| a.value().id.cmp(&b.value().id))
        })
        .map(|entry| entry.value().clone())
}

/// The driver's in-flight ride, if any. Same most-recent-wins policy.
pub fn current_ride_for_driver(state: &AppState, driver_id: Uuid) -> Option<Ride> {
    state
        .ledger
        .rides
        .iter()
        .filter(|entry| {
            let ride = entry.value();
            ride.driver_id == Some(driver_id) && ride.is_active_for_driver()
        })
        .max_by(|a, b| {
            a.value()
                .requested_at
                .cmp(&b.value().requested_at)
                .then_with(|| a.value().id.cmp(&b.value().id))
        })
        .map(|entry| entry.value().clone())
}
