use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct GeoPoint {
    pub lat: f64,
    pub lng: f64,
}

impl GeoPoint {
    /// Latitude must be within [-90, 90], longitude within [-180, 180].
    pub fn is_valid(&self) -> bool {
        self.lat.is_finite()
            && self.lng.is_finite()
            && (-90.0..=90.0).contains(&self.lat)
            && (-180.0..=180.0).contains(&self.lng)
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum RideStatus {
    Requested,
    Accepted,
    InProgress,
    Completed,
    /// Terminal state reachable from Requested/Accepted. No transition in the
    /// engine produces it today; retained so stored rides can carry it.
    Cancelled,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Ride {
    pub id: Uuid,
    pub rider_id: Uuid,
    pub rider_name: String,
    pub pickup_label: String,
    pub dropoff_label: String,
    pub pickup: GeoPoint,
    pub dropoff: GeoPoint,
    pub vehicle_class: String,
    /// Fixed at creation, never recomputed.
    pub distance_km: f64,
    /// Fixed at creation, never recomputed.
    pub fare: f64,
    /// 4-digit passcode gating the Accepted -> InProgress transition.
    pub otp: String,
    pub status: RideStatus,
    pub driver_id: Option<Uuid>,
    pub requested_at: DateTime<Utc>,
    pub accepted_at: Option<DateTime<Utc>>,
    pub started_at: Option<DateTime<Utc>>,
    pub completed_at: Option<DateTime<Utc>>,
}

impl Ride {
    /// A ride still in flight from the rider's point of view.
    pub fn is_active_for_rider(&self) -> bool {
        matches!(
            self.status,
            RideStatus::Requested | RideStatus::Accepted | RideStatus::InProgress
        )
    }

    /// A ride still in flight from the assigned driver's point of view.
    pub fn is_active_for_driver(&self) -> bool {
        matches!(self.status, RideStatus::Accepted | RideStatus::InProgress)
    }
}
