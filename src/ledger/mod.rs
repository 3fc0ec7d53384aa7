use chrono::{DateTime, Utc};
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use uuid::Uuid;

use crate::error::AppError;
use crate::models::driver::{Driver, DriverStatus};
use crate::models::payment::{Earning, Payment};
use crate::models::ride::{Ride, RideStatus};

/// Persisted store of rides, drivers, payments and earnings.
///
/// Every mutation of shared state goes through a conditional update evaluated
/// under the per-key entry lock, or a check-then-insert via the `entry` API.
/// Callers never cache ride or driver state across calls.
pub struct RideLedger {
    pub rides: DashMap<Uuid, Ride>,
    pub drivers: DashMap<Uuid, Driver>,
    /// Keyed by ride id: at most one payment per ride, ever.
    payments: DashMap<Uuid, Payment>,
    /// Keyed by ride id: at most one earning per ride, ever.
    earnings: DashMap<Uuid, Earning>,
}

impl RideLedger {
    pub fn new() -> Self {
        Self {
            rides: DashMap::new(),
            drivers: DashMap::new(),
            payments: DashMap::new(),
            earnings: DashMap::new(),
        }
    }

    pub fn insert_ride(&self, ride: Ride) {
        self.rides.insert(ride.id, ride);
    }

    pub fn get_ride(&self, id: &Uuid) -> Option<Ride> {
        self.rides.get(id).map(|entry| entry.value().clone())
    }

    pub fn insert_driver(&self, driver: Driver) {
        self.drivers.insert(driver.id, driver);
    }

    pub fn get_driver(&self, id: &Uuid) -> Option<Driver> {
        self.drivers.get(id).map(|entry| entry.value().clone())
    }

    pub fn set_driver_status(
        &self,
        driver_id: &Uuid,
        status: DriverStatus,
        now: DateTime<Utc>,
    ) -> Result<Driver, AppError> {
        let mut driver = self
            .drivers
            .get_mut(driver_id)
            .ok_or_else(|| AppError::NotFound(format!("driver {driver_id} not found")))?;

        driver.status = status;
        driver.updated_at = now;
        Ok(driver.clone())
    }

    /// Atomic accept: bind the driver and move to Accepted, only if the ride
    /// is still Requested with no driver bound. Evaluated and committed under
    /// the entry lock, so exactly one of N concurrent attempts succeeds.
    pub fn try_assign(
        &self,
        ride_id: Uuid,
        driver_id: Uuid,
        now: DateTime<Utc>,
    ) -> Result<Ride, AppError> {
        let mut ride = self
            .rides
            .get_mut(&ride_id)
            .ok_or_else(|| AppError::NotFound(format!("ride {ride_id} not found")))?;

        if ride.status != RideStatus::Requested || ride.driver_id.is_some() {
            return Err(AppError::Conflict(format!("ride {ride_id} not available")));
        }

        ride.driver_id = Some(driver_id);
        ride.status = RideStatus::Accepted;
        ride.accepted_at = Some(now);
        Ok(ride.clone())
    }

    /// OTP-gated start. The comparison is byte-exact: no trimming, no
    /// case-folding. A missing ride reports the same invalid-OTP outcome as a
    /// mismatch, so callers cannot probe for ride existence.
    pub fn try_start(
        &self,
        ride_id: Uuid,
        submitted_otp: &str,
        now: DateTime<Utc>,
    ) -> Result<Ride, AppError> {
        let mut ride = self
            .rides
            .get_mut(&ride_id)
            .ok_or_else(|| AppError::BadRequest("invalid OTP".to_string()))?;

        if ride.otp != submitted_otp {
            return Err(AppError::BadRequest("invalid OTP".to_string()));
        }

        if ride.status != RideStatus::Accepted {
            return Err(AppError::Conflict(format!(
                "ride {ride_id} cannot start from status {:?}",
                ride.status
            )));
        }

        ride.status = RideStatus::InProgress;
        ride.started_at = Some(now);
        Ok(ride.clone())
    }

    /// Completion is allowed from InProgress or directly from Accepted; in
    /// the latter case the start time is backfilled to the completion moment.
    pub fn try_complete(&self, ride_id: Uuid, now: DateTime<Utc>) -> Result<Ride, AppError> {
        let mut ride = self
            .rides
            .get_mut(&ride_id)
            .ok_or_else(|| AppError::NotFound(format!("ride {ride_id} not found")))?;

        if !matches!(ride.status, RideStatus::Accepted | RideStatus::InProgress) {
            return Err(AppError::Conflict(format!(
                "ride {ride_id} cannot be completed from status {:?}",
                ride.status
            )));
        }

        if ride.started_at.is_none() {
            ride.started_at = Some(now);
        }
        ride.status = RideStatus::Completed;
        ride.completed_at = Some(now);
        Ok(ride.clone())
    }

    /// Check-then-insert as one unit: if a payment already exists for the
    /// ride it is returned unchanged and nothing is written. Returns the
    /// stored record and whether this call created it.
    pub fn record_payment(&self, payment: Payment) -> (Payment, bool) {
        match self.payments.entry(payment.ride_id) {
            Entry::Occupied(existing) => (existing.get().clone(), false),
            Entry::Vacant(slot) => {
                let stored = slot.insert(payment);
                (stored.value().clone(), true)
            }
        }
    }

    /// Same discipline as `record_payment`, keyed by ride id.
    pub fn record_earning(&self, earning: Earning) -> (Earning, bool) {
        match self.earnings.entry(earning.ride_id) {
            Entry::Occupied(existing) => (existing.get().clone(), false),
            Entry::Vacant(slot) => {
                let stored = slot.insert(earning);
                (stored.value().clone(), true)
            }
        }
    }

    pub fn payment_for_ride(&self, ride_id: &Uuid) -> Option<Payment> {
        self.payments.get(ride_id).map(|entry| entry.value().clone())
    }

    pub fn earning_for_ride(&self, ride_id: &Uuid) -> Option<Earning> {
        self.earnings.get(ride_id).map(|entry| entry.value().clone())
    }

    pub fn earnings_for_driver(&self, driver_id: &Uuid) -> Vec<Earning> {
        self.earnings
            .iter()
            .filter(|entry| entry.value().driver_id == *driver_id)
            .map(|entry| entry.value().clone())
            .collect()
    }

    pub fn ride_count(&self) -> usize {
        self.rides.len()
    }

    pub fn driver_count(&self) -> usize {
        self.drivers.len()
    }

    pub fn payment_count(&self) -> usize {
        self.payments.len()
    }
}

impl Default for RideLedger {
    fn default() -> Self {
        Self::new()
    }
}
