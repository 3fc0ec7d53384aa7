use crate::ledger::RideLedger;
use crate::models::ride::{Ride, RideStatus};

/// Live view over the ledger: rides still Requested with no driver bound.
/// A ride stays visible to every polling driver until the accept race
/// resolves it. Oldest-first is the fairness policy, ties broken by ride id.
pub fn list_open(
    ledger: &RideLedger,
    vehicle_class: Option<&str>,
    location: Option<&str>,
) -> Vec<Ride> {
    let mut open: Vec<Ride> = ledger
        .rides
        .iter()
        .filter_map(|entry| {
            let ride = entry.value();
            let matches = ride.status == RideStatus::Requested
                && ride.driver_id.is_none()
                && vehicle_class.is_none_or(|class| ride.vehicle_class == class)
                && location.is_none_or(|label| ride.pickup_label == label);

            if matches {
                Some(ride.clone())
            } else {
                None
            }
        })
        .collect();

    open.sort_by(|a, b| {
        a.requested_at
            .cmp(&b.requested_at)
            .then_with(|| a.id.cmp(&b.id))
    });
    open
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, Utc};
    use uuid::Uuid;

    use super::list_open;
    use crate::ledger::RideLedger;
    use crate::models::ride::{GeoPoint, Ride, RideStatus};

    fn ride(id_seed: u128, vehicle_class: &str, pickup_label: &str, age_secs: i64) -> Ride {
        Ride {
            id: Uuid::from_u128(id_seed),
            rider_id: Uuid::new_v4(),
            rider_name: "test-rider".to_string(),
            pickup_label: pickup_label.to_string(),
            dropoff_label: "Airport".to_string(),
            pickup: GeoPoint {
                lat: 12.97,
                lng: 77.59,
            },
            dropoff: GeoPoint {
                lat: 13.19,
                lng: 77.70,
            },
            vehicle_class: vehicle_class.to_string(),
            distance_km: 10.0,
            fare: 50.0,
            otp: "1234".to_string(),
            status: RideStatus::Requested,
            driver_id: None,
            requested_at: Utc::now() - Duration::seconds(age_secs),
            accepted_at: None,
            started_at: None,
            completed_at: None,
        }
    }

    #[test]
    fn lists_oldest_first() {
        let ledger = RideLedger::new();
        ledger.insert_ride(ride(1, "Bike", "MG Road", 10));
        ledger.insert_ride(ride(2, "Bike", "MG Road", 30));
        ledger.insert_ride(ride(3, "Bike", "MG Road", 20));

        let open = list_open(&ledger, None, None);
        let ids: Vec<u128> = open.iter().map(|r| r.id.as_u128()).collect();
        assert_eq!(ids, vec![2, 3, 1]);
    }

    #[test]
    fn assigned_and_non_requested_rides_are_hidden() {
        let ledger = RideLedger::new();
        let mut accepted = ride(1, "Bike", "MG Road", 10);
        accepted.status = RideStatus::Accepted;
        accepted.driver_id = Some(Uuid::new_v4());
        ledger.insert_ride(accepted);
        ledger.insert_ride(ride(2, "Bike", "MG Road", 5));

        let open = list_open(&ledger, None, None);
        assert_eq!(open.len(), 1);
        assert_eq!(open[0].id, Uuid::from_u128(2));
    }

    #[test]
    fn filters_by_vehicle_class_and_location() {
        let ledger = RideLedger::new();
        ledger.insert_ride(ride(1, "Bike", "MG Road", 10));
        ledger.insert_ride(ride(2, "Auto", "MG Road", 10));
        ledger.insert_ride(ride(3, "Bike", "Whitefield", 10));

        let bikes = list_open(&ledger, Some("Bike"), None);
        assert_eq!(bikes.len(), 2);

        let mg_road_bikes = list_open(&ledger, Some("Bike"), Some("MG Road"));
        assert_eq!(mg_road_bikes.len(), 1);
        assert_eq!(mg_road_bikes[0].id, Uuid::from_u128(1));
    }

    #[test]
    fn equal_request_times_break_ties_by_ride_id() {
        let ledger = RideLedger::new();
        let ts = Utc::now();
        let mut a = ride(9, "Bike", "MG Road", 0);
        a.requested_at = ts;
        let mut b = ride(4, "Bike", "MG Road", 0);
        b.requested_at = ts;
        ledger.insert_ride(a);
        ledger.insert_ride(b);

        let open = list_open(&ledger, None, None);
        assert_eq!(open[0].id, Uuid::from_u128(4));
        assert_eq!(open[1].id, Uuid::from_u128(9));
    }
}
