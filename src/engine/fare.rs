/// Applied when the requested vehicle class has no configured rate. A
/// permissive policy: unknown classes still get a fare, they are never
/// rejected at estimation time.
const DEFAULT_RATE_PER_KM: f64 = 10.0;

pub fn rate_per_km(vehicle_class: &str) -> f64 {
    match vehicle_class {
        "Bike" => 5.0,
        "Scooty" => 6.0,
        "Auto" => 8.0,
        "Cab XL" => 12.0,
        "Cab Premium" => 15.0,
        _ => DEFAULT_RATE_PER_KM,
    }
}

/// Distance times per-km rate, rounded to 2 decimal places. Pure; the result
/// is fixed onto the ride at creation and never recomputed.
pub fn estimate_fare(distance_km: f64, vehicle_class: &str) -> f64 {
    round2(distance_km * rate_per_km(vehicle_class))
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::{estimate_fare, rate_per_km};

    #[test]
    fn bike_over_ten_km_costs_fifty() {
        assert_eq!(estimate_fare(10.0, "Bike"), 50.0);
    }

    #[test]
    fn fare_is_deterministic() {
        let first = estimate_fare(7.345, "Auto");
        let second = estimate_fare(7.345, "Auto");
        assert_eq!(first, second);
    }

    #[test]
    fn fare_is_rounded_to_two_decimals() {
        // 3.333 km * 6 = 19.998 -> 20.00
        assert_eq!(estimate_fare(3.333, "Scooty"), 20.0);
        // 1.234 km * 8 = 9.872 -> 9.87
        assert_eq!(estimate_fare(1.234, "Auto"), 9.87);
    }

    #[test]
    fn unknown_vehicle_class_falls_back_to_default_rate() {
        assert_eq!(rate_per_km("Rickshaw"), 10.0);
        assert_eq!(estimate_fare(2.0, "Rickshaw"), 20.0);
    }

    #[test]
    fn rate_table_matches_configured_classes() {
        assert_eq!(rate_per_km("Bike"), 5.0);
        assert_eq!(rate_per_km("Scooty"), 6.0);
        assert_eq!(rate_per_km("Auto"), 8.0);
        assert_eq!(rate_per_km("Cab XL"), 12.0);
        assert_eq!(rate_per_km("Cab Premium"), 15.0);
    }
}
