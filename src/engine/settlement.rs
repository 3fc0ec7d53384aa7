use chrono::Utc;
use tracing::info;
use uuid::Uuid;

use crate::error::AppError;
use crate::models::event::RideEvent;
use crate::models::payment::{Earning, EarningStatus, Payment, PaymentMethod, PaymentStatus};
use crate::state::AppState;

/// Short hex transaction identifier, unique enough for receipts.
fn new_transaction_id() -> String {
    let mut id = Uuid::new_v4().simple().to_string();
    id.truncate(10);
    id
}

/// Record a payment for a ride, exactly once. A replayed call (client retry,
/// double submit) returns the stored payment unchanged. An earning record is
/// created for the assigned driver, also exactly once; a ride with no driver
/// still gets its payment recorded and simply produces no earning.
pub fn process_payment(
    state: &AppState,
    ride_id: Uuid,
    amount: f64,
    method: PaymentMethod,
    upi_id: Option<String>,
) -> Result<Payment, AppError> {
    let ride = state
        .ledger
        .get_ride(&ride_id)
        .ok_or_else(|| AppError::NotFound(format!("ride {ride_id} not found")))?;

    let candidate = Payment {
        id: Uuid::new_v4(),
        ride_id,
        amount,
        method,
        status: PaymentStatus::Completed,
        transaction_id: new_transaction_id(),
        upi_id,
        created_at: Utc::now(),
    };

    let (payment, created) = state.ledger.record_payment(candidate);
    if !created {
        info!(ride_id = %ride_id, payment_id = %payment.id, "payment already settled, replaying");
        state
            .metrics
            .payments_total
            .with_label_values(&["replayed"])
            .inc();
        return Ok(payment);
    }

    if let Some(driver_id) = ride.driver_id {
        let (earning, earning_created) = state.ledger.record_earning(Earning {
            id: Uuid::new_v4(),
            driver_id,
            ride_id,
            fare: amount,
            payment_method: method.label().to_string(),
            status: EarningStatus::Received,
            date: Utc::now(),
        });
        if earning_created {
            info!(
                ride_id = %ride_id,
                driver_id = %driver_id,
                earning_id = %earning.id,
                fare = earning.fare,
                "earning recorded"
            );
        }
    } else {
        info!(ride_id = %ride_id, "no driver assigned, payment recorded without earning");
    }

    state
        .metrics
        .payments_total
        .with_label_values(&["created"])
        .inc();

    info!(
        ride_id = %ride_id,
        payment_id = %payment.id,
        transaction_id = %payment.transaction_id,
        amount = payment.amount,
        "payment processed"
    );
    state.emit(RideEvent::PaymentProcessed {
        ride_id,
        payment_id: payment.id,
        amount: payment.amount,
    });

    Ok(payment)
}

/// UPI deep-link for a driver-name/amount pair. Pure formatting, not
/// security-sensitive.
pub fn generate_upi_qr(driver_name: &str, amount: f64) -> String {
    let upi_id = format!(
        "pay.{}@okhdfcbank",
        driver_name.to_lowercase().replace(' ', "")
    );
    format!("upi://pay?pa={upi_id}&pn={driver_name}&am={amount}&cu=INR")
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use uuid::Uuid;

    use super::{generate_upi_qr, process_payment};
    use crate::engine::lifecycle::{accept_ride, create_ride, CreateRideParams};
    use crate::error::AppError;
    use crate::models::payment::{EarningStatus, PaymentMethod, PaymentStatus};
    use crate::models::ride::GeoPoint;
    use crate::state::AppState;

    fn requested_ride(state: &AppState) -> Uuid {
        let receipt = create_ride(
            state,
            CreateRideParams {
                rider_id: Uuid::new_v4(),
                rider_name: "Asha".to_string(),
                pickup_label: "MG Road".to_string(),
                dropoff_label: "Airport".to_string(),
                pickup: GeoPoint {
                    lat: 12.9716,
                    lng: 77.5946,
                },
                dropoff: GeoPoint {
                    lat: 13.1986,
                    lng: 77.7066,
                },
                vehicle_class: "Bike".to_string(),
            },
        )
        .unwrap();
        receipt.ride_id
    }

    #[test]
    fn payment_is_idempotent_and_creates_one_earning() {
        let state = AppState::new(16);
        let ride_id = requested_ride(&state);
        let driver_id = Uuid::from_u128(77);
        accept_ride(&state, driver_id, ride_id).unwrap();

        let first = process_payment(&state, ride_id, 50.0, PaymentMethod::Cash, None).unwrap();
        let second = process_payment(&state, ride_id, 50.0, PaymentMethod::Cash, None).unwrap();

        assert_eq!(first.id, second.id);
        assert_eq!(first.transaction_id, second.transaction_id);
        assert_eq!(first.status, PaymentStatus::Completed);
        assert_eq!(state.ledger.payment_count(), 1);

        let earning = state.ledger.earning_for_ride(&ride_id).unwrap();
        assert_eq!(earning.driver_id, driver_id);
        assert_eq!(earning.fare, 50.0);
        assert_eq!(earning.status, EarningStatus::Received);
        assert_eq!(state.ledger.earnings_for_driver(&driver_id).len(), 1);
    }

    #[test]
    fn concurrent_duplicate_payments_settle_once() {
        let state = Arc::new(AppState::new(16));
        let ride_id = requested_ride(&state);
        accept_ride(&state, Uuid::from_u128(5), ride_id).unwrap();

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let state = state.clone();
                std::thread::spawn(move || {
                    process_payment(&state, ride_id, 50.0, PaymentMethod::UpiId, None).unwrap()
                })
            })
            .collect();

        let payments: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();
        let first_id = payments[0].id;
        assert!(payments.iter().all(|p| p.id == first_id));
        assert_eq!(state.ledger.payment_count(), 1);
        assert_eq!(
            state.ledger.earnings_for_driver(&Uuid::from_u128(5)).len(),
            1
        );
    }

    #[test]
    fn payment_without_driver_records_no_earning() {
        let state = AppState::new(16);
        let ride_id = requested_ride(&state);

        let payment = process_payment(&state, ride_id, 42.5, PaymentMethod::QrCode, None).unwrap();
        assert_eq!(payment.amount, 42.5);
        assert!(state.ledger.earning_for_ride(&ride_id).is_none());
    }

    #[test]
    fn payment_for_unknown_ride_is_not_found() {
        let state = AppState::new(16);
        let missing = process_payment(&state, Uuid::new_v4(), 10.0, PaymentMethod::Cash, None);
        assert!(matches!(missing, Err(AppError::NotFound(_))));
    }

    #[test]
    fn upi_qr_encodes_normalized_payee() {
        let qr = generate_upi_qr("Ravi Kumar", 50.0);
        assert_eq!(
            qr,
            "upi://pay?pa=pay.ravikumar@okhdfcbank&pn=Ravi Kumar&am=50&cu=INR"
        );
    }
}
