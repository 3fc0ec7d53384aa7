use serde::Serialize;
use uuid::Uuid;

/// Structured event emitted at each lifecycle transition boundary and fanned
/// out to WebSocket subscribers.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum RideEvent {
    Requested {
        ride_id: Uuid,
        vehicle_class: String,
        fare: f64,
    },
    Accepted {
        ride_id: Uuid,
        driver_id: Uuid,
    },
    Started {
        ride_id: Uuid,
    },
    Completed {
        ride_id: Uuid,
        driver_id: Option<Uuid>,
    },
    PaymentProcessed {
        ride_id: Uuid,
        payment_id: Uuid,
        amount: f64,
    },
}
