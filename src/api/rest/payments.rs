use std::sync::Arc;

use axum::extract::State;
use axum::routing::post;
use axum::Json;
use axum::Router;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use uuid::Uuid;

use crate::engine::settlement::{generate_upi_qr, process_payment};
use crate::error::AppError;
use crate::models::payment::{Payment, PaymentMethod, PaymentStatus};
use crate::state::AppState;

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/payments/process", post(process))
        .route("/payments/qr", post(generate_qr))
}

#[derive(Deserialize)]
pub struct ProcessPaymentRequest {
    pub ride_id: Uuid,
    pub amount: f64,
    pub method: PaymentMethod,
    pub upi_id: Option<String>,
}

#[derive(Deserialize)]
pub struct QrRequest {
    pub ride_id: Uuid,
    pub amount: f64,
}

#[derive(Serialize)]
pub struct PaymentResponse {
    pub payment_id: Uuid,
    pub ride_id: Uuid,
    pub amount: f64,
    pub transaction_id: String,
    pub status: PaymentStatus,
}

impl From<Payment> for PaymentResponse {
    fn from(payment: Payment) -> Self {
        Self {
            payment_id: payment.id,
            ride_id: payment.ride_id,
            amount: payment.amount,
            transaction_id: payment.transaction_id,
            status: payment.status,
        }
    }
}

async fn process(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<ProcessPaymentRequest>,
) -> Result<Json<PaymentResponse>, AppError> {
    if payload.amount <= 0.0 || !payload.amount.is_finite() {
        return Err(AppError::BadRequest("amount must be positive".to_string()));
    }

    let payment = process_payment(
        &state,
        payload.ride_id,
        payload.amount,
        payload.method,
        payload.upi_id,
    )?;

    Ok(Json(PaymentResponse::from(payment)))
}

async fn generate_qr(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<QrRequest>,
) -> Result<Json<Value>, AppError> {
    let ride = state
        .ledger
        .get_ride(&payload.ride_id)
        .ok_or_else(|| AppError::NotFound(format!("ride {} not found", payload.ride_id)))?;

    let driver_name = ride
        .driver_id
        .and_then(|id| state.ledger.get_driver(&id))
        .map(|driver| driver.name)
        .unwrap_or_else(|| "Driver".to_string());

    let qr_code = generate_upi_qr(&driver_name, payload.amount);
    Ok(Json(json!({ "qr_code": qr_code })))
}
