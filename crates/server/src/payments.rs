//! Payment API endpoints

use api_types::{
    obligation::ObligationBalance,
    payment::{Payment, PaymentNew, PaymentReceipt},
};
use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use uuid::Uuid;

use crate::{Payload, ServerError, server::ServerState};

fn balance_view(balance: engine::ObligationBalance) -> ObligationBalance {
    ObligationBalance {
        amount_due: balance.amount_due.to_decimal_string(),
        amount_paid: balance.amount_paid.to_decimal_string(),
        amount_remaining: balance.amount_remaining.to_decimal_string(),
        status: balance.status.as_str().to_string(),
    }
}

fn payment_view(payment: engine::Payment) -> Payment {
    Payment {
        id: payment.id,
        member_id: payment.member_id,
        due_id: payment.due_id,
        paid_on: payment.paid_on,
        amount: payment.amount.to_decimal_string(),
        status: payment.status,
    }
}

/// Handle requests for recording a payment against an obligation
pub async fn payment_new(
    State(state): State<ServerState>,
    Payload(payload): Payload<PaymentNew>,
) -> Result<(StatusCode, Json<PaymentReceipt>), ServerError> {
    let cmd = engine::PaymentCmd::new(
        payload.member_id,
        payload.due_id,
        payload.date,
        payload.amount,
    );
    let receipt = state.engine.record_payment(cmd).await?;
    Ok((
        StatusCode::CREATED,
        Json(PaymentReceipt {
            payment: payment_view(receipt.payment),
            income_id: receipt.income_id,
            balance: balance_view(receipt.balance),
        }),
    ))
}

pub async fn list(State(state): State<ServerState>) -> Result<Json<Vec<Payment>>, ServerError> {
    let payments = state.engine.payments().await?;
    Ok(Json(payments.into_iter().map(payment_view).collect()))
}

pub async fn get(
    State(state): State<ServerState>,
    Path(payment_id): Path<Uuid>,
) -> Result<Json<Payment>, ServerError> {
    Ok(Json(payment_view(state.engine.payment(payment_id).await?)))
}

/// Handle payment deletion; returns the obligation balance afterwards
pub async fn delete(
    State(state): State<ServerState>,
    Path(payment_id): Path<Uuid>,
) -> Result<Json<ObligationBalance>, ServerError> {
    let balance = state.engine.delete_payment(payment_id).await?;
    Ok(Json(balance_view(balance)))
}

pub async fn obligation_status(
    State(state): State<ServerState>,
    Path((member_id, due_id)): Path<(Uuid, Uuid)>,
) -> Result<Json<ObligationBalance>, ServerError> {
    let balance = state.engine.obligation_status(member_id, due_id).await?;
    Ok(Json(balance_view(balance)))
}

pub async fn payments_of_obligation(
    State(state): State<ServerState>,
    Path((member_id, due_id)): Path<(Uuid, Uuid)>,
) -> Result<Json<Vec<Payment>>, ServerError> {
    let payments = state
        .engine
        .payments_of_obligation(member_id, due_id)
        .await?;
    Ok(Json(payments.into_iter().map(payment_view).collect()))
}
