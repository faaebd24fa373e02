//! Income, expense and funds API endpoints

use api_types::{
    expense::{Expense, ExpenseNew, ExpenseUpdate},
    funds::{Funds, Recompute},
    income::{Income, IncomeNew, IncomeUpdate},
};
use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use engine::LedgerTotals;
use uuid::Uuid;

use crate::{Payload, ServerError, server::ServerState};

fn income_view(entry: engine::IncomeEntry) -> Income {
    Income {
        id: entry.id,
        received_on: entry.received_on,
        amount: entry.amount.to_decimal_string(),
        source: entry.source,
        notes: entry.notes,
        payment_id: entry.payment_id,
    }
}

fn expense_view(entry: engine::ExpenseEntry) -> Expense {
    Expense {
        id: entry.id,
        spent_on: entry.spent_on,
        amount: entry.amount.to_decimal_string(),
        description: entry.description,
    }
}

fn funds_view(totals: LedgerTotals) -> Funds {
    Funds {
        total_income: totals.total_income.to_decimal_string(),
        total_expense: totals.total_expense.to_decimal_string(),
        available: totals.available().to_decimal_string(),
    }
}

pub async fn income_new(
    State(state): State<ServerState>,
    Payload(payload): Payload<IncomeNew>,
) -> Result<(StatusCode, Json<Income>), ServerError> {
    let cmd = engine::IncomeCmd {
        received_on: payload.date,
        amount: payload.amount,
        source: payload.source,
        notes: payload.notes,
    };
    let entry = state.engine.record_income(cmd).await?;
    Ok((StatusCode::CREATED, Json(income_view(entry))))
}

pub async fn incomes(State(state): State<ServerState>) -> Result<Json<Vec<Income>>, ServerError> {
    let entries = state.engine.incomes().await?;
    Ok(Json(entries.into_iter().map(income_view).collect()))
}

pub async fn income(
    State(state): State<ServerState>,
    Path(income_id): Path<Uuid>,
) -> Result<Json<Income>, ServerError> {
    Ok(Json(income_view(state.engine.income(income_id).await?)))
}

/// Handle edits of manual income; payment income is rejected
pub async fn update_income(
    State(state): State<ServerState>,
    Path(income_id): Path<Uuid>,
    Payload(payload): Payload<IncomeUpdate>,
) -> Result<Json<Income>, ServerError> {
    let cmd = engine::IncomeUpdate {
        received_on: payload.date,
        amount: payload.amount,
        source: payload.source,
        notes: payload.notes,
    };
    let entry = state.engine.update_income(income_id, cmd).await?;
    Ok(Json(income_view(entry)))
}

pub async fn delete_income(
    State(state): State<ServerState>,
    Path(income_id): Path<Uuid>,
) -> Result<StatusCode, ServerError> {
    state.engine.delete_income(income_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Handle requests for recording an expense; rejected when funds fall short
pub async fn expense_new(
    State(state): State<ServerState>,
    Payload(payload): Payload<ExpenseNew>,
) -> Result<(StatusCode, Json<Expense>), ServerError> {
    let cmd = engine::ExpenseCmd {
        spent_on: payload.date,
        amount: payload.amount,
        description: payload.description,
    };
    let entry = state.engine.record_expense(cmd).await?;
    Ok((StatusCode::CREATED, Json(expense_view(entry))))
}

pub async fn expenses(
    State(state): State<ServerState>,
) -> Result<Json<Vec<Expense>>, ServerError> {
    let entries = state.engine.expenses().await?;
    Ok(Json(entries.into_iter().map(expense_view).collect()))
}

pub async fn expense(
    State(state): State<ServerState>,
    Path(expense_id): Path<Uuid>,
) -> Result<Json<Expense>, ServerError> {
    Ok(Json(expense_view(state.engine.expense(expense_id).await?)))
}

pub async fn update_expense(
    State(state): State<ServerState>,
    Path(expense_id): Path<Uuid>,
    Payload(payload): Payload<ExpenseUpdate>,
) -> Result<Json<Expense>, ServerError> {
    let cmd = engine::ExpenseUpdate {
        spent_on: payload.date,
        amount: payload.amount,
        description: payload.description,
    };
    let entry = state.engine.update_expense(expense_id, cmd).await?;
    Ok(Json(expense_view(entry)))
}

pub async fn delete_expense(
    State(state): State<ServerState>,
    Path(expense_id): Path<Uuid>,
) -> Result<StatusCode, ServerError> {
    state.engine.delete_expense(expense_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn funds(State(state): State<ServerState>) -> Result<Json<Funds>, ServerError> {
    Ok(Json(funds_view(state.engine.totals().await?)))
}

/// Rebuild the ledger aggregate and obligation statuses from the entry tables
pub async fn recompute(State(state): State<ServerState>) -> Result<Json<Recompute>, ServerError> {
    let outcome = state.engine.recompute_ledger().await?;
    Ok(Json(Recompute {
        funds: funds_view(outcome.totals),
        statuses_corrected: outcome.statuses_corrected,
    }))
}
