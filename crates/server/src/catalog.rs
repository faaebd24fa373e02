//! Rights and dues catalog API endpoints

use api_types::{
    due::{Due, DueNew, DueUpdate},
    right::{Right, RightNew, RightRemoval, RightUpdate},
};
use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use uuid::Uuid;

use crate::{Payload, ServerError, server::ServerState};

fn right_view(right: engine::Right) -> Right {
    Right {
        id: right.id,
        name: right.name,
        active: right.active,
    }
}

fn due_view(due: engine::Due) -> Due {
    Due {
        id: due.id,
        description: due.description,
        amount: due.amount.to_decimal_string(),
        limit_date: due.limit_date,
    }
}

pub async fn right_new(
    State(state): State<ServerState>,
    Payload(payload): Payload<RightNew>,
) -> Result<(StatusCode, Json<Right>), ServerError> {
    let right = state.engine.create_right(&payload.name).await?;
    Ok((StatusCode::CREATED, Json(right_view(right))))
}

pub async fn rights(State(state): State<ServerState>) -> Result<Json<Vec<Right>>, ServerError> {
    let rights = state.engine.rights().await?;
    Ok(Json(rights.into_iter().map(right_view).collect()))
}

pub async fn right(
    State(state): State<ServerState>,
    Path(right_id): Path<Uuid>,
) -> Result<Json<Right>, ServerError> {
    Ok(Json(right_view(state.engine.right(right_id).await?)))
}

pub async fn rename_right(
    State(state): State<ServerState>,
    Path(right_id): Path<Uuid>,
    Payload(payload): Payload<RightUpdate>,
) -> Result<Json<Right>, ServerError> {
    let right = state.engine.rename_right(right_id, &payload.name).await?;
    Ok(Json(right_view(right)))
}

pub async fn enable_right(
    State(state): State<ServerState>,
    Path(right_id): Path<Uuid>,
) -> Result<Json<Right>, ServerError> {
    let right = state.engine.set_right_active(right_id, true).await?;
    Ok(Json(right_view(right)))
}

pub async fn disable_right(
    State(state): State<ServerState>,
    Path(right_id): Path<Uuid>,
) -> Result<Json<Right>, ServerError> {
    let right = state.engine.set_right_active(right_id, false).await?;
    Ok(Json(right_view(right)))
}

/// Handle right deletion, reporting what the cascade removed
pub async fn delete_right(
    State(state): State<ServerState>,
    Path(right_id): Path<Uuid>,
) -> Result<Json<RightRemoval>, ServerError> {
    let removal = state.engine.delete_right(right_id).await?;
    Ok(Json(RightRemoval {
        right_id: removal.right_id,
        links_removed: removal.links_removed,
        assignments_removed: removal.assignments_removed,
        obligations_removed: removal.obligations_removed,
        obligations_reattributed: removal.obligations_reattributed,
        obligations_kept: removal.obligations_kept,
    }))
}

pub async fn dues_of_right(
    State(state): State<ServerState>,
    Path(right_id): Path<Uuid>,
) -> Result<Json<Vec<Due>>, ServerError> {
    let dues = state.engine.dues_of_right(right_id).await?;
    Ok(Json(dues.into_iter().map(due_view).collect()))
}

pub async fn link(
    State(state): State<ServerState>,
    Path((right_id, due_id)): Path<(Uuid, Uuid)>,
) -> Result<StatusCode, ServerError> {
    state.engine.link(right_id, due_id).await?;
    Ok(StatusCode::CREATED)
}

pub async fn unlink(
    State(state): State<ServerState>,
    Path((right_id, due_id)): Path<(Uuid, Uuid)>,
) -> Result<StatusCode, ServerError> {
    state.engine.unlink(right_id, due_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn due_new(
    State(state): State<ServerState>,
    Payload(payload): Payload<DueNew>,
) -> Result<(StatusCode, Json<Due>), ServerError> {
    let cmd = engine::DueNew::new(payload.description, payload.amount, payload.limit_date);
    let due = state.engine.create_due(cmd).await?;
    Ok((StatusCode::CREATED, Json(due_view(due))))
}

pub async fn dues(State(state): State<ServerState>) -> Result<Json<Vec<Due>>, ServerError> {
    let dues = state.engine.dues().await?;
    Ok(Json(dues.into_iter().map(due_view).collect()))
}

pub async fn due(
    State(state): State<ServerState>,
    Path(due_id): Path<Uuid>,
) -> Result<Json<Due>, ServerError> {
    Ok(Json(due_view(state.engine.due(due_id).await?)))
}

pub async fn update_due(
    State(state): State<ServerState>,
    Path(due_id): Path<Uuid>,
    Payload(payload): Payload<DueUpdate>,
) -> Result<Json<Due>, ServerError> {
    let cmd = engine::DueUpdate {
        description: payload.description,
        amount: payload.amount,
        limit_date: payload.limit_date,
    };
    let due = state.engine.update_due(due_id, cmd).await?;
    Ok(Json(due_view(due)))
}

pub async fn delete_due(
    State(state): State<ServerState>,
    Path(due_id): Path<Uuid>,
) -> Result<StatusCode, ServerError> {
    state.engine.delete_due(due_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
