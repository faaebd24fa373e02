//! Right assignment and manual obligation API endpoints

use api_types::{
    assignment::{AssignRight, Assignment, AssignmentRange, MemberRight},
    obligation::{AssignDue, Obligation},
};
use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use uuid::Uuid;

use crate::{Payload, ServerError, server::ServerState};

fn member_right_view(assignment: engine::MemberRight) -> MemberRight {
    MemberRight {
        member_id: assignment.member_id,
        right_id: assignment.right_id,
        start_date: assignment.start_date,
        end_date: assignment.end_date,
    }
}

fn obligation_view(obligation: engine::Obligation) -> Obligation {
    Obligation {
        member_id: obligation.member_id,
        due_id: obligation.due_id,
        assigned_on: obligation.assigned_on,
        status: obligation.status.as_str().to_string(),
        origin_right_id: obligation.origin_right_id,
    }
}

/// Handle right assignment; the response lists the dues obligated by it
pub async fn assign_right(
    State(state): State<ServerState>,
    Payload(payload): Payload<AssignRight>,
) -> Result<(StatusCode, Json<Assignment>), ServerError> {
    let cmd = engine::AssignRightCmd {
        member_id: payload.member_id,
        right_id: payload.right_id,
        start_date: payload.start_date,
        end_date: payload.end_date,
    };
    let outcome = state.engine.assign_right(cmd).await?;
    Ok((
        StatusCode::CREATED,
        Json(Assignment {
            assignment: member_right_view(outcome.assignment),
            created: outcome.created,
            skipped: outcome.skipped,
        }),
    ))
}

pub async fn update_assignment(
    State(state): State<ServerState>,
    Path((member_id, right_id)): Path<(Uuid, Uuid)>,
    Payload(payload): Payload<AssignmentRange>,
) -> Result<Json<MemberRight>, ServerError> {
    let cmd = engine::AssignRightCmd {
        member_id,
        right_id,
        start_date: payload.start_date,
        end_date: payload.end_date,
    };
    let assignment = state.engine.update_assignment(cmd).await?;
    Ok(Json(member_right_view(assignment)))
}

/// Handle revocation; returns the obligations still outstanding
pub async fn revoke_right(
    State(state): State<ServerState>,
    Path((member_id, right_id)): Path<(Uuid, Uuid)>,
) -> Result<Json<Vec<Obligation>>, ServerError> {
    let outstanding = state.engine.revoke_right(member_id, right_id).await?;
    Ok(Json(outstanding.into_iter().map(obligation_view).collect()))
}

pub async fn assign_due(
    State(state): State<ServerState>,
    Payload(payload): Payload<AssignDue>,
) -> Result<(StatusCode, Json<Obligation>), ServerError> {
    let obligation = state
        .engine
        .assign_due(payload.member_id, payload.due_id, &payload.date)
        .await?;
    Ok((StatusCode::CREATED, Json(obligation_view(obligation))))
}

pub async fn rights_of_member(
    State(state): State<ServerState>,
    Path(member_id): Path<Uuid>,
) -> Result<Json<Vec<MemberRight>>, ServerError> {
    let assignments = state.engine.assignments_of_member(member_id).await?;
    Ok(Json(assignments.into_iter().map(member_right_view).collect()))
}

pub async fn obligations_of_member(
    State(state): State<ServerState>,
    Path(member_id): Path<Uuid>,
) -> Result<Json<Vec<Obligation>>, ServerError> {
    let obligations = state.engine.obligations_of_member(member_id).await?;
    Ok(Json(obligations.into_iter().map(obligation_view).collect()))
}
