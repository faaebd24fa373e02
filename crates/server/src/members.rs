//! Member registry API endpoints

use api_types::member::{Member, MemberNew, MemberUpdate};
use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use uuid::Uuid;

use crate::{Payload, ServerError, server::ServerState};

pub(crate) fn member_view(member: engine::Member) -> Member {
    Member {
        id: member.id,
        national_id: member.national_id,
        name: member.name,
        address: member.address,
        phone: member.phone,
        email: member.email,
        role: member.role.map(|role| role.as_str().to_string()),
        status: member.status.as_str().to_string(),
    }
}

/// Handle requests for registering a new member
pub async fn member_new(
    State(state): State<ServerState>,
    Payload(payload): Payload<MemberNew>,
) -> Result<(StatusCode, Json<Member>), ServerError> {
    let cmd = engine::MemberNew {
        national_id: payload.national_id,
        name: payload.name,
        address: payload.address,
        phone: payload.phone,
        email: payload.email,
        role: payload.role,
    };
    let member = state.engine.register_member(cmd).await?;
    Ok((StatusCode::CREATED, Json(member_view(member))))
}

pub async fn list(State(state): State<ServerState>) -> Result<Json<Vec<Member>>, ServerError> {
    let members = state.engine.members().await?;
    Ok(Json(members.into_iter().map(member_view).collect()))
}

pub async fn get(
    State(state): State<ServerState>,
    Path(member_id): Path<Uuid>,
) -> Result<Json<Member>, ServerError> {
    let member = state.engine.member(member_id).await?;
    Ok(Json(member_view(member)))
}

/// Handle partial updates; absent fields are left untouched
pub async fn update(
    State(state): State<ServerState>,
    Path(member_id): Path<Uuid>,
    Payload(payload): Payload<MemberUpdate>,
) -> Result<Json<Member>, ServerError> {
    let cmd = engine::MemberUpdate {
        national_id: payload.national_id,
        name: payload.name,
        address: payload.address,
        phone: payload.phone,
        email: payload.email,
        role: payload.role,
    };
    let member = state.engine.update_member(member_id, cmd).await?;
    Ok(Json(member_view(member)))
}

pub async fn deactivate(
    State(state): State<ServerState>,
    Path(member_id): Path<Uuid>,
) -> Result<Json<Member>, ServerError> {
    let member = state.engine.deactivate_member(member_id).await?;
    Ok(Json(member_view(member)))
}
