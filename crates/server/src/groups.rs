//! Group and member API endpoints.

use api_types::group::{GroupCreated, GroupNew, GroupView, MemberCreated, MemberNew, MemberView};
use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use uuid::Uuid;

use crate::{ServerError, convert, server::ServerState};

pub async fn create(
    State(state): State<ServerState>,
    Json(payload): Json<GroupNew>,
) -> Result<Json<GroupCreated>, ServerError> {
    let currency = payload.currency.map(convert::currency_to_engine);
    let id = state.engine.new_group(&payload.name, currency).await?;
    Ok(Json(GroupCreated { id }))
}

pub async fn get(
    State(state): State<ServerState>,
    Path(group_id): Path<Uuid>,
) -> Result<Json<GroupView>, ServerError> {
    let view = state.engine.group(group_id).await?;
    Ok(Json(GroupView {
        id: view.group.id,
        name: view.group.name,
        currency: convert::currency_to_api(view.group.currency),
        created_at: view.group.created_at.fixed_offset(),
        members: view
            .members
            .into_iter()
            .map(|member| MemberView {
                id: member.id,
                name: member.name,
                joined_at: member.joined_at.fixed_offset(),
            })
            .collect(),
    }))
}

pub async fn delete(
    State(state): State<ServerState>,
    Path(group_id): Path<Uuid>,
) -> Result<StatusCode, ServerError> {
    state.engine.delete_group(group_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn add_member(
    State(state): State<ServerState>,
    Path(group_id): Path<Uuid>,
    Json(payload): Json<MemberNew>,
) -> Result<Json<MemberCreated>, ServerError> {
    let id = state.engine.add_member(group_id, &payload.name).await?;
    Ok(Json(MemberCreated { id }))
}
