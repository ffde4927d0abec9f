//! Balance API endpoint.

use std::collections::HashMap;

use api_types::balance::{BalanceView, BalancesResponse};
use axum::{
    Json,
    extract::{Path, State},
};
use uuid::Uuid;

use crate::{ServerError, server::ServerState};

pub async fn get(
    State(state): State<ServerState>,
    Path(group_id): Path<Uuid>,
) -> Result<Json<BalancesResponse>, ServerError> {
    let view = state.engine.group(group_id).await?;
    let sheet = state.engine.balances(group_id).await?;

    let names: HashMap<Uuid, &str> = view
        .members
        .iter()
        .map(|member| (member.id, member.name.as_str()))
        .collect();

    Ok(Json(BalancesResponse {
        group_id: sheet.group_id,
        total_spent_cents: sheet.total_spent.cents(),
        balances: sheet
            .entries()
            .iter()
            .map(|entry| BalanceView {
                member_id: entry.member_id,
                name: names
                    .get(&entry.member_id)
                    .copied()
                    .unwrap_or_default()
                    .to_string(),
                amount_cents: entry.amount.cents(),
            })
            .collect(),
    }))
}
