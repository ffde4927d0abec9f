//! Settlement API endpoints.

use api_types::settlement::{
    SettlementNew, SettlementRecorded, SuggestedPayment, SuggestionsResponse,
};
use axum::{
    Json,
    extract::{Path, State},
};
use uuid::Uuid;

use crate::{ServerError, server::ServerState};
use engine::MoneyCents;

pub async fn suggestions(
    State(state): State<ServerState>,
    Path(group_id): Path<Uuid>,
) -> Result<Json<SuggestionsResponse>, ServerError> {
    let plan = state.engine.suggest_settlements(group_id).await?;
    Ok(Json(SuggestionsResponse {
        payments: plan
            .into_iter()
            .map(|payment| SuggestedPayment {
                from: payment.from,
                to: payment.to,
                amount_cents: payment.amount.cents(),
            })
            .collect(),
    }))
}

pub async fn record(
    State(state): State<ServerState>,
    Path(group_id): Path<Uuid>,
    Json(payload): Json<SettlementNew>,
) -> Result<Json<SettlementRecorded>, ServerError> {
    let recorded = state
        .engine
        .record_settlement(
            group_id,
            payload.from,
            payload.to,
            MoneyCents::new(payload.amount_cents),
        )
        .await?;
    Ok(Json(SettlementRecorded {
        id: recorded.expense.id,
        overpaid_max_cents: recorded.overpaid.map(|amount| amount.cents()),
    }))
}
