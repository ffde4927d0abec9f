//! Expense API endpoints.

use api_types::expense::{
    ExpenseCreated, ExpenseListResponse, ExpenseNew, ExpenseUpdate, ExpenseView,
};
use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use chrono::Utc;
use uuid::Uuid;

use crate::{ServerError, convert, server::ServerState};
use engine::{ExpensePatch, MoneyCents, NewExpense};

pub async fn create(
    State(state): State<ServerState>,
    Path(group_id): Path<Uuid>,
    Json(payload): Json<ExpenseNew>,
) -> Result<Json<ExpenseCreated>, ServerError> {
    let expense = state
        .engine
        .create_expense(
            group_id,
            NewExpense {
                description: payload.description,
                amount: MoneyCents::new(payload.amount_cents),
                paid_by: payload.paid_by,
                kind: convert::split_kind_to_engine(payload.split),
                participants: payload
                    .participants
                    .iter()
                    .map(convert::participant_to_engine)
                    .collect(),
                category: payload.category,
                note: payload.note,
                occurred_at: payload.occurred_at.map(|at| at.with_timezone(&Utc)),
            },
        )
        .await?;
    Ok(Json(ExpenseCreated { id: expense.id }))
}

pub async fn list(
    State(state): State<ServerState>,
    Path(group_id): Path<Uuid>,
) -> Result<Json<ExpenseListResponse>, ServerError> {
    let expenses = state.engine.expenses(group_id).await?;
    Ok(Json(ExpenseListResponse {
        expenses: expenses.iter().map(convert::expense_to_view).collect(),
    }))
}

pub async fn update(
    State(state): State<ServerState>,
    Path((group_id, expense_id)): Path<(Uuid, Uuid)>,
    Json(payload): Json<ExpenseUpdate>,
) -> Result<Json<ExpenseView>, ServerError> {
    let expense = state
        .engine
        .update_expense(
            group_id,
            expense_id,
            ExpensePatch {
                description: payload.description,
                amount: payload.amount_cents.map(MoneyCents::new),
                paid_by: payload.paid_by,
                participants: payload
                    .participants
                    .map(|specs| specs.iter().map(convert::participant_to_engine).collect()),
                category: payload.category,
                note: payload.note,
                occurred_at: payload.occurred_at.map(|at| at.with_timezone(&Utc)),
            },
        )
        .await?;
    Ok(Json(convert::expense_to_view(&expense)))
}

pub async fn delete(
    State(state): State<ServerState>,
    Path((group_id, expense_id)): Path<(Uuid, Uuid)>,
) -> Result<StatusCode, ServerError> {
    state.engine.delete_expense(group_id, expense_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
