use axum::{Json, http::StatusCode, response::IntoResponse};
use engine::EngineError;

use serde::Serialize;
pub use server::{ServerState, router, run, run_with_listener, spawn_with_listener};

mod balances;
mod convert;
mod expenses;
mod groups;
mod server;
mod settlements;

pub mod types {
    pub mod group {
        pub use api_types::group::{GroupCreated, GroupNew, GroupView, MemberCreated, MemberNew};
    }

    pub mod expense {
        pub use api_types::expense::{
            ExpenseCreated, ExpenseListResponse, ExpenseNew, ExpenseUpdate, ExpenseView,
            ParticipantSpec,
        };
    }

    pub mod balance {
        pub use api_types::balance::{BalanceView, BalancesResponse};
    }

    pub mod settlement {
        pub use api_types::settlement::{
            SettlementNew, SettlementRecorded, SuggestedPayment, SuggestionsResponse,
        };
    }
}

pub enum ServerError {
    Engine(EngineError),
    Generic(String),
}

#[derive(Serialize)]
struct Error {
    error: String,
}

fn status_for_engine_error(err: &EngineError) -> StatusCode {
    match err {
        EngineError::KeyNotFound(_) => StatusCode::NOT_FOUND,
        EngineError::ExistingKey(_) => StatusCode::CONFLICT,
        // An unbalanced or overflowing ledger is an engine invariant breach,
        // never a bad request.
        EngineError::Database(_)
        | EngineError::UnbalancedLedger { .. }
        | EngineError::BalanceOverflow { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        EngineError::InvalidSplitKind(_)
        | EngineError::EmptyParticipantSet { .. }
        | EngineError::SelfSettlement { .. }
        | EngineError::NonPositiveAmount(_)
        | EngineError::NoDebt { .. }
        | EngineError::NotOwed { .. }
        | EngineError::InvalidAmount(_)
        | EngineError::CurrencyMismatch(_) => StatusCode::UNPROCESSABLE_ENTITY,
    }
}

fn message_for_engine_error(err: EngineError) -> String {
    match err {
        EngineError::Database(db_err) => {
            tracing::error!("database error: {db_err}");
            "internal server error".to_string()
        }
        EngineError::UnbalancedLedger { group, residue_cents } => {
            tracing::error!("unbalanced ledger for group {group}: residue {residue_cents} cents");
            "internal server error".to_string()
        }
        EngineError::BalanceOverflow { group } => {
            tracing::error!("balance overflow for group {group}");
            "internal server error".to_string()
        }
        other => other.to_string(),
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> axum::response::Response {
        let (status, error) = match self {
            ServerError::Engine(err) => {
                (status_for_engine_error(&err), message_for_engine_error(err))
            }
            ServerError::Generic(err) => (StatusCode::BAD_REQUEST, err),
        };

        (status, Json(Error { error })).into_response()
    }
}

impl From<EngineError> for ServerError {
    fn from(value: EngineError) -> Self {
        Self::Engine(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    #[test]
    fn engine_not_found_maps_to_404() {
        let res = ServerError::from(EngineError::KeyNotFound("x".to_string())).into_response();
        assert_eq!(res.status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn engine_conflict_maps_to_409() {
        let res = ServerError::from(EngineError::ExistingKey("x".to_string())).into_response();
        assert_eq!(res.status(), StatusCode::CONFLICT);
    }

    #[test]
    fn engine_validation_maps_to_422() {
        let res = ServerError::from(EngineError::InvalidAmount("x".to_string())).into_response();
        assert_eq!(res.status(), StatusCode::UNPROCESSABLE_ENTITY);

        let res = ServerError::from(EngineError::NoDebt {
            member: Uuid::new_v4(),
            balance_cents: 0,
        })
        .into_response();
        assert_eq!(res.status(), StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[test]
    fn unbalanced_ledger_maps_to_500() {
        let res = ServerError::from(EngineError::UnbalancedLedger {
            group: Uuid::new_v4(),
            residue_cents: 1,
        })
        .into_response();
        assert_eq!(res.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn balance_overflow_maps_to_500() {
        let res = ServerError::from(EngineError::BalanceOverflow {
            group: Uuid::new_v4(),
        })
        .into_response();
        assert_eq!(res.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn generic_maps_to_400() {
        let res = ServerError::Generic("bad".to_string()).into_response();
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    }
}
