use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Currency {
    #[default]
    Eur,
    Usd,
    Inr,
}

/// How an expense's amount is divided across its participants.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SplitKind {
    Equal,
    Percentage,
    Custom,
    Settlement,
}

pub mod group {
    use super::*;

    #[derive(Debug, Serialize, Deserialize)]
    pub struct GroupNew {
        pub name: String,
        pub currency: Option<Currency>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct GroupCreated {
        pub id: Uuid,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct MemberNew {
        pub name: String,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct MemberCreated {
        pub id: Uuid,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct MemberView {
        pub id: Uuid,
        pub name: String,
        /// RFC3339 timestamp.
        pub joined_at: DateTime<FixedOffset>,
    }

    /// A group with its members, in join order.
    #[derive(Debug, Serialize, Deserialize)]
    pub struct GroupView {
        pub id: Uuid,
        pub name: String,
        pub currency: Currency,
        /// RFC3339 timestamp.
        pub created_at: DateTime<FixedOffset>,
        pub members: Vec<MemberView>,
    }
}

pub mod expense {
    use super::*;

    /// One participant of an expense.
    ///
    /// Which optional field must be set depends on the split kind:
    /// `percent_bp` (basis points, `2500` = 25%) for percentage splits,
    /// `amount_cents` for custom splits, neither for equal splits.
    #[derive(Clone, Copy, Debug, Serialize, Deserialize)]
    pub struct ParticipantSpec {
        pub member_id: Uuid,
        pub percent_bp: Option<i64>,
        pub amount_cents: Option<i64>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct ExpenseNew {
        pub description: String,
        /// Must be > 0.
        pub amount_cents: i64,
        pub paid_by: Uuid,
        pub split: SplitKind,
        /// Empty on an equal split means "all group members".
        #[serde(default)]
        pub participants: Vec<ParticipantSpec>,
        pub category: Option<String>,
        pub note: Option<String>,
        /// RFC3339 timestamp; absent means now.
        pub occurred_at: Option<DateTime<FixedOffset>>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct ExpenseCreated {
        pub id: Uuid,
    }

    /// Partial update; absent fields keep their stored values. The split
    /// kind itself is fixed at creation.
    #[derive(Debug, Default, Serialize, Deserialize)]
    pub struct ExpenseUpdate {
        pub description: Option<String>,
        pub amount_cents: Option<i64>,
        pub paid_by: Option<Uuid>,
        pub participants: Option<Vec<ParticipantSpec>>,
        pub category: Option<String>,
        pub note: Option<String>,
        pub occurred_at: Option<DateTime<FixedOffset>>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct ExpenseView {
        pub id: Uuid,
        pub description: String,
        pub amount_cents: i64,
        pub paid_by: Uuid,
        pub split: SplitKind,
        pub participants: Vec<ParticipantSpec>,
        pub category: Option<String>,
        pub note: Option<String>,
        /// RFC3339 timestamp.
        pub occurred_at: DateTime<FixedOffset>,
        /// RFC3339 timestamp.
        pub created_at: DateTime<FixedOffset>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct ExpenseListResponse {
        pub expenses: Vec<ExpenseView>,
    }
}

pub mod balance {
    use super::*;

    /// One member's net position: positive = owed money, negative = owes.
    #[derive(Debug, Serialize, Deserialize)]
    pub struct BalanceView {
        pub member_id: Uuid,
        pub name: String,
        pub amount_cents: i64,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct BalancesResponse {
        pub group_id: Uuid,
        /// Sum of non-settlement expense amounts.
        pub total_spent_cents: i64,
        pub balances: Vec<BalanceView>,
    }
}

pub mod settlement {
    use super::*;

    /// Request body for recording a "settle up" payment.
    #[derive(Debug, Serialize, Deserialize)]
    pub struct SettlementNew {
        /// The member paying off their debt.
        pub from: Uuid,
        /// The member being paid back.
        pub to: Uuid,
        pub amount_cents: i64,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct SettlementRecorded {
        pub id: Uuid,
        /// Set when the payment exceeded the debt; the suggested maximum.
        pub overpaid_max_cents: Option<i64>,
    }

    /// One payment of the suggested plan. Transient: recomputed per query.
    #[derive(Debug, Serialize, Deserialize)]
    pub struct SuggestedPayment {
        pub from: Uuid,
        pub to: Uuid,
        pub amount_cents: i64,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct SuggestionsResponse {
        pub payments: Vec<SuggestedPayment>,
    }
}
