//! Conversions between wire types and engine types.

use engine::{Expense, MoneyCents, ParticipantInput, ShareSpec};

pub fn currency_to_engine(currency: api_types::Currency) -> engine::Currency {
    match currency {
        api_types::Currency::Eur => engine::Currency::Eur,
        api_types::Currency::Usd => engine::Currency::Usd,
        api_types::Currency::Inr => engine::Currency::Inr,
    }
}

pub fn currency_to_api(currency: engine::Currency) -> api_types::Currency {
    match currency {
        engine::Currency::Eur => api_types::Currency::Eur,
        engine::Currency::Usd => api_types::Currency::Usd,
        engine::Currency::Inr => api_types::Currency::Inr,
    }
}

pub fn split_kind_to_engine(kind: api_types::SplitKind) -> engine::SplitKind {
    match kind {
        api_types::SplitKind::Equal => engine::SplitKind::Equal,
        api_types::SplitKind::Percentage => engine::SplitKind::Percentage,
        api_types::SplitKind::Custom => engine::SplitKind::Custom,
        api_types::SplitKind::Settlement => engine::SplitKind::Settlement,
    }
}

pub fn split_kind_to_api(kind: engine::SplitKind) -> api_types::SplitKind {
    match kind {
        engine::SplitKind::Equal => api_types::SplitKind::Equal,
        engine::SplitKind::Percentage => api_types::SplitKind::Percentage,
        engine::SplitKind::Custom => api_types::SplitKind::Custom,
        engine::SplitKind::Settlement => api_types::SplitKind::Settlement,
    }
}

/// Maps a wire participant to an engine one. Shape errors (a percentage on
/// an equal split, both weights at once) are left to the engine's
/// validation, which knows the split kind.
pub fn participant_to_engine(spec: &api_types::expense::ParticipantSpec) -> ParticipantInput {
    let share = match (spec.percent_bp, spec.amount_cents) {
        (Some(percent_bp), _) => ShareSpec::Percent { percent_bp },
        (None, Some(cents)) => ShareSpec::Amount {
            amount: MoneyCents::new(cents),
        },
        (None, None) => ShareSpec::Even,
    };
    ParticipantInput {
        member_id: spec.member_id,
        spec: share,
    }
}

pub fn expense_to_view(expense: &Expense) -> api_types::expense::ExpenseView {
    api_types::expense::ExpenseView {
        id: expense.id,
        description: expense.description.clone(),
        amount_cents: expense.amount.cents(),
        paid_by: expense.paid_by,
        split: split_kind_to_api(expense.kind),
        participants: expense
            .shares
            .iter()
            .map(|share| {
                let (percent_bp, amount_cents) = match share.spec {
                    ShareSpec::Even => (None, None),
                    ShareSpec::Percent { percent_bp } => (Some(percent_bp), None),
                    ShareSpec::Amount { amount } => (None, Some(amount.cents())),
                };
                api_types::expense::ParticipantSpec {
                    member_id: share.member_id,
                    percent_bp,
                    amount_cents,
                }
            })
            .collect(),
        category: expense.category.clone(),
        note: expense.note.clone(),
        occurred_at: expense.occurred_at.fixed_offset(),
        created_at: expense.created_at.fixed_offset(),
    }
}
