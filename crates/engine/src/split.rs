//! Split calculator.
//!
//! Derives the per-member obligation created by a single expense record. For
//! every non-settlement kind the returned shares sum **exactly** to the
//! expense amount; rounding residues are folded deterministically into the
//! earliest participants so recomputation always reconciles.

use uuid::Uuid;

use crate::{
    EngineError, Expense, MoneyCents, ResultEngine, SplitKind,
    shares::{Share, ShareSpec},
};

/// One participant's derived obligation.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MemberShare {
    pub member_id: Uuid,
    pub owed: MoneyCents,
}

/// Computes the owed amount per participant for `expense`.
///
/// Settlement records are not split: the balance aggregator applies them
/// directly as a payer-to-receiver transfer. Calling this with a settlement
/// record is a programming error and fails with `InvalidSplitKind`.
pub fn compute_shares(expense: &Expense) -> ResultEngine<Vec<MemberShare>> {
    if expense.kind == SplitKind::Settlement {
        return Err(EngineError::InvalidSplitKind(
            "settlement records have no splits".to_string(),
        ));
    }
    if expense.shares.is_empty() {
        return Err(EngineError::EmptyParticipantSet {
            expense: expense.id,
        });
    }

    match expense.kind {
        SplitKind::Equal => split_equal(expense.amount, &expense.shares),
        SplitKind::Percentage => split_percentage(expense.amount, &expense.shares),
        SplitKind::Custom => split_custom(&expense.shares),
        SplitKind::Settlement => unreachable!("handled above"),
    }
}

fn split_equal(amount: MoneyCents, shares: &[Share]) -> ResultEngine<Vec<MemberShare>> {
    let parts = amount.split_even(shares.len())?;
    Ok(shares
        .iter()
        .zip(parts)
        .map(|(share, owed)| MemberShare {
            member_id: share.member_id,
            owed,
        })
        .collect())
}

fn split_percentage(amount: MoneyCents, shares: &[Share]) -> ResultEngine<Vec<MemberShare>> {
    let mut out = Vec::with_capacity(shares.len());
    for share in shares {
        let ShareSpec::Percent { percent_bp } = share.spec else {
            return Err(EngineError::InvalidSplitKind(
                "percentage split requires a percentage on every participant".to_string(),
            ));
        };
        out.push(MemberShare {
            member_id: share.member_id,
            owed: amount.percent_of(percent_bp),
        });
    }

    // Per-share rounding can leave the sum a few cents off the total; fold
    // the residue into the first share so the shares reconcile exactly.
    let total: MoneyCents = out.iter().map(|s| s.owed).sum();
    let residue = amount - total;
    if !residue.is_zero() {
        out[0].owed += residue;
    }
    Ok(out)
}

fn split_custom(shares: &[Share]) -> ResultEngine<Vec<MemberShare>> {
    shares
        .iter()
        .map(|share| {
            let ShareSpec::Amount { amount } = share.spec else {
                return Err(EngineError::InvalidSplitKind(
                    "custom split requires an amount on every participant".to_string(),
                ));
            };
            Ok(MemberShare {
                member_id: share.member_id,
                owed: amount,
            })
        })
        .collect()
}
