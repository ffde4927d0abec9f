//! Debt simplifier.
//!
//! Reduces a group's net balances to a short list of pairwise payments that
//! zero every balance: the classic greedy min-cash-flow walk, repeatedly
//! matching the largest creditor with the largest debtor. Emits at most
//! `creditors + debtors - 1` payments and runs in O(n log n).
//!
//! The output is deterministic: both sides are stable-sorted descending by
//! amount, so equal balances keep their group-member order.

use uuid::Uuid;

use crate::{BalanceSheet, EngineError, MoneyCents, ResultEngine};

/// A suggested payment. Transient: recomputed on every query, persisted only
/// when the user records it as a settlement expense.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PlannedPayment {
    pub from: Uuid,
    pub to: Uuid,
    pub amount: MoneyCents,
}

/// Produces the minimal greedy payment plan for `sheet`.
///
/// A sheet whose balances do not sum to zero is a caller bug and fails with
/// `UnbalancedLedger` instead of silently producing a plan that cannot
/// settle.
pub fn simplify(sheet: &BalanceSheet) -> ResultEngine<Vec<PlannedPayment>> {
    let residue = sheet.residue();
    if !residue.is_zero() {
        return Err(EngineError::UnbalancedLedger {
            group: sheet.group_id,
            residue_cents: residue.cents(),
        });
    }

    let mut creditors: Vec<(Uuid, MoneyCents)> = Vec::new();
    let mut debtors: Vec<(Uuid, MoneyCents)> = Vec::new();
    for entry in sheet.entries() {
        if entry.amount.is_positive() {
            creditors.push((entry.member_id, entry.amount));
        } else if entry.amount.is_negative() {
            debtors.push((entry.member_id, entry.amount.abs()));
        }
    }

    // Stable sorts keep equal amounts in member order, making the plan
    // reproducible across recomputations.
    creditors.sort_by(|a, b| b.1.cmp(&a.1));
    debtors.sort_by(|a, b| b.1.cmp(&a.1));

    let mut plan = Vec::new();
    let mut i = 0;
    let mut j = 0;

    while i < creditors.len() && j < debtors.len() {
        let settle = creditors[i].1.min(debtors[j].1);
        if settle.is_positive() {
            plan.push(PlannedPayment {
                from: debtors[j].0,
                to: creditors[i].0,
                amount: settle,
            });
        }

        creditors[i].1 -= settle;
        debtors[j].1 -= settle;

        if creditors[i].1.is_zero() {
            i += 1;
        }
        if debtors[j].1.is_zero() {
            j += 1;
        }
    }

    Ok(plan)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sheet(entries: Vec<(Uuid, i64)>) -> BalanceSheet {
        BalanceSheet::from_entries(
            Uuid::new_v4(),
            entries
                .into_iter()
                .map(|(id, cents)| (id, MoneyCents::new(cents))),
        )
    }

    /// Applies the plan back to the balances; all must end at zero.
    fn apply(sheet: &BalanceSheet, plan: &[PlannedPayment]) -> Vec<MoneyCents> {
        sheet
            .entries()
            .iter()
            .map(|entry| {
                let mut amount = entry.amount;
                for payment in plan {
                    if payment.from == entry.member_id {
                        amount += payment.amount;
                    }
                    if payment.to == entry.member_id {
                        amount -= payment.amount;
                    }
                }
                amount
            })
            .collect()
    }

    #[test]
    fn one_creditor_two_debtors() {
        let (a, b, c) = (Uuid::new_v4(), Uuid::new_v4(), Uuid::new_v4());
        let sheet = sheet(vec![(a, 60_00), (b, -30_00), (c, -30_00)]);

        let plan = simplify(&sheet).unwrap();
        assert_eq!(
            plan,
            vec![
                PlannedPayment {
                    from: b,
                    to: a,
                    amount: MoneyCents::new(30_00)
                },
                PlannedPayment {
                    from: c,
                    to: a,
                    amount: MoneyCents::new(30_00)
                },
            ]
        );
    }

    #[test]
    fn tied_debtors_keep_member_order() {
        let (a, b, c) = (Uuid::new_v4(), Uuid::new_v4(), Uuid::new_v4());
        let sheet = sheet(vec![(c, -10_00), (b, -10_00), (a, 20_00)]);

        let plan = simplify(&sheet).unwrap();
        // c comes before b in the sheet, so it pays first.
        assert_eq!(plan[0].from, c);
        assert_eq!(plan[1].from, b);
    }

    #[test]
    fn settled_group_yields_empty_plan() {
        let sheet = sheet(vec![(Uuid::new_v4(), 0), (Uuid::new_v4(), 0)]);
        assert!(simplify(&sheet).unwrap().is_empty());
    }

    #[test]
    fn unbalanced_sheet_is_rejected() {
        let sheet = sheet(vec![(Uuid::new_v4(), 10_00), (Uuid::new_v4(), -9_99)]);
        assert!(matches!(
            simplify(&sheet),
            Err(EngineError::UnbalancedLedger { residue_cents: 1, .. })
        ));
    }

    #[test]
    fn plan_zeroes_all_balances() {
        let ids: Vec<Uuid> = (0..6).map(|_| Uuid::new_v4()).collect();
        let sheet = sheet(vec![
            (ids[0], 125_37),
            (ids[1], -40_00),
            (ids[2], 3_63),
            (ids[3], -89_00),
            (ids[4], -1),
            (ids[5], 1),
        ]);

        let plan = simplify(&sheet).unwrap();
        assert!(apply(&sheet, &plan).iter().all(|b| b.is_zero()));
    }

    #[test]
    fn plan_length_is_bounded() {
        let ids: Vec<Uuid> = (0..5).map(|_| Uuid::new_v4()).collect();
        let sheet = sheet(vec![
            (ids[0], 50_00),
            (ids[1], 25_00),
            (ids[2], -30_00),
            (ids[3], -30_00),
            (ids[4], -15_00),
        ]);

        // 2 creditors + 3 debtors -> at most 4 payments.
        let plan = simplify(&sheet).unwrap();
        assert!(plan.len() <= 4);
        assert!(apply(&sheet, &plan).iter().all(|b| b.is_zero()));
    }
}
