//! Balance aggregator.
//!
//! Folds a group's full expense history into one net balance per member.
//! The fold is pure and order-insensitive, and it is recomputed wholesale on
//! every read: there is no incremental cache to drift when records are edited
//! or deleted. All accumulation is checked arithmetic; a history that would
//! leave the `i64` range fails with `BalanceOverflow` instead of wrapping.
//!
//! Sign convention (must not be inverted): positive = the member is owed
//! money, negative = the member owes money. A settlement record's payer is
//! the **debtor** making a payment, so a settlement credits its payer and
//! debits its single receiver.

use std::collections::HashMap;

use uuid::Uuid;

use crate::{
    EngineError, Expense, Member, MoneyCents, ResultEngine, split::compute_shares,
};

/// One member's net position.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MemberBalance {
    pub member_id: Uuid,
    pub amount: MoneyCents,
}

/// Derived balances for a group, in group-member order.
///
/// Invariant: the entries sum to exactly zero (money conservation). The
/// aggregator verifies this after every fold and refuses to return a sheet
/// that violates it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BalanceSheet {
    pub group_id: Uuid,
    entries: Vec<MemberBalance>,
    index: HashMap<Uuid, usize>,
    /// Sum of non-settlement amounts only.
    pub total_spent: MoneyCents,
}

impl BalanceSheet {
    fn seeded(group_id: Uuid, member_ids: impl IntoIterator<Item = Uuid>) -> Self {
        let mut sheet = Self {
            group_id,
            entries: Vec::new(),
            index: HashMap::new(),
            total_spent: MoneyCents::ZERO,
        };
        for member_id in member_ids {
            sheet.slot(member_id);
        }
        sheet
    }

    fn slot(&mut self, member_id: Uuid) -> &mut MoneyCents {
        let idx = *self.index.entry(member_id).or_insert_with(|| {
            self.entries.push(MemberBalance {
                member_id,
                amount: MoneyCents::ZERO,
            });
            self.entries.len() - 1
        });
        &mut self.entries[idx].amount
    }

    fn credit(&mut self, member_id: Uuid, amount: MoneyCents) -> ResultEngine<()> {
        let group = self.group_id;
        let slot = self.slot(member_id);
        *slot = slot
            .checked_add(amount)
            .ok_or(EngineError::BalanceOverflow { group })?;
        Ok(())
    }

    fn debit(&mut self, member_id: Uuid, amount: MoneyCents) -> ResultEngine<()> {
        let group = self.group_id;
        let slot = self.slot(member_id);
        *slot = slot
            .checked_sub(amount)
            .ok_or(EngineError::BalanceOverflow { group })?;
        Ok(())
    }

    /// Net balance for a member; zero when the member has no entry.
    #[must_use]
    pub fn balance_of(&self, member_id: Uuid) -> MoneyCents {
        self.index
            .get(&member_id)
            .map(|&idx| self.entries[idx].amount)
            .unwrap_or(MoneyCents::ZERO)
    }

    /// `true` when the sheet knows this member.
    #[must_use]
    pub fn contains(&self, member_id: Uuid) -> bool {
        self.index.contains_key(&member_id)
    }

    /// Entries in group-member order.
    #[must_use]
    pub fn entries(&self) -> &[MemberBalance] {
        &self.entries
    }

    /// Sum of all entries. Zero for any sheet the aggregator returns.
    #[must_use]
    pub fn residue(&self) -> MoneyCents {
        self.entries.iter().map(|e| e.amount).sum()
    }

    /// Builds a sheet directly from `(member, amount)` pairs.
    ///
    /// Used by callers that already hold balances (e.g. tests, or replaying a
    /// simplification plan); the zero-sum invariant is checked by the
    /// consumers, not here.
    #[must_use]
    pub fn from_entries(
        group_id: Uuid,
        entries: impl IntoIterator<Item = (Uuid, MoneyCents)>,
    ) -> Self {
        let mut sheet = Self::seeded(group_id, std::iter::empty());
        for (member_id, amount) in entries {
            *sheet.slot(member_id) += amount;
        }
        sheet
    }
}

/// Folds `expenses` into per-member net balances.
///
/// Every group member is seeded at zero, so members without records still
/// appear in the result. Member ids referenced only by records (e.g. a payer
/// later removed from the group) get an entry too; dropping them would break
/// conservation.
pub fn aggregate(
    group_id: Uuid,
    members: &[Member],
    expenses: &[Expense],
) -> ResultEngine<BalanceSheet> {
    let mut sheet = BalanceSheet::seeded(group_id, members.iter().map(|m| m.id));

    for expense in expenses {
        if expense.is_settlement() {
            let receiver = expense
                .shares
                .first()
                .ok_or(EngineError::EmptyParticipantSet {
                    expense: expense.id,
                })?
                .member_id;
            // The payer of a settlement is the debtor paying their debt off:
            // their balance goes up, the receiver's goes down.
            sheet.credit(expense.paid_by, expense.amount)?;
            sheet.debit(receiver, expense.amount)?;
        } else {
            sheet.total_spent = sheet
                .total_spent
                .checked_add(expense.amount)
                .ok_or(EngineError::BalanceOverflow { group: group_id })?;
            sheet.credit(expense.paid_by, expense.amount)?;
            for share in compute_shares(expense)? {
                sheet.debit(share.member_id, share.owed)?;
            }
        }
    }

    let residue = sheet.residue();
    if !residue.is_zero() {
        return Err(EngineError::UnbalancedLedger {
            group: group_id,
            residue_cents: residue.cents(),
        });
    }

    Ok(sheet)
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use crate::{
        SplitKind,
        shares::{Share, ShareSpec},
    };

    use super::*;

    fn member(group_id: Uuid) -> Member {
        Member::new(group_id, "m".to_string(), Utc::now())
    }

    fn expense(
        group_id: Uuid,
        amount: i64,
        paid_by: Uuid,
        kind: SplitKind,
        participants: Vec<(Uuid, ShareSpec)>,
    ) -> Expense {
        let mut e = Expense::new(
            group_id,
            "test".to_string(),
            MoneyCents::new(amount),
            paid_by,
            kind,
            None,
            None,
            Utc::now(),
        )
        .unwrap();
        e.shares = participants
            .into_iter()
            .map(|(member_id, spec)| Share::new(e.id, member_id, spec))
            .collect();
        e
    }

    #[test]
    fn equal_split_credits_payer_and_debits_participants() {
        let group_id = Uuid::new_v4();
        let (a, b, c) = (member(group_id), member(group_id), member(group_id));
        let members = vec![a.clone(), b.clone(), c.clone()];

        let e = expense(
            group_id,
            90_00,
            a.id,
            SplitKind::Equal,
            vec![
                (a.id, ShareSpec::Even),
                (b.id, ShareSpec::Even),
                (c.id, ShareSpec::Even),
            ],
        );

        let sheet = aggregate(group_id, &members, &[e]).unwrap();
        assert_eq!(sheet.balance_of(a.id), MoneyCents::new(60_00));
        assert_eq!(sheet.balance_of(b.id), MoneyCents::new(-30_00));
        assert_eq!(sheet.balance_of(c.id), MoneyCents::new(-30_00));
        assert_eq!(sheet.total_spent, MoneyCents::new(90_00));
        assert!(sheet.residue().is_zero());
    }

    #[test]
    fn settlement_credits_payer_and_debits_receiver() {
        let group_id = Uuid::new_v4();
        let (a, b) = (member(group_id), member(group_id));
        let members = vec![a.clone(), b.clone()];

        // B paid 40 split equally, then A settles 20 to B.
        let shared = expense(
            group_id,
            40_00,
            b.id,
            SplitKind::Equal,
            vec![(a.id, ShareSpec::Even), (b.id, ShareSpec::Even)],
        );
        let settlement = expense(
            group_id,
            20_00,
            a.id,
            SplitKind::Settlement,
            vec![(b.id, ShareSpec::Even)],
        );

        let sheet = aggregate(group_id, &members, &[shared, settlement]).unwrap();
        assert_eq!(sheet.balance_of(a.id), MoneyCents::ZERO);
        assert_eq!(sheet.balance_of(b.id), MoneyCents::ZERO);
        // Settlements never count as spending.
        assert_eq!(sheet.total_spent, MoneyCents::new(40_00));
    }

    #[test]
    fn members_without_records_stay_at_zero() {
        let group_id = Uuid::new_v4();
        let (a, b, idle) = (member(group_id), member(group_id), member(group_id));
        let members = vec![a.clone(), b.clone(), idle.clone()];

        let e = expense(
            group_id,
            10_00,
            a.id,
            SplitKind::Equal,
            vec![(a.id, ShareSpec::Even), (b.id, ShareSpec::Even)],
        );

        let sheet = aggregate(group_id, &members, &[e]).unwrap();
        assert!(sheet.contains(idle.id));
        assert_eq!(sheet.balance_of(idle.id), MoneyCents::ZERO);
    }

    #[test]
    fn aggregation_is_idempotent() {
        let group_id = Uuid::new_v4();
        let (a, b, c) = (member(group_id), member(group_id), member(group_id));
        let members = vec![a.clone(), b.clone(), c.clone()];

        let records = vec![
            expense(
                group_id,
                100_00,
                a.id,
                SplitKind::Custom,
                vec![
                    (a.id, ShareSpec::Amount { amount: MoneyCents::new(50_00) }),
                    (b.id, ShareSpec::Amount { amount: MoneyCents::new(30_00) }),
                    (c.id, ShareSpec::Amount { amount: MoneyCents::new(20_00) }),
                ],
            ),
            expense(
                group_id,
                30_00,
                b.id,
                SplitKind::Settlement,
                vec![(a.id, ShareSpec::Even)],
            ),
        ];

        let first = aggregate(group_id, &members, &records).unwrap();
        let second = aggregate(group_id, &members, &records).unwrap();
        assert_eq!(first, second);
        assert_eq!(first.balance_of(a.id), MoneyCents::new(20_00));
        assert_eq!(first.balance_of(b.id), MoneyCents::ZERO);
        assert_eq!(first.balance_of(c.id), MoneyCents::new(-20_00));
    }

    #[test]
    fn overflowing_history_is_an_error_not_a_wraparound() {
        let group_id = Uuid::new_v4();
        let (a, b) = (member(group_id), member(group_id));
        let members = vec![a.clone(), b.clone()];

        // Amounts this large cannot be recorded through the engine; build the
        // records by hand to exercise the fold itself.
        let huge = |paid_by: Uuid, owed_by: Uuid| {
            let id = Uuid::new_v4();
            Expense {
                id,
                group_id,
                description: "corrupt".to_string(),
                amount: MoneyCents::new(i64::MAX),
                paid_by,
                kind: SplitKind::Equal,
                category: None,
                note: None,
                occurred_at: Utc::now(),
                created_at: Utc::now(),
                shares: vec![Share::new(id, owed_by, ShareSpec::Even)],
            }
        };

        let records = vec![huge(a.id, b.id), huge(a.id, b.id)];
        assert_eq!(
            aggregate(group_id, &members, &records),
            Err(EngineError::BalanceOverflow { group: group_id })
        );
    }

    #[test]
    fn odd_cent_histories_still_conserve_money() {
        let group_id = Uuid::new_v4();
        let (a, b, c) = (member(group_id), member(group_id), member(group_id));
        let members = vec![a.clone(), b.clone(), c.clone()];

        let records: Vec<Expense> = (0..7)
            .map(|i| {
                expense(
                    group_id,
                    100 * (i + 1) + 1, // never divisible by 3
                    a.id,
                    SplitKind::Equal,
                    vec![
                        (a.id, ShareSpec::Even),
                        (b.id, ShareSpec::Even),
                        (c.id, ShareSpec::Even),
                    ],
                )
            })
            .collect();

        let sheet = aggregate(group_id, &members, &records).unwrap();
        assert!(sheet.residue().is_zero());
    }
}
