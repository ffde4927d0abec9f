//! Settlement validator.
//!
//! Pure pre-check for a proposed "settle up" payment against the current
//! balance sheet. No side effects: the caller persists the settlement record
//! only after validation passes, and never coerces a failure into success.

use uuid::Uuid;

use crate::{BalanceSheet, EngineError, MoneyCents, ResultEngine};

/// Outcome of a successful validation.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SettlementCheck {
    /// Set when the proposed amount exceeds what the payer owes the group or
    /// the receiver is owed; carries the suggested maximum. Paying more is
    /// allowed (users round up or pay ahead), but the caller should surface
    /// the hint.
    pub overpaid: Option<MoneyCents>,
}

/// Validates `from` paying `amount` to `to` given the current balances.
///
/// Checks run in a fixed order and each failure is a distinct error carrying
/// the offending member and amount:
/// 1. `SelfSettlement` - payer and receiver are the same member
/// 2. `NonPositiveAmount` - amount is zero or negative
/// 3. `NoDebt` - the payer does not currently owe anything
/// 4. `NotOwed` - the receiver is not currently owed anything
///
/// Members unknown to the sheet have a zero balance, which the debt checks
/// reject on their own.
pub fn validate_settlement(
    from: Uuid,
    to: Uuid,
    amount: MoneyCents,
    sheet: &BalanceSheet,
) -> ResultEngine<SettlementCheck> {
    if from == to {
        return Err(EngineError::SelfSettlement { member: from });
    }
    if !amount.is_positive() {
        return Err(EngineError::NonPositiveAmount(amount.cents()));
    }

    let from_balance = sheet.balance_of(from);
    if !from_balance.is_negative() {
        return Err(EngineError::NoDebt {
            member: from,
            balance_cents: from_balance.cents(),
        });
    }

    let to_balance = sheet.balance_of(to);
    if !to_balance.is_positive() {
        return Err(EngineError::NotOwed {
            member: to,
            balance_cents: to_balance.cents(),
        });
    }

    let max_settlement = from_balance.abs().min(to_balance);
    let overpaid = (amount > max_settlement).then_some(max_settlement);

    Ok(SettlementCheck { overpaid })
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

    #[test]
    fn self_settlement_always_fails() {
        let a = Uuid::new_v4();
        let sheet = sheet(vec![(a, -10_00)]);
        assert_eq!(
            validate_settlement(a, a, MoneyCents::new(10_00), &sheet),
            Err(EngineError::SelfSettlement { member: a })
        );
    }

    #[test]
    fn non_positive_amount_fails() {
        let (a, b) = (Uuid::new_v4(), Uuid::new_v4());
        let sheet = sheet(vec![(a, -10_00), (b, 10_00)]);
        assert_eq!(
            validate_settlement(a, b, MoneyCents::ZERO, &sheet),
            Err(EngineError::NonPositiveAmount(0))
        );
        assert!(matches!(
            validate_settlement(a, b, MoneyCents::new(-5), &sheet),
            Err(EngineError::NonPositiveAmount(-5))
        ));
    }

    #[test]
    fn payer_without_debt_fails() {
        let (a, b) = (Uuid::new_v4(), Uuid::new_v4());
        let sheet = sheet(vec![(a, 5_00), (b, -5_00)]);
        assert_eq!(
            validate_settlement(a, b, MoneyCents::new(5_00), &sheet),
            Err(EngineError::NoDebt {
                member: a,
                balance_cents: 5_00
            })
        );
    }

    #[test]
    fn receiver_not_owed_fails() {
        let (a, b, c) = (Uuid::new_v4(), Uuid::new_v4(), Uuid::new_v4());
        let sheet = sheet(vec![(a, -5_00), (b, -5_00), (c, 10_00)]);
        assert_eq!(
            validate_settlement(a, b, MoneyCents::new(5_00), &sheet),
            Err(EngineError::NotOwed {
                member: b,
                balance_cents: -5_00
            })
        );
    }

    #[test]
    fn exact_settlement_has_no_warning() {
        let (a, b) = (Uuid::new_v4(), Uuid::new_v4());
        let sheet = sheet(vec![(a, -10_00), (b, 10_00)]);
        let check = validate_settlement(a, b, MoneyCents::new(10_00), &sheet).unwrap();
        assert_eq!(check.overpaid, None);
    }

    #[test]
    fn overpayment_is_accepted_with_suggested_maximum() {
        let (a, b) = (Uuid::new_v4(), Uuid::new_v4());
        let sheet = sheet(vec![(a, -10_00), (b, 10_00)]);
        let check = validate_settlement(a, b, MoneyCents::new(12_00), &sheet).unwrap();
        assert_eq!(check.overpaid, Some(MoneyCents::new(10_00)));
    }

    #[test]
    fn suggested_maximum_is_the_smaller_side() {
        let (a, b, c) = (Uuid::new_v4(), Uuid::new_v4(), Uuid::new_v4());
        // a owes 30 total but b is only owed 10.
        let sheet = sheet(vec![(a, -30_00), (b, 10_00), (c, 20_00)]);
        let check = validate_settlement(a, b, MoneyCents::new(30_00), &sheet).unwrap();
        assert_eq!(check.overpaid, Some(MoneyCents::new(10_00)));
    }
}
