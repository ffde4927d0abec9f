use sea_orm::{Database, DatabaseConnection};
use uuid::Uuid;

use engine::{
    Currency, Engine, EngineError, MoneyCents, NewExpense, ParticipantInput, ShareSpec, SplitKind,
};
use migration::MigratorTrait;

async fn engine_with_db() -> (Engine, DatabaseConnection) {
    let db = Database::connect("sqlite::memory:").await.unwrap();
    migration::Migrator::up(&db, None).await.unwrap();
    let engine = Engine::builder().database(db.clone()).build();
    (engine, db)
}

/// Group of three with members "ana", "bo" and "cy", in that join order.
async fn trio(engine: &Engine) -> (Uuid, Uuid, Uuid, Uuid) {
    let group_id = engine.new_group("Trip", Some(Currency::Eur)).await.unwrap();
    let a = engine.add_member(group_id, "ana").await.unwrap();
    let b = engine.add_member(group_id, "bo").await.unwrap();
    let c = engine.add_member(group_id, "cy").await.unwrap();
    (group_id, a, b, c)
}

fn equal_expense(paid_by: Uuid, cents: i64, participants: &[Uuid]) -> NewExpense {
    NewExpense {
        description: "Dinner".to_string(),
        amount: MoneyCents::new(cents),
        paid_by,
        kind: SplitKind::Equal,
        participants: participants
            .iter()
            .map(|&member_id| ParticipantInput {
                member_id,
                spec: ShareSpec::Even,
            })
            .collect(),
        category: None,
        note: None,
        occurred_at: None,
    }
}

#[tokio::test]
async fn group_view_lists_members_in_join_order() {
    let (engine, _db) = engine_with_db().await;
    let (group_id, a, b, c) = trio(&engine).await;

    let view = engine.group(group_id).await.unwrap();
    assert_eq!(view.group.name, "Trip");
    assert_eq!(view.group.currency, Currency::Eur);
    let ids: Vec<Uuid> = view.members.iter().map(|m| m.id).collect();
    assert_eq!(ids, vec![a, b, c]);
}

#[tokio::test]
async fn duplicate_member_name_is_rejected() {
    let (engine, _db) = engine_with_db().await;
    let (group_id, ..) = trio(&engine).await;

    let err = engine.add_member(group_id, "ana").await.unwrap_err();
    assert_eq!(err, EngineError::ExistingKey("ana".to_string()));

    // Whitespace-padded duplicates are duplicates too.
    let err = engine.add_member(group_id, "  ana ").await.unwrap_err();
    assert_eq!(err, EngineError::ExistingKey("ana".to_string()));
}

#[tokio::test]
async fn equal_split_balances() {
    let (engine, _db) = engine_with_db().await;
    let (group_id, a, b, c) = trio(&engine).await;

    engine
        .create_expense(group_id, equal_expense(a, 90_00, &[a, b, c]))
        .await
        .unwrap();

    let sheet = engine.balances(group_id).await.unwrap();
    assert_eq!(sheet.balance_of(a), MoneyCents::new(60_00));
    assert_eq!(sheet.balance_of(b), MoneyCents::new(-30_00));
    assert_eq!(sheet.balance_of(c), MoneyCents::new(-30_00));
    assert_eq!(sheet.total_spent, MoneyCents::new(90_00));
    assert!(sheet.residue().is_zero());
}

#[tokio::test]
async fn empty_participants_on_equal_split_means_whole_group() {
    let (engine, _db) = engine_with_db().await;
    let (group_id, a, b, c) = trio(&engine).await;

    let expense = engine
        .create_expense(group_id, equal_expense(a, 30_00, &[]))
        .await
        .unwrap();
    assert_eq!(expense.shares.len(), 3);

    let sheet = engine.balances(group_id).await.unwrap();
    assert_eq!(sheet.balance_of(a), MoneyCents::new(20_00));
    assert_eq!(sheet.balance_of(b), MoneyCents::new(-10_00));
    assert_eq!(sheet.balance_of(c), MoneyCents::new(-10_00));
}

#[tokio::test]
async fn indivisible_amount_gives_remainder_to_first_participants() {
    let (engine, _db) = engine_with_db().await;
    let (group_id, a, b, c) = trio(&engine).await;

    // 100 cents over 3: first participant absorbs the extra cent.
    engine
        .create_expense(group_id, equal_expense(a, 100, &[a, b, c]))
        .await
        .unwrap();

    let sheet = engine.balances(group_id).await.unwrap();
    assert_eq!(sheet.balance_of(a), MoneyCents::new(100 - 34));
    assert_eq!(sheet.balance_of(b), MoneyCents::new(-33));
    assert_eq!(sheet.balance_of(c), MoneyCents::new(-33));
    assert!(sheet.residue().is_zero());
}

#[tokio::test]
async fn percentage_split_must_sum_to_one_hundred() {
    let (engine, _db) = engine_with_db().await;
    let (group_id, a, b, _c) = trio(&engine).await;

    let bad = NewExpense {
        description: "Hotel".to_string(),
        amount: MoneyCents::new(200_00),
        paid_by: a,
        kind: SplitKind::Percentage,
        participants: vec![
            ParticipantInput {
                member_id: a,
                spec: ShareSpec::Percent { percent_bp: 6000 },
            },
            ParticipantInput {
                member_id: b,
                spec: ShareSpec::Percent { percent_bp: 3000 },
            },
        ],
        category: None,
        note: None,
        occurred_at: None,
    };
    let err = engine.create_expense(group_id, bad).await.unwrap_err();
    assert!(matches!(err, EngineError::InvalidAmount(_)));

    let good = NewExpense {
        description: "Hotel".to_string(),
        amount: MoneyCents::new(200_00),
        paid_by: a,
        kind: SplitKind::Percentage,
        participants: vec![
            ParticipantInput {
                member_id: a,
                spec: ShareSpec::Percent { percent_bp: 7000 },
            },
            ParticipantInput {
                member_id: b,
                spec: ShareSpec::Percent { percent_bp: 3000 },
            },
        ],
        category: None,
        note: None,
        occurred_at: None,
    };
    engine.create_expense(group_id, good).await.unwrap();

    let sheet = engine.balances(group_id).await.unwrap();
    assert_eq!(sheet.balance_of(a), MoneyCents::new(60_00));
    assert_eq!(sheet.balance_of(b), MoneyCents::new(-60_00));
}

#[tokio::test]
async fn custom_split_must_sum_to_the_total() {
    let (engine, _db) = engine_with_db().await;
    let (group_id, a, b, c) = trio(&engine).await;

    let custom = |amounts: [(Uuid, i64); 3]| NewExpense {
        description: "Groceries".to_string(),
        amount: MoneyCents::new(100_00),
        paid_by: a,
        kind: SplitKind::Custom,
        participants: amounts
            .into_iter()
            .map(|(member_id, cents)| ParticipantInput {
                member_id,
                spec: ShareSpec::Amount {
                    amount: MoneyCents::new(cents),
                },
            })
            .collect(),
        category: None,
        note: None,
        occurred_at: None,
    };

    let err = engine
        .create_expense(group_id, custom([(a, 50_00), (b, 30_00), (c, 19_99)]))
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::InvalidAmount(_)));

    engine
        .create_expense(group_id, custom([(a, 50_00), (b, 30_00), (c, 20_00)]))
        .await
        .unwrap();

    let sheet = engine.balances(group_id).await.unwrap();
    assert_eq!(sheet.balance_of(a), MoneyCents::new(50_00));
    assert_eq!(sheet.balance_of(b), MoneyCents::new(-30_00));
    assert_eq!(sheet.balance_of(c), MoneyCents::new(-20_00));
}

#[tokio::test]
async fn amounts_beyond_the_cap_are_rejected() {
    let (engine, _db) = engine_with_db().await;
    let (group_id, a, b, c) = trio(&engine).await;

    // Two records at i64::MAX would overflow the payer's running credit if
    // they ever reached the fold; the cap stops them at creation.
    let err = engine
        .create_expense(group_id, equal_expense(a, i64::MAX, &[a, b, c]))
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::InvalidAmount(_)));

    let err = engine
        .create_expense(
            group_id,
            equal_expense(a, MoneyCents::MAX_AMOUNT.cents() + 1, &[a, b, c]),
        )
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::InvalidAmount(_)));

    // Patching an existing record past the cap is rejected too.
    let expense = engine
        .create_expense(group_id, equal_expense(a, 90_00, &[a, b, c]))
        .await
        .unwrap();
    let err = engine
        .update_expense(
            group_id,
            expense.id,
            engine::ExpensePatch {
                amount: Some(MoneyCents::new(i64::MAX)),
                ..Default::default()
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::InvalidAmount(_)));

    // Balances stay sane after the rejected writes.
    let sheet = engine.balances(group_id).await.unwrap();
    assert_eq!(sheet.balance_of(a), MoneyCents::new(60_00));
    assert!(sheet.residue().is_zero());
}

#[tokio::test]
async fn percentages_beyond_one_hundred_are_rejected() {
    let (engine, _db) = engine_with_db().await;
    let (group_id, a, b, _c) = trio(&engine).await;

    // Each weight is bounded; giant values must fail cleanly instead of
    // overflowing the basis-point sum.
    let bad = NewExpense {
        description: "Hotel".to_string(),
        amount: MoneyCents::new(200_00),
        paid_by: a,
        kind: SplitKind::Percentage,
        participants: vec![
            ParticipantInput {
                member_id: a,
                spec: ShareSpec::Percent {
                    percent_bp: i64::MAX / 2,
                },
            },
            ParticipantInput {
                member_id: b,
                spec: ShareSpec::Percent {
                    percent_bp: i64::MAX / 2,
                },
            },
        ],
        category: None,
        note: None,
        occurred_at: None,
    };
    let err = engine.create_expense(group_id, bad).await.unwrap_err();
    assert!(matches!(err, EngineError::InvalidAmount(_)));
}

#[tokio::test]
async fn payer_outside_participants_owes_nothing() {
    let (engine, _db) = engine_with_db().await;
    let (group_id, a, b, c) = trio(&engine).await;

    engine
        .create_expense(group_id, equal_expense(a, 40_00, &[b, c]))
        .await
        .unwrap();

    let sheet = engine.balances(group_id).await.unwrap();
    assert_eq!(sheet.balance_of(a), MoneyCents::new(40_00));
    assert_eq!(sheet.balance_of(b), MoneyCents::new(-20_00));
    assert_eq!(sheet.balance_of(c), MoneyCents::new(-20_00));
}

#[tokio::test]
async fn update_recomputes_balances_from_scratch() {
    let (engine, _db) = engine_with_db().await;
    let (group_id, a, b, c) = trio(&engine).await;

    let expense = engine
        .create_expense(group_id, equal_expense(a, 90_00, &[a, b, c]))
        .await
        .unwrap();

    let updated = engine
        .update_expense(
            group_id,
            expense.id,
            engine::ExpensePatch {
                amount: Some(MoneyCents::new(60_00)),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(updated.amount, MoneyCents::new(60_00));
    assert_eq!(updated.shares.len(), 3);

    let sheet = engine.balances(group_id).await.unwrap();
    assert_eq!(sheet.balance_of(a), MoneyCents::new(40_00));
    assert_eq!(sheet.balance_of(b), MoneyCents::new(-20_00));
    assert_eq!(sheet.balance_of(c), MoneyCents::new(-20_00));
}

#[tokio::test]
async fn delete_reverts_balances() {
    let (engine, _db) = engine_with_db().await;
    let (group_id, a, b, c) = trio(&engine).await;

    let keep = engine
        .create_expense(group_id, equal_expense(a, 30_00, &[a, b, c]))
        .await
        .unwrap();
    let gone = engine
        .create_expense(group_id, equal_expense(b, 90_00, &[a, b, c]))
        .await
        .unwrap();

    engine.delete_expense(group_id, gone.id).await.unwrap();

    let history = engine.expenses(group_id).await.unwrap();
    assert_eq!(history.len(), 1);
    assert_eq!(history[0].id, keep.id);

    let sheet = engine.balances(group_id).await.unwrap();
    assert_eq!(sheet.balance_of(a), MoneyCents::new(20_00));
    assert_eq!(sheet.balance_of(b), MoneyCents::new(-10_00));
    assert_eq!(sheet.balance_of(c), MoneyCents::new(-10_00));
    assert_eq!(sheet.total_spent, MoneyCents::new(30_00));
}

#[tokio::test]
async fn suggested_plan_zeroes_every_balance() {
    let (engine, _db) = engine_with_db().await;
    let (group_id, a, b, c) = trio(&engine).await;

    engine
        .create_expense(group_id, equal_expense(a, 90_00, &[a, b, c]))
        .await
        .unwrap();

    let plan = engine.suggest_settlements(group_id).await.unwrap();
    assert_eq!(plan.len(), 2);
    for payment in &plan {
        assert_eq!(payment.to, a);
        assert_eq!(payment.amount, MoneyCents::new(30_00));
    }
    // Both debtors owe the same; join order breaks the tie.
    assert_eq!(plan[0].from, b);
    assert_eq!(plan[1].from, c);
}

#[tokio::test]
async fn recorded_settlement_settles_the_debt() {
    let (engine, _db) = engine_with_db().await;
    let (group_id, a, b, c) = trio(&engine).await;

    engine
        .create_expense(group_id, equal_expense(a, 90_00, &[a, b, c]))
        .await
        .unwrap();

    let recorded = engine
        .record_settlement(group_id, b, a, MoneyCents::new(30_00))
        .await
        .unwrap();
    assert!(recorded.overpaid.is_none());
    assert!(recorded.expense.is_settlement());

    let sheet = engine.balances(group_id).await.unwrap();
    assert_eq!(sheet.balance_of(a), MoneyCents::new(30_00));
    assert_eq!(sheet.balance_of(b), MoneyCents::ZERO);
    assert_eq!(sheet.balance_of(c), MoneyCents::new(-30_00));
    // Settlements do not count as spending.
    assert_eq!(sheet.total_spent, MoneyCents::new(90_00));
}

#[tokio::test]
async fn overpaid_settlement_is_accepted_with_a_hint() {
    let (engine, _db) = engine_with_db().await;
    let (group_id, a, b, c) = trio(&engine).await;

    engine
        .create_expense(group_id, equal_expense(a, 90_00, &[a, b, c]))
        .await
        .unwrap();

    let recorded = engine
        .record_settlement(group_id, b, a, MoneyCents::new(50_00))
        .await
        .unwrap();
    assert_eq!(recorded.overpaid, Some(MoneyCents::new(30_00)));

    let sheet = engine.balances(group_id).await.unwrap();
    assert_eq!(sheet.balance_of(b), MoneyCents::new(20_00));
}

#[tokio::test]
async fn invalid_settlements_are_rejected() {
    let (engine, _db) = engine_with_db().await;
    let (group_id, a, b, c) = trio(&engine).await;

    engine
        .create_expense(group_id, equal_expense(a, 90_00, &[a, b, c]))
        .await
        .unwrap();

    let err = engine
        .record_settlement(group_id, b, b, MoneyCents::new(10_00))
        .await
        .unwrap_err();
    assert_eq!(err, EngineError::SelfSettlement { member: b });

    let err = engine
        .record_settlement(group_id, b, a, MoneyCents::ZERO)
        .await
        .unwrap_err();
    assert_eq!(err, EngineError::NonPositiveAmount(0));

    // The payer is owed money, not owing.
    let err = engine
        .record_settlement(group_id, a, b, MoneyCents::new(10_00))
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::NoDebt { member, .. } if member == a));

    // The receiver owes money, not owed.
    let err = engine
        .record_settlement(group_id, b, c, MoneyCents::new(10_00))
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::NotOwed { member, .. } if member == c));
}

#[tokio::test]
async fn settlement_records_cannot_be_edited_or_created_directly() {
    let (engine, _db) = engine_with_db().await;
    let (group_id, a, b, c) = trio(&engine).await;

    engine
        .create_expense(group_id, equal_expense(a, 90_00, &[a, b, c]))
        .await
        .unwrap();
    let recorded = engine
        .record_settlement(group_id, b, a, MoneyCents::new(30_00))
        .await
        .unwrap();

    let err = engine
        .update_expense(
            group_id,
            recorded.expense.id,
            engine::ExpensePatch {
                amount: Some(MoneyCents::new(10_00)),
                ..Default::default()
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::InvalidSplitKind(_)));

    let mut direct = equal_expense(b, 10_00, &[a]);
    direct.kind = SplitKind::Settlement;
    let err = engine.create_expense(group_id, direct).await.unwrap_err();
    assert!(matches!(err, EngineError::InvalidSplitKind(_)));
}

#[tokio::test]
async fn outsiders_cannot_pay_or_participate() {
    let (engine, _db) = engine_with_db().await;
    let (group_id, a, b, _c) = trio(&engine).await;

    let other_group = engine.new_group("Other", None).await.unwrap();
    let outsider = engine.add_member(other_group, "zed").await.unwrap();

    let err = engine
        .create_expense(group_id, equal_expense(outsider, 10_00, &[a, b]))
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::KeyNotFound(_)));

    let err = engine
        .create_expense(group_id, equal_expense(a, 10_00, &[a, outsider]))
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::KeyNotFound(_)));
}

#[tokio::test]
async fn deleting_a_group_removes_its_history() {
    let (engine, _db) = engine_with_db().await;
    let (group_id, a, b, c) = trio(&engine).await;

    engine
        .create_expense(group_id, equal_expense(a, 90_00, &[a, b, c]))
        .await
        .unwrap();
    engine.delete_group(group_id).await.unwrap();

    let err = engine.group(group_id).await.unwrap_err();
    assert!(matches!(err, EngineError::KeyNotFound(_)));
    let err = engine.expenses(group_id).await.unwrap_err();
    assert!(matches!(err, EngineError::KeyNotFound(_)));
}

#[tokio::test]
async fn settle_up_round_trip_reaches_zero() {
    let (engine, _db) = engine_with_db().await;
    let (group_id, a, b, c) = trio(&engine).await;

    engine
        .create_expense(group_id, equal_expense(a, 90_00, &[a, b, c]))
        .await
        .unwrap();
    engine
        .create_expense(group_id, equal_expense(b, 30_00, &[b, c]))
        .await
        .unwrap();

    // Record every suggested payment; afterwards nothing is owed.
    let plan = engine.suggest_settlements(group_id).await.unwrap();
    for payment in plan {
        engine
            .record_settlement(group_id, payment.from, payment.to, payment.amount)
            .await
            .unwrap();
    }

    let sheet = engine.balances(group_id).await.unwrap();
    for entry in sheet.entries() {
        assert_eq!(entry.amount, MoneyCents::ZERO);
    }
    assert!(engine.suggest_settlements(group_id).await.unwrap().is_empty());
}
