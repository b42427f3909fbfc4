use chrono::NaiveDate;
use sea_orm::Database;

use engine::{
    Currency, Engine, EngineError, FilterCriteria, Grouping, MoneyMinor, NewExpense, Role,
    Session, aggregate_by, grand_total,
};
use migration::MigratorTrait;

async fn engine_with_session() -> (Engine, Session) {
    let db = Database::connect("sqlite::memory:").await.unwrap();
    migration::Migrator::up(&db, None).await.unwrap();
    let engine = Engine::builder().database(db).build().await.unwrap();
    let (user, _token) = engine
        .create_user("ann@example.com", "Ann", "password", Role::User)
        .await
        .unwrap();
    (engine, user.session())
}

fn date(d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 6, d).unwrap()
}

fn new_expense(d: u32, minor: i64, currency: Currency) -> NewExpense {
    NewExpense {
        expense_date: date(d),
        amount: MoneyMinor::new(minor),
        currency,
        description: "test".to_string(),
        payment_method: None,
        supplier_id: None,
        category_id: None,
        payer_id: None,
    }
}

#[tokio::test]
async fn add_list_and_remove_round_trip() {
    let (engine, session) = engine_with_session().await;

    let added = engine
        .add_expense(&session, new_expense(1, 100_00, Currency::Usd))
        .await
        .unwrap();
    assert!(added.is_active());
    assert_eq!(added.added_by_name, "Ann");
    assert_eq!(added.user_name, "Ann");

    engine
        .add_expense(&session, new_expense(2, 135_00, Currency::Bwp))
        .await
        .unwrap();

    let listed = engine.list_expenses(&FilterCriteria::default()).await.unwrap();
    assert_eq!(listed.len(), 2);
    // Newest expense date first.
    assert_eq!(listed[0].expense_date, date(2));

    engine.remove_expense(&session, added.id).await.unwrap();

    // The default raw list keeps the removed record visible: length is
    // unchanged and the removal is stamped on the row.
    let all = engine.list_expenses(&FilterCriteria::default()).await.unwrap();
    assert_eq!(all.len(), 2);
    let gone = all.iter().find(|r| r.id == added.id).unwrap();
    assert!(gone.removed_at.is_some());
    assert_eq!(gone.removed_by_name.as_deref(), Some("Ann"));

    // Opting out hides it.
    let active = engine
        .list_expenses(&FilterCriteria {
            include_removed: false,
            ..Default::default()
        })
        .await
        .unwrap();
    assert_eq!(active.len(), 1);
}

#[tokio::test]
async fn removing_twice_is_an_error() {
    let (engine, session) = engine_with_session().await;
    let added = engine
        .add_expense(&session, new_expense(1, 10_00, Currency::Usd))
        .await
        .unwrap();

    engine.remove_expense(&session, added.id).await.unwrap();
    let err = engine.remove_expense(&session, added.id).await.unwrap_err();
    assert!(matches!(err, EngineError::ExistingKey(_)));

    let err = engine.remove_expense(&session, 9999).await.unwrap_err();
    assert!(matches!(err, EngineError::KeyNotFound(_)));
}

#[tokio::test]
async fn removal_drops_the_grand_total_by_the_converted_amount() {
    let (engine, session) = engine_with_session().await;
    engine
        .add_expense(&session, new_expense(1, 100_00, Currency::Usd))
        .await
        .unwrap();
    let bwp = engine
        .add_expense(&session, new_expense(2, 135_00, Currency::Bwp))
        .await
        .unwrap();

    let before = engine.summary_total(13.5).await.unwrap();
    assert!((before.total_usd_equiv - 110_00.0).abs() < 1e-6);

    engine.remove_expense(&session, bwp.id).await.unwrap();

    let after = engine.summary_total(13.5).await.unwrap();
    assert!((before.total_usd_equiv - after.total_usd_equiv - 10_00.0).abs() < 1e-6);
}

#[tokio::test]
async fn sql_aggregates_match_the_pure_fold() {
    let (engine, session) = engine_with_session().await;
    let acme = engine.create_supplier("Acme").await.unwrap();
    let beta = engine.create_supplier("Beta").await.unwrap();

    let mut cmd = new_expense(1, 100_00, Currency::Usd);
    cmd.supplier_id = Some(acme.id);
    engine.add_expense(&session, cmd).await.unwrap();

    let mut cmd = new_expense(2, 135_00, Currency::Bwp);
    cmd.supplier_id = Some(acme.id);
    engine.add_expense(&session, cmd).await.unwrap();

    let mut cmd = new_expense(3, 50_00, Currency::Usd);
    cmd.supplier_id = Some(beta.id);
    engine.add_expense(&session, cmd).await.unwrap();

    let removed = engine
        .add_expense(&session, new_expense(4, 77_00, Currency::Usd))
        .await
        .unwrap();
    engine.remove_expense(&session, removed.id).await.unwrap();

    let records = engine.list_expenses(&FilterCriteria::default()).await.unwrap();

    let rate = 13.5;
    let mut pure = aggregate_by(&records, Grouping::Supplier, rate);
    let mut sql = engine.totals_by_supplier(rate).await.unwrap();
    pure.sort_by(|a, b| a.label.cmp(&b.label));
    sql.sort_by(|a, b| a.label.cmp(&b.label));
    assert_eq!(pure.len(), sql.len());
    for (p, s) in pure.iter().zip(&sql) {
        assert_eq!(p.label, s.label);
        assert_eq!(p.total_usd, s.total_usd);
        assert_eq!(p.total_bwp, s.total_bwp);
        assert!((p.total_usd_equiv - s.total_usd_equiv).abs() < 1e-6);
    }

    let pure_total = grand_total(&records, rate);
    let sql_total = engine.summary_total(rate).await.unwrap();
    assert_eq!(pure_total.total_usd, sql_total.total_usd);
    assert_eq!(pure_total.total_bwp, sql_total.total_bwp);
}

#[tokio::test]
async fn audit_log_records_adds_and_removes_newest_first() {
    let (engine, session) = engine_with_session().await;
    let first = engine
        .add_expense(&session, new_expense(1, 10_00, Currency::Usd))
        .await
        .unwrap();
    engine
        .add_expense(&session, new_expense(2, 20_00, Currency::Usd))
        .await
        .unwrap();
    engine.remove_expense(&session, first.id).await.unwrap();

    let entries = engine.list_audit(50).await.unwrap();
    assert_eq!(entries.len(), 3);
    assert_eq!(entries[0].action, engine::AuditAction::Removed);
    assert_eq!(entries[0].expense_id, first.id);
    assert_eq!(entries[0].amount, MoneyMinor::new(10_00));
    assert!(entries[1..]
        .iter()
        .all(|e| e.action == engine::AuditAction::Added));
}

#[tokio::test]
async fn receipts_replace_as_an_opaque_list() {
    let (engine, session) = engine_with_session().await;
    let added = engine
        .add_expense(&session, new_expense(1, 10_00, Currency::Usd))
        .await
        .unwrap();
    assert!(added.receipt_urls.is_empty());

    let urls = vec!["https://files/a.jpg".to_string(), "data:image/png;base64,AAAA".to_string()];
    let updated = engine
        .update_receipts(&session, added.id, urls.clone())
        .await
        .unwrap();
    assert_eq!(updated.receipt_urls, urls);

    let cleared = engine
        .update_receipts(&session, added.id, Vec::new())
        .await
        .unwrap();
    assert!(cleared.receipt_urls.is_empty());
}

#[tokio::test]
async fn metadata_dedup_is_unicode_aware() {
    let (engine, _session) = engine_with_session().await;
    engine.create_supplier("Caf\u{e9} X").await.unwrap();
    let err = engine.create_supplier("cafe\u{301} x").await.unwrap_err();
    assert!(matches!(err, EngineError::ExistingKey(_)));

    let listed = engine.list_suppliers().await.unwrap();
    assert_eq!(listed.len(), 1);
}

#[tokio::test]
async fn bulk_import_creates_metadata_and_counts_skips() {
    let (engine, session) = engine_with_session().await;
    let csv = "date,amount,currency,category,supplier,description\r\n\
               2025-06-01,50.00,USD,Food,Acme,Lunch\r\n\
               2025-06-02,135,BWP,Food,,Taxi\r\n\
               bad-date,1,USD,,,broken\r\n";
    let report = engine.import_expenses(&session, csv.as_bytes()).await.unwrap();
    assert_eq!(report.added, 2);
    assert_eq!(report.skipped, 1);

    let records = engine.list_expenses(&FilterCriteria::default()).await.unwrap();
    assert_eq!(records.len(), 2);
    assert!(records.iter().any(|r| r.supplier_name.as_deref() == Some("Acme")));

    let categories = engine.list_categories().await.unwrap();
    assert_eq!(categories.len(), 1);
    assert_eq!(categories[0].name, "Food");
}
