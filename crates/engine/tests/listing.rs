use chrono::{DateTime, TimeZone, Utc};
use sea_orm::Database;
use uuid::Uuid;

use engine::{
    CreateAccountCmd, CreateCategoryCmd, CreateTransactionCmd, Engine, EngineError, MoneyCents,
    TransactionKind, TransactionListFilter, UpdateAccountCmd, UpdateCategoryCmd,
};
use migration::MigratorTrait;

async fn engine_with_db() -> Engine {
    let db = Database::connect("sqlite::memory:").await.unwrap();
    migration::Migrator::up(&db, None).await.unwrap();
    let engine = Engine::builder().database(db).build().await.unwrap();
    engine
        .sync_user("alice", "alice@example.com", None)
        .await
        .unwrap();
    engine
}

fn day(d: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 5, d, 9, 30, 0).unwrap()
}

async fn record(
    engine: &Engine,
    account_id: Uuid,
    amount: i64,
    kind: TransactionKind,
    date: DateTime<Utc>,
) -> Uuid {
    engine
        .create_transaction(CreateTransactionCmd::new(
            "alice",
            account_id,
            MoneyCents::new(amount),
            kind,
            date,
        ))
        .await
        .unwrap()
        .id
}

#[tokio::test]
async fn account_requires_user_record() {
    let engine = engine_with_db().await;
    let res = engine
        .create_account(CreateAccountCmd::new("ghost", "Checking", "#fff", "bank"))
        .await;
    assert_eq!(
        res,
        Err(EngineError::InvalidReference("user record not found".to_string()))
    );

    let res = engine
        .create_account(CreateAccountCmd::new("alice", "   ", "#fff", "bank"))
        .await;
    assert!(matches!(res, Err(EngineError::InvalidName(_))));
}

#[tokio::test]
async fn accounts_are_listed_by_name_and_editable() {
    let engine = engine_with_db().await;
    let savings = engine
        .create_account(CreateAccountCmd::new("alice", "Savings", "#0f0", "piggy"))
        .await
        .unwrap();
    engine
        .create_account(CreateAccountCmd::new("alice", "Checking", "#00f", "bank"))
        .await
        .unwrap();

    let names: Vec<String> = engine
        .accounts("alice")
        .await
        .unwrap()
        .into_iter()
        .map(|a| a.name)
        .collect();
    assert_eq!(names, vec!["Checking", "Savings"]);

    let renamed = engine
        .update_account(
            "alice",
            savings.id,
            UpdateAccountCmd {
                name: Some(" Rainy day ".to_string()),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(renamed.name, "Rainy day");
    assert_eq!(renamed.color, "#0f0");
    assert_eq!(renamed.balance, MoneyCents::ZERO);

    let unchanged = engine
        .update_account("alice", savings.id, UpdateAccountCmd::default())
        .await
        .unwrap();
    assert_eq!(unchanged.name, "Rainy day");
}

#[tokio::test]
async fn list_pages_newest_first_with_filters() {
    let engine = engine_with_db().await;
    let account = engine
        .create_account(CreateAccountCmd::new("alice", "Checking", "#fff", "bank"))
        .await
        .unwrap();

    for d in 1..=5 {
        record(&engine, account.id, 1_000 * i64::from(d), TransactionKind::Income, day(d)).await;
    }
    record(&engine, account.id, 300, TransactionKind::Expense, day(3)).await;

    let first = engine
        .list_transactions("alice", &TransactionListFilter::default(), 1, 4)
        .await
        .unwrap();
    assert_eq!(first.total, 6);
    assert_eq!(first.total_pages, 2);
    assert_eq!(first.items.len(), 4);
    assert_eq!(first.items[0].transaction.date, day(5));
    assert_eq!(first.items[0].account_name, "Checking");
    assert!(
        first
            .items
            .windows(2)
            .all(|w| w[0].transaction.date >= w[1].transaction.date)
    );

    let second = engine
        .list_transactions("alice", &TransactionListFilter::default(), 2, 4)
        .await
        .unwrap();
    assert_eq!(second.items.len(), 2);
    assert_eq!(second.page, 2);

    let expenses = engine
        .list_transactions(
            "alice",
            &TransactionListFilter {
                kind: Some(TransactionKind::Expense),
                ..Default::default()
            },
            1,
            10,
        )
        .await
        .unwrap();
    assert_eq!(expenses.total, 1);
    assert_eq!(expenses.items[0].transaction.amount, MoneyCents::new(300));

    let window = engine
        .list_transactions(
            "alice",
            &TransactionListFilter {
                from: Some(day(2)),
                to: Some(day(3)),
                kind: None,
            },
            1,
            10,
        )
        .await
        .unwrap();
    assert_eq!(window.total, 3);

    let beyond = engine
        .list_transactions("alice", &TransactionListFilter::default(), 9, 4)
        .await
        .unwrap();
    assert!(beyond.items.is_empty());
    assert_eq!(beyond.total, 6);
}

#[tokio::test]
async fn list_rejects_bad_paging_and_ranges() {
    let engine = engine_with_db().await;
    let filter = TransactionListFilter::default();
    assert!(matches!(
        engine.list_transactions("alice", &filter, 0, 10).await,
        Err(EngineError::InvalidRange(_))
    ));
    assert!(matches!(
        engine.list_transactions("alice", &filter, 1, 101).await,
        Err(EngineError::InvalidRange(_))
    ));
    let inverted = TransactionListFilter {
        from: Some(day(4)),
        to: Some(day(1)),
        kind: None,
    };
    assert!(matches!(
        engine.list_transactions("alice", &inverted, 1, 10).await,
        Err(EngineError::InvalidRange(_))
    ));
}

#[tokio::test]
async fn list_includes_category_and_tags() {
    let engine = engine_with_db().await;
    let account = engine
        .create_account(CreateAccountCmd::new("alice", "Checking", "#fff", "bank"))
        .await
        .unwrap();
    let food = engine
        .create_category(
            CreateCategoryCmd::new("alice", "Food", TransactionKind::Expense)
                .color("#f00")
                .icon("fork"),
        )
        .await
        .unwrap();
    let a = engine.create_tag("alice", "b-tag").await.unwrap();
    let b = engine.create_tag("alice", "a-tag").await.unwrap();

    engine
        .create_transaction(
            CreateTransactionCmd::new(
                "alice",
                account.id,
                MoneyCents::new(1_250),
                TransactionKind::Expense,
                day(1),
            )
            .category_id(food.id)
            .tag_ids(vec![a.id, b.id]),
        )
        .await
        .unwrap();

    let page = engine
        .list_transactions("alice", &TransactionListFilter::default(), 1, 10)
        .await
        .unwrap();
    let item = &page.items[0];
    assert_eq!(item.category.as_ref().map(|c| c.name.as_str()), Some("Food"));
    let tag_names: Vec<&str> = item.tags.iter().map(|t| t.name.as_str()).collect();
    assert_eq!(tag_names, vec!["a-tag", "b-tag"]);
}

#[tokio::test]
async fn summary_totals_income_expense_and_balances() {
    let engine = engine_with_db().await;
    let checking = engine
        .create_account(
            CreateAccountCmd::new("alice", "Checking", "#fff", "bank")
                .opening_balance(MoneyCents::new(10_000)),
        )
        .await
        .unwrap();
    let cash = engine
        .create_account(CreateAccountCmd::new("alice", "Cash", "#fff", "coins"))
        .await
        .unwrap();

    record(&engine, checking.id, 5_000, TransactionKind::Income, day(2)).await;
    record(&engine, checking.id, 1_500, TransactionKind::Expense, day(3)).await;
    record(&engine, cash.id, 500, TransactionKind::Expense, day(10)).await;

    let all = engine.dashboard_summary("alice", None, None).await.unwrap();
    assert_eq!(all.total_income, MoneyCents::new(5_000));
    assert_eq!(all.total_expense, MoneyCents::new(2_000));
    assert_eq!(all.total_balance, MoneyCents::new(13_000));
    assert_eq!(all.accounts.len(), 2);
    assert_eq!(all.accounts[0].name, "Cash");
    assert_eq!(all.accounts[0].balance, MoneyCents::new(-500));

    let early = engine
        .dashboard_summary("alice", Some(day(1)), Some(day(5)))
        .await
        .unwrap();
    assert_eq!(early.total_income, MoneyCents::new(5_000));
    assert_eq!(early.total_expense, MoneyCents::new(1_500));
    assert_eq!(early.total_balance, MoneyCents::new(13_000));

    let empty = engine
        .dashboard_summary("alice", Some(day(20)), Some(day(25)))
        .await
        .unwrap();
    assert_eq!(empty.total_income, MoneyCents::ZERO);
    assert_eq!(empty.total_expense, MoneyCents::ZERO);
}

#[tokio::test]
async fn categories_and_tags_crud() {
    let engine = engine_with_db().await;
    let salary = engine
        .create_category(CreateCategoryCmd::new("alice", "Salary", TransactionKind::Income))
        .await
        .unwrap();
    assert_eq!(salary.color, None);

    let updated = engine
        .update_category(
            "alice",
            salary.id,
            UpdateCategoryCmd {
                name: Some("Wages".to_string()),
                color: Some("#abc".to_string()),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(updated.name, "Wages");
    assert_eq!(updated.color.as_deref(), Some("#abc"));
    assert_eq!(updated.kind, TransactionKind::Income);
    assert_eq!(engine.categories("alice").await.unwrap().len(), 1);

    assert_eq!(
        engine
            .update_category("bob", salary.id, UpdateCategoryCmd::default())
            .await,
        Err(EngineError::NotFound("category".to_string()))
    );

    let tag = engine.create_tag("alice", " trip ").await.unwrap();
    assert_eq!(tag.name, "trip");
    let renamed = engine.rename_tag("alice", tag.id, "holiday").await.unwrap();
    assert_eq!(renamed.name, "holiday");
    assert!(matches!(
        engine.rename_tag("alice", tag.id, "").await,
        Err(EngineError::InvalidName(_))
    ));
    engine.delete_tag("alice", tag.id).await.unwrap();
    assert!(engine.tags("alice").await.unwrap().is_empty());
    assert_eq!(
        engine.delete_tag("alice", tag.id).await,
        Err(EngineError::NotFound("tag".to_string()))
    );
}

#[tokio::test]
async fn user_sync_upserts() {
    let engine = engine_with_db().await;
    let user = engine
        .sync_user("alice", "new@example.com", Some(" Alice "))
        .await
        .unwrap();
    assert_eq!(user.email, "new@example.com");
    assert_eq!(user.name.as_deref(), Some("Alice"));
    assert_eq!(engine.user("alice").await.unwrap().email, "new@example.com");
    assert!(matches!(
        engine.sync_user("carol", " ", None).await,
        Err(EngineError::InvalidName(_))
    ));
}
