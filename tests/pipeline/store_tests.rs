//! Group store contract tests.
//!
//! The PostgreSQL test needs a reachable database in `DATABASE_URL` and is
//! ignored by default: `cargo test -- --ignored`.

use pretty_assertions::assert_eq;

use fellow_relay::domain::{Group, GroupRepository};
use fellow_relay::infrastructure::database;
use fellow_relay::infrastructure::repositories::PgGroupRepository;
use fellow_relay::shared::error::RelayError;

use crate::common::InMemoryGroupStore;

async fn assert_store_contract<R: GroupRepository>(store: &R, source: i64) {
    let inserted = store.insert(source, 555).await.unwrap();
    assert_eq!(inserted, Group::new(source, 555));

    let all = store.get_all().await.unwrap();
    assert!(all.contains(&Group::new(source, 555)));

    assert_eq!(
        store.find_by_source(source).await.unwrap(),
        Some(Group::new(source, 555))
    );

    let duplicate = store.insert(source, 999).await.unwrap_err();
    assert!(matches!(
        duplicate,
        RelayError::Conflict { source_group_id } if source_group_id == source
    ));

    // The original destination survives the rejected duplicate.
    assert_eq!(
        store.find_by_source(source).await.unwrap(),
        Some(Group::new(source, 555))
    );
}

#[tokio::test]
async fn test_in_memory_store_contract() {
    let store = InMemoryGroupStore::default();
    assert!(store.get_all().await.unwrap().is_empty());
    assert_store_contract(&store, 100).await;
}

#[tokio::test]
#[ignore = "requires a PostgreSQL database in DATABASE_URL"]
async fn test_postgres_store_contract() {
    let url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set");
    let pool = sqlx::postgres::PgPoolOptions::new()
        .max_connections(2)
        .connect(&url)
        .await
        .unwrap();
    database::run_migrations(&pool).await.unwrap();

    // Unique per run so repeated runs do not collide.
    let source = -chrono::Utc::now().timestamp_micros();
    let store = PgGroupRepository::new(pool.clone());
    assert_store_contract(&store, source).await;

    sqlx::query("DELETE FROM groups WHERE telegram_id = $1")
        .bind(source)
        .execute(&pool)
        .await
        .unwrap();
}
