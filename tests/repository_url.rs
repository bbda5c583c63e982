use linkcut::domain::entities::NewUrlRecord;
use linkcut::domain::repositories::UrlRepository;
use linkcut::error::AppError;
use linkcut::infrastructure::persistence::PgUrlRepository;
use sqlx::PgPool;
use std::sync::Arc;
use std::time::Duration;

fn repo(pool: PgPool) -> PgUrlRepository {
    PgUrlRepository::new(Arc::new(pool), Duration::from_secs(5))
}

fn new_record(code: &str, owner_id: Option<i64>) -> NewUrlRecord {
    NewUrlRecord {
        short_code: code.to_string(),
        original_url: format!("https://example.com/{code}"),
        owner_id,
        expires_at: None,
    }
}

#[sqlx::test]
#[ignore = "requires PostgreSQL"]
async fn test_insert_and_get(pool: PgPool) {
    let repo = repo(pool);

    let inserted = repo.insert(new_record("abc1234", None)).await.unwrap();
    assert_eq!(inserted.click_count, 0);

    let found = repo.get_by_code("abc1234").await.unwrap().unwrap();
    assert_eq!(found, inserted);
}

#[sqlx::test]
#[ignore = "requires PostgreSQL"]
async fn test_insert_duplicate_is_conflict(pool: PgPool) {
    let repo = repo(pool);

    repo.insert(new_record("dup1234", None)).await.unwrap();
    let result = repo.insert(new_record("dup1234", Some(1))).await;

    assert!(matches!(result, Err(AppError::Conflict { .. })));
}

#[sqlx::test]
#[ignore = "requires PostgreSQL"]
async fn test_expired_record_is_hidden_but_reserved(pool: PgPool) {
    let repo = repo(pool.clone());
    sqlx::query(
        "INSERT INTO urls (short_code, original_url, expires_at) VALUES ($1, $2, NOW() - INTERVAL '1 hour')",
    )
    .bind("expired1")
    .bind("https://example.com/old")
    .execute(&pool)
    .await
    .unwrap();

    assert!(repo.get_by_code("expired1").await.unwrap().is_none());
    assert!(repo.exists("expired1").await.unwrap());
}

#[sqlx::test]
#[ignore = "requires PostgreSQL"]
async fn test_increment_clicks(pool: PgPool) {
    let repo = repo(pool);
    repo.insert(new_record("click12", None)).await.unwrap();

    for _ in 0..3 {
        repo.increment_clicks("click12").await.unwrap();
    }

    let record = repo.get_by_code("click12").await.unwrap().unwrap();
    assert_eq!(record.click_count, 3);
}

#[sqlx::test]
#[ignore = "requires PostgreSQL"]
async fn test_concurrent_increments_are_not_lost(pool: PgPool) {
    let repo = Arc::new(repo(pool));
    repo.insert(new_record("race123", None)).await.unwrap();

    let handles: Vec<_> = (0..20)
        .map(|_| {
            let repo = repo.clone();
            tokio::spawn(async move { repo.increment_clicks("race123").await })
        })
        .collect();
    for handle in handles {
        handle.await.unwrap().unwrap();
    }

    let record = repo.get_by_code("race123").await.unwrap().unwrap();
    assert_eq!(record.click_count, 20);
}

#[sqlx::test]
#[ignore = "requires PostgreSQL"]
async fn test_increment_unknown_code(pool: PgPool) {
    let repo = repo(pool);

    let result = repo.increment_clicks("missing1").await;

    assert!(matches!(result, Err(AppError::NotFound { .. })));
}

#[sqlx::test]
#[ignore = "requires PostgreSQL"]
async fn test_list_by_owner(pool: PgPool) {
    let repo = repo(pool);
    repo.insert(new_record("own1111", Some(7))).await.unwrap();
    repo.insert(new_record("own2222", Some(7))).await.unwrap();
    repo.insert(new_record("other11", Some(8))).await.unwrap();
    repo.insert(new_record("anon111", None)).await.unwrap();

    let records = repo.list_by_owner(7).await.unwrap();

    assert_eq!(records.len(), 2);
    assert_eq!(records[0].short_code, "own2222");
    assert_eq!(records[1].short_code, "own1111");
}

#[sqlx::test]
#[ignore = "requires PostgreSQL"]
async fn test_ping(pool: PgPool) {
    assert!(repo(pool).ping().await.is_ok());
}
