use linkcut::domain::repositories::TokenRepository;
use linkcut::error::AppError;
use linkcut::infrastructure::persistence::PgTokenRepository;
use sqlx::PgPool;
use std::sync::Arc;

#[sqlx::test]
#[ignore = "requires PostgreSQL"]
async fn test_create_token(pool: PgPool) {
    let repo = PgTokenRepository::new(Arc::new(pool));

    let token = repo.create_token("test-token", "hash123", 42).await.unwrap();

    assert_eq!(token.name, "test-token");
    assert_eq!(token.token_hash, "hash123");
    assert_eq!(token.owner_id, 42);
    assert!(token.revoked_at.is_none());
}

#[sqlx::test]
#[ignore = "requires PostgreSQL"]
async fn test_create_duplicate_name_is_conflict(pool: PgPool) {
    let repo = PgTokenRepository::new(Arc::new(pool));

    repo.create_token("dup", "hash-a", 1).await.unwrap();
    let result = repo.create_token("dup", "hash-b", 1).await;

    assert!(matches!(result, Err(AppError::Conflict { .. })));
}

#[sqlx::test]
#[ignore = "requires PostgreSQL"]
async fn test_validate_token_returns_owner(pool: PgPool) {
    let repo = PgTokenRepository::new(Arc::new(pool));

    repo.create_token("valid-token", "validhash", 7).await.unwrap();

    assert_eq!(repo.validate_token("validhash").await.unwrap(), Some(7));
}

#[sqlx::test]
#[ignore = "requires PostgreSQL"]
async fn test_validate_token_invalid(pool: PgPool) {
    let repo = PgTokenRepository::new(Arc::new(pool));

    assert_eq!(repo.validate_token("nonexistent").await.unwrap(), None);
}

#[sqlx::test]
#[ignore = "requires PostgreSQL"]
async fn test_validate_token_revoked(pool: PgPool) {
    let repo = PgTokenRepository::new(Arc::new(pool));

    let token = repo
        .create_token("revoked-token", "revokedhash", 3)
        .await
        .unwrap();
    assert!(repo.revoke_token(token.id).await.unwrap());
    assert!(!repo.revoke_token(token.id).await.unwrap());

    assert_eq!(repo.validate_token("revokedhash").await.unwrap(), None);
}

#[sqlx::test]
#[ignore = "requires PostgreSQL"]
async fn test_update_last_used(pool: PgPool) {
    let repo = PgTokenRepository::new(Arc::new(pool));

    repo.create_token("used-token", "usedhash", 1).await.unwrap();
    repo.update_last_used("usedhash").await.unwrap();

    let token = repo.find_by_name("used-token").await.unwrap().unwrap();
    assert!(token.last_used_at.is_some());
}

#[sqlx::test]
#[ignore = "requires PostgreSQL"]
async fn test_list_tokens(pool: PgPool) {
    let repo = PgTokenRepository::new(Arc::new(pool));

    repo.create_token("token1", "hash1", 1).await.unwrap();
    repo.create_token("token2", "hash2", 2).await.unwrap();

    let tokens = repo.list_tokens().await.unwrap();
    assert_eq!(tokens.len(), 2);
}
