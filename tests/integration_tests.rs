//! End-to-end integration tests

use chrono::{Duration, Utc};
use tempfile::TempDir;

use token_manager::perms::{StaticTags, TagResolver, TAG_ADMIN, TAG_LIST};
use token_manager::storage::models::Token;
use token_manager::storage::Database;
use token_manager::tokens::{self, CreateParams, TokenError};
use token_manager::expiration;

fn setup_db() -> (Database, TempDir) {
    let temp_dir = TempDir::new().unwrap();
    let db = Database::open(temp_dir.path()).unwrap();
    (db, temp_dir)
}

fn make_token(id: &str, owner: &str, uses: i64) -> Token {
    let now = Utc::now();
    Token {
        created_at: now,
        deadline: now + Duration::hours(24),
        id: id.to_string(),
        last_used_at: None,
        metadata: None,
        owner: owner.to_string(),
        uses_remaining: uses,
    }
}

fn deny_all() -> TagResolver {
    TagResolver::Static(StaticTags::new())
}

#[tokio::test]
async fn test_token_lifecycle() {
    let (db, _temp) = setup_db();
    let resolver = deny_all();

    // Create a two-use token
    let id = tokens::create(
        &db,
        &resolver,
        "alice",
        CreateParams {
            deadline: Utc::now() + Duration::hours(1),
            impersonate: None,
            metadata: Some(serde_json::json!({"purpose": "ci"})),
            uses: Some(2),
        },
    )
    .await
    .unwrap();

    // Spend both uses
    let token = tokens::redeem(&db, &id).unwrap();
    assert_eq!(token.uses_remaining, 1);
    let token = tokens::redeem(&db, &id).unwrap();
    assert_eq!(token.uses_remaining, 0);

    // Exhausted
    assert!(matches!(
        tokens::redeem(&db, &id),
        Err(TokenError::InvalidToken)
    ));

    // The dead row disappears on the next sweep
    assert_eq!(expiration::sweep(&db).unwrap(), 1);
    assert!(db.get_token(&id).unwrap().is_none());
}

#[tokio::test]
async fn test_otp_flow() {
    let (db, _temp) = setup_db();

    let id = tokens::otp(&db, "alice", 3600).unwrap();

    let token = tokens::redeem(&db, &id).unwrap();
    assert_eq!(token.owner, "alice");
    assert_eq!(token.uses_remaining, 0);

    // Single-use: the second redemption fails
    assert!(matches!(
        tokens::redeem(&db, &id),
        Err(TokenError::InvalidToken)
    ));
}

#[tokio::test]
async fn test_consume_then_clear() {
    let (db, _temp) = setup_db();

    let id = tokens::otp(&db, "alice", 3600).unwrap();
    let snapshot = tokens::consume(&db, &id).unwrap();
    assert_eq!(snapshot.uses_remaining, 0);

    // Still listed until swept
    assert_eq!(db.tokens_by_owner("alice").unwrap().len(), 1);

    assert_eq!(expiration::sweep(&db).unwrap(), 1);
    assert!(db.tokens_by_owner("alice").unwrap().is_empty());

    // Consume is not idempotent
    assert!(matches!(
        tokens::consume(&db, &id),
        Err(TokenError::InvalidToken)
    ));
}

#[tokio::test]
async fn test_sweep_scenario() {
    let (db, _temp) = setup_db();
    let now = Utc::now();

    let mut a = make_token("a", "alice", 0);
    a.deadline = now + Duration::hours(1);
    db.insert_token(&a).unwrap();

    let mut b = make_token("b", "alice", 1);
    b.deadline = now - Duration::hours(1);
    db.insert_token(&b).unwrap();

    let c = make_token("c", "alice", 1);
    db.insert_token(&c).unwrap();

    assert_eq!(expiration::sweep(&db).unwrap(), 2);
    assert!(db.get_token("a").unwrap().is_none());
    assert!(db.get_token("b").unwrap().is_none());
    assert!(db.get_token("c").unwrap().is_some());
}

#[tokio::test]
async fn test_impersonated_token_full_circle() {
    let (db, _temp) = setup_db();
    let resolver = TagResolver::Static(
        StaticTags::new()
            .grant("root", "service.worker", &[TAG_ADMIN])
            .grant("root", "service", &[TAG_ADMIN]),
    );

    let id = tokens::create(
        &db,
        &resolver,
        "root",
        CreateParams {
            deadline: Utc::now() + Duration::hours(1),
            impersonate: Some("service.worker".to_string()),
            metadata: None,
            uses: Some(-1),
        },
    )
    .await
    .unwrap();

    // The token authenticates as the impersonated identity
    let token = tokens::redeem(&db, &id).unwrap();
    assert_eq!(token.owner, "service.worker");
    assert_eq!(token.uses_remaining, -1);

    // And shows up under the parent path for the admin
    let listed = tokens::list(&db, &resolver, "root", Some("service"))
        .await
        .unwrap();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].id, id);

    // The impersonated identity sees it as their own
    let own = tokens::list(&db, &resolver, "service.worker", None)
        .await
        .unwrap();
    assert_eq!(own.len(), 1);
}

#[tokio::test]
async fn test_list_permission_quirk_and_info_strictness() {
    let (db, _temp) = setup_db();
    db.insert_token(&make_token("t1", "team", 1)).unwrap();

    // Unauthorized scoped list: empty success, not an error
    let resolver = deny_all();
    let listed = tokens::list(&db, &resolver, "alice", Some("team"))
        .await
        .unwrap();
    assert!(listed.is_empty());

    // Unauthorized info over the same token: hard failure
    let result = tokens::info(&db, &resolver, "alice", &["t1".to_string()]).await;
    assert!(matches!(result, Err(TokenError::InvalidParams(_))));

    // The list capability tag unlocks both
    let resolver = TagResolver::Static(StaticTags::new().grant("alice", "team", &[TAG_LIST]));
    assert_eq!(
        tokens::list(&db, &resolver, "alice", Some("team"))
            .await
            .unwrap()
            .len(),
        1
    );
    assert_eq!(
        tokens::info(&db, &resolver, "alice", &["t1".to_string()])
            .await
            .unwrap()
            .len(),
        1
    );
}
