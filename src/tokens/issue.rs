use chrono::{DateTime, Duration, Utc};

use crate::perms::TagResolver;
use crate::storage::models::Token;
use crate::storage::Database;

use super::generator::generate_token;
use super::TokenError;

/// Parameters for [`create`]
#[derive(Debug)]
pub struct CreateParams {
    /// Absolute expiry instant (inclusive)
    pub deadline: DateTime<Utc>,
    /// Issue the token under this identity instead of the requester
    pub impersonate: Option<String>,
    /// Opaque payload stored with the token
    pub metadata: Option<serde_json::Value>,
    /// Validation count: negative = unlimited; omitted or 0 defaults to 1
    pub uses: Option<i64>,
}

/// Parse a caller-supplied RFC 3339 deadline
pub fn parse_deadline(raw: &str) -> Result<DateTime<Utc>, TokenError> {
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|_| TokenError::DeadlineParse)
}

/// Issue a single-use token owned by the requester, valid for `ttl_seconds`.
/// No permission check: callers may always mint for themselves.
pub fn otp(db: &Database, requester: &str, ttl_seconds: u64) -> Result<String, TokenError> {
    let now = Utc::now();
    let token = Token {
        created_at: now,
        deadline: now + Duration::seconds(ttl_seconds as i64),
        id: generate_token(),
        last_used_at: None,
        metadata: None,
        owner: requester.to_string(),
        uses_remaining: 1,
    };

    db.insert_token(&token)?;
    tracing::debug!(id = %token.id, owner = %requester, "Issued OTP token");

    Ok(token.id)
}

/// Create a token with a caller-controlled use count and deadline.
///
/// The deadline is checked against the server clock, never the caller's.
/// Issuing under another identity requires the `@admin` tag over the target;
/// a failed check creates nothing.
pub async fn create(
    db: &Database,
    resolver: &TagResolver,
    requester: &str,
    params: CreateParams,
) -> Result<String, TokenError> {
    let now = Utc::now();
    if params.deadline < now {
        return Err(TokenError::DeadlineInPast);
    }

    let uses = match params.uses {
        Some(0) | None => 1,
        Some(n) => n,
    };

    let owner = match params.impersonate.as_deref() {
        Some(target) if !target.is_empty() => {
            let tags = resolver.effective_tags(requester, target).await?;
            if !tags.is_admin() {
                return Err(TokenError::PermissionDenied);
            }
            target.to_string()
        }
        _ => requester.to_string(),
    };

    let token = Token {
        created_at: now,
        deadline: params.deadline,
        id: generate_token(),
        last_used_at: None,
        metadata: params.metadata,
        owner,
        uses_remaining: uses,
    };

    db.insert_token(&token)?;
    tracing::debug!(id = %token.id, owner = %token.owner, uses, "Created token");

    Ok(token.id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::perms::{HttpTags, StaticTags, TAG_ADMIN};
    use crate::testutil::setup_db;

    fn params(deadline: DateTime<Utc>) -> CreateParams {
        CreateParams {
            deadline,
            impersonate: None,
            metadata: None,
            uses: None,
        }
    }

    #[test]
    fn test_otp_is_single_use_and_future_dated() {
        let (db, _temp) = setup_db();

        let id = otp(&db, "alice", 3600).unwrap();
        let token = db.get_token(&id).unwrap().unwrap();

        assert_eq!(token.owner, "alice");
        assert_eq!(token.uses_remaining, 1);
        assert!(token.deadline > Utc::now());
        assert!(token.metadata.is_none());
    }

    #[test]
    fn test_parse_deadline() {
        assert!(parse_deadline("2030-01-01T00:00:00Z").is_ok());
        assert!(matches!(
            parse_deadline("next tuesday"),
            Err(TokenError::DeadlineParse)
        ));
    }

    #[tokio::test]
    async fn test_create_defaults_uses_to_one() {
        let (db, _temp) = setup_db();
        let resolver = TagResolver::Static(StaticTags::new());
        let deadline = Utc::now() + Duration::hours(1);

        for uses in [None, Some(0)] {
            let id = create(
                &db,
                &resolver,
                "alice",
                CreateParams {
                    uses,
                    ..params(deadline)
                },
            )
            .await
            .unwrap();
            assert_eq!(db.get_token(&id).unwrap().unwrap().uses_remaining, 1);
        }

        let id = create(
            &db,
            &resolver,
            "alice",
            CreateParams {
                uses: Some(-1),
                ..params(deadline)
            },
        )
        .await
        .unwrap();
        assert_eq!(db.get_token(&id).unwrap().unwrap().uses_remaining, -1);
    }

    #[tokio::test]
    async fn test_create_rejects_past_deadline() {
        let (db, _temp) = setup_db();
        let resolver = TagResolver::Static(StaticTags::new());

        let result = create(
            &db,
            &resolver,
            "alice",
            CreateParams {
                uses: Some(10),
                ..params(Utc::now() - Duration::seconds(1))
            },
        )
        .await;
        assert!(matches!(result, Err(TokenError::DeadlineInPast)));
    }

    #[tokio::test]
    async fn test_impersonation_requires_admin() {
        let (db, _temp) = setup_db();
        let deadline = Utc::now() + Duration::hours(1);

        // Without the admin tag: denied, and nothing is created
        let resolver = TagResolver::Static(StaticTags::new());
        let result = create(
            &db,
            &resolver,
            "alice",
            CreateParams {
                impersonate: Some("bob".to_string()),
                ..params(deadline)
            },
        )
        .await;
        assert!(matches!(result, Err(TokenError::PermissionDenied)));
        assert!(db.tokens_by_owner("bob").unwrap().is_empty());
        assert!(db.tokens_by_owner("alice").unwrap().is_empty());

        // With it: the token is owned by the target
        let resolver = TagResolver::Static(StaticTags::new().grant("alice", "bob", &[TAG_ADMIN]));
        let id = create(
            &db,
            &resolver,
            "alice",
            CreateParams {
                impersonate: Some("bob".to_string()),
                ..params(deadline)
            },
        )
        .await
        .unwrap();
        assert_eq!(db.get_token(&id).unwrap().unwrap().owner, "bob");
    }

    #[tokio::test]
    async fn test_empty_impersonate_is_self_issuance() {
        let (db, _temp) = setup_db();
        let resolver = TagResolver::Static(StaticTags::new());

        let id = create(
            &db,
            &resolver,
            "alice",
            CreateParams {
                impersonate: Some(String::new()),
                ..params(Utc::now() + Duration::hours(1))
            },
        )
        .await
        .unwrap();
        assert_eq!(db.get_token(&id).unwrap().unwrap().owner, "alice");
    }

    #[tokio::test]
    async fn test_resolver_outage_fails_impersonation() {
        let (db, _temp) = setup_db();
        // Nothing listens on the discard port
        let resolver = TagResolver::Http(HttpTags::new("http://127.0.0.1:9".to_string()).unwrap());

        let result = create(
            &db,
            &resolver,
            "alice",
            CreateParams {
                impersonate: Some("bob".to_string()),
                ..params(Utc::now() + Duration::hours(1))
            },
        )
        .await;
        assert!(matches!(result, Err(TokenError::Permission(_))));
        assert!(db.tokens_by_owner("bob").unwrap().is_empty());
    }
}
