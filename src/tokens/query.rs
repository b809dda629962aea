use std::collections::HashSet;

use crate::perms::TagResolver;
use crate::storage::models::Token;
use crate::storage::Database;

use super::TokenError;

/// List tokens visible to the requester.
///
/// With no path, the requester sees exactly their own tokens. With a path,
/// visibility over it and its dot-descendants requires `@admin` or
/// `@token.list`; a requester without the permission gets an empty result
/// rather than an error, so callers cannot probe which paths exist.
pub async fn list(
    db: &Database,
    resolver: &TagResolver,
    requester: &str,
    path: Option<&str>,
) -> Result<Vec<Token>, TokenError> {
    match path {
        None | Some("") => Ok(db.tokens_by_owner(requester)?),
        Some(path) => {
            let tags = resolver.effective_tags(requester, path).await?;
            if tags.can_list() {
                Ok(db.tokens_under_path(path)?)
            } else {
                tracing::debug!(requester, path, "Scoped list without permission");
                Ok(Vec::new())
            }
        }
    }
}

/// Fetch tokens by id, enforcing per-owner visibility.
///
/// Ids with no row are simply absent from the result. Every fetched token
/// owned by someone other than the requester needs `@admin` or
/// `@token.list` over that owner (each owner resolved once); a single
/// failed check fails the whole call with no partial result.
pub async fn info(
    db: &Database,
    resolver: &TagResolver,
    requester: &str,
    ids: &[String],
) -> Result<Vec<Token>, TokenError> {
    let mut tokens = Vec::new();
    for id in ids {
        if let Some(token) = db.get_token(id)? {
            tokens.push(token);
        }
    }

    let mut checked: HashSet<&str> = HashSet::new();
    for token in &tokens {
        if token.owner == requester || !checked.insert(token.owner.as_str()) {
            continue;
        }
        let tags = resolver
            .effective_tags(requester, &token.owner)
            .await
            .map_err(|e| {
                tracing::warn!(error = %e, "Tag lookup failed during token inspection");
                TokenError::InvalidParams("tag lookup failed for a token owner".to_string())
            })?;
        if !tags.can_list() {
            return Err(TokenError::InvalidParams(
                "insufficient permission over a fetched token's owner".to_string(),
            ));
        }
    }

    Ok(tokens)
}
