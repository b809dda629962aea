//! Effective-tag lookup against the external permission resolver
//!
//! The service never evaluates policy itself. Cross-identity operations ask
//! the resolver which capability tags the requester holds over a target
//! identity path, and gate on two of them:
//!
//! - **`@admin`**: may impersonate on create, and see any owner's tokens.
//! - **`@token.list`**: may list/inspect tokens under a path.

use std::collections::HashMap;
use std::time::Duration;

use serde::Deserialize;
use thiserror::Error;
use tracing::trace;

/// Grants impersonation and unrestricted token visibility
pub const TAG_ADMIN: &str = "@admin";
/// Grants path-scoped token listing and inspection
pub const TAG_LIST: &str = "@token.list";

#[derive(Debug, Error)]
pub enum PermissionError {
    #[error("Tag lookup failed: {0}")]
    Lookup(#[from] reqwest::Error),
    #[error("Malformed tag payload: {0}")]
    Malformed(String),
}

/// The resolved capability tags a requester holds over a target path.
///
/// A tag that is absent from the mapping is not held; a non-boolean value
/// in the payload fails deserialization and surfaces as [`PermissionError::Malformed`].
#[derive(Debug, Clone, Default, Deserialize)]
pub struct EffectiveTags {
    pub tags: HashMap<String, bool>,
}

impl EffectiveTags {
    pub fn has(&self, tag: &str) -> bool {
        self.tags.get(tag).copied().unwrap_or(false)
    }

    pub fn is_admin(&self) -> bool {
        self.has(TAG_ADMIN)
    }

    /// Whether the requester may list/inspect tokens under the looked-up path
    pub fn can_list(&self) -> bool {
        self.is_admin() || self.has(TAG_LIST)
    }
}

/// Tag resolution strategy
pub enum TagResolver {
    /// Query the permission resolver service over HTTP
    Http(HttpTags),
    /// Use a fixed grant table (local dev, testing)
    Static(StaticTags),
}

impl TagResolver {
    /// Resolve the effective tags `requester` holds over `path`
    pub async fn effective_tags(
        &self,
        requester: &str,
        path: &str,
    ) -> Result<EffectiveTags, PermissionError> {
        match self {
            TagResolver::Http(r) => r.resolve(requester, path).await,
            TagResolver::Static(r) => Ok(r.resolve(requester, path)),
        }
    }
}

/// HTTP-backed tag resolution
///
/// Calls `GET {base_url}/tags?requester=..&path=..` and expects a
/// `{"tags": {"@admin": true, ...}}` body. A single failure is surfaced
/// immediately; callers retry at their own layer if at all.
pub struct HttpTags {
    base_url: String,
    client: reqwest::Client,
}

impl HttpTags {
    pub fn new(base_url: String) -> Result<Self, PermissionError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(5))
            .build()?;
        Ok(Self { base_url, client })
    }

    async fn resolve(&self, requester: &str, path: &str) -> Result<EffectiveTags, PermissionError> {
        let url = format!("{}/tags", self.base_url.trim_end_matches('/'));
        let body = self
            .client
            .get(&url)
            .query(&[("requester", requester), ("path", path)])
            .send()
            .await?
            .error_for_status()?
            .text()
            .await?;

        let tags: EffectiveTags =
            serde_json::from_str(&body).map_err(|e| PermissionError::Malformed(e.to_string()))?;

        trace!(requester, path, count = tags.tags.len(), "Resolved effective tags");
        Ok(tags)
    }
}

/// Static grant table
///
/// Returns the configured tags for a (requester, path) pair and no tags for
/// everything else. Used when no resolver is configured and in tests.
#[derive(Default)]
pub struct StaticTags {
    grants: HashMap<(String, String), EffectiveTags>,
}

impl StaticTags {
    pub fn new() -> Self {
        Self::default()
    }

    /// Grant `tags` to `requester` over `path`
    pub fn grant(mut self, requester: &str, path: &str, tags: &[&str]) -> Self {
        let tags = EffectiveTags {
            tags: tags.iter().map(|t| (t.to_string(), true)).collect(),
        };
        self.grants
            .insert((requester.to_string(), path.to_string()), tags);
        self
    }

    fn resolve(&self, requester: &str, path: &str) -> EffectiveTags {
        self.grants
            .get(&(requester.to_string(), path.to_string()))
            .cloned()
            .unwrap_or_default()
    }
}
