use std::collections::HashMap;
use std::sync::Arc;

use crate::cancellation::CancellationToken;

/// Per-request credential scope plus cancellation, passed by value into
/// every stage and adapter call on behalf of one request.
///
/// This stands in for the ambient/implicit call-scoped storage a garbage
/// collected runtime would normally provide; two concurrently running
/// requests each hold their own `RequestContext` and never observe each
/// other's overrides, because neither ever reaches for anything outside the
/// value it was handed.
#[derive(Clone)]
pub struct RequestContext {
    overrides: Arc<HashMap<String, String>>,
    cancellation: CancellationToken,
}

impl RequestContext {
    #[must_use]
    pub fn new(overrides: HashMap<String, String>) -> Self {
        Self {
            overrides: Arc::new(overrides),
            cancellation: CancellationToken::new(),
        }
    }

    #[must_use]
    pub fn cancellation(&self) -> &CancellationToken {
        &self.cancellation
    }

    /// Looks up a per-request override for `tag`, falling back to
    /// `fallback` (typically the process-configured key for that provider).
    #[must_use]
    pub fn key_for<'a>(&'a self, tag: &str, fallback: Option<&'a str>) -> Option<&'a str> {
        self.overrides
            .get(tag)
            .map(String::as_str)
            .or(fallback)
    }

    /// `true` if the caller supplied their own key for `tag`. A user key can
    /// activate a provider that is otherwise disabled by server
    /// configuration, so adapters must consult this in `is_available`, not
    /// just `key_for`.
    #[must_use]
    pub fn has_user_key(&self, tag: &str) -> bool {
        self.overrides.contains_key(tag)
    }
}

impl Default for RequestContext {
    fn default() -> Self {
        Self::new(HashMap::new())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn user_key_overrides_fallback() {
        let mut overrides = HashMap::new();
        overrides.insert("anthropic".to_string(), "user-key".to_string());
        let ctx = RequestContext::new(overrides);
        assert_eq!(ctx.key_for("anthropic", Some("server-key")), Some("user-key"));
        assert!(ctx.has_user_key("anthropic"));
    }

    #[test]
    fn missing_override_falls_back() {
        let ctx = RequestContext::default();
        assert_eq!(ctx.key_for("openai", Some("server-key")), Some("server-key"));
        assert!(!ctx.has_user_key("openai"));
    }

    #[test]
    fn two_contexts_never_share_overrides() {
        let mut a = HashMap::new();
        a.insert("anthropic".to_string(), "key-a".to_string());
        let ctx_a = RequestContext::new(a);

        let mut b = HashMap::new();
        b.insert("anthropic".to_string(), "key-b".to_string());
        let ctx_b = RequestContext::new(b);

        assert_eq!(ctx_a.key_for("anthropic", None), Some("key-a"));
        assert_eq!(ctx_b.key_for("anthropic", None), Some("key-b"));
    }
}
