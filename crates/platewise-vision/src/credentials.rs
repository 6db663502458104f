//! Credential pool construction
//!
//! Secrets come from configuration and the environment. Empty and
//! placeholder values are dropped before the pool is built, so an empty pool
//! means "not configured" rather than "rate limited".

use tracing::debug;

/// Comma-separated list of keys
pub const ENV_KEY_LIST: &str = "PLATEWISE_GEMINI_API_KEYS";

/// Individual key variables, in priority order
pub const ENV_KEY_VARS: [&str; 3] = ["GEMINI_API_KEY", "GEMINI_API_KEY_2", "GEMINI_API_KEY_3"];

/// Ordered set of usable API secrets
///
/// Order is priority order: the gateway always prefers earlier secrets.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CredentialPool {
    secrets: Vec<String>,
}

impl CredentialPool {
    /// Build a pool, filtering blanks, placeholders and duplicates
    pub fn new<I, S>(secrets: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut pool = Self::default();
        for secret in secrets {
            pool.push(secret.as_ref());
        }
        pool
    }

    /// Build a pool from configured secrets followed by environment secrets
    pub fn from_config_and_env(configured: &[String]) -> Self {
        Self::from_lookup(configured, |name| std::env::var(name).ok())
    }

    /// Build a pool from configured secrets followed by variables read through `lookup`
    pub fn from_lookup<F>(configured: &[String], lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut pool = Self::new(configured);

        if let Some(list) = lookup(ENV_KEY_LIST) {
            for secret in list.split(',') {
                pool.push(secret);
            }
        }
        for var in ENV_KEY_VARS {
            if let Some(secret) = lookup(var) {
                pool.push(&secret);
            }
        }

        debug!(count = pool.len(), "Built credential pool");
        pool
    }

    fn push(&mut self, secret: &str) {
        let secret = secret.trim();
        if is_placeholder(secret) {
            return;
        }
        if self.secrets.iter().any(|s| s == secret) {
            return;
        }
        self.secrets.push(secret.to_string());
    }

    /// Number of usable secrets
    pub fn len(&self) -> usize {
        self.secrets.len()
    }

    /// True when no usable secret was configured
    pub fn is_empty(&self) -> bool {
        self.secrets.is_empty()
    }

    /// Secrets in priority order
    pub fn secrets(&self) -> &[String] {
        &self.secrets
    }

    pub(crate) fn into_secrets(self) -> Vec<String> {
        self.secrets
    }
}

/// Whether a configured value is blank or an obvious placeholder
pub fn is_placeholder(secret: &str) -> bool {
    let lower = secret.trim().to_lowercase();
    if lower.is_empty() {
        return true;
    }
    if lower.starts_with("your_") || lower.starts_with("your-") || lower.starts_with('<') {
        return true;
    }
    if ["placeholder", "changeme", "api_key_here", "replace_me"]
        .iter()
        .any(|p| lower.contains(p))
    {
        return true;
    }
    if lower == "undefined" || lower == "null" {
        return true;
    }
    lower.chars().all(|c| c == 'x' || c == '*')
}

/// Render a secret for display without revealing it
pub fn mask_secret(secret: &str) -> String {
    let chars: Vec<char> = secret.chars().collect();
    if chars.len() <= 8 {
        return "*".repeat(chars.len().max(4));
    }
    let head: String = chars[..4].iter().collect();
    let tail: String = chars[chars.len() - 4..].iter().collect();
    format!("{}…{}", head, tail)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_filters_blank_and_placeholders() {
        let pool = CredentialPool::new([
            "",
            "   ",
            "your_api_key_here",
            "YOUR_GEMINI_KEY",
            "placeholder-key",
            "xxxxxxxx",
            "AIzaSyRealKey123456",
        ]);
        assert_eq!(pool.secrets(), ["AIzaSyRealKey123456"]);
    }

    #[test]
    fn test_removes_duplicates_keeping_order() {
        let pool = CredentialPool::new(["key-bbbbbbbb", "key-aaaaaaaa", "key-bbbbbbbb"]);
        assert_eq!(pool.secrets(), ["key-bbbbbbbb", "key-aaaaaaaa"]);
    }

    #[test]
    fn test_empty_pool_is_not_configured() {
        let pool = CredentialPool::new(Vec::<String>::new());
        assert!(pool.is_empty());
        assert_eq!(pool.len(), 0);
    }

    #[test]
    fn test_from_lookup_orders_config_then_env() {
        let env: HashMap<&str, &str> = HashMap::from([
            (ENV_KEY_LIST, "list-key-1111, list-key-2222"),
            ("GEMINI_API_KEY", "single-key-3333"),
            ("GEMINI_API_KEY_2", ""),
            ("GEMINI_API_KEY_3", "list-key-1111"),
        ]);

        let pool = CredentialPool::from_lookup(&["config-key-0000".to_string()], |name| {
            env.get(name).map(|v| v.to_string())
        });

        assert_eq!(
            pool.secrets(),
            ["config-key-0000", "list-key-1111", "list-key-2222", "single-key-3333"]
        );
    }

    #[test]
    fn test_mask_secret() {
        assert_eq!(mask_secret("AIzaSyABCDEFGH1234"), "AIza…1234");
        assert_eq!(mask_secret("short"), "*****");
        assert_eq!(mask_secret("ab"), "****");
    }
}
