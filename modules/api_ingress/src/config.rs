use serde::{Deserialize, Serialize};

/// Settings read from the `modules.api_ingress` bag of the application config.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct ApiIngressConfig {
    /// Global route prefix, e.g. `/api/v1`.
    pub prefix: String,
    pub cors_enabled: bool,
    pub body_limit_bytes: usize,
}

impl Default for ApiIngressConfig {
    fn default() -> Self {
        Self {
            prefix: "/api/v1".to_owned(),
            cors_enabled: true,
            body_limit_bytes: 16 * 1024 * 1024,
        }
    }
}

impl ApiIngressConfig {
    /// Prefix with exactly one leading slash and no trailing slash.
    /// An empty or `/` prefix mounts routes at the root and yields `""`.
    pub fn normalized_prefix(&self) -> String {
        let trimmed = self.prefix.trim().trim_matches('/');
        if trimmed.is_empty() {
            String::new()
        } else {
            format!("/{trimmed}")
        }
    }
}
