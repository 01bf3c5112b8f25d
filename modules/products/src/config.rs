use serde::{Deserialize, Deserializer, Serialize};

/// Configuration for the products module (`modules.products`).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ProductsConfig {
    /// Page size used when a list request has no `limit`. Must be at least 1.
    #[serde(default = "default_page_size", deserialize_with = "page_size")]
    pub default_page_size: u64,
}

impl Default for ProductsConfig {
    fn default() -> Self {
        Self {
            default_page_size: default_page_size(),
        }
    }
}

fn default_page_size() -> u64 {
    10
}

fn page_size<'de, D>(deserializer: D) -> Result<u64, D::Error>
where
    D: Deserializer<'de>,
{
    let size = u64::deserialize(deserializer)?;
    if size == 0 {
        return Err(serde::de::Error::custom(
            "default_page_size must not be less than 1",
        ));
    }
    Ok(size)
}
