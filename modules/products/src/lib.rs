//! Visa product catalog: CRUD plus filtered, sorted, paginated search.

// === PUBLIC CONTRACT ===
pub mod contract;
pub use contract::model;

pub mod config;
pub use config::ProductsConfig;

pub mod module;
pub use module::Products;

// === INTERNAL MODULES ===
// Exposed for tests; other crates should go through `contract` and `Products`.
#[doc(hidden)]
pub mod api;
#[doc(hidden)]
pub mod domain;
#[doc(hidden)]
pub mod infra;
