use std::sync::Arc;

use axum::Router;
use sea_orm::DatabaseConnection;
use sea_orm_migration::MigratorTrait;
use tracing::{debug, info};

use crate::api::rest::routes;
use crate::config::ProductsConfig;
use crate::domain::service::{Service, ServiceConfig};
use crate::infra::storage::migrations::Migrator;
use crate::infra::storage::SeaOrmProductsRepository;

/// The products module: migrations, service wiring and REST registration.
#[derive(Clone)]
pub struct Products {
    service: Arc<Service>,
}

impl Products {
    /// Wires the SeaORM repository to the domain service.
    pub fn new(db: DatabaseConnection, cfg: &ProductsConfig) -> Self {
        debug!(default_page_size = cfg.default_page_size, "Loaded products config");

        let repo = SeaOrmProductsRepository::new(db);
        let service = Service::new(
            Arc::new(repo),
            ServiceConfig {
                default_page_size: cfg.default_page_size,
            },
        );
        Self {
            service: Arc::new(service),
        }
    }

    pub async fn migrate(db: &DatabaseConnection) -> anyhow::Result<()> {
        info!("Running products database migrations");
        Migrator::up(db, None).await?;
        info!("Products database migrations completed successfully");
        Ok(())
    }

    pub fn service(&self) -> Arc<Service> {
        self.service.clone()
    }

    pub fn register_rest(&self, router: Router, prefix: &str) -> Router {
        info!(%prefix, "Registering products REST routes");
        routes::register_routes(router, prefix, self.service.clone())
    }
}
