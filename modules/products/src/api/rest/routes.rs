use std::sync::Arc;

use axum::{
    routing::{get, post},
    Extension, Router,
};

use crate::api::rest::handlers;
use crate::domain::service::Service;

/// Mounts the product resource under `prefix` (already normalized, e.g. `/api/v1`).
pub fn register_routes(router: Router, prefix: &str, service: Arc<Service>) -> Router {
    let collection = format!("{prefix}/products");
    let item = format!("{prefix}/products/{{id}}");

    let products = Router::new()
        // POST /products, GET /products
        .route(
            &collection,
            post(handlers::create_product).get(handlers::list_products),
        )
        // GET/PUT/DELETE /products/{id}
        .route(
            &item,
            get(handlers::get_product)
                .put(handlers::update_product)
                .delete(handlers::delete_product),
        )
        .layer(Extension(service));

    router.merge(products)
}
