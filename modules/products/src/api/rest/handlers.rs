use std::sync::Arc;

use apikit::ApiError;
use axum::{
    body::Bytes,
    extract::{rejection::QueryRejection, Query},
    http::StatusCode,
    response::Json,
    Extension,
};
use tracing::debug;

use crate::api::rest::dto::{ProductDto, ProductPageDto};
use crate::api::rest::params::ProductId;
use crate::api::rest::validation::{parse_json_body, validate_create, validate_query, validate_update};
use crate::domain::service::Service;

/// Create a product
pub async fn create_product(
    Extension(svc): Extension<Arc<Service>>,
    body: Bytes,
) -> Result<(StatusCode, Json<ProductDto>), ApiError> {
    let payload = parse_json_body(&body)?;
    let new_product = validate_create(&payload).map_err(ApiError::validation)?;

    let product = svc.create(new_product).await?;
    Ok((StatusCode::CREATED, Json(ProductDto::from(product))))
}

/// List products with filtering, sorting and pagination
pub async fn list_products(
    Extension(svc): Extension<Arc<Service>>,
    query: Result<Query<Vec<(String, String)>>, QueryRejection>,
) -> Result<Json<ProductPageDto>, ApiError> {
    let Query(pairs) = query.map_err(|e| ApiError::bad_request(e.body_text()))?;
    debug!(params = pairs.len(), "Listing products");

    let criteria =
        validate_query(&pairs, svc.default_page_size()).map_err(ApiError::validation)?;

    let page = svc.find_many(criteria).await?;
    Ok(Json(ProductPageDto::from(page)))
}

/// Get a specific product by ID
pub async fn get_product(
    Extension(svc): Extension<Arc<Service>>,
    ProductId(id): ProductId,
) -> Result<Json<ProductDto>, ApiError> {
    let product = svc.find_one(id).await?;
    Ok(Json(ProductDto::from(product)))
}

/// Update an existing product; absent fields keep their values
pub async fn update_product(
    Extension(svc): Extension<Arc<Service>>,
    ProductId(id): ProductId,
    body: Bytes,
) -> Result<Json<ProductDto>, ApiError> {
    let payload = parse_json_body(&body)?;
    let patch = validate_update(&payload).map_err(ApiError::validation)?;

    let product = svc.update(id, patch).await?;
    Ok(Json(ProductDto::from(product)))
}

/// Delete a product by ID
pub async fn delete_product(
    Extension(svc): Extension<Arc<Service>>,
    ProductId(id): ProductId,
) -> Result<StatusCode, ApiError> {
    svc.remove(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
