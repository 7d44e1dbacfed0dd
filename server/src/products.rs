//! Product routes. Every handler requires a bearer token.

use axum::{
    body::Bytes,
    extract::{Path, Query, State},
    http::{header::CONTENT_TYPE, HeaderMap, StatusCode},
    Json,
};
use tracing::info;
use uuid::Uuid;

use crate::auth::CurrentUser;
use crate::envelope::Envelope;
use crate::error::ApiError;
use crate::models::{CreateProduct, PageQuery, Product, ProductImage, UpdateProduct};
use crate::AppState;

fn validate(name: &str, barcode: &str, rate: f64) -> Result<(), ApiError> {
    if name.trim().is_empty() {
        return Err(ApiError::Validation("Name is required".to_string()));
    }
    if barcode.trim().is_empty() {
        return Err(ApiError::Validation("Barcode is required".to_string()));
    }
    if !rate.is_finite() || rate < 0.0 {
        return Err(ApiError::Validation("Rate must be a non-negative number".to_string()));
    }
    Ok(())
}

pub async fn list(
    State(state): State<AppState>,
    _user: CurrentUser,
    Query(query): Query<PageQuery>,
) -> Json<Envelope<Vec<Product>>> {
    let (page, size) = query.normalized();
    let products = state.products.list_paged(page, size).await;
    Json(Envelope::paged(products, page, size))
}

pub async fn get(
    State(state): State<AppState>,
    _user: CurrentUser,
    Path(id): Path<Uuid>,
) -> Result<Json<Envelope<Product>>, ApiError> {
    let product = state
        .products
        .get_by_id(id)
        .await
        .ok_or(ApiError::ProductNotFound(id))?;
    Ok(Json(Envelope::ok(product)))
}

pub async fn create(
    State(state): State<AppState>,
    CurrentUser(user_id): CurrentUser,
    Json(input): Json<CreateProduct>,
) -> Result<(StatusCode, Json<Envelope<Product>>), ApiError> {
    validate(&input.name, &input.barcode, input.rate)?;
    if !state.products.is_unique_barcode(&input.barcode).await {
        return Err(ApiError::DuplicateBarcode(input.barcode));
    }

    let product = state
        .products
        .add(Product {
            id: Uuid::new_v4(),
            name: input.name,
            barcode: input.barcode,
            description: input.description,
            rate: input.rate,
            image: None,
        })
        .await;
    info!(product_id = %product.id, barcode = %product.barcode, %user_id, "product created");
    Ok((StatusCode::CREATED, Json(Envelope::ok(product))))
}

pub async fn update(
    State(state): State<AppState>,
    _user: CurrentUser,
    Path(id): Path<Uuid>,
    Json(input): Json<UpdateProduct>,
) -> Result<Json<Envelope<Product>>, ApiError> {
    let mut product = state
        .products
        .get_by_id(id)
        .await
        .ok_or(ApiError::ProductNotFound(id))?;

    if let Some(barcode) = input.barcode {
        if barcode != product.barcode && !state.products.is_unique_barcode(&barcode).await {
            return Err(ApiError::DuplicateBarcode(barcode));
        }
        product.barcode = barcode;
    }
    if let Some(name) = input.name {
        product.name = name;
    }
    if let Some(description) = input.description {
        product.description = description;
    }
    if let Some(rate) = input.rate {
        product.rate = rate;
    }
    validate(&product.name, &product.barcode, product.rate)?;

    let product = state
        .products
        .update(product)
        .await
        .ok_or(ApiError::ProductNotFound(id))?;
    Ok(Json(Envelope::ok(product)))
}

pub async fn delete(
    State(state): State<AppState>,
    _user: CurrentUser,
    Path(id): Path<Uuid>,
) -> Result<Json<Envelope<Uuid>>, ApiError> {
    let removed = state
        .products
        .delete(id)
        .await
        .ok_or(ApiError::ProductNotFound(id))?;
    info!(product_id = %removed.id, "product deleted");
    Ok(Json(Envelope::ok(removed.id)))
}

/// Attach an image. The body is stored opaquely; only its type and size
/// are recorded.
pub async fn upload_image(
    State(state): State<AppState>,
    _user: CurrentUser,
    Path(id): Path<Uuid>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<Envelope<Product>>, ApiError> {
    if body.is_empty() {
        return Err(ApiError::Validation("Image body is empty".to_string()));
    }
    let mut product = state
        .products
        .get_by_id(id)
        .await
        .ok_or(ApiError::ProductNotFound(id))?;

    let content_type = headers
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("application/octet-stream")
        .to_string();
    product.image = Some(ProductImage {
        content_type,
        size: body.len() as u64,
    });

    let product = state
        .products
        .update(product)
        .await
        .ok_or(ApiError::ProductNotFound(id))?;
    info!(product_id = %product.id, bytes = body.len(), "product image uploaded");
    Ok(Json(Envelope::ok(product)))
}
