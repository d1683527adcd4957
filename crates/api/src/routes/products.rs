//! Product endpoints.

use std::sync::Arc;

use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use common::{Money, ProductId};
use domain::{DomainError, Product, Repository};
use serde::{Deserialize, Serialize};

use super::{AppState, CheckoutStore, require};
use crate::error::ApiError;

#[derive(Deserialize)]
pub struct CreateProductRequest {
    /// Generated when absent.
    pub id: Option<String>,
    pub name: String,
    pub price_cents: i64,
}

#[derive(Serialize)]
pub struct ProductResponse {
    pub id: String,
    pub name: String,
    pub price_cents: i64,
}

impl From<&Product> for ProductResponse {
    fn from(product: &Product) -> Self {
        Self {
            id: product.id().to_string(),
            name: product.name().to_string(),
            price_cents: product.price().cents(),
        }
    }
}

/// POST /products
#[tracing::instrument(skip(state, req))]
pub async fn create<S: CheckoutStore>(
    State(state): State<Arc<AppState<S>>>,
    Json(req): Json<CreateProductRequest>,
) -> Result<(StatusCode, Json<ProductResponse>), ApiError> {
    let id = match req.id {
        Some(id) => {
            require("id", &id)?;
            ProductId::new(id)
        }
        None => ProductId::generate(),
    };

    let mut product = Product::new(id, req.name, Money::from_cents(req.price_cents))
        .map_err(DomainError::from)?;
    state.products.create(&product).await?;
    state.publish(product.take_events());

    Ok((StatusCode::CREATED, Json(ProductResponse::from(&product))))
}

/// GET /products: every product, ordered by id.
#[tracing::instrument(skip(state))]
pub async fn list<S: CheckoutStore>(
    State(state): State<Arc<AppState<S>>>,
) -> Result<Json<Vec<ProductResponse>>, ApiError> {
    let products = state.products.find_all().await?;
    Ok(Json(products.iter().map(ProductResponse::from).collect()))
}
