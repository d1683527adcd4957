//! Order endpoints.

use std::sync::Arc;

use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use common::{CustomerId, OrderId, OrderItemId, ProductId};
use domain::{DomainError, Order, OrderItem, OrderService, Repository};
use serde::{Deserialize, Serialize};

use super::{AppState, CheckoutStore, require};
use crate::error::ApiError;

// -- Request types --

#[derive(Deserialize)]
pub struct CreateOrderRequest {
    pub customer_id: String,
    pub items: Vec<OrderItemRequest>,
}

/// An item to add to an order. Name and price are copied from the product.
#[derive(Deserialize)]
pub struct OrderItemRequest {
    /// Generated when absent.
    pub id: Option<String>,
    pub product_id: String,
    pub quantity: u32,
}

#[derive(Deserialize)]
pub struct UpdateOrderRequest {
    pub customer_id: Option<String>,
    #[serde(default)]
    pub add_items: Vec<OrderItemRequest>,
    #[serde(default)]
    pub remove_items: Vec<String>,
}

// -- Response types --

#[derive(Serialize)]
pub struct OrderResponse {
    pub id: String,
    pub customer_id: String,
    pub items: Vec<OrderItemResponse>,
    pub total_cents: i64,
}

#[derive(Serialize)]
pub struct OrderItemResponse {
    pub id: String,
    pub product_id: String,
    pub name: String,
    pub price_cents: i64,
    pub quantity: u32,
    pub total_cents: i64,
}

impl From<&Order> for OrderResponse {
    fn from(order: &Order) -> Self {
        Self {
            id: order.id().to_string(),
            customer_id: order.customer_id().to_string(),
            items: order
                .items()
                .iter()
                .map(|item| OrderItemResponse {
                    id: item.id().to_string(),
                    product_id: item.product_id().to_string(),
                    name: item.name().to_string(),
                    price_cents: item.price().cents(),
                    quantity: item.quantity(),
                    total_cents: item.total().cents(),
                })
                .collect(),
            total_cents: order.total().cents(),
        }
    }
}

/// Turns a missing referenced entity into a 422 instead of a 404.
fn referenced(err: DomainError) -> ApiError {
    if err.is_not_found() {
        ApiError::Unprocessable(err.to_string())
    } else {
        err.into()
    }
}

/// Builds an order item from the current state of its product.
async fn build_item<S: CheckoutStore>(
    state: &AppState<S>,
    req: OrderItemRequest,
) -> Result<OrderItem, ApiError> {
    require("product_id", &req.product_id)?;
    let product_id = ProductId::new(req.product_id);
    let product = state.products.find(&product_id).await.map_err(referenced)?;

    let id = match req.id {
        Some(id) => OrderItemId::new(id),
        None => OrderItemId::generate(),
    };
    Ok(OrderItem::new(
        id,
        product.name(),
        product.price(),
        product_id,
        req.quantity,
    )?)
}

// -- Handlers --

/// POST /orders: place an order and credit the customer's reward points.
#[tracing::instrument(skip(state, req))]
pub async fn create<S: CheckoutStore>(
    State(state): State<Arc<AppState<S>>>,
    Json(req): Json<CreateOrderRequest>,
) -> Result<(StatusCode, Json<OrderResponse>), ApiError> {
    require("customer_id", &req.customer_id)?;
    let mut customer = state
        .customers
        .find(&CustomerId::new(req.customer_id))
        .await
        .map_err(referenced)?;

    let mut items = Vec::with_capacity(req.items.len());
    for item in req.items {
        items.push(build_item(&state, item).await?);
    }

    let order = OrderService::place_order(&mut customer, items)?;
    state.orders.place(&order, &customer).await?;

    Ok((StatusCode::CREATED, Json(OrderResponse::from(&order))))
}

/// GET /orders: every order, ordered by id.
#[tracing::instrument(skip(state))]
pub async fn list<S: CheckoutStore>(
    State(state): State<Arc<AppState<S>>>,
) -> Result<Json<Vec<OrderResponse>>, ApiError> {
    let orders = state.orders.find_all().await?;
    Ok(Json(orders.iter().map(OrderResponse::from).collect()))
}

/// GET /orders/{id}
#[tracing::instrument(skip(state))]
pub async fn get<S: CheckoutStore>(
    State(state): State<Arc<AppState<S>>>,
    Path(id): Path<String>,
) -> Result<Json<OrderResponse>, ApiError> {
    let order = state.orders.find(&OrderId::new(id)).await?;
    Ok(Json(OrderResponse::from(&order)))
}

/// PUT /orders/{id}: change the customer, add items, then remove items.
///
/// Items are added before any are removed, so an order's only item can be
/// swapped for another in one request.
#[tracing::instrument(skip(state, req))]
pub async fn update<S: CheckoutStore>(
    State(state): State<Arc<AppState<S>>>,
    Path(id): Path<String>,
    Json(req): Json<UpdateOrderRequest>,
) -> Result<Json<OrderResponse>, ApiError> {
    let mut order = state.orders.find(&OrderId::new(id)).await?;

    if let Some(customer_id) = req.customer_id {
        order.change_customer(customer_id)?;
    }
    for item in req.add_items {
        let item = build_item(&state, item).await?;
        order.add_item(item)?;
    }
    for item_id in req.remove_items {
        order.remove_item(&OrderItemId::new(item_id))?;
    }

    state.orders.update(&order).await?;
    Ok(Json(OrderResponse::from(&order)))
}

/// DELETE /orders/{id}
#[tracing::instrument(skip(state))]
pub async fn delete<S: CheckoutStore>(
    State(state): State<Arc<AppState<S>>>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    state.orders.delete(&OrderId::new(id)).await?;
    Ok(StatusCode::NO_CONTENT)
}
