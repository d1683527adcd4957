use async_trait::async_trait;
use common::{Money, OrderId};
use store::{OrderRecord, OrderStore};

use super::Repository;
use super::customer::customer_row;
use crate::checkout::{Order, OrderItem, reconcile};
use crate::customer::Customer;
use crate::error::{DomainError, Result};

const ENTITY: &str = "Order";

/// Order repository over any [`OrderStore`].
///
/// `update` reconciles the order's items against the stored rows: removed
/// items are deleted, new ones inserted and the rest upserted, so rows of
/// unchanged items are never dropped and recreated.
#[derive(Debug, Clone)]
pub struct OrderRepository<S> {
    store: S,
}

impl<S: OrderStore> OrderRepository<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Stores a newly placed order together with its customer's updated
    /// state (reward points). Nothing is written if either write fails.
    #[tracing::instrument(
        skip(self, order, customer),
        fields(order_id = %order.id(), customer_id = %customer.id())
    )]
    pub async fn place(&self, order: &Order, customer: &Customer) -> Result<()> {
        let rows = reconcile::item_rows(order);
        let count = rows.len() as u64;
        let customer = customer_row(customer);
        self.store
            .insert_order_with_customer(reconcile::order_row(order), rows, &customer)
            .await?;

        metrics::counter!("orders_created_total").increment(1);
        metrics::counter!("order_items_inserted_total").increment(count);
        tracing::info!(
            items = count,
            total = %order.total(),
            reward_points = customer.reward_points,
            "order placed"
        );
        Ok(())
    }

    /// Deletes an order and its items.
    #[tracing::instrument(skip(self), fields(order_id = %id))]
    pub async fn delete(&self, id: &OrderId) -> Result<()> {
        if !self.store.delete_order(id).await? {
            return Err(DomainError::not_found(ENTITY, id));
        }
        tracing::info!("order deleted");
        Ok(())
    }
}

/// Rebuilds an order from its stored rows.
fn order_from_record(record: OrderRecord) -> Result<Order> {
    let OrderRecord { order, items } = record;
    let corrupt = |reason: String| DomainError::corrupt(ENTITY, &order.id, reason);

    let items = items
        .into_iter()
        .map(|row| {
            let quantity = u32::try_from(row.quantity)
                .map_err(|_| corrupt(format!("item {} has quantity {}", row.id, row.quantity)))?;
            OrderItem::new(
                row.id,
                row.name,
                Money::from_cents(row.price),
                row.product_id,
                quantity,
            )
            .map_err(|e| corrupt(e.to_string()))
        })
        .collect::<Result<Vec<_>>>()?;

    Order::new(order.id.clone(), order.customer_id.clone(), items)
        .map_err(|e| corrupt(e.to_string()))
}

#[async_trait]
impl<S: OrderStore> Repository<Order> for OrderRepository<S> {
    type Id = OrderId;

    /// Writes the order row and all item rows in one unit of work.
    #[tracing::instrument(skip(self, order), fields(order_id = %order.id()))]
    async fn create(&self, order: &Order) -> Result<()> {
        let rows = reconcile::item_rows(order);
        let count = rows.len() as u64;
        self.store
            .insert_order(reconcile::order_row(order), rows)
            .await?;

        metrics::counter!("orders_created_total").increment(1);
        metrics::counter!("order_items_inserted_total").increment(count);
        tracing::info!(items = count, total = %order.total(), "order created");
        Ok(())
    }

    #[tracing::instrument(skip(self, order), fields(order_id = %order.id()))]
    async fn update(&self, order: &Order) -> Result<()> {
        let record = self
            .store
            .load_order_row(order.id())
            .await?
            .ok_or_else(|| DomainError::not_found(ENTITY, order.id()))?;

        let changes = reconcile::reconcile(order, &record.items);
        self.store
            .apply_order_changes(&reconcile::order_row(order), &changes)
            .await?;

        metrics::counter!("orders_updated_total").increment(1);
        metrics::counter!("order_items_deleted_total").increment(changes.to_delete.len() as u64);
        metrics::counter!("order_items_inserted_total").increment(changes.to_insert.len() as u64);
        metrics::counter!("order_items_upserted_total").increment(changes.to_upsert.len() as u64);
        tracing::info!(
            deleted = changes.to_delete.len(),
            inserted = changes.to_insert.len(),
            upserted = changes.to_upsert.len(),
            "order updated"
        );
        Ok(())
    }

    #[tracing::instrument(skip(self), fields(order_id = %id))]
    async fn find(&self, id: &OrderId) -> Result<Order> {
        let record = self
            .store
            .load_order_row(id)
            .await?
            .ok_or_else(|| DomainError::not_found(ENTITY, id))?;
        order_from_record(record)
    }

    #[tracing::instrument(skip(self))]
    async fn find_all(&self) -> Result<Vec<Order>> {
        let records = self.store.load_all_order_rows().await?;
        records.into_iter().map(order_from_record).collect()
    }
}
