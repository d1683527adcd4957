use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use common::{CustomerId, OrderId, OrderItemId, ProductId};
use tokio::sync::RwLock;

use crate::{
    CustomerRow, OrderItemChanges, OrderItemRow, OrderRecord, OrderRow, ProductRow, Result,
    StoreError,
    store::{CustomerStore, OrderStore, ProductStore},
};

#[derive(Debug, Clone, Default)]
struct Tables {
    customers: BTreeMap<CustomerId, CustomerRow>,
    products: BTreeMap<ProductId, ProductRow>,
    orders: BTreeMap<OrderId, OrderRow>,
    items: Vec<OrderItemRow>,
}

impl Tables {
    fn check_customer(&self, table: &'static str, id: &CustomerId) -> Result<()> {
        if self.customers.contains_key(id) {
            Ok(())
        } else {
            Err(StoreError::dangling(table, format!("customer {id} does not exist")))
        }
    }

    fn check_item_refs(&self, row: &OrderItemRow) -> Result<()> {
        if !self.orders.contains_key(&row.order_id) {
            return Err(StoreError::dangling(
                "order_items",
                format!("order {} does not exist", row.order_id),
            ));
        }
        if !self.products.contains_key(&row.product_id) {
            return Err(StoreError::dangling(
                "order_items",
                format!("product {} does not exist", row.product_id),
            ));
        }
        Ok(())
    }

    fn item_position(&self, order_id: &OrderId, id: &OrderItemId) -> Option<usize> {
        self.items
            .iter()
            .position(|r| &r.order_id == order_id && &r.id == id)
    }

    fn save_customer(&mut self, row: &CustomerRow) -> Result<()> {
        match self.customers.get_mut(&row.id) {
            Some(existing) => {
                *existing = row.clone();
                Ok(())
            }
            None => Err(StoreError::not_found("customers", &row.id)),
        }
    }

    fn insert_order(&mut self, order: OrderRow) -> Result<()> {
        if self.orders.contains_key(&order.id) {
            return Err(StoreError::duplicate("orders", &order.id));
        }
        self.check_customer("orders", &order.customer_id)?;
        self.orders.insert(order.id.clone(), order);
        Ok(())
    }

    fn save_order(&mut self, order: &OrderRow) -> Result<()> {
        if !self.orders.contains_key(&order.id) {
            return Err(StoreError::not_found("orders", &order.id));
        }
        self.check_customer("orders", &order.customer_id)?;
        self.orders.insert(order.id.clone(), order.clone());
        Ok(())
    }

    fn insert_item(&mut self, row: OrderItemRow) -> Result<()> {
        self.check_item_refs(&row)?;
        if self.item_position(&row.order_id, &row.id).is_some() {
            return Err(StoreError::duplicate(
                "order_items",
                format!("({}, {})", row.order_id, row.id),
            ));
        }
        self.items.push(row);
        Ok(())
    }

    fn upsert_item(&mut self, row: OrderItemRow) -> Result<()> {
        self.check_item_refs(&row)?;
        match self.item_position(&row.order_id, &row.id) {
            Some(pos) => self.items[pos] = row,
            None => self.items.push(row),
        }
        Ok(())
    }

    fn delete_items(&mut self, order_id: &OrderId, ids: &[OrderItemId]) {
        self.items
            .retain(|r| &r.order_id != order_id || !ids.contains(&r.id));
    }

    fn record(&self, order: &OrderRow) -> OrderRecord {
        let mut items: Vec<_> = self
            .items
            .iter()
            .filter(|r| r.order_id == order.id)
            .cloned()
            .collect();
        items.sort_by_key(|r| r.position);
        OrderRecord {
            order: order.clone(),
            items,
        }
    }
}

/// In-memory store implementation for testing.
///
/// Enforces the same primary-key and foreign-key rules as the PostgreSQL
/// schema, and applies multi-row writes atomically: each write runs against
/// a staged copy of the tables that only replaces the live tables on success.
#[derive(Clone, Default)]
pub struct InMemoryStore {
    tables: Arc<RwLock<Tables>>,
}

impl InMemoryStore {
    /// Creates a new empty in-memory store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the total number of item rows across all orders.
    pub async fn item_row_count(&self) -> usize {
        self.tables.read().await.items.len()
    }

    /// Clears all tables.
    pub async fn clear(&self) {
        *self.tables.write().await = Tables::default();
    }

    async fn stage<F>(&self, f: F) -> Result<()>
    where
        F: FnOnce(&mut Tables) -> Result<()>,
    {
        let mut tables = self.tables.write().await;
        let mut staged = tables.clone();
        f(&mut staged)?;
        *tables = staged;
        Ok(())
    }
}

#[async_trait]
impl OrderStore for InMemoryStore {
    async fn insert_order(&self, order: OrderRow, items: Vec<OrderItemRow>) -> Result<()> {
        self.stage(|t| {
            t.insert_order(order)?;
            items.into_iter().try_for_each(|row| t.insert_item(row))
        })
        .await
    }

    async fn insert_order_with_customer(
        &self,
        order: OrderRow,
        items: Vec<OrderItemRow>,
        customer: &CustomerRow,
    ) -> Result<()> {
        self.stage(|t| {
            t.insert_order(order)?;
            items.into_iter().try_for_each(|row| t.insert_item(row))?;
            t.save_customer(customer)
        })
        .await
    }

    async fn load_order_row(&self, id: &OrderId) -> Result<Option<OrderRecord>> {
        let tables = self.tables.read().await;
        Ok(tables.orders.get(id).map(|order| tables.record(order)))
    }

    async fn load_all_order_rows(&self) -> Result<Vec<OrderRecord>> {
        let tables = self.tables.read().await;
        Ok(tables.orders.values().map(|o| tables.record(o)).collect())
    }

    async fn save_order_row(&self, order: &OrderRow) -> Result<()> {
        self.stage(|t| t.save_order(order)).await
    }

    async fn insert_item_rows(&self, rows: &[OrderItemRow]) -> Result<()> {
        self.stage(|t| rows.iter().cloned().try_for_each(|row| t.insert_item(row)))
            .await
    }

    async fn delete_item_rows(&self, order_id: &OrderId, ids: &[OrderItemId]) -> Result<()> {
        self.tables.write().await.delete_items(order_id, ids);
        Ok(())
    }

    async fn upsert_item_rows(&self, rows: &[OrderItemRow]) -> Result<()> {
        self.stage(|t| rows.iter().cloned().try_for_each(|row| t.upsert_item(row)))
            .await
    }

    async fn delete_order(&self, id: &OrderId) -> Result<bool> {
        let mut tables = self.tables.write().await;
        let existed = tables.orders.remove(id).is_some();
        tables.items.retain(|r| &r.order_id != id);
        Ok(existed)
    }

    async fn apply_order_changes(
        &self,
        order: &OrderRow,
        changes: &OrderItemChanges,
    ) -> Result<()> {
        self.stage(|t| {
            t.save_order(order)?;
            t.delete_items(&order.id, &changes.to_delete);
            for row in &changes.to_insert {
                t.insert_item(row.clone())?;
            }
            for row in &changes.to_upsert {
                t.upsert_item(row.clone())?;
            }
            Ok(())
        })
        .await
    }
}

#[async_trait]
impl CustomerStore for InMemoryStore {
    async fn insert_customer(&self, row: CustomerRow) -> Result<()> {
        let mut tables = self.tables.write().await;
        if tables.customers.contains_key(&row.id) {
            return Err(StoreError::duplicate("customers", &row.id));
        }
        tables.customers.insert(row.id.clone(), row);
        Ok(())
    }

    async fn save_customer(&self, row: &CustomerRow) -> Result<()> {
        self.tables.write().await.save_customer(row)
    }

    async fn load_customer(&self, id: &CustomerId) -> Result<Option<CustomerRow>> {
        Ok(self.tables.read().await.customers.get(id).cloned())
    }

    async fn load_all_customers(&self) -> Result<Vec<CustomerRow>> {
        Ok(self.tables.read().await.customers.values().cloned().collect())
    }
}

#[async_trait]
impl ProductStore for InMemoryStore {
    async fn insert_product(&self, row: ProductRow) -> Result<()> {
        let mut tables = self.tables.write().await;
        if tables.products.contains_key(&row.id) {
            return Err(StoreError::duplicate("products", &row.id));
        }
        tables.products.insert(row.id.clone(), row);
        Ok(())
    }

    async fn save_product(&self, row: &ProductRow) -> Result<()> {
        let mut tables = self.tables.write().await;
        match tables.products.get_mut(&row.id) {
            Some(existing) => {
                *existing = row.clone();
                Ok(())
            }
            None => Err(StoreError::not_found("products", &row.id)),
        }
    }

    async fn load_product(&self, id: &ProductId) -> Result<Option<ProductRow>> {
        Ok(self.tables.read().await.products.get(id).cloned())
    }

    async fn load_all_products(&self) -> Result<Vec<ProductRow>> {
        Ok(self.tables.read().await.products.values().cloned().collect())
    }
}
