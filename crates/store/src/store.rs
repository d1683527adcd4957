use async_trait::async_trait;
use common::{CustomerId, OrderId, OrderItemId, ProductId};

use crate::{CustomerRow, OrderItemChanges, OrderItemRow, OrderRecord, OrderRow, ProductRow, Result};

/// Row-level persistence for orders and their items.
///
/// All implementations must be thread-safe (Send + Sync).
#[async_trait]
pub trait OrderStore: Send + Sync {
    /// Inserts an order row and all of its item rows.
    ///
    /// Either every row is written or none is. Fails with `DuplicateKey` if
    /// the order already exists and `ForeignKeyViolation` if the customer or
    /// any referenced product does not exist.
    async fn insert_order(&self, order: OrderRow, items: Vec<OrderItemRow>) -> Result<()>;

    /// Inserts an order with its item rows and overwrites `customer` in the
    /// same unit of work.
    ///
    /// Fails like [`OrderStore::insert_order`], or with `NotFound` if the
    /// customer row does not exist; in either case nothing is written.
    async fn insert_order_with_customer(
        &self,
        order: OrderRow,
        items: Vec<OrderItemRow>,
        customer: &CustomerRow,
    ) -> Result<()>;

    /// Loads an order row and its item rows.
    ///
    /// Returns None if the order doesn't exist.
    async fn load_order_row(&self, id: &OrderId) -> Result<Option<OrderRecord>>;

    /// Loads every order with its items, ordered by order id.
    async fn load_all_order_rows(&self) -> Result<Vec<OrderRecord>>;

    /// Overwrites `customer_id` and `total` of an existing order row.
    async fn save_order_row(&self, order: &OrderRow) -> Result<()>;

    /// Inserts new item rows.
    async fn insert_item_rows(&self, rows: &[OrderItemRow]) -> Result<()>;

    /// Deletes the item rows of `order_id` with the given ids. Unknown ids
    /// are ignored.
    async fn delete_item_rows(&self, order_id: &OrderId, ids: &[OrderItemId]) -> Result<()>;

    /// Inserts or overwrites item rows.
    async fn upsert_item_rows(&self, rows: &[OrderItemRow]) -> Result<()>;

    /// Deletes an order and its items. Returns false if it did not exist.
    async fn delete_order(&self, id: &OrderId) -> Result<bool>;

    /// Saves the order row and applies the item batches in the order
    /// delete, insert, upsert.
    ///
    /// The default implementation issues each batch separately, so a failure
    /// part-way leaves the earlier batches applied. Backends that support it
    /// override this to run everything in a single unit of work.
    async fn apply_order_changes(
        &self,
        order: &OrderRow,
        changes: &OrderItemChanges,
    ) -> Result<()> {
        self.save_order_row(order).await?;
        if !changes.to_delete.is_empty() {
            self.delete_item_rows(&order.id, &changes.to_delete).await?;
        }
        if !changes.to_insert.is_empty() {
            self.insert_item_rows(&changes.to_insert).await?;
        }
        if !changes.to_upsert.is_empty() {
            self.upsert_item_rows(&changes.to_upsert).await?;
        }
        Ok(())
    }
}

/// Row-level persistence for customers.
#[async_trait]
pub trait CustomerStore: Send + Sync {
    /// Inserts a new customer row. Fails with `DuplicateKey` if it exists.
    async fn insert_customer(&self, row: CustomerRow) -> Result<()>;

    /// Overwrites an existing customer row. Fails with `NotFound` if absent.
    async fn save_customer(&self, row: &CustomerRow) -> Result<()>;

    async fn load_customer(&self, id: &CustomerId) -> Result<Option<CustomerRow>>;

    /// Loads every customer, ordered by id.
    async fn load_all_customers(&self) -> Result<Vec<CustomerRow>>;
}

/// Row-level persistence for products.
#[async_trait]
pub trait ProductStore: Send + Sync {
    /// Inserts a new product row. Fails with `DuplicateKey` if it exists.
    async fn insert_product(&self, row: ProductRow) -> Result<()>;

    /// Overwrites an existing product row. Fails with `NotFound` if absent.
    async fn save_product(&self, row: &ProductRow) -> Result<()>;

    async fn load_product(&self, id: &ProductId) -> Result<Option<ProductRow>>;

    /// Loads every product, ordered by id.
    async fn load_all_products(&self) -> Result<Vec<ProductRow>>;
}
