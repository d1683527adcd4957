use std::collections::HashMap;

use async_trait::async_trait;
use common::{CustomerId, OrderId, OrderItemId, ProductId};
use sqlx::{
    PgConnection, PgPool, Row,
    postgres::{PgPoolOptions, PgRow},
};

use crate::{
    CustomerRow, OrderItemChanges, OrderItemRow, OrderRecord, OrderRow, ProductRow, Result,
    StoreError,
    store::{CustomerStore, OrderStore, ProductStore},
};

/// PostgreSQL-backed store implementation.
#[derive(Clone)]
pub struct PostgresStore {
    pool: PgPool,
}

impl PostgresStore {
    /// Creates a new PostgreSQL store.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Connects a pool of at most `max_connections` to `url`.
    #[tracing::instrument(skip(url))]
    pub async fn connect(url: &str, max_connections: u32) -> Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .connect(url)
            .await?;
        tracing::info!("connected to PostgreSQL");
        Ok(Self::new(pool))
    }

    /// Gets a reference to the underlying connection pool.
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Runs the database migrations.
    pub async fn run_migrations(&self) -> Result<()> {
        sqlx::migrate!("../../migrations").run(&self.pool).await?;
        Ok(())
    }

    fn row_to_order(row: &PgRow) -> Result<OrderRow> {
        Ok(OrderRow {
            id: OrderId::new(row.try_get::<String, _>("id")?),
            customer_id: CustomerId::new(row.try_get::<String, _>("customer_id")?),
            total: row.try_get("total")?,
        })
    }

    fn row_to_item(row: &PgRow) -> Result<OrderItemRow> {
        Ok(OrderItemRow {
            id: OrderItemId::new(row.try_get::<String, _>("id")?),
            order_id: OrderId::new(row.try_get::<String, _>("order_id")?),
            position: row.try_get("position")?,
            product_id: ProductId::new(row.try_get::<String, _>("product_id")?),
            name: row.try_get("name")?,
            price: row.try_get("price")?,
            quantity: row.try_get("quantity")?,
        })
    }

    fn row_to_customer(row: &PgRow) -> Result<CustomerRow> {
        Ok(CustomerRow {
            id: CustomerId::new(row.try_get::<String, _>("id")?),
            name: row.try_get("name")?,
            street: row.try_get("street")?,
            number: row.try_get("number")?,
            zip: row.try_get("zip")?,
            city: row.try_get("city")?,
            active: row.try_get("active")?,
            reward_points: row.try_get("reward_points")?,
        })
    }

    fn row_to_product(row: &PgRow) -> Result<ProductRow> {
        Ok(ProductRow {
            id: ProductId::new(row.try_get::<String, _>("id")?),
            name: row.try_get("name")?,
            price: row.try_get("price")?,
        })
    }
}

/// Maps constraint violations onto store errors; everything else stays a
/// database error.
fn map_db_error(
    table: &'static str,
    key: impl std::fmt::Display,
) -> impl FnOnce(sqlx::Error) -> StoreError {
    move |e| {
        if let sqlx::Error::Database(ref db_err) = e {
            if db_err.is_unique_violation() {
                return StoreError::duplicate(table, key);
            }
            if db_err.is_foreign_key_violation() {
                let detail = db_err
                    .constraint()
                    .map(|c| format!("{key} violates {c}"))
                    .unwrap_or_else(|| key.to_string());
                return StoreError::dangling(table, detail);
            }
        }
        StoreError::Database(e)
    }
}

async fn insert_item(conn: &mut PgConnection, row: &OrderItemRow) -> Result<()> {
    sqlx::query(
        r#"
        INSERT INTO order_items (id, order_id, position, product_id, name, price, quantity)
        VALUES ($1, $2, $3, $4, $5, $6, $7)
        "#,
    )
    .bind(row.id.as_str())
    .bind(row.order_id.as_str())
    .bind(row.position)
    .bind(row.product_id.as_str())
    .bind(&row.name)
    .bind(row.price)
    .bind(row.quantity)
    .execute(conn)
    .await
    .map_err(map_db_error("order_items", format!("({}, {})", row.order_id, row.id)))?;
    Ok(())
}

async fn upsert_item(conn: &mut PgConnection, row: &OrderItemRow) -> Result<()> {
    sqlx::query(
        r#"
        INSERT INTO order_items (id, order_id, position, product_id, name, price, quantity)
        VALUES ($1, $2, $3, $4, $5, $6, $7)
        ON CONFLICT (order_id, id) DO UPDATE SET
            position = EXCLUDED.position,
            product_id = EXCLUDED.product_id,
            name = EXCLUDED.name,
            price = EXCLUDED.price,
            quantity = EXCLUDED.quantity
        "#,
    )
    .bind(row.id.as_str())
    .bind(row.order_id.as_str())
    .bind(row.position)
    .bind(row.product_id.as_str())
    .bind(&row.name)
    .bind(row.price)
    .bind(row.quantity)
    .execute(conn)
    .await
    .map_err(map_db_error("order_items", format!("({}, {})", row.order_id, row.id)))?;
    Ok(())
}

async fn delete_items(
    conn: &mut PgConnection,
    order_id: &OrderId,
    ids: &[OrderItemId],
) -> Result<()> {
    let ids: Vec<String> = ids.iter().map(|id| id.as_str().to_owned()).collect();
    sqlx::query("DELETE FROM order_items WHERE order_id = $1 AND id = ANY($2)")
        .bind(order_id.as_str())
        .bind(ids)
        .execute(conn)
        .await?;
    Ok(())
}

async fn update_customer(conn: &mut PgConnection, row: &CustomerRow) -> Result<()> {
    let result = sqlx::query(
        r#"
        UPDATE customers SET
            name = $2, street = $3, number = $4, zip = $5, city = $6,
            active = $7, reward_points = $8
        WHERE id = $1
        "#,
    )
    .bind(row.id.as_str())
    .bind(&row.name)
    .bind(&row.street)
    .bind(row.number)
    .bind(&row.zip)
    .bind(&row.city)
    .bind(row.active)
    .bind(row.reward_points)
    .execute(conn)
    .await?;

    if result.rows_affected() == 0 {
        return Err(StoreError::not_found("customers", &row.id));
    }
    Ok(())
}

async fn insert_order_rows(
    conn: &mut PgConnection,
    order: &OrderRow,
    items: &[OrderItemRow],
) -> Result<()> {
    sqlx::query("INSERT INTO orders (id, customer_id, total) VALUES ($1, $2, $3)")
        .bind(order.id.as_str())
        .bind(order.customer_id.as_str())
        .bind(order.total)
        .execute(&mut *conn)
        .await
        .map_err(map_db_error("orders", &order.id))?;

    for row in items {
        insert_item(conn, row).await?;
    }
    Ok(())
}

async fn update_order(conn: &mut PgConnection, order: &OrderRow) -> Result<()> {
    let result = sqlx::query("UPDATE orders SET customer_id = $2, total = $3 WHERE id = $1")
        .bind(order.id.as_str())
        .bind(order.customer_id.as_str())
        .bind(order.total)
        .execute(conn)
        .await
        .map_err(map_db_error("orders", &order.id))?;

    if result.rows_affected() == 0 {
        return Err(StoreError::not_found("orders", &order.id));
    }
    Ok(())
}

#[async_trait]
impl OrderStore for PostgresStore {
    #[tracing::instrument(
        skip(self, order, items),
        fields(order_id = %order.id, items = items.len())
    )]
    async fn insert_order(&self, order: OrderRow, items: Vec<OrderItemRow>) -> Result<()> {
        let mut tx = self.pool.begin().await?;
        insert_order_rows(&mut tx, &order, &items).await?;
        tx.commit().await?;
        Ok(())
    }

    #[tracing::instrument(
        skip(self, order, items, customer),
        fields(order_id = %order.id, customer_id = %customer.id, items = items.len())
    )]
    async fn insert_order_with_customer(
        &self,
        order: OrderRow,
        items: Vec<OrderItemRow>,
        customer: &CustomerRow,
    ) -> Result<()> {
        let mut tx = self.pool.begin().await?;
        insert_order_rows(&mut tx, &order, &items).await?;
        update_customer(&mut tx, customer).await?;
        tx.commit().await?;
        Ok(())
    }

    async fn load_order_row(&self, id: &OrderId) -> Result<Option<OrderRecord>> {
        let row = sqlx::query("SELECT id, customer_id, total FROM orders WHERE id = $1")
            .bind(id.as_str())
            .fetch_optional(&self.pool)
            .await?;

        let Some(row) = row else {
            return Ok(None);
        };
        let order = Self::row_to_order(&row)?;

        let rows = sqlx::query(
            r#"
            SELECT id, order_id, position, product_id, name, price, quantity
            FROM order_items
            WHERE order_id = $1
            ORDER BY position ASC
            "#,
        )
        .bind(id.as_str())
        .fetch_all(&self.pool)
        .await?;

        let items = rows.iter().map(Self::row_to_item).collect::<Result<Vec<_>>>()?;
        Ok(Some(OrderRecord { order, items }))
    }

    async fn load_all_order_rows(&self) -> Result<Vec<OrderRecord>> {
        let orders = sqlx::query(
            r#"SELECT id, customer_id, total FROM orders ORDER BY id COLLATE "C" ASC"#,
        )
        .fetch_all(&self.pool)
        .await?;
        let items = sqlx::query(
            r#"
            SELECT id, order_id, position, product_id, name, price, quantity
            FROM order_items
            ORDER BY order_id, position ASC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        let mut records = orders
            .iter()
            .map(|row| {
                Ok(OrderRecord {
                    order: Self::row_to_order(row)?,
                    items: Vec::new(),
                })
            })
            .collect::<Result<Vec<_>>>()?;

        let index: HashMap<OrderId, usize> = records
            .iter()
            .enumerate()
            .map(|(i, r)| (r.order.id.clone(), i))
            .collect();
        for row in &items {
            let item = Self::row_to_item(row)?;
            if let Some(&i) = index.get(&item.order_id) {
                records[i].items.push(item);
            }
        }

        Ok(records)
    }

    async fn save_order_row(&self, order: &OrderRow) -> Result<()> {
        let mut conn = self.pool.acquire().await?;
        update_order(&mut conn, order).await
    }

    async fn insert_item_rows(&self, rows: &[OrderItemRow]) -> Result<()> {
        let mut tx = self.pool.begin().await?;
        for row in rows {
            insert_item(&mut tx, row).await?;
        }
        tx.commit().await?;
        Ok(())
    }

    async fn delete_item_rows(&self, order_id: &OrderId, ids: &[OrderItemId]) -> Result<()> {
        let mut conn = self.pool.acquire().await?;
        delete_items(&mut conn, order_id, ids).await
    }

    async fn upsert_item_rows(&self, rows: &[OrderItemRow]) -> Result<()> {
        let mut tx = self.pool.begin().await?;
        for row in rows {
            upsert_item(&mut tx, row).await?;
        }
        tx.commit().await?;
        Ok(())
    }

    async fn delete_order(&self, id: &OrderId) -> Result<bool> {
        let result = sqlx::query("DELETE FROM orders WHERE id = $1")
            .bind(id.as_str())
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    #[tracing::instrument(
        skip(self, order, changes),
        fields(
            order_id = %order.id,
            deleted = changes.to_delete.len(),
            inserted = changes.to_insert.len(),
            upserted = changes.to_upsert.len(),
        )
    )]
    async fn apply_order_changes(
        &self,
        order: &OrderRow,
        changes: &OrderItemChanges,
    ) -> Result<()> {
        let mut tx = self.pool.begin().await?;

        update_order(&mut tx, order).await?;
        if !changes.to_delete.is_empty() {
            delete_items(&mut tx, &order.id, &changes.to_delete).await?;
        }
        for row in &changes.to_insert {
            insert_item(&mut tx, row).await?;
        }
        for row in &changes.to_upsert {
            upsert_item(&mut tx, row).await?;
        }

        // Dropping the transaction on an early return rolls it back.
        tx.commit().await?;
        Ok(())
    }
}

#[async_trait]
impl CustomerStore for PostgresStore {
    async fn insert_customer(&self, row: CustomerRow) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO customers (id, name, street, number, zip, city, active, reward_points)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            "#,
        )
        .bind(row.id.as_str())
        .bind(&row.name)
        .bind(&row.street)
        .bind(row.number)
        .bind(&row.zip)
        .bind(&row.city)
        .bind(row.active)
        .bind(row.reward_points)
        .execute(&self.pool)
        .await
        .map_err(map_db_error("customers", &row.id))?;
        Ok(())
    }

    async fn save_customer(&self, row: &CustomerRow) -> Result<()> {
        let mut conn = self.pool.acquire().await?;
        update_customer(&mut conn, row).await
    }

    async fn load_customer(&self, id: &CustomerId) -> Result<Option<CustomerRow>> {
        let row = sqlx::query(
            r#"
            SELECT id, name, street, number, zip, city, active, reward_points
            FROM customers
            WHERE id = $1
            "#,
        )
        .bind(id.as_str())
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(Self::row_to_customer).transpose()
    }

    async fn load_all_customers(&self) -> Result<Vec<CustomerRow>> {
        let rows = sqlx::query(
            r#"
            SELECT id, name, street, number, zip, city, active, reward_points
            FROM customers
            ORDER BY id COLLATE "C" ASC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(Self::row_to_customer).collect()
    }
}

#[async_trait]
impl ProductStore for PostgresStore {
    async fn insert_product(&self, row: ProductRow) -> Result<()> {
        sqlx::query("INSERT INTO products (id, name, price) VALUES ($1, $2, $3)")
            .bind(row.id.as_str())
            .bind(&row.name)
            .bind(row.price)
            .execute(&self.pool)
            .await
            .map_err(map_db_error("products", &row.id))?;
        Ok(())
    }

    async fn save_product(&self, row: &ProductRow) -> Result<()> {
        let result = sqlx::query("UPDATE products SET name = $2, price = $3 WHERE id = $1")
            .bind(row.id.as_str())
            .bind(&row.name)
            .bind(row.price)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::not_found("products", &row.id));
        }
        Ok(())
    }

    async fn load_product(&self, id: &ProductId) -> Result<Option<ProductRow>> {
        let row = sqlx::query("SELECT id, name, price FROM products WHERE id = $1")
            .bind(id.as_str())
            .fetch_optional(&self.pool)
            .await?;

        row.as_ref().map(Self::row_to_product).transpose()
    }

    async fn load_all_products(&self) -> Result<Vec<ProductRow>> {
        let rows =
            sqlx::query(r#"SELECT id, name, price FROM products ORDER BY id COLLATE "C" ASC"#)
                .fetch_all(&self.pool)
                .await?;

        rows.iter().map(Self::row_to_product).collect()
    }
}
