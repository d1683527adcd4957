//! PostgreSQL integration tests
//!
//! These tests use a shared PostgreSQL container for efficiency.
//! Run with:
//!
//! ```bash
//! cargo test -p store --test postgres_integration -- --test-threads=1
//! ```

use std::sync::Arc;

use common::{CustomerId, OrderId, OrderItemId, ProductId};
use sqlx::PgPool;
use store::{
    CustomerRow, CustomerStore, OrderItemChanges, OrderItemRow, OrderRow, OrderStore,
    PostgresStore, ProductRow, ProductStore, StoreError,
};
use testcontainers::{ContainerAsync, runners::AsyncRunner};
use testcontainers_modules::postgres::Postgres;
use tokio::sync::OnceCell;

/// Shared container info - container stays alive for all tests
struct ContainerInfo {
    #[allow(dead_code)] // Container must stay alive for tests
    container: ContainerAsync<Postgres>,
    connection_string: String,
}

static CONTAINER: OnceCell<Arc<ContainerInfo>> = OnceCell::const_new();

async fn get_container_info() -> Arc<ContainerInfo> {
    CONTAINER
        .get_or_init(|| async {
            let container = Postgres::default().start().await.unwrap();

            let host = container.get_host().await.unwrap();
            let port = container.get_host_port_ipv4(5432).await.unwrap();

            let connection_string =
                format!("postgres://postgres:postgres@{}:{}/postgres", host, port);

            let temp_pool = PgPool::connect(&connection_string).await.unwrap();
            PostgresStore::new(temp_pool.clone())
                .run_migrations()
                .await
                .unwrap();
            temp_pool.close().await;

            Arc::new(ContainerInfo {
                container,
                connection_string,
            })
        })
        .await
        .clone()
}

/// Get a fresh store with its own pool, cleared tables and seed data:
/// customers c1, c2 and products p1 (10.00), p2 (20.00).
async fn get_test_store() -> PostgresStore {
    let info = get_container_info().await;

    let pool = sqlx::postgres::PgPoolOptions::new()
        .max_connections(5)
        .connect(&info.connection_string)
        .await
        .unwrap();

    sqlx::query("TRUNCATE TABLE order_items, orders, products, customers")
        .execute(&pool)
        .await
        .unwrap();

    let store = PostgresStore::new(pool);
    for id in ["c1", "c2"] {
        store.insert_customer(customer(id)).await.unwrap();
    }
    store.insert_product(product("p1", 1000)).await.unwrap();
    store.insert_product(product("p2", 2000)).await.unwrap();
    store
}

fn customer(id: &str) -> CustomerRow {
    CustomerRow {
        id: CustomerId::new(id),
        name: format!("Customer {id}"),
        street: Some("Street 1".to_string()),
        number: Some(1),
        zip: Some("Zipcode 1".to_string()),
        city: Some("City 1".to_string()),
        active: false,
        reward_points: 0,
    }
}

fn product(id: &str, price: i64) -> ProductRow {
    ProductRow {
        id: ProductId::new(id),
        name: format!("Product {id}"),
        price,
    }
}

fn order(id: &str, customer_id: &str, total: i64) -> OrderRow {
    OrderRow {
        id: OrderId::new(id),
        customer_id: CustomerId::new(customer_id),
        total,
    }
}

fn item(id: &str, order_id: &str, product_id: &str, price: i64, quantity: i64) -> OrderItemRow {
    OrderItemRow {
        id: OrderItemId::new(id),
        order_id: OrderId::new(order_id),
        position: 0,
        product_id: ProductId::new(product_id),
        name: format!("Product {product_id}"),
        price,
        quantity,
    }
}

fn at(position: i64, row: OrderItemRow) -> OrderItemRow {
    OrderItemRow { position, ..row }
}

#[tokio::test]
async fn insert_and_load_order() {
    let store = get_test_store().await;

    store
        .insert_order(
            order("o1", "c1", 2000),
            vec![item("1", "o1", "p1", 1000, 2)],
        )
        .await
        .unwrap();

    let record = store
        .load_order_row(&OrderId::new("o1"))
        .await
        .unwrap()
        .unwrap();
    assert_eq!(record.order, order("o1", "c1", 2000));
    assert_eq!(record.items, vec![item("1", "o1", "p1", 1000, 2)]);
}

#[tokio::test]
async fn load_missing_order_returns_none() {
    let store = get_test_store().await;
    let result = store.load_order_row(&OrderId::new("missing")).await.unwrap();
    assert!(result.is_none());
}

#[tokio::test]
async fn insert_order_is_atomic() {
    let store = get_test_store().await;

    let result = store
        .insert_order(
            order("o1", "c1", 3000),
            vec![
                item("1", "o1", "p1", 1000, 1),
                at(1, item("2", "o1", "unknown", 2000, 1)),
            ],
        )
        .await;

    assert!(matches!(
        result,
        Err(StoreError::ForeignKeyViolation {
            table: "order_items",
            ..
        })
    ));
    assert!(
        store
            .load_order_row(&OrderId::new("o1"))
            .await
            .unwrap()
            .is_none()
    );
}

#[tokio::test]
async fn insert_order_with_customer_commits_both() {
    let store = get_test_store().await;
    let mut c1 = customer("c1");
    c1.reward_points = 1000;

    store
        .insert_order_with_customer(
            order("o1", "c1", 2000),
            vec![item("1", "o1", "p1", 1000, 2)],
            &c1,
        )
        .await
        .unwrap();

    assert!(store.load_order_row(&OrderId::new("o1")).await.unwrap().is_some());
    assert_eq!(
        store.load_customer(&CustomerId::new("c1")).await.unwrap(),
        Some(c1)
    );
}

#[tokio::test]
async fn insert_order_with_customer_rolls_back_when_customer_is_missing() {
    let store = get_test_store().await;

    let result = store
        .insert_order_with_customer(
            order("o1", "c1", 2000),
            vec![item("1", "o1", "p1", 1000, 2)],
            &customer("c9"),
        )
        .await;

    assert!(matches!(
        result,
        Err(StoreError::NotFound { table: "customers", .. })
    ));
    assert!(
        store
            .load_order_row(&OrderId::new("o1"))
            .await
            .unwrap()
            .is_none()
    );
    let items: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM order_items")
        .fetch_one(store.pool())
        .await
        .unwrap();
    assert_eq!(items, 0);
}

#[tokio::test]
async fn duplicate_order_id_is_reported() {
    let store = get_test_store().await;
    store
        .insert_order(order("o1", "c1", 1000), vec![item("1", "o1", "p1", 1000, 1)])
        .await
        .unwrap();

    let result = store
        .insert_order(order("o1", "c2", 1000), vec![item("1", "o1", "p1", 1000, 1)])
        .await;
    assert!(matches!(
        result,
        Err(StoreError::DuplicateKey { table: "orders", .. })
    ));
}

#[tokio::test]
async fn unknown_customer_is_a_foreign_key_violation() {
    let store = get_test_store().await;
    let result = store.insert_order(order("o1", "ghost", 0), vec![]).await;
    assert!(matches!(
        result,
        Err(StoreError::ForeignKeyViolation { table: "orders", .. })
    ));
}

#[tokio::test]
async fn apply_changes_reconciles_item_rows() {
    let store = get_test_store().await;
    store
        .insert_order(
            order("o1", "c1", 3000),
            vec![
                item("id1", "o1", "p1", 1000, 1),
                at(1, item("id2", "o1", "p2", 2000, 1)),
            ],
        )
        .await
        .unwrap();

    let changes = OrderItemChanges {
        to_delete: vec![OrderItemId::new("id1")],
        to_insert: vec![at(1, item("id3", "o1", "p1", 1000, 3))],
        to_upsert: vec![item("id2", "o1", "p2", 2000, 2)],
    };
    store
        .apply_order_changes(&order("o1", "c2", 7000), &changes)
        .await
        .unwrap();

    let record = store
        .load_order_row(&OrderId::new("o1"))
        .await
        .unwrap()
        .unwrap();
    assert_eq!(record.order, order("o1", "c2", 7000));
    assert_eq!(
        record.items,
        vec![
            item("id2", "o1", "p2", 2000, 2),
            at(1, item("id3", "o1", "p1", 1000, 3)),
        ]
    );
}

#[tokio::test]
async fn apply_changes_rolls_back_on_failure() {
    let store = get_test_store().await;
    store
        .insert_order(
            order("o1", "c1", 3000),
            vec![
                item("id1", "o1", "p1", 1000, 1),
                at(1, item("id2", "o1", "p2", 2000, 1)),
            ],
        )
        .await
        .unwrap();

    let changes = OrderItemChanges {
        to_delete: vec![OrderItemId::new("id1")],
        to_insert: vec![at(1, item("id3", "o1", "no-such-product", 1000, 1))],
        to_upsert: vec![item("id2", "o1", "p2", 2000, 9)],
    };
    let result = store
        .apply_order_changes(&order("o1", "c2", 1), &changes)
        .await;
    assert!(matches!(
        result,
        Err(StoreError::ForeignKeyViolation { .. })
    ));

    let record = store
        .load_order_row(&OrderId::new("o1"))
        .await
        .unwrap()
        .unwrap();
    assert_eq!(record.order, order("o1", "c1", 3000));
    assert_eq!(record.items.len(), 2);
    assert_eq!(record.items[1].quantity, 1);
}

#[tokio::test]
async fn apply_changes_on_missing_order_is_not_found() {
    let store = get_test_store().await;
    let result = store
        .apply_order_changes(&order("nope", "c1", 0), &OrderItemChanges::default())
        .await;
    assert!(matches!(
        result,
        Err(StoreError::NotFound { table: "orders", .. })
    ));
}

#[tokio::test]
async fn items_load_in_position_order() {
    let store = get_test_store().await;
    store
        .insert_order(
            order("o1", "c1", 3000),
            vec![
                at(1, item("a", "o1", "p1", 1000, 1)),
                item("b", "o1", "p2", 2000, 1),
            ],
        )
        .await
        .unwrap();

    let record = store
        .load_order_row(&OrderId::new("o1"))
        .await
        .unwrap()
        .unwrap();
    let ids: Vec<_> = record.items.iter().map(|r| r.id.as_str()).collect();
    assert_eq!(ids, vec!["b", "a"]);
}

#[tokio::test]
async fn upsert_rewrites_position() {
    let store = get_test_store().await;
    store
        .insert_order(
            order("o1", "c1", 3000),
            vec![
                item("a", "o1", "p1", 1000, 1),
                at(1, item("b", "o1", "p2", 2000, 1)),
            ],
        )
        .await
        .unwrap();

    store
        .upsert_item_rows(&[
            item("b", "o1", "p2", 2000, 1),
            at(1, item("a", "o1", "p1", 1000, 4)),
        ])
        .await
        .unwrap();

    let record = store
        .load_order_row(&OrderId::new("o1"))
        .await
        .unwrap()
        .unwrap();
    let ids: Vec<_> = record.items.iter().map(|r| r.id.as_str()).collect();
    assert_eq!(ids, vec!["b", "a"]);
    assert_eq!(record.items[1].quantity, 4);
}

#[tokio::test]
async fn load_all_groups_items_by_order() {
    let store = get_test_store().await;
    store
        .insert_order(order("o2", "c1", 1000), vec![item("1", "o2", "p1", 1000, 1)])
        .await
        .unwrap();
    store
        .insert_order(order("o1", "c2", 2000), vec![item("1", "o1", "p2", 2000, 1)])
        .await
        .unwrap();

    let records = store.load_all_order_rows().await.unwrap();
    assert_eq!(records.len(), 2);
    assert_eq!(records[0].order.id, OrderId::new("o1"));
    assert_eq!(records[0].items[0].product_id, ProductId::new("p2"));
    assert_eq!(records[1].order.id, OrderId::new("o2"));
    assert_eq!(records[1].items[0].product_id, ProductId::new("p1"));
}

#[tokio::test]
async fn delete_order_cascades_to_items() {
    let store = get_test_store().await;
    store
        .insert_order(order("o1", "c1", 1000), vec![item("1", "o1", "p1", 1000, 1)])
        .await
        .unwrap();

    assert!(store.delete_order(&OrderId::new("o1")).await.unwrap());
    assert!(!store.delete_order(&OrderId::new("o1")).await.unwrap());

    let remaining: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM order_items")
        .fetch_one(store.pool())
        .await
        .unwrap();
    assert_eq!(remaining, 0);
}

#[tokio::test]
async fn customer_and_product_rows_round_trip() {
    let store = get_test_store().await;

    let mut c1 = customer("c1");
    c1.active = true;
    c1.reward_points = 25;
    store.save_customer(&c1).await.unwrap();
    assert_eq!(
        store.load_customer(&CustomerId::new("c1")).await.unwrap(),
        Some(c1)
    );

    let all = store.load_all_customers().await.unwrap();
    assert_eq!(all.len(), 2);

    let mut p1 = product("p1", 1500);
    p1.name = "Renamed".to_string();
    store.save_product(&p1).await.unwrap();
    assert_eq!(
        store.load_product(&ProductId::new("p1")).await.unwrap(),
        Some(p1)
    );

    assert!(matches!(
        store.save_product(&product("p9", 1)).await,
        Err(StoreError::NotFound { .. })
    ));
    assert!(matches!(
        store.insert_customer(customer("c1")).await,
        Err(StoreError::DuplicateKey { .. })
    ));
}
