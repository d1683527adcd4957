use async_trait::async_trait;
use common::{Money, ProductId};
use store::{ProductRow, ProductStore};

use super::Repository;
use crate::error::{DomainError, Result};
use crate::product::Product;

const ENTITY: &str = "Product";

/// Product repository over any [`ProductStore`].
#[derive(Debug, Clone)]
pub struct ProductRepository<S> {
    store: S,
}

impl<S: ProductStore> ProductRepository<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }
}

fn product_row(product: &Product) -> ProductRow {
    ProductRow {
        id: product.id().clone(),
        name: product.name().to_string(),
        price: product.price().cents(),
    }
}

fn product_from_row(row: ProductRow) -> Result<Product> {
    Product::restore(row.id.clone(), row.name, Money::from_cents(row.price))
        .map_err(|e| DomainError::corrupt(ENTITY, &row.id, e))
}

#[async_trait]
impl<S: ProductStore> Repository<Product> for ProductRepository<S> {
    type Id = ProductId;

    #[tracing::instrument(skip(self, product), fields(product_id = %product.id()))]
    async fn create(&self, product: &Product) -> Result<()> {
        self.store.insert_product(product_row(product)).await?;
        tracing::info!("product created");
        Ok(())
    }

    #[tracing::instrument(skip(self, product), fields(product_id = %product.id()))]
    async fn update(&self, product: &Product) -> Result<()> {
        self.store.save_product(&product_row(product)).await?;
        Ok(())
    }

    #[tracing::instrument(skip(self), fields(product_id = %id))]
    async fn find(&self, id: &ProductId) -> Result<Product> {
        let row = self
            .store
            .load_product(id)
            .await?
            .ok_or_else(|| DomainError::not_found(ENTITY, id))?;
        product_from_row(row)
    }

    #[tracing::instrument(skip(self))]
    async fn find_all(&self) -> Result<Vec<Product>> {
        let rows = self.store.load_all_products().await?;
        rows.into_iter().map(product_from_row).collect()
    }
}
