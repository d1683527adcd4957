use super::{Product, ProductError};

/// Stateless operations over sets of products.
pub struct ProductService;

impl ProductService {
    /// Raises the price of every product by `percent` (truncated to whole
    /// cents).
    ///
    /// Prices are checked before any product is changed, so on error the
    /// slice is left untouched.
    #[tracing::instrument(skip(products), fields(count = products.len()))]
    pub fn increase_prices(products: &mut [Product], percent: i64) -> Result<(), ProductError> {
        let new_prices = products
            .iter()
            .map(|p| {
                p.price()
                    .checked_increase_by_percent(percent)
                    .ok_or(ProductError::PriceOverflow)
            })
            .collect::<Result<Vec<_>, _>>()?;
        if let Some(price) = new_prices.iter().find(|p| p.is_negative()) {
            return Err(ProductError::NegativePrice { price: *price });
        }

        for (product, price) in products.iter_mut().zip(new_prices) {
            product.change_price(price)?;
        }
        Ok(())
    }
}
