use rust_decimal::Decimal;

use super::actions::{ProductAction, ProductActionResult};
use super::error::ProductError;
use crate::actor_framework::Entity;
use crate::domain::{Product, ProductCreate, ProductPatch};

impl Entity for Product {
    type Id = String;
    type CreateParams = ProductCreate;
    type Patch = ProductPatch;
    type Action = ProductAction;
    type ActionResult = ProductActionResult;
    type Error = ProductError;

    fn id(&self) -> &String { &self.id }

    /// Creates a new Product from creation parameters.
    ///
    /// # Arguments
    /// * `id` - Unique identifier for the product
    /// * `params` - Name, price, category, stock and display fields
    fn from_create_params(id: String, params: ProductCreate) -> Result<Self, ProductError> {
        let name = required(params.name, "name")?;
        let category = required(params.category, "category")?.to_lowercase();
        check_price(params.price)?;
        Ok(Self {
            id,
            name,
            description: params.description.trim().to_string(),
            price: params.price,
            category,
            image: params.image,
            stock: params.stock,
            popular: params.popular,
        })
    }

    /// Applies the fields present in `patch`.
    fn on_update(&mut self, patch: ProductPatch) -> Result<(), ProductError> {
        if let Some(name) = patch.name {
            self.name = required(name, "name")?;
        }
        if let Some(description) = patch.description {
            self.description = description.trim().to_string();
        }
        if let Some(price) = patch.price {
            check_price(price)?;
            self.price = price;
        }
        if let Some(category) = patch.category {
            self.category = required(category, "category")?.to_lowercase();
        }
        if let Some(image) = patch.image {
            self.image = image;
        }
        if let Some(stock) = patch.stock {
            self.stock = stock;
        }
        if let Some(popular) = patch.popular {
            self.popular = popular;
        }
        Ok(())
    }

    /// Handles product-specific actions.
    ///
    /// # Errors
    /// Returns an error if attempting to reserve more stock than available.
    fn handle_action(&mut self, action: ProductAction) -> Result<ProductActionResult, ProductError> {
        match action {
            ProductAction::ReserveStock(amount) => {
                if self.stock >= amount {
                    self.stock -= amount;
                    Ok(ProductActionResult::ReserveStock(self.stock))
                } else {
                    Err(ProductError::InsufficientStock {
                        product: self.name.clone(),
                        requested: amount,
                        available: self.stock,
                    })
                }
            }
            ProductAction::ReleaseStock(amount) => {
                self.stock = self.stock.saturating_add(amount);
                Ok(ProductActionResult::ReleaseStock(self.stock))
            }
            ProductAction::SetStock(level) => {
                self.stock = level;
                Ok(ProductActionResult::SetStock(self.stock))
            }
        }
    }
}

fn required(value: String, field: &str) -> Result<String, ProductError> {
    let value = value.trim().to_string();
    if value.is_empty() {
        return Err(ProductError::ValidationError(format!("{field} is required")));
    }
    Ok(value)
}

fn check_price(price: Decimal) -> Result<(), ProductError> {
    if price <= Decimal::ZERO {
        return Err(ProductError::ValidationError("price must be positive".to_string()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn classic() -> Product {
        Product::from_create_params(
            "prod_1".into(),
            ProductCreate {
                name: " Classic Orange Juice ".into(),
                description: String::new(),
                price: Decimal::from(89),
                category: "Classic".into(),
                image: String::new(),
                stock: 10,
                popular: true,
            },
        )
        .unwrap()
    }

    #[test]
    fn create_trims_and_lowercases_category() {
        let product = classic();
        assert_eq!(product.name, "Classic Orange Juice");
        assert_eq!(product.category, "classic");
    }

    #[test]
    fn reserve_and_release_stock() {
        let mut product = classic();
        assert_eq!(product.handle_action(ProductAction::ReserveStock(4)).unwrap().stock(), 6);
        assert_eq!(
            product.handle_action(ProductAction::ReserveStock(7)).unwrap_err(),
            ProductError::InsufficientStock { product: "Classic Orange Juice".into(), requested: 7, available: 6 }
        );
        assert_eq!(product.handle_action(ProductAction::ReleaseStock(4)).unwrap().stock(), 10);
        assert_eq!(product.handle_action(ProductAction::SetStock(3)).unwrap().stock(), 3);
    }

    #[test]
    fn patch_rejects_non_positive_price() {
        let mut product = classic();
        let patch = ProductPatch { price: Some(Decimal::ZERO), ..Default::default() };
        assert!(matches!(product.on_update(patch), Err(ProductError::ValidationError(_))));
    }
}
