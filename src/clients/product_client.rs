use tracing::{debug, info, instrument};

use crate::actor_framework::ResourceClient;
use crate::domain::{Product, ProductCreate, ProductPatch};
use crate::product_actor::{ProductAction, ProductError};

/// Client for interacting with the Product actor.
#[derive(Clone)]
pub struct ProductClient {
    inner: ResourceClient<Product>,
}

impl_basic_client!(ProductClient, Product, ProductError, product);

impl ProductClient {
    #[instrument(skip(self))]
    pub async fn create_product(&self, params: ProductCreate) -> Result<Product, ProductError> {
        debug!("Sending request");
        let id = self.inner.create(params).await?;
        info!(product_id = %id, "Product added to catalog");
        self.get_product(id).await
    }

    #[instrument(skip(self))]
    pub async fn update_product(&self, id: String, patch: ProductPatch) -> Result<Product, ProductError> {
        debug!("Sending request");
        Ok(self.inner.update(id, patch).await?)
    }

    /// Catalog entries matching the optional category and search text.
    #[instrument(skip(self))]
    pub async fn search_products(
        &self,
        category: Option<String>,
        search: Option<String>,
    ) -> Result<Vec<Product>, ProductError> {
        let mut products: Vec<Product> = self
            .list_products()
            .await?
            .into_iter()
            .filter(|p| p.matches(category.as_deref(), search.as_deref()))
            .collect();
        products.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(products)
    }

    #[instrument(skip(self))]
    pub async fn reserve_stock(&self, id: String, quantity: u32) -> Result<u32, ProductError> {
        debug!("Sending request");
        let result = self.inner.perform_action(id, ProductAction::ReserveStock(quantity)).await?;
        Ok(result.stock())
    }

    #[instrument(skip(self))]
    pub async fn release_stock(&self, id: String, quantity: u32) -> Result<u32, ProductError> {
        debug!("Sending request");
        let result = self.inner.perform_action(id, ProductAction::ReleaseStock(quantity)).await?;
        Ok(result.stock())
    }

    #[instrument(skip(self))]
    pub async fn set_stock(&self, id: String, stock: u32) -> Result<u32, ProductError> {
        debug!("Sending request");
        let result = self.inner.perform_action(id, ProductAction::SetStock(stock)).await?;
        Ok(result.stock())
    }
}
