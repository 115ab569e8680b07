use std::path::Path;

use thiserror::Error;
use tokio::task::JoinHandle;
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::actor_framework::{Entity, ResourceActor, ResourceClient};
use crate::checkout::CheckoutClient;
use crate::clients::{FeedbackClient, LoyaltyClient, OrderClient, ProductClient, StaffClient};
use crate::dispatch::DispatchClient;
use crate::domain::{default_catalog, CustomerKey, DeliveryStaff, Feedback, LoyaltyAccount, Order, OrderId, Product};
use crate::persistence::{PersistError, SnapshotFile};
use crate::product_actor::ProductError;

use super::Config;

#[derive(Debug, Error)]
pub enum SystemError {
    #[error("Could not load {store} snapshot: {source}")]
    Snapshot { store: &'static str, source: PersistError },
    #[error("Could not seed catalog: {0}")]
    Seed(#[from] ProductError),
    #[error("Actor task failed: {0}")]
    Join(#[from] tokio::task::JoinError),
}

/// The main application system that orchestrates all actors.
///
/// Responsible for starting up actors, wiring them together, and handling shutdown.
pub struct StorefrontSystem {
    pub orders: OrderClient,
    pub loyalty: LoyaltyClient,
    pub products: ProductClient,
    pub staff: StaffClient,
    pub feedback: FeedbackClient,
    pub checkout: CheckoutClient,
    pub dispatch: DispatchClient,
    handles: Vec<JoinHandle<()>>,
}

impl StorefrontSystem {
    pub async fn start(config: &Config) -> Result<Self, SystemError> {
        let data_dir = config.data_dir.as_deref();
        let buffer = config.actor_buffer;
        let mut handles = Vec::new();

        // 1. Orders
        let orders = spawn_store::<Order>(buffer, data_dir, "orders", OrderId::generate, &mut handles)?;
        let orders = OrderClient::new(orders);

        // 2. Loyalty accounts are keyed by the customer, never by a generated id.
        let loyalty = spawn_store::<LoyaltyAccount>(buffer, data_dir, "loyalty", unkeyed_account, &mut handles)?;
        let loyalty = LoyaltyClient::new(loyalty);

        // 3. Catalog, roster, feedback
        let products = spawn_store::<Product>(buffer, data_dir, "products", || prefixed_id("prod"), &mut handles)?;
        let products = ProductClient::new(products);
        let staff = spawn_store::<DeliveryStaff>(buffer, data_dir, "staff", || prefixed_id("staff"), &mut handles)?;
        let staff = StaffClient::new(staff);
        let feedback = spawn_store::<Feedback>(buffer, data_dir, "feedback", || prefixed_id("fb"), &mut handles)?;
        let feedback = FeedbackClient::new(feedback);

        // 4. Orchestrators
        let checkout = CheckoutClient::new(orders.clone(), loyalty.clone(), products.clone(), config.delivery_fee);
        let dispatch = DispatchClient::new(orders.clone(), staff.clone());

        let system = Self { orders, loyalty, products, staff, feedback, checkout, dispatch, handles };
        if config.seed_catalog {
            system.seed_catalog().await?;
        }
        info!(persistent = data_dir.is_some(), "Storefront system started");
        Ok(system)
    }

    async fn seed_catalog(&self) -> Result<(), ProductError> {
        if !self.products.list_products().await?.is_empty() {
            return Ok(());
        }
        for params in default_catalog() {
            self.products.create_product(params).await?;
        }
        info!("Seeded empty catalog with the default juice range");
        Ok(())
    }

    pub async fn shutdown(self) -> Result<(), SystemError> {
        info!("Shutting down system...");
        // Actors stop once every client handle is gone.
        let Self { orders, loyalty, products, staff, feedback, checkout, dispatch, handles } = self;
        drop((orders, loyalty, products, staff, feedback, checkout, dispatch));

        for handle in handles {
            if let Err(e) = handle.await {
                error!("Actor task failed: {:?}", e);
                return Err(e.into());
            }
        }

        info!("System shutdown complete.");
        Ok(())
    }
}

fn spawn_store<T: Entity>(
    buffer: usize,
    data_dir: Option<&Path>,
    store: &'static str,
    next_id: impl Fn() -> T::Id + Send + Sync + 'static,
    handles: &mut Vec<JoinHandle<()>>,
) -> Result<ResourceClient<T>, SystemError> {
    let (mut actor, client) = ResourceActor::<T>::new(buffer, next_id);
    if let Some(dir) = data_dir {
        actor = actor
            .with_snapshot(SnapshotFile::in_dir(dir, store))
            .map_err(|source| SystemError::Snapshot { store, source })?;
    }
    handles.push(tokio::spawn(actor.run()));
    Ok(client)
}

fn prefixed_id(prefix: &str) -> String {
    format!("{prefix}_{}", Uuid::new_v4().simple())
}

/// Loyalty accounts are only ever created under the customer's own key.
fn unkeyed_account() -> CustomerKey {
    warn!("Loyalty store asked to generate an account key");
    CustomerKey::unassigned()
}
