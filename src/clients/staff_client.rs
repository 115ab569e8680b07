use tracing::{debug, info, instrument};

use crate::actor_framework::ResourceClient;
use crate::domain::{DeliveryStaff, StaffCreate, StaffPatch};
use crate::staff_actor::{StaffAction, StaffError};

/// Client for the delivery rider roster.
#[derive(Clone)]
pub struct StaffClient {
    inner: ResourceClient<DeliveryStaff>,
}

impl_basic_client!(StaffClient, DeliveryStaff, StaffError, staff_member);

impl StaffClient {
    #[instrument(skip(self))]
    pub async fn create_staff_member(&self, params: StaffCreate) -> Result<DeliveryStaff, StaffError> {
        debug!("Sending request");
        let id = self.inner.create(params).await?;
        info!(staff_id = %id, "Staff member added");
        self.get_staff_member(id).await
    }

    #[instrument(skip(self))]
    pub async fn update_staff_member(&self, id: String, patch: StaffPatch) -> Result<DeliveryStaff, StaffError> {
        debug!("Sending request");
        Ok(self.inner.update(id, patch).await?)
    }

    #[instrument(skip(self))]
    pub async fn assign(&self, id: String) -> Result<DeliveryStaff, StaffError> {
        Ok(self.inner.perform_action(id, StaffAction::Assign).await?)
    }

    #[instrument(skip(self))]
    pub async fn release(&self, id: String) -> Result<DeliveryStaff, StaffError> {
        Ok(self.inner.perform_action(id, StaffAction::Release).await?)
    }

    #[instrument(skip(self))]
    pub async fn toggle(&self, id: String) -> Result<DeliveryStaff, StaffError> {
        Ok(self.inner.perform_action(id, StaffAction::Toggle).await?)
    }
}
