use crate::domain::{OrderCreate, OrderStatus, StaffAssignment};

/// Custom actions for order batches.
///
/// Every action applies to the whole batch, so all lines always share one
/// status and one header.
#[derive(Debug, Clone)]
pub enum OrderAction {
    /// Move the batch to a later status.
    ///
    /// # Errors
    /// Fails with `InvalidState` when the target is behind the current status.
    UpdateStatus(OrderStatus),
    /// Attach a delivery rider and move the batch to `out_for_delivery`.
    AssignStaff(StaffAssignment),
    /// Add lines to a batch that is still `received`. Header fields must match.
    AppendLines(OrderCreate),
}
