//! Typed handles over the resource actors.

#[macro_use]
mod macros;
mod feedback_client;
mod loyalty_client;
mod order_client;
mod product_client;
mod staff_client;

pub use feedback_client::FeedbackClient;
pub use loyalty_client::LoyaltyClient;
pub use order_client::OrderClient;
pub use product_client::ProductClient;
pub use staff_client::StaffClient;
