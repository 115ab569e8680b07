pub mod order;
pub mod loyalty;
pub mod product;
pub mod staff;
pub mod feedback;

pub use order::*;
pub use loyalty::*;
pub use product::*;
pub use staff::*;
pub use feedback::*;
