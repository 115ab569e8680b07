/// Custom actions for catalog products.
///
/// These cover stock handling beyond plain CRUD.
#[derive(Debug, Clone)]
pub enum ProductAction {
    /// Takes units out of stock for a checkout.
    ///
    /// # Errors
    /// Fails if the requested amount exceeds available stock.
    ReserveStock(u32),
    /// Puts units back, e.g. when a checkout is rolled back.
    ReleaseStock(u32),
    /// Overwrites the stock level from the admin inventory screen.
    SetStock(u32),
}

/// Results from ProductActions - variants match 1:1 with ProductAction
#[derive(Debug, Clone, PartialEq)]
pub enum ProductActionResult {
    ReserveStock(u32),
    ReleaseStock(u32),
    SetStock(u32),
}

impl ProductActionResult {
    /// Stock level after the action.
    pub fn stock(&self) -> u32 {
        match self {
            ProductActionResult::ReserveStock(level)
            | ProductActionResult::ReleaseStock(level)
            | ProductActionResult::SetStock(level) => *level,
        }
    }
}
