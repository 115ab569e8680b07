/// Roster actions driven by order dispatch.
#[derive(Debug, Clone)]
pub enum StaffAction {
    /// Mark the rider as out on a delivery.
    ///
    /// # Errors
    /// `Unavailable` when the rider is already assigned.
    Assign,
    /// Free the rider once their delivery completes.
    Release,
    /// Flip between assigned and not assigned from the admin roster.
    Toggle,
}
