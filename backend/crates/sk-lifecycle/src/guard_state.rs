#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GuardState {
    Healthy,
    /// Consecutive failures so far, still within budget
    Degraded(u32),
    Tripped,
}
