mod barrier_coordinator;
mod ready_set;

pub use barrier_coordinator::{BarrierCoordinator, BarrierOutcome};
pub use ready_set::ReadySet;
