//! DR action engine
//!
//! The four intent transitions for a protected workload: enable protection,
//! failover, relocate, disable protection. Each one mutates DRPC/Placement
//! objects on the hub and then polls cross-cluster status until the
//! transition's effects are externally observable.

mod actions;
mod errors;
mod retry;

pub use actions::DrActions;
pub use errors::DrError;
pub use retry::drpc_ready;
