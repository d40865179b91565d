//! drover: disaster-recovery action orchestration for hub-managed workloads
//!
//! Coordinates protect, failover, relocate and unprotect transitions for
//! application workloads spread across a hub cluster and two managed
//! clusters. The engine reconciles eventually-consistent resources (the
//! placement engine, the DR controller, storage health) into terminating,
//! caller-visible operations by mutating hub objects and polling until the
//! effects are observable.

pub mod config;
pub mod context;
pub mod deployers;
pub mod dractions;
pub mod hub;
pub mod resources;
pub mod retry;
pub mod suites;
pub mod util;
pub mod workloads;

pub use config::Config;
pub use context::Context;
pub use dractions::{DrActions, DrError};
pub use hub::{ApiError, HttpHub, HubApi, InMemoryHub};
pub use retry::{wait_until, WaitError};
pub use suites::{run_suites, BasicSuite, PrecheckSuite, SuiteError, TestSuite};
