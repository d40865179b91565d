//! Shared execution context passed to every component constructor

use std::sync::Arc;

use slog::Logger;

use crate::config::Config;
use crate::hub::HubApi;

/// Bundles the logger, validated configuration and the hub accessor.
///
/// Passed explicitly into every component; there is no ambient global state.
/// The hub handle and config are read-mostly and safe to share across
/// concurrently running suites.
#[derive(Clone)]
pub struct Context {
    pub log: Logger,
    pub config: Config,
    pub hub: Arc<dyn HubApi>,
}

impl Context {
    pub fn new(log: Logger, config: Config, hub: Arc<dyn HubApi>) -> Arc<Self> {
        Arc::new(Self { log, config, hub })
    }
}
