//! Shared application state.

use proximity_core::LinkConnector;

use crate::config::Config;

/// State injected into every handler.
///
/// Holds no monitor state: each check opens its own links and builds its
/// own monitor, so concurrent requests never share anything mutable.
pub struct AppState<C> {
    pub connector: C,
    pub config: Config,
}

impl<C: LinkConnector> AppState<C> {
    pub fn new(connector: C, config: Config) -> Self {
        Self { connector, config }
    }
}
