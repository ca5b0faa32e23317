use std::time::Duration;

use curtain_shared::TransitionConfig;

/// Contains Config properties which will be used by the Authority
#[derive(Clone, Debug, Default)]
pub struct AuthorityConfig {
    /// Used to configure the authority's own transition machine
    pub transition: TransitionConfig,
    /// How long the readiness barrier waits after the first ready report
    /// before excluding peers that have not reported. `None` waits forever, so a peer that disconnects
    /// mid-load keeps the barrier closed
    pub barrier_timeout: Option<Duration>,
}
