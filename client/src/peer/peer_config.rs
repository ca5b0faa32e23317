use curtain_shared::TransitionConfig;

/// Contains Config properties which will be used by a Peer
#[derive(Clone, Debug, Default)]
pub struct PeerConfig {
    /// Used to configure the peer's transition machine
    pub transition: TransitionConfig,
}
