use thiserror::Error;

use crate::{EpochId, PeerKey, TransitionState};

/// Errors that can occur when starting or driving a transition
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransitionError {
    /// A transition is already running on this node
    #[error("Cannot begin a transition while another one is in state {state:?}. Wait for the current transition to return to Idle")]
    AlreadyTransitioning { state: TransitionState },

    /// The overlay used for fading has not been set
    #[error("No fade overlay is configured. Call set_overlay() before starting a local transition")]
    MissingOverlay,

    /// A fade-out was requested while no transition is running
    #[error("Cannot fade out: no transition is in progress")]
    NotTransitioning,

    /// A fade-out was requested while one is already running
    #[error("Fade-out already in progress for {epoch}")]
    AlreadyFadingOut { epoch: EpochId },
}

/// Errors that can occur when moving control messages between nodes
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransportError {
    /// The peer is no longer connected to the authority
    #[error("{peer} is not connected. The message was dropped")]
    PeerDisconnected { peer: PeerKey },

    /// The authority could not be reached from this peer
    #[error("The authority is unreachable. The message was dropped")]
    AuthorityUnreachable,

    /// The underlying transport refused the message
    #[error("Transport rejected message: {reason}")]
    Rejected { reason: String },
}
