//! # Curtain Server
//! The authority side of a networked scene transition. The authority
//! broadcasts the start of each epoch, fades and loads like any other peer,
//! collects ready reports from every connected peer and broadcasts the
//! release once all of them have loaded.

#![deny(
    trivial_casts,
    trivial_numeric_casts,
    unstable_features,
    unused_import_braces
)]

pub mod shared {
    pub use curtain_shared::{
        AuthorityMessage, AuthorityTransport, Color, EpochId, FadeOverlay, LoadMode, LoadReport,
        PeerKey, PeerMessage, SceneLoader, SceneTarget, TransitionConfig, TransitionEvent,
        TransitionState, TransportError,
    };
}

mod authority;
mod barrier;

pub use authority::{Authority, AuthorityConfig};
pub use barrier::{BarrierCoordinator, BarrierOutcome, ReadySet};
