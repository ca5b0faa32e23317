//! # Curtain Client
//! The peer side of a networked scene transition. A peer follows the
//! authority's start message, fades and loads locally, reports readiness
//! once its scene is loaded and waits for the authority's release.

#![deny(
    trivial_casts,
    trivial_numeric_casts,
    unstable_features,
    unused_import_braces
)]

pub mod shared {
    pub use curtain_shared::{
        AuthorityMessage, Color, EpochId, FadeOverlay, LoadMode, LoadReport, PeerKey,
        PeerMessage, PeerTransport, SceneLoader, SceneTarget, TransitionConfig, TransitionEvent,
        TransitionState, TransportError,
    };
}

mod peer;

pub use peer::{Peer, PeerConfig};
