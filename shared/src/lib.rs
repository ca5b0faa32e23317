//! # Curtain Shared
//! Common functionality shared between curtain-server & curtain-client crates:
//! the fade animator, the per-node transition state machine, the control
//! messages exchanged between authority and peers, and the traits for the
//! external collaborators (overlay, scene loader, transport).

#![deny(trivial_numeric_casts, unstable_features, unused_import_braces)]

mod epoch;
mod error;
mod fade;
mod messages;
mod overlay;
mod scene;
mod transition;
mod types;

pub use epoch::EpochId;
pub use error::{TransitionError, TransportError};
pub use fade::fade_animator::{FadeAnimator, FadeTick};
pub use messages::{
    message::{AuthorityMessage, PeerMessage},
    transport::{AuthorityTransport, PeerTransport},
};
pub use overlay::{Color, FadeOverlay};
pub use scene::{LoadMode, LoadReport, SceneLoader, SceneTarget};
pub use transition::{
    observers::{ObserverKey, TransitionEvent, TransitionObservers},
    transition_config::TransitionConfig,
    transition_epoch::{MidTransitionCallback, TransitionEpoch, TransitionKind},
    transition_machine::TransitionMachine,
    transition_state::TransitionState,
};
pub use types::{NodeRole, PeerKey};
