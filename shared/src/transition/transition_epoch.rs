use std::{fmt, time::Duration};

use crate::{EpochId, LoadMode, SceneTarget, TransitionState};

/// Invoked once, when the overlay reaches full opacity and before any scene
/// load begins.
pub type MidTransitionCallback = Box<dyn FnOnce()>;

/// What a transition does once the overlay is opaque.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TransitionKind {
    /// Load `target` and wait for the authority's readiness barrier.
    Networked { target: SceneTarget, mode: LoadMode },
    /// Optionally load `target`, hold, then fade back out on this node only.
    Local { target: Option<SceneTarget> },
    /// Fade in and stay covered until told to fade out.
    FadeToBlack,
}

impl TransitionKind {
    pub fn is_networked(&self) -> bool {
        matches!(self, TransitionKind::Networked { .. })
    }
}

/// One run of the transition protocol on a single node.
pub struct TransitionEpoch {
    id: EpochId,
    kind: TransitionKind,
    state: TransitionState,
    fade_duration: Duration,
    hold_duration: Duration,
    mid_callback: Option<MidTransitionCallback>,
    hold_elapsed: Duration,
    released_early: bool,
}

impl TransitionEpoch {
    pub(crate) fn new(
        id: EpochId,
        kind: TransitionKind,
        fade_duration: Duration,
        hold_duration: Duration,
        mid_callback: Option<MidTransitionCallback>,
    ) -> Self {
        Self {
            id,
            kind,
            state: TransitionState::Idle,
            fade_duration,
            hold_duration,
            mid_callback,
            hold_elapsed: Duration::ZERO,
            released_early: false,
        }
    }

    pub fn id(&self) -> EpochId {
        self.id
    }

    pub fn kind(&self) -> &TransitionKind {
        &self.kind
    }

    pub fn state(&self) -> TransitionState {
        self.state
    }

    pub fn fade_duration(&self) -> Duration {
        self.fade_duration
    }

    pub fn hold_duration(&self) -> Duration {
        self.hold_duration
    }

    pub fn scene_target(&self) -> Option<&SceneTarget> {
        match &self.kind {
            TransitionKind::Networked { target, .. } => Some(target),
            TransitionKind::Local { target } => target.as_ref(),
            TransitionKind::FadeToBlack => None,
        }
    }

    pub fn load_mode(&self) -> LoadMode {
        match &self.kind {
            TransitionKind::Networked { mode, .. } => *mode,
            _ => LoadMode::Single,
        }
    }

    // Crate-public

    pub(crate) fn set_state(&mut self, state: TransitionState) {
        self.state = state;
    }

    pub(crate) fn take_mid_callback(&mut self) -> Option<MidTransitionCallback> {
        self.mid_callback.take()
    }

    /// Accumulates hold time, returning whether the hold is over.
    pub(crate) fn advance_hold(&mut self, delta: Duration) -> bool {
        self.hold_elapsed = self.hold_elapsed.saturating_add(delta);
        self.hold_elapsed >= self.hold_duration
    }

    pub(crate) fn hold_elapsed(&self) -> Duration {
        self.hold_elapsed
    }

    pub(crate) fn mark_released_early(&mut self) {
        self.released_early = true;
    }

    pub(crate) fn released_early(&self) -> bool {
        self.released_early
    }
}

impl fmt::Debug for TransitionEpoch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TransitionEpoch")
            .field("id", &self.id)
            .field("kind", &self.kind)
            .field("state", &self.state)
            .field("fade_duration", &self.fade_duration)
            .field("hold_duration", &self.hold_duration)
            .field("has_mid_callback", &self.mid_callback.is_some())
            .field("hold_elapsed", &self.hold_elapsed)
            .finish()
    }
}
