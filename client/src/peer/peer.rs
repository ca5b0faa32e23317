use std::time::Duration;

use log::{info, warn};

use curtain_shared::{
    AuthorityMessage, Color, EpochId, FadeOverlay, MidTransitionCallback, NodeRole,
    ObserverKey, PeerKey, PeerMessage, PeerTransport, SceneLoader, SceneTarget,
    TransitionError, TransitionEvent, TransitionMachine, TransitionState,
};

use crate::PeerConfig;

/// A node that follows the authority's networked transitions.
///
/// Peers cannot start networked transitions; they react to the authority's
/// `StartTransition`, report once their scene is loaded and wait for
/// `AllReady`. Local transitions are available as on any node.
pub struct Peer {
    key: PeerKey,
    machine: TransitionMachine,
    transport: Box<dyn PeerTransport>,
}

impl Peer {
    pub fn new(
        config: PeerConfig,
        key: PeerKey,
        overlay: Option<Box<dyn FadeOverlay>>,
        loader: Box<dyn SceneLoader>,
        transport: Box<dyn PeerTransport>,
    ) -> Self {
        Self {
            key,
            machine: TransitionMachine::new(NodeRole::Peer, config.transition, overlay, loader),
            transport,
        }
    }

    /// Fades out after the barrier was released. Ignored when idle or
    /// already fading out.
    pub fn complete_networked_transition(&mut self) {
        self.machine.fade_out();
    }

    pub fn begin_local_transition(
        &mut self,
        target: Option<SceneTarget>,
        mid_callback: Option<MidTransitionCallback>,
        hold: Duration,
    ) {
        self.machine
            .begin_local_transition(target, mid_callback, hold);
    }

    pub fn begin_local_fade_hold(
        &mut self,
        mid_callback: Option<MidTransitionCallback>,
        hold: Duration,
    ) {
        self.machine.begin_local_fade_hold(mid_callback, hold);
    }

    pub fn begin_fade_to_black(&mut self) {
        self.machine.begin_fade_to_black();
    }

    pub fn set_overlay(&mut self, overlay: Box<dyn FadeOverlay>) {
        self.machine.set_overlay(overlay);
    }

    pub fn set_overlay_color(&mut self, color: Color) {
        self.machine.set_overlay_color(color);
    }

    pub fn key(&self) -> PeerKey {
        self.key
    }

    pub fn is_transitioning(&self) -> bool {
        self.machine.is_transitioning()
    }

    pub fn state(&self) -> TransitionState {
        self.machine.state()
    }

    pub fn current_epoch(&self) -> Option<EpochId> {
        self.machine.current_epoch_id()
    }

    pub fn fade_duration_seconds(&self) -> f32 {
        self.machine.fade_duration_seconds()
    }

    pub fn machine(&self) -> &TransitionMachine {
        &self.machine
    }

    pub fn subscribe<F: FnMut() + 'static>(
        &mut self,
        event: TransitionEvent,
        callback: F,
    ) -> ObserverKey {
        self.machine.subscribe(event, callback)
    }

    pub fn unsubscribe(&mut self, key: &ObserverKey) -> bool {
        self.machine.unsubscribe(key)
    }

    pub fn take_errors(&mut self) -> Vec<TransitionError> {
        self.machine.take_errors()
    }

    /// Applies messages from the authority, advances the local transition by
    /// `delta` and sends the ready report once the scene is loaded.
    pub fn update(&mut self, delta: Duration) {
        while let Some(message) = self.transport.receive() {
            match message {
                AuthorityMessage::StartTransition {
                    epoch,
                    target,
                    mode,
                } => {
                    if let Err(err) = self.machine.begin_networked_epoch(epoch, target, mode) {
                        // this peer will not report, the authority's barrier
                        // waits on it unless a timeout is configured
                        warn!("{} ignoring start of {}: {}", self.key, epoch, err);
                    }
                }
                AuthorityMessage::AllReady { epoch } => {
                    self.machine.on_all_ready(epoch);
                }
            }
        }

        self.machine.update(delta);

        if let Some(epoch) = self.machine.take_ready_report() {
            info!("{} ready for {}", self.key, epoch);
            if let Err(err) = self.transport.send(PeerMessage::ReportReady {
                epoch,
                peer: self.key,
            }) {
                warn!("{} could not report ready for {}: {}", self.key, epoch, err);
            }
        }
    }

    /// Cancels the local transition. The authority is not notified.
    pub fn teardown(&mut self) {
        self.machine.teardown();
    }
}
