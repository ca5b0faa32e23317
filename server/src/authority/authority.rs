use std::{collections::HashSet, time::Duration};

use log::{debug, info, warn};

use curtain_shared::{
    AuthorityMessage, AuthorityTransport, Color, EpochId, FadeOverlay, LoadMode,
    MidTransitionCallback, NodeRole, ObserverKey, PeerKey, PeerMessage, SceneLoader,
    SceneTarget, TransitionError, TransitionEvent, TransitionMachine, TransitionState,
};

use crate::{
    barrier::{BarrierCoordinator, BarrierOutcome},
    AuthorityConfig,
};

/// The node that starts networked transitions and releases the readiness
/// barrier.
///
/// The authority is also one of its own peers: it fades and loads like every
/// other node, and its own ready report counts towards the barrier.
pub struct Authority {
    key: PeerKey,
    machine: TransitionMachine,
    barrier: BarrierCoordinator,
    transport: Box<dyn AuthorityTransport>,
    next_epoch: EpochId,
}

impl Authority {
    pub fn new(
        config: AuthorityConfig,
        key: PeerKey,
        overlay: Option<Box<dyn FadeOverlay>>,
        loader: Box<dyn SceneLoader>,
        transport: Box<dyn AuthorityTransport>,
    ) -> Self {
        let machine = TransitionMachine::new(NodeRole::Authority, config.transition, overlay, loader);

        Self {
            key,
            machine,
            barrier: BarrierCoordinator::new(config.barrier_timeout),
            transport,
            // random start so stale messages from a previous session miss
            next_epoch: EpochId::new(fastrand::u16(..)),
        }
    }

    // Networked transitions

    /// Starts a networked transition to `target` on every connected peer and
    /// on this node. Ignored while a transition is running here.
    pub fn begin_networked_transition(&mut self, target: impl Into<SceneTarget>, mode: LoadMode) {
        if self.machine.is_transitioning() {
            debug!(
                "ignoring networked transition request in state {:?}",
                self.machine.state()
            );
            return;
        }

        let target = target.into();
        let epoch = self.next_epoch;
        self.next_epoch = epoch.next();

        // reset before any report for the new epoch can be accepted
        self.barrier.begin_epoch(epoch);

        info!(
            "starting networked {} to {} for {} peer(s)",
            epoch,
            target,
            self.active_peers().len()
        );
        if let Err(err) = self.transport.broadcast(AuthorityMessage::StartTransition {
            epoch,
            target: target.clone(),
            mode,
        }) {
            warn!("failed to broadcast start of {}: {}", epoch, err);
        }

        if let Err(err) = self.machine.begin_networked_epoch(epoch, target, mode) {
            warn!("{}", err);
            self.barrier.clear();
        }
    }

    /// Fades out after the barrier was released. Ignored when idle or
    /// already fading out.
    pub fn complete_networked_transition(&mut self) {
        self.machine.fade_out();
    }

    // Local transitions

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

    // Observation

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

    pub fn barrier(&self) -> &BarrierCoordinator {
        &self.barrier
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

    /// The peers the barrier waits on: every connected peer plus this node.
    pub fn active_peers(&self) -> HashSet<PeerKey> {
        let mut peers = self.transport.connected_peers();
        peers.insert(self.key);
        peers
    }

    // Driving

    /// Drains incoming reports, advances the local transition and the
    /// barrier timeout by `delta`.
    pub fn update(&mut self, delta: Duration) {
        while let Some(message) = self.transport.receive() {
            match message {
                PeerMessage::ReportReady { epoch, peer } => self.on_peer_ready(epoch, peer),
            }
        }

        self.machine.update(delta);

        if let Some(epoch) = self.machine.take_ready_report() {
            let key = self.key;
            self.on_peer_ready(epoch, key);
        }

        let active = self.active_peers();
        if let Some(epoch) = self.barrier.update(delta, &active) {
            self.release(epoch);
        }

        if !self.machine.is_transitioning() && self.barrier.current_epoch().is_some() {
            self.barrier.clear();
        }
    }

    /// Cancels the local transition and forgets the barrier. Peers are not
    /// notified.
    pub fn teardown(&mut self) {
        self.machine.teardown();
        self.barrier.clear();
    }

    // Private

    fn on_peer_ready(&mut self, epoch: EpochId, peer: PeerKey) {
        let active = self.active_peers();
        match self.barrier.on_peer_ready(epoch, peer, &active) {
            BarrierOutcome::Released => self.release(epoch),
            BarrierOutcome::Pending { ready, required } => {
                debug!("{} ready for {}: {}/{}", peer, epoch, ready, required);
            }
            BarrierOutcome::Stale | BarrierOutcome::AlreadyReleased => {}
        }
    }

    fn release(&mut self, epoch: EpochId) {
        if let Err(err) = self
            .transport
            .broadcast(AuthorityMessage::AllReady { epoch })
        {
            warn!("failed to broadcast release of {}: {}", epoch, err);
        }
        self.machine.on_all_ready(epoch);
    }
}
