use std::time::Duration;

use log::{debug, error, info, warn};

use crate::{
    fade::fade_animator::{FadeAnimator, FadeTick},
    transition::{
        observers::{ObserverKey, TransitionEvent, TransitionObservers},
        transition_epoch::{MidTransitionCallback, TransitionEpoch, TransitionKind},
    },
    Color, EpochId, FadeOverlay, LoadMode, LoadReport, NodeRole, SceneLoader, SceneTarget,
    TransitionConfig, TransitionError, TransitionState,
};

/// Owns a node's "transition in progress" flag and sequences the fade, load,
/// hold and barrier steps of a transition.
///
/// The machine is driven by [`TransitionMachine::update`], called once per
/// host frame with the elapsed time. It never talks to the network itself:
/// the owning `Authority` or `Peer` collects the ready report through
/// [`TransitionMachine::take_ready_report`] and feeds the authority's release
/// back in through [`TransitionMachine::on_all_ready`].
pub struct TransitionMachine {
    role: NodeRole,
    config: TransitionConfig,
    overlay: Option<Box<dyn FadeOverlay>>,
    loader: Box<dyn SceneLoader>,
    observers: TransitionObservers,
    epoch: Option<TransitionEpoch>,
    fade: Option<FadeAnimator>,
    alpha: f32,
    next_local_epoch: EpochId,
    outgoing_ready: Option<EpochId>,
    errors: Vec<TransitionError>,
}

impl TransitionMachine {
    pub fn new(
        role: NodeRole,
        config: TransitionConfig,
        overlay: Option<Box<dyn FadeOverlay>>,
        loader: Box<dyn SceneLoader>,
    ) -> Self {
        Self {
            role,
            config,
            overlay,
            loader,
            observers: TransitionObservers::new(),
            epoch: None,
            fade: None,
            alpha: 0.0,
            next_local_epoch: EpochId::new(0),
            outgoing_ready: None,
            errors: Vec::new(),
        }
    }

    // Public

    pub fn role(&self) -> NodeRole {
        self.role
    }

    pub fn config(&self) -> &TransitionConfig {
        &self.config
    }

    pub fn is_transitioning(&self) -> bool {
        self.epoch.is_some()
    }

    pub fn state(&self) -> TransitionState {
        self.epoch
            .as_ref()
            .map(|epoch| epoch.state())
            .unwrap_or(TransitionState::Idle)
    }

    pub fn epoch(&self) -> Option<&TransitionEpoch> {
        self.epoch.as_ref()
    }

    pub fn current_epoch_id(&self) -> Option<EpochId> {
        self.epoch.as_ref().map(|epoch| epoch.id())
    }

    pub fn fade_duration_seconds(&self) -> f32 {
        self.config.fade_duration_seconds()
    }

    /// Current overlay opacity as last applied by the machine.
    pub fn alpha(&self) -> f32 {
        self.alpha
    }

    pub fn subscribe<F: FnMut() + 'static>(
        &mut self,
        event: TransitionEvent,
        callback: F,
    ) -> ObserverKey {
        self.observers.subscribe(event, callback)
    }

    pub fn unsubscribe(&mut self, key: &ObserverKey) -> bool {
        self.observers.unsubscribe(key)
    }

    pub fn has_overlay(&self) -> bool {
        self.overlay.is_some()
    }

    pub fn set_overlay(&mut self, mut overlay: Box<dyn FadeOverlay>) {
        overlay.set_color(self.config.overlay_color.with_alpha(self.alpha));
        overlay.set_visible(self.is_transitioning());
        overlay.set_blocks_input(self.is_transitioning());
        self.overlay = Some(overlay);
    }

    /// Changes the overlay color. The alpha channel of `color` is ignored and
    /// the current opacity is kept.
    pub fn set_overlay_color(&mut self, color: Color) {
        self.config.overlay_color = color.with_alpha(1.0);
        match self.overlay.as_mut() {
            Some(overlay) => overlay.set_color(color.with_alpha(self.alpha)),
            None => warn!("{:?}: overlay color set before an overlay exists", self.role),
        }
    }

    /// Drains the misconfiguration errors reported since the last call.
    pub fn take_errors(&mut self) -> Vec<TransitionError> {
        std::mem::take(&mut self.errors)
    }

    /// Fades in, optionally loads `target`, holds for `hold`, then fades back
    /// out, all on this node. Ignored while another transition is running.
    pub fn begin_local_transition(
        &mut self,
        target: Option<SceneTarget>,
        mid_callback: Option<MidTransitionCallback>,
        hold: Duration,
    ) {
        if let Err(err) = self.try_begin_local_transition(target, mid_callback, hold) {
            self.report(err);
        }
    }

    pub fn try_begin_local_transition(
        &mut self,
        target: Option<SceneTarget>,
        mid_callback: Option<MidTransitionCallback>,
        hold: Duration,
    ) -> Result<(), TransitionError> {
        self.ensure_idle()?;
        if self.overlay.is_none() {
            return Err(TransitionError::MissingOverlay);
        }

        let id = self.allocate_local_epoch();
        let epoch = TransitionEpoch::new(
            id,
            TransitionKind::Local { target },
            self.config.fade_duration,
            hold,
            mid_callback,
        );
        self.start(epoch);
        Ok(())
    }

    /// A local transition without a scene to load.
    pub fn begin_local_fade_hold(
        &mut self,
        mid_callback: Option<MidTransitionCallback>,
        hold: Duration,
    ) {
        self.begin_local_transition(None, mid_callback, hold);
    }

    /// Fades in and stays covered until [`TransitionMachine::fade_out`].
    pub fn begin_fade_to_black(&mut self) {
        if let Err(err) = self.try_begin_fade_to_black() {
            self.report(err);
        }
    }

    pub fn try_begin_fade_to_black(&mut self) -> Result<(), TransitionError> {
        self.ensure_idle()?;
        if self.overlay.is_none() {
            return Err(TransitionError::MissingOverlay);
        }

        let id = self.allocate_local_epoch();
        let epoch = TransitionEpoch::new(
            id,
            TransitionKind::FadeToBlack,
            self.config.fade_duration,
            Duration::ZERO,
            None,
        );
        self.start(epoch);
        Ok(())
    }

    /// Starts networked epoch `epoch`, as announced by the authority.
    pub fn begin_networked_epoch(
        &mut self,
        epoch: EpochId,
        target: SceneTarget,
        mode: LoadMode,
    ) -> Result<(), TransitionError> {
        self.ensure_idle()?;
        if self.overlay.is_none() {
            warn!(
                "{:?}: no overlay for {}, fading without visuals",
                self.role, epoch
            );
        }

        let epoch = TransitionEpoch::new(
            epoch,
            TransitionKind::Networked { target, mode },
            self.config.fade_duration,
            Duration::ZERO,
            None,
        );
        self.start(epoch);
        Ok(())
    }

    /// Applies the authority's release of the readiness barrier.
    ///
    /// Returns whether the release was accepted for the current epoch.
    pub fn on_all_ready(&mut self, epoch_id: EpochId) -> bool {
        let role = self.role;
        let Some(epoch) = self.epoch.as_mut() else {
            debug!("{:?}: ignoring release of {} while idle", role, epoch_id);
            return false;
        };
        if epoch.id() != epoch_id || !epoch.kind().is_networked() {
            debug!(
                "{:?}: ignoring release of {}, current transition is {}",
                role,
                epoch_id,
                epoch.id()
            );
            return false;
        }

        match epoch.state() {
            TransitionState::AwaitingBarrier => {
                self.release();
                true
            }
            TransitionState::FadingIn | TransitionState::AwaitingExternalLoad => {
                // only possible when the authority timed this node out
                warn!(
                    "{:?}: {} released before the local load finished",
                    role, epoch_id
                );
                epoch.mark_released_early();
                true
            }
            state => {
                debug!(
                    "{:?}: ignoring duplicate release of {} in state {:?}",
                    role, epoch_id, state
                );
                false
            }
        }
    }

    /// Takes the ready report queued when a networked load completed.
    pub fn take_ready_report(&mut self) -> Option<EpochId> {
        self.outgoing_ready.take()
    }

    /// Fades the overlay out and ends the transition. Ignored when idle or
    /// already fading out.
    pub fn fade_out(&mut self) {
        if let Err(err) = self.try_fade_out() {
            self.report(err);
        }
    }

    pub fn try_fade_out(&mut self) -> Result<(), TransitionError> {
        let Some(epoch) = self.epoch.as_ref() else {
            return Err(TransitionError::NotTransitioning);
        };
        if epoch.state() == TransitionState::FadingOut {
            return Err(TransitionError::AlreadyFadingOut { epoch: epoch.id() });
        }

        info!(
            "{:?}: fading out {} from {:?}",
            self.role,
            epoch.id(),
            epoch.state()
        );
        self.begin_fade_out_leg();
        Ok(())
    }

    /// Advances the running transition by `delta`.
    pub fn update(&mut self, delta: Duration) {
        match self.state() {
            TransitionState::FadingIn | TransitionState::FadingOut => {
                if let Some(fade) = self.fade.as_mut() {
                    let tick = fade.tick(delta);
                    self.apply_fade_tick(tick);
                }
            }
            TransitionState::AwaitingExternalLoad => {
                if let Some(report) = self.loader.poll_complete() {
                    self.on_load_complete(report);
                }
            }
            TransitionState::Holding => {
                let hold_over = self
                    .epoch
                    .as_mut()
                    .map(|epoch| epoch.advance_hold(delta))
                    .unwrap_or(false);
                if hold_over {
                    self.begin_fade_out_leg();
                }
            }
            TransitionState::Idle
            | TransitionState::AwaitingBarrier
            | TransitionState::Released
            | TransitionState::Covered => {}
        }
    }

    /// Cancels any running fade and forgets the current epoch.
    ///
    /// The overlay keeps whatever opacity it had. Other nodes are not told.
    pub fn teardown(&mut self) {
        if let Some(mut fade) = self.fade.take() {
            fade.cancel();
        }
        self.abort_pending_load();
        if let Some(epoch) = self.epoch.take() {
            info!(
                "{:?}: tearing down {} in state {:?}",
                self.role,
                epoch.id(),
                epoch.state()
            );
        }
        self.outgoing_ready = None;
    }

    // Private

    fn ensure_idle(&self) -> Result<(), TransitionError> {
        match self.epoch.as_ref() {
            Some(epoch) => Err(TransitionError::AlreadyTransitioning {
                state: epoch.state(),
            }),
            None => Ok(()),
        }
    }

    fn report(&mut self, err: TransitionError) {
        match err {
            TransitionError::MissingOverlay => {
                error!("{:?}: {}", self.role, err);
                self.errors.push(err);
            }
            TransitionError::AlreadyTransitioning { .. }
            | TransitionError::NotTransitioning
            | TransitionError::AlreadyFadingOut { .. } => {
                debug!("{:?}: {}", self.role, err);
            }
        }
    }

    fn allocate_local_epoch(&mut self) -> EpochId {
        let id = self.next_local_epoch;
        self.next_local_epoch = id.next();
        id
    }

    fn set_state(&mut self, state: TransitionState) {
        if let Some(epoch) = self.epoch.as_mut() {
            debug!(
                "{:?}: {} {:?} -> {:?}",
                self.role,
                epoch.id(),
                epoch.state(),
                state
            );
            epoch.set_state(state);
        }
    }

    fn start(&mut self, epoch: TransitionEpoch) {
        let fires_loading_events = !matches!(epoch.kind(), TransitionKind::FadeToBlack);
        let fade_duration = epoch.fade_duration();
        info!("{:?}: starting {} ({:?})", self.role, epoch.id(), epoch.kind());

        self.epoch = Some(epoch);
        self.set_state(TransitionState::FadingIn);

        if let Some(overlay) = self.overlay.as_mut() {
            overlay.set_color(self.config.overlay_color.with_alpha(self.alpha));
            overlay.set_visible(true);
            overlay.set_blocks_input(true);
        }

        if fires_loading_events {
            self.observers.dispatch(TransitionEvent::LoadingStarted);
        }

        self.start_fade(1.0, fade_duration);
    }

    fn start_fade(&mut self, end_alpha: f32, duration: Duration) {
        let mut fade = FadeAnimator::new(self.alpha, end_alpha, duration);
        let tick = fade.start();
        self.fade = Some(fade);
        self.apply_fade_tick(tick);
    }

    fn apply_fade_tick(&mut self, tick: FadeTick) {
        match tick {
            FadeTick::Running(alpha) => self.apply_alpha(alpha),
            FadeTick::Completed(alpha) => {
                self.apply_alpha(alpha);
                self.fade = None;
                self.on_fade_complete();
            }
            FadeTick::Finished => {}
        }
    }

    fn apply_alpha(&mut self, alpha: f32) {
        self.alpha = alpha;
        if let Some(overlay) = self.overlay.as_mut() {
            overlay.set_alpha(alpha);
        }
    }

    fn on_fade_complete(&mut self) {
        match self.state() {
            TransitionState::FadingIn => self.on_fade_in_complete(),
            TransitionState::FadingOut => self.finish(),
            _ => {}
        }
    }

    fn on_fade_in_complete(&mut self) {
        let Some(epoch) = self.epoch.as_mut() else {
            return;
        };

        if let Some(callback) = epoch.take_mid_callback() {
            callback();
        }

        let target = epoch.scene_target().cloned();
        let mode = epoch.load_mode();
        let covers_only = matches!(epoch.kind(), TransitionKind::FadeToBlack);

        match target {
            Some(target) => {
                self.set_state(TransitionState::AwaitingExternalLoad);
                info!("{:?}: loading scene {} ({:?})", self.role, target, mode);
                self.loader.start_load(&target, mode);
            }
            None if covers_only => self.set_state(TransitionState::Covered),
            None => self.enter_hold(),
        }
    }

    fn on_load_complete(&mut self, report: LoadReport) {
        let Some(epoch) = self.epoch.as_ref() else {
            return;
        };
        let id = epoch.id();
        let networked = epoch.kind().is_networked();
        let released_early = epoch.released_early();

        if report.has_timeouts() {
            warn!(
                "{:?}: scene load for {} timed out on {:?}, continuing",
                self.role, id, report.timed_out
            );
        }

        if !networked {
            self.enter_hold();
            return;
        }

        self.observers.dispatch(TransitionEvent::LoadingCompleted);
        self.set_state(TransitionState::AwaitingBarrier);
        self.outgoing_ready = Some(id);

        if released_early {
            self.release();
        }
    }

    fn enter_hold(&mut self) {
        self.observers.dispatch(TransitionEvent::LoadingCompleted);
        self.set_state(TransitionState::Holding);

        let hold_over = self
            .epoch
            .as_mut()
            .map(|epoch| epoch.advance_hold(Duration::ZERO))
            .unwrap_or(false);
        if hold_over {
            self.begin_fade_out_leg();
        }
    }

    fn release(&mut self) {
        if let Some(epoch) = self.epoch.as_ref() {
            info!("{:?}: all peers ready for {}", self.role, epoch.id());
        }
        self.set_state(TransitionState::Released);
        self.observers.dispatch(TransitionEvent::AllPeersReady);
    }

    fn begin_fade_out_leg(&mut self) {
        if let Some(mut fade) = self.fade.take() {
            fade.cancel();
        }
        let Some(epoch) = self.epoch.as_ref() else {
            return;
        };
        if epoch.state() == TransitionState::Holding {
            debug!(
                "{:?}: {} held for {:?}",
                self.role,
                epoch.id(),
                epoch.hold_elapsed()
            );
        }
        let duration = epoch.fade_duration();

        self.abort_pending_load();
        self.set_state(TransitionState::FadingOut);
        self.start_fade(0.0, duration);
    }

    fn abort_pending_load(&mut self) {
        let Some(epoch) = self.epoch.as_ref() else {
            return;
        };
        if epoch.state() != TransitionState::AwaitingExternalLoad {
            return;
        }
        debug!(
            "{:?}: aborting scene load for {}",
            self.role,
            epoch.id()
        );
        self.loader.abort_load();
    }

    fn finish(&mut self) {
        if let Some(overlay) = self.overlay.as_mut() {
            overlay.set_visible(false);
            overlay.set_blocks_input(false);
        }
        if let Some(epoch) = self.epoch.take() {
            info!("{:?}: finished {}", self.role, epoch.id());
        }
    }
}
