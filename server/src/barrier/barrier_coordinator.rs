use std::{collections::HashSet, time::Duration};

use log::{debug, info, warn};

use curtain_shared::{EpochId, PeerKey};

use super::ready_set::ReadySet;

/// Result of feeding a readiness report to the [`BarrierCoordinator`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum BarrierOutcome {
    /// The report does not belong to the current epoch and was dropped.
    Stale,
    /// Still waiting on some peers.
    Pending { ready: usize, required: usize },
    /// This report closed the barrier. Returned once per epoch.
    Released,
    /// The barrier was already released for this epoch.
    AlreadyReleased,
}

/// Counting barrier over the set of connected peers, run on the authority.
///
/// The set of peers to wait for is read from the transport at every report,
/// so it may grow or shrink between epochs. Without a timeout a peer that
/// never reports keeps the barrier closed forever. With a timeout, counted
/// from the first report of the epoch, peers that have not reported once it
/// expires are excluded for the rest of the epoch.
pub struct BarrierCoordinator {
    timeout: Option<Duration>,
    ready: Option<ReadySet>,
    excluded: HashSet<PeerKey>,
    released: bool,
    waited: Duration,
    clock_running: bool,
}

impl BarrierCoordinator {
    pub fn new(timeout: Option<Duration>) -> Self {
        Self {
            timeout,
            ready: None,
            excluded: HashSet::new(),
            released: false,
            waited: Duration::ZERO,
            clock_running: false,
        }
    }

    /// Starts tracking `epoch` with an empty ReadySet, dropping any previous
    /// epoch.
    pub fn begin_epoch(&mut self, epoch: EpochId) {
        if let Some(previous) = self.ready.as_ref() {
            if !self.released {
                warn!(
                    "abandoning unreleased {} with {} ready peer(s)",
                    previous.epoch(),
                    previous.len()
                );
            }
        }
        self.ready = Some(ReadySet::new(epoch));
        self.excluded.clear();
        self.released = false;
        self.waited = Duration::ZERO;
        self.clock_running = false;
    }

    /// Forgets the current epoch. Reports arriving afterwards are stale.
    pub fn clear(&mut self) {
        self.ready = None;
        self.excluded.clear();
        self.released = false;
        self.waited = Duration::ZERO;
        self.clock_running = false;
    }

    pub fn current_epoch(&self) -> Option<EpochId> {
        self.ready.as_ref().map(|ready| ready.epoch())
    }

    pub fn ready_set(&self) -> Option<&ReadySet> {
        self.ready.as_ref()
    }

    pub fn is_released(&self) -> bool {
        self.released
    }

    /// Peers excluded by the timeout during the current epoch.
    pub fn excluded(&self) -> &HashSet<PeerKey> {
        &self.excluded
    }

    pub fn on_peer_ready(
        &mut self,
        epoch: EpochId,
        peer: PeerKey,
        active: &HashSet<PeerKey>,
    ) -> BarrierOutcome {
        let Some(ready) = self.ready.as_mut() else {
            debug!("dropping ready report from {} for {}: no epoch", peer, epoch);
            return BarrierOutcome::Stale;
        };
        let current = ready.epoch();
        if current != epoch {
            if epoch.is_older_than(&current) {
                debug!(
                    "dropping late ready report from {} for {} (current {})",
                    peer, epoch, current
                );
            } else {
                warn!(
                    "dropping ready report from {} for unknown {} (current {})",
                    peer, epoch, current
                );
            }
            return BarrierOutcome::Stale;
        }

        if !ready.insert(peer) {
            debug!("duplicate ready report from {} for {}", peer, epoch);
        }
        if self.released {
            return BarrierOutcome::AlreadyReleased;
        }

        self.evaluate(active)
    }

    /// Advances the timeout clock. Returns the epoch when the timeout
    /// released the barrier on this call.
    ///
    /// The clock starts on the first call after the first peer of the epoch
    /// reported; the frame that delivered that report does not count. The
    /// timeout may therefore expire up to one frame late, never early.
    pub fn update(&mut self, delta: Duration, active: &HashSet<PeerKey>) -> Option<EpochId> {
        let timeout = self.timeout?;
        if self.released {
            return None;
        }
        let ready = self.ready.as_ref()?;
        if ready.is_empty() {
            return None;
        }
        if !self.clock_running {
            self.clock_running = true;
            return None;
        }

        self.waited = self.waited.saturating_add(delta);
        if self.waited < timeout {
            return None;
        }

        let required = self.required(active);
        let stalled = ready.missing(&required);
        let epoch = ready.epoch();
        if !stalled.is_empty() {
            warn!(
                "{} barrier timed out after {:?}, excluding {:?}",
                epoch, self.waited, stalled
            );
            self.excluded.extend(stalled);
        }

        match self.evaluate(active) {
            BarrierOutcome::Released => Some(epoch),
            _ => None,
        }
    }

    fn required(&self, active: &HashSet<PeerKey>) -> HashSet<PeerKey> {
        active.difference(&self.excluded).copied().collect()
    }

    fn evaluate(&mut self, active: &HashSet<PeerKey>) -> BarrierOutcome {
        let required = self.required(active);
        let Some(ready) = self.ready.as_ref() else {
            return BarrierOutcome::Stale;
        };

        if ready.covers(&required) {
            info!(
                "{} released: {} of {} active peer(s) ready",
                ready.epoch(),
                ready.len(),
                active.len()
            );
            self.released = true;
            return BarrierOutcome::Released;
        }

        let ready_count = required.iter().filter(|peer| ready.contains(peer)).count();
        BarrierOutcome::Pending {
            ready: ready_count,
            required: required.len(),
        }
    }
}
