use std::collections::HashSet;

use curtain_shared::{EpochId, PeerKey};

/// The peers that reported ready for one networked epoch.
///
/// Membership only: a peer reporting twice is still one member.
#[derive(Clone, Debug)]
pub struct ReadySet {
    epoch: EpochId,
    peers: HashSet<PeerKey>,
}

impl ReadySet {
    pub fn new(epoch: EpochId) -> Self {
        Self {
            epoch,
            peers: HashSet::new(),
        }
    }

    pub fn epoch(&self) -> EpochId {
        self.epoch
    }

    /// Returns whether `peer` was newly added.
    pub fn insert(&mut self, peer: PeerKey) -> bool {
        self.peers.insert(peer)
    }

    pub fn contains(&self, peer: &PeerKey) -> bool {
        self.peers.contains(peer)
    }

    pub fn len(&self) -> usize {
        self.peers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.peers.is_empty()
    }

    /// Returns whether every peer in `required` has reported.
    pub fn covers(&self, required: &HashSet<PeerKey>) -> bool {
        required.iter().all(|peer| self.peers.contains(peer))
    }

    /// Members of `required` that have not reported, in key order.
    pub fn missing(&self, required: &HashSet<PeerKey>) -> Vec<PeerKey> {
        let mut missing: Vec<PeerKey> = required
            .iter()
            .filter(|peer| !self.peers.contains(peer))
            .copied()
            .collect();
        missing.sort();
        missing
    }
}
