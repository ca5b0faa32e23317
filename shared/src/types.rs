use std::fmt;

/// Identifies a node taking part in a networked transition.
///
/// The authority has a `PeerKey` of its own, since it acts as one of its own
/// peers when the readiness barrier is evaluated.
#[derive(PartialEq, Eq, Hash, Clone, Copy, Debug, PartialOrd, Ord)]
pub struct PeerKey(u64);

impl PeerKey {
    pub const fn new(value: u64) -> Self {
        Self(value)
    }

    pub fn value(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for PeerKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "peer#{}", self.0)
    }
}

/// Which side of the protocol a node is on.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum NodeRole {
    Authority,
    Peer,
}
