use std::collections::HashSet;

use crate::{AuthorityMessage, PeerKey, PeerMessage, TransportError};

/// Authority end of the control channel.
///
/// Implementations are expected to deliver reliably and in order per sender.
/// The transport owns the set of connected peers; the barrier only reads it.
pub trait AuthorityTransport {
    /// Sends `message` to every connected peer.
    fn broadcast(&mut self, message: AuthorityMessage) -> Result<(), TransportError>;

    /// Pops the next message received from any peer.
    fn receive(&mut self) -> Option<PeerMessage>;

    /// Keys of the currently connected remote peers. Does not include the
    /// authority itself.
    fn connected_peers(&self) -> HashSet<PeerKey>;
}

/// Peer end of the control channel.
pub trait PeerTransport {
    /// Sends `message` to the authority.
    fn send(&mut self, message: PeerMessage) -> Result<(), TransportError>;

    /// Pops the next message received from the authority.
    fn receive(&mut self) -> Option<AuthorityMessage>;
}
