use crate::{EpochId, LoadMode, PeerKey, SceneTarget};

/// Control messages sent from the authority to every connected peer.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum AuthorityMessage {
    /// Starts epoch `epoch`: fade in, then load `target`.
    StartTransition {
        epoch: EpochId,
        target: SceneTarget,
        mode: LoadMode,
    },
    /// Every active peer reported ready for `epoch`.
    AllReady { epoch: EpochId },
}

impl AuthorityMessage {
    pub fn epoch(&self) -> EpochId {
        match self {
            AuthorityMessage::StartTransition { epoch, .. } => *epoch,
            AuthorityMessage::AllReady { epoch } => *epoch,
        }
    }
}

/// Control messages sent from a peer to the authority.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PeerMessage {
    /// `peer` finished loading the scene for `epoch`.
    ReportReady { epoch: EpochId, peer: PeerKey },
}
