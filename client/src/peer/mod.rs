mod peer;
pub use peer::Peer;

mod peer_config;
pub use peer_config::PeerConfig;
