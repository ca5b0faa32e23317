pub mod message;
pub mod transport;
