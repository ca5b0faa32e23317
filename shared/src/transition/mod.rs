pub mod observers;
pub mod transition_config;
pub mod transition_epoch;
pub mod transition_machine;
pub mod transition_state;
