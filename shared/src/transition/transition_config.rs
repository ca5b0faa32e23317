use std::{default::Default, time::Duration};

use crate::Color;

/// Contains Config properties which will be used by a node's transition
/// machine
#[derive(Clone, Debug)]
pub struct TransitionConfig {
    /// Length of the fade-in leg, and of the fade-out leg
    pub fade_duration: Duration,
    /// Color of the overlay. Its alpha channel is ignored; the machine owns
    /// the overlay opacity
    pub overlay_color: Color,
}

impl TransitionConfig {
    pub fn fade_duration_seconds(&self) -> f32 {
        self.fade_duration.as_secs_f32()
    }
}

impl Default for TransitionConfig {
    fn default() -> Self {
        Self {
            fade_duration: Duration::from_millis(500),
            overlay_color: Color::BLACK,
        }
    }
}
