/// An RGBA color with channels in `0.0..=1.0`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl Color {
    pub const fn rgba(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }

    pub const fn rgb(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b, a: 1.0 }
    }

    pub const BLACK: Color = Color::rgb(0.0, 0.0, 0.0);
    pub const WHITE: Color = Color::rgb(1.0, 1.0, 1.0);

    /// Returns this color with its alpha channel replaced.
    pub fn with_alpha(self, alpha: f32) -> Self {
        Self { a: alpha, ..self }
    }
}

impl Default for Color {
    fn default() -> Self {
        Self::BLACK
    }
}

/// The full-screen visual the transition fades in and out.
///
/// Painting is owned by the host; the transition machine only drives these
/// setters. The overlay is made visible and input-blocking when a transition
/// starts, and hidden again once the fade-out has finished.
pub trait FadeOverlay {
    /// Sets the overlay opacity, `0.0` fully transparent to `1.0` opaque.
    fn set_alpha(&mut self, alpha: f32);

    /// Sets the overlay color, including its alpha channel.
    fn set_color(&mut self, color: Color);

    fn set_visible(&mut self, visible: bool);

    /// Toggles whether the overlay swallows user input.
    fn set_blocks_input(&mut self, blocks_input: bool);
}
