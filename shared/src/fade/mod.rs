pub mod fade_animator;
