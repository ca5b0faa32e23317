/// Where a node is in its current transition.
///
/// Networked path: `Idle → FadingIn → AwaitingExternalLoad → AwaitingBarrier
/// → Released → FadingOut → Idle`.
///
/// Local path: `Idle → FadingIn → AwaitingExternalLoad → Holding → FadingOut
/// → Idle`, skipping the load when there is no scene target.
///
/// Fade to black: `Idle → FadingIn → Covered → FadingOut → Idle`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum TransitionState {
    #[default]
    Idle,
    FadingIn,
    AwaitingExternalLoad,
    AwaitingBarrier,
    Released,
    Holding,
    Covered,
    FadingOut,
}

impl TransitionState {
    pub fn is_idle(&self) -> bool {
        matches!(self, TransitionState::Idle)
    }
}
