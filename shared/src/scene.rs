use std::fmt;

use crate::PeerKey;

/// Names the scene a transition loads.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct SceneTarget(String);

impl SceneTarget {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SceneTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for SceneTarget {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

impl From<String> for SceneTarget {
    fn from(name: String) -> Self {
        Self(name)
    }
}

/// How the loaded scene relates to the scenes already present.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum LoadMode {
    /// Replace every loaded scene.
    #[default]
    Single,
    /// Load alongside the scenes already present.
    Additive,
}

/// Outcome of an external scene load.
///
/// Some engines load scenes cooperatively across every connected node and
/// report which of them finished in time. A non-empty `timed_out` list is
/// logged but does not fail the transition.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct LoadReport {
    pub succeeded: Vec<PeerKey>,
    pub timed_out: Vec<PeerKey>,
}

impl LoadReport {
    pub fn new(succeeded: Vec<PeerKey>, timed_out: Vec<PeerKey>) -> Self {
        Self {
            succeeded,
            timed_out,
        }
    }

    /// A report for a load that needed no remote participation.
    pub fn local() -> Self {
        Self::default()
    }

    pub fn has_timeouts(&self) -> bool {
        !self.timed_out.is_empty()
    }
}

/// The engine-side scene loading collaborator.
///
/// `start_load` is called once per transition, after the overlay reached
/// full opacity. The machine then polls `poll_complete` once per tick until
/// it yields a report.
///
/// At most one load is in flight. When the machine gives up on it (teardown,
/// or a fade-out requested mid-load) it calls `abort_load`; from then on
/// `poll_complete` must never yield that load's report, even if the engine
/// finishes it later. The next report belongs to the next `start_load`.
pub trait SceneLoader {
    fn start_load(&mut self, target: &SceneTarget, mode: LoadMode);

    fn poll_complete(&mut self) -> Option<LoadReport>;

    /// Abandons the load in flight.
    fn abort_load(&mut self);
}
