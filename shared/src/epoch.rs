use std::fmt;

/// Identifies one run of the transition protocol.
///
/// Ids are 16-bit sequence numbers that wrap around. Equality is all the
/// barrier needs to tell a current report from a stale one; the ordering
/// helpers only exist to give better diagnostics for late messages.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct EpochId(u16);

impl EpochId {
    pub fn new(value: u16) -> Self {
        Self(value)
    }

    pub fn value(&self) -> u16 {
        self.0
    }

    /// The id following this one, wrapping at `u16::MAX`.
    pub fn next(&self) -> Self {
        Self(self.0.wrapping_add(1))
    }

    /// Returns whether `self` was issued after `other`, accounting for
    /// wrap-around within half of the id space.
    pub fn is_newer_than(&self, other: &EpochId) -> bool {
        let (a, b) = (self.0, other.0);
        ((a > b) && (a - b <= HALF_RANGE)) || ((a < b) && (b - a > HALF_RANGE))
    }

    pub fn is_older_than(&self, other: &EpochId) -> bool {
        other.is_newer_than(self)
    }
}

const HALF_RANGE: u16 = 32768;

impl fmt::Display for EpochId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "epoch#{}", self.0)
    }
}
