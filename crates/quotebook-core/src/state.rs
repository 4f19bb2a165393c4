//! Shared sync state types.

/// Phase of the sync engine's per-cycle state machine.
///
/// A cycle always moves `Idle -> Fetching -> Merging -> Idle`; a failed fetch
/// goes straight back to `Idle`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum SyncPhase {
    #[default]
    Idle,
    Fetching,
    Merging,
}

impl SyncPhase {
    pub(crate) const fn as_u8(self) -> u8 {
        match self {
            Self::Idle => 0,
            Self::Fetching => 1,
            Self::Merging => 2,
        }
    }

    pub(crate) const fn from_u8(value: u8) -> Self {
        match value {
            1 => Self::Fetching,
            2 => Self::Merging,
            _ => Self::Idle,
        }
    }

    pub const fn is_busy(self) -> bool {
        !matches!(self, Self::Idle)
    }
}
