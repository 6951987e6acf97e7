/// Session bootstrap state definitions
///
/// A fresh browser lands on the site, enters as a guest, qualifies the session
/// with a location code and is then ready to browse.
use std::fmt;
use thiserror::Error;

/// Why a bootstrap run ended in [`BootstrapState::Failed`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum BootstrapFailure {
    #[error("site root could not be loaded")]
    NavigationFailed,

    #[error("guest entry control not found")]
    GuestEntryNotFound,

    #[error("location input not found")]
    LocationInputNotFound,

    #[error("location confirm control not found")]
    LocationConfirmNotFound,

    #[error("location confirm control stayed disabled")]
    LocationConfirmDisabled,

    #[error("browser interaction failed")]
    InteractionFailed,

    #[error("invalid state transition")]
    InvalidTransition,
}

/// Progress of the session bootstrap
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BootstrapState {
    // ===== Active States =====
    /// Fresh browser, nothing done yet
    Landed,

    /// Entered the site as a guest
    GuestEntered,

    /// Location code accepted
    LocationQualified,

    // ===== Terminal States =====
    /// Session can browse the catalog
    Ready,

    /// A step could not be completed
    Failed(BootstrapFailure),
}

impl BootstrapState {
    /// Returns true once no further steps will run
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Ready | Self::Failed(_))
    }

    pub fn is_ready(&self) -> bool {
        matches!(self, Self::Ready)
    }

    /// Returns true if moving from this state to `next` is allowed
    ///
    /// Each active state may advance to its successor or fail. Terminal states
    /// never transition.
    pub fn can_transition_to(&self, next: BootstrapState) -> bool {
        match (self, next) {
            (_, Self::Failed(_)) => !self.is_terminal(),
            (Self::Landed, Self::GuestEntered) => true,
            (Self::GuestEntered, Self::LocationQualified) => true,
            (Self::LocationQualified, Self::Ready) => true,
            _ => false,
        }
    }

    /// Short lowercase name for logs and reports
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Landed => "landed",
            Self::GuestEntered => "guest_entered",
            Self::LocationQualified => "location_qualified",
            Self::Ready => "ready",
            Self::Failed(_) => "failed",
        }
    }
}

impl fmt::Display for BootstrapState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Failed(reason) => write!(f, "failed ({})", reason),
            other => f.write_str(other.as_str()),
        }
    }
}
