use std::fmt::{self, Display};

/// Connection lifecycle for one logical conversation.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ConnectionState {
    #[default]
    Disconnected,
    Connecting,
    Connected,
}

impl ConnectionState {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Disconnected => "disconnected",
            Self::Connecting => "connecting",
            Self::Connected => "connected",
        }
    }

    pub fn can_transition_to(&self, next: &ConnectionState) -> bool {
        if self == next {
            return true;
        }

        match self {
            Self::Disconnected => matches!(next, Self::Connecting),
            Self::Connecting => matches!(next, Self::Connected | Self::Disconnected),
            Self::Connected => false,
        }
    }
}

impl Display for ConnectionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
