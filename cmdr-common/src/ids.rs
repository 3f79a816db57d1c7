//! Canonical identifier types shared by the engine and its front-ends.

/// Process-local identifier of one connected player.
pub type PlayerId = u32;

/// Ordinal staff rank. Comparisons follow declaration order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub enum Rank {
    /// Regular player.
    #[default]
    Player,
    /// Player with a vetted history.
    Trusted,
    /// Moderator.
    Moderator,
    /// Administrator.
    Admin,
    /// Server manager.
    Manager,
}

impl Rank {
    /// Every rank in ascending order.
    pub const ALL: [Self; 5] = [
        Self::Player,
        Self::Trusted,
        Self::Moderator,
        Self::Admin,
        Self::Manager,
    ];

    /// Returns the canonical lowercase rank name.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Player => "player",
            Self::Trusted => "trusted",
            Self::Moderator => "mod",
            Self::Admin => "admin",
            Self::Manager => "manager",
        }
    }

    /// Returns the color tag used when the rank is rendered in chat.
    #[must_use]
    pub const fn color(self) -> &'static str {
        match self {
            Self::Player => "",
            Self::Trusted => "[#8ce8ff]",
            Self::Moderator => "[#6fd35c]",
            Self::Admin => "[#c951ff]",
            Self::Manager => "[scarlet]",
        }
    }

    /// Parses a rank name case-insensitively. `moderator` is accepted as an alias of `mod`.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        let lowered = name.trim().to_ascii_lowercase();
        if lowered == "moderator" {
            return Some(Self::Moderator);
        }
        Self::ALL.into_iter().find(|rank| rank.name() == lowered)
    }
}

impl std::fmt::Display for Rank {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}
