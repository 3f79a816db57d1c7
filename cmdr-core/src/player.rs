//! Caller identity model and the directory collaborator used for name lookups.

use cmdr_common::ids::{PlayerId, Rank};

/// Snapshot of one connected player as seen by permission checks and command handlers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Player {
    /// Stable process-local identifier.
    pub id: PlayerId,
    /// Display name, may contain `[color]` tags.
    pub name: String,
    /// Staff rank.
    pub rank: Rank,
    /// Whether the player is currently restricted (stopped) by staff.
    pub restricted: bool,
    /// Whether the player is muted.
    pub muted: bool,
    /// Whether the player holds a membership.
    pub member: bool,
}

impl Player {
    /// Creates an unrestricted player with the default rank.
    #[must_use]
    pub fn new(id: PlayerId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            rank: Rank::Player,
            restricted: false,
            muted: false,
            member: false,
        }
    }

    /// Returns the same player with another rank.
    #[must_use]
    pub fn with_rank(mut self, rank: Rank) -> Self {
        self.rank = rank;
        self
    }

    /// Returns whether the player's rank is at least `rank`.
    #[must_use]
    pub fn ranks_at_least(&self, rank: Rank) -> bool {
        self.rank >= rank
    }

    /// Display name without color tags.
    #[must_use]
    pub fn plain_name(&self) -> String {
        strip_colors(&self.name)
    }
}

/// Identity lookups the resolver and resolution chain need from the host.
pub trait PlayerDirectory {
    /// Returns the current snapshot of a connected player.
    fn get(&self, id: PlayerId) -> Option<Player>;

    /// Fuzzy lookup by display name. Returns the single best match, if any.
    fn lookup_by_name(&self, name: &str) -> Option<Player>;

    /// Every connected player whose color-stripped name equals `name` (case-insensitive).
    fn lookup_all_by_name_exact(&self, name: &str) -> Vec<Player>;

    /// Live roster at the moment of the call.
    fn online_players(&self) -> Vec<Player>;
}

/// Removes `[tag]` color markup from a display name.
///
/// A bracket group counts as a tag only when it is closed and contains no whitespace; other
/// brackets are kept verbatim.
#[must_use]
pub fn strip_colors(name: &str) -> String {
    let mut output = String::with_capacity(name.len());
    let mut rest = name;
    while let Some(open) = rest.find('[') {
        output.push_str(&rest[..open]);
        let after_open = &rest[open + 1..];
        match after_open.find(']') {
            Some(close) if !after_open[..close].contains(char::is_whitespace) => {
                rest = &after_open[close + 1..];
            }
            _ => {
                output.push('[');
                rest = after_open;
            }
        }
    }
    output.push_str(rest);
    output
}

/// Picks the best fuzzy match for `query` among `candidates`.
///
/// Preference order: exact color-stripped name, then a unique prefix, then a unique substring.
/// Ties at the prefix or substring stage yield `None` so the caller never gets an arbitrary pick.
pub fn fuzzy_match<'a, I>(candidates: I, query: &str) -> Option<&'a Player>
where
    I: IntoIterator<Item = &'a Player>,
{
    let needle = strip_colors(query).trim().to_lowercase();
    if needle.is_empty() {
        return None;
    }
    let named = candidates
        .into_iter()
        .map(|player| (player, player.plain_name().to_lowercase()))
        .collect::<Vec<_>>();

    if let Some((player, _)) = named.iter().find(|(_, plain)| *plain == needle) {
        return Some(*player);
    }
    let unique = |matches: Vec<&'a Player>| match matches.as_slice() {
        [only] => Some(*only),
        _ => None,
    };
    let prefixed = named
        .iter()
        .filter(|(_, plain)| plain.starts_with(&needle))
        .map(|(player, _)| *player)
        .collect::<Vec<_>>();
    if !prefixed.is_empty() {
        return unique(prefixed);
    }
    unique(
        named
            .iter()
            .filter(|(_, plain)| plain.contains(&needle))
            .map(|(player, _)| *player)
            .collect(),
    )
}

/// Collects every candidate whose color-stripped name equals `query`, ignoring case.
pub fn exact_matches<'a, I>(candidates: I, query: &str) -> Vec<&'a Player>
where
    I: IntoIterator<Item = &'a Player>,
{
    let needle = strip_colors(query).trim().to_lowercase();
    candidates
        .into_iter()
        .filter(|player| player.plain_name().to_lowercase() == needle)
        .collect()
}
