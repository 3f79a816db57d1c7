//! Named permission predicates evaluated against a caller before argument resolution.

use cmdr_common::error::{CmdrError, CmdrResult};
use cmdr_common::ids::Rank;

use crate::player::Player;

/// Grant condition of a permission.
///
/// Conditions compose with `AnyOf` (boolean OR) and `AllOf` (boolean AND); rank thresholds are
/// evaluated independently of every other rank permission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PermissionCheck {
    /// Always granted.
    Always,
    /// Granted when the caller's rank is at least the threshold.
    RankAtLeast(Rank),
    /// Granted when the caller is not restricted.
    NotRestricted,
    /// Granted when the caller is not muted.
    NotMuted,
    /// Granted when the caller holds a membership.
    Member,
    /// Granted when any nested condition is granted.
    AnyOf(Vec<PermissionCheck>),
    /// Granted when every nested condition is granted.
    AllOf(Vec<PermissionCheck>),
}

impl PermissionCheck {
    /// Evaluates the condition for one caller.
    #[must_use]
    pub fn evaluate(&self, player: &Player) -> bool {
        match self {
            Self::Always => true,
            Self::RankAtLeast(rank) => player.ranks_at_least(*rank),
            Self::NotRestricted => !player.restricted,
            Self::NotMuted => !player.muted,
            Self::Member => player.member,
            Self::AnyOf(checks) => checks.iter().any(|check| check.evaluate(player)),
            Self::AllOf(checks) => checks.iter().all(|check| check.evaluate(player)),
        }
    }
}

/// A named capability with its default denial message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Permission {
    name: String,
    check: PermissionCheck,
    color: &'static str,
    unauthorized_message: String,
}

impl Permission {
    /// Creates a permission with the default denial message.
    #[must_use]
    pub fn new(name: impl Into<String>, check: PermissionCheck) -> Self {
        let name = name.into();
        let unauthorized_message =
            format!("You do not have the required permission ({name}) to execute this command");
        Self {
            name,
            check,
            color: "",
            unauthorized_message,
        }
    }

    /// Derives a permission granted to every rank at or above `rank`.
    #[must_use]
    pub fn from_rank(rank: Rank) -> Self {
        Self::new(rank.name(), PermissionCheck::RankAtLeast(rank)).with_color(rank.color())
    }

    /// Replaces the default denial message.
    #[must_use]
    pub fn with_unauthorized_message(mut self, message: impl Into<String>) -> Self {
        self.unauthorized_message = message.into();
        self
    }

    /// Sets the color tag used when listing commands guarded by this permission.
    #[must_use]
    pub fn with_color(mut self, color: &'static str) -> Self {
        self.color = color;
        self
    }

    /// Widens this permission so that it is also granted when `other` is.
    ///
    /// The name and denial message of `self` are kept.
    #[must_use]
    pub fn or(mut self, other: &Permission) -> Self {
        self.check = PermissionCheck::AnyOf(vec![self.check, other.check.clone()]);
        self
    }

    /// Granted to everyone.
    #[must_use]
    pub fn all() -> Self {
        Self::new("all", PermissionCheck::Always).with_color("[sky]")
    }

    /// Granted to players who are not restricted, and to moderators regardless.
    #[must_use]
    pub fn not_restricted() -> Self {
        Self::new("player", PermissionCheck::NotRestricted)
            .with_color("[sky]")
            .or(&Self::moderator())
    }

    /// Granted to players who are not muted, and to moderators regardless.
    #[must_use]
    pub fn chat() -> Self {
        Self::new("chat", PermissionCheck::NotMuted).or(&Self::moderator())
    }

    /// Granted to unrestricted members.
    #[must_use]
    pub fn member() -> Self {
        Self::new(
            "member",
            PermissionCheck::AllOf(vec![PermissionCheck::Member, PermissionCheck::NotRestricted]),
        )
        .with_color("[pink]")
        .with_unauthorized_message(
            "You must have a [scarlet]Membership[yellow] to use this command.",
        )
    }

    /// Rank-derived permission for trusted players.
    #[must_use]
    pub fn trusted() -> Self {
        Self::from_rank(Rank::Trusted)
    }

    /// Rank-derived permission for moderators.
    #[must_use]
    pub fn moderator() -> Self {
        Self::from_rank(Rank::Moderator)
    }

    /// Rank-derived permission for admins.
    #[must_use]
    pub fn admin() -> Self {
        Self::from_rank(Rank::Admin)
    }

    /// Rank-derived permission for managers.
    #[must_use]
    pub fn manager() -> Self {
        Self::from_rank(Rank::Manager)
    }

    /// Permission to see raw error detail after an unexpected handler failure.
    #[must_use]
    pub fn see_error_messages(rank: Rank) -> Self {
        Self::new("seeErrorMessages", PermissionCheck::RankAtLeast(rank))
    }

    /// Permission name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Color tag for listings.
    #[must_use]
    pub fn color(&self) -> &'static str {
        self.color
    }

    /// Default denial message.
    #[must_use]
    pub fn unauthorized_message(&self) -> &str {
        &self.unauthorized_message
    }

    /// Evaluates this permission for one caller.
    #[must_use]
    pub fn check(&self, player: &Player) -> bool {
        self.check.evaluate(player)
    }

    /// Gates one caller.
    ///
    /// # Errors
    ///
    /// Returns `CmdrError::PermissionDenied` carrying the default denial message when the
    /// caller is not granted.
    pub fn authorize(&self, player: &Player) -> CmdrResult<()> {
        if self.check(player) {
            Ok(())
        } else {
            Err(CmdrError::PermissionDenied(self.unauthorized_message.clone()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{Permission, PermissionCheck};
    use crate::player::Player;
    use cmdr_common::error::CmdrError;
    use cmdr_common::ids::Rank;
    use googletest::prelude::*;
    use rstest::rstest;

    fn restricted(rank: Rank) -> Player {
        let mut player = Player::new(7, "Griefer").with_rank(rank);
        player.restricted = true;
        player
    }

    #[rstest]
    #[case(Rank::Player, false)]
    #[case(Rank::Trusted, false)]
    #[case(Rank::Moderator, true)]
    #[case(Rank::Manager, true)]
    fn moderator_permission_is_a_rank_threshold(#[case] rank: Rank, #[case] granted: bool) {
        let player = Player::new(1, "p").with_rank(rank);
        assert_that!(Permission::moderator().check(&player), eq(granted));
    }

    #[rstest]
    fn not_restricted_grants_restricted_moderators() {
        let permission = Permission::not_restricted();
        assert_that!(permission.check(&restricted(Rank::Player)), eq(false));
        assert_that!(permission.check(&restricted(Rank::Moderator)), eq(true));
        assert_that!(permission.check(&Player::new(2, "fine")), eq(true));
        assert_that!(permission.name(), eq("player"));
    }

    #[rstest]
    fn member_permission_requires_membership_and_freedom() {
        let permission = Permission::member();
        let mut player = Player::new(3, "m");
        assert_that!(permission.check(&player), eq(false));
        player.member = true;
        assert_that!(permission.check(&player), eq(true));
        player.restricted = true;
        assert_that!(permission.check(&player), eq(false));
        assert_that!(
            permission.unauthorized_message(),
            eq("You must have a [scarlet]Membership[yellow] to use this command.")
        );
    }

    #[rstest]
    fn default_denial_message_names_the_permission() {
        let permission = Permission::new("spawn", PermissionCheck::Always);
        assert_that!(
            permission.unauthorized_message(),
            eq("You do not have the required permission (spawn) to execute this command")
        );
    }

    #[rstest]
    fn authorize_denies_with_the_permission_message() {
        let permission = Permission::admin();
        let player = Player::new(4, "p").with_rank(Rank::Moderator);

        assert_that!(
            &permission.authorize(&player),
            eq(&Err(CmdrError::PermissionDenied(
                "You do not have the required permission (admin) to execute this command"
                    .to_owned()
            )))
        );
        assert_that!(
            &permission.authorize(&player.with_rank(Rank::Manager)),
            eq(&Ok(()))
        );
    }
}
