//! Ticket access resolution.
//!
//! Resolution order, first match wins:
//! 1. The ticket opener always has access
//! 2. Guild admins (by user or role)
//! 3. A claimed ticket is restricted to its claimer
//! 4. Without a panel, the default support team
//! 5. With a panel, the default team (if the panel opts in), then the
//!    panel's teams by user, then by role

use serde::Serialize;
use tk_common::{GuildId, Member, Ticket, UserId};

use super::error::{AccessError, AccessResult};
use super::resolver::AccessResolver;
use super::sets;

/// The rule that granted access.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AccessTier {
    Opener,
    Admin,
    Claimer,
    DefaultTeam,
    TeamUser,
    TeamRole,
}

/// Why access was refused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DenyReason {
    /// Claimed by another staff member.
    ClaimedByOther(UserId),
    /// Not in any team that handles the ticket.
    NoMatchingTeam,
}

/// Outcome of a ticket access check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AccessDecision {
    Allowed(AccessTier),
    Denied(DenyReason),
}

impl AccessDecision {
    #[must_use]
    pub const fn is_allowed(&self) -> bool {
        matches!(self, Self::Allowed(_))
    }

    /// The matched tier, if access was granted.
    #[must_use]
    pub const fn tier(&self) -> Option<AccessTier> {
        match self {
            Self::Allowed(tier) => Some(*tier),
            Self::Denied(_) => None,
        }
    }
}

impl AccessResolver {
    /// Whether `user_id` may view and act on `ticket`.
    pub async fn can_access(&self, ticket: &Ticket, user_id: UserId) -> AccessResult<bool> {
        Ok(self.evaluate_access(ticket, user_id).await?.is_allowed())
    }

    /// Resolve access and report which rule decided it.
    ///
    /// Errors from the store or membership provider are returned as-is,
    /// including a member that has left the guild. A ticket pointing at a
    /// panel that no longer exists fails with [`AccessError::PanelNotFound`].
    #[tracing::instrument(
        skip(self, ticket),
        fields(guild_id = %ticket.guild_id, ticket_id = %ticket.id)
    )]
    pub async fn evaluate_access(
        &self,
        ticket: &Ticket,
        user_id: UserId,
    ) -> AccessResult<AccessDecision> {
        let decision = self.resolve_access(ticket, user_id).await?;
        tracing::debug!(?decision, "Resolved ticket access");
        Ok(decision)
    }

    async fn resolve_access(
        &self,
        ticket: &Ticket,
        user_id: UserId,
    ) -> AccessResult<AccessDecision> {
        if ticket.is_opener(user_id) {
            return Ok(AccessDecision::Allowed(AccessTier::Opener));
        }

        let member = self.fetch_member(ticket.guild_id, user_id).await?;

        if self.is_admin(ticket.guild_id, user_id, &member).await? {
            return Ok(AccessDecision::Allowed(AccessTier::Admin));
        }

        // Admins were handled above, so a claim excludes everyone else
        match self
            .bounded(self.store.get_claim_owner(ticket.guild_id, ticket.id))
            .await?
        {
            Some(claimer) if claimer == user_id => {
                return Ok(AccessDecision::Allowed(AccessTier::Claimer));
            }
            Some(claimer) => {
                return Ok(AccessDecision::Denied(DenyReason::ClaimedByOther(claimer)));
            }
            None => {}
        }

        let Some(panel_id) = ticket.panel_id else {
            let in_default_team = self
                .is_in_default_team(ticket.guild_id, user_id, &member)
                .await?;
            if in_default_team {
                return Ok(AccessDecision::Allowed(AccessTier::DefaultTeam));
            }
            return Ok(AccessDecision::Denied(DenyReason::NoMatchingTeam));
        };

        let panel = self
            .bounded(self.store.get_panel(panel_id))
            .await?
            .ok_or(AccessError::PanelNotFound(panel_id))?;

        if panel.with_default_team
            && self
                .is_in_default_team(ticket.guild_id, user_id, &member)
                .await?
        {
            return Ok(AccessDecision::Allowed(AccessTier::DefaultTeam));
        }

        let team_users = self
            .bounded(self.store.get_team_users_for_panel(panel.panel_id))
            .await?;
        if team_users.contains(&user_id) {
            return Ok(AccessDecision::Allowed(AccessTier::TeamUser));
        }

        let team_roles = self
            .bounded(self.store.get_team_roles_for_panel(panel.panel_id))
            .await?;
        if sets::any_in(&team_roles, &member.roles) {
            return Ok(AccessDecision::Allowed(AccessTier::TeamRole));
        }

        Ok(AccessDecision::Denied(DenyReason::NoMatchingTeam))
    }

    async fn is_admin(
        &self,
        guild_id: GuildId,
        user_id: UserId,
        member: &Member,
    ) -> AccessResult<bool> {
        let admin_users = self.bounded(self.store.get_admins(guild_id)).await?;
        if admin_users.contains(&user_id) {
            return Ok(true);
        }

        let admin_roles = self.bounded(self.store.get_admin_roles(guild_id)).await?;
        Ok(sets::any_in(&admin_roles, &member.roles))
    }
}
