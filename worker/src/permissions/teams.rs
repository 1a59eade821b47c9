//! Support team membership.

use std::collections::HashSet;

use serde::Serialize;
use tk_common::{GuildId, Member, TeamId, UserId};

use super::error::AccessResult;
use super::resolver::AccessResolver;
use super::sets;

/// Teams a guild member belongs to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MemberTeams {
    /// Member of the guild's default support team.
    pub in_default_team: bool,
    /// Named teams, each listed once. Order is unspecified.
    pub team_ids: Vec<TeamId>,
}

impl MemberTeams {
    /// Whether the member belongs to any team at all.
    #[must_use]
    pub fn is_support(&self) -> bool {
        self.in_default_team || !self.team_ids.is_empty()
    }
}

impl AccessResolver {
    /// Resolve default-team and named-team membership for an already fetched
    /// member.
    #[tracing::instrument(skip(self, member))]
    pub async fn member_teams(
        &self,
        guild_id: GuildId,
        user_id: UserId,
        member: &Member,
    ) -> AccessResult<MemberTeams> {
        let support_users = self.bounded(self.store.get_support(guild_id)).await?;
        let support_roles = self.bounded(self.store.get_support_roles(guild_id)).await?;

        let in_default_team = support_users.contains(&user_id)
            || sets::intersects(&sets::to_set(support_roles), &member.roles);

        // A role can be shared by several teams, and a user can be in a team
        // both directly and through a role.
        let mut team_ids: HashSet<TeamId> = self
            .bounded(self.store.get_teams_for_user(guild_id, user_id))
            .await?
            .into_iter()
            .collect();

        if !member.roles.is_empty() {
            team_ids.extend(
                self.bounded(self.store.get_teams_for_roles(guild_id, &member.roles))
                    .await?,
            );
        }

        Ok(MemberTeams {
            in_default_team,
            team_ids: team_ids.into_iter().collect(),
        })
    }

    /// Fetch the member, then resolve their teams.
    ///
    /// Fails with a not-found membership error if the user is not in the guild.
    pub async fn member_teams_for(
        &self,
        guild_id: GuildId,
        user_id: UserId,
    ) -> AccessResult<MemberTeams> {
        let member = self.fetch_member(guild_id, user_id).await?;
        self.member_teams(guild_id, user_id, &member).await
    }

    /// Whether the member is in the guild's default support team, either as a
    /// listed user or through one of their roles.
    pub async fn is_in_default_team(
        &self,
        guild_id: GuildId,
        user_id: UserId,
        member: &Member,
    ) -> AccessResult<bool> {
        let support_users = self.bounded(self.store.get_support(guild_id)).await?;
        if support_users.contains(&user_id) {
            return Ok(true);
        }

        let support_roles = self.bounded(self.store.get_support_roles(guild_id)).await?;

        Ok(sets::any_in(&support_roles, &member.roles))
    }
}
