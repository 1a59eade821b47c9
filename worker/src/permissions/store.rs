//! Permission data sources.
//!
//! The worker never writes permission data; both traits are read-only views
//! over state owned by the dashboard and the Discord gateway.

use async_trait::async_trait;
use tk_common::{
    ChannelId, GuildId, Member, Panel, PanelId, RoleId, TeamId, ThreadMember, TicketId, UserId,
};

use super::error::{MembershipError, StoreError};

/// Stored guild staff configuration.
#[async_trait]
pub trait PermissionStore: Send + Sync {
    /// Users with guild-wide admin access.
    async fn get_admins(&self, guild_id: GuildId) -> Result<Vec<UserId>, StoreError>;

    /// Roles with guild-wide admin access.
    async fn get_admin_roles(&self, guild_id: GuildId) -> Result<Vec<RoleId>, StoreError>;

    /// Users in the default support team.
    async fn get_support(&self, guild_id: GuildId) -> Result<Vec<UserId>, StoreError>;

    /// Roles in the default support team.
    async fn get_support_roles(&self, guild_id: GuildId) -> Result<Vec<RoleId>, StoreError>;

    /// Look up a panel. `None` when the id does not resolve.
    async fn get_panel(&self, panel_id: PanelId) -> Result<Option<Panel>, StoreError>;

    /// Direct members of every team linked to the panel.
    async fn get_team_users_for_panel(&self, panel_id: PanelId) -> Result<Vec<UserId>, StoreError>;

    /// Roles of every team linked to the panel.
    async fn get_team_roles_for_panel(&self, panel_id: PanelId) -> Result<Vec<RoleId>, StoreError>;

    /// Current claimer of a ticket, `None` when unclaimed.
    async fn get_claim_owner(
        &self,
        guild_id: GuildId,
        ticket_id: TicketId,
    ) -> Result<Option<UserId>, StoreError>;

    /// Teams the user belongs to directly.
    async fn get_teams_for_user(
        &self,
        guild_id: GuildId,
        user_id: UserId,
    ) -> Result<Vec<TeamId>, StoreError>;

    /// Teams reachable through any of the given roles.
    async fn get_teams_for_roles(
        &self,
        guild_id: GuildId,
        role_ids: &[RoleId],
    ) -> Result<Vec<TeamId>, StoreError>;
}

/// Live guild membership, normally backed by the Discord REST API.
#[async_trait]
pub trait MembershipProvider: Send + Sync {
    /// Fetch a guild member.
    ///
    /// Must return [`MembershipError::NotFound`] when the user is not in the
    /// guild so callers can tell departures apart from provider failures.
    async fn get_guild_member(
        &self,
        guild_id: GuildId,
        user_id: UserId,
    ) -> Result<Member, MembershipError>;

    /// Users currently joined to a thread.
    async fn list_thread_members(
        &self,
        thread_id: ChannelId,
    ) -> Result<Vec<ThreadMember>, MembershipError>;
}
