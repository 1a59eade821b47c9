//! In-memory permission store and membership provider.
//!
//! Used by tests and by hosts that mirror staff configuration from another
//! source. All mutators take `&self`; the maps are sharded concurrent maps.

use async_trait::async_trait;
use dashmap::DashMap;
use tk_common::{
    ChannelId, GuildId, Member, Panel, PanelId, RoleId, SupportTeam, TeamId, ThreadMember, TicketId,
    UserId,
};

use super::error::{MembershipError, StoreError};
use super::store::{MembershipProvider, PermissionStore};

#[derive(Debug, Clone, Default)]
struct GuildStaff {
    admin_users: Vec<UserId>,
    admin_roles: Vec<RoleId>,
    support_users: Vec<UserId>,
    support_roles: Vec<RoleId>,
}

#[derive(Debug, Clone)]
struct TeamRecord {
    team: SupportTeam,
    users: Vec<UserId>,
    roles: Vec<RoleId>,
    panels: Vec<PanelId>,
}

fn push_unique<T: PartialEq>(ids: &mut Vec<T>, id: T) {
    if !ids.contains(&id) {
        ids.push(id);
    }
}

/// Permission store backed by process memory.
#[derive(Debug, Default)]
pub struct InMemoryPermissionStore {
    guilds: DashMap<GuildId, GuildStaff>,
    panels: DashMap<PanelId, Panel>,
    teams: DashMap<TeamId, TeamRecord>,
    claims: DashMap<(GuildId, TicketId), UserId>,
}

impl InMemoryPermissionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_admin(&self, guild_id: GuildId, user_id: UserId) {
        push_unique(
            &mut self.guilds.entry(guild_id).or_default().admin_users,
            user_id,
        );
    }

    pub fn add_admin_role(&self, guild_id: GuildId, role_id: RoleId) {
        push_unique(
            &mut self.guilds.entry(guild_id).or_default().admin_roles,
            role_id,
        );
    }

    pub fn add_support(&self, guild_id: GuildId, user_id: UserId) {
        push_unique(
            &mut self.guilds.entry(guild_id).or_default().support_users,
            user_id,
        );
    }

    pub fn add_support_role(&self, guild_id: GuildId, role_id: RoleId) {
        push_unique(
            &mut self.guilds.entry(guild_id).or_default().support_roles,
            role_id,
        );
    }

    pub fn insert_panel(&self, panel: Panel) {
        self.panels.insert(panel.panel_id, panel);
    }

    /// Register a team. Replaces any previous team with the same id,
    /// including its members and panel links.
    pub fn insert_team(&self, team: SupportTeam) {
        self.teams.insert(
            team.id,
            TeamRecord {
                team,
                users: Vec::new(),
                roles: Vec::new(),
                panels: Vec::new(),
            },
        );
    }

    /// Returns `false` if the team is unknown.
    pub fn add_team_member(&self, team_id: TeamId, user_id: UserId) -> bool {
        self.teams
            .get_mut(&team_id)
            .map(|mut record| push_unique(&mut record.users, user_id))
            .is_some()
    }

    /// Returns `false` if the team is unknown.
    pub fn add_team_role(&self, team_id: TeamId, role_id: RoleId) -> bool {
        self.teams
            .get_mut(&team_id)
            .map(|mut record| push_unique(&mut record.roles, role_id))
            .is_some()
    }

    /// Returns `false` if the team is unknown.
    pub fn link_team_to_panel(&self, team_id: TeamId, panel_id: PanelId) -> bool {
        self.teams
            .get_mut(&team_id)
            .map(|mut record| push_unique(&mut record.panels, panel_id))
            .is_some()
    }

    /// Set or clear the claimer of a ticket.
    pub fn set_claim(&self, guild_id: GuildId, ticket_id: TicketId, claimer: Option<UserId>) {
        match claimer {
            Some(user_id) => {
                self.claims.insert((guild_id, ticket_id), user_id);
            }
            None => {
                self.claims.remove(&(guild_id, ticket_id));
            }
        }
    }

    fn staff<T>(&self, guild_id: GuildId, select: impl FnOnce(&GuildStaff) -> T) -> T
    where
        T: Default,
    {
        self.guilds
            .get(&guild_id)
            .map(|staff| select(&staff))
            .unwrap_or_default()
    }

    fn panel_teams<T: PartialEq + Copy>(
        &self,
        panel_id: PanelId,
        select: impl Fn(&TeamRecord) -> &[T],
    ) -> Vec<T> {
        let mut ids = Vec::new();
        for record in self.teams.iter() {
            if record.panels.contains(&panel_id) {
                for id in select(&record) {
                    push_unique(&mut ids, *id);
                }
            }
        }
        ids
    }
}

#[async_trait]
impl PermissionStore for InMemoryPermissionStore {
    async fn get_admins(&self, guild_id: GuildId) -> Result<Vec<UserId>, StoreError> {
        Ok(self.staff(guild_id, |s| s.admin_users.clone()))
    }

    async fn get_admin_roles(&self, guild_id: GuildId) -> Result<Vec<RoleId>, StoreError> {
        Ok(self.staff(guild_id, |s| s.admin_roles.clone()))
    }

    /// Admins are support-level too.
    async fn get_support(&self, guild_id: GuildId) -> Result<Vec<UserId>, StoreError> {
        Ok(self.staff(guild_id, |s| {
            let mut users = s.support_users.clone();
            for user_id in &s.admin_users {
                push_unique(&mut users, *user_id);
            }
            users
        }))
    }

    async fn get_support_roles(&self, guild_id: GuildId) -> Result<Vec<RoleId>, StoreError> {
        Ok(self.staff(guild_id, |s| {
            let mut roles = s.support_roles.clone();
            for role_id in &s.admin_roles {
                push_unique(&mut roles, *role_id);
            }
            roles
        }))
    }

    async fn get_panel(&self, panel_id: PanelId) -> Result<Option<Panel>, StoreError> {
        Ok(self.panels.get(&panel_id).map(|panel| panel.clone()))
    }

    async fn get_team_users_for_panel(&self, panel_id: PanelId) -> Result<Vec<UserId>, StoreError> {
        Ok(self.panel_teams(panel_id, |record| record.users.as_slice()))
    }

    async fn get_team_roles_for_panel(&self, panel_id: PanelId) -> Result<Vec<RoleId>, StoreError> {
        Ok(self.panel_teams(panel_id, |record| record.roles.as_slice()))
    }

    async fn get_claim_owner(
        &self,
        guild_id: GuildId,
        ticket_id: TicketId,
    ) -> Result<Option<UserId>, StoreError> {
        Ok(self.claims.get(&(guild_id, ticket_id)).map(|claim| *claim))
    }

    async fn get_teams_for_user(
        &self,
        guild_id: GuildId,
        user_id: UserId,
    ) -> Result<Vec<TeamId>, StoreError> {
        Ok(self
            .teams
            .iter()
            .filter(|record| record.team.guild_id == guild_id && record.users.contains(&user_id))
            .map(|record| record.team.id)
            .collect())
    }

    async fn get_teams_for_roles(
        &self,
        guild_id: GuildId,
        role_ids: &[RoleId],
    ) -> Result<Vec<TeamId>, StoreError> {
        Ok(self
            .teams
            .iter()
            .filter(|record| {
                record.team.guild_id == guild_id
                    && record
                        .roles
                        .iter()
                        .any(|role_id| role_ids.contains(role_id))
            })
            .map(|record| record.team.id)
            .collect())
    }
}

/// Membership provider backed by process memory.
#[derive(Debug, Default)]
pub struct InMemoryMembership {
    members: DashMap<(GuildId, UserId), Member>,
    threads: DashMap<ChannelId, Vec<UserId>>,
}

impl InMemoryMembership {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert_member(&self, guild_id: GuildId, member: Member) {
        self.members.insert((guild_id, member.user_id), member);
    }

    /// Simulate a user leaving the guild.
    pub fn remove_member(&self, guild_id: GuildId, user_id: UserId) {
        self.members.remove(&(guild_id, user_id));
    }

    pub fn join_thread(&self, thread_id: ChannelId, user_id: UserId) {
        push_unique(&mut self.threads.entry(thread_id).or_default(), user_id);
    }
}

#[async_trait]
impl MembershipProvider for InMemoryMembership {
    async fn get_guild_member(
        &self,
        guild_id: GuildId,
        user_id: UserId,
    ) -> Result<Member, MembershipError> {
        self.members
            .get(&(guild_id, user_id))
            .map(|member| member.clone())
            .ok_or(MembershipError::NotFound { guild_id, user_id })
    }

    async fn list_thread_members(
        &self,
        thread_id: ChannelId,
    ) -> Result<Vec<ThreadMember>, MembershipError> {
        Ok(self
            .threads
            .get(&thread_id)
            .map(|users| {
                users
                    .iter()
                    .map(|&user_id| ThreadMember { thread_id, user_id })
                    .collect()
            })
            .unwrap_or_default())
    }
}
