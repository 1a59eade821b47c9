//! Concurrent staff filtering.
//!
//! Classifies many users against one ticket's staff configuration. The
//! reference sets are loaded once and shared read-only; each candidate needs
//! its own member lookup, so lookups run as parallel tasks bounded by
//! `AccessConfig::max_concurrent_lookups`.

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use tk_common::{ChannelId, GuildId, Member, Panel, RoleId, Ticket, UserId};
use tokio::sync::Semaphore;
use tokio::task::JoinSet;

use super::error::{AccessError, AccessResult, MembershipError};
use super::resolver::{with_timeout, AccessResolver};
use super::sets;
use super::store::MembershipProvider;

/// Staff reference sets for a single ticket context.
#[derive(Debug, Default)]
struct StaffPolicy {
    admin_users: HashSet<UserId>,
    admin_roles: HashSet<RoleId>,
    support_users: HashSet<UserId>,
    support_roles: HashSet<RoleId>,
    team_users: HashSet<UserId>,
    team_roles: HashSet<RoleId>,
    /// False only when the ticket's panel opts out of the default team.
    default_team_applies: bool,
}

impl StaffPolicy {
    fn is_staff(&self, user_id: UserId, member: &Member) -> bool {
        if self.admin_users.contains(&user_id) || self.team_users.contains(&user_id) {
            return true;
        }

        if self.default_team_applies
            && (self.support_users.contains(&user_id)
                || sets::intersects(&self.support_roles, &member.roles))
        {
            return true;
        }

        sets::intersects(&self.admin_roles, &member.roles)
            || sets::intersects(&self.team_roles, &member.roles)
    }
}

impl AccessResolver {
    /// Return the subset of `user_ids` that count as staff for `ticket`.
    ///
    /// Users who have left the guild are silently dropped. Any other lookup
    /// failure fails the whole call and discards results gathered so far.
    /// The returned ids are in completion order, which varies between runs.
    #[tracing::instrument(
        skip(self, ticket, user_ids),
        fields(guild_id = %ticket.guild_id, ticket_id = %ticket.id, candidates = user_ids.len())
    )]
    pub async fn filter_staff(
        &self,
        ticket: &Ticket,
        user_ids: &[UserId],
        exclude_bots: bool,
        exclude_opener: bool,
    ) -> AccessResult<Vec<UserId>> {
        let panel = self.staff_panel(ticket).await?;
        let policy = self
            .load_staff_policy(ticket.guild_id, panel.as_ref())
            .await?;
        let policy = Arc::new(policy);

        let mut seen = HashSet::with_capacity(user_ids.len());
        let candidates: Vec<UserId> = user_ids
            .iter()
            .copied()
            .filter(|&user_id| !(exclude_opener && ticket.is_opener(user_id)))
            .filter(|&user_id| seen.insert(user_id))
            .collect();

        let permits = Arc::new(Semaphore::new(self.config.max_concurrent_lookups.max(1)));
        let mut tasks = JoinSet::new();

        for user_id in candidates {
            let members = Arc::clone(&self.members);
            let policy = Arc::clone(&policy);
            let permits = Arc::clone(&permits);
            let guild_id = ticket.guild_id;
            let timeout = self.config.provider_timeout;

            tasks.spawn(async move {
                let _permit = permits
                    .acquire()
                    .await
                    .map_err(|e| AccessError::Task(e.to_string()))?;

                classify_candidate(
                    members.as_ref(),
                    &policy,
                    guild_id,
                    user_id,
                    exclude_bots,
                    timeout,
                )
                .await
            });
        }

        let mut staff_ids = Vec::new();
        while let Some(joined) = tasks.join_next().await {
            match joined
                .map_err(|e| AccessError::Task(e.to_string()))
                .and_then(|outcome| outcome)
            {
                Ok(Some(user_id)) => staff_ids.push(user_id),
                Ok(None) => {}
                Err(err) => {
                    tasks.abort_all();
                    tracing::warn!(error = %err, "Staff lookup failed, discarding results");
                    return Err(err);
                }
            }
        }

        tracing::debug!(staff = staff_ids.len(), "Filtered staff members");
        Ok(staff_ids)
    }

    /// Count staff currently joined to a ticket thread, ignoring bots and the
    /// ticket opener.
    pub async fn count_staff_in_thread(
        &self,
        ticket: &Ticket,
        thread_id: ChannelId,
    ) -> AccessResult<usize> {
        let thread_members = self
            .bounded(self.members.list_thread_members(thread_id))
            .await?;

        let user_ids: Vec<UserId> = thread_members.iter().map(|m| m.user_id).collect();
        let staff_ids = self.filter_staff(ticket, &user_ids, true, true).await?;

        Ok(staff_ids.len())
    }

    /// Ticket panel for staff filtering. Unknown panels and panels from
    /// another guild count as no panel.
    async fn staff_panel(&self, ticket: &Ticket) -> AccessResult<Option<Panel>> {
        let Some(panel_id) = ticket.panel_id else {
            return Ok(None);
        };

        let panel = self.bounded(self.store.get_panel(panel_id)).await?;
        match panel {
            Some(panel) if panel.guild_id == ticket.guild_id => Ok(Some(panel)),
            other => {
                tracing::debug!(
                    %panel_id,
                    found = other.is_some(),
                    "Ignoring unresolvable ticket panel"
                );
                Ok(None)
            }
        }
    }

    async fn load_staff_policy(
        &self,
        guild_id: GuildId,
        panel: Option<&Panel>,
    ) -> AccessResult<StaffPolicy> {
        let store = self.store.as_ref();

        let (admin_users, admin_roles, support_users, support_roles) = tokio::try_join!(
            self.bounded(store.get_admins(guild_id)),
            self.bounded(store.get_admin_roles(guild_id)),
            self.bounded(store.get_support(guild_id)),
            self.bounded(store.get_support_roles(guild_id)),
        )?;

        let (team_users, team_roles) = match panel {
            Some(panel) => tokio::try_join!(
                self.bounded(store.get_team_users_for_panel(panel.panel_id)),
                self.bounded(store.get_team_roles_for_panel(panel.panel_id)),
            )?,
            None => (Vec::new(), Vec::new()),
        };

        Ok(StaffPolicy {
            admin_users: sets::to_set(admin_users),
            admin_roles: sets::to_set(admin_roles),
            support_users: sets::to_set(support_users),
            support_roles: sets::to_set(support_roles),
            team_users: sets::to_set(team_users),
            team_roles: sets::to_set(team_roles),
            default_team_applies: panel.is_none_or(|p| p.with_default_team),
        })
    }
}

/// Fetch and classify one candidate. `Ok(None)` means not staff.
async fn classify_candidate(
    members: &dyn MembershipProvider,
    policy: &StaffPolicy,
    guild_id: GuildId,
    user_id: UserId,
    exclude_bots: bool,
    timeout: Option<Duration>,
) -> AccessResult<Option<UserId>> {
    let lookup = members.get_guild_member(guild_id, user_id);
    let member = match with_timeout(timeout, lookup).await {
        Ok(member) => member,
        // Left the guild
        Err(AccessError::Membership(MembershipError::NotFound { .. })) => return Ok(None),
        Err(err) => return Err(err),
    };

    if exclude_bots && member.bot {
        return Ok(None);
    }

    Ok(policy.is_staff(user_id, &member).then_some(user_id))
}
