//! Shared fixtures for access resolution tests.
//!
//! Builds a guild with one admin, one default support user, one named team
//! linked to a panel, and matching roles for each tier. Provider wrappers
//! count store calls, inject failures and track lookup concurrency.
#![allow(dead_code)]

use std::collections::HashSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tk_common::{
    ChannelId, GuildId, Member, Panel, PanelId, RoleId, SupportTeam, TeamId, ThreadMember, Ticket,
    TicketId, UserId,
};
use tk_worker::config::AccessConfig;
use tk_worker::permissions::{
    AccessResolver, InMemoryMembership, InMemoryPermissionStore, MembershipError,
    MembershipProvider, PermissionStore, StoreError,
};

// ============================================================================
// Ids
// ============================================================================

pub const GUILD: GuildId = GuildId(900_000_000_000_000_001);
pub const OTHER_GUILD: GuildId = GuildId(900_000_000_000_000_002);

pub const ADMIN: UserId = UserId(1);
pub const SUPPORT: UserId = UserId(2);
pub const TEAM_USER: UserId = UserId(3);
pub const OUTSIDER: UserId = UserId(4);
pub const OPENER: UserId = UserId(5);
pub const ADMIN_BY_ROLE: UserId = UserId(6);
pub const SUPPORT_BY_ROLE: UserId = UserId(7);
pub const TEAM_BY_ROLE: UserId = UserId(8);
pub const STAFF_BOT: UserId = UserId(9);

pub const ADMIN_ROLE: RoleId = RoleId(100);
pub const SUPPORT_ROLE: RoleId = RoleId(200);
pub const TEAM_ROLE: RoleId = RoleId(300);
pub const UNRELATED_ROLE: RoleId = RoleId(400);

pub const PANEL: PanelId = PanelId(10);
pub const FOREIGN_PANEL: PanelId = PanelId(11);
pub const MISSING_PANEL: PanelId = PanelId(404);
pub const TEAM: TeamId = TeamId(20);

pub const TICKET: TicketId = TicketId(42);
pub const THREAD: ChannelId = ChannelId(777);

// ============================================================================
// Fixture
// ============================================================================

pub struct Fixture {
    pub store: Arc<InMemoryPermissionStore>,
    pub members: Arc<InMemoryMembership>,
}

impl Fixture {
    /// Guild staff configuration with `PANEL` opting in or out of the
    /// default support team.
    pub fn new(with_default_team: bool) -> Self {
        init_tracing();

        let store = Arc::new(InMemoryPermissionStore::new());
        let members = Arc::new(InMemoryMembership::new());

        store.add_admin(GUILD, ADMIN);
        store.add_admin_role(GUILD, ADMIN_ROLE);
        store.add_support(GUILD, SUPPORT);
        store.add_support_role(GUILD, SUPPORT_ROLE);

        store.insert_panel(Panel {
            panel_id: PANEL,
            guild_id: GUILD,
            title: "Support".into(),
            with_default_team,
        });
        store.insert_panel(Panel {
            panel_id: FOREIGN_PANEL,
            guild_id: OTHER_GUILD,
            title: "Elsewhere".into(),
            with_default_team: false,
        });

        store.insert_team(SupportTeam {
            id: TEAM,
            guild_id: GUILD,
            name: "Billing".into(),
        });
        store.add_team_member(TEAM, TEAM_USER);
        store.add_team_role(TEAM, TEAM_ROLE);
        store.link_team_to_panel(TEAM, PANEL);
        store.link_team_to_panel(TEAM, FOREIGN_PANEL);

        for (user_id, roles) in [
            (ADMIN, vec![]),
            (SUPPORT, vec![]),
            (TEAM_USER, vec![]),
            (OUTSIDER, vec![UNRELATED_ROLE]),
            (OPENER, vec![]),
            (ADMIN_BY_ROLE, vec![ADMIN_ROLE]),
            (SUPPORT_BY_ROLE, vec![SUPPORT_ROLE]),
            (TEAM_BY_ROLE, vec![TEAM_ROLE, UNRELATED_ROLE]),
        ] {
            members.insert_member(GUILD, Member::new(user_id, roles));
        }
        members.insert_member(GUILD, Member::bot(STAFF_BOT, vec![ADMIN_ROLE]));

        Self { store, members }
    }

    pub fn resolver(&self) -> AccessResolver {
        self.resolver_with(AccessConfig::default_for_test())
    }

    pub fn resolver_with(&self, config: AccessConfig) -> AccessResolver {
        AccessResolver::new(self.store.clone(), self.members.clone(), config)
    }

    /// Unclaimed ticket in `GUILD`.
    pub fn ticket(&self, opener: UserId, panel_id: Option<PanelId>) -> Ticket {
        Ticket {
            id: TICKET,
            guild_id: GUILD,
            user_id: opener,
            panel_id,
            channel_id: Some(THREAD),
        }
    }
}

pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

pub fn as_set(ids: &[UserId]) -> HashSet<UserId> {
    ids.iter().copied().collect()
}

// ============================================================================
// Provider wrappers
// ============================================================================

/// Counts calls made against a permission store.
pub struct CountingStore {
    inner: Arc<dyn PermissionStore>,
    pub admin_calls: AtomicUsize,
    pub panel_calls: AtomicUsize,
    pub team_calls: AtomicUsize,
    pub total_calls: AtomicUsize,
}

impl CountingStore {
    pub fn new(inner: Arc<dyn PermissionStore>) -> Self {
        Self {
            inner,
            admin_calls: AtomicUsize::new(0),
            panel_calls: AtomicUsize::new(0),
            team_calls: AtomicUsize::new(0),
            total_calls: AtomicUsize::new(0),
        }
    }

    fn hit(&self, counter: Option<&AtomicUsize>) {
        self.total_calls.fetch_add(1, Ordering::SeqCst);
        if let Some(counter) = counter {
            counter.fetch_add(1, Ordering::SeqCst);
        }
    }

    pub fn count(counter: &AtomicUsize) -> usize {
        counter.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl PermissionStore for CountingStore {
    async fn get_admins(&self, guild_id: GuildId) -> Result<Vec<UserId>, StoreError> {
        self.hit(Some(&self.admin_calls));
        self.inner.get_admins(guild_id).await
    }

    async fn get_admin_roles(&self, guild_id: GuildId) -> Result<Vec<RoleId>, StoreError> {
        self.hit(Some(&self.admin_calls));
        self.inner.get_admin_roles(guild_id).await
    }

    async fn get_support(&self, guild_id: GuildId) -> Result<Vec<UserId>, StoreError> {
        self.hit(None);
        self.inner.get_support(guild_id).await
    }

    async fn get_support_roles(&self, guild_id: GuildId) -> Result<Vec<RoleId>, StoreError> {
        self.hit(None);
        self.inner.get_support_roles(guild_id).await
    }

    async fn get_panel(&self, panel_id: PanelId) -> Result<Option<Panel>, StoreError> {
        self.hit(Some(&self.panel_calls));
        self.inner.get_panel(panel_id).await
    }

    async fn get_team_users_for_panel(&self, panel_id: PanelId) -> Result<Vec<UserId>, StoreError> {
        self.hit(Some(&self.team_calls));
        self.inner.get_team_users_for_panel(panel_id).await
    }

    async fn get_team_roles_for_panel(&self, panel_id: PanelId) -> Result<Vec<RoleId>, StoreError> {
        self.hit(Some(&self.team_calls));
        self.inner.get_team_roles_for_panel(panel_id).await
    }

    async fn get_claim_owner(
        &self,
        guild_id: GuildId,
        ticket_id: TicketId,
    ) -> Result<Option<UserId>, StoreError> {
        self.hit(None);
        self.inner.get_claim_owner(guild_id, ticket_id).await
    }

    async fn get_teams_for_user(
        &self,
        guild_id: GuildId,
        user_id: UserId,
    ) -> Result<Vec<TeamId>, StoreError> {
        self.hit(None);
        self.inner.get_teams_for_user(guild_id, user_id).await
    }

    async fn get_teams_for_roles(
        &self,
        guild_id: GuildId,
        role_ids: &[RoleId],
    ) -> Result<Vec<TeamId>, StoreError> {
        self.hit(None);
        self.inner.get_teams_for_roles(guild_id, role_ids).await
    }
}

/// Permission store whose every call fails.
pub struct UnavailableStore;

#[async_trait]
impl PermissionStore for UnavailableStore {
    async fn get_admins(&self, _: GuildId) -> Result<Vec<UserId>, StoreError> {
        Err(StoreError::Unavailable("connection refused".into()))
    }

    async fn get_admin_roles(&self, _: GuildId) -> Result<Vec<RoleId>, StoreError> {
        Err(StoreError::Unavailable("connection refused".into()))
    }

    async fn get_support(&self, _: GuildId) -> Result<Vec<UserId>, StoreError> {
        Err(StoreError::Unavailable("connection refused".into()))
    }

    async fn get_support_roles(&self, _: GuildId) -> Result<Vec<RoleId>, StoreError> {
        Err(StoreError::Unavailable("connection refused".into()))
    }

    async fn get_panel(&self, _: PanelId) -> Result<Option<Panel>, StoreError> {
        Err(StoreError::Unavailable("connection refused".into()))
    }

    async fn get_team_users_for_panel(&self, _: PanelId) -> Result<Vec<UserId>, StoreError> {
        Err(StoreError::Unavailable("connection refused".into()))
    }

    async fn get_team_roles_for_panel(&self, _: PanelId) -> Result<Vec<RoleId>, StoreError> {
        Err(StoreError::Unavailable("connection refused".into()))
    }

    async fn get_claim_owner(&self, _: GuildId, _: TicketId) -> Result<Option<UserId>, StoreError> {
        Err(StoreError::Unavailable("connection refused".into()))
    }

    async fn get_teams_for_user(&self, _: GuildId, _: UserId) -> Result<Vec<TeamId>, StoreError> {
        Err(StoreError::Unavailable("connection refused".into()))
    }

    async fn get_teams_for_roles(
        &self,
        _: GuildId,
        _: &[RoleId],
    ) -> Result<Vec<TeamId>, StoreError> {
        Err(StoreError::Unavailable("connection refused".into()))
    }
}

/// Membership provider that fails for selected users and records how many
/// lookups are in flight at once.
pub struct InstrumentedMembership {
    inner: Arc<InMemoryMembership>,
    failing: HashSet<UserId>,
    delay: Duration,
    in_flight: AtomicUsize,
    pub max_in_flight: AtomicUsize,
    pub lookups: AtomicUsize,
}

impl InstrumentedMembership {
    pub fn new(inner: Arc<InMemoryMembership>) -> Self {
        Self {
            inner,
            failing: HashSet::new(),
            delay: Duration::ZERO,
            in_flight: AtomicUsize::new(0),
            max_in_flight: AtomicUsize::new(0),
            lookups: AtomicUsize::new(0),
        }
    }

    /// Lookups for `user_id` fail with a provider error.
    pub fn failing_for(mut self, user_id: UserId) -> Self {
        self.failing.insert(user_id);
        self
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }
}

#[async_trait]
impl MembershipProvider for InstrumentedMembership {
    async fn get_guild_member(
        &self,
        guild_id: GuildId,
        user_id: UserId,
    ) -> Result<Member, MembershipError> {
        self.lookups.fetch_add(1, Ordering::SeqCst);
        let current = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(current, Ordering::SeqCst);

        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }

        let result = if self.failing.contains(&user_id) {
            Err(MembershipError::Unavailable("502 Bad Gateway".into()))
        } else {
            self.inner.get_guild_member(guild_id, user_id).await
        };

        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        result
    }

    async fn list_thread_members(
        &self,
        thread_id: ChannelId,
    ) -> Result<Vec<ThreadMember>, MembershipError> {
        self.inner.list_thread_members(thread_id).await
    }
}
