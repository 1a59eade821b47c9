//! `PostgreSQL` permission store.
//!
//! Read-only queries over the staff configuration tables written by the
//! dashboard. Snowflakes are stored as `BIGINT` and reinterpreted as `u64`.

use std::time::Duration;

use async_trait::async_trait;
use sqlx::postgres::{PgPool, PgPoolOptions};
use tk_common::{GuildId, Panel, PanelId, RoleId, TeamId, TicketId, UserId};

use super::error::StoreError;
use super::store::PermissionStore;
use crate::config::AccessConfig;

const fn to_db(id: u64) -> i64 {
    id as i64
}

const fn from_db(id: i64) -> u64 {
    id as u64
}

/// Permission store backed by the tickets database.
#[derive(Debug, Clone)]
pub struct PgPermissionStore {
    pool: PgPool,
}

impl PgPermissionStore {
    /// Connect with a pool sized for access checks.
    pub async fn connect(database_url: &str) -> Result<Self, StoreError> {
        let pool = PgPoolOptions::new()
            .max_connections(20)
            .acquire_timeout(Duration::from_secs(3))
            .connect(database_url)
            .await?;

        Ok(Self { pool })
    }

    /// Connect to the database named by `AccessConfig::database_url`.
    pub async fn from_config(config: &AccessConfig) -> Result<Self, StoreError> {
        let database_url = config
            .database_url
            .as_deref()
            .ok_or(StoreError::NotConfigured("DATABASE_URL"))?;

        Self::connect(database_url).await
    }

    pub const fn from_pool(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Create the staff configuration tables if missing.
    pub async fn run_migrations(&self) -> Result<(), StoreError> {
        sqlx::migrate!("./migrations").run(&self.pool).await?;
        Ok(())
    }

    pub const fn pool(&self) -> &PgPool {
        &self.pool
    }

    async fn user_ids(&self, sql: &str, id: i64) -> Result<Vec<UserId>, StoreError> {
        let rows: Vec<i64> = sqlx::query_scalar(sql)
            .bind(id)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows.into_iter().map(|id| UserId(from_db(id))).collect())
    }

    async fn role_ids(&self, sql: &str, id: i64) -> Result<Vec<RoleId>, StoreError> {
        let rows: Vec<i64> = sqlx::query_scalar(sql)
            .bind(id)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows.into_iter().map(|id| RoleId(from_db(id))).collect())
    }
}

#[async_trait]
impl PermissionStore for PgPermissionStore {
    #[tracing::instrument(skip(self))]
    async fn get_admins(&self, guild_id: GuildId) -> Result<Vec<UserId>, StoreError> {
        self.user_ids(
            "SELECT user_id FROM permissions WHERE guild_id = $1 AND admin = true",
            to_db(guild_id.get()),
        )
        .await
    }

    #[tracing::instrument(skip(self))]
    async fn get_admin_roles(&self, guild_id: GuildId) -> Result<Vec<RoleId>, StoreError> {
        self.role_ids(
            "SELECT role_id FROM role_permissions WHERE guild_id = $1 AND admin = true",
            to_db(guild_id.get()),
        )
        .await
    }

    #[tracing::instrument(skip(self))]
    async fn get_support(&self, guild_id: GuildId) -> Result<Vec<UserId>, StoreError> {
        self.user_ids(
            r"
            SELECT user_id
            FROM permissions
            WHERE guild_id = $1 AND (support = true OR admin = true)
            ",
            to_db(guild_id.get()),
        )
        .await
    }

    #[tracing::instrument(skip(self))]
    async fn get_support_roles(&self, guild_id: GuildId) -> Result<Vec<RoleId>, StoreError> {
        self.role_ids(
            r"
            SELECT role_id
            FROM role_permissions
            WHERE guild_id = $1 AND (support = true OR admin = true)
            ",
            to_db(guild_id.get()),
        )
        .await
    }

    #[tracing::instrument(skip(self))]
    async fn get_panel(&self, panel_id: PanelId) -> Result<Option<Panel>, StoreError> {
        let row: Option<(i32, i64, String, bool)> = sqlx::query_as(
            r"
            SELECT panel_id, guild_id, title, with_default_team
            FROM panels
            WHERE panel_id = $1
            ",
        )
        .bind(panel_id.get())
        .fetch_optional(&self.pool)
        .await?;

        let Some((panel_id, guild_id, title, with_default_team)) = row else {
            return Ok(None);
        };

        Ok(Some(Panel {
            panel_id: PanelId(panel_id),
            guild_id: GuildId(from_db(guild_id)),
            title,
            with_default_team,
        }))
    }

    #[tracing::instrument(skip(self))]
    async fn get_team_users_for_panel(&self, panel_id: PanelId) -> Result<Vec<UserId>, StoreError> {
        self.user_ids(
            r"
            SELECT DISTINCT m.user_id
            FROM support_team_members m
            INNER JOIN panel_teams p ON p.team_id = m.team_id
            WHERE p.panel_id = $1
            ",
            i64::from(panel_id.get()),
        )
        .await
    }

    #[tracing::instrument(skip(self))]
    async fn get_team_roles_for_panel(&self, panel_id: PanelId) -> Result<Vec<RoleId>, StoreError> {
        self.role_ids(
            r"
            SELECT DISTINCT r.role_id
            FROM support_team_roles r
            INNER JOIN panel_teams p ON p.team_id = r.team_id
            WHERE p.panel_id = $1
            ",
            i64::from(panel_id.get()),
        )
        .await
    }

    #[tracing::instrument(skip(self))]
    async fn get_claim_owner(
        &self,
        guild_id: GuildId,
        ticket_id: TicketId,
    ) -> Result<Option<UserId>, StoreError> {
        let claimer: Option<i64> = sqlx::query_scalar(
            "SELECT user_id FROM ticket_claims WHERE guild_id = $1 AND ticket_id = $2",
        )
        .bind(to_db(guild_id.get()))
        .bind(ticket_id.get())
        .fetch_optional(&self.pool)
        .await?;

        Ok(claimer.map(|id| UserId(from_db(id))))
    }

    #[tracing::instrument(skip(self))]
    async fn get_teams_for_user(
        &self,
        guild_id: GuildId,
        user_id: UserId,
    ) -> Result<Vec<TeamId>, StoreError> {
        let rows: Vec<i32> = sqlx::query_scalar(
            r"
            SELECT t.id
            FROM support_team t
            INNER JOIN support_team_members m ON m.team_id = t.id
            WHERE t.guild_id = $1 AND m.user_id = $2
            ",
        )
        .bind(to_db(guild_id.get()))
        .bind(to_db(user_id.get()))
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(TeamId).collect())
    }

    #[tracing::instrument(skip(self))]
    async fn get_teams_for_roles(
        &self,
        guild_id: GuildId,
        role_ids: &[RoleId],
    ) -> Result<Vec<TeamId>, StoreError> {
        let role_ids: Vec<i64> = role_ids.iter().map(|id| to_db(id.get())).collect();

        let rows: Vec<i32> = sqlx::query_scalar(
            r"
            SELECT DISTINCT t.id
            FROM support_team t
            INNER JOIN support_team_roles r ON r.team_id = t.id
            WHERE t.guild_id = $1 AND r.role_id = ANY($2)
            ",
        )
        .bind(to_db(guild_id.get()))
        .bind(role_ids)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(TeamId).collect())
    }
}
