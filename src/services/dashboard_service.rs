// src/services/dashboard_service.rs

use sqlx::{Acquire, PgConnection, Postgres};
use uuid::Uuid;

use crate::{
    common::{db_utils::found, error::AppError},
    db::{CoinRepository, DashboardRepository},
    models::{
        dashboard::{AdminDashboard, BuyerAgentDashboard, FieldAgentDashboard, ListingAgentDashboard, RoleDashboard},
        team::{Role, TeamMember},
    },
};

pub const DASHBOARD_LEADERBOARD_SIZE: i64 = 5;
pub const UPCOMING_VISITS_LIMIT: i64 = 10;

#[derive(Clone)]
pub struct DashboardService {
    repo: DashboardRepository,
    coin_repo: CoinRepository,
}

impl DashboardService {
    pub fn new(repo: DashboardRepository, coin_repo: CoinRepository) -> Self {
        Self { repo, coin_repo }
    }

    /// Monta o painel conforme o papel de quem chama.
    pub async fn for_member<'e, A>(&self, conn: A, member: &TeamMember) -> Result<RoleDashboard, AppError>
    where
        A: Acquire<'e, Database = Postgres>,
    {
        let mut conn = conn.acquire().await?;

        let dashboard = match member.role {
            Role::Admin => RoleDashboard::Admin(self.admin(&mut conn).await?),
            Role::BuyerAgent => RoleDashboard::BuyerAgent(self.buyer_agent(&mut conn, member.id).await?),
            Role::ListingAgent => RoleDashboard::ListingAgent(self.listing_agent(&mut conn, member.id).await?),
            Role::FieldAgent => RoleDashboard::FieldAgent(self.field_agent(&mut conn, member.id).await?),
        };
        Ok(dashboard)
    }

    async fn admin(&self, conn: &mut PgConnection) -> Result<AdminDashboard, AppError> {
        let leads_by_status = self.repo.lead_counts(&mut *conn, None).await?;
        let seller_leads_by_status = self.repo.seller_lead_counts(&mut *conn, None).await?;
        let listings_by_status = self.repo.listing_counts(&mut *conn, None).await?;
        let counters = self.repo.admin_counters(&mut *conn).await?;
        let leaderboard = self.coin_repo.leaderboard(&mut *conn, DASHBOARD_LEADERBOARD_SIZE).await?;

        Ok(AdminDashboard {
            leads_by_status,
            seller_leads_by_status,
            listings_by_status,
            visits_today: counters.visits_today,
            visits_completed_this_week: counters.visits_completed_this_week,
            open_offers: counters.open_offers,
            pending_approvals: counters.pending_approvals,
            leaderboard,
        })
    }

    async fn buyer_agent(&self, conn: &mut PgConnection, me: Uuid) -> Result<BuyerAgentDashboard, AppError> {
        Ok(BuyerAgentDashboard {
            my_leads_by_status: self.repo.lead_counts(&mut *conn, Some(me)).await?,
            upcoming_visits: self
                .repo
                .upcoming_visits_for_buyer_agent(&mut *conn, me, UPCOMING_VISITS_LIMIT)
                .await?,
            open_offers: self.repo.open_offers_for_buyer_agent(&mut *conn, me).await?,
            follow_ups_due_today: self.repo.follow_ups_due_today(&mut *conn, me).await?,
            coin_balance: self.balance(conn, me).await?,
        })
    }

    async fn listing_agent(&self, conn: &mut PgConnection, me: Uuid) -> Result<ListingAgentDashboard, AppError> {
        Ok(ListingAgentDashboard {
            my_listings_by_status: self.repo.listing_counts(&mut *conn, Some(me)).await?,
            my_seller_leads_by_status: self.repo.seller_lead_counts(&mut *conn, Some(me)).await?,
            open_offers_on_my_listings: self.repo.open_offers_on_listings_of(&mut *conn, me).await?,
            my_pending_approvals: self.repo.pending_approvals_of(&mut *conn, me).await?,
            coin_balance: self.balance(conn, me).await?,
        })
    }

    async fn field_agent(&self, conn: &mut PgConnection, me: Uuid) -> Result<FieldAgentDashboard, AppError> {
        Ok(FieldAgentDashboard {
            visits_today: self.repo.field_visits_today(&mut *conn, me).await?,
            upcoming_tours: self.repo.field_upcoming_tours(&mut *conn, me).await?,
            completed_this_week: self.repo.field_completed_this_week(&mut *conn, me).await?,
            coin_balance: self.balance(conn, me).await?,
        })
    }

    async fn balance(&self, conn: &mut PgConnection, me: Uuid) -> Result<i64, AppError> {
        found(self.coin_repo.balance(&mut *conn, me).await?, "member")
    }
}
