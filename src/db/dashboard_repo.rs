// src/db/dashboard_repo.rs

use sqlx::{Acquire, Executor, Postgres};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::{
        dashboard::StatusCount,
        lead::LeadSummary,
        offer::Offer,
        visit::{Visit, VisitTour},
    },
};

/// Contadores do painel do administrador
#[derive(Debug, Clone, Default)]
pub struct AdminCounters {
    pub visits_today: i64,
    pub visits_completed_this_week: i64,
    pub open_offers: i64,
    pub pending_approvals: i64,
}

#[derive(Clone, Default)]
pub struct DashboardRepository;

impl DashboardRepository {
    pub fn new() -> Self {
        Self
    }

    // =========================================================================
    //  CONTAGENS POR STATUS (member = None -> imobiliária inteira)
    // =========================================================================

    pub async fn lead_counts<'e, E>(&self, executor: E, member: Option<Uuid>) -> Result<Vec<StatusCount>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let rows = sqlx::query_as::<_, StatusCount>(
            r#"
            SELECT status::text AS status, COUNT(*) AS count
            FROM leads
            WHERE deleted_at IS NULL AND ($1::uuid IS NULL OR assigned_to = $1)
            GROUP BY status
            ORDER BY status
            "#,
        )
        .bind(member)
        .fetch_all(executor)
        .await?;
        Ok(rows)
    }

    pub async fn seller_lead_counts<'e, E>(&self, executor: E, member: Option<Uuid>) -> Result<Vec<StatusCount>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let rows = sqlx::query_as::<_, StatusCount>(
            r#"
            SELECT status::text AS status, COUNT(*) AS count
            FROM seller_leads
            WHERE deleted_at IS NULL AND ($1::uuid IS NULL OR assigned_to = $1)
            GROUP BY status
            ORDER BY status
            "#,
        )
        .bind(member)
        .fetch_all(executor)
        .await?;
        Ok(rows)
    }

    pub async fn listing_counts<'e, E>(&self, executor: E, agent: Option<Uuid>) -> Result<Vec<StatusCount>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let rows = sqlx::query_as::<_, StatusCount>(
            r#"
            SELECT status::text AS status, COUNT(*) AS count
            FROM listings
            WHERE deleted_at IS NULL AND ($1::uuid IS NULL OR listing_agent_id = $1)
            GROUP BY status
            ORDER BY status
            "#,
        )
        .bind(agent)
        .fetch_all(executor)
        .await?;
        Ok(rows)
    }

    // =========================================================================
    //  ADMINISTRADOR
    // =========================================================================

    pub async fn admin_counters<'e, A>(&self, conn: A) -> Result<AdminCounters, AppError>
    where
        A: Acquire<'e, Database = Postgres>,
    {
        // Snapshot consistente dos contadores
        let mut tx = conn.begin().await?;

        let visits_today = sqlx::query_scalar::<_, i64>(
            r#"
            SELECT COUNT(*) FROM visits
            WHERE scheduled_at::date = CURRENT_DATE AND status IN ('pending', 'confirmed')
            "#,
        )
        .fetch_one(&mut *tx)
        .await?;

        let visits_completed_this_week = sqlx::query_scalar::<_, i64>(
            r#"
            SELECT COUNT(*) FROM visits
            WHERE status = 'completed' AND completed_at >= date_trunc('week', NOW())
            "#,
        )
        .fetch_one(&mut *tx)
        .await?;

        let open_offers = sqlx::query_scalar::<_, i64>(
            r#"
            SELECT COUNT(*) FROM offers
            WHERE status IN ('submitted', 'countered')
              AND (expires_at IS NULL OR expires_at > NOW())
            "#,
        )
        .fetch_one(&mut *tx)
        .await?;

        let pending_approvals = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM listings WHERE status = 'pending_approval' AND deleted_at IS NULL",
        )
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok(AdminCounters {
            visits_today,
            visits_completed_this_week,
            open_offers,
            pending_approvals,
        })
    }

    // =========================================================================
    //  CORRETOR DE COMPRADORES
    // =========================================================================

    pub async fn upcoming_visits_for_buyer_agent<'e, E>(&self, executor: E, agent: Uuid, limit: i64) -> Result<Vec<Visit>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let visits = sqlx::query_as::<_, Visit>(
            r#"
            SELECT * FROM visits
            WHERE buyer_agent_id = $1
              AND status IN ('pending', 'confirmed')
              AND scheduled_at >= NOW()
            ORDER BY scheduled_at ASC
            LIMIT $2
            "#,
        )
        .bind(agent)
        .bind(limit)
        .fetch_all(executor)
        .await?;
        Ok(visits)
    }

    pub async fn open_offers_for_buyer_agent<'e, E>(&self, executor: E, agent: Uuid) -> Result<Vec<Offer>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let offers = sqlx::query_as::<_, Offer>(
            r#"
            SELECT * FROM offers
            WHERE buyer_agent_id = $1 AND status IN ('submitted', 'countered')
              AND (expires_at IS NULL OR expires_at > NOW())
            ORDER BY created_at DESC
            "#,
        )
        .bind(agent)
        .fetch_all(executor)
        .await?;
        Ok(offers)
    }

    pub async fn follow_ups_due_today<'e, E>(&self, executor: E, agent: Uuid) -> Result<Vec<LeadSummary>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let leads = sqlx::query_as::<_, LeadSummary>(
            r#"
            SELECT l.*, c.full_name AS contact_name, c.phone AS contact_phone
            FROM leads l
            JOIN contacts c ON c.id = l.contact_id
            WHERE l.deleted_at IS NULL
              AND l.assigned_to = $1
              AND l.status NOT IN ('won', 'lost')
              AND l.next_follow_up_at < (CURRENT_DATE + 1)
            ORDER BY l.next_follow_up_at ASC
            "#,
        )
        .bind(agent)
        .fetch_all(executor)
        .await?;
        Ok(leads)
    }

    // =========================================================================
    //  CAPTADOR
    // =========================================================================

    pub async fn open_offers_on_listings_of<'e, E>(&self, executor: E, agent: Uuid) -> Result<Vec<Offer>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let offers = sqlx::query_as::<_, Offer>(
            r#"
            SELECT o.* FROM offers o
            JOIN listings l ON l.id = o.listing_id
            WHERE l.listing_agent_id = $1 AND o.status IN ('submitted', 'countered')
              AND (o.expires_at IS NULL OR o.expires_at > NOW())
            ORDER BY o.created_at DESC
            "#,
        )
        .bind(agent)
        .fetch_all(executor)
        .await?;
        Ok(offers)
    }

    pub async fn pending_approvals_of<'e, E>(&self, executor: E, agent: Uuid) -> Result<i64, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let count = sqlx::query_scalar::<_, i64>(
            r#"
            SELECT COUNT(*) FROM listings
            WHERE listing_agent_id = $1 AND status = 'pending_approval' AND deleted_at IS NULL
            "#,
        )
        .bind(agent)
        .fetch_one(executor)
        .await?;
        Ok(count)
    }

    // =========================================================================
    //  CORRETOR DE CAMPO
    // =========================================================================

    pub async fn field_visits_today<'e, E>(&self, executor: E, agent: Uuid) -> Result<Vec<Visit>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let visits = sqlx::query_as::<_, Visit>(
            r#"
            SELECT * FROM visits
            WHERE field_agent_id = $1
              AND scheduled_at::date = CURRENT_DATE
              AND status <> 'cancelled'
            ORDER BY scheduled_at ASC
            "#,
        )
        .bind(agent)
        .fetch_all(executor)
        .await?;
        Ok(visits)
    }

    pub async fn field_upcoming_tours<'e, E>(&self, executor: E, agent: Uuid) -> Result<Vec<VisitTour>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let tours = sqlx::query_as::<_, VisitTour>(
            r#"
            SELECT * FROM visit_tours
            WHERE field_agent_id = $1
              AND tour_date >= CURRENT_DATE
              AND status IN ('planned', 'in_progress')
            ORDER BY tour_date ASC
            "#,
        )
        .bind(agent)
        .fetch_all(executor)
        .await?;
        Ok(tours)
    }

    pub async fn field_completed_this_week<'e, E>(&self, executor: E, agent: Uuid) -> Result<i64, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let count = sqlx::query_scalar::<_, i64>(
            r#"
            SELECT COUNT(*) FROM visits
            WHERE field_agent_id = $1
              AND status = 'completed'
              AND completed_at >= date_trunc('week', NOW())
            "#,
        )
        .bind(agent)
        .fetch_one(executor)
        .await?;
        Ok(count)
    }
}
