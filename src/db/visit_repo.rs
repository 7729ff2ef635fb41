// src/db/visit_repo.rs

use chrono::{DateTime, NaiveDate, Utc};
use sqlx::{Acquire, Executor, Postgres, QueryBuilder};
use uuid::Uuid;

use crate::{
    common::{error::AppError, pagination::PageParams},
    models::visit::{TourStatus, Visit, VisitCompletion, VisitFilter, VisitTour, VISIT_SLOT_MINUTES},
};

#[derive(Debug, Clone)]
pub struct NewVisit {
    pub lead_id: Uuid,
    pub listing_id: Uuid,
    pub field_agent_id: Option<Uuid>,
    pub buyer_agent_id: Option<Uuid>,
    pub tour_id: Option<Uuid>,
    pub scheduled_at: DateTime<Utc>,
}

#[derive(Clone, Default)]
pub struct VisitRepository;

impl VisitRepository {
    pub fn new() -> Self {
        Self
    }

    // =========================================================================
    //  VISITAS
    // =========================================================================

    pub async fn create<'e, E>(&self, executor: E, new: &NewVisit) -> Result<Visit, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let visit = sqlx::query_as::<_, Visit>(
            r#"
            INSERT INTO visits (lead_id, listing_id, field_agent_id, buyer_agent_id, tour_id, scheduled_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING *
            "#,
        )
        .bind(new.lead_id)
        .bind(new.listing_id)
        .bind(new.field_agent_id)
        .bind(new.buyer_agent_id)
        .bind(new.tour_id)
        .bind(new.scheduled_at)
        .fetch_one(executor)
        .await?;
        Ok(visit)
    }

    pub async fn find_by_id<'e, E>(&self, executor: E, id: Uuid) -> Result<Option<Visit>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let visit = sqlx::query_as::<_, Visit>("SELECT * FROM visits WHERE id = $1")
            .bind(id)
            .fetch_optional(executor)
            .await?;
        Ok(visit)
    }

    pub async fn list<'e, A>(
        &self,
        conn: A,
        filter: &VisitFilter,
        page: &PageParams,
    ) -> Result<(Vec<Visit>, i64), AppError>
    where
        A: Acquire<'e, Database = Postgres>,
    {
        let mut conn = conn.acquire().await?;

        let mut count = QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM visits WHERE TRUE");
        push_visit_filters(&mut count, filter);
        let total: i64 = count.build_query_scalar().fetch_one(&mut *conn).await?;

        let mut query = QueryBuilder::<Postgres>::new("SELECT * FROM visits WHERE TRUE");
        push_visit_filters(&mut query, filter);
        query
            .push(" ORDER BY scheduled_at ASC LIMIT ")
            .push_bind(page.limit())
            .push(" OFFSET ")
            .push_bind(page.offset());
        let visits = query.build_query_as::<Visit>().fetch_all(&mut *conn).await?;

        Ok((visits, total))
    }

    /// Serializa agendamentos do mesmo corretor até o fim da transação.
    pub async fn lock_agent_schedule<'e, E>(&self, executor: E, field_agent_id: Uuid) -> Result<(), AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query("SELECT pg_advisory_xact_lock(hashtext($1::text))")
            .bind(field_agent_id)
            .execute(executor)
            .await?;
        Ok(())
    }

    /// Horários das visitas ativas do corretor em volta de `scheduled_at` (janela fechada).
    pub async fn active_times_near<'e, E>(
        &self,
        executor: E,
        field_agent_id: Uuid,
        scheduled_at: DateTime<Utc>,
        exclude_visit: Option<Uuid>,
    ) -> Result<Vec<DateTime<Utc>>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let times = sqlx::query_scalar::<_, DateTime<Utc>>(
            r#"
            SELECT scheduled_at FROM visits
            WHERE field_agent_id = $1
              AND status <> 'cancelled'
              AND ($3::uuid IS NULL OR id <> $3)
              AND scheduled_at BETWEEN $2 - make_interval(mins => $4) AND $2 + make_interval(mins => $4)
            "#,
        )
        .bind(field_agent_id)
        .bind(scheduled_at)
        .bind(exclude_visit)
        .bind(VISIT_SLOT_MINUTES as i32)
        .fetch_all(executor)
        .await?;
        Ok(times)
    }

    pub async fn confirm<'e, E>(&self, executor: E, id: Uuid, otp_code: &str) -> Result<Option<Visit>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let visit = sqlx::query_as::<_, Visit>(
            r#"
            UPDATE visits SET
                status = 'confirmed',
                confirmed_at = NOW(),
                otp_code = $2,
                otp_generated_at = NOW(),
                updated_at = NOW()
            WHERE id = $1 AND status = 'pending'
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(otp_code)
        .fetch_optional(executor)
        .await?;
        Ok(visit)
    }

    /// Reemite o OTP de uma visita já confirmada.
    pub async fn refresh_otp<'e, E>(&self, executor: E, id: Uuid, otp_code: &str) -> Result<Option<Visit>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let visit = sqlx::query_as::<_, Visit>(
            r#"
            UPDATE visits SET otp_code = $2, otp_generated_at = NOW(), updated_at = NOW()
            WHERE id = $1 AND status = 'confirmed'
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(otp_code)
        .fetch_optional(executor)
        .await?;
        Ok(visit)
    }

    /// Novo horário: a visita volta para `pending` e o OTP é descartado.
    pub async fn reschedule<'e, E>(
        &self,
        executor: E,
        id: Uuid,
        scheduled_at: DateTime<Utc>,
        field_agent_id: Option<Uuid>,
    ) -> Result<Option<Visit>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let visit = sqlx::query_as::<_, Visit>(
            r#"
            UPDATE visits SET
                scheduled_at = $2,
                field_agent_id = COALESCE($3, field_agent_id),
                status = 'pending',
                confirmed_at = NULL,
                otp_code = NULL,
                otp_generated_at = NULL,
                updated_at = NOW()
            WHERE id = $1 AND status IN ('pending', 'confirmed')
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(scheduled_at)
        .bind(field_agent_id)
        .fetch_optional(executor)
        .await?;
        Ok(visit)
    }

    pub async fn cancel<'e, E>(&self, executor: E, id: Uuid, reason: &str) -> Result<Option<Visit>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let visit = sqlx::query_as::<_, Visit>(
            r#"
            UPDATE visits SET
                status = 'cancelled',
                cancelled_at = NOW(),
                cancel_reason = $2,
                otp_code = NULL,
                updated_at = NOW()
            WHERE id = $1 AND status IN ('pending', 'confirmed')
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(reason)
        .fetch_optional(executor)
        .await?;
        Ok(visit)
    }

    /// Só conclui se ainda estiver `confirmed`; `None` = outra requisição chegou antes.
    pub async fn complete<'e, E>(
        &self,
        executor: E,
        id: Uuid,
        completion: &VisitCompletion,
    ) -> Result<Option<Visit>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let visit = sqlx::query_as::<_, Visit>(
            r#"
            UPDATE visits SET
                status = 'completed',
                completed_at = NOW(),
                completion_latitude = $2,
                completion_longitude = $3,
                feedback = $4,
                rating = $5,
                interest_level = $6,
                otp_code = NULL,
                updated_at = NOW()
            WHERE id = $1 AND status = 'confirmed'
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(completion.latitude)
        .bind(completion.longitude)
        .bind(completion.feedback.as_deref())
        .bind(completion.rating)
        .bind(completion.interest_level)
        .fetch_optional(executor)
        .await?;
        Ok(visit)
    }

    pub async fn attach_to_tour<'e, E>(&self, executor: E, visit_id: Uuid, tour_id: Option<Uuid>) -> Result<Option<Visit>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let visit = sqlx::query_as::<_, Visit>(
            "UPDATE visits SET tour_id = $2, updated_at = NOW() WHERE id = $1 RETURNING *",
        )
        .bind(visit_id)
        .bind(tour_id)
        .fetch_optional(executor)
        .await?;
        Ok(visit)
    }

    pub async fn list_by_tour<'e, E>(&self, executor: E, tour_id: Uuid) -> Result<Vec<Visit>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let visits = sqlx::query_as::<_, Visit>(
            "SELECT * FROM visits WHERE tour_id = $1 ORDER BY scheduled_at ASC",
        )
        .bind(tour_id)
        .fetch_all(executor)
        .await?;
        Ok(visits)
    }

    // =========================================================================
    //  ROTEIROS
    // =========================================================================

    pub async fn create_tour<'e, E>(
        &self,
        executor: E,
        lead_id: Uuid,
        field_agent_id: Uuid,
        tour_date: NaiveDate,
        notes: Option<&str>,
    ) -> Result<VisitTour, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let tour = sqlx::query_as::<_, VisitTour>(
            r#"
            INSERT INTO visit_tours (lead_id, field_agent_id, tour_date, notes)
            VALUES ($1, $2, $3, $4)
            RETURNING *
            "#,
        )
        .bind(lead_id)
        .bind(field_agent_id)
        .bind(tour_date)
        .bind(notes)
        .fetch_one(executor)
        .await?;
        Ok(tour)
    }

    pub async fn find_tour<'e, E>(&self, executor: E, id: Uuid) -> Result<Option<VisitTour>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let tour = sqlx::query_as::<_, VisitTour>("SELECT * FROM visit_tours WHERE id = $1")
            .bind(id)
            .fetch_optional(executor)
            .await?;
        Ok(tour)
    }

    pub async fn list_tours<'e, E>(
        &self,
        executor: E,
        field_agent_id: Option<Uuid>,
        from_date: Option<NaiveDate>,
    ) -> Result<Vec<VisitTour>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let tours = sqlx::query_as::<_, VisitTour>(
            r#"
            SELECT * FROM visit_tours
            WHERE ($1::uuid IS NULL OR field_agent_id = $1)
              AND ($2::date IS NULL OR tour_date >= $2)
            ORDER BY tour_date ASC, created_at ASC
            "#,
        )
        .bind(field_agent_id)
        .bind(from_date)
        .fetch_all(executor)
        .await?;
        Ok(tours)
    }

    pub async fn set_tour_status<'e, E>(
        &self,
        executor: E,
        id: Uuid,
        from: TourStatus,
        to: TourStatus,
    ) -> Result<Option<VisitTour>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let tour = sqlx::query_as::<_, VisitTour>(
            r#"
            UPDATE visit_tours SET status = $3, updated_at = NOW()
            WHERE id = $1 AND status = $2
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(from)
        .bind(to)
        .fetch_optional(executor)
        .await?;
        Ok(tour)
    }
}

fn push_visit_filters(qb: &mut QueryBuilder<'_, Postgres>, filter: &VisitFilter) {
    if let Some(status) = filter.status {
        qb.push(" AND status = ").push_bind(status);
    }
    if let Some(lead_id) = filter.lead_id {
        qb.push(" AND lead_id = ").push_bind(lead_id);
    }
    if let Some(listing_id) = filter.listing_id {
        qb.push(" AND listing_id = ").push_bind(listing_id);
    }
    if let Some(agent) = filter.field_agent_id {
        qb.push(" AND field_agent_id = ").push_bind(agent);
    }
    if let Some(agent) = filter.buyer_agent_id {
        qb.push(" AND buyer_agent_id = ").push_bind(agent);
    }
    if let Some(from) = filter.from {
        qb.push(" AND scheduled_at >= ").push_bind(from);
    }
    if let Some(to) = filter.to {
        qb.push(" AND scheduled_at < ").push_bind(to);
    }
}
