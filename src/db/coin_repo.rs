// src/db/coin_repo.rs

use sqlx::{Acquire, Executor, Postgres};
use uuid::Uuid;

use crate::{
    common::{
        db_utils::{check_violation_as, unique_violation_as},
        error::AppError,
        pagination::PageParams,
    },
    models::{
        activity::EntityKind,
        coins::{CreditLedgerEntry, CreditRule, LeaderboardEntry},
    },
};

#[derive(Debug, Clone)]
pub struct NewLedgerEntry<'a> {
    pub member_id: Uuid,
    pub rule_key: Option<&'a str>,
    pub amount: i32,
    pub reason: &'a str,
    pub reference_type: Option<EntityKind>,
    pub reference_id: Option<Uuid>,
    pub balance_after: i64,
    pub created_by: Option<Uuid>,
}

#[derive(Clone, Default)]
pub struct CoinRepository;

impl CoinRepository {
    pub fn new() -> Self {
        Self
    }

    // =========================================================================
    //  REGRAS
    // =========================================================================

    pub async fn find_active_rule<'e, E>(&self, executor: E, key: &str) -> Result<Option<CreditRule>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let rule = sqlx::query_as::<_, CreditRule>(
            "SELECT * FROM credit_rules WHERE key = $1 AND is_active",
        )
        .bind(key)
        .fetch_optional(executor)
        .await?;
        Ok(rule)
    }

    pub async fn list_rules<'e, E>(&self, executor: E) -> Result<Vec<CreditRule>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let rules = sqlx::query_as::<_, CreditRule>("SELECT * FROM credit_rules ORDER BY key")
            .fetch_all(executor)
            .await?;
        Ok(rules)
    }

    pub async fn upsert_rule<'e, E>(
        &self,
        executor: E,
        key: &str,
        description: &str,
        coins: i32,
        is_active: bool,
    ) -> Result<CreditRule, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let rule = sqlx::query_as::<_, CreditRule>(
            r#"
            INSERT INTO credit_rules (key, description, coins, is_active)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (key) DO UPDATE SET
                description = EXCLUDED.description,
                coins = EXCLUDED.coins,
                is_active = EXCLUDED.is_active,
                updated_at = NOW()
            RETURNING *
            "#,
        )
        .bind(key)
        .bind(description)
        .bind(coins)
        .bind(is_active)
        .fetch_one(executor)
        .await?;
        Ok(rule)
    }

    // =========================================================================
    //  SALDO E EXTRATO
    // =========================================================================

    /// Soma atômica no saldo em cache. `None` se o membro não existe.
    /// Saldo negativo viola o CHECK da tabela e vira erro de validação.
    pub async fn add_to_balance<'e, E>(&self, executor: E, member_id: Uuid, amount: i32) -> Result<Option<i64>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query_scalar::<_, i64>(
            r#"
            UPDATE team_members SET coin_balance = coin_balance + $2, updated_at = NOW()
            WHERE id = $1
            RETURNING coin_balance
            "#,
        )
        .bind(member_id)
        .bind(i64::from(amount))
        .fetch_optional(executor)
        .await
        .map_err(check_violation_as("amount", "negative_balance"))
    }

    pub async fn insert_entry<'e, E>(&self, executor: E, entry: &NewLedgerEntry<'_>) -> Result<CreditLedgerEntry, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query_as::<_, CreditLedgerEntry>(
            r#"
            INSERT INTO credit_ledger (
                member_id, rule_key, amount, reason, reference_type, reference_id,
                balance_after, created_by
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING *
            "#,
        )
        .bind(entry.member_id)
        .bind(entry.rule_key)
        .bind(entry.amount)
        .bind(entry.reason)
        .bind(entry.reference_type)
        .bind(entry.reference_id)
        .bind(entry.balance_after)
        .bind(entry.created_by)
        .fetch_one(executor)
        .await
        .map_err(unique_violation_as("credit_already_awarded"))
    }

    pub async fn list_ledger<'e, A>(
        &self,
        conn: A,
        member_id: Uuid,
        page: &PageParams,
    ) -> Result<(Vec<CreditLedgerEntry>, i64), AppError>
    where
        A: Acquire<'e, Database = Postgres>,
    {
        let mut conn = conn.acquire().await?;

        let total = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM credit_ledger WHERE member_id = $1")
            .bind(member_id)
            .fetch_one(&mut *conn)
            .await?;

        let entries = sqlx::query_as::<_, CreditLedgerEntry>(
            r#"
            SELECT * FROM credit_ledger
            WHERE member_id = $1
            ORDER BY created_at DESC
            LIMIT $2 OFFSET $3
            "#,
        )
        .bind(member_id)
        .bind(page.limit())
        .bind(page.offset())
        .fetch_all(&mut *conn)
        .await?;

        Ok((entries, total))
    }

    pub async fn balance<'e, E>(&self, executor: E, member_id: Uuid) -> Result<Option<i64>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let balance = sqlx::query_scalar::<_, i64>("SELECT coin_balance FROM team_members WHERE id = $1")
            .bind(member_id)
            .fetch_optional(executor)
            .await?;
        Ok(balance)
    }

    pub async fn leaderboard<'e, E>(&self, executor: E, limit: i64) -> Result<Vec<LeaderboardEntry>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let entries = sqlx::query_as::<_, LeaderboardEntry>(
            r#"
            SELECT id AS member_id, full_name, role, coin_balance
            FROM team_members
            WHERE is_active
            ORDER BY coin_balance DESC, full_name ASC
            LIMIT $1
            "#,
        )
        .bind(limit)
        .fetch_all(executor)
        .await?;
        Ok(entries)
    }
}
