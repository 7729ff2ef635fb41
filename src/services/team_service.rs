// src/services/team_service.rs

use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    common::{
        db_utils::found,
        error::AppError,
        pagination::{PageParams, Paginated},
        validation::normalize_phone,
    },
    db::TeamRepository,
    models::team::{ChangePasswordPayload, CreateMemberPayload, Role, TeamFilter, TeamMember, UpdateMemberPayload},
    services::auth::{hash_password, verify_password},
};

#[derive(Clone)]
pub struct TeamService {
    repo: TeamRepository,
    pool: PgPool,
}

impl TeamService {
    pub fn new(repo: TeamRepository, pool: PgPool) -> Self {
        Self { repo, pool }
    }

    pub async fn create_member(&self, payload: &CreateMemberPayload) -> Result<TeamMember, AppError> {
        let password_hash = hash_password(&payload.password).await?;
        let phone = payload.phone.as_deref().map(normalize_phone);

        let member = self
            .repo
            .create(
                &self.pool,
                payload.full_name.trim(),
                payload.email.trim(),
                phone.as_deref(),
                payload.role,
                &password_hash,
            )
            .await?;

        tracing::info!(member_id = %member.id, role = member.role.as_str(), "Membro da equipe criado");
        Ok(member)
    }

    pub async fn list_members(&self, filter: &TeamFilter, page: &PageParams) -> Result<Paginated<TeamMember>, AppError> {
        let (members, total) = self.repo.list(&self.pool, filter, page).await?;
        Ok(Paginated::new(members, page, total))
    }

    pub async fn get_member(&self, id: Uuid) -> Result<TeamMember, AppError> {
        found(self.repo.find_by_id(&self.pool, id).await?, "member")
    }

    pub async fn update_member(&self, id: Uuid, payload: &UpdateMemberPayload) -> Result<TeamMember, AppError> {
        let phone = payload.phone.as_deref().map(normalize_phone);
        found(
            self.repo
                .update(
                    &self.pool,
                    id,
                    payload.full_name.as_deref().map(str::trim),
                    phone.as_deref(),
                    payload.role,
                    payload.is_active,
                )
                .await?,
            "member",
        )
    }

    pub async fn change_password(&self, member: &TeamMember, payload: &ChangePasswordPayload) -> Result<(), AppError> {
        if !verify_password(&payload.current_password, &member.password_hash).await? {
            return Err(AppError::InvalidCredentials);
        }

        let password_hash = hash_password(&payload.new_password).await?;
        self.repo.update_password(&self.pool, member.id, &password_hash).await?;

        tracing::info!(member_id = %member.id, "Senha alterada");
        Ok(())
    }

    /// Cria o primeiro administrador quando a equipe ainda não tem nenhum.
    pub async fn bootstrap_admin(&self, email: &str, password: &str) -> Result<Option<TeamMember>, AppError> {
        if self.repo.count_admins(&self.pool).await? > 0 {
            return Ok(None);
        }

        let password_hash = hash_password(password).await?;
        let admin = self
            .repo
            .create(&self.pool, "Administrador", email.trim(), None, Role::Admin, &password_hash)
            .await?;

        tracing::info!(member_id = %admin.id, "👤 Administrador inicial criado: {}", admin.email);
        Ok(Some(admin))
    }
}
