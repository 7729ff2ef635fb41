// src/services/auth.rs

use bcrypt::{hash, verify};
use chrono::Utc;
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use sqlx::{Executor, Postgres};

use crate::{
    common::error::AppError,
    db::TeamRepository,
    models::{
        auth::{AuthResponse, Claims},
        team::TeamMember,
    },
};

/// bcrypt é lento de propósito: roda fora do runtime async.
pub async fn hash_password(password: &str) -> Result<String, AppError> {
    let password_clone = password.to_owned();
    let hashed = tokio::task::spawn_blocking(move || hash(&password_clone, bcrypt::DEFAULT_COST))
        .await
        .map_err(|e| anyhow::anyhow!("Falha na task de hashing: {}", e))??;
    Ok(hashed)
}

pub async fn verify_password(password: &str, password_hash: &str) -> Result<bool, AppError> {
    let password_clone = password.to_owned();
    let hash_clone = password_hash.to_owned();
    let is_valid = tokio::task::spawn_blocking(move || verify(&password_clone, &hash_clone))
        .await
        .map_err(|e| anyhow::anyhow!("Falha na task de verificação de senha: {}", e))??;
    Ok(is_valid)
}

#[derive(Clone)]
pub struct AuthService {
    team_repo: TeamRepository,
    jwt_secret: String,
    jwt_ttl_days: i64,
}

impl AuthService {
    pub fn new(team_repo: TeamRepository, jwt_secret: String, jwt_ttl_days: i64) -> Self {
        Self { team_repo, jwt_secret, jwt_ttl_days }
    }

    pub async fn login<'e, E>(&self, executor: E, email: &str, password: &str) -> Result<AuthResponse, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let member = self
            .team_repo
            .find_by_email(executor, email.trim())
            .await?
            .ok_or(AppError::InvalidCredentials)?;

        // Membro desativado não entra, mas não revelamos o motivo
        if !member.is_active {
            return Err(AppError::InvalidCredentials);
        }

        if !verify_password(password, &member.password_hash).await? {
            return Err(AppError::InvalidCredentials);
        }

        let token = self.create_token(&member)?;
        tracing::info!(member_id = %member.id, role = member.role.as_str(), "🔑 Login realizado");

        Ok(AuthResponse { token, member })
    }

    pub fn decode_token(&self, token: &str) -> Result<Claims, AppError> {
        let token_data = decode::<Claims>(
            token,
            &DecodingKey::from_secret(self.jwt_secret.as_ref()),
            &Validation::default(),
        )
        .map_err(|_| AppError::InvalidToken)?;
        Ok(token_data.claims)
    }

    pub async fn validate_token<'e, E>(&self, executor: E, token: &str) -> Result<TeamMember, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let claims = self.decode_token(token)?;

        let member = self
            .team_repo
            .find_by_id(executor, claims.sub)
            .await?
            .ok_or(AppError::InvalidToken)?;

        if !member.is_active {
            return Err(AppError::InvalidToken);
        }
        Ok(member)
    }

    pub fn create_token(&self, member: &TeamMember) -> Result<String, AppError> {
        let now = Utc::now();
        let expires_at = chrono::Duration::try_days(self.jwt_ttl_days)
            .and_then(|ttl| now.checked_add_signed(ttl))
            .ok_or_else(|| AppError::InternalServerError(anyhow::anyhow!("JWT_TTL_DAYS fora do intervalo")))?;

        let claims = Claims {
            sub: member.id,
            role: member.role.as_str().to_string(),
            exp: expires_at.timestamp() as usize,
            iat: now.timestamp() as usize,
        };

        Ok(encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(self.jwt_secret.as_ref()),
        )?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::team::Role;
    use uuid::Uuid;

    fn member() -> TeamMember {
        TeamMember {
            id: Uuid::new_v4(),
            full_name: "Ana Souza".to_string(),
            email: "ana@imobiliaria.com".to_string(),
            phone: None,
            role: Role::BuyerAgent,
            password_hash: String::new(),
            coin_balance: 0,
            is_active: true,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn token_round_trip_keeps_member_and_role() {
        let service = AuthService::new(TeamRepository::new(), "segredo".to_string(), 7);
        let m = member();

        let token = service.create_token(&m).unwrap();
        let claims = service.decode_token(&token).unwrap();

        assert_eq!(claims.sub, m.id);
        assert_eq!(claims.role, "buyer_agent");
        assert_eq!(claims.exp - claims.iat, 7 * 24 * 60 * 60);
    }

    #[test]
    fn token_signed_with_other_secret_is_rejected() {
        let issuer = AuthService::new(TeamRepository::new(), "segredo-a".to_string(), 7);
        let verifier = AuthService::new(TeamRepository::new(), "segredo-b".to_string(), 7);

        let token = issuer.create_token(&member()).unwrap();
        assert!(matches!(verifier.decode_token(&token), Err(AppError::InvalidToken)));
    }

    #[test]
    fn oversized_ttl_is_an_error_not_a_panic() {
        let service = AuthService::new(TeamRepository::new(), "segredo".to_string(), i64::MAX);
        assert!(matches!(
            service.create_token(&member()),
            Err(AppError::InternalServerError(_))
        ));
    }

    #[tokio::test]
    async fn password_hash_verifies() {
        let hashed = hash_password("segredo123").await.unwrap();
        assert!(verify_password("segredo123", &hashed).await.unwrap());
        assert!(!verify_password("outra", &hashed).await.unwrap());
    }
}
