// src/middleware/rbac.rs

use std::marker::PhantomData;

use axum::{
    extract::{FromRef, FromRequestParts},
    http::request::Parts,
};
use serde::Serialize;
use utoipa::ToSchema;

use crate::{
    common::error::{ApiError, AppError},
    config::AppState,
    middleware::{auth::AuthenticatedUser, i18n::Locale},
    models::team::Role,
};

/// O Trait que define uma permissão e os papéis que a possuem.
/// Admin sempre passa.
pub trait PermissionDef: Send + Sync + 'static {
    const SLUG: &'static str;
    const ROLES: &'static [Role];
}

pub fn role_allows(role: Role, allowed: &[Role]) -> bool {
    role.is_admin() || allowed.contains(&role)
}

/// Guardião usado como extractor nos handlers: `_guard: RequirePermission<PermLeadsWrite>`
pub struct RequirePermission<T>(pub PhantomData<T>);

impl<T, S> FromRequestParts<S> for RequirePermission<T>
where
    T: PermissionDef,
    S: Send + Sync,
    AppState: FromRef<S>,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let app_state = AppState::from_ref(state);
        let locale = Locale::from_headers(&parts.headers);

        let user = parts
            .extensions
            .get::<AuthenticatedUser>()
            .ok_or_else(|| AppError::InvalidToken.to_api_error(&locale, &app_state.i18n_store))?;

        if !role_allows(user.0.role, T::ROLES) {
            tracing::warn!(
                member_id = %user.0.id,
                role = user.0.role.as_str(),
                permission = T::SLUG,
                "Acesso negado"
            );
            return Err(AppError::Forbidden(T::SLUG).to_api_error(&locale, &app_state.i18n_store));
        }

        Ok(RequirePermission(PhantomData))
    }
}

// ---
// Catálogo de permissões (GET /api/v1/permissions)
// ---

/// Registro estático de cada permissão declarada com `permission!`.
pub struct PermissionInfo {
    pub slug: &'static str,
    pub description: &'static str,
    pub roles: &'static [Role],
}

inventory::collect!(PermissionInfo);

#[derive(Debug, Serialize, ToSchema)]
pub struct PermissionEntry {
    #[schema(example = "leads:write")]
    pub slug: String,
    pub description: String,
    pub roles: Vec<Role>,
}

/// Todas as permissões registradas, ordenadas pelo slug.
pub fn registered_permissions() -> Vec<PermissionEntry> {
    let mut entries: Vec<PermissionEntry> = inventory::iter::<PermissionInfo>
        .into_iter()
        .map(|p| PermissionEntry {
            slug: p.slug.to_string(),
            description: p.description.to_string(),
            roles: p.roles.to_vec(),
        })
        .collect();
    entries.sort_by(|a, b| a.slug.cmp(&b.slug));
    entries
}

macro_rules! permission {
    ($name:ident, $slug:literal, $description:literal, [$($role:ident),* $(,)?]) => {
        pub struct $name;

        impl PermissionDef for $name {
            const SLUG: &'static str = $slug;
            const ROLES: &'static [Role] = &[$(Role::$role),*];
        }

        inventory::submit! {
            PermissionInfo {
                slug: $slug,
                description: $description,
                roles: &[$(Role::$role),*],
            }
        }
    };
}

// ---
// DEFINIÇÃO DAS PERMISSÕES (TIPOS)
// ---

permission!(PermTeamManage, "team:manage", "Cadastrar e editar membros da equipe", [Admin]);
permission!(PermContactsWrite, "contacts:write", "Cadastrar e editar contatos", [BuyerAgent, ListingAgent]);
permission!(PermLeadsWrite, "leads:write", "Criar e movimentar leads de compradores", [BuyerAgent]);
permission!(PermLeadsAssign, "leads:assign", "Distribuir leads entre corretores", [Admin]);
permission!(PermSellerLeadsWrite, "seller_leads:write", "Criar e converter captações", [ListingAgent]);
permission!(PermPropertiesWrite, "properties:write", "Cadastrar empreendimentos e unidades", [ListingAgent]);
permission!(PermListingsWrite, "listings:write", "Criar anúncios e gerenciar mídias", [ListingAgent]);
permission!(PermListingsApprove, "listings:approve", "Aprovar ou recusar anúncios no catálogo", [Admin]);
permission!(PermVisitsSchedule, "visits:schedule", "Agendar, confirmar e cancelar visitas", [BuyerAgent, FieldAgent]);
permission!(PermVisitsComplete, "visits:complete", "Concluir visitas com OTP", [FieldAgent]);
permission!(PermToursManage, "tours:manage", "Montar roteiros de visitas", [BuyerAgent, FieldAgent]);
permission!(PermOffersWrite, "offers:write", "Registrar e revisar propostas", [BuyerAgent]);
permission!(PermOffersRespond, "offers:respond", "Aceitar, recusar ou contrapropor", [ListingAgent]);
permission!(PermCoinsManage, "coins:manage", "Ajustar saldos e regras de moedas", [Admin]);
permission!(PermAutomationsManage, "automations:manage", "Gerenciar regras de automação", [Admin]);
permission!(PermNotesModerate, "notes:moderate", "Editar ou remover notas de outros membros", [Admin]);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn admin_passes_every_permission() {
        assert!(role_allows(Role::Admin, PermVisitsComplete::ROLES));
        assert!(role_allows(Role::Admin, &[]));
    }

    #[test]
    fn agents_are_limited_to_their_roles() {
        assert!(role_allows(Role::FieldAgent, PermVisitsComplete::ROLES));
        assert!(!role_allows(Role::BuyerAgent, PermVisitsComplete::ROLES));
        assert!(!role_allows(Role::ListingAgent, PermListingsApprove::ROLES));
        assert!(role_allows(Role::ListingAgent, PermOffersRespond::ROLES));
    }

    #[test]
    fn permissions_are_registered_and_sorted() {
        let perms = registered_permissions();
        let slugs: Vec<&str> = perms.iter().map(|p| p.slug.as_str()).collect();
        assert!(slugs.contains(&"visits:complete"));
        assert!(slugs.contains(&PermNotesModerate::SLUG));
        let mut sorted = slugs.clone();
        sorted.sort();
        assert_eq!(slugs, sorted);
    }
}
