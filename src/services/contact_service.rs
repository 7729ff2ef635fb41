// src/services/contact_service.rs

use serde_json::{json, Value};
use sqlx::{Acquire, Executor, PgConnection, Postgres};
use uuid::Uuid;

use crate::{
    common::{
        db_utils::found,
        error::AppError,
        pagination::{PageParams, Paginated},
        validation::normalize_phone,
    },
    db::ContactRepository,
    models::contact::{Contact, ContactFilter, ContactPayload, UpdateContactPayload},
};

/// Contato de um lead/captação: `contact_id` existente ou dados inline.
/// Dados inline com telefone já cadastrado reaproveitam o contato existente.
pub async fn resolve_contact(
    repo: &ContactRepository,
    conn: &mut PgConnection,
    contact_id: Option<Uuid>,
    inline: Option<&ContactPayload>,
) -> Result<Contact, AppError> {
    match (contact_id, inline) {
        (Some(id), _) => found(repo.find_by_id(&mut *conn, id).await?, "contact"),
        (None, Some(data)) => {
            let phone = normalize_phone(&data.phone);
            if let Some(existing) = repo.find_by_phone(&mut *conn, &phone).await? {
                tracing::debug!(contact_id = %existing.id, "Contato reaproveitado pelo telefone");
                return Ok(existing);
            }
            create_contact(repo, &mut *conn, data).await
        }
        (None, None) => Err(AppError::field("contactId", "required")),
    }
}

async fn create_contact<'e, E>(repo: &ContactRepository, executor: E, data: &ContactPayload) -> Result<Contact, AppError>
where
    E: Executor<'e, Database = Postgres>,
{
    let phone = normalize_phone(&data.phone);
    let alternate = data.alternate_phone.as_deref().map(normalize_phone);
    let preferences = data.preferences.clone().unwrap_or_else(|| json!({}));

    repo.create(
        executor,
        data.full_name.trim(),
        &phone,
        data.email.as_deref().map(str::trim),
        alternate.as_deref(),
        &preferences,
    )
    .await
}

#[derive(Clone)]
pub struct ContactService {
    repo: ContactRepository,
}

impl ContactService {
    pub fn new(repo: ContactRepository) -> Self {
        Self { repo }
    }

    pub async fn create<'e, E>(&self, executor: E, payload: &ContactPayload) -> Result<Contact, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let contact = create_contact(&self.repo, executor, payload).await?;
        tracing::info!(contact_id = %contact.id, "Contato criado");
        Ok(contact)
    }

    pub async fn list<'e, A>(&self, conn: A, filter: &ContactFilter, page: &PageParams) -> Result<Paginated<Contact>, AppError>
    where
        A: Acquire<'e, Database = Postgres>,
    {
        let (contacts, total) = self.repo.list(conn, filter.search.as_deref(), page).await?;
        Ok(Paginated::new(contacts, page, total))
    }

    pub async fn get<'e, E>(&self, executor: E, id: Uuid) -> Result<Contact, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        found(self.repo.find_by_id(executor, id).await?, "contact")
    }

    pub async fn update<'e, E>(&self, executor: E, id: Uuid, payload: &UpdateContactPayload) -> Result<Contact, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let phone = payload.phone.as_deref().map(normalize_phone);
        let alternate = payload.alternate_phone.as_deref().map(normalize_phone);
        let preferences: Option<&Value> = payload.preferences.as_ref();

        found(
            self.repo
                .update(
                    executor,
                    id,
                    payload.full_name.as_deref().map(str::trim),
                    phone.as_deref(),
                    payload.email.as_deref().map(str::trim),
                    alternate.as_deref(),
                    preferences,
                )
                .await?,
            "contact",
        )
    }

    pub async fn delete<'e, E>(&self, executor: E, id: Uuid) -> Result<(), AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        if !self.repo.soft_delete(executor, id).await? {
            return Err(AppError::NotFound("contact"));
        }
        Ok(())
    }
}
